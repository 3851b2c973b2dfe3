//! Player collision against the goal and obstacles
//!
//! Checked once per tick after the movement step. The goal is tested before
//! any obstacle: a frame that touches both counts as reaching the goal.

use super::generation::LevelLayout;
use super::geometry::Rect;
use super::movement::PlayerState;
use crate::tuning::MovementTuning;
use crate::upgrades::UpgradeLedger;

/// Result of resolving one tick's collisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionOutcome {
    /// Nothing touched, or an obstacle was touched while invincible
    Clear,
    GoalReached,
    ObstacleHit,
}

/// First obstacle overlapping `rect`, in layout order
pub fn first_overlap<'a>(rect: &Rect, obstacles: &'a [Rect]) -> Option<&'a Rect> {
    obstacles.iter().find(|obstacle| rect.intersects(obstacle))
}

/// Bounce off an obstacle hit by the pogo strike zone.
///
/// Returns true when a strike landed this tick. A bounce does not cancel a
/// running dash.
pub fn pogo_strike(player: &mut PlayerState, obstacles: &[Rect], tuning: &MovementTuning) -> bool {
    if !player.pogo_active {
        return false;
    }
    let hitbox = player.pogo_hitbox(tuning);
    if first_overlap(&hitbox, obstacles).is_none() {
        return false;
    }
    player.vel.y = tuning.pogo_bounce_velocity;
    player.pogo_hit = true;
    true
}

/// Goal first, then obstacles
pub fn resolve(player: &PlayerState, layout: &LevelLayout, upgrades: &UpgradeLedger) -> CollisionOutcome {
    let body = player.rect();
    if body.intersects(&layout.goal) {
        return CollisionOutcome::GoalReached;
    }
    if player.is_invincible(upgrades) {
        return CollisionOutcome::Clear;
    }
    match first_overlap(&body, &layout.obstacles) {
        Some(_) => CollisionOutcome::ObstacleHit,
        None => CollisionOutcome::Clear,
    }
}
