//! Idle/demo mode: a simple bot that plays the game
//!
//! Walks toward the goal, hops over anything in front of it and spends
//! midair jumps when the goal is above. Good enough to exercise a full run
//! headless; it does not try to play well.

use super::geometry::Rect;
use super::input::{HeldKeys, Key};
use super::state::Session;
use crate::consts::PLAYER_SIZE;
use crate::upgrades::UpgradePath;

/// How far ahead (px) an obstacle makes the bot jump
const LOOKAHEAD: i32 = 40;
/// Horizontal slack before the bot turns toward the goal
const DEADZONE: i32 = 4;

#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    jump_held: bool,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys to hold this tick
    pub fn next_input(&mut self, session: &Session) -> HeldKeys {
        let player = &session.player;
        let body = player.rect();
        let goal = session.layout.goal;

        let mut keys = HeldKeys::NONE;
        let offset = (goal.x + goal.width / 2) - (body.x + PLAYER_SIZE / 2);
        let facing = if offset > DEADZONE {
            keys = keys.with(Key::Right);
            1
        } else if offset < -DEADZONE {
            keys = keys.with(Key::Left);
            -1
        } else {
            0
        };

        let ahead = match facing {
            1 => Rect::new(body.right(), body.y, LOOKAHEAD, body.height),
            -1 => Rect::new(body.x - LOOKAHEAD, body.y, LOOKAHEAD, body.height),
            _ => Rect::default(),
        };
        let blocked = session.layout.obstacles.iter().any(|o| o.intersects(&ahead));
        let goal_above = goal.bottom() < body.y;

        let wants_jump = if player.on_ground {
            blocked || goal_above
        } else {
            let jumps_left = player.midair_jumps < session.upgrades.tier(UpgradePath::MidairJumps);
            player.vel.y > 0.0 && jumps_left && (blocked || goal_above)
        };

        // Release for a tick between jumps so each one is a fresh press
        if wants_jump && !self.jump_held {
            keys = keys.with(Key::Jump);
            self.jump_held = true;
        } else {
            self.jump_held = false;
        }
        keys
    }
}
