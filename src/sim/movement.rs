//! Per-tick player movement and ability state machine
//!
//! [`step`] advances the player by one fixed tick. The order of the stages
//! matters: tilt feeds the abilities, abilities may override velocity, and
//! integration/gravity run last. Collision is resolved afterwards by the
//! caller (see `collision`).

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::effects::EffectEvent;
use super::geometry::Rect;
use super::input::{Key, KeyEdges};
use crate::consts::{PLAYER_SIZE, PLAYER_START_X, PLAYER_START_Y, PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};
use crate::tuning::MovementTuning;
use crate::upgrades::{UpgradeLedger, UpgradePath};

/// Portable waypoint: place once, return once, per life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WaypointPhase {
    #[default]
    Idle,
    Anchored { anchor: IVec2 },
    Spent,
}

/// Alignment columns: raise once, drop once, per life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColumnPhase {
    #[default]
    Idle,
    Active { left: i32, right: i32 },
    Spent,
}

/// Everything about the player that changes tick to tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Top-left corner of the player square
    pub pos: IVec2,
    pub vel: Vec2,
    pub on_ground: bool,
    pub midair_jumps: u8,
    pub midair_dashes: u8,
    /// Velocity forced every tick while a dash is running
    pub dash_velocity: Vec2,
    pub dash_ticks: u32,
    pub pogo_active: bool,
    pub pogo_hit: bool,
    pub waypoint: WaypointPhase,
    pub columns: ColumnPhase,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::spawn()
    }
}

impl PlayerState {
    /// Fresh life at the start position
    pub fn spawn() -> Self {
        Self {
            pos: IVec2::new(PLAYER_START_X, PLAYER_START_Y),
            vel: Vec2::ZERO,
            on_ground: true,
            midair_jumps: 0,
            midair_dashes: 0,
            dash_velocity: Vec2::ZERO,
            dash_ticks: 0,
            pogo_active: false,
            pogo_hit: false,
            waypoint: WaypointPhase::Idle,
            columns: ColumnPhase::Idle,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::square_at(self.pos, PLAYER_SIZE)
    }

    /// Strike zone directly under the player's centre
    pub fn pogo_hitbox(&self, tuning: &MovementTuning) -> Rect {
        Rect::new(
            self.pos.x + (PLAYER_SIZE - tuning.pogo_hitbox_width) / 2,
            self.pos.y + PLAYER_SIZE,
            tuning.pogo_hitbox_width,
            tuning.pogo_hitbox_height,
        )
    }

    #[inline]
    pub fn is_dashing(&self) -> bool {
        self.dash_ticks > 0
    }

    /// Mid-dash with the invincible dash tier
    pub fn is_invincible(&self, upgrades: &UpgradeLedger) -> bool {
        upgrades.tier(UpgradePath::SpecialDash) == 3 && self.is_dashing()
    }

    pub fn waypoint_marker(&self) -> Option<Rect> {
        match self.waypoint {
            WaypointPhase::Anchored { anchor } => Some(Rect::square_at(anchor, PLAYER_SIZE)),
            _ => None,
        }
    }

    pub fn column_bounds(&self) -> Option<(i32, i32)> {
        match self.columns {
            ColumnPhase::Active { left, right } => Some((left, right)),
            _ => None,
        }
    }

    fn teleport_to(&mut self, target: IVec2, effects: &mut Vec<EffectEvent>) {
        effects.push(EffectEvent::teleport(self.pos));
        self.pos = target;
        effects.push(EffectEvent::teleport(self.pos));
        self.vel = Vec2::ZERO;
    }
}

/// What the host must do after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moved,
    /// Reset key pressed: regenerate the level; nothing else moved this tick
    LevelResetRequested,
}

/// Boost multipliers for this tick
#[derive(Debug, Clone, Copy, PartialEq)]
struct Multipliers {
    speed: f32,
    jump: f32,
    gravity: f32,
}

impl Multipliers {
    fn new(boost_held: bool, upgrades: &UpgradeLedger, tuning: &MovementTuning) -> Self {
        if !boost_held {
            return Self {
                speed: 1.0,
                jump: 1.0,
                gravity: 1.0,
            };
        }
        let tier = |path| f32::from(upgrades.tier(path));
        Self {
            speed: 1.0 + tuning.speed_boost_per_tier * tier(UpgradePath::SpeedBoost),
            jump: 1.0 + tuning.jump_boost_per_tier * tier(UpgradePath::JumpBoost),
            gravity: 1.0 - tuning.slow_fall_per_tier * tier(UpgradePath::SlowFall),
        }
    }
}

/// Advance the player by one tick
pub fn step(
    player: &mut PlayerState,
    keys: &KeyEdges,
    upgrades: &UpgradeLedger,
    tuning: &MovementTuning,
    effects: &mut Vec<EffectEvent>,
) -> StepOutcome {
    let mut mult = Multipliers::new(keys.held(Key::Boost), upgrades, tuning);

    // Run input
    if keys.held(Key::Right) {
        player.vel.x += tuning.run_accel * mult.speed;
    }
    if keys.held(Key::Left) {
        player.vel.x -= tuning.run_accel * mult.speed;
    }
    let h_tilt = keys.horizontal_tilt();
    let v_tilt = keys.vertical_tilt();

    // Jump; any jump press cancels a running dash
    if keys.pressed(Key::Jump) {
        player.dash_ticks = 0;
        if player.on_ground {
            player.vel.y = tuning.jump_velocity * mult.jump;
            effects.push(EffectEvent::jump(player.pos));
        } else if player.midair_jumps < upgrades.tier(UpgradePath::MidairJumps) {
            player.vel.y = tuning.jump_velocity * mult.jump;
            player.midair_jumps += 1;
            effects.push(EffectEvent::jump(player.pos));
        }
    }

    if keys.pressed(Key::Reset) {
        return StepOutcome::LevelResetRequested;
    }

    pogo(player, keys, v_tilt, upgrades, tuning);

    let attack_pressed = keys.pressed(Key::Attack);

    // Portable waypoint: attack with no vertical tilt
    if attack_pressed && upgrades.tier(UpgradePath::PortableWaypoint) > 0 && v_tilt == 0 {
        match player.waypoint {
            WaypointPhase::Idle => {
                player.waypoint = WaypointPhase::Anchored { anchor: player.pos };
            }
            WaypointPhase::Anchored { anchor } => {
                player.teleport_to(anchor, effects);
                player.waypoint = WaypointPhase::Spent;
            }
            WaypointPhase::Spent => {}
        }
    }

    // Alignment columns: attack while tilting up
    if attack_pressed && upgrades.tier(UpgradePath::AlignmentColumn) > 0 && v_tilt == 1 {
        match player.columns {
            ColumnPhase::Idle => {
                let centre = player.pos.x + PLAYER_SIZE / 2;
                player.columns = ColumnPhase::Active {
                    left: centre - tuning.column_half_width,
                    right: centre + tuning.column_half_width,
                };
            }
            ColumnPhase::Active { .. } => player.columns = ColumnPhase::Spent,
            ColumnPhase::Spent => {}
        }
    }
    if upgrades.tier(UpgradePath::AlignmentColumn) > 1
        && matches!(player.columns, ColumnPhase::Active { .. })
    {
        mult.gravity -= tuning.column_gravity_reduction;
    }

    if keys.pressed(Key::Dash) {
        dash(player, h_tilt, v_tilt, upgrades, tuning, effects);
    }

    // A running dash overrides velocity
    if player.dash_ticks > 0 {
        player.vel = player.dash_velocity;
        player.dash_ticks -= 1;
        if player.dash_ticks % tuning.dash_effect_interval == 0 {
            effects.push(EffectEvent::dash(player.pos, player.dash_ticks));
        }
        if player.dash_ticks == 0 {
            player.vel.y /= 2.0;
        }
    }

    integrate(player, mult.gravity, tuning);
    StepOutcome::Moved
}

/// Hold attack + down to pogo; releasing attack after a hit may grant a bounce
fn pogo(
    player: &mut PlayerState,
    keys: &KeyEdges,
    v_tilt: i32,
    upgrades: &UpgradeLedger,
    tuning: &MovementTuning,
) {
    let tier = upgrades.tier(UpgradePath::Pogo);
    if keys.held(Key::Attack) {
        if tier > 0 && v_tilt == -1 {
            player.pogo_active = true;
        } else {
            player.pogo_active = false;
            player.pogo_hit = false;
        }
    } else {
        if tier > 1 && player.pogo_active && player.pogo_hit {
            player.vel.y = tuning.pogo_release_velocity;
        }
        player.pogo_active = false;
        player.pogo_hit = false;
    }
}

fn dash(
    player: &mut PlayerState,
    h_tilt: i32,
    v_tilt: i32,
    upgrades: &UpgradeLedger,
    tuning: &MovementTuning,
    effects: &mut Vec<EffectEvent>,
) {
    let dash_tier = upgrades.tier(UpgradePath::Dash);
    if dash_tier == 0 || !(player.on_ground || player.midair_dashes < dash_tier) {
        return;
    }
    let special = upgrades.tier(UpgradePath::SpecialDash);
    let direction = if special == 0 {
        // Horizontal only
        if h_tilt == 0 {
            return;
        }
        Vec2::new(h_tilt as f32, 0.0)
    } else {
        if h_tilt == 0 && v_tilt == 0 {
            return;
        }
        // Screen y grows downward, tilt up is positive
        Vec2::new(h_tilt as f32, -v_tilt as f32).normalize()
    };

    if !player.on_ground {
        player.midair_dashes += 1;
    }

    if special == 2 {
        let offset = direction * tuning.blink_distance;
        let target = player.pos + IVec2::new(offset.x as i32, offset.y as i32);
        player.teleport_to(target, effects);
    } else {
        player.dash_velocity = direction * tuning.dash_speed;
        player.dash_ticks = tuning.dash_ticks;
    }
}

/// Friction, position integration, bounds and gravity
fn integrate(player: &mut PlayerState, gravity_mult: f32, tuning: &MovementTuning) {
    player.vel.x *= tuning.friction;
    player.pos.x += player.vel.x as i32;
    player.pos.y += player.vel.y as i32;

    if let ColumnPhase::Active { left, right } = player.columns {
        player.pos.x = player.pos.x.max(left).min(right - PLAYER_SIZE);
    }

    player.pos.x = player.pos.x.clamp(0, PLAYFIELD_WIDTH - PLAYER_SIZE);
    player.pos.y = player.pos.y.max(0);

    if player.pos.y >= PLAYFIELD_HEIGHT - PLAYER_SIZE {
        player.pos.y = PLAYFIELD_HEIGHT - PLAYER_SIZE;
        player.on_ground = true;
        player.midair_jumps = 0;
        player.midair_dashes = 0;
        player.pogo_active = false;
        player.pogo_hit = false;
    } else {
        let terminal = tuning.terminal_fall_speed * gravity_mult;
        if player.vel.y < 0.0 {
            player.vel.y += tuning.rise_decay;
        } else if player.vel.y > terminal {
            if gravity_mult == 1.0 {
                player.vel.y += (tuning.overspeed_fall_accel * gravity_mult).max(0.0);
            } else {
                // Slowed fall has a hard cap
                player.vel.y = terminal;
            }
        } else {
            player.vel.y += (tuning.fall_accel * gravity_mult).max(0.0);
        }
        player.on_ground = false;
    }
}
