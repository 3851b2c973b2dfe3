//! Session state and render snapshots
//!
//! A `Session` owns everything one run needs: level counter, phase, upgrades,
//! the current layout, the player, effects and the RNG. Nothing is global.

use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::effects::{EffectSprite, EffectTracker};
use super::generation::{LevelLayout, generate_level};
use super::geometry::Rect;
use super::input::EdgeDetector;
use super::movement::PlayerState;
use super::rng::RngState;
use crate::consts::FINAL_LEVEL;
use crate::tuning::Tuning;
use crate::upgrades::{UpgradeLedger, UpgradeOffer};

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Between levels, waiting for an upgrade choice
    Upgrading,
    /// Game is paused
    Paused,
    /// Final level reached; the player can still move around
    Won,
}

/// One run of the game
#[derive(Debug, Clone)]
pub struct Session {
    /// Run seed for reproducibility
    pub rng_state: RngState,
    /// Current level (1-based)
    pub level: u32,
    pub phase: GamePhase,
    pub upgrades: UpgradeLedger,
    pub layout: LevelLayout,
    pub player: PlayerState,
    pub effects: EffectTracker,
    pub tuning: Tuning,
    /// Simulation tick counter (only advances while the player can move)
    pub ticks: u64,
    pub(crate) keys: EdgeDetector,
    /// Set while the level is being regenerated; suppresses one tick of collisions
    pub(crate) level_resetting: bool,
    rng: Pcg32,
}

impl Session {
    /// New run at level 1 with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let rng_state = RngState::new(seed);
        let mut rng = rng_state.to_rng();
        let layout = generate_level(1, &tuning.generation, &mut rng);
        log::info!("New session (seed {})", seed);
        Self {
            rng_state,
            level: 1,
            phase: GamePhase::Playing,
            upgrades: UpgradeLedger::new(),
            layout,
            player: PlayerState::spawn(),
            effects: EffectTracker::new(tuning.movement.effect_ticks),
            tuning,
            ticks: 0,
            keys: EdgeDetector::default(),
            level_resetting: false,
            rng,
        }
    }

    #[inline]
    pub fn current_level(&self) -> u32 {
        self.level
    }

    #[inline]
    pub fn is_game_won(&self) -> bool {
        self.level >= FINAL_LEVEL
    }

    #[inline]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Upgrades that could be chosen right now
    pub fn available_upgrades(&self) -> Vec<UpgradeOffer> {
        self.upgrades.available()
    }

    /// Build the layout for the current level from the session RNG
    pub(crate) fn regenerate(&mut self) {
        self.layout = generate_level(self.level, &self.tuning.generation, &mut self.rng);
        self.effects.clear();
    }

    /// Respawn at the start position with every per-life counter cleared
    pub(crate) fn reset_player(&mut self) {
        self.player = PlayerState::spawn();
    }

    /// Read-only view of everything a renderer needs this frame
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            level: self.level,
            phase: self.phase,
            ticks: self.ticks,
            player: self.player.rect(),
            goal: self.layout.goal,
            obstacles: self.layout.obstacles.clone(),
            columns: self.player.column_bounds(),
            waypoint: self.player.waypoint_marker(),
            pogo_hitbox: self
                .player
                .pogo_active
                .then(|| self.player.pogo_hitbox(&self.tuning.movement)),
            effects: self.effects.sprites(),
            upgrades: self.upgrades,
        }
    }
}

/// Render data for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub level: u32,
    pub phase: GamePhase,
    pub ticks: u64,
    pub player: Rect,
    pub goal: Rect,
    pub obstacles: Vec<Rect>,
    /// Left and right x of the alignment columns, while raised
    pub columns: Option<(i32, i32)>,
    pub waypoint: Option<Rect>,
    pub pogo_hitbox: Option<Rect>,
    /// Live effects, oldest first
    pub effects: Vec<EffectSprite>,
    pub upgrades: UpgradeLedger,
}
