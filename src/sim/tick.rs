//! Fixed timestep session tick
//!
//! Advances a [`Session`] by one 60 Hz tick and handles the level/phase
//! transitions the host can request between ticks.

use super::collision::{self, CollisionOutcome};
use super::input::{HeldKeys, InputSource, Key};
use super::movement::{self, StepOutcome};
use super::state::{GamePhase, Session};
use crate::consts::FINAL_LEVEL;
use crate::upgrades::{UpgradeError, UpgradePath};

impl Session {
    /// Advance the session by one fixed tick
    pub fn tick(&mut self, input: &impl InputSource) -> CollisionOutcome {
        let edges = self.keys.advance(HeldKeys::capture(input));

        // Handle pause toggle
        if edges.pressed(Key::Pause) {
            match self.phase {
                GamePhase::Playing => {
                    self.phase = GamePhase::Paused;
                    log::info!("Paused at level {}", self.level);
                    return CollisionOutcome::Clear;
                }
                GamePhase::Paused => {
                    self.phase = GamePhase::Playing;
                    log::info!("Resumed at level {}", self.level);
                }
                _ => {}
            }
        }

        // Only the Playing and Won phases simulate
        match self.phase {
            GamePhase::Paused | GamePhase::Upgrading => return CollisionOutcome::Clear,
            GamePhase::Playing | GamePhase::Won => {}
        }

        self.ticks += 1;
        self.effects.tick();

        let mut spawned = Vec::new();
        let step = movement::step(
            &mut self.player,
            &edges,
            &self.upgrades,
            &self.tuning.movement,
            &mut spawned,
        );
        self.effects.extend(spawned);

        if step == StepOutcome::LevelResetRequested {
            self.request_level_reset();
        }

        let outcome = self.resolve_collisions();
        self.level_resetting = false;
        outcome
    }

    fn resolve_collisions(&mut self) -> CollisionOutcome {
        collision::pogo_strike(
            &mut self.player,
            &self.layout.obstacles,
            &self.tuning.movement,
        );

        if self.level_resetting {
            return CollisionOutcome::Clear;
        }

        let outcome = collision::resolve(&self.player, &self.layout, &self.upgrades);
        match outcome {
            CollisionOutcome::GoalReached => {
                log::debug!("Goal reached on level {}", self.level);
                self.request_next_level();
            }
            CollisionOutcome::ObstacleHit => {
                log::debug!(
                    "Hit an obstacle at ({}, {}) on level {}",
                    self.player.pos.x,
                    self.player.pos.y,
                    self.level
                );
                self.reset_player();
            }
            CollisionOutcome::Clear => {}
        }
        outcome
    }

    /// Move on to the next level.
    ///
    /// Odd levels are preceded by an upgrade choice; the layout is only
    /// generated once [`Session::choose_upgrade`] is called. Ignored unless
    /// the session is [`GamePhase::Playing`].
    pub fn request_next_level(&mut self) {
        if self.level >= FINAL_LEVEL {
            return;
        }
        if self.phase != GamePhase::Playing {
            log::warn!(
                "Next level requested while {:?} on level {}",
                self.phase,
                self.level
            );
            return;
        }
        self.level += 1;

        if self.level >= FINAL_LEVEL {
            self.regenerate();
            self.reset_player();
            self.phase = GamePhase::Won;
            log::info!("Level {} reached, run complete", self.level);
        } else if self.level % 2 == 1 && !self.upgrades.available().is_empty() {
            self.phase = GamePhase::Upgrading;
            log::info!("Level {}: choose an upgrade", self.level);
        } else {
            self.start_level();
        }
    }

    /// Regenerate the current level and respawn the player
    pub fn request_level_reset(&mut self) {
        log::debug!("Resetting level {}", self.level);
        self.level_resetting = true;
        self.regenerate();
        self.reset_player();
    }

    /// Apply an upgrade choice and start the waiting level.
    ///
    /// Returns the new tier of `path`. A refused choice leaves the session
    /// waiting in [`GamePhase::Upgrading`].
    pub fn choose_upgrade(&mut self, path: UpgradePath) -> Result<u8, UpgradeError> {
        if self.phase != GamePhase::Upgrading {
            log::warn!("Upgrade {} chosen outside the upgrade phase", path);
            return Err(UpgradeError::NotUpgrading);
        }
        let tier = self.upgrades.upgrade(path).inspect_err(|e| {
            log::warn!("Upgrade {} refused: {}", path, e);
        })?;
        log::info!("Upgraded {} to tier {}", path, tier);
        self.start_level();
        Ok(tier)
    }

    fn start_level(&mut self) {
        self.level_resetting = true;
        self.regenerate();
        self.reset_player();
        self.phase = GamePhase::Playing;
        log::info!(
            "Level {} started: {} obstacles",
            self.level,
            self.layout.obstacles.len()
        );
    }
}
