//! A Platformer Without Platforms
//!
//! Core modules:
//! - `sim`: Deterministic simulation (level generation, movement, collisions, session state)
//! - `upgrades`: Ability upgrade ledger and catalogue
//! - `tuning`: Data-driven movement and generation balance

pub mod sim;
pub mod tuning;
pub mod upgrades;

pub use sim::{FrameSnapshot, GamePhase, HeldKeys, Key, Session};
pub use tuning::{Tuning, TuningError};
pub use upgrades::{UpgradeError, UpgradeLedger, UpgradePath};

/// Fixed geometry of the playfield and player
pub mod consts {
    /// Fixed simulation rate (ticks per second)
    pub const TICK_HZ: u32 = 60;

    /// Playfield dimensions in pixels
    pub const PLAYFIELD_WIDTH: i32 = 400;
    pub const PLAYFIELD_HEIGHT: i32 = 400;

    /// Side length of one difficulty region (the playfield is a 4x4 grid of these)
    pub const REGION_SIZE: i32 = 100;
    pub const REGIONS_PER_SIDE: usize = 4;
    /// Side length of one placement unit (a region is 4x4 units)
    pub const UNIT_SIZE: i32 = 25;
    pub const UNITS_PER_REGION: i32 = REGION_SIZE / UNIT_SIZE;

    /// Player square side length
    pub const PLAYER_SIZE: i32 = 16;
    /// Respawn position (top-left corner of the player square)
    pub const PLAYER_START_X: i32 = 25;
    pub const PLAYER_START_Y: i32 = PLAYFIELD_HEIGHT - PLAYER_SIZE;

    /// Region (column, row) the player starts in; never receives obstacles
    pub const START_REGION: (usize, usize) = (0, 3);

    /// Reaching this level ends the run
    pub const FINAL_LEVEL: u32 = 30;
}

/// Net -1/0/+1 signal from an opposed pair of inputs
#[inline]
pub fn tilt(negative: bool, positive: bool) -> i32 {
    i32::from(positive) - i32::from(negative)
}

/// Region index along one axis for a pixel coordinate.
///
/// Top and left edges belong to the region, so plain integer division works.
#[inline]
pub fn region_index(coordinate: i32) -> usize {
    (coordinate / consts::REGION_SIZE).clamp(0, consts::REGIONS_PER_SIDE as i32 - 1) as usize
}
