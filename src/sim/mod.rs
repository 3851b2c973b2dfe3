//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (obstacles in generation order, effects in spawn order)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod effects;
pub mod generation;
pub mod geometry;
pub mod input;
pub mod movement;
pub mod rng;
pub mod state;
pub mod tick;

pub use autopilot::Autopilot;
pub use collision::CollisionOutcome;
pub use effects::{Effect, EffectKind, EffectSprite, EffectTracker, Rgb, Shape};
pub use generation::{LevelLayout, generate_level};
pub use geometry::Rect;
pub use input::{EdgeDetector, HeldKeys, InputSource, Key, KeyEdges};
pub use movement::{ColumnPhase, PlayerState, WaypointPhase};
pub use rng::{FixedSource, RandomSource, ScriptedSource};
pub use state::{FrameSnapshot, GamePhase, Session};
