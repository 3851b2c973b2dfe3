//! Data-driven game balance
//!
//! Every movement and generation constant is kept here so a run can be
//! re-tuned from JSON without touching the simulation code.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating tuning data
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("tuning value `{name}` = {value} is out of range ({expected})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },
}

/// Longest dash the effect colour ramp and timers are sized for
pub const MAX_DASH_TICKS: u32 = 600;
/// Heat map increments per level beyond this make every region solid anyway
pub const MAX_DENSITY_PER_LEVEL: f64 = 100.0;

/// Per-tick movement constants (pixels and pixels/tick)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementTuning {
    /// Horizontal acceleration while a direction key is held
    pub run_accel: f32,
    /// Multiplicative horizontal decay applied every tick
    pub friction: f32,
    /// Upward velocity applied by a jump (negative is up)
    pub jump_velocity: f32,
    /// Rate at which upward velocity decays toward zero
    pub rise_decay: f32,
    /// Downward acceleration below terminal speed
    pub fall_accel: f32,
    /// Downward acceleration past terminal speed with unmodified gravity
    pub overspeed_fall_accel: f32,
    /// Terminal fall speed before gravity multipliers
    pub terminal_fall_speed: f32,

    /// Boost multipliers per upgrade tier (held modifier key)
    pub speed_boost_per_tier: f32,
    pub jump_boost_per_tier: f32,
    pub slow_fall_per_tier: f32,
    /// Extra gravity reduction while UFO-beam columns are up
    pub column_gravity_reduction: f32,
    /// Half width of an alignment column pair
    pub column_half_width: i32,

    pub dash_speed: f32,
    pub dash_ticks: u32,
    /// A dash trail marker is dropped every this many ticks
    pub dash_effect_interval: u32,
    /// Distance covered by the teleport dash
    pub blink_distance: f32,

    pub pogo_bounce_velocity: f32,
    pub pogo_release_velocity: f32,
    pub pogo_hitbox_width: i32,
    pub pogo_hitbox_height: i32,

    /// Lifetime of a visual effect marker
    pub effect_ticks: u32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            run_accel: 0.4,
            friction: 0.85,
            jump_velocity: -6.0,
            rise_decay: 0.3,
            fall_accel: 0.3,
            overspeed_fall_accel: 0.15,
            terminal_fall_speed: 3.0,

            speed_boost_per_tier: 0.5,
            jump_boost_per_tier: 0.2,
            slow_fall_per_tier: 0.2,
            column_gravity_reduction: 0.4,
            column_half_width: 16,

            dash_speed: 8.0,
            dash_ticks: 12,
            dash_effect_interval: 4,
            blink_distance: 96.0,

            pogo_bounce_velocity: -3.9,
            pogo_release_velocity: -6.0,
            pogo_hitbox_width: 6,
            pogo_hitbox_height: 12,

            effect_ticks: 15,
        }
    }
}

/// Level generation constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationTuning {
    /// Density increments per level past the first
    pub density_per_level: f64,
    /// Goal height bias: min(floor(slope * level + intercept), cap)
    pub goal_bias_slope: f64,
    pub goal_bias_intercept: f64,
    pub goal_bias_cap: i32,
    /// Redraws allowed on protected cells before the heat map is cut short
    pub max_redraws: u32,
}

impl Default for GenerationTuning {
    fn default() -> Self {
        Self {
            density_per_level: 2.6,
            goal_bias_slope: 0.8,
            goal_bias_intercept: 0.2,
            goal_bias_cap: 16,
            max_redraws: 100_000,
        }
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub movement: MovementTuning,
    pub generation: GenerationTuning,
}

impl Tuning {
    /// Parse tuning from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!("Loaded tuning overrides");
        Ok(tuning)
    }

    /// Load tuning from a JSON file on disk
    pub fn load(path: &std::path::Path) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let m = &self.movement;
        check("movement.friction", f64::from(m.friction), "0 < x <= 1", |v| {
            v > 0.0 && v <= 1.0
        })?;
        check(
            "movement.terminal_fall_speed",
            f64::from(m.terminal_fall_speed),
            "x > 0",
            |v| v > 0.0,
        )?;
        check("movement.run_accel", f64::from(m.run_accel), "x >= 0", |v| {
            v >= 0.0
        })?;
        check(
            "movement.dash_ticks",
            f64::from(m.dash_ticks),
            "1 <= x <= 600",
            |v| (1.0..=f64::from(MAX_DASH_TICKS)).contains(&v),
        )?;
        check(
            "movement.dash_effect_interval",
            f64::from(m.dash_effect_interval),
            "x >= 1",
            |v| v >= 1.0,
        )?;
        check("movement.effect_ticks", f64::from(m.effect_ticks), "x >= 1", |v| {
            v >= 1.0
        })?;
        for (name, value) in [
            ("movement.jump_velocity", m.jump_velocity),
            ("movement.pogo_bounce_velocity", m.pogo_bounce_velocity),
            ("movement.pogo_release_velocity", m.pogo_release_velocity),
        ] {
            check(name, f64::from(value), "x < 0", |v| v < 0.0)?;
        }

        let g = &self.generation;
        check(
            "generation.density_per_level",
            g.density_per_level,
            "0 <= x <= 100",
            |v| (0.0..=MAX_DENSITY_PER_LEVEL).contains(&v),
        )?;
        check("generation.goal_bias_slope", g.goal_bias_slope, "x >= 0", |v| {
            v >= 0.0
        })?;
        check(
            "generation.goal_bias_intercept",
            g.goal_bias_intercept,
            "finite",
            |_| true,
        )?;
        check(
            "generation.goal_bias_cap",
            f64::from(g.goal_bias_cap),
            "1 <= x <= 16",
            |v| (1.0..=16.0).contains(&v),
        )?;
        Ok(())
    }
}

fn check(
    name: &'static str,
    value: f64,
    expected: &'static str,
    ok: impl Fn(f64) -> bool,
) -> Result<(), TuningError> {
    if value.is_finite() && ok(value) {
        Ok(())
    } else {
        Err(TuningError::OutOfRange {
            name,
            value,
            expected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "movement": { "dash_speed": 10.0 } }"#).unwrap();
        assert_eq!(tuning.movement.dash_speed, 10.0);
        assert_eq!(tuning.movement.friction, 0.85);
        assert_eq!(tuning.generation, GenerationTuning::default());
    }

    #[test]
    fn test_rejects_bad_friction() {
        let err = Tuning::from_json(r#"{ "movement": { "friction": 1.5 } }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::OutOfRange {
                name: "movement.friction",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_negative_goal_slope() {
        let err = Tuning::from_json(r#"{ "generation": { "goal_bias_slope": -1e10 } }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            TuningError::OutOfRange {
                name: "generation.goal_bias_slope",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_runaway_dash_and_density() {
        let err = Tuning::from_json(r#"{ "movement": { "dash_ticks": 4000000000 } }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::OutOfRange {
                name: "movement.dash_ticks",
                ..
            }
        ));

        let err = Tuning::from_json(r#"{ "generation": { "density_per_level": 1e9 } }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            TuningError::OutOfRange {
                name: "generation.density_per_level",
                ..
            }
        ));

        let mut tuning = Tuning::default();
        tuning.movement.dash_ticks = MAX_DASH_TICKS;
        tuning.generation.density_per_level = MAX_DENSITY_PER_LEVEL;
        assert!(tuning.validate().is_ok());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let json = Tuning::default().to_json().unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), Tuning::default());
    }
}
