//! Session configuration
//!
//! Defaults come from the constants in `blockfall-types`; `from_env` lets a
//! shell override the seed and speed tuning without a config file.

use std::env;
use std::str::FromStr;

use crate::controller::MotionSpeeds;
use crate::types::SPEED_INCREASE;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    /// Seed for the spawn sequencer
    pub seed: u32,
    pub speeds: MotionSpeeds,
    /// Multiplier gained per locked piece
    pub speed_increase: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            speeds: MotionSpeeds::default(),
            speed_increase: SPEED_INCREASE,
        }
    }
}

/// Parse a variable, ignoring unset and unparsable values
fn var_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Speeds must be finite and strictly positive; zero would stall the tweens
fn speed_var_or(name: &str, default: f32) -> f32 {
    let value: f32 = var_or(name, default);
    if value.is_finite() && value > 0.0 {
        value
    } else {
        default
    }
}

/// A zero ramp is allowed and keeps the speed constant
fn ramp_var_or(name: &str, default: f32) -> f32 {
    let value: f32 = var_or(name, default);
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        default
    }
}

impl SessionConfig {
    /// Create from environment variables.
    ///
    /// `BLOCKFALL_SEED`, `BLOCKFALL_SLOW_FALL`, `BLOCKFALL_FAST_FALL`,
    /// `BLOCKFALL_SIDE_SPEED`, `BLOCKFALL_SPEED_INCREASE`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            seed: var_or("BLOCKFALL_SEED", defaults.seed),
            speeds: MotionSpeeds {
                side: speed_var_or("BLOCKFALL_SIDE_SPEED", defaults.speeds.side),
                slow_fall: speed_var_or("BLOCKFALL_SLOW_FALL", defaults.speeds.slow_fall),
                fast_fall: speed_var_or("BLOCKFALL_FAST_FALL", defaults.speeds.fast_fall),
                rotation: defaults.speeds.rotation,
            },
            speed_increase: ramp_var_or("BLOCKFALL_SPEED_INCREASE", defaults.speed_increase),
        }
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FAST_FALL_SPEED, SIDE_SPEED, SLOW_FALL_SPEED};

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.seed, 1);
        assert_eq!(config.speeds.slow_fall, SLOW_FALL_SPEED);
        assert_eq!(config.speeds.fast_fall, FAST_FALL_SPEED);
        assert_eq!(config.speed_increase, SPEED_INCREASE);
    }

    #[test]
    fn test_from_env_overrides_and_fallbacks() {
        // Only this test touches these variables
        env::set_var("BLOCKFALL_SEED", "4242");
        env::set_var("BLOCKFALL_FAST_FALL", "not-a-number");
        env::set_var("BLOCKFALL_SLOW_FALL", "-3");
        env::set_var("BLOCKFALL_SIDE_SPEED", "0");
        env::set_var("BLOCKFALL_SPEED_INCREASE", "0");
        let config = SessionConfig::from_env();
        env::remove_var("BLOCKFALL_SEED");
        env::remove_var("BLOCKFALL_FAST_FALL");
        env::remove_var("BLOCKFALL_SLOW_FALL");
        env::remove_var("BLOCKFALL_SIDE_SPEED");
        env::remove_var("BLOCKFALL_SPEED_INCREASE");

        assert_eq!(config.seed, 4242);
        assert_eq!(config.speeds.fast_fall, FAST_FALL_SPEED);
        assert_eq!(config.speeds.slow_fall, SLOW_FALL_SPEED);
        // Zero speed would freeze the piece, so it falls back too
        assert_eq!(config.speeds.side, SIDE_SPEED);
        assert_eq!(config.speed_increase, 0.0);
    }

    #[test]
    fn test_with_seed() {
        assert_eq!(SessionConfig::default().with_seed(9).seed, 9);
    }
}
