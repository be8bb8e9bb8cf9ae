//! Pusher subsystem
//!
//! A left/right servo pair that feeds balls into the flywheel, always moved
//! together. One feed cycle is extend, hold, retract, hold; the holds give
//! the ball time to leave and the next one time to settle.

use serde::{Deserialize, Serialize};

use crate::hardware::Servo;
use crate::{Error, Result};

/// Positions and timing for the pusher pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PusherConfig {
    /// Servo position when extended
    pub extended: f64,
    /// Servo position when retracted
    pub retracted: f64,
    /// Seconds to hold the extended position
    pub extend_hold: f64,
    /// Seconds to hold the retracted position
    pub retract_hold: f64,
}

impl Default for PusherConfig {
    fn default() -> Self {
        Self {
            extended: 1.0,
            retracted: 0.0,
            extend_hold: 0.3,
            retract_hold: 0.3,
        }
    }
}

impl PusherConfig {
    fn validate(&self) -> Result<()> {
        for (name, position) in [("extended", self.extended), ("retracted", self.retracted)] {
            if !(0.0..=1.0).contains(&position) {
                return Err(Error::Config(format!(
                    "{name} position must be in [0, 1], got {position}"
                )));
            }
        }
        for (name, hold) in [
            ("extend_hold", self.extend_hold),
            ("retract_hold", self.retract_hold),
        ] {
            if !hold.is_finite() || hold < 0.0 {
                return Err(Error::Config(format!(
                    "{name} must be finite and non-negative, got {hold}"
                )));
            }
        }
        Ok(())
    }
}

/// The pusher servo pair
pub struct Pushers {
    left: Box<dyn Servo>,
    right: Box<dyn Servo>,
    config: PusherConfig,
}

impl Pushers {
    /// Create the pair, validating the config
    pub fn new(left: Box<dyn Servo>, right: Box<dyn Servo>, config: PusherConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            left,
            right,
            config,
        })
    }

    /// Move both servos to the extended position
    pub fn extend(&self) -> Result<()> {
        self.set_both(self.config.extended)
    }

    /// Move both servos to the retracted position
    pub fn retract(&self) -> Result<()> {
        self.set_both(self.config.retracted)
    }

    fn set_both(&self, position: f64) -> Result<()> {
        self.left.set_position(position)?;
        self.right.set_position(position)
    }

    /// The timing/position config
    pub fn config(&self) -> &PusherConfig {
        &self.config
    }
}
