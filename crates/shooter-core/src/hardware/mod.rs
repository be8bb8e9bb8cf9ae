//! Hardware abstraction for the shooter mechanism
//!
//! The host runtime owns the real devices; this crate only sees them through
//! these traits. Mocks live in [`mock`] so control code can be exercised
//! without a robot attached.

mod mock;

pub use mock::{MockMotor, MockServo};

use crate::control::MeasuredState;
use crate::Result;

/// An encoder-equipped motor
pub trait Motor: Send + Sync {
    /// Sample the current position and velocity
    fn state(&self) -> MeasuredState;

    /// Apply a normalized power in [-1.0, 1.0]
    fn set_power(&self, power: f64) -> Result<()>;
}

/// A positional servo
pub trait Servo: Send + Sync {
    /// Command a position in [0.0, 1.0]
    fn set_position(&self, position: f64) -> Result<()>;

    /// The most recently commanded position
    fn position(&self) -> f64;
}

// Shared handles work wherever a device does; tests lean on this to keep a
// handle on a mock after handing it to a subsystem.
impl<M: Motor + ?Sized> Motor for std::sync::Arc<M> {
    fn state(&self) -> MeasuredState {
        (**self).state()
    }

    fn set_power(&self, power: f64) -> Result<()> {
        (**self).set_power(power)
    }
}

impl<S: Servo + ?Sized> Servo for std::sync::Arc<S> {
    fn set_position(&self, position: f64) -> Result<()> {
        (**self).set_position(position)
    }

    fn position(&self) -> f64 {
        (**self).position()
    }
}
