//! Control for the shooter flywheel
//!
//! Provides the velocity controller that regulates the flywheel and a
//! fixed-rate tick loop for driving it outside the host runtime.

mod tick_loop;
mod velocity;

pub use tick_loop::{TickLoop, TickLoopConfig, TickLoopHandle, TickStats};
pub use velocity::{MeasuredState, VelocityConfig, VelocityController, VelocityGains};
