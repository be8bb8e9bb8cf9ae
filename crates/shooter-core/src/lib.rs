//! shooter-core: control core for a competition-robot ball shooter
//!
//! A velocity-regulated flywheel, the pusher servos that feed balls into it,
//! and the command layer that sequences spin-up, feed, and stop into a full
//! shoot cycle. Real hardware I/O and the host event loop stay outside the
//! crate, behind the [`hardware`] traits.
//!
//! # Modules
//!
//! - [`control`] - Velocity controller and fixed-rate tick loop
//! - [`command`] - Command trait, combinators, and the runner
//! - [`hardware`] - Motor/servo traits and mocks for testing
//! - [`subsystems`] - Flywheel, pushers, intake
//! - [`shooting`] - The shoot sequence and emergency stop
//!
//! # A tick
//!
//! ```text
//! host loop ──► CommandRunner::tick ──► goal changes, servo moves
//!          └──► Shooter::periodic   ──► control law ──► motor power
//! ```
//!
//! The runner mutates goals and servo positions; `periodic` then runs the
//! control law against the freshest measurement and applies power. Both are
//! driven at the host's cadence (or by [`control::TickLoop`] on a bench rig).

#![warn(unused_must_use)]

pub mod command;
pub mod control;
pub mod hardware;
pub mod shooting;
pub mod subsystems;

// Re-exports for convenience
pub use command::{Command, CommandRunner, Delay, FnCommand, Parallel, Race, Sequential};
pub use control::{MeasuredState, TickLoop, TickLoopConfig, VelocityConfig, VelocityController, VelocityGains};
pub use hardware::{MockMotor, MockServo, Motor, Servo};
pub use shooting::{ShootConfig, Shooter};
pub use subsystems::{Flywheel, FlywheelTelemetry, Intake, PusherConfig, Pushers};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error types for shooter-core
///
/// The control law itself never fails - it always produces a clamped numeric
/// output. Errors come from the edges: bad configuration, a non-finite
/// measurement, or the hardware seam.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Invalid configuration parameter (negative tolerance, non-finite gain,
    /// inverted output limits). Raised at construction time, never mid-loop.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A sampled measurement was NaN or infinite. Rejected before it can
    /// reach the actuation output.
    #[error("Invalid measurement: {0}")]
    Measurement(String),

    /// Hardware-level error from a motor or servo.
    /// Handle by: checking the device, ensuring a safe state before retry.
    #[error("Hardware error: {0}")]
    Hardware(String),

    /// Tick loop execution error.
    /// Handle by: reducing the loop rate or profiling the tick callback.
    #[error("Tick loop error: {0}")]
    TickLoop(String),
}

/// Result type alias for shooter-core operations
pub type Result<T> = std::result::Result<T, Error>;
