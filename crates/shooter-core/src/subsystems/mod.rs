//! Robot subsystems: flywheel, pushers, intake
//!
//! Each subsystem is explicitly constructed and explicitly owned - there is
//! no process-wide instance. Whatever sequencer needs a subsystem holds it
//! (usually through [`crate::shooting::Shooter`]) and drives its `periodic`.

mod flywheel;
mod intake;
mod pushers;

pub use flywheel::{Flywheel, FlywheelTelemetry};
pub use intake::Intake;
pub use pushers::{PusherConfig, Pushers};
