//! Flywheel subsystem
//!
//! Owns the shooter wheel's motor handle and velocity controller. `periodic`
//! runs once per tick: sample, control law, apply power.

use serde::{Deserialize, Serialize};

use crate::control::{MeasuredState, VelocityConfig, VelocityController, VelocityGains};
use crate::hardware::Motor;
use crate::Result;

/// Snapshot handed to the telemetry layer each tick
///
/// Write-only from this crate's perspective; the host decides how to render
/// or transmit it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlywheelTelemetry {
    /// Commanded velocity (ticks/s)
    pub goal_velocity: f64,
    /// Velocity measured this tick (ticks/s)
    pub measured_velocity: f64,
    /// Power applied this tick
    pub power: f64,
    /// Active gains
    pub gains: VelocityGains,
}

/// The velocity-regulated shooter wheel
pub struct Flywheel {
    motor: Box<dyn Motor>,
    controller: VelocityController,
}

impl Flywheel {
    /// Create a flywheel over a motor handle, validating the config
    pub fn new(motor: Box<dyn Motor>, config: VelocityConfig) -> Result<Self> {
        Ok(Self {
            motor,
            controller: VelocityController::new(config)?,
        })
    }

    /// Set the goal velocity (ticks/s)
    pub fn set_goal(&mut self, velocity: f64) {
        self.controller.set_goal(velocity);
    }

    /// The current goal velocity
    pub fn goal(&self) -> f64 {
        self.controller.goal()
    }

    /// Set the goal to zero
    ///
    /// The control law keeps running; power winds down as the wheel does.
    pub fn stop(&mut self) {
        self.controller.stop();
    }

    /// Immediately cut power, bypassing the control law
    ///
    /// Zeroes the goal and controller state and forces zero power this
    /// instant instead of waiting for feedback to settle. This is the
    /// emergency-stop path.
    pub fn halt(&mut self) -> Result<()> {
        self.controller.stop();
        self.controller.reset();
        self.motor.set_power(0.0)
    }

    /// Whether the wheel is within tolerance of the current goal
    pub fn is_at_speed(&self) -> bool {
        self.controller.is_at_speed(self.motor.state())
    }

    /// Whether the wheel is within tolerance of an explicit target
    pub fn is_at_speed_for(&self, target: f64) -> bool {
        self.controller.is_at_speed_for(self.motor.state(), target)
    }

    /// The velocity measured right now (ticks/s)
    pub fn velocity(&self) -> f64 {
        self.motor.state().velocity
    }

    /// Run one control tick: sample, compute, apply
    pub fn periodic(&mut self, dt: f64) -> Result<()> {
        let measured = self.motor.state();
        let power = self.controller.update(measured, dt)?;
        self.motor.set_power(power)
    }

    /// Snapshot for the telemetry layer
    pub fn telemetry(&self) -> FlywheelTelemetry {
        FlywheelTelemetry {
            goal_velocity: self.controller.goal(),
            measured_velocity: self.motor.state().velocity,
            power: self.controller.last_output(),
            gains: self.controller.config().gains,
        }
    }

    /// Replace the controller gains (between control epochs only)
    pub fn set_gains(&mut self, gains: VelocityGains) -> Result<()> {
        self.controller.set_gains(gains)
    }

    /// Sample the motor directly
    pub fn measured(&self) -> MeasuredState {
        self.motor.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::MockMotor;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn flywheel_with_motor() -> (Flywheel, Arc<MockMotor>) {
        let motor = Arc::new(MockMotor::new(2000.0, 0.2));
        let config = VelocityConfig::new(VelocityGains::feedforward(0.0005));
        let fly = Flywheel::new(Box::new(motor.clone()), config).unwrap();
        (fly, motor)
    }

    #[test]
    fn test_periodic_applies_feedforward_power() {
        let (mut fly, motor) = flywheel_with_motor();
        fly.set_goal(1500.0);
        fly.periodic(0.02).unwrap();
        assert_relative_eq!(motor.power(), 0.75);
    }

    #[test]
    fn test_spins_up_to_goal_under_periodic() {
        let (mut fly, motor) = flywheel_with_motor();
        fly.set_goal(1500.0);

        for _ in 0..300 {
            fly.periodic(0.02).unwrap();
            motor.step(0.02);
        }
        assert!(fly.is_at_speed(), "velocity was {}", fly.velocity());
    }

    #[test]
    fn test_halt_forces_zero_power() {
        let (mut fly, motor) = flywheel_with_motor();
        fly.set_goal(1500.0);
        fly.periodic(0.02).unwrap();
        assert!(motor.power() > 0.0);

        fly.halt().unwrap();
        assert_eq!(motor.power(), 0.0);
        assert_eq!(fly.goal(), 0.0);
    }

    #[test]
    fn test_telemetry_snapshot() {
        let (mut fly, motor) = flywheel_with_motor();
        fly.set_goal(1500.0);
        motor.set_velocity(1400.0);
        fly.periodic(0.02).unwrap();

        let t = fly.telemetry();
        assert_relative_eq!(t.goal_velocity, 1500.0);
        assert!(t.measured_velocity > 1000.0);
        assert_relative_eq!(t.power, 0.75);
        assert_relative_eq!(t.gains.kv, 0.0005);
    }
}
