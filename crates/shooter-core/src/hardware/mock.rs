//! Mock hardware for testing without a robot attached

use parking_lot::{Mutex, RwLock};

use super::{Motor, Servo};
use crate::control::MeasuredState;
use crate::Result;

#[derive(Debug, Default, Clone, Copy)]
struct MotorSim {
    position: f64,
    velocity: f64,
    power: f64,
}

/// A motor with a first-order spin-up model
///
/// Velocity relaxes toward `power * max_velocity` with time constant `tau`,
/// a reasonable stand-in for a flywheel fighting its own inertia. Tests that
/// want exact conditions can inject a velocity directly.
#[derive(Debug)]
pub struct MockMotor {
    sim: RwLock<MotorSim>,
    /// Steady-state velocity at full power (ticks/s)
    max_velocity: f64,
    /// Spin-up time constant (s)
    tau: f64,
}

impl MockMotor {
    /// Create a mock with the given free-spin maximum and time constant
    pub fn new(max_velocity: f64, tau: f64) -> Self {
        Self {
            sim: RwLock::new(MotorSim::default()),
            max_velocity,
            tau,
        }
    }

    /// Advance the model by `dt` seconds
    pub fn step(&self, dt: f64) {
        let mut sim = self.sim.write();
        let target = sim.power * self.max_velocity;
        let alpha = (dt / self.tau).min(1.0);
        sim.velocity += (target - sim.velocity) * alpha;
        sim.position += sim.velocity * dt;
    }

    /// Force the measured velocity, bypassing the model
    pub fn set_velocity(&self, velocity: f64) {
        self.sim.write().velocity = velocity;
    }

    /// The most recently applied power
    pub fn power(&self) -> f64 {
        self.sim.read().power
    }
}

impl Default for MockMotor {
    fn default() -> Self {
        // 2000 ticks/s flywheel that spins up in a few hundred ms
        Self::new(2000.0, 0.25)
    }
}

impl Motor for MockMotor {
    fn state(&self) -> MeasuredState {
        let sim = self.sim.read();
        MeasuredState::new(sim.position, sim.velocity)
    }

    fn set_power(&self, power: f64) -> Result<()> {
        self.sim.write().power = power;
        Ok(())
    }
}

/// A servo that records every commanded position
#[derive(Debug, Default)]
pub struct MockServo {
    position: RwLock<f64>,
    history: Mutex<Vec<f64>>,
}

impl MockServo {
    /// Create a mock servo at position 0.0
    pub fn new() -> Self {
        Self::default()
    }

    /// Every position commanded so far, in order
    pub fn history(&self) -> Vec<f64> {
        self.history.lock().clone()
    }
}

impl Servo for MockServo {
    fn set_position(&self, position: f64) -> Result<()> {
        *self.position.write() = position;
        self.history.lock().push(position);
        Ok(())
    }

    fn position(&self) -> f64 {
        *self.position.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motor_spins_up_toward_commanded_speed() {
        let motor = MockMotor::new(2000.0, 0.2);
        motor.set_power(0.5).unwrap();

        for _ in 0..200 {
            motor.step(0.02);
        }
        let v = motor.state().velocity;
        assert!((v - 1000.0).abs() < 1.0, "velocity settled at {v}");
    }

    #[test]
    fn test_motor_velocity_injection() {
        let motor = MockMotor::default();
        motor.set_velocity(1500.0);
        assert_eq!(motor.state().velocity, 1500.0);
    }

    #[test]
    fn test_motor_position_integrates() {
        let motor = MockMotor::new(1000.0, 0.0001); // effectively instant
        motor.set_power(1.0).unwrap();
        for _ in 0..50 {
            motor.step(0.02);
        }
        // ~1 second at ~1000 ticks/s
        let pos = motor.state().position;
        assert!(pos > 900.0 && pos < 1100.0, "position was {pos}");
    }

    #[test]
    fn test_servo_records_history() {
        let servo = MockServo::new();
        servo.set_position(1.0).unwrap();
        servo.set_position(0.0).unwrap();

        assert_eq!(servo.position(), 0.0);
        assert_eq!(servo.history(), vec![1.0, 0.0]);
    }
}
