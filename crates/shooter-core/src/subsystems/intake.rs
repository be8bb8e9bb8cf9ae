//! Intake subsystem
//!
//! The roller that pulls balls off the floor. Runs open-loop at a fixed
//! power; no velocity regulation needed.

use crate::hardware::Motor;
use crate::{Error, Result};

/// The intake roller
pub struct Intake {
    motor: Box<dyn Motor>,
    run_power: f64,
    running: bool,
}

impl Intake {
    /// Create an intake that runs at `run_power` when on
    pub fn new(motor: Box<dyn Motor>, run_power: f64) -> Result<Self> {
        if !run_power.is_finite() || !(-1.0..=1.0).contains(&run_power) {
            return Err(Error::Config(format!(
                "run_power must be in [-1, 1], got {run_power}"
            )));
        }
        Ok(Self {
            motor,
            run_power,
            running: false,
        })
    }

    /// Start the roller
    pub fn turn_on(&mut self) -> Result<()> {
        self.motor.set_power(self.run_power)?;
        self.running = true;
        Ok(())
    }

    /// Stop the roller
    pub fn turn_off(&mut self) -> Result<()> {
        self.motor.set_power(0.0)?;
        self.running = false;
        Ok(())
    }

    /// Whether the roller is currently commanded on
    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::MockMotor;
    use std::sync::Arc;

    #[test]
    fn test_on_off() {
        let motor = Arc::new(MockMotor::default());
        let mut intake = Intake::new(Box::new(motor.clone()), 0.8).unwrap();

        intake.turn_on().unwrap();
        assert!(intake.is_running());
        assert_eq!(motor.power(), 0.8);

        intake.turn_off().unwrap();
        assert!(!intake.is_running());
        assert_eq!(motor.power(), 0.0);
    }

    #[test]
    fn test_rejects_out_of_range_power() {
        let motor = Arc::new(MockMotor::default());
        assert!(Intake::new(Box::new(motor), 1.5).is_err());
    }
}
