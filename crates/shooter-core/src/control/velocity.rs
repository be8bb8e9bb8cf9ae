//! Flywheel velocity controller
//!
//! Velocity feedforward plus PI feedback on velocity error, with a tolerance
//! band that sequencing logic polls to decide when the wheel is up to speed.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Gains for the velocity control law
///
/// All three default to zero, the untuned state. Zero gains produce zero
/// output; each term is independently disabled by zeroing its gain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VelocityGains {
    /// Velocity feedforward gain (power per tick/s of goal)
    pub kv: f64,
    /// Proportional gain on velocity error
    pub kp: f64,
    /// Integral gain on accumulated velocity error
    pub ki: f64,
}

impl VelocityGains {
    /// Create gains with the given coefficients
    pub fn new(kv: f64, kp: f64, ki: f64) -> Self {
        Self { kv, kp, ki }
    }

    /// Feedforward-only gains
    pub fn feedforward(kv: f64) -> Self {
        Self::new(kv, 0.0, 0.0)
    }

    /// Derive a feedforward gain from a measured free-spin maximum
    ///
    /// With `kv = 1 / max_velocity`, commanding the maximum velocity maps to
    /// full power. Standard first step when tuning: measure the top speed at
    /// power 1.0, then add feedback on top.
    pub fn from_max_velocity(max_velocity: f64) -> Result<Self> {
        if !max_velocity.is_finite() || max_velocity <= 0.0 {
            return Err(Error::Config(format!(
                "max_velocity must be finite and positive, got {max_velocity}"
            )));
        }
        Ok(Self::feedforward(1.0 / max_velocity))
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [("kv", self.kv), ("kp", self.kp), ("ki", self.ki)] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!(
                    "gain {name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Configuration for a [`VelocityController`]
///
/// # Example
/// ```
/// use shooter_core::control::{VelocityConfig, VelocityGains};
///
/// let config = VelocityConfig::new(VelocityGains::new(0.0005, 0.001, 0.0))
///     .with_tolerance(50.0)
///     .with_integral_limit(500.0);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VelocityConfig {
    /// Control law gains
    pub gains: VelocityGains,
    /// Completion band half-width (ticks/s); [`VelocityController::is_at_speed`]
    /// is true within `goal ± tolerance`, boundary inclusive
    pub tolerance: f64,
    /// Output minimum limit
    pub output_min: f64,
    /// Output maximum limit
    pub output_max: f64,
    /// Integral windup limit (f64::INFINITY for no limit)
    pub integral_limit: f64,
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            gains: VelocityGains::default(),
            tolerance: 50.0,
            output_min: -1.0,
            output_max: 1.0,
            integral_limit: f64::INFINITY,
        }
    }
}

impl VelocityConfig {
    /// Create a config with the given gains and default limits
    pub fn new(gains: VelocityGains) -> Self {
        Self {
            gains,
            ..Default::default()
        }
    }

    /// Set the completion band half-width
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set output limits
    pub fn with_limits(mut self, min: f64, max: f64) -> Self {
        self.output_min = min;
        self.output_max = max;
        self
    }

    /// Set the integral windup limit
    pub fn with_integral_limit(mut self, limit: f64) -> Self {
        self.integral_limit = limit;
        self
    }

    fn validate(&self) -> Result<()> {
        self.gains.validate()?;
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(Error::Config(format!(
                "tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        if !(self.output_min < self.output_max) {
            return Err(Error::Config(format!(
                "output limits inverted: [{}, {}]",
                self.output_min, self.output_max
            )));
        }
        if self.integral_limit.is_nan() || self.integral_limit < 0.0 {
            return Err(Error::Config(format!(
                "integral_limit must be non-negative, got {}",
                self.integral_limit
            )));
        }
        Ok(())
    }
}

/// Position and velocity sampled from the motor each tick
///
/// Ephemeral - produced by the hardware seam every tick and consumed by the
/// controller; nothing holds on to it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasuredState {
    /// Encoder position (ticks)
    pub position: f64,
    /// Velocity (ticks/s)
    pub velocity: f64,
}

impl MeasuredState {
    /// Create a measured state
    pub fn new(position: f64, velocity: f64) -> Self {
        Self { position, velocity }
    }

    /// Whether both components are finite
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }
}

/// Velocity controller for the flywheel
///
/// Holds a goal velocity and computes the actuation power that drives the
/// measured velocity toward it, once per tick:
///
/// ```text
/// error  = goal - measured.velocity
/// output = kv * goal + kp * error + ki * integral    (clamped)
/// ```
///
/// The goal changes only through [`set_goal`](Self::set_goal); the compute
/// step never mutates it.
///
/// # Example
/// ```
/// use shooter_core::control::{MeasuredState, VelocityConfig, VelocityController, VelocityGains};
///
/// let config = VelocityConfig::new(VelocityGains::feedforward(0.0005));
/// let mut controller = VelocityController::new(config).unwrap();
///
/// controller.set_goal(1500.0);
/// let power = controller.update(MeasuredState::new(0.0, 1500.0), 0.02).unwrap();
/// assert!((power - 0.75).abs() < 1e-12);
/// assert!(controller.is_at_speed(MeasuredState::new(0.0, 1500.0)));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct VelocityController {
    config: VelocityConfig,
    goal: f64,
    integral: f64,
    last_output: f64,
}

impl VelocityController {
    /// Create a controller, validating the configuration
    pub fn new(config: VelocityConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            goal: 0.0,
            integral: 0.0,
            last_output: 0.0,
        })
    }

    /// Set the goal velocity (ticks/s)
    ///
    /// Callable at any time, including between `update` calls from sequencing
    /// logic reacting to external events. Changing to a different goal clears
    /// the integral accumulator so windup earned chasing the old setpoint does
    /// not distort the response to the new one.
    pub fn set_goal(&mut self, velocity: f64) {
        if velocity != self.goal {
            self.integral = 0.0;
        }
        self.goal = velocity;
    }

    /// Get the current goal velocity
    pub fn goal(&self) -> f64 {
        self.goal
    }

    /// Set the goal to zero
    ///
    /// A goal change, not an immediate halt: feedback may command nonzero
    /// power for a few ticks while the measurement settles. For immediate
    /// zero power see `Flywheel::halt`.
    pub fn stop(&mut self) {
        self.set_goal(0.0);
    }

    /// Compute the actuation power for this tick
    ///
    /// Call exactly once per control tick. Rejects non-finite measurements
    /// rather than letting NaN reach the actuator. The only state mutated is
    /// the integral accumulator.
    ///
    /// # Arguments
    /// * `measured` - state sampled from the motor this tick
    /// * `dt` - time since the previous tick, in seconds
    pub fn update(&mut self, measured: MeasuredState, dt: f64) -> Result<f64> {
        if !measured.is_finite() {
            return Err(Error::Measurement(format!(
                "non-finite sample: position={}, velocity={}",
                measured.position, measured.velocity
            )));
        }
        debug_assert!(dt >= 0.0);

        let gains = self.config.gains;
        let error = self.goal - measured.velocity;

        self.integral = (self.integral + error * dt)
            .clamp(-self.config.integral_limit, self.config.integral_limit);

        let output = (gains.kv * self.goal + gains.kp * error + gains.ki * self.integral)
            .clamp(self.config.output_min, self.config.output_max);

        self.last_output = output;
        Ok(output)
    }

    /// Whether the measured velocity is within tolerance of the current goal
    ///
    /// Pure - no side effects. Boundary inclusive.
    pub fn is_at_speed(&self, measured: MeasuredState) -> bool {
        self.is_at_speed_for(measured, self.goal)
    }

    /// Whether the measured velocity is within tolerance of an explicit target
    ///
    /// Used when a sequencer wants readiness for a velocity other than the one
    /// currently being held.
    pub fn is_at_speed_for(&self, measured: MeasuredState, target: f64) -> bool {
        (measured.velocity - target).abs() <= self.config.tolerance
    }

    /// Clear accumulated state (integral and last output)
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.last_output = 0.0;
    }

    /// The power computed by the most recent `update`
    pub fn last_output(&self) -> f64 {
        self.last_output
    }

    /// Get the configuration
    pub fn config(&self) -> &VelocityConfig {
        &self.config
    }

    /// Replace the gains
    ///
    /// For offline tuning between control epochs, never concurrently with a
    /// running loop iteration.
    pub fn set_gains(&mut self, gains: VelocityGains) -> Result<()> {
        gains.validate()?;
        self.config.gains = gains;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn controller(gains: VelocityGains) -> VelocityController {
        VelocityController::new(VelocityConfig::new(gains)).unwrap()
    }

    #[test]
    fn test_feedforward_output() {
        // kV = 0.0005, goal = 1500 -> power = 0.75 regardless of dt
        let mut c = controller(VelocityGains::feedforward(0.0005));
        c.set_goal(1500.0);
        let power = c.update(MeasuredState::new(0.0, 1500.0), 0.02).unwrap();
        assert_relative_eq!(power, 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_output_clamped() {
        let mut c = controller(VelocityGains::new(0.01, 0.5, 0.0));
        c.set_goal(5000.0);
        let power = c.update(MeasuredState::new(0.0, 0.0), 0.02).unwrap();
        assert_relative_eq!(power, 1.0);

        c.set_goal(-5000.0);
        let power = c.update(MeasuredState::new(0.0, 0.0), 0.02).unwrap();
        assert_relative_eq!(power, -1.0);
    }

    #[test]
    fn test_tolerance_band_inclusive() {
        let mut c = controller(VelocityGains::default());
        c.set_goal(1000.0);

        assert!(c.is_at_speed(MeasuredState::new(0.0, 1049.0)));
        assert!(c.is_at_speed(MeasuredState::new(0.0, 1050.0))); // exactly on the edge
        assert!(!c.is_at_speed(MeasuredState::new(0.0, 1051.0)));
        assert!(c.is_at_speed(MeasuredState::new(0.0, 951.0)));
        assert!(!c.is_at_speed(MeasuredState::new(0.0, 949.0)));
    }

    #[test]
    fn test_at_speed_for_explicit_target() {
        let c = controller(VelocityGains::default());
        // goal is still 0; readiness checked against a different target
        assert!(c.is_at_speed_for(MeasuredState::new(0.0, 1480.0), 1500.0));
        assert!(!c.is_at_speed_for(MeasuredState::new(0.0, 1400.0), 1500.0));
    }

    #[test]
    fn test_stop_drives_output_down() {
        let mut c = controller(VelocityGains::new(0.0005, 0.0002, 0.0));
        c.set_goal(1500.0);
        c.update(MeasuredState::new(0.0, 1500.0), 0.02).unwrap();

        c.stop();
        assert_eq!(c.goal(), 0.0);

        // Measured velocity converging to zero: each output magnitude shrinks
        let mut prev = f64::INFINITY;
        for v in [1500.0, 900.0, 400.0, 100.0, 10.0, 0.0] {
            let power = c.update(MeasuredState::new(0.0, v), 0.02).unwrap();
            assert!(power.abs() <= prev);
            prev = power.abs();
        }
        assert_relative_eq!(prev, 0.0);
    }

    #[test]
    fn test_integral_accumulates_and_clamps() {
        let config = VelocityConfig::new(VelocityGains::new(0.0, 0.0, 1.0))
            .with_integral_limit(5.0)
            .with_limits(-100.0, 100.0);
        let mut c = VelocityController::new(config).unwrap();
        c.set_goal(10.0);

        // error = 10, dt = 0.1 -> integral grows 1.0 per tick up to the limit
        let p1 = c.update(MeasuredState::new(0.0, 0.0), 0.1).unwrap();
        assert_relative_eq!(p1, 1.0, epsilon = 1e-12);
        for _ in 0..100 {
            c.update(MeasuredState::new(0.0, 0.0), 0.1).unwrap();
        }
        let p = c.update(MeasuredState::new(0.0, 0.0), 0.1).unwrap();
        assert_relative_eq!(p, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_goal_change_resets_integral() {
        let config = VelocityConfig::new(VelocityGains::new(0.0, 0.0, 1.0))
            .with_limits(-100.0, 100.0);
        let mut c = VelocityController::new(config).unwrap();
        c.set_goal(100.0);
        c.update(MeasuredState::new(0.0, 0.0), 0.1).unwrap();
        c.update(MeasuredState::new(0.0, 0.0), 0.1).unwrap();

        c.set_goal(200.0);
        // first tick after the change sees only this tick's error, not the
        // 20.0 accumulated chasing the old goal
        let p = c.update(MeasuredState::new(0.0, 0.0), 0.1).unwrap();
        assert_relative_eq!(p, 20.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_non_finite_measurement() {
        let mut c = controller(VelocityGains::feedforward(0.0005));
        c.set_goal(1000.0);
        assert!(c.update(MeasuredState::new(0.0, f64::NAN), 0.02).is_err());
        assert!(c
            .update(MeasuredState::new(f64::INFINITY, 0.0), 0.02)
            .is_err());
        // a failed update leaves last_output untouched
        assert_relative_eq!(c.last_output(), 0.0);
    }

    #[test]
    fn test_rejects_bad_config() {
        assert!(VelocityController::new(
            VelocityConfig::new(VelocityGains::new(-0.1, 0.0, 0.0))
        )
        .is_err());
        assert!(
            VelocityController::new(VelocityConfig::default().with_tolerance(-1.0)).is_err()
        );
        assert!(
            VelocityController::new(VelocityConfig::default().with_limits(1.0, -1.0)).is_err()
        );
    }

    #[test]
    fn test_kv_from_max_velocity() {
        let gains = VelocityGains::from_max_velocity(2000.0).unwrap();
        assert_relative_eq!(gains.kv, 0.0005);
        assert!(VelocityGains::from_max_velocity(0.0).is_err());
        assert!(VelocityGains::from_max_velocity(f64::NAN).is_err());
    }
}
