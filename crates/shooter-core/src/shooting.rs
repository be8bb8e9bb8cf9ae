//! The shoot sequence
//!
//! Composes the subsystems into the full cycle: spin the flywheel up (with a
//! timeout so a dead wheel cannot wedge the robot), feed three balls while
//! holding speed, then spin down.

use serde::{Deserialize, Serialize};

use crate::command::{Command, Delay, FnCommand, Parallel, Race, Sequential};
use crate::subsystems::{Flywheel, Intake, PusherConfig, Pushers};
use crate::Result;

/// Everything the shoot commands touch
///
/// Explicitly constructed and owned by the caller; commands receive it by
/// reference each tick.
pub struct Shooter {
    pub flywheel: Flywheel,
    pub pushers: Pushers,
    pub intake: Intake,
}

impl Shooter {
    /// Assemble the shooter from its subsystems
    pub fn new(flywheel: Flywheel, pushers: Pushers, intake: Intake) -> Self {
        Self {
            flywheel,
            pushers,
            intake,
        }
    }

    /// Run one control tick across the subsystems
    ///
    /// Call after the command runner's tick, so the control law sees the
    /// freshest goals.
    pub fn periodic(&mut self, dt: f64) -> Result<()> {
        self.flywheel.periodic(dt)
    }

    /// Build the shoot sequence using this shooter's pusher timing
    pub fn shoot_command(&self, config: &ShootConfig) -> Sequential<Shooter> {
        shoot(config, self.pushers.config())
    }
}

/// Tunables for the shoot cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShootConfig {
    /// Flywheel velocity to shoot at (ticks/s)
    pub shoot_velocity: f64,
    /// Give up waiting for the wheel after this many seconds
    pub spin_up_timeout: f64,
    /// Balls fed per cycle
    pub pulse_count: u32,
}

impl Default for ShootConfig {
    fn default() -> Self {
        Self {
            shoot_velocity: 1000.0,
            spin_up_timeout: 2.0,
            pulse_count: 3,
        }
    }
}

impl ShootConfig {
    /// Set the shoot velocity
    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.shoot_velocity = velocity;
        self
    }

    /// Set the spin-up timeout
    pub fn with_spin_up_timeout(mut self, seconds: f64) -> Self {
        self.spin_up_timeout = seconds;
        self
    }

    /// Set the number of balls fed per cycle
    pub fn with_pulse_count(mut self, count: u32) -> Self {
        self.pulse_count = count;
        self
    }
}

/// Run the flywheel toward `velocity`; done once it is at speed
pub fn spin_up(velocity: f64) -> FnCommand<Shooter> {
    FnCommand::new(format!("spin_up({velocity})"))
        .with_start(move |ctx: &mut Shooter| ctx.flywheel.set_goal(velocity))
        .with_done(move |ctx: &Shooter| ctx.flywheel.is_at_speed_for(velocity))
}

/// Hold the flywheel at `velocity` until interrupted
pub fn hold_at(velocity: f64) -> FnCommand<Shooter> {
    FnCommand::new(format!("hold_at({velocity})"))
        .with_start(move |ctx: &mut Shooter| ctx.flywheel.set_goal(velocity))
        .with_done(|_: &Shooter| false)
}

/// Set the flywheel goal to zero; finishes immediately
///
/// The wheel coasts down under the control law. For an instant power cut see
/// [`emergency_stop`].
pub fn stop_flywheel() -> FnCommand<Shooter> {
    FnCommand::new("stop_flywheel").with_start(|ctx: &mut Shooter| ctx.flywheel.stop())
}

fn extend_pushers() -> FnCommand<Shooter> {
    FnCommand::new("extend_pushers").with_start(|ctx: &mut Shooter| {
        if let Err(e) = ctx.pushers.extend() {
            tracing::warn!("pusher extend failed: {e}");
        }
    })
}

fn retract_pushers() -> FnCommand<Shooter> {
    FnCommand::new("retract_pushers").with_start(|ctx: &mut Shooter| {
        if let Err(e) = ctx.pushers.retract() {
            tracing::warn!("pusher retract failed: {e}");
        }
    })
}

/// Feed one ball: extend, hold, retract, hold
pub fn push_once(config: &PusherConfig) -> Sequential<Shooter> {
    Sequential::new(vec![
        Box::new(extend_pushers()),
        Box::new(Delay::new(config.extend_hold)),
        Box::new(retract_pushers()),
        Box::new(Delay::new(config.retract_hold)),
    ])
}

/// The full shoot cycle
///
/// 1. Spin up, racing the at-speed check against the timeout - whichever
///    fires first advances the sequence.
/// 2. Feed `pulse_count` balls in strict order while holding shoot speed.
/// 3. Set the goal back to zero.
pub fn shoot(config: &ShootConfig, pushers: &PusherConfig) -> Sequential<Shooter> {
    let pulses: Vec<Box<dyn Command<Shooter>>> = (0..config.pulse_count)
        .map(|_| Box::new(push_once(pushers)) as Box<dyn Command<Shooter>>)
        .collect();

    Sequential::new(vec![
        Box::new(spin_up(config.shoot_velocity).end_after(config.spin_up_timeout)),
        Box::new(Race::new(vec![
            Box::new(hold_at(config.shoot_velocity)),
            Box::new(Sequential::new(pulses)),
        ])),
        Box::new(stop_flywheel()),
    ])
}

/// Bring everything to a safe state immediately
///
/// Hard-halts the flywheel (power cut, not a goal change), stops the intake,
/// and retracts the pushers, all in the same tick. Hardware errors are logged
/// rather than propagated - there is nothing useful to do with them mid-stop.
pub fn emergency_stop() -> Parallel<Shooter> {
    let halt_flywheel = FnCommand::new("halt_flywheel").with_start(|ctx: &mut Shooter| {
        if let Err(e) = ctx.flywheel.halt() {
            tracing::warn!("flywheel halt failed: {e}");
        }
    });
    let intake_off = FnCommand::new("intake_off").with_start(|ctx: &mut Shooter| {
        if let Err(e) = ctx.intake.turn_off() {
            tracing::warn!("intake off failed: {e}");
        }
    });

    Parallel::new(vec![
        Box::new(halt_flywheel),
        Box::new(intake_off),
        Box::new(retract_pushers()),
    ])
}
