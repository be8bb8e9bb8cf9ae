//! Commands and combinators for sequencing robot actions
//!
//! A command is a three-phase state machine - not started, running, done -
//! driven by a runner that calls [`Command::start`] once, then
//! [`Command::update`] and [`Command::is_done`] once per tick, and finally
//! [`Command::stop`]. Commands are generic over a context `C` (the robot's
//! subsystems) handed in by the runner each tick, so a command owns no
//! hardware itself.

mod delay;
mod groups;
mod runner;

pub use delay::Delay;
pub use groups::{Parallel, Race, Sequential};
pub use runner::CommandRunner;

/// A discrete unit of robot behavior, polled once per tick
pub trait Command<C>: Send {
    /// Name for logging
    fn name(&self) -> &str {
        "command"
    }

    /// Called once when the command begins running
    fn start(&mut self, _ctx: &mut C) {}

    /// Called every tick while the command is running
    ///
    /// Keep this cheap; it runs inside the control tick.
    fn update(&mut self, _ctx: &mut C, _dt: f64) {}

    /// Whether the command has finished. Polled once per tick, after
    /// `update`. Must not mutate anything.
    fn is_done(&self, ctx: &C) -> bool;

    /// Called once when the command finishes or is interrupted
    fn stop(&mut self, _ctx: &mut C, _interrupted: bool) {}

    /// Run this command, then `next`
    fn then<D>(self, next: D) -> Sequential<C>
    where
        Self: Sized + 'static,
        D: Command<C> + 'static,
    {
        Sequential::new(vec![Box::new(self), Box::new(next)])
    }

    /// Run this command and `other` together; done when both are
    fn along_with<D>(self, other: D) -> Parallel<C>
    where
        Self: Sized + 'static,
        D: Command<C> + 'static,
    {
        Parallel::new(vec![Box::new(self), Box::new(other)])
    }

    /// Race this command against `other`; the loser is interrupted
    fn race_with<D>(self, other: D) -> Race<C>
    where
        Self: Sized + 'static,
        D: Command<C> + 'static,
    {
        Race::new(vec![Box::new(self), Box::new(other)])
    }

    /// Race this command against a timeout, in seconds
    fn end_after(self, seconds: f64) -> Race<C>
    where
        Self: Sized + 'static,
        C: 'static,
    {
        self.race_with(Delay::new(seconds))
    }
}

type StartFn<C> = Box<dyn FnMut(&mut C) + Send>;
type UpdateFn<C> = Box<dyn FnMut(&mut C, f64) + Send>;
type DoneFn<C> = Box<dyn Fn(&C) -> bool + Send>;
type StopFn<C> = Box<dyn FnMut(&mut C, bool) + Send>;

/// A command built from closures
///
/// Without a completion closure the command finishes on the tick it starts,
/// which is exactly what one-shot actions like a servo position set want.
///
/// # Example
/// ```
/// use shooter_core::command::FnCommand;
///
/// struct Ctx { goal: f64, velocity: f64 }
///
/// let spin_up = FnCommand::new("spin_up(1500)")
///     .with_start(|ctx: &mut Ctx| ctx.goal = 1500.0)
///     .with_done(|ctx: &Ctx| (ctx.velocity - 1500.0).abs() <= 50.0);
/// ```
pub struct FnCommand<C> {
    name: String,
    start: Option<StartFn<C>>,
    update: Option<UpdateFn<C>>,
    done: Option<DoneFn<C>>,
    stop: Option<StopFn<C>>,
}

impl<C> FnCommand<C> {
    /// Create a named command with no behavior
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: None,
            update: None,
            done: None,
            stop: None,
        }
    }

    /// Set the start callback
    pub fn with_start<F: FnMut(&mut C) + Send + 'static>(mut self, f: F) -> Self {
        self.start = Some(Box::new(f));
        self
    }

    /// Set the per-tick update callback
    pub fn with_update<F: FnMut(&mut C, f64) + Send + 'static>(mut self, f: F) -> Self {
        self.update = Some(Box::new(f));
        self
    }

    /// Set the completion predicate
    pub fn with_done<F: Fn(&C) -> bool + Send + 'static>(mut self, f: F) -> Self {
        self.done = Some(Box::new(f));
        self
    }

    /// Set the stop callback
    pub fn with_stop<F: FnMut(&mut C, bool) + Send + 'static>(mut self, f: F) -> Self {
        self.stop = Some(Box::new(f));
        self
    }
}

impl<C> Command<C> for FnCommand<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&mut self, ctx: &mut C) {
        if let Some(ref mut f) = self.start {
            f(ctx);
        }
    }

    fn update(&mut self, ctx: &mut C, dt: f64) {
        if let Some(ref mut f) = self.update {
            f(ctx, dt);
        }
    }

    fn is_done(&self, ctx: &C) -> bool {
        match self.done {
            Some(ref f) => f(ctx),
            None => true,
        }
    }

    fn stop(&mut self, ctx: &mut C, interrupted: bool) {
        if let Some(ref mut f) = self.stop {
            f(ctx, interrupted);
        }
    }
}
