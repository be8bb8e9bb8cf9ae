//! Command runner
//!
//! Owns at most one active command and drives its lifecycle from the control
//! tick. Scheduling a new command interrupts whatever was running.

use super::Command;

/// Drives one command at a time through start / update / is_done / stop
///
/// # Example
/// ```
/// use shooter_core::command::{CommandRunner, Delay};
///
/// let mut runner: CommandRunner<()> = CommandRunner::new();
/// runner.schedule(&mut (), Delay::new(0.2));
///
/// // two ticks of 0.1s: still running after the first, done after the second
/// assert!(runner.tick(&mut (), 0.1));
/// assert!(!runner.tick(&mut (), 0.1));
/// ```
pub struct CommandRunner<C> {
    active: Option<Box<dyn Command<C>>>,
    started: bool,
}

impl<C> CommandRunner<C> {
    /// Create an idle runner
    pub fn new() -> Self {
        Self {
            active: None,
            started: false,
        }
    }

    /// Whether a command is currently scheduled
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Name of the active command, if any
    pub fn active_name(&self) -> Option<&str> {
        self.active.as_deref().map(|c| c.name())
    }

    /// Schedule a command, interrupting the one already running
    pub fn schedule(&mut self, ctx: &mut C, command: impl Command<C> + 'static) {
        self.cancel(ctx);
        tracing::debug!("scheduling command: {}", command.name());
        self.active = Some(Box::new(command));
        self.started = false;
    }

    /// Stop the active command with `interrupted = true`
    pub fn cancel(&mut self, ctx: &mut C) {
        if let Some(mut old) = self.active.take() {
            if self.started {
                old.stop(ctx, true);
            }
            tracing::debug!("command interrupted: {}", old.name());
        }
        self.started = false;
    }

    /// Advance the active command by one tick
    ///
    /// Starts the command on its first tick, then updates it and polls
    /// completion. Returns `true` while a command is still running.
    pub fn tick(&mut self, ctx: &mut C, dt: f64) -> bool {
        let Some(cmd) = self.active.as_deref_mut() else {
            return false;
        };

        if !self.started {
            cmd.start(ctx);
            self.started = true;
        }
        cmd.update(ctx, dt);

        if cmd.is_done(ctx) {
            cmd.stop(ctx, false);
            tracing::debug!("command finished: {}", cmd.name());
            self.active = None;
            self.started = false;
            return false;
        }
        true
    }
}

impl<C> Default for CommandRunner<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Delay, FnCommand};
    use super::*;

    #[derive(Default)]
    struct Ctx {
        starts: u32,
        stops: Vec<bool>,
    }

    fn tracked(done: bool) -> FnCommand<Ctx> {
        FnCommand::new("tracked")
            .with_start(|ctx: &mut Ctx| ctx.starts += 1)
            .with_done(move |_: &Ctx| done)
            .with_stop(|ctx: &mut Ctx, interrupted| ctx.stops.push(interrupted))
    }

    #[test]
    fn test_runs_command_to_completion() {
        let mut runner = CommandRunner::new();
        let mut ctx = Ctx::default();

        runner.schedule(&mut ctx, tracked(true));
        assert!(runner.is_running());

        // instant command: one tick starts, updates, and finishes it
        assert!(!runner.tick(&mut ctx, 0.02));
        assert!(!runner.is_running());
        assert_eq!(ctx.starts, 1);
        assert_eq!(ctx.stops, vec![false]);
    }

    #[test]
    fn test_start_runs_once() {
        let mut runner = CommandRunner::new();
        let mut ctx = Ctx::default();

        runner.schedule(&mut ctx, tracked(false));
        for _ in 0..5 {
            assert!(runner.tick(&mut ctx, 0.02));
        }
        assert_eq!(ctx.starts, 1);
    }

    #[test]
    fn test_schedule_interrupts_running_command() {
        let mut runner = CommandRunner::new();
        let mut ctx = Ctx::default();

        runner.schedule(&mut ctx, tracked(false));
        runner.tick(&mut ctx, 0.02);

        runner.schedule(&mut ctx, Delay::new(1.0));
        assert_eq!(ctx.stops, vec![true]);
        assert_eq!(runner.active_name(), Some("delay(1s)"));
    }

    #[test]
    fn test_replacing_unstarted_command_skips_stop() {
        let mut runner = CommandRunner::new();
        let mut ctx = Ctx::default();

        runner.schedule(&mut ctx, tracked(false));
        // never ticked, so no start and no interrupted stop
        runner.schedule(&mut ctx, tracked(true));
        assert_eq!(ctx.starts, 0);
        assert!(ctx.stops.is_empty());
    }

    #[test]
    fn test_idle_tick_is_a_noop() {
        let mut runner: CommandRunner<Ctx> = CommandRunner::new();
        let mut ctx = Ctx::default();
        assert!(!runner.tick(&mut ctx, 0.02));
    }
}
