//! Command groups: sequential, parallel, and race composition

use super::Command;

/// Runs children strictly in order, each one finishing before the next starts
///
/// When a child reports done its successor starts on the same tick, so
/// instant children (a servo position set) consume no ticks and a chain of
/// delays measures only its own holds.
pub struct Sequential<C> {
    commands: Vec<Box<dyn Command<C>>>,
    index: usize,
}

impl<C> Sequential<C> {
    /// Create a group from boxed children
    pub fn new(commands: Vec<Box<dyn Command<C>>>) -> Self {
        Self { commands, index: 0 }
    }

    /// Number of children
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the group has no children
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    // Starts the child at `index`, advancing past any that are already done.
    fn enter(&mut self, ctx: &mut C) {
        while self.index < self.commands.len() {
            let cmd = &mut self.commands[self.index];
            cmd.start(ctx);
            if !cmd.is_done(ctx) {
                return;
            }
            cmd.stop(ctx, false);
            self.index += 1;
        }
    }
}

impl<C> Command<C> for Sequential<C> {
    fn name(&self) -> &str {
        "sequential"
    }

    fn start(&mut self, ctx: &mut C) {
        self.index = 0;
        self.enter(ctx);
    }

    fn update(&mut self, ctx: &mut C, dt: f64) {
        let Some(cmd) = self.commands.get_mut(self.index) else {
            return;
        };
        cmd.update(ctx, dt);
        if cmd.is_done(ctx) {
            cmd.stop(ctx, false);
            self.index += 1;
            self.enter(ctx);
        }
    }

    fn is_done(&self, _ctx: &C) -> bool {
        self.index >= self.commands.len()
    }

    fn stop(&mut self, ctx: &mut C, interrupted: bool) {
        // Finished children were stopped as the group advanced; only a child
        // caught mid-run needs stopping here.
        if interrupted {
            if let Some(cmd) = self.commands.get_mut(self.index) {
                cmd.stop(ctx, true);
            }
        }
    }
}

/// Runs children together; done when every child is done
pub struct Parallel<C> {
    commands: Vec<Box<dyn Command<C>>>,
    done: Vec<bool>,
}

impl<C> Parallel<C> {
    /// Create a group from boxed children
    pub fn new(commands: Vec<Box<dyn Command<C>>>) -> Self {
        let done = vec![false; commands.len()];
        Self { commands, done }
    }
}

impl<C> Command<C> for Parallel<C> {
    fn name(&self) -> &str {
        "parallel"
    }

    fn start(&mut self, ctx: &mut C) {
        self.done.iter_mut().for_each(|d| *d = false);
        for cmd in &mut self.commands {
            cmd.start(ctx);
        }
    }

    fn update(&mut self, ctx: &mut C, dt: f64) {
        for (i, cmd) in self.commands.iter_mut().enumerate() {
            if self.done[i] {
                continue;
            }
            cmd.update(ctx, dt);
            if cmd.is_done(ctx) {
                cmd.stop(ctx, false);
                self.done[i] = true;
            }
        }
    }

    fn is_done(&self, _ctx: &C) -> bool {
        self.done.iter().all(|&d| d)
    }

    fn stop(&mut self, ctx: &mut C, interrupted: bool) {
        for (i, cmd) in self.commands.iter_mut().enumerate() {
            if !self.done[i] {
                cmd.stop(ctx, interrupted);
            }
        }
    }
}

/// Runs children together; done as soon as the first child finishes
///
/// The losers are stopped with `interrupted = true` when the group itself is
/// stopped. This is how a timeout wraps a condition: race the condition
/// against a [`Delay`](super::Delay), and whichever fires first wins.
pub struct Race<C> {
    commands: Vec<Box<dyn Command<C>>>,
    winner: Option<usize>,
}

impl<C> Race<C> {
    /// Create a group from boxed children
    pub fn new(commands: Vec<Box<dyn Command<C>>>) -> Self {
        Self {
            commands,
            winner: None,
        }
    }

    /// Index of the child that finished first, if the race is over
    pub fn winner(&self) -> Option<usize> {
        self.winner
    }
}

impl<C> Command<C> for Race<C> {
    fn name(&self) -> &str {
        "race"
    }

    fn start(&mut self, ctx: &mut C) {
        self.winner = None;
        for cmd in &mut self.commands {
            cmd.start(ctx);
        }
    }

    fn update(&mut self, ctx: &mut C, dt: f64) {
        if self.winner.is_some() {
            return;
        }
        for (i, cmd) in self.commands.iter_mut().enumerate() {
            cmd.update(ctx, dt);
            if self.winner.is_none() && cmd.is_done(ctx) {
                self.winner = Some(i);
            }
        }
    }

    fn is_done(&self, _ctx: &C) -> bool {
        self.winner.is_some()
    }

    fn stop(&mut self, ctx: &mut C, interrupted: bool) {
        for (i, cmd) in self.commands.iter_mut().enumerate() {
            let lost = self.winner != Some(i);
            cmd.stop(ctx, interrupted || lost);
        }
    }
}
