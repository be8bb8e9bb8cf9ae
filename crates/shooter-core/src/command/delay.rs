//! Delay command
//!
//! Timeouts and holds live here, in the sequencing layer; the velocity
//! controller itself has no notion of time beyond `dt`.

use super::Command;

/// Does nothing for a fixed duration
///
/// Accumulates the `dt` handed to each `update`, so it tracks whatever clock
/// drives the ticks - real time under a host loop, simulated time in tests.
pub struct Delay {
    name: String,
    duration: f64,
    elapsed: f64,
}

impl Delay {
    /// Create a delay of `seconds`
    pub fn new(seconds: f64) -> Self {
        Self {
            name: format!("delay({seconds}s)"),
            duration: seconds.max(0.0),
            elapsed: 0.0,
        }
    }

    /// Time accumulated since the delay started
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

impl<C> Command<C> for Delay {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&mut self, _ctx: &mut C) {
        self.elapsed = 0.0;
    }

    fn update(&mut self, _ctx: &mut C, dt: f64) {
        self.elapsed += dt;
    }

    fn is_done(&self, _ctx: &C) -> bool {
        self.elapsed >= self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_counts_ticks() {
        let mut delay = Delay::new(0.5);
        let mut ctx = ();
        delay.start(&mut ctx);

        for _ in 0..4 {
            delay.update(&mut ctx, 0.1);
            assert!(!Command::<()>::is_done(&delay, &ctx));
        }
        delay.update(&mut ctx, 0.1);
        assert!(Command::<()>::is_done(&delay, &ctx));
    }

    #[test]
    fn test_zero_delay_is_instant() {
        let mut delay = Delay::new(0.0);
        let mut ctx = ();
        delay.start(&mut ctx);
        assert!(Command::<()>::is_done(&delay, &ctx));
    }

    #[test]
    fn test_restart_resets_elapsed() {
        let mut delay = Delay::new(0.2);
        let mut ctx = ();
        delay.start(&mut ctx);
        delay.update(&mut ctx, 0.2);
        assert!(Command::<()>::is_done(&delay, &ctx));

        delay.start(&mut ctx);
        assert!(!Command::<()>::is_done(&delay, &ctx));
    }
}
