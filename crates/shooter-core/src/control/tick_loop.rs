//! Fixed-rate tick loop
//!
//! In production the host runtime drives the robot; this loop exists for
//! bench rigs, tuning sessions, and tests that need a steady cadence without
//! a host attached.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::{Error, Result};

/// Configuration for a tick loop
#[derive(Debug, Clone)]
pub struct TickLoopConfig {
    /// Target rate in Hz
    pub rate_hz: f64,
    /// Name for logging
    pub name: Arc<str>,
    /// Warn when a tick overruns its period
    pub warn_on_overrun: bool,
}

impl Default for TickLoopConfig {
    fn default() -> Self {
        Self {
            rate_hz: 50.0,
            name: "tick_loop".into(),
            warn_on_overrun: true,
        }
    }
}

impl TickLoopConfig {
    /// Create a config with the given rate
    pub fn new(rate_hz: f64) -> Self {
        Self {
            rate_hz,
            ..Default::default()
        }
    }

    /// Set the loop name
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Get the target period
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.rate_hz)
    }
}

/// Timing statistics for a tick loop
#[derive(Debug, Clone, Copy, Default)]
pub struct TickStats {
    /// Number of completed ticks
    pub ticks: u64,
    /// Ticks whose execution exceeded the target period
    pub overruns: u64,
    /// Total execution time across all ticks
    pub total_execution_time: Duration,
    /// Worst single tick
    pub max_tick_time: Duration,
}

impl TickStats {
    fn record(&mut self, execution_time: Duration, period: Duration) {
        self.ticks += 1;
        self.total_execution_time += execution_time;
        self.max_tick_time = self.max_tick_time.max(execution_time);
        if execution_time > period {
            self.overruns += 1;
        }
    }

    /// Average tick execution time
    pub fn avg_tick_time(&self) -> Duration {
        if self.ticks == 0 {
            Duration::ZERO
        } else {
            self.total_execution_time.div_f64(self.ticks as f64)
        }
    }

    /// Fraction of ticks that overran (0.0 to 1.0)
    pub fn overrun_ratio(&self) -> f64 {
        if self.ticks == 0 {
            0.0
        } else {
            self.overruns as f64 / self.ticks as f64
        }
    }
}

/// Handle to a spawned tick loop
pub struct TickLoopHandle {
    running: Arc<AtomicBool>,
    stats: Arc<Mutex<TickStats>>,
    thread: Option<JoinHandle<()>>,
}

impl TickLoopHandle {
    /// Check if the loop is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Get the statistics so far
    pub fn stats(&self) -> TickStats {
        *self.stats.lock()
    }

    /// Ask the loop to stop after its current tick
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Stop and wait for the loop thread to finish
    pub fn join(mut self) -> Result<TickStats> {
        self.stop();
        if let Some(handle) = self.thread.take() {
            handle
                .join()
                .map_err(|_| Error::TickLoop("loop thread panicked".into()))?;
        }
        Ok(*self.stats.lock())
    }
}

/// A fixed-rate tick loop
///
/// Calls the tick function at the target rate, passing the tick index and the
/// measured time since the previous tick. The tick function returns `true` to
/// keep going.
///
/// # Example
/// ```
/// use shooter_core::control::{TickLoop, TickLoopConfig};
///
/// let stats = TickLoop::run(TickLoopConfig::new(200.0), |tick, _dt| tick < 10).unwrap();
/// assert_eq!(stats.ticks, 10);
/// ```
pub struct TickLoop;

impl TickLoop {
    /// Run the loop on the current thread, blocking until the tick function
    /// returns `false`
    pub fn run<F>(config: TickLoopConfig, mut tick: F) -> Result<TickStats>
    where
        F: FnMut(u64, f64) -> bool,
    {
        let period = config.period();
        let mut stats = TickStats::default();
        let mut index = 0u64;
        let mut last = Instant::now();

        loop {
            let start = Instant::now();
            let dt = start.duration_since(last).as_secs_f64();
            last = start;

            let keep_going = tick(index, dt);
            let execution_time = start.elapsed();

            if !keep_going {
                break;
            }
            stats.record(execution_time, period);

            if let Some(remaining) = period.checked_sub(execution_time) {
                thread::sleep(remaining);
            } else if config.warn_on_overrun {
                tracing::warn!(
                    "{}: tick overran by {:?}",
                    config.name,
                    execution_time - period
                );
            }
            index += 1;
        }

        Ok(stats)
    }

    /// Spawn the loop on its own thread
    pub fn spawn<F>(config: TickLoopConfig, mut tick: F) -> TickLoopHandle
    where
        F: FnMut(u64, f64) -> bool + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let stats = Arc::new(Mutex::new(TickStats::default()));

        let running_clone = running.clone();
        let stats_clone = stats.clone();
        let period = config.period();

        let thread = thread::spawn(move || {
            let mut index = 0u64;
            let mut last = Instant::now();

            while running_clone.load(Ordering::Relaxed) {
                let start = Instant::now();
                let dt = start.duration_since(last).as_secs_f64();
                last = start;

                let keep_going = tick(index, dt);
                let execution_time = start.elapsed();

                if !keep_going {
                    running_clone.store(false, Ordering::Relaxed);
                    break;
                }
                stats_clone.lock().record(execution_time, period);

                if let Some(remaining) = period.checked_sub(execution_time) {
                    thread::sleep(remaining);
                } else if config.warn_on_overrun {
                    tracing::warn!(
                        "{}: tick overran by {:?}",
                        config.name,
                        execution_time - period
                    );
                }
                index += 1;
            }
        });

        TickLoopHandle {
            running,
            stats,
            thread: Some(thread),
        }
    }
}
