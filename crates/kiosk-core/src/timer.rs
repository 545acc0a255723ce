//! OTP countdown and the per-second scheduler that drives it

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

/// Result of a single countdown tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still counting
    Running { remaining: u32 },
    /// This tick brought the countdown to zero
    Expired,
    /// Already expired before this tick
    Stopped,
}

/// Fixed-duration OTP countdown. Once expired it never restarts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpCountdown {
    initial: u32,
    remaining: u32,
    expired: bool,
}

impl OtpCountdown {
    /// Start a countdown from the backend-supplied seed
    pub fn new(seed: u32) -> Self {
        Self {
            initial: seed,
            remaining: seed,
            expired: seed == 0,
        }
    }

    pub fn initial(&self) -> u32 {
        self.initial
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Fraction of the challenge left, 0.0 to 1.0
    pub fn fraction(&self) -> f64 {
        if self.initial == 0 {
            0.0
        } else {
            self.remaining as f64 / self.initial as f64
        }
    }

    /// Angle swept by the circular indicator
    pub fn sweep_degrees(&self) -> f64 {
        360.0 * self.fraction()
    }

    /// Advance by one second
    pub fn tick(&mut self) -> TickOutcome {
        if self.expired {
            return TickOutcome::Stopped;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.expired = true;
            TickOutcome::Expired
        } else {
            TickOutcome::Running {
                remaining: self.remaining,
            }
        }
    }

    /// Remaining time as MM:SS
    pub fn remaining_formatted(&self) -> String {
        let mins = self.remaining / 60;
        let secs = self.remaining % 60;
        format!("{:02}:{:02}", mins, secs)
    }
}

/// Callback invoked on every tick; returning false stops the timer
pub type TickCallback = Box<dyn FnMut() -> bool + Send + 'static>;

/// Repeating deferred callbacks
pub trait Scheduler: Send + Sync {
    /// Call `tick` every `period`, first call one period from now
    fn every(&self, period: Duration, tick: TickCallback) -> TimerHandle;
}

/// Cancellation handle for a scheduled timer. Dropping it cancels the timer.
#[derive(Debug, Default)]
pub struct TimerHandle {
    abort: Option<AbortHandle>,
}

impl TimerHandle {
    /// Handle with nothing behind it
    pub fn inert() -> Self {
        Self { abort: None }
    }

    pub fn from_abort(abort: AbortHandle) -> Self {
        Self { abort: Some(abort) }
    }

    /// Stop the timer. Safe to call more than once.
    pub fn cancel(&mut self) {
        if let Some(abort) = self.abort.take() {
            abort.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.abort.as_ref().is_some_and(|a| !a.is_finished())
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Scheduler backed by tokio intervals
#[derive(Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }
}

impl Scheduler for TokioScheduler {
    fn every(&self, period: Duration, mut tick: TickCallback) -> TimerHandle {
        let task = self.handle.spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if !tick() {
                    debug!("Timer stopped by callback");
                    break;
                }
            }
        });
        TimerHandle::from_abort(task.abort_handle())
    }
}

/// Scheduler that never fires on its own; the caller ticks pages directly
#[derive(Clone, Default)]
pub struct ManualScheduler {
    registrations: Arc<AtomicUsize>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of timers requested so far
    pub fn registrations(&self) -> usize {
        self.registrations.load(Ordering::SeqCst)
    }
}

impl Scheduler for ManualScheduler {
    fn every(&self, _period: Duration, _tick: TickCallback) -> TimerHandle {
        self.registrations.fetch_add(1, Ordering::SeqCst);
        TimerHandle::inert()
    }
}
