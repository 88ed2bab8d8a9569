use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

pub const DEFAULT_MAX_REQUESTS: u32 = 10;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Per-caller request gate, consulted before the engine runs.
///
/// Implementations decide where the counters live: in memory for a single
/// process, or a shared cache when several instances serve the same callers.
pub trait RateLimiter: Send + Sync {
    /// Counts this request and reports whether it is allowed.
    fn check_and_increment(&self, identity: &str) -> bool;
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window counter: at most `max_requests` per `window` per identity.
#[derive(Debug)]
pub struct FixedWindowRateLimiter {
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl FixedWindowRateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn check_and_increment_at(&self, identity: &str, now: Instant) -> bool {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);

        // Expire finished windows for every caller, not just this one.
        let window = self.window;
        windows.retain(|_, w| now.saturating_duration_since(w.started) < window);

        let entry = windows.entry(identity.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if entry.count >= self.max_requests {
            return false;
        }
        entry.count += 1;
        true
    }
}

impl Default for FixedWindowRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW)
    }
}

impl RateLimiter for FixedWindowRateLimiter {
    fn check_and_increment(&self, identity: &str) -> bool {
        self.check_and_increment_at(identity, Instant::now())
    }
}

/// Lets every request through.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unlimited;

impl RateLimiter for Unlimited {
    fn check_and_increment(&self, _identity: &str) -> bool {
        true
    }
}
