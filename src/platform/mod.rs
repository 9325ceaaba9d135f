//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Logging backend
//! - Wall-clock pacing of fixed ticks

/// Install the logging backend. Safe to call more than once.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Decides when the host should run the next fixed tick
///
/// Time is passed in as milliseconds (`performance.now()` on the web,
/// `Instant` elapsed natively). A late poll yields exactly one tick and the
/// next deadline is measured from that poll: stalls are never caught up and
/// ticks are never merged.
#[derive(Debug, Clone)]
pub struct TickClock {
    period_ms: f64,
    next_due: Option<f64>,
    ticks: u64,
}

impl TickClock {
    pub fn new(period_ms: u32) -> Self {
        Self {
            period_ms: f64::from(period_ms.max(1)),
            next_due: None,
            ticks: 0,
        }
    }

    /// Ticks granted so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Forget the deadline; the next poll starts a new period
    pub fn reset(&mut self) {
        self.next_due = None;
    }

    /// Returns true if one tick should run now
    pub fn poll(&mut self, now_ms: f64) -> bool {
        match self.next_due {
            None => {
                self.next_due = Some(now_ms + self.period_ms);
                false
            }
            Some(due) if now_ms >= due => {
                self.next_due = Some(now_ms + self.period_ms);
                self.ticks += 1;
                true
            }
            Some(_) => false,
        }
    }

    /// Milliseconds until the next tick is due (0 if overdue or not started)
    pub fn until_next(&self, now_ms: f64) -> f64 {
        self.next_due.map_or(0.0, |due| (due - now_ms).max(0.0))
    }
}
