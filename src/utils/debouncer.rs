use std::time::{Duration, Instant};

/// Coalescing timer: holds the latest value and releases it once no newer
/// value has arrived for the whole delay. Older values are superseded,
/// never queued.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    /// The duration to wait after the last event before releasing
    delay: Duration,
    /// When the last value arrived
    last_event: Option<Instant>,
    /// Latest value waiting to be released
    pending: Option<T>,
}

impl<T> Debouncer<T> {
    /// Create a new debouncer with the specified delay in milliseconds
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            last_event: None,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Register a new value now
    pub fn trigger(&mut self, value: T) {
        self.trigger_at(value, Instant::now());
    }

    /// Register a new value at `now`, replacing any pending one
    pub fn trigger_at(&mut self, value: T, now: Instant) {
        self.last_event = Some(now);
        self.pending = Some(value);
    }

    /// Take the pending value if the window has elapsed
    pub fn poll(&mut self) -> Option<T> {
        self.poll_at(Instant::now())
    }

    pub fn poll_at(&mut self, now: Instant) -> Option<T> {
        let last = self.last_event?;
        if now.saturating_duration_since(last) >= self.delay {
            self.last_event = None;
            self.pending.take()
        } else {
            None
        }
    }

    /// Time left before the pending value is released, None if idle
    pub fn time_remaining_at(&self, now: Instant) -> Option<Duration> {
        self.pending.as_ref()?;
        self.last_event
            .map(|last| self.delay.saturating_sub(now.saturating_duration_since(last)))
    }

    pub fn time_remaining(&self) -> Option<Duration> {
        self.time_remaining_at(Instant::now())
    }

    /// Release the pending value immediately (e.g. on Enter)
    pub fn flush(&mut self) -> Option<T> {
        self.last_event = None;
        self.pending.take()
    }

    /// Cancel any pending value
    pub fn reset(&mut self) {
        self.last_event = None;
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
