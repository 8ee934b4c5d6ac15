use metrics::{Counter, Gauge, Histogram};
use std::time::Duration;

pub struct Metrics {
    pub captures_completed: Counter,
    pub captures_failed: Counter,
    pub capture_duration: Histogram,
    pub cache_hits: Counter,
    pub cache_misses: Counter,
    pub gate_rejections: Counter,
    pub invalid_requests: Counter,
    pub cache_entries: Gauge,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            captures_completed: Counter::noop(),
            captures_failed: Counter::noop(),
            capture_duration: Histogram::noop(),
            cache_hits: Counter::noop(),
            cache_misses: Counter::noop(),
            gate_rejections: Counter::noop(),
            invalid_requests: Counter::noop(),
            cache_entries: Gauge::noop(),
        }
    }

    pub fn record_capture(&self, duration: Duration, success: bool) {
        if success {
            self.captures_completed.increment(1);
        } else {
            self.captures_failed.increment(1);
        }
        self.capture_duration.record(duration.as_secs_f64());
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.increment(1);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.increment(1);
    }

    pub fn record_gate_rejection(&self) {
        self.gate_rejections.increment(1);
    }

    pub fn record_invalid_request(&self) {
        self.invalid_requests.increment(1);
    }

    pub fn set_cache_entries(&self, count: usize) {
        self.cache_entries.set(count as f64);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
