use pairs_core::Clock;
use std::time::Duration;

/// Get current timestamp in milliseconds
fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

/// Browser clock backed by `performance.now()`
#[derive(Debug, Clone, Copy)]
pub struct PerformanceClock {
    origin_ms: f64,
}

impl Default for PerformanceClock {
    fn default() -> Self {
        Self::new()
    }
}

impl PerformanceClock {
    pub fn new() -> Self {
        Self { origin_ms: now_ms() }
    }
}

impl Clock for PerformanceClock {
    fn now(&self) -> Duration {
        let elapsed = (now_ms() - self.origin_ms).max(0.0);
        Duration::from_secs_f64(elapsed / 1000.0)
    }
}
