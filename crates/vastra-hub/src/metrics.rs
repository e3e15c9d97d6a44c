//! Runtime metrics — turn counts per reply category, throttling, uptime.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use vastra_core::engine::ReplyCategory;

/// Global metrics collector.
#[derive(Debug)]
pub struct Metrics {
    pub turns_total: AtomicU64,
    /// Indexed like [`ReplyCategory::ALL`].
    by_category: [AtomicU64; ReplyCategory::ALL.len()],
    pub rate_limited: AtomicU64,
    pub bad_requests: AtomicU64,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

fn category_index(category: ReplyCategory) -> usize {
    ReplyCategory::ALL
        .iter()
        .position(|c| *c == category)
        .unwrap_or_default()
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            turns_total: AtomicU64::new(0),
            by_category: Default::default(),
            rate_limited: AtomicU64::new(0),
            bad_requests: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_turn(&self, category: ReplyCategory) {
        self.turns_total.fetch_add(1, Ordering::Relaxed);
        self.by_category[category_index(category)].fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bad_request(&self) {
        self.bad_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn category_count(&self, category: ReplyCategory) -> u64 {
        self.by_category[category_index(category)].load(Ordering::Relaxed)
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Export as JSON. Session and detector figures come from the engine.
    pub fn to_json(&self, detector_fallbacks: u64, sessions_evicted: u64) -> serde_json::Value {
        let uptime = self.uptime_secs();
        let hours = uptime / 3600;
        let minutes = (uptime % 3600) / 60;
        let seconds = uptime % 60;

        let categories: serde_json::Map<String, serde_json::Value> = ReplyCategory::ALL
            .iter()
            .map(|c| (c.label().to_string(), self.category_count(*c).into()))
            .collect();

        serde_json::json!({
            "uptime": format!("{}h {}m {}s", hours, minutes, seconds),
            "uptime_secs": uptime,
            "turns": {
                "total": self.turns_total.load(Ordering::Relaxed),
                "by_category": categories,
            },
            "rate_limited": self.rate_limited.load(Ordering::Relaxed),
            "bad_requests": self.bad_requests.load(Ordering::Relaxed),
            "detector_fallbacks": detector_fallbacks,
            "sessions_evicted": sessions_evicted,
        })
    }
}

/// Shared metrics instance.
pub type SharedMetrics = Arc<Metrics>;

pub fn new_metrics() -> SharedMetrics {
    Arc::new(Metrics::new())
}
