//! Session Metrics
//!
//! Named counters, gauges and value distributions for the frame pipeline:
//! frames per status, clicks per kind, cursor moves, stick engagements,
//! platform and landmark errors, and per-frame processing time.
//!
//! One collector is shared (`Arc`) between the control loop and the
//! reporting side. Every method takes `&self`; the registry sits behind a
//! single `RwLock` so a snapshot is consistent across all three kinds.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::time::{Duration, Instant, SystemTime};

/// Recent observations kept per distribution for percentile estimates
const DISTRIBUTION_WINDOW: usize = 4096;

#[derive(Default)]
struct Registry {
    counters: BTreeMap<String, u64>,
    gauges: BTreeMap<String, f64>,
    distributions: BTreeMap<String, Distribution>,
}

/// Metrics collector for one session
pub struct MetricsCollector {
    registry: RwLock<Registry>,
    started: Instant,
}

impl MetricsCollector {
    /// Empty collector; uptime counts from now
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(Registry::default()),
            started: Instant::now(),
        }
    }

    /// Add one to a counter
    pub fn incr(&self, name: &str) {
        self.add(name, 1);
    }

    /// Add `amount` to a counter
    pub fn add(&self, name: &str, amount: u64) {
        let mut registry = self.registry.write();
        match registry.counters.get_mut(name) {
            Some(total) => *total = total.saturating_add(amount),
            None => {
                registry.counters.insert(name.to_string(), amount);
            }
        }
    }

    /// Overwrite a gauge
    pub fn set_gauge(&self, name: &str, value: f64) {
        self.registry.write().gauges.insert(name.to_string(), value);
    }

    /// Record one observation in a distribution
    pub fn observe(&self, name: &str, value: f64) {
        if !value.is_finite() {
            return;
        }
        self.registry
            .write()
            .distributions
            .entry(name.to_string())
            .or_default()
            .record(value);
    }

    /// Counter value, zero if never incremented
    pub fn counter(&self, name: &str) -> u64 {
        self.registry.read().counters.get(name).copied().unwrap_or(0)
    }

    /// Gauge value, if ever set
    pub fn gauge(&self, name: &str) -> Option<f64> {
        self.registry.read().gauges.get(name).copied()
    }

    /// Summary of a distribution, if it has observations
    pub fn distribution(&self, name: &str) -> Option<HistogramStats> {
        self.registry.read().distributions.get(name).map(Distribution::summarize)
    }

    /// Consistent copy of everything collected so far
    pub fn snapshot(&self) -> MetricsSnapshot {
        let registry = self.registry.read();
        MetricsSnapshot {
            taken_at: SystemTime::now(),
            uptime: self.started.elapsed(),
            counters: registry.counters.clone(),
            gauges: registry.gauges.clone(),
            histograms: registry
                .distributions
                .iter()
                .map(|(name, dist)| (name.clone(), dist.summarize()))
                .collect(),
        }
    }

    /// Drop all values (uptime keeps running)
    pub fn clear(&self) {
        *self.registry.write() = Registry::default();
    }

    /// Pretty-printed JSON snapshot
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshot())
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MetricsCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.registry.read();
        f.debug_struct("MetricsCollector")
            .field("counters", &registry.counters.len())
            .field("gauges", &registry.gauges.len())
            .field("distributions", &registry.distributions.len())
            .field("uptime", &self.started.elapsed())
            .finish()
    }
}

/// Exact totals plus a sliding window of recent values
#[derive(Default)]
struct Distribution {
    window: VecDeque<f64>,
    count: u64,
    total: f64,
    lowest: Option<f64>,
    highest: Option<f64>,
}

impl Distribution {
    fn record(&mut self, value: f64) {
        if self.window.len() == DISTRIBUTION_WINDOW {
            self.window.pop_front();
        }
        self.window.push_back(value);

        self.count += 1;
        self.total += value;
        self.lowest = Some(self.lowest.map_or(value, |low| low.min(value)));
        self.highest = Some(self.highest.map_or(value, |high| high.max(value)));
    }

    fn summarize(&self) -> HistogramStats {
        let (Some(min), Some(max)) = (self.lowest, self.highest) else {
            return HistogramStats::default();
        };

        let mut recent: Vec<f64> = self.window.iter().copied().collect();
        recent.sort_by(f64::total_cmp);

        HistogramStats {
            count: self.count,
            sum: self.total,
            min,
            max,
            mean: self.total / self.count as f64,
            p50: nearest_rank(&recent, 50),
            p95: nearest_rank(&recent, 95),
            p99: nearest_rank(&recent, 99),
        }
    }
}

/// Nearest-rank percentile over ascending values
fn nearest_rank(sorted: &[f64], percent: u32) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (sorted.len() * percent as usize).div_ceil(100).max(1);
    sorted[rank.min(sorted.len()) - 1]
}

/// Summary of one distribution
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HistogramStats {
    /// Observations since the collector was created or cleared
    pub count: u64,
    /// Sum of those observations
    pub sum: f64,
    /// Smallest observation
    pub min: f64,
    /// Largest observation
    pub max: f64,
    /// `sum / count`
    pub mean: f64,
    /// Median of the recent window
    pub p50: f64,
    /// 95th percentile of the recent window
    pub p95: f64,
    /// 99th percentile of the recent window
    pub p99: f64,
}

/// Everything collected at one moment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Wall-clock time of the snapshot
    pub taken_at: SystemTime,
    /// Time since the collector was created
    pub uptime: Duration,
    /// Counters by name
    pub counters: BTreeMap<String, u64>,
    /// Gauges by name
    pub gauges: BTreeMap<String, f64>,
    /// Distribution summaries by name
    pub histograms: BTreeMap<String, HistogramStats>,
}

impl MetricsSnapshot {
    /// Counter value, zero if absent
    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }
}

pub mod metric_names {
    //! Names recorded by the control loop and the session binary.

    /// Frames processed
    pub const FRAMES_PROCESSED: &str = "frames_processed_total";
    /// Per-frame processing time (milliseconds)
    pub const FRAME_PROCESSING_TIME_MS: &str = "frame_processing_time_ms";
    /// Cursor move commands issued
    pub const CURSOR_MOVES: &str = "cursor_moves_total";
    /// Clicks issued to the platform
    pub const CLICKS_ISSUED: &str = "clicks_issued_total";
    /// Stick engagements
    pub const STICK_ENGAGED: &str = "stick_engaged_total";
    /// Stick releases (hysteresis, clicks, leaving bounds, stop)
    pub const STICK_RELEASED: &str = "stick_released_total";
    /// Failed platform calls
    pub const PLATFORM_ERRORS: &str = "platform_errors_total";
    /// Landmark provider failures
    pub const LANDMARK_ERRORS: &str = "landmark_errors_total";
    /// Configuration updates applied
    pub const CONFIG_UPDATES: &str = "config_updates_total";
    /// Current smoothing speed multiplier
    pub const SPEED_MULTIPLIER: &str = "speed_multiplier";

    /// Counter for frames that ended in a status
    pub fn status_frames(status_key: &str) -> String {
        format!("frames_status_{}_total", status_key)
    }

    /// Counter for recognized clicks of one kind
    pub fn clicks(kind: &str) -> String {
        format!("clicks_{}_total", kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = MetricsCollector::new();
        metrics.incr(metric_names::CURSOR_MOVES);
        metrics.add(metric_names::CURSOR_MOVES, 4);

        assert_eq!(metrics.counter(metric_names::CURSOR_MOVES), 5);
        assert_eq!(metrics.counter(metric_names::CLICKS_ISSUED), 0);
    }

    #[test]
    fn test_gauge_keeps_last_value() {
        let metrics = MetricsCollector::new();
        assert_eq!(metrics.gauge(metric_names::SPEED_MULTIPLIER), None);

        metrics.set_gauge(metric_names::SPEED_MULTIPLIER, 0.5);
        metrics.set_gauge(metric_names::SPEED_MULTIPLIER, 1.7);
        assert_eq!(metrics.gauge(metric_names::SPEED_MULTIPLIER), Some(1.7));
    }

    #[test]
    fn test_frame_time_summary() {
        let metrics = MetricsCollector::new();
        for ms in [0.4, 0.2, 0.9] {
            metrics.observe(metric_names::FRAME_PROCESSING_TIME_MS, ms);
        }
        metrics.observe(metric_names::FRAME_PROCESSING_TIME_MS, f64::NAN);

        let stats = metrics
            .distribution(metric_names::FRAME_PROCESSING_TIME_MS)
            .unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.min, 0.2);
        assert_eq!(stats.max, 0.9);
        assert_eq!(stats.p50, 0.4);
        assert!((stats.mean - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_window_drops_old_values_but_not_totals() {
        let mut dist = Distribution::default();
        for i in 0..(DISTRIBUTION_WINDOW + 100) {
            dist.record(i as f64);
        }

        let stats = dist.summarize();
        assert_eq!(stats.count, (DISTRIBUTION_WINDOW + 100) as u64);
        assert_eq!(stats.min, 0.0);
        assert_eq!(dist.window.len(), DISTRIBUTION_WINDOW);
        assert!(stats.p50 >= 100.0);
    }

    #[test]
    fn test_snapshot_and_clear() {
        let metrics = MetricsCollector::new();
        metrics.add(metric_names::FRAMES_PROCESSED, 10);
        metrics.incr(&metric_names::status_frames("no_face"));
        metrics.observe(metric_names::FRAME_PROCESSING_TIME_MS, 0.4);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.counter(metric_names::FRAMES_PROCESSED), 10);
        assert_eq!(snapshot.counter("frames_status_no_face_total"), 1);
        assert!(snapshot
            .histograms
            .contains_key(metric_names::FRAME_PROCESSING_TIME_MS));

        metrics.clear();
        assert_eq!(metrics.counter(metric_names::FRAMES_PROCESSED), 0);
        assert!(metrics.distribution(metric_names::FRAME_PROCESSING_TIME_MS).is_none());
    }

    #[test]
    fn test_json_names_clicks_by_kind() {
        let metrics = MetricsCollector::new();
        metrics.incr(&metric_names::clicks("left"));
        let json = metrics.to_json().unwrap();
        assert!(json.contains("\"clicks_left_total\": 1"));
    }

    #[test]
    fn test_nearest_rank() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        assert_eq!(nearest_rank(&values, 50), 5.0);
        assert_eq!(nearest_rank(&values, 95), 10.0);
        assert_eq!(nearest_rank(&[], 50), 0.0);
        assert_eq!(nearest_rank(&[3.0], 1), 3.0);
    }
}
