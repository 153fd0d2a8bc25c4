//! Utility Functions
//!
//! Session metrics and user-friendly error formatting.
//!
//! ## Metrics
//!
//! The [`metrics`] module tracks per-session statistics:
//!
//! ```rust
//! use lamco_gaze_cursor::utils::{metric_names, MetricsCollector};
//!
//! let metrics = MetricsCollector::new();
//! metrics.incr(metric_names::FRAMES_PROCESSED);
//! metrics.observe(metric_names::FRAME_PROCESSING_TIME_MS, 0.3);
//!
//! let snapshot = metrics.snapshot();
//! assert_eq!(snapshot.counter(metric_names::FRAMES_PROCESSED), 1);
//! ```
//!
//! ## Error Formatting
//!
//! The [`errors`] module renders fatal errors with troubleshooting hints.
//! Categories:
//! - Recording errors → file path, malformed lines, timestamp order
//! - Config errors → syntax, invalid values
//! - Platform errors → screen size, input permissions

pub mod errors;
pub mod metrics;

pub use errors::{categorize, format_user_error, ErrorCategory};
pub use metrics::{metric_names, HistogramStats, MetricsCollector, MetricsSnapshot};
