//! Per-Frame Orchestration
//!
//! [`ControlLoop::tick`] runs one full pass for one landmark frame:
//!
//! ```text
//! pending ConfigUpdates ──> apply (between frames only)
//! LandmarkFrame
//!   ├─> NotReady / NoFace ──> reset motion + gestures
//!   └─> Detected(sample)
//!       ├─> GazeMapper ──> region classification + click permission
//!       ├─> tracking && InBoundsInner ──> StickingEngine ──> AdaptiveSmoothingFilter ──> move
//!       ├─> otherwise ──> reset motion, release stick
//!       └─> GestureStateMachine (always, when gaze and apertures are valid)
//! click ──> ClickSink (only while tracking) ──> release stick
//! ```
//!
//! Platform failures never leave this module. They are logged, counted and
//! replaced with a fallback so the next frame runs normally.

use crossbeam_channel::{Receiver, SendError, Sender};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

use super::status::{FrameReport, Status};
use crate::config::{ConfigUpdate, EngineConfig};
use crate::cursor::{AdaptiveSmoothingFilter, StickOutcome, StickingEngine};
use crate::geometry::{Point, Size};
use crate::gesture::{ClickEvent, EyeState, GestureStateMachine};
use crate::input::{GazeSample, LandmarkFrame};
use crate::platform::{screen_size_or_fallback, ClickSink, ControlLocator, CursorDevice, NoControlLocator};
use crate::tracking::{to_screen, GazeMapper, GazeMapping, TrackingRegion};
use crate::utils::{metric_names, MetricsCollector};

/// Sends configuration updates to a running [`ControlLoop`]
///
/// Updates queue up and are applied together at the start of the next
/// frame. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct ConfigHandle {
    tx: Sender<ConfigUpdate>,
}

impl ConfigHandle {
    /// Queue an update
    pub fn send(&self, update: ConfigUpdate) -> Result<(), SendError<ConfigUpdate>> {
        self.tx.send(update)
    }
}

/// Gaze-to-cursor control loop
///
/// Owns every piece of per-session state. `P` is the host's cursor and click
/// interface, `L` the optional window-enumeration capability.
pub struct ControlLoop<P, L = NoControlLocator>
where
    P: CursorDevice + ClickSink,
    L: ControlLocator,
{
    platform: P,
    locator: L,
    config: EngineConfig,
    updates_tx: Sender<ConfigUpdate>,
    updates_rx: Receiver<ConfigUpdate>,

    mapper: GazeMapper,
    region: Option<TrackingRegion>,
    filter: AdaptiveSmoothingFilter,
    sticking: StickingEngine,
    gestures: GestureStateMachine,

    tracking: bool,
    was_out_of_bounds: bool,
    status: Status,
    metrics: Arc<MetricsCollector>,
}

impl<P> ControlLoop<P, NoControlLocator>
where
    P: CursorDevice + ClickSink,
{
    /// Create a loop without control sticking support
    pub fn new(platform: P, config: EngineConfig) -> Self {
        Self::with_locator(platform, NoControlLocator, config)
    }
}

impl<P, L> ControlLoop<P, L>
where
    P: CursorDevice + ClickSink,
    L: ControlLocator,
{
    /// Create a loop with a window-enumeration capability
    pub fn with_locator(platform: P, locator: L, config: EngineConfig) -> Self {
        let config = config.normalized();
        let (updates_tx, updates_rx) = crossbeam_channel::unbounded();

        if config.sticking.enabled && !locator.is_supported() {
            debug!("Control sticking configured but not supported on this platform");
        }

        Self {
            platform,
            locator,
            mapper: GazeMapper::new(),
            region: None,
            filter: AdaptiveSmoothingFilter::new(&config.smoothing),
            sticking: StickingEngine::new(&config.sticking),
            gestures: GestureStateMachine::new(&config.gestures),
            config,
            updates_tx,
            updates_rx,
            tracking: false,
            was_out_of_bounds: false,
            status: Status::Idle,
            metrics: Arc::new(MetricsCollector::new()),
        }
    }

    /// Record into a shared collector instead of a private one
    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Handle for queueing configuration updates
    pub fn config_handle(&self) -> ConfigHandle {
        ConfigHandle {
            tx: self.updates_tx.clone(),
        }
    }

    /// Current configuration snapshot
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Status of the last processed frame
    pub fn status(&self) -> Status {
        self.status
    }

    /// Session metrics
    pub fn metrics(&self) -> &Arc<MetricsCollector> {
        &self.metrics
    }

    /// Platform interface
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Mutable platform interface
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Region used on the last frame
    pub fn region(&self) -> Option<&TrackingRegion> {
        self.region.as_ref()
    }

    /// Cursor is currently stuck to a control
    pub fn is_stuck(&self) -> bool {
        self.filter.state().is_stuck()
    }

    /// Cursor follows the gaze and gestures issue clicks
    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// Start following the gaze
    pub fn start_tracking(&mut self) {
        if self.tracking {
            return;
        }
        self.reset_session_state();
        self.tracking = true;
        info!("Tracking started");
    }

    /// Stop following the gaze
    ///
    /// Gesture timers, motion history and any stick are cleared before this
    /// returns, so resuming never replays stale state.
    pub fn stop_tracking(&mut self) {
        if !self.tracking {
            return;
        }
        self.tracking = false;
        self.reset_session_state();
        info!("Tracking stopped");
    }

    /// Clear gesture timers without touching tracking or motion
    pub fn reset_gestures(&mut self) {
        self.gestures.reset();
    }

    fn reset_session_state(&mut self) {
        self.gestures.reset();
        if self.sticking.reset(self.filter.state_mut()) {
            self.metrics.incr(metric_names::STICK_RELEASED);
        }
        self.filter.reset();
        self.was_out_of_bounds = false;
    }

    /// Process one frame
    pub fn tick(&mut self, frame: LandmarkFrame) -> FrameReport {
        let started = Instant::now();
        self.apply_pending_updates();

        let report = match frame {
            LandmarkFrame::NotReady => {
                self.reset_frame_state();
                FrameReport::new(Status::NotReady)
            }
            LandmarkFrame::NoFace => {
                self.reset_frame_state();
                FrameReport::new(if self.tracking { Status::NoFace } else { Status::Idle })
            }
            LandmarkFrame::Detected(sample) => self.process_sample(&sample),
        };

        self.record_frame(report, started);
        report
    }

    fn process_sample(&mut self, sample: &GazeSample) -> FrameReport {
        let position = sample.pixel_position();
        let region = self.region_for(sample.frame);
        let mapped = self.mapper.map(position, &region);

        let frame_status = match mapped.mapping {
            GazeMapping::NoFace => {
                self.leave_movement_area();
                Status::GazeError
            }
            GazeMapping::InvalidRegion => {
                self.leave_movement_area();
                Status::ConfigError
            }
            GazeMapping::InBoundsInner(normalized) => {
                if self.tracking {
                    self.follow(normalized, sample.timestamp);
                }
                Status::Tracking
            }
            GazeMapping::InBoundsOuterOnly | GazeMapping::OutOfBounds => {
                self.leave_movement_area();
                Status::OutOfBounds
            }
        };

        // A frame without usable gaze landmarks clears the gesture timers
        let apertures = match mapped.mapping {
            GazeMapping::NoFace => None,
            _ => sample.valid_apertures(),
        };
        let click = match apertures {
            Some(apertures) => {
                let eyes = EyeState::from_apertures(apertures, self.config.gestures.closure_threshold());
                self.gestures.update(eyes, mapped.click_permitted, sample.timestamp)
            }
            None => {
                self.gestures.reset();
                None
            }
        };

        if let Some(kind) = click {
            self.handle_click(kind);
        }

        let status = if self.tracking { frame_status } else { Status::Idle };

        FrameReport { status, click }
    }

    /// Move the cursor toward a normalized in-bounds target
    fn follow(&mut self, normalized: Point, now: Instant) {
        if self.was_out_of_bounds {
            trace!("Re-entered movement area, clearing motion history");
            self.filter.reset();
            self.was_out_of_bounds = false;
        }

        let screen = screen_size_or_fallback(&self.platform);
        let target = to_screen(normalized, screen);
        let cursor = self.cursor_or_fallback(screen);

        if self.sticking.is_enabled() && self.locator.is_supported() {
            let outcome = self.sticking.update(
                self.filter.state_mut(),
                target,
                cursor,
                screen,
                &self.locator,
                now,
            );

            match outcome {
                Ok(StickOutcome::Free) => {}
                Ok(StickOutcome::Engaged { anchor }) => {
                    self.metrics.incr(metric_names::STICK_ENGAGED);
                    self.move_cursor(anchor);
                    return;
                }
                Ok(StickOutcome::Holding { enforce }) => {
                    if let Some(anchor) = enforce {
                        self.move_cursor(anchor);
                    }
                    return;
                }
                Ok(StickOutcome::Released) => {
                    self.metrics.incr(metric_names::STICK_RELEASED);
                }
                Err(e) => {
                    warn!("Control lookup failed, continuing unstuck: {}", e);
                    self.metrics.incr(metric_names::PLATFORM_ERRORS);
                }
            }
        }

        let step = self.filter.step(target, cursor, screen);
        self.metrics
            .set_gauge(metric_names::SPEED_MULTIPLIER, step.speed_multiplier);
        if let Some(position) = step.move_to {
            self.move_cursor(position);
        }
    }

    fn cursor_or_fallback(&mut self, screen: Size) -> Point {
        match self.platform.cursor_position() {
            Ok((x, y)) => Point::from_pixels(x, y),
            Err(e) => {
                let fallback = self.filter.fallback_cursor(screen);
                warn!(
                    "{}, assuming cursor at ({:.0}, {:.0})",
                    e, fallback.x, fallback.y
                );
                self.metrics.incr(metric_names::PLATFORM_ERRORS);
                fallback
            }
        }
    }

    fn move_cursor(&mut self, (x, y): (i32, i32)) {
        match self.platform.move_cursor_to(x, y) {
            Ok(()) => self.metrics.incr(metric_names::CURSOR_MOVES),
            Err(e) => {
                warn!("{}", e);
                self.metrics.incr(metric_names::PLATFORM_ERRORS);
            }
        }
    }

    fn handle_click(&mut self, kind: ClickEvent) {
        self.metrics.incr(&metric_names::clicks(kind.as_str()));

        if !self.tracking {
            debug!("{} click recognized while idle, not issued", kind);
            return;
        }

        match self.platform.issue_click(kind) {
            Ok(()) => {
                info!("{} click", kind);
                self.metrics.incr(metric_names::CLICKS_ISSUED);
            }
            Err(e) => {
                warn!("{}", e);
                self.metrics.incr(metric_names::PLATFORM_ERRORS);
            }
        }

        if self.sticking.release(self.filter.state_mut()) {
            self.metrics.incr(metric_names::STICK_RELEASED);
        }
    }

    /// Gaze left the movement area (or never had a usable position)
    fn leave_movement_area(&mut self) {
        if self.sticking.release(self.filter.state_mut()) {
            self.metrics.incr(metric_names::STICK_RELEASED);
        }
        self.filter.reset();
        self.was_out_of_bounds = true;
    }

    /// Frame without a usable sample
    fn reset_frame_state(&mut self) {
        self.leave_movement_area();
        self.gestures.reset();
    }

    fn region_for(&mut self, frame: Size) -> TrackingRegion {
        match self.region {
            Some(region) if region.frame == frame => region,
            _ => {
                let region =
                    TrackingRegion::compute(self.config.inner_level, self.config.outer_level, frame);
                if region.is_valid() {
                    debug!(
                        "Tracking region for {}x{}: inner={:?} outer={:?}",
                        frame.width, frame.height, region.inner, region.outer
                    );
                } else {
                    warn!(
                        "Tracking region invalid for {}x{} frame (padding {}px, gap {}px)",
                        frame.width, frame.height, region.padding_px, region.gap_px
                    );
                }
                self.region = Some(region);
                region
            }
        }
    }

    /// Drain queued updates and apply them as one new snapshot
    fn apply_pending_updates(&mut self) {
        let Some(update) = self.updates_rx.try_iter().reduce(ConfigUpdate::merge) else {
            return;
        };
        if update.is_empty() {
            return;
        }

        let next = update.apply(&self.config);
        self.metrics.incr(metric_names::CONFIG_UPDATES);
        debug!("Applying configuration update: {:?}", update);

        if next.inner_level != self.config.inner_level || next.outer_level != self.config.outer_level {
            self.region = None;
        }
        if next.gestures != self.config.gestures {
            self.gestures.set_config(&next.gestures);
        }
        if next.smoothing.window != self.config.smoothing.window {
            self.filter.set_window(next.smoothing.window);
        }
        if next.sticking.enabled != self.config.sticking.enabled {
            self.sticking.set_enabled(next.sticking.enabled);
            if !next.sticking.enabled && self.sticking.reset(self.filter.state_mut()) {
                self.metrics.incr(metric_names::STICK_RELEASED);
            }
        }

        self.config = next;
    }

    fn record_frame(&mut self, report: FrameReport, started: Instant) {
        if report.status != self.status {
            debug!("Status: {} -> {}", self.status, report.status);
            self.status = report.status;
        }

        self.metrics.incr(metric_names::FRAMES_PROCESSED);
        self.metrics.incr(&metric_names::status_frames(report.status.key()));
        self.metrics.observe(
            metric_names::FRAME_PROCESSING_TIME_MS,
            started.elapsed().as_secs_f64() * 1000.0,
        );
    }
}

impl<P, L> std::fmt::Debug for ControlLoop<P, L>
where
    P: CursorDevice + ClickSink,
    L: ControlLocator,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlLoop")
            .field("tracking", &self.tracking)
            .field("status", &self.status)
            .field("config", &self.config)
            .field("region", &self.region)
            .finish()
    }
}
