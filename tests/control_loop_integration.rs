//! Control loop integration tests
//!
//! Drives the full pipeline (replay provider → control loop → in-memory
//! desktop) and checks only what a host could observe.

use std::io::Write;
use std::time::{Duration, Instant};

use lamco_gaze_cursor::config::{ConfigUpdate, EngineConfig, ProfileSet, Settings};
use lamco_gaze_cursor::cursor::{compute_gain, MIN_SPEED_FACTOR};
use lamco_gaze_cursor::engine::{ControlLoop, FrameReport, Status};
use lamco_gaze_cursor::geometry::{Point, Size};
use lamco_gaze_cursor::gesture::{ClickEvent, EyeApertures};
use lamco_gaze_cursor::input::{GazeSample, LandmarkFrame, LandmarkProvider, ReplayProvider};
use lamco_gaze_cursor::platform::VirtualDesktop;
use lamco_gaze_cursor::tracking::{to_screen, GazeMapper, TrackingRegion};
use lamco_gaze_cursor::tutorial::{TutorialFlow, TutorialStep};

const SCREEN: Size = Size::new(1920, 1080);
const FRAME: Size = Size::new(640, 480);
const OPEN: f64 = 0.02;
const SHUT: f64 = 0.001;

fn engine() -> ControlLoop<VirtualDesktop> {
    let mut config = EngineConfig::default();
    config.sticking.enabled = false;
    let mut engine = ControlLoop::new(VirtualDesktop::new(SCREEN), config);
    engine.start_tracking();
    engine
}

fn frame(gaze: (f64, f64), eyes: (f64, f64), at: Instant) -> LandmarkFrame {
    LandmarkFrame::Detected(GazeSample::new(
        Point::new(gaze.0, gaze.1),
        EyeApertures {
            left: eyes.0,
            right: eyes.1,
        },
        FRAME,
        at,
    ))
}

/// Feed eye states every 20ms over `[from_ms, to_ms)` with a centered gaze
fn eyes_for(
    engine: &mut ControlLoop<VirtualDesktop>,
    origin: Instant,
    from_ms: u64,
    to_ms: u64,
    eyes: (f64, f64),
) -> Vec<FrameReport> {
    (from_ms..to_ms)
        .step_by(20)
        .map(|t| engine.tick(frame((0.5, 0.5), eyes, origin + Duration::from_millis(t))))
        .collect()
}

fn replay_from(lines: &[String]) -> ReplayProvider {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    ReplayProvider::open(file.path()).unwrap()
}

#[test]
fn test_replayed_left_wink_issues_one_click() {
    let mut lines = vec!["# left wink at screen center".to_string()];
    for t in (0..1000).step_by(33) {
        let eyes = if (200..600).contains(&t) { [SHUT, OPEN] } else { [OPEN, OPEN] };
        lines.push(format!(
            r#"{{"t_ms": {}, "gaze": [0.5, 0.5], "eyes": [{}, {}]}}"#,
            t, eyes[0], eyes[1]
        ));
    }
    let mut provider = replay_from(&lines);
    let mut engine = engine();

    let mut reports = Vec::new();
    while let Some(frame) = provider.next_frame().unwrap() {
        reports.push(engine.tick(frame));
    }

    assert_eq!(engine.platform().clicks(), &[ClickEvent::Left]);
    assert!(reports.iter().all(|r| r.status == Status::Tracking));
    assert_eq!(reports.iter().filter(|r| r.click.is_some()).count(), 1);
}

#[test]
fn test_replayed_face_loss_reports_no_face() {
    let lines = vec![
        r#"{"t_ms": 0, "gaze": [0.5, 0.5], "eyes": [0.02, 0.02]}"#.to_string(),
        r#"{"t_ms": 33, "face": false}"#.to_string(),
        r#"{"t_ms": 66, "ready": false}"#.to_string(),
        r#"{"t_ms": 99, "eyes": [0.02, 0.02]}"#.to_string(),
    ];
    let mut provider = replay_from(&lines);
    let mut engine = engine();

    let mut statuses = Vec::new();
    while let Some(frame) = provider.next_frame().unwrap() {
        statuses.push(engine.tick(frame).status);
    }
    assert_eq!(
        statuses,
        vec![Status::Tracking, Status::NoFace, Status::NotReady, Status::GazeError]
    );
}

#[test]
fn test_double_blink_emits_double_without_middle() {
    let mut engine = engine();
    let origin = Instant::now();

    let mut reports = eyes_for(&mut engine, origin, 0, 100, (OPEN, OPEN));
    reports.extend(eyes_for(&mut engine, origin, 100, 200, (SHUT, SHUT)));
    reports.extend(eyes_for(&mut engine, origin, 200, 300, (OPEN, OPEN)));
    // Second closure held long enough for a middle click on its own
    reports.extend(eyes_for(&mut engine, origin, 300, 900, (SHUT, SHUT)));
    reports.extend(eyes_for(&mut engine, origin, 900, 1000, (OPEN, OPEN)));

    let clicks: Vec<_> = reports.iter().filter_map(|r| r.click).collect();
    assert_eq!(clicks, vec![ClickEvent::Double]);
    assert_eq!(engine.platform().clicks(), &[ClickEvent::Double]);
}

#[test]
fn test_long_hold_emits_middle() {
    let mut engine = engine();
    let origin = Instant::now();

    let mut reports = eyes_for(&mut engine, origin, 0, 500, (SHUT, SHUT));
    reports.extend(eyes_for(&mut engine, origin, 500, 600, (OPEN, OPEN)));

    let clicks: Vec<_> = reports.iter().filter_map(|r| r.click).collect();
    assert_eq!(clicks, vec![ClickEvent::Middle]);
}

#[test]
fn test_clicks_need_click_area() {
    let mut engine = engine();
    let origin = Instant::now();

    // Far corner of the camera frame: outside both rectangles
    for t in (0..600).step_by(20) {
        let eyes = if t < 500 { (SHUT, OPEN) } else { (OPEN, OPEN) };
        let report = engine.tick(frame((0.02, 0.02), eyes, origin + Duration::from_millis(t)));
        assert_eq!(report.status, Status::OutOfBounds);
        assert_eq!(report.click, None);
    }
    assert!(engine.platform().clicks().is_empty());
}

#[test]
fn test_reentry_starts_from_fresh_history() {
    let mut engine = engine();
    let origin = Instant::now();

    // Settle near the top-left of the movement area
    for i in 0..30 {
        engine.tick(frame((0.32, 0.4), (OPEN, OPEN), origin + Duration::from_millis(i * 33)));
    }
    engine.tick(frame((0.02, 0.5), (OPEN, OPEN), origin + Duration::from_millis(1000)));
    let cursor = engine.platform().cursor();

    let gaze = (0.7, 0.6);
    let report = engine.tick(frame(gaze, (OPEN, OPEN), origin + Duration::from_millis(1033)));
    assert_eq!(report.status, Status::Tracking);

    // With cleared history the first move heads straight for the new target
    let region = TrackingRegion::compute(7, 1, FRAME);
    let sample = GazeSample::new(
        Point::new(gaze.0, gaze.1),
        EyeApertures { left: OPEN, right: OPEN },
        FRAME,
        origin,
    );
    let normalized = GazeMapper::new()
        .map(sample.pixel_position(), &region)
        .mapping
        .target()
        .unwrap();
    let target = to_screen(normalized, SCREEN);
    let from = Point::from_pixels(cursor.0, cursor.1);
    let drift = target - from;
    let expected = SCREEN
        .clamp(from + drift * compute_gain(MIN_SPEED_FACTOR, drift.length()))
        .round();

    assert_eq!(engine.platform().moves().last(), Some(&expected));
}

#[test]
fn test_updates_from_another_thread_apply_next_frame() {
    let mut engine = engine();
    let handle = engine.config_handle();

    std::thread::spawn(move || {
        handle
            .send(ConfigUpdate::default().inner_level(40).outer_level(4))
            .unwrap();
    })
    .join()
    .unwrap();

    assert_eq!(engine.config().inner_level, 7);
    engine.tick(LandmarkFrame::NoFace);
    assert_eq!(engine.config().inner_level, 31);
    assert_eq!(engine.config().outer_level, 4);
}

#[test]
fn test_profile_switch_reaches_running_loop() {
    let mut engine = engine();
    let mut profiles = ProfileSet::new();
    let mut wide = Settings::default();
    wide.engine.inner_level = 20;
    wide.engine.smoothing.window = 12;
    profiles.save("Wide", wide).unwrap();

    let update = profiles.switch_to("Wide").unwrap();
    engine.config_handle().send(update).unwrap();
    engine.tick(LandmarkFrame::NoFace);

    assert_eq!(engine.config().inner_level, 20);
    assert_eq!(engine.config().smoothing.window, 12);
    assert_eq!(engine.region(), None);
}

#[test]
fn test_tutorial_consumes_reports_while_idle() {
    let mut config = EngineConfig::default();
    config.sticking.enabled = false;
    let mut engine = ControlLoop::new(VirtualDesktop::new(SCREEN), config);
    let mut tutorial = TutorialFlow::new();
    tutorial.next();

    let origin = Instant::now();
    for t in (0..600).step_by(20) {
        let eyes = if t < 400 { (SHUT, OPEN) } else { (OPEN, OPEN) };
        let report = engine.tick(frame((0.5, 0.5), eyes, origin + Duration::from_millis(t)));
        assert_eq!(report.status, Status::Idle);
        tutorial.on_report(&report);
    }

    assert_eq!(tutorial.step(), TutorialStep::LeftSuccess);
    assert!(engine.platform().clicks().is_empty());
}
