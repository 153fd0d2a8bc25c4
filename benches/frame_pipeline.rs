//! Frame Pipeline Benchmarks
//!
//! Measures the per-frame cost of the smoothing filter, the gesture
//! classifier and a full control loop tick, with and without control
//! sticking.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::{Duration, Instant};

use lamco_gaze_cursor::config::EngineConfig;
use lamco_gaze_cursor::cursor::{AdaptiveSmoothingFilter, SmoothingConfig};
use lamco_gaze_cursor::engine::ControlLoop;
use lamco_gaze_cursor::geometry::{Point, Rect, Size};
use lamco_gaze_cursor::gesture::{EyeApertures, EyeState, GestureConfig, GestureStateMachine};
use lamco_gaze_cursor::input::{GazeSample, LandmarkFrame};
use lamco_gaze_cursor::platform::{ControlInfo, ControlLayout, ControlRole, VirtualDesktop};

const SCREEN: Size = Size::new(1920, 1080);
const FRAME: Size = Size::new(640, 480);

/// Gaze wandering around the middle of the movement area
fn wandering_gaze(frame: usize) -> Point {
    let phase = frame as f64 * 0.05;
    Point::new(0.5 + 0.08 * phase.sin(), 0.5 + 0.04 * phase.cos())
}

/// A grid of buttons covering the desktop (simulates a busy toolbar layout)
fn button_grid(columns: i32, rows: i32) -> Vec<ControlInfo> {
    let cell_w = SCREEN.width as i32 / columns;
    let cell_h = SCREEN.height as i32 / rows;
    let mut controls = Vec::with_capacity((columns * rows) as usize);
    for row in 0..rows {
        for col in 0..columns {
            let left = col * cell_w + 4;
            let top = row * cell_h + 4;
            controls.push(ControlInfo::new(
                ControlRole::Button,
                Rect::new(left, top, left + 40, top + 24),
            ));
        }
    }
    controls
}

fn sample(frame: usize, origin: Instant) -> LandmarkFrame {
    LandmarkFrame::Detected(GazeSample::new(
        wandering_gaze(frame),
        EyeApertures {
            left: 0.012,
            right: 0.012,
        },
        FRAME,
        origin + Duration::from_millis(frame as u64 * 33),
    ))
}

/// Benchmark one filter step at different window sizes
fn bench_filter_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_step");

    for window in [1usize, 6, 15, 30] {
        group.bench_with_input(BenchmarkId::new("window", window), &window, |b, &window| {
            let mut filter = AdaptiveSmoothingFilter::new(&SmoothingConfig { window });
            let mut cursor = SCREEN.center();
            let mut frame = 0usize;

            b.iter(|| {
                let gaze = wandering_gaze(frame);
                let target = Point::new(gaze.x * 1919.0, gaze.y * 1079.0);
                let step = filter.step(black_box(target), cursor, SCREEN);
                cursor = Point::from_pixels(step.position.0, step.position.1);
                frame += 1;
                black_box(step)
            })
        });
    }

    group.finish();
}

/// Benchmark the gesture classifier over a blink cycle
fn bench_gesture_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("gesture_update");

    let open = EyeState::new(false, false);
    let left = EyeState::new(true, false);
    let both = EyeState::new(true, true);
    let cycle: Vec<EyeState> = std::iter::repeat(open)
        .take(10)
        .chain(std::iter::repeat(left).take(10))
        .chain(std::iter::repeat(open).take(5))
        .chain(std::iter::repeat(both).take(12))
        .collect();

    group.throughput(Throughput::Elements(cycle.len() as u64));
    group.bench_function("blink_cycle", |b| {
        let mut machine = GestureStateMachine::new(&GestureConfig::default());
        let origin = Instant::now();

        b.iter(|| {
            let mut clicks = 0;
            for (i, eyes) in cycle.iter().enumerate() {
                let now = origin + Duration::from_millis(i as u64 * 33);
                if machine.update(black_box(*eyes), true, now).is_some() {
                    clicks += 1;
                }
            }
            machine.reset();
            black_box(clicks)
        })
    });

    group.finish();
}

/// Benchmark a full control loop tick
fn bench_control_loop_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("control_loop_tick");
    let origin = Instant::now();

    group.bench_function("no_sticking", |b| {
        let mut config = EngineConfig::default();
        config.sticking.enabled = false;
        let mut engine = ControlLoop::new(VirtualDesktop::new(SCREEN), config);
        engine.start_tracking();
        let mut frame = 0usize;

        b.iter(|| {
            let report = engine.tick(black_box(sample(frame, origin)));
            frame += 1;
            if frame % 1024 == 0 {
                engine.platform_mut().clear_history();
            }
            black_box(report)
        })
    });

    for (columns, rows) in [(4, 3), (16, 12), (48, 27)] {
        let controls = button_grid(columns, rows);
        let count = controls.len();

        group.bench_with_input(BenchmarkId::new("sticking", count), &controls, |b, controls| {
            let layout = ControlLayout::new(SCREEN, controls.clone());
            let mut engine =
                ControlLoop::with_locator(VirtualDesktop::new(SCREEN), layout, EngineConfig::default());
            engine.start_tracking();
            let mut frame = 0usize;

            b.iter(|| {
                let report = engine.tick(black_box(sample(frame, origin)));
                frame += 1;
                if frame % 1024 == 0 {
                    engine.platform_mut().clear_history();
                }
                black_box(report)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_filter_step,
    bench_gesture_update,
    bench_control_loop_tick
);
criterion_main!(benches);
