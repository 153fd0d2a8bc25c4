//! lamco-gaze-cursor - Gaze-to-Cursor Session Runner
//!
//! Replays a landmark recording through the control loop against an
//! in-memory desktop and reports what the engine did.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lamco_gaze_cursor::config::{Config, LoggingConfig, ProfileSet};
use lamco_gaze_cursor::engine::{ControlLoop, FrameReport};
use lamco_gaze_cursor::geometry::Size;
use lamco_gaze_cursor::input::{LandmarkFrame, LandmarkProvider, ReplayProvider};
use lamco_gaze_cursor::platform::{ClickSink, ControlInfo, ControlLayout, ControlLocator, CursorDevice, VirtualDesktop};
use lamco_gaze_cursor::tutorial::TutorialFlow;
use lamco_gaze_cursor::utils::{format_user_error, metric_names, MetricsCollector};

/// Command-line arguments for lamco-gaze-cursor
#[derive(Parser, Debug)]
#[command(name = "lamco-gaze-cursor")]
#[command(version, about = "Gaze-to-cursor control engine", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, env = "LAMCO_GAZE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Landmark recording to replay (JSON lines)
    #[arg(short, long, env = "LAMCO_GAZE_REPLAY")]
    pub replay: Option<PathBuf>,

    /// Frames per second
    #[arg(long)]
    pub fps: Option<u32>,

    /// On-screen controls for sticking (JSON array)
    #[arg(long)]
    pub controls: Option<PathBuf>,

    /// Settings profiles file (JSON)
    #[arg(long)]
    pub profiles: Option<PathBuf>,

    /// Profile to activate from the profiles file
    #[arg(long, requires = "profiles")]
    pub profile: Option<String>,

    /// Run the gesture tutorial before tracking
    #[arg(long)]
    pub tutorial: bool,

    /// Write the final metrics snapshot to this file
    #[arg(long)]
    pub metrics_json: Option<PathBuf>,

    /// Print the default configuration and exit
    #[arg(long)]
    pub print_config: bool,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log format (json|pretty|compact)
    #[arg(long, default_value = "pretty")]
    pub log_format: String,

    /// Write logs to file (in addition to stdout)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        print!("{}", Config::default().to_toml()?);
        return Ok(());
    }

    // Clamp warnings during loading go to stderr until logging is up
    let bootstrap = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let loaded = tracing::subscriber::with_default(bootstrap, || load_config(&args));
    let (config, profiles) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{}", format_user_error(&e));
            return Err(e);
        }
    };

    let _log_guard = init_logging(&args, &config.logging)?;

    info!("════════════════════════════════════════════════════════");
    info!("  lamco-gaze-cursor v{}", env!("CARGO_PKG_VERSION"));
    info!("  Built: {}", env!("BUILD_DATE"));
    info!("  Commit: {}", env!("GIT_HASH"));
    info!("  Profile: {}", if cfg!(debug_assertions) { "debug" } else { "release" });
    info!("════════════════════════════════════════════════════════");
    debug!("Config: {:?}", config);

    let metrics = Arc::new(MetricsCollector::new());
    let result = run_session(&args, &config, profiles, Arc::clone(&metrics)).await;

    if config.logging.metrics {
        log_metrics_summary(&metrics);
    }
    if let Some(path) = &args.metrics_json {
        let json = metrics.to_json().context("Failed to serialize metrics")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write metrics: {}", path.display()))?;
        info!("Metrics written to {}", path.display());
    }

    if let Err(e) = &result {
        eprintln!("{}", format_user_error(e));
    }
    result
}

/// Config file, CLI overrides, then the active profile
fn load_config(args: &Args) -> Result<(Config, Option<ProfileSet>)> {
    let mut config = Config::load_or_default(args.config.as_deref())?.with_overrides(
        args.replay.clone(),
        args.fps,
        args.controls.clone(),
    );
    config.validate()?;

    let profiles = match &args.profiles {
        Some(path) => {
            let mut profiles = load_profiles(path)?;
            if let Some(name) = &args.profile {
                profiles
                    .switch_to(name)
                    .with_context(|| format!("Cannot activate profile from {}", path.display()))?;
            }
            config.apply_settings(&profiles.active());
            Some(profiles)
        }
        None => None,
    };

    Ok((config, profiles))
}

fn load_profiles(path: &Path) -> Result<ProfileSet> {
    if !path.exists() {
        return Ok(ProfileSet::new());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read profiles config: {}", path.display()))?;
    ProfileSet::from_json(&text)
        .with_context(|| format!("Invalid profiles config: {}", path.display()))
}

fn load_controls(path: Option<&Path>, screen: Size) -> Result<ControlLayout> {
    let Some(path) = path else {
        return Ok(ControlLayout::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read controls file: {}", path.display()))?;
    let controls: Vec<ControlInfo> = serde_json::from_str(&text)
        .with_context(|| format!("Invalid controls file: {}", path.display()))?;
    info!("Loaded {} on-screen controls", controls.len());
    Ok(ControlLayout::new(screen, controls))
}

async fn run_session(
    args: &Args,
    config: &Config,
    mut profiles: Option<ProfileSet>,
    metrics: Arc<MetricsCollector>,
) -> Result<()> {
    let replay = config.session.replay.as_deref().context(
        "No landmark recording given; pass --replay <file> or set replay under [session] in the config",
    )?;
    let mut provider = ReplayProvider::open(replay)
        .with_context(|| format!("Failed to open replay recording: {}", replay.display()))?;
    info!(
        "Replaying {} frames ({:.1}s) from {}",
        provider.len(),
        provider.duration().as_secs_f64(),
        replay.display()
    );

    let screen = config.screen_size();
    let layout = load_controls(config.session.controls.as_deref(), screen)?;
    let mut engine = ControlLoop::with_locator(VirtualDesktop::new(screen), layout, config.engine_config())
        .with_metrics(metrics);

    let mut tutorial = args.tutorial.then(TutorialFlow::new);
    match &tutorial {
        Some(flow) => info!("Tutorial: {}", flow.step().prompt(&config.gestures)),
        None if config.session.start_tracking => engine.start_tracking(),
        None => info!("Tracking is off; clicks will be reported but not issued"),
    }

    let mut interval = tokio::time::interval(Duration::from_secs_f64(
        1.0 / f64::from(config.session.frame_rate),
    ));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Interrupted, stopping session");
                break;
            }
            _ = interval.tick() => {
                let frame = match provider.next_frame() {
                    Ok(Some(frame)) => frame,
                    Ok(None) => {
                        info!("Recording finished");
                        break;
                    }
                    Err(e) if e.is_transient() => {
                        warn!("Landmark provider: {}", e);
                        engine.metrics().incr(metric_names::LANDMARK_ERRORS);
                        LandmarkFrame::NotReady
                    }
                    Err(e) => return Err(e).context("Landmark provider failed"),
                };

                let report = engine.tick(frame);
                if let Some(click) = report.click {
                    debug!("Frame click: {} ({})", click, report.status);
                }

                if let Some(flow) = tutorial.as_mut() {
                    drive_tutorial(flow, &mut engine, &report, config);
                    if !flow.is_active() {
                        tutorial = None;
                        if let Some(profiles) = profiles.as_mut() {
                            profiles.set_tutorial_completed(true);
                            save_profiles(args, profiles)?;
                        }
                        if config.session.start_tracking {
                            engine.start_tracking();
                        }
                    }
                }
            }
        }
    }

    engine.stop_tracking();
    let desktop = engine.platform();
    info!(
        "Session ended: {} cursor moves, {} clicks issued, final cursor {:?}",
        desktop.moves().len(),
        desktop.clicks().len(),
        desktop.cursor()
    );
    Ok(())
}

/// Advance the tutorial; information steps are confirmed automatically
fn drive_tutorial<P, L>(flow: &mut TutorialFlow, engine: &mut ControlLoop<P, L>, report: &FrameReport, config: &Config)
where
    P: CursorDevice + ClickSink,
    L: ControlLocator,
{
    let mut advanced = flow.on_report(report);
    while flow.is_active() && !flow.step().is_waiting() {
        flow.next();
        advanced = true;
    }
    if flow.take_gesture_reset() {
        engine.reset_gestures();
    }
    if advanced {
        info!("Tutorial: {}", flow.step().prompt(&config.gestures));
    }
}

fn save_profiles(args: &Args, profiles: &ProfileSet) -> Result<()> {
    let Some(path) = &args.profiles else {
        return Ok(());
    };
    let json = profiles.to_json().context("Failed to serialize profiles")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write profiles config: {}", path.display()))?;
    debug!("Profiles saved to {}", path.display());
    Ok(())
}

fn log_metrics_summary(metrics: &MetricsCollector) {
    let snapshot = metrics.snapshot();
    info!("──────────────── Session metrics ────────────────");
    info!(
        "Frames: {} in {:.1}s",
        snapshot.counter(metric_names::FRAMES_PROCESSED),
        snapshot.uptime.as_secs_f64()
    );
    for (name, value) in snapshot
        .counters
        .iter()
        .filter(|(name, _)| name.starts_with("frames_status_") || name.starts_with("clicks_"))
    {
        info!("  {}: {}", name, value);
    }
    info!(
        "Cursor moves: {}, stick engaged/released: {}/{}",
        snapshot.counter(metric_names::CURSOR_MOVES),
        snapshot.counter(metric_names::STICK_ENGAGED),
        snapshot.counter(metric_names::STICK_RELEASED)
    );
    info!(
        "Errors: platform {}, landmark {}",
        snapshot.counter(metric_names::PLATFORM_ERRORS),
        snapshot.counter(metric_names::LANDMARK_ERRORS)
    );
    if let Some(timing) = snapshot.histograms.get(metric_names::FRAME_PROCESSING_TIME_MS) {
        info!(
            "Frame time: mean {:.3}ms, p95 {:.3}ms, max {:.3}ms",
            timing.mean, timing.p95, timing.max
        );
    }
}

fn init_logging(args: &Args, logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let log_level = match args.verbose {
        0 => logging.level.to_lowercase(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("lamco_gaze_cursor={},warn", log_level))
    });

    // --log-file wins over [logging] log_dir
    let file_appender = match (&args.log_file, &logging.log_dir) {
        (Some(path), _) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path.file_name().context("--log-file must name a file")?;
            Some(tracing_appender::rolling::never(dir, name))
        }
        (None, Some(dir)) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            Some(tracing_appender::rolling::daily(dir, "lamco-gaze-cursor.log"))
        }
        (None, None) => None,
    };

    let (file_writer, guard) = match file_appender {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    let file_layer = file_writer.map(|writer| {
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
    });
    let registry = tracing_subscriber::registry().with(env_filter).with(file_layer);

    match args.log_format.as_str() {
        "json" => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        "compact" => registry.with(tracing_subscriber::fmt::layer().compact()).init(),
        _ => registry.with(tracing_subscriber::fmt::layer().pretty()).init(),
    }

    if let Some(path) = &args.log_file {
        info!("Logging to file: {}", path.display());
    }
    Ok(guard)
}
