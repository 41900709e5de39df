#[cfg(feature = "metrics")]
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use ayang_arena::config::{HostConfig, SimConfig};
use ayang_arena::game::frame_loop::{FrameDriver, FrameHandle, FrameReport, FrameScheduler};
use ayang_arena::game::input::{InputError, InputEvent, InputSender};
use ayang_arena::game::session::{Session, SessionListener, SessionSummary};
#[cfg(feature = "metrics")]
use ayang_arena::metrics::{self, Metrics};
use ayang_arena::persistence::JsonFileScoreStore;
use ayang_arena::render::RecordingSurface;
use ayang_arena::util::vec2::Vec2;

/// Frame scheduler backed by a tokio interval: a request arms the next tick
#[derive(Debug, Default)]
struct IntervalScheduler {
    next: u64,
    armed: Option<FrameHandle>,
}

impl IntervalScheduler {
    /// Consume the armed request, if any
    fn take_armed(&mut self) -> Option<FrameHandle> {
        self.armed.take()
    }
}

impl FrameScheduler for IntervalScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next += 1;
        let handle = FrameHandle(self.next);
        self.armed = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.armed == Some(handle) {
            self.armed = None;
        }
    }
}

/// Presents lifecycle signals as log lines
struct LogListener;

impl SessionListener for LogListener {
    fn on_session_end(&mut self, summary: &SessionSummary) {
        info!(
            "Game over: eaten by {} with score {} (best {}{})",
            summary.killer_name,
            summary.final_score,
            summary.best_score,
            if summary.new_record { ", new record" } else { "" }
        );
    }

    fn on_restart_requested(&mut self) {
        debug!("Restart requested");
    }

    fn on_exit_requested(&mut self) {
        debug!("Exit requested");
    }
}

/// Wandering pointer standing in for a human on the desktop input chain
async fn run_autopilot(sender: InputSender, viewport: Vec2, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut interval = tokio::time::interval(Duration::from_millis(250));
    let mut pointer = viewport * 0.5;

    loop {
        interval.tick().await;
        let step = Vec2::new(rng.gen_range(-120.0..120.0), rng.gen_range(-120.0..120.0));
        pointer += step;
        pointer = Vec2::new(pointer.x.clamp(0.0, viewport.x), pointer.y.clamp(0.0, viewport.y));

        match sender.send(InputEvent::PointerMoved(pointer)) {
            Ok(()) => {}
            Err(InputError::Full) => debug!("Input channel full, dropping pointer sample"),
            Err(InputError::Disconnected) => break,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Ayang Arena v{}", env!("CARGO_PKG_VERSION"));

    let sim_config = SimConfig::load_or_default();
    let host = HostConfig::load_or_default();
    host.validate()?;
    info!(
        "Configuration loaded: world {}, {} bots, {} food, {:?} at {} Hz, {} session(s)",
        sim_config.world_size,
        sim_config.bot_count,
        sim_config.food_count,
        host.platform,
        host.refresh_hz,
        host.sessions
    );

    #[cfg(feature = "metrics")]
    let metrics = Arc::new(Metrics::new());
    #[cfg(feature = "metrics")]
    if let Some(port) = host.metrics_port {
        let metrics = metrics.clone();
        tokio::spawn(async move {
            if let Err(e) = metrics::start_metrics_server(metrics, port).await {
                error!("Metrics server error: {}", e);
            }
        });
    }

    let store = JsonFileScoreStore::new(host.best_score_path.clone());
    let session = Session::new(sim_config, Box::new(store), host.seed)?;
    let viewport = Vec2::new(host.viewport_width, host.viewport_height);

    let mut driver = FrameDriver::new(
        session,
        IntervalScheduler::default(),
        host.platform,
        viewport,
        host.refresh_hz,
    )
    .with_listener(Box::new(LogListener));

    let autopilot_seed = host.seed.unwrap_or_else(rand::random);
    let autopilot = tokio::spawn(run_autopilot(
        driver.input_sender(),
        viewport,
        autopilot_seed,
    ));

    #[cfg(feature = "metrics")]
    metrics.record_session_start();
    driver.start();

    let mut interval = tokio::time::interval(Duration::from_nanos(
        1_000_000_000 / u64::from(host.refresh_hz),
    ));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut surface = RecordingSurface::new();
    let mut finished = 0u32;

    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                if let Err(e) = result {
                    warn!("Ctrl+C handler failed: {}", e);
                }
                info!("Shutdown signal received");
                break;
            }
            _ = interval.tick() => {
                if driver.scheduler_mut().take_armed().is_none() {
                    // Nothing requested: the last session ended
                    driver.poll_input();
                    if finished >= host.sessions {
                        break;
                    }
                    driver.restart();
                    #[cfg(feature = "metrics")]
                    metrics.record_session_start();
                    continue;
                }

                surface.clear();
                let started = Instant::now();
                let report = driver.on_frame(&mut surface);
                #[cfg(feature = "metrics")]
                {
                    metrics.record_frame_time(started.elapsed());
                    metrics.record_frame(&report, driver.session());
                }
                #[cfg(not(feature = "metrics"))]
                let _ = started;

                if let FrameReport::SessionEnded(_) = report {
                    finished += 1;
                    if finished >= host.sessions {
                        break;
                    }
                }
            }
        }
    }

    driver.exit();
    autopilot.abort();

    info!(
        "Played {} session(s), best score {}",
        finished,
        driver.session().best_score()
    );
    Ok(())
}
