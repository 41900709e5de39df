//! Prometheus-compatible arena metrics
//!
//! Counters and gauges for the simulation, rendered in Prometheus text format
//! and optionally served over a bare TCP responder at `/metrics`.

use std::collections::VecDeque;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::game::frame_loop::FrameReport;
use crate::game::session::Session;

const HISTORY: usize = 600;

/// Metrics registry for the arena host
#[derive(Debug)]
pub struct Metrics {
    // Frame timing (microseconds)
    pub frame_time_us: AtomicU64,
    pub frame_time_p95_us: AtomicU64,
    pub frame_time_max_us: AtomicU64,
    pub frames: AtomicU64,

    // Session lifecycle
    pub sessions_started: AtomicU64,
    pub sessions_ended: AtomicU64,

    // Consumption
    pub food_eaten: AtomicU64,
    pub bots_eaten: AtomicU64,
    pub bots_respawned: AtomicU64,

    // World gauges
    pub live_bots: AtomicU64,
    pub live_food: AtomicU64,
    pub player_radius: AtomicU64,
    pub best_score: AtomicU64,

    start_time: Instant,

    // Rolling frame times for percentiles
    frame_history: RwLock<VecDeque<u64>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            frame_time_us: AtomicU64::new(0),
            frame_time_p95_us: AtomicU64::new(0),
            frame_time_max_us: AtomicU64::new(0),
            frames: AtomicU64::new(0),
            sessions_started: AtomicU64::new(0),
            sessions_ended: AtomicU64::new(0),
            food_eaten: AtomicU64::new(0),
            bots_eaten: AtomicU64::new(0),
            bots_respawned: AtomicU64::new(0),
            live_bots: AtomicU64::new(0),
            live_food: AtomicU64::new(0),
            player_radius: AtomicU64::new(0),
            best_score: AtomicU64::new(0),
            start_time: Instant::now(),
            frame_history: RwLock::new(VecDeque::with_capacity(HISTORY)),
        }
    }

    /// Record how long one frame's update and draw took
    pub fn record_frame_time(&self, duration: Duration) {
        let us = duration.as_micros() as u64;
        self.frame_time_us.store(us, Ordering::Relaxed);
        self.frames.fetch_add(1, Ordering::Relaxed);

        let mut history = self.frame_history.write();
        history.push_back(us);
        while history.len() > HISTORY {
            history.pop_front();
        }

        if history.len() >= 10 {
            let mut sorted: Vec<u64> = history.iter().copied().collect();
            sorted.sort_unstable();
            let p95_idx = (sorted.len() as f32 * 0.95) as usize;
            self.frame_time_p95_us
                .store(sorted[p95_idx.min(sorted.len() - 1)], Ordering::Relaxed);
            self.frame_time_max_us
                .store(sorted.last().copied().unwrap_or(0), Ordering::Relaxed);
        }
    }

    /// Fold a frame report and the session gauges into the registry
    pub fn record_frame(&self, report: &FrameReport, session: &Session) {
        match report {
            FrameReport::Drawn { tick, .. } => {
                self.food_eaten
                    .fetch_add(tick.food_eaten as u64, Ordering::Relaxed);
                self.bots_eaten
                    .fetch_add(tick.bots_eaten as u64, Ordering::Relaxed);
                self.bots_respawned
                    .fetch_add(tick.bots_respawned as u64, Ordering::Relaxed);
            }
            FrameReport::SessionEnded(_) => {
                self.sessions_ended.fetch_add(1, Ordering::Relaxed);
            }
            FrameReport::Idle => {}
        }

        let state = session.state();
        self.live_bots
            .store(state.bots.len() as u64, Ordering::Relaxed);
        self.live_food
            .store(state.food.len() as u64, Ordering::Relaxed);
        self.player_radius
            .store(u64::from(session.score()), Ordering::Relaxed);
        self.best_score
            .store(u64::from(session.best_score()), Ordering::Relaxed);
    }

    pub fn record_session_start(&self) {
        self.sessions_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Generate Prometheus-format metrics output
    pub fn to_prometheus(&self) -> String {
        let mut output = String::with_capacity(2048);

        macro_rules! metric {
            ($name:expr, $help:expr, $type:expr, $value:expr $(,)?) => {
                let _ = write!(
                    output,
                    "# HELP {} {}\n# TYPE {} {}\n{} {}\n",
                    $name, $help, $name, $type, $name, $value
                );
            };
        }

        metric!(
            "ayang_arena_frames_total",
            "Frames simulated",
            "counter",
            self.frames.load(Ordering::Relaxed),
        );
        metric!(
            "ayang_arena_frame_time_microseconds",
            "Last frame work time",
            "gauge",
            self.frame_time_us.load(Ordering::Relaxed),
        );
        metric!(
            "ayang_arena_frame_time_p95_microseconds",
            "95th percentile frame work time",
            "gauge",
            self.frame_time_p95_us.load(Ordering::Relaxed),
        );
        metric!(
            "ayang_arena_frame_time_max_microseconds",
            "Maximum frame work time",
            "gauge",
            self.frame_time_max_us.load(Ordering::Relaxed),
        );

        metric!(
            "ayang_arena_sessions_started_total",
            "Sessions started",
            "counter",
            self.sessions_started.load(Ordering::Relaxed),
        );
        metric!(
            "ayang_arena_sessions_ended_total",
            "Sessions ended by player death",
            "counter",
            self.sessions_ended.load(Ordering::Relaxed),
        );

        metric!(
            "ayang_arena_food_eaten_total",
            "Pellets eaten",
            "counter",
            self.food_eaten.load(Ordering::Relaxed),
        );
        metric!(
            "ayang_arena_bots_eaten_total",
            "Bots eaten",
            "counter",
            self.bots_eaten.load(Ordering::Relaxed),
        );
        metric!(
            "ayang_arena_bots_respawned_total",
            "Replacement bots spawned",
            "counter",
            self.bots_respawned.load(Ordering::Relaxed),
        );

        metric!(
            "ayang_arena_bots",
            "Live bots",
            "gauge",
            self.live_bots.load(Ordering::Relaxed),
        );
        metric!(
            "ayang_arena_food",
            "Live pellets",
            "gauge",
            self.live_food.load(Ordering::Relaxed),
        );
        metric!(
            "ayang_arena_player_score",
            "Current player score",
            "gauge",
            self.player_radius.load(Ordering::Relaxed),
        );
        metric!(
            "ayang_arena_best_score",
            "Persisted best score",
            "gauge",
            self.best_score.load(Ordering::Relaxed),
        );
        metric!(
            "ayang_arena_uptime_seconds",
            "Host uptime",
            "counter",
            self.uptime_seconds(),
        );

        output
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Serve `/metrics` until the listener fails
pub async fn start_metrics_server(metrics: Arc<Metrics>, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;

    info!("Metrics server listening on http://{}/metrics", addr);

    loop {
        let (mut socket, peer) = listener.accept().await?;
        let metrics = metrics.clone();

        tokio::spawn(async move {
            let mut buffer = [0u8; 1024];

            match socket.read(&mut buffer).await {
                Ok(n) if n > 0 => {
                    let request = String::from_utf8_lossy(&buffer[..n]);
                    let response = if request.starts_with("GET /metrics") {
                        let body = metrics.to_prometheus();
                        format!(
                            "HTTP/1.1 200 OK\r\nContent-Type: text/plain; version=0.0.4\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        )
                    } else {
                        "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                            .to_string()
                    };

                    if let Err(e) = socket.write_all(response.as_bytes()).await {
                        debug!("Failed to write metrics response to {}: {}", peer, e);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    debug!("Failed to read from metrics socket {}: {}", peer, e);
                }
            }
        });
    }
}
