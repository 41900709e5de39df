//! Frame-driven loop: one update then one draw per display refresh
//!
//! The host owns the actual refresh signal through `FrameScheduler`. The
//! driver requests a frame, and when the host grants it, runs the tick, draws
//! and requests the next one. After the player dies no further frame is
//! requested until a restart. Exiting cancels the pending request.

use tracing::info;

use crate::game::frame_budget::FrameBudget;
use crate::game::input::{InputLatch, InputSender, Platform};
use crate::game::session::{Session, SessionListener, SessionSummary, TickOutcome, TickStats};
use crate::render::camera::screen_center;
use crate::render::{self, DrawStats, Hud, RenderSurface};
use crate::util::vec2::Vec2;

/// Opaque id of a pending frame request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Per-refresh callback registration supplied by the host
pub trait FrameScheduler {
    /// Register interest in the next display refresh
    fn request_frame(&mut self) -> FrameHandle;
    /// Withdraw a pending registration
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// What a granted frame did
#[derive(Debug, Clone, PartialEq)]
pub enum FrameReport {
    /// Ticked and drew; the next frame is requested
    Drawn { tick: TickStats, draw: DrawStats },
    /// The player died during this frame's tick; nothing drawn
    SessionEnded(SessionSummary),
    /// Session over or driver exited; nothing happened
    Idle,
}

/// Drives a `Session` from host frame callbacks
pub struct FrameDriver<S: FrameScheduler> {
    scheduler: S,
    session: Session,
    latch: InputLatch,
    platform: Platform,
    viewport: Vec2,
    budget: FrameBudget,
    pending: Option<FrameHandle>,
    listener: Option<Box<dyn SessionListener + Send>>,
    exited: bool,
}

impl<S: FrameScheduler> FrameDriver<S> {
    pub fn new(
        session: Session,
        scheduler: S,
        platform: Platform,
        viewport: Vec2,
        refresh_hz: u32,
    ) -> Self {
        Self {
            scheduler,
            session,
            latch: InputLatch::default(),
            platform,
            viewport,
            budget: FrameBudget::new(refresh_hz),
            pending: None,
            listener: None,
            exited: false,
        }
    }

    pub fn with_listener(mut self, listener: Box<dyn SessionListener + Send>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Handle for the input layer to push events into
    pub fn input_sender(&self) -> InputSender {
        self.latch.sender()
    }

    /// Request the first frame
    pub fn start(&mut self) {
        if !self.exited {
            self.request_next();
        }
    }

    fn request_next(&mut self) {
        if self.pending.is_none() {
            self.pending = Some(self.scheduler.request_frame());
        }
    }

    /// Run the granted frame: tick, then draw, then request the next frame
    pub fn on_frame<R: RenderSurface + ?Sized>(&mut self, surface: &mut R) -> FrameReport {
        self.pending = None;
        if self.exited || !self.session.is_running() {
            self.latch.drain();
            return FrameReport::Idle;
        }

        self.budget.frame_start();
        let sample = self.latch.latest().clone();
        let outcome = self
            .session
            .tick(&sample, self.platform, screen_center(self.viewport));

        let report = match outcome {
            TickOutcome::Running(tick) => {
                let hud = Hud::from_session(&self.session);
                let draw = render::draw_frame(
                    surface,
                    self.session.state(),
                    &hud,
                    self.session.config().world_size,
                    self.viewport,
                );
                self.request_next();
                FrameReport::Drawn { tick, draw }
            }
            TickOutcome::Ended(summary) => {
                if let Some(listener) = self.listener.as_mut() {
                    listener.on_session_end(&summary);
                }
                FrameReport::SessionEnded(summary)
            }
            TickOutcome::Idle => FrameReport::Idle,
        };
        self.budget.frame_end();
        report
    }

    /// Keep the input channel flowing while no frame is running, e.g. on the
    /// game-over screen
    pub fn poll_input(&mut self) {
        self.latch.drain();
    }

    /// Start a fresh session and resume the loop
    pub fn restart(&mut self) {
        if self.exited {
            return;
        }
        if let Some(listener) = self.listener.as_mut() {
            listener.on_restart_requested();
        }
        self.latch.reset_transient();
        self.session.restart();
        self.request_next();
    }

    /// Leave the arena: cancel the pending frame and stop for good
    pub fn exit(&mut self) {
        if self.exited {
            return;
        }
        if let Some(listener) = self.listener.as_mut() {
            listener.on_exit_requested();
        }
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
        self.exited = true;
        info!("Left the arena after {} session(s)", self.session.generation());
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn budget(&self) -> &FrameBudget {
        &self.budget
    }

    pub fn has_pending_frame(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_exited(&self) -> bool {
        self.exited
    }
}
