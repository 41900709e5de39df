//! Player input: event channel from the input layer and the per-frame translator
//!
//! Event handlers run asynchronously to the frame loop. They only push
//! `InputEvent`s into a bounded crossbeam channel; the tick drains the channel
//! exactly once per frame and folds the events into a single `InputSample`,
//! so the translator never observes a half-applied update.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use smallvec::SmallVec;

use crate::game::constants::{input, radius_to_speed, speed};
use crate::game::state::Entity;
use crate::util::vec2::Vec2;

/// Which input priority chain applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Directional keys, then pointer
    Desktop,
    /// Virtual joystick, then device tilt
    Mobile,
}

/// The four directional keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Map a DOM-style key code (WASD or arrows)
    pub fn from_key_code(code: &str) -> Option<Self> {
        match code {
            "KeyW" | "ArrowUp" => Some(Direction::Up),
            "KeyS" | "ArrowDown" => Some(Direction::Down),
            "KeyA" | "ArrowLeft" => Some(Direction::Left),
            "KeyD" | "ArrowRight" => Some(Direction::Right),
            _ => None,
        }
    }

    fn vector(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::UP,
            Direction::Down => Vec2::DOWN,
            Direction::Left => Vec2::LEFT,
            Direction::Right => Vec2::RIGHT,
        }
    }
}

/// Device tilt, each axis normalized to [-1, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tilt {
    /// Front/back tilt (drives y)
    pub beta: f32,
    /// Left/right tilt (drives x)
    pub gamma: f32,
}

impl Tilt {
    /// Clamp raw orientation angles (degrees) to the tilt limit and normalize.
    /// Missing readings count as level.
    pub fn from_degrees(beta: Option<f32>, gamma: Option<f32>) -> Self {
        let limit = input::TILT_LIMIT_DEGREES;
        let norm = |deg: Option<f32>| {
            let d = deg.filter(|d| d.is_finite()).unwrap_or(0.0);
            d.clamp(-limit, limit) / limit
        };
        Self {
            beta: norm(beta),
            gamma: norm(gamma),
        }
    }
}

/// Raw input event from the input layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(Direction),
    KeyUp(Direction),
    /// Pointer position in screen pixels
    PointerMoved(Vec2),
    /// Joystick drag delta from the stick center, in screen pixels
    JoystickMoved(Vec2),
    JoystickReleased,
    Tilt(Tilt),
}

/// Latest input state, read once per frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSample {
    /// Directional keys currently held
    pub held: SmallVec<[Direction; 4]>,
    /// Last known pointer position; None until the pointer first moves
    pub pointer: Option<Vec2>,
    /// Active joystick drag; None when released
    pub joystick: Option<Vec2>,
    pub tilt: Tilt,
}

impl InputSample {
    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown(dir) => {
                if !self.held.contains(&dir) {
                    self.held.push(dir);
                }
            }
            InputEvent::KeyUp(dir) => self.held.retain(|d| *d != dir),
            InputEvent::PointerMoved(pos) => self.pointer = Some(pos),
            InputEvent::JoystickMoved(delta) => self.joystick = Some(delta),
            InputEvent::JoystickReleased => self.joystick = None,
            InputEvent::Tilt(tilt) => self.tilt = tilt,
        }
    }

    /// Net key vector; opposite keys cancel
    pub fn key_vector(&self) -> Vec2 {
        let mut v = Vec2::ZERO;
        for dir in &self.held {
            v += dir.vector();
        }
        v
    }
}

/// Input channel errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    /// Channel is full (the frame loop is stalled)
    #[error("input channel full")]
    Full,
    /// The frame loop is gone
    #[error("input channel disconnected")]
    Disconnected,
}

/// Clonable sender handle for event handlers
#[derive(Clone)]
pub struct InputSender {
    sender: Sender<InputEvent>,
}

impl InputSender {
    /// Submit an event (non-blocking)
    #[inline]
    pub fn send(&self, event: InputEvent) -> Result<(), InputError> {
        self.sender.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => InputError::Full,
            TrySendError::Disconnected(_) => InputError::Disconnected,
        })
    }
}

/// Receives input events and keeps the folded sample
pub struct InputLatch {
    sender: Sender<InputEvent>,
    receiver: Receiver<InputEvent>,
    sample: InputSample,
}

impl InputLatch {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            sample: InputSample::default(),
        }
    }

    /// New sender handle for an input source
    pub fn sender(&self) -> InputSender {
        InputSender {
            sender: self.sender.clone(),
        }
    }

    /// Fold pending events into the sample without reading it
    pub fn drain(&mut self) {
        for event in self.receiver.try_iter() {
            self.sample.apply(event);
        }
    }

    /// Drain pending events and return the folded sample
    pub fn latest(&mut self) -> &InputSample {
        self.drain();
        &self.sample
    }

    /// Fold pending events, then release the joystick (used on restart).
    /// Held keys and the pointer carry over as the input layer last reported them.
    pub fn reset_transient(&mut self) {
        self.drain();
        self.sample.joystick = None;
    }

    #[inline]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }
}

impl Default for InputLatch {
    fn default() -> Self {
        Self::new(input::EVENT_CAPACITY)
    }
}

/// Pick the single active input source and return its raw intent vector
pub fn intent(sample: &InputSample, platform: Platform, screen_center: Vec2) -> Vec2 {
    match platform {
        Platform::Desktop => {
            let keys = sample.key_vector();
            if !keys.is_zero(f32::EPSILON) {
                keys
            } else if let Some(pointer) = sample.pointer {
                pointer - screen_center
            } else {
                Vec2::ZERO
            }
        }
        Platform::Mobile => match sample.joystick {
            Some(drag) => drag,
            None => Vec2::new(sample.tilt.gamma, sample.tilt.beta) * input::TILT_SCALE,
        },
    }
}

/// Turn an intent into the player's velocity for this frame.
///
/// Non-zero intent is normalized and scaled by the radius speed curve; zero
/// intent damps the existing velocity so the player coasts to a stop.
pub fn steer_player(player: &mut Entity, intent: Vec2) {
    if intent.length_sq() > 0.0 {
        player.velocity = intent.normalize() * radius_to_speed(player.radius);
    } else {
        player.velocity *= speed::DAMPING;
    }
}
