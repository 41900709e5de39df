//! Ayang Arena
//!
//! A single-player agar.io-style arena: the player and a population of
//! locally simulated bots graze on pellets and eat each other, growing by
//! area. Runs one update and one draw per display frame.
//!
//! # Features
//!
//! - `metrics` - Prometheus-style counters and an optional text endpoint (enabled by default)

pub mod config;
pub mod game;
pub mod persistence;
pub mod render;
pub mod util;

#[cfg(feature = "metrics")]
pub mod metrics;
