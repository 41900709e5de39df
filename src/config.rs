use std::path::PathBuf;
use std::str::FromStr;

use crate::game::constants::{bot, food, hud, navigation, player, world};
use crate::game::input::Platform;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("world_size must be positive, got {0}")]
    WorldSize(f32),
    #[error("start_radius must be positive and fit inside the world, got {0}")]
    StartRadius(f32),
    #[error("{name} must be non-negative and finite, got {value}")]
    NegativeParameter { name: &'static str, value: f32 },
    #[error("bot_respawn_chance must be within 0..=1, got {0}")]
    RespawnChance(f64),
    #[error("leaderboard_interval must be at least 1 frame")]
    LeaderboardInterval,
    #[error("leaderboard_size must be at least 1 row")]
    LeaderboardSize,
    #[error("refresh_hz must be 1-1000, got {0}")]
    RefreshRate(u32),
    #[error("viewport must be non-empty, got {0}x{1}")]
    Viewport(f32, f32),
}

/// Balance parameters for the arena simulation
///
/// The navigation weights and sensor radii were tuned by hand and carry no
/// derivation; they are exposed here so they can be retuned without a rebuild.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Side length of the square arena
    pub world_size: f32,
    /// Pellets kept alive at all times
    pub food_count: usize,
    /// Target bot population
    pub bot_count: usize,
    /// Player radius at session start
    pub start_radius: f32,
    /// Base bot sensor radius (bot radius is added)
    pub sensor_range: f32,
    /// Target search radius multiplier
    pub target_range_factor: f32,
    /// Pellets this close to an edge are invisible to bots
    pub unsafe_food_margin: f32,
    /// Edge distance that triggers the wall push
    pub wall_sensor: f32,
    /// Weight of the wall push
    pub wall_weight: f32,
    /// Max wander heading change per frame (radians)
    pub wander_jitter: f32,
    /// Per-frame replacement chance while below the bot target
    pub bot_respawn_chance: f64,
    /// Frames between leaderboard recomputes
    pub leaderboard_interval: u64,
    /// Rows kept on the leaderboard
    pub leaderboard_size: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            world_size: world::SIZE,
            food_count: food::COUNT,
            bot_count: bot::COUNT,
            start_radius: player::START_RADIUS,
            sensor_range: navigation::SENSOR_RANGE,
            target_range_factor: navigation::TARGET_RANGE_FACTOR,
            unsafe_food_margin: navigation::UNSAFE_FOOD_MARGIN,
            wall_sensor: navigation::WALL_SENSOR,
            wall_weight: navigation::WALL_WEIGHT,
            wander_jitter: navigation::WANDER_JITTER,
            bot_respawn_chance: bot::RESPAWN_CHANCE,
            leaderboard_interval: hud::LEADERBOARD_INTERVAL,
            leaderboard_size: hud::LEADERBOARD_SIZE,
        }
    }
}

impl SimConfig {
    /// Load config from `ARENA_*` environment variables or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        env_override("ARENA_WORLD_SIZE", &mut config.world_size, |v| *v > 0.0);
        env_override("ARENA_FOOD_COUNT", &mut config.food_count, |v| *v <= 10_000);
        env_override("ARENA_BOT_COUNT", &mut config.bot_count, |v| *v <= 500);
        env_override("ARENA_START_RADIUS", &mut config.start_radius, |v| *v > 0.0);
        env_override("ARENA_SENSOR_RANGE", &mut config.sensor_range, |v| *v >= 0.0);
        env_override("ARENA_TARGET_RANGE_FACTOR", &mut config.target_range_factor, |v| {
            *v >= 0.0 && v.is_finite()
        });
        env_override("ARENA_WALL_SENSOR", &mut config.wall_sensor, |v| *v >= 0.0);
        env_override("ARENA_WALL_WEIGHT", &mut config.wall_weight, |v| *v >= 0.0);
        env_override("ARENA_WANDER_JITTER", &mut config.wander_jitter, |v| {
            *v >= 0.0 && v.is_finite()
        });
        env_override("ARENA_UNSAFE_FOOD_MARGIN", &mut config.unsafe_food_margin, |v| {
            *v >= 0.0
        });
        env_override("ARENA_BOT_RESPAWN_CHANCE", &mut config.bot_respawn_chance, |v| {
            (0.0..=1.0).contains(v)
        });
        env_override("ARENA_LEADERBOARD_INTERVAL", &mut config.leaderboard_interval, |v| {
            *v > 0
        });
        env_override("ARENA_LEADERBOARD_SIZE", &mut config.leaderboard_size, |v| *v > 0);

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.world_size > 0.0 && self.world_size.is_finite()) {
            return Err(ConfigError::WorldSize(self.world_size));
        }
        if !(self.start_radius > 0.0 && self.start_radius * 2.0 < self.world_size) {
            return Err(ConfigError::StartRadius(self.start_radius));
        }
        let non_negative = [
            ("sensor_range", self.sensor_range),
            ("target_range_factor", self.target_range_factor),
            ("unsafe_food_margin", self.unsafe_food_margin),
            ("wall_sensor", self.wall_sensor),
            ("wall_weight", self.wall_weight),
            ("wander_jitter", self.wander_jitter),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ConfigError::NegativeParameter { name, value });
            }
        }
        if !(0.0..=1.0).contains(&self.bot_respawn_chance) {
            return Err(ConfigError::RespawnChance(self.bot_respawn_chance));
        }
        if self.leaderboard_interval == 0 {
            return Err(ConfigError::LeaderboardInterval);
        }
        if self.leaderboard_size == 0 {
            return Err(ConfigError::LeaderboardSize);
        }
        Ok(())
    }
}

/// Settings for the headless host binary
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Simulated display refresh rate (one tick per frame)
    pub refresh_hz: u32,
    /// Screen size in pixels
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Which input priority chain to use
    pub platform: Platform,
    /// Sessions to play before exiting
    pub sessions: u32,
    /// Best score file
    pub best_score_path: PathBuf,
    /// Serve metrics on this port when set
    pub metrics_port: Option<u16>,
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            refresh_hz: 60,
            viewport_width: 1280.0,
            viewport_height: 720.0,
            platform: Platform::Desktop,
            sessions: 3,
            best_score_path: PathBuf::from("data/best_score.json"),
            metrics_port: None,
            seed: None,
        }
    }
}

impl HostConfig {
    /// Load host settings from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        env_override("REFRESH_HZ", &mut config.refresh_hz, |v| (1..=1000).contains(v));
        env_override("VIEWPORT_WIDTH", &mut config.viewport_width, |v| *v > 0.0);
        env_override("VIEWPORT_HEIGHT", &mut config.viewport_height, |v| *v > 0.0);
        env_override("SESSIONS", &mut config.sessions, |v| *v > 0);

        if let Ok(platform) = std::env::var("PLATFORM") {
            match platform.to_ascii_lowercase().as_str() {
                "desktop" => config.platform = Platform::Desktop,
                "mobile" => config.platform = Platform::Mobile,
                _ => tracing::warn!("Invalid PLATFORM '{}', using default", platform),
            }
        }

        if let Ok(path) = std::env::var("BEST_SCORE_PATH") {
            config.best_score_path = PathBuf::from(path);
        }

        let mut port = 0u16;
        if env_override("METRICS_PORT", &mut port, |v| *v > 0) {
            config.metrics_port = Some(port);
        }

        let mut seed = 0u64;
        if env_override("SEED", &mut seed, |_| true) {
            config.seed = Some(seed);
        }

        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=1000).contains(&self.refresh_hz) {
            return Err(ConfigError::RefreshRate(self.refresh_hz));
        }
        if !(self.viewport_width > 0.0 && self.viewport_height > 0.0) {
            return Err(ConfigError::Viewport(
                self.viewport_width,
                self.viewport_height,
            ));
        }
        Ok(())
    }
}

/// Overwrite `target` from env var `key` when it parses and passes `valid`.
/// Returns true when the value was applied.
fn env_override<T, F>(key: &str, target: &mut T, valid: F) -> bool
where
    T: FromStr + std::fmt::Debug,
    F: Fn(&T) -> bool,
{
    let Ok(raw) = std::env::var(key) else {
        return false;
    };
    match raw.parse::<T>() {
        Ok(parsed) if valid(&parsed) => {
            *target = parsed;
            true
        }
        Ok(parsed) => {
            tracing::warn!("{} value {:?} out of range, using default", key, parsed);
            false
        }
        Err(_) => {
            tracing::warn!("Invalid {} '{}', using default", key, raw);
            false
        }
    }
}
