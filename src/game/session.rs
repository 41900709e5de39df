//! Arena session: owns the world and runs one simulation tick per frame
//!
//! Tick order: player input, bot navigation, consumption. The leaderboard is
//! refreshed on its frame cadence. Once the player is eaten the session is
//! `Ended` and every further tick is a no-op until `restart`.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{ConfigError, SimConfig};
use crate::game::input::{self, InputSample, Platform};
use crate::game::leaderboard::{refresh_due, score_for_radius, LeaderboardSnapshot};
use crate::game::state::{SessionPhase, WorldState};
use crate::game::systems::{consumption, movement, navigation};
use crate::game::world;
use crate::persistence::BestScoreStore;
use crate::util::vec2::Vec2;

/// Final result of a session, handed to the UI shell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Player radius at death, floored
    pub final_score: u32,
    /// Display name of the entity that ate the player
    pub killer_name: String,
    /// Best score after this session
    pub best_score: u32,
    /// Final score strictly beat the stored best
    pub new_record: bool,
    /// Frames survived
    pub frames: u64,
}

/// Per-tick counters while the session runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    pub food_eaten: usize,
    pub bots_eaten: usize,
    pub bots_respawned: usize,
    pub leaderboard_refreshed: bool,
}

/// What a tick did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Simulation advanced one frame
    Running(TickStats),
    /// The player died on this tick
    Ended(SessionSummary),
    /// Session already ended; nothing happened
    Idle,
}

/// Lifecycle signals exchanged with the UI shell
pub trait SessionListener {
    /// The player died; fired exactly once per death
    fn on_session_end(&mut self, summary: &SessionSummary);

    /// The shell asked for a fresh session
    fn on_restart_requested(&mut self) {}

    /// The shell is leaving the arena
    fn on_exit_requested(&mut self) {}
}

/// One arena game, reusable across restarts
pub struct Session {
    config: SimConfig,
    state: WorldState,
    phase: SessionPhase,
    rng: StdRng,
    leaderboard: LeaderboardSnapshot,
    best_score: u32,
    final_score: Option<u32>,
    killer_name: Option<String>,
    store: Box<dyn BestScoreStore>,
    /// Sessions started, including the current one
    generation: u32,
}

impl Session {
    /// Create a session, read the best score once and populate the world
    ///
    /// Fails if `config` does not pass `SimConfig::validate`.
    pub fn new(
        config: SimConfig,
        store: Box<dyn BestScoreStore>,
        seed: Option<u64>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let best_score = store.load().unwrap_or_else(|e| {
            warn!("Failed to load best score, starting from 0: {}", e);
            0
        });

        let mut session = Self {
            state: WorldState::new(&config),
            config,
            phase: SessionPhase::Running,
            rng,
            leaderboard: LeaderboardSnapshot::default(),
            best_score,
            final_score: None,
            killer_name: None,
            store,
            generation: 0,
        };
        session.reset();
        Ok(session)
    }

    /// Reinitialize the world and clear the terminal state
    fn reset(&mut self) {
        world::reset_world(&mut self.state, &self.config, &mut self.rng);
        self.phase = SessionPhase::Running;
        self.leaderboard = LeaderboardSnapshot::default();
        self.final_score = None;
        self.killer_name = None;
        self.generation += 1;
        info!(
            "Session {} started: {} bots, {} food, best score {}",
            self.generation,
            self.state.bots.len(),
            self.state.food.len(),
            self.best_score
        );
    }

    /// Start over with a fresh world, regardless of how the last session ended
    pub fn restart(&mut self) {
        info!("Restarting session");
        self.reset();
    }

    /// Advance the simulation by one frame
    pub fn tick(
        &mut self,
        sample: &InputSample,
        platform: Platform,
        screen_center: Vec2,
    ) -> TickOutcome {
        if self.phase == SessionPhase::Ended {
            return TickOutcome::Idle;
        }

        let intent = input::intent(sample, platform, screen_center);
        input::steer_player(&mut self.state.player, intent);
        movement::update_player(&mut self.state, self.config.world_size);

        navigation::update(&mut self.state, &self.config, &mut self.rng);

        let outcome = consumption::update(&mut self.state, &self.config, &mut self.rng);
        if let Some(killer) = outcome.player_killed_by {
            return TickOutcome::Ended(self.end(killer));
        }

        self.state.frame += 1;
        let leaderboard_refreshed = refresh_due(self.state.frame, self.config.leaderboard_interval);
        if leaderboard_refreshed {
            self.leaderboard =
                LeaderboardSnapshot::compute(&self.state, self.config.leaderboard_size);
            debug!(
                "Leaderboard refreshed at frame {}: player rank {:?}",
                self.state.frame,
                self.leaderboard.player_rank()
            );
        }

        TickOutcome::Running(TickStats {
            food_eaten: outcome.food_eaten,
            bots_eaten: outcome.bots_eaten,
            bots_respawned: outcome.bots_respawned,
            leaderboard_refreshed,
        })
    }

    /// Freeze the score, persist a new record and enter the terminal state
    fn end(&mut self, killer_name: String) -> SessionSummary {
        let final_score = score_for_radius(self.state.player.radius);
        let new_record = final_score > self.best_score;

        if new_record {
            self.best_score = final_score;
            if let Err(e) = self.store.save(final_score) {
                warn!("Failed to save best score {}: {}", final_score, e);
            }
        }

        self.phase = SessionPhase::Ended;
        self.final_score = Some(final_score);
        self.killer_name = Some(killer_name.clone());

        info!(
            "Session {} ended at frame {}: eaten by {}, score {}{}",
            self.generation,
            self.state.frame,
            killer_name,
            final_score,
            if new_record { " (new record)" } else { "" }
        );

        SessionSummary {
            final_score,
            killer_name,
            best_score: self.best_score,
            new_record,
            frames: self.state.frame,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    pub fn state(&self) -> &WorldState {
        &self.state
    }

    /// Mutable world access for hosts and tests that stage scenarios
    pub fn state_mut(&mut self) -> &mut WorldState {
        &mut self.state
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn leaderboard(&self) -> &LeaderboardSnapshot {
        &self.leaderboard
    }

    /// Current score while alive, frozen at death
    pub fn score(&self) -> u32 {
        self.final_score
            .unwrap_or_else(|| score_for_radius(self.state.player.radius))
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn killer_name(&self) -> Option<&str> {
        self.killer_name.as_deref()
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::input::{Direction, InputEvent};
    use crate::game::state::{Color, Entity, EntityId};
    use crate::persistence::MemoryScoreStore;
    use rand::Rng;
    use std::sync::Arc;

    const CENTER: Vec2 = Vec2 { x: 640.0, y: 360.0 };

    fn create_test_session(config: SimConfig) -> Session {
        Session::new(config, Box::new(MemoryScoreStore::new()), Some(42)).unwrap()
    }

    fn empty_config() -> SimConfig {
        SimConfig {
            food_count: 0,
            bot_count: 0,
            ..SimConfig::default()
        }
    }

    fn held_right() -> InputSample {
        let mut sample = InputSample::default();
        sample.apply(InputEvent::KeyDown(Direction::Right));
        sample
    }

    fn place_killer(session: &mut Session, name: &str) {
        let player = session.state().player.position;
        let serial = session.state_mut().next_entity_id();
        session.state_mut().bots.push(Entity::new_bot(
            EntityId::bot(serial),
            player,
            200.0,
            name.to_string(),
            Color::pastel(0),
            0.0,
        ));
    }

    /// Shares the saved score with the test after the session takes ownership
    struct SharedStore(Arc<MemoryScoreStore>);

    impl BestScoreStore for SharedStore {
        fn load(&self) -> Result<u32, crate::persistence::PersistenceError> {
            self.0.load()
        }

        fn save(&self, score: u32) -> Result<(), crate::persistence::PersistenceError> {
            self.0.save(score)
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = SimConfig {
            bot_respawn_chance: 1.5,
            ..SimConfig::default()
        };
        let result = Session::new(config, Box::new(MemoryScoreStore::new()), Some(42));
        assert!(matches!(result, Err(ConfigError::RespawnChance(c)) if c == 1.5));

        let config = SimConfig {
            bot_respawn_chance: f64::NAN,
            ..SimConfig::default()
        };
        assert!(Session::new(config, Box::new(MemoryScoreStore::new()), None).is_err());
    }

    #[test]
    fn test_new_session_is_populated() {
        let session = create_test_session(SimConfig::default());
        assert!(session.is_running());
        assert_eq!(session.state().bots.len(), 18);
        assert_eq!(session.state().food.len(), 400);
        assert_eq!(session.score(), 25);
        assert!(session.leaderboard().is_empty());
        assert_eq!(session.generation(), 1);
    }

    #[test]
    fn test_end_to_end_rightward_until_clamped() {
        let mut session = create_test_session(empty_config());
        let sample = held_right();
        let limit = session.config().world_size - session.state().player.radius;

        let mut prev_x = session.state().player.position.x;
        let mut clamped_at = None;
        for tick in 0..800 {
            let outcome = session.tick(&sample, Platform::Desktop, CENTER);
            assert!(matches!(outcome, TickOutcome::Running(_)));
            let x = session.state().player.position.x;
            match clamped_at {
                None if x < limit => assert!(x > prev_x, "x stalled at tick {}", tick),
                None => {
                    assert_eq!(x, limit);
                    clamped_at = Some(tick);
                }
                Some(_) => assert_eq!(x, prev_x),
            }
            prev_x = x;
        }
        assert!(clamped_at.is_some());
        assert_eq!(session.state().player.position.y, 2000.0);
    }

    #[test]
    fn test_boundary_invariant_under_random_input() {
        let mut session = create_test_session(SimConfig::default());
        let mut rng = StdRng::seed_from_u64(99);
        let world_size = session.config().world_size;

        for _ in 0..600 {
            let mut sample = InputSample::default();
            sample.apply(InputEvent::PointerMoved(Vec2::new(
                rng.gen_range(-2000.0..3000.0),
                rng.gen_range(-2000.0..3000.0),
            )));
            if session.tick(&sample, Platform::Desktop, CENTER) != TickOutcome::Idle {
                for e in session.state().entities() {
                    assert!(e.radius > 0.0);
                    assert!(e.within_world(world_size), "{} escaped: {:?}", e.id, e.position);
                }
            } else {
                session.restart();
            }
        }
    }

    #[test]
    fn test_death_ends_session_once() {
        let mut session = create_test_session(empty_config());
        place_killer(&mut session, "Kang Tikung");

        let outcome = session.tick(&InputSample::default(), Platform::Desktop, CENTER);
        let TickOutcome::Ended(summary) = outcome else {
            panic!("expected the player to be eaten");
        };
        assert_eq!(summary.killer_name, "Kang Tikung");
        assert_eq!(summary.final_score, 25);
        assert!(summary.new_record);
        assert_eq!(session.phase(), SessionPhase::Ended);
        assert_eq!(session.killer_name(), Some("Kang Tikung"));

        // Further ticks never mutate or re-fire the end
        let frozen = session.state().player.position;
        let bots = session.state().bots[0].position;
        for _ in 0..10 {
            assert_eq!(session.tick(&held_right(), Platform::Desktop, CENTER), TickOutcome::Idle);
        }
        assert_eq!(session.state().player.position, frozen);
        assert_eq!(session.state().bots[0].position, bots);
        assert_eq!(session.score(), 25);
    }

    #[test]
    fn test_best_score_only_on_strict_improvement() {
        let shared = Arc::new(MemoryScoreStore::with_score(25));
        let mut session =
            Session::new(empty_config(), Box::new(SharedStore(shared.clone())), Some(1)).unwrap();
        assert_eq!(session.best_score(), 25);

        place_killer(&mut session, "Mantan");
        let TickOutcome::Ended(summary) =
            session.tick(&InputSample::default(), Platform::Desktop, CENTER)
        else {
            panic!("expected death");
        };
        assert!(!summary.new_record);
        assert_eq!(summary.best_score, 25);

        session.restart();
        session.state_mut().player.radius = 40.0;
        place_killer(&mut session, "Mantan");
        let TickOutcome::Ended(summary) =
            session.tick(&InputSample::default(), Platform::Desktop, CENTER)
        else {
            panic!("expected death");
        };
        assert!(summary.new_record);
        assert_eq!(summary.best_score, 40);
        assert_eq!(shared.stored(), Some(40));
    }

    #[test]
    fn test_restart_is_idempotent() {
        let mut session = create_test_session(SimConfig::default());
        session.state_mut().player.radius = 120.0;
        session.state_mut().bots.truncate(3);
        session.state_mut().food.clear();
        place_killer(&mut session, "Playboy");
        session.tick(&InputSample::default(), Platform::Desktop, CENTER);
        assert_eq!(session.phase(), SessionPhase::Ended);

        for _ in 0..2 {
            session.restart();
            assert_eq!(session.phase(), SessionPhase::Running);
            assert_eq!(session.state().player.radius, 25.0);
            assert_eq!(session.state().bots.len(), 18);
            assert_eq!(session.state().food.len(), 400);
            assert_eq!(session.state().frame, 0);
            assert!(session.killer_name().is_none());
            assert!(session.leaderboard().is_empty());
        }
    }

    #[test]
    fn test_leaderboard_refresh_cadence() {
        let mut session = create_test_session(empty_config());
        let idle = InputSample::default();
        for _ in 0..29 {
            session.tick(&idle, Platform::Desktop, CENTER);
        }
        assert!(session.leaderboard().is_empty());
        let TickOutcome::Running(stats) = session.tick(&idle, Platform::Desktop, CENTER) else {
            panic!("session should be running");
        };
        assert!(stats.leaderboard_refreshed);
        assert_eq!(session.leaderboard().frame, 30);
        assert_eq!(session.leaderboard().player_rank(), Some(1));
    }

    #[test]
    fn test_seeded_sessions_match() {
        let mut a = create_test_session(SimConfig::default());
        let mut b = create_test_session(SimConfig::default());
        let sample = held_right();
        for _ in 0..120 {
            let oa = a.tick(&sample, Platform::Desktop, CENTER);
            let ob = b.tick(&sample, Platform::Desktop, CENTER);
            assert_eq!(oa, ob);
        }
        assert_eq!(a.state().player.position, b.state().player.position);
        assert_eq!(a.state().bots.len(), b.state().bots.len());
    }
}
