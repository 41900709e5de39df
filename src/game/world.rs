//! World population: session reset, safe spawn placement and replenishment

use rand::Rng;
use tracing::debug;

use crate::config::SimConfig;
use crate::game::constants::{bot, food, spawn};
use crate::game::state::{Color, Entity, EntityId, WorldState};
use crate::util::vec2::Vec2;

/// Reinitialize the world: player at the center with the start radius, a full
/// food field and a full bot population at safe positions.
pub fn reset_world<R: Rng + ?Sized>(state: &mut WorldState, config: &SimConfig, rng: &mut R) {
    *state = WorldState::new(config);

    for _ in 0..config.food_count {
        spawn_food(state, config, rng);
    }

    for i in 0..config.bot_count {
        let radius = rng.gen_range(bot::INITIAL_MIN_RADIUS..bot::INITIAL_MAX_RADIUS);
        let name = bot::NAMES[i % bot::NAMES.len()].to_string();
        spawn_bot(state, config, radius, name, rng);
    }

    debug!(
        "World reset: {} food, {} bots",
        state.food.len(),
        state.bots.len()
    );
}

/// Find a spawn position away from the player and every existing bot.
///
/// Candidates are rejected when closer than PLAYER_CLEARANCE to the player or
/// closer than `bot.radius + BOT_CLEARANCE` to any bot. After MAX_ATTEMPTS the
/// last candidate is accepted anyway, so this never blocks.
pub fn safe_spawn_position<R: Rng + ?Sized>(
    state: &WorldState,
    config: &SimConfig,
    rng: &mut R,
) -> Vec2 {
    let (lo, hi) = spawn_range(config.world_size);
    let mut candidate = Vec2::new(config.world_size / 2.0, config.world_size / 2.0);

    for _ in 0..spawn::MAX_ATTEMPTS {
        candidate = Vec2::new(rng.gen_range(lo..hi), rng.gen_range(lo..hi));
        if is_safe_spawn(state, candidate) {
            return candidate;
        }
    }

    debug!(
        "No safe spawn after {} attempts, accepting ({:.0}, {:.0})",
        spawn::MAX_ATTEMPTS,
        candidate.x,
        candidate.y
    );
    candidate
}

/// Whether a candidate keeps its distance from the player and all bots
pub fn is_safe_spawn(state: &WorldState, candidate: Vec2) -> bool {
    if candidate.distance_to(state.player.position) < spawn::PLAYER_CLEARANCE {
        return false;
    }
    state
        .bots
        .iter()
        .all(|b| candidate.distance_to(b.position) >= b.radius + spawn::BOT_CLEARANCE)
}

/// Spawn range per axis; small worlds fall back to the full square
fn spawn_range(world_size: f32) -> (f32, f32) {
    if spawn::PADDING * 2.0 < world_size {
        (spawn::PADDING, world_size - spawn::PADDING)
    } else {
        (0.0, world_size.max(f32::EPSILON))
    }
}

/// Add one bot at a safe position and return its id
pub fn spawn_bot<R: Rng + ?Sized>(
    state: &mut WorldState,
    config: &SimConfig,
    radius: f32,
    name: String,
    rng: &mut R,
) -> EntityId {
    let position = safe_spawn_position(state, config, rng);
    let id = EntityId::bot(state.next_entity_id());
    let color = Color::pastel(rng.gen_range(0..360));
    let wander_angle = rng.gen_range(0.0..std::f32::consts::TAU);

    let mut entity = Entity::new_bot(id.clone(), position, radius, name, color, wander_angle);
    entity.clamp_to_world(config.world_size);
    state.bots.push(entity);
    id
}

/// Spawn a replacement bot with a random name and respawn radius
pub fn respawn_bot<R: Rng + ?Sized>(
    state: &mut WorldState,
    config: &SimConfig,
    rng: &mut R,
) -> EntityId {
    let radius = rng.gen_range(bot::RESPAWN_MIN_RADIUS..bot::RESPAWN_MAX_RADIUS);
    let name = bot::NAMES[rng.gen_range(0..bot::NAMES.len())].to_string();
    spawn_bot(state, config, radius, name, rng)
}

/// Add one pellet at a uniform random position
pub fn spawn_food<R: Rng + ?Sized>(state: &mut WorldState, config: &SimConfig, rng: &mut R) {
    let size = config.world_size.max(f32::EPSILON);
    let position = Vec2::new(rng.gen_range(0.0..size), rng.gen_range(0.0..size));
    let radius = rng.gen_range(food::MIN_RADIUS..food::MAX_RADIUS);
    let id = EntityId::food(state.next_entity_id());
    let color = Color::pastel(rng.gen_range(0..360));

    let mut pellet = Entity::new_food(id, position, radius, color);
    pellet.clamp_to_world(config.world_size);
    state.food.push(pellet);
}

/// Top the food field back up to the target count. Returns pellets added.
pub fn replenish_food<R: Rng + ?Sized>(
    state: &mut WorldState,
    config: &SimConfig,
    rng: &mut R,
) -> usize {
    let missing = config.food_count.saturating_sub(state.food.len());
    for _ in 0..missing {
        spawn_food(state, config, rng);
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_reset_populates_world() {
        let config = SimConfig::default();
        let mut state = WorldState::new(&config);
        reset_world(&mut state, &config, &mut rng());

        assert_eq!(state.food.len(), config.food_count);
        assert_eq!(state.bots.len(), config.bot_count);
        assert_eq!(state.player.radius, config.start_radius);
        assert_eq!(state.player.position, Vec2::new(2000.0, 2000.0));
        assert_eq!(state.frame, 0);

        for b in &state.bots {
            assert!(b.radius >= bot::INITIAL_MIN_RADIUS && b.radius < bot::INITIAL_MAX_RADIUS);
            assert!(b.within_world(config.world_size));
            assert!(b.name.is_some());
        }
        for f in &state.food {
            assert!(f.radius >= food::MIN_RADIUS && f.radius < food::MAX_RADIUS);
            assert!(f.within_world(config.world_size));
        }
    }

    #[test]
    fn test_reset_replaces_previous_world() {
        let config = SimConfig::default();
        let mut r = rng();
        let mut state = WorldState::new(&config);
        reset_world(&mut state, &config, &mut r);
        state.player.radius = 300.0;
        state.bots.clear();
        state.frame = 999;

        reset_world(&mut state, &config, &mut r);
        assert_eq!(state.player.radius, config.start_radius);
        assert_eq!(state.bots.len(), config.bot_count);
        assert_eq!(state.frame, 0);
    }

    #[test]
    fn test_ids_unique() {
        let config = SimConfig::default();
        let mut state = WorldState::new(&config);
        reset_world(&mut state, &config, &mut rng());
        let mut ids: Vec<_> = state.entities().map(|e| e.id.clone()).collect();
        let total = ids.len();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_safe_spawn_keeps_clearance_when_possible() {
        let config = SimConfig::default();
        let mut state = WorldState::new(&config);
        let mut r = rng();
        // A sparse world always has room
        for _ in 0..3 {
            respawn_bot(&mut state, &config, &mut r);
        }
        for _ in 0..50 {
            let pos = safe_spawn_position(&state, &config, &mut r);
            assert!(is_safe_spawn(&state, pos));
        }
    }

    #[test]
    fn test_safe_spawn_rejects_near_player_and_bots() {
        let config = SimConfig::default();
        let mut state = WorldState::new(&config);
        assert!(!is_safe_spawn(&state, Vec2::new(2100.0, 2000.0)));
        assert!(is_safe_spawn(&state, Vec2::new(400.0, 400.0)));

        state.bots.push(Entity::new_bot(
            EntityId::bot(0),
            Vec2::new(500.0, 400.0),
            30.0,
            "Mantan".to_string(),
            Color::pastel(0),
            0.0,
        ));
        // 100 < 30 + 300
        assert!(!is_safe_spawn(&state, Vec2::new(400.0, 400.0)));
    }

    #[test]
    fn test_safe_spawn_gives_up_gracefully() {
        // World so small that nothing is ever safe: still returns a position
        let config = SimConfig {
            world_size: 300.0,
            start_radius: 10.0,
            ..SimConfig::default()
        };
        let state = WorldState::new(&config);
        let pos = safe_spawn_position(&state, &config, &mut rng());
        assert!(pos.x >= 0.0 && pos.x <= 300.0);
        assert!(pos.y >= 0.0 && pos.y <= 300.0);
    }

    #[test]
    fn test_respawn_radius_range() {
        let config = SimConfig::default();
        let mut state = WorldState::new(&config);
        let mut r = rng();
        for _ in 0..20 {
            let id = respawn_bot(&mut state, &config, &mut r);
            let b = state.get_bot(&id).unwrap();
            assert!(b.radius >= bot::RESPAWN_MIN_RADIUS && b.radius < bot::RESPAWN_MAX_RADIUS);
            assert!(bot::NAMES.contains(&b.display_name()));
        }
    }

    #[test]
    fn test_replenish_food() {
        let config = SimConfig::default();
        let mut state = WorldState::new(&config);
        let mut r = rng();
        assert_eq!(replenish_food(&mut state, &config, &mut r), config.food_count);
        state.food.truncate(10);
        assert_eq!(replenish_food(&mut state, &config, &mut r), config.food_count - 10);
        assert_eq!(state.food.len(), config.food_count);
        assert_eq!(replenish_food(&mut state, &config, &mut r), 0);
    }
}
