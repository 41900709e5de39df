//! Pellet grazing, entity-vs-entity predation and bot population upkeep

use hashbrown::HashSet;
use rand::Rng;
use tracing::debug;

use crate::config::SimConfig;
use crate::game::constants::growth::{
    FOOD_EAT_EFFICIENCY, FOOD_OVERLAP_FACTOR, OVERLAP_FACTOR, PVP_EAT_EFFICIENCY,
    SIZE_TO_EAT_RATIO,
};
use crate::game::state::{Entity, EntityId, WorldState};
use crate::game::world;

/// Events produced by one consumption pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsumptionOutcome {
    /// Pellets eaten this tick
    pub food_eaten: usize,
    /// Bots removed this tick
    pub bots_eaten: usize,
    /// Set when the player was eaten; holds the killer's display name
    pub player_killed_by: Option<String>,
    /// Replacement bots spawned this tick
    pub bots_respawned: usize,
}

impl ConsumptionOutcome {
    pub fn player_died(&self) -> bool {
        self.player_killed_by.is_some()
    }
}

/// Whether `eater` can eat `pellet`: center distance below eater.r - pellet.r / 2
#[inline]
pub fn can_eat_food(eater: &Entity, pellet: &Entity) -> bool {
    eater.position.distance_to(pellet.position) < eater.radius - pellet.radius * FOOD_OVERLAP_FACTOR
}

/// Predation test: `larger` must exceed `smaller` by SIZE_TO_EAT_RATIO and
/// overlap it almost fully (distance below larger.r - smaller.r * 0.3)
#[inline]
pub fn can_consume(larger: &Entity, smaller: &Entity) -> bool {
    larger.radius > smaller.radius * SIZE_TO_EAT_RATIO
        && larger.position.distance_to(smaller.position)
            < larger.radius - smaller.radius * OVERLAP_FACTOR
}

/// Let one entity graze; returns pellets eaten
fn graze(eater: &mut Entity, food: &mut Vec<Entity>) -> usize {
    let before = food.len();
    food.retain(|pellet| {
        if can_eat_food(eater, pellet) {
            eater.absorb(pellet.radius, FOOD_EAT_EFFICIENCY);
            false
        } else {
            true
        }
    });
    before - food.len()
}

/// Pellet consumption: the player grazes first, then bots in collection order.
/// The food field is topped back up to the target count afterwards.
pub fn consume_food<R: Rng + ?Sized>(
    state: &mut WorldState,
    config: &SimConfig,
    rng: &mut R,
) -> usize {
    let mut eaten = graze(&mut state.player, &mut state.food);
    for bot in state.bots.iter_mut() {
        eaten += graze(bot, &mut state.food);
    }
    world::replenish_food(state, config, rng);
    eaten
}

/// Index into the contender list: the player or a bot slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Player,
    Bot(usize),
}

fn slot_mut(state: &mut WorldState, slot: Slot) -> &mut Entity {
    match slot {
        Slot::Player => &mut state.player,
        Slot::Bot(i) => &mut state.bots[i],
    }
}

fn slot_ref(state: &WorldState, slot: Slot) -> &Entity {
    match slot {
        Slot::Player => &state.player,
        Slot::Bot(i) => &state.bots[i],
    }
}

/// Resolve predation among the player and all bots.
///
/// Contenders are ordered by radius descending; each live contender tries to
/// eat every smaller live contender after it, growing as it eats. Anything
/// eaten goes into the dead set and is skipped for the rest of the pass, so an
/// entity is eaten at most once and never eats after being eaten.
///
/// Returns the dead set and the killer's name if the player died.
pub fn resolve_predation(state: &mut WorldState) -> (HashSet<EntityId>, Option<String>) {
    let mut order: Vec<Slot> = std::iter::once(Slot::Player)
        .chain((0..state.bots.len()).map(Slot::Bot))
        .collect();
    order.sort_by(|a, b| {
        slot_ref(state, *b)
            .radius
            .total_cmp(&slot_ref(state, *a).radius)
    });

    let mut dead: HashSet<EntityId> = HashSet::new();
    let mut killer = None;

    for i in 0..order.len() {
        let eater_slot = order[i];
        if dead.contains(&slot_ref(state, eater_slot).id) {
            continue;
        }

        for &prey_slot in &order[i + 1..] {
            let prey = slot_ref(state, prey_slot);
            if dead.contains(&prey.id) || !can_consume(slot_ref(state, eater_slot), prey) {
                continue;
            }

            let prey_id = prey.id.clone();
            let prey_radius = prey.radius;
            let eater = slot_mut(state, eater_slot);
            eater.absorb(prey_radius, PVP_EAT_EFFICIENCY);

            if prey_slot == Slot::Player {
                killer = Some(eater.display_name().to_string());
            }
            debug!("{} ate {}", eater.id, prey_id);
            dead.insert(prey_id);
        }
    }

    (dead, killer)
}

/// With a bot deficit, spawn one replacement with the configured per-frame chance
pub fn maybe_respawn_bot<R: Rng + ?Sized>(
    state: &mut WorldState,
    config: &SimConfig,
    rng: &mut R,
) -> bool {
    if state.bots.len() >= config.bot_count || !rng.gen_bool(config.bot_respawn_chance) {
        return false;
    }
    let id = world::respawn_bot(state, config, rng);
    debug!("Respawned bot {} ({} live)", id, state.bots.len());
    true
}

/// Full consumption step for one tick: grazing, replenishment, predation,
/// bot removal and, unless the player died, a respawn roll.
pub fn update<R: Rng + ?Sized>(
    state: &mut WorldState,
    config: &SimConfig,
    rng: &mut R,
) -> ConsumptionOutcome {
    let food_eaten = consume_food(state, config, rng);

    let (dead, player_killed_by) = resolve_predation(state);
    let before = state.bots.len();
    state.bots.retain(|b| !dead.contains(&b.id));
    let bots_eaten = before - state.bots.len();

    let mut outcome = ConsumptionOutcome {
        food_eaten,
        bots_eaten,
        player_killed_by,
        bots_respawned: 0,
    };

    if !outcome.player_died() && maybe_respawn_bot(state, config, rng) {
        outcome.bots_respawned = 1;
    }

    outcome
}
