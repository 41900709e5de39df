//! Bot steering: local sensing, flee/chase/wander, wall gliding
//!
//! Every bot decides from the same read-only view of the world (taken after
//! the player moved), so decisions run in parallel and are applied afterwards.

use rand::Rng;
use rayon::prelude::*;

use crate::config::SimConfig;
use crate::game::constants::{growth::SIZE_TO_EAT_RATIO, radius_to_speed, speed::BOT_FACTOR};
use crate::game::state::{Entity, Role, WorldState};
use crate::game::systems::movement;
use crate::util::vec2::Vec2;

/// What a bot reacts to this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Steering {
    /// Run from the predator at this position
    Flee(Vec2),
    /// Close in on the target at this position
    Chase(Vec2),
    /// Nothing relevant in range
    Wander,
}

/// Result of one bot's decision, applied after all bots have decided
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BotDecision {
    pub velocity: Vec2,
    pub wander_angle: f32,
}

/// Nearest predator and target around a bot
#[derive(Debug, Clone, Copy, Default)]
struct Senses {
    predator: Option<(f32, Vec2)>,
    target: Option<(f32, Vec2)>,
}

impl Senses {
    fn observe(&mut self, bot: &Entity, other: &Entity, sensor_range: f32, target_range: f32) {
        let d = bot.position.distance_to(other.position);
        if other.radius > bot.radius * SIZE_TO_EAT_RATIO {
            if d < sensor_range && self.predator.map_or(true, |(best, _)| d < best) {
                self.predator = Some((d, other.position));
            }
        } else if bot.radius > other.radius * SIZE_TO_EAT_RATIO
            && d < target_range
            && self.target.map_or(true, |(best, _)| d < best)
        {
            self.target = Some((d, other.position));
        }
    }
}

/// Whether a pellet hugs an edge closely enough that chasing it would pin a bot
#[inline]
pub fn in_unsafe_margin(position: Vec2, world_size: f32, margin: f32) -> bool {
    position.x < margin
        || position.x > world_size - margin
        || position.y < margin
        || position.y > world_size - margin
}

/// Classify the surroundings of bot `index`
///
/// Senses pellets (except those inside the unsafe margin), the player and
/// every other bot. The predator is the nearest entity more than
/// SIZE_TO_EAT_RATIO times larger within `sensor_range + r`; the target is the
/// nearest entity the bot outgrows by that ratio within the range times
/// `target_range_factor`.
pub fn classify(state: &WorldState, index: usize, config: &SimConfig) -> Steering {
    let Some(bot) = state.bots.get(index) else {
        return Steering::Wander;
    };

    let sensor_range = config.sensor_range + bot.radius;
    let target_range = sensor_range * config.target_range_factor;
    let mut senses = Senses::default();

    for pellet in &state.food {
        if in_unsafe_margin(pellet.position, config.world_size, config.unsafe_food_margin) {
            continue;
        }
        senses.observe(bot, pellet, sensor_range, target_range);
    }

    senses.observe(bot, &state.player, sensor_range, target_range);

    for (i, other) in state.bots.iter().enumerate() {
        if i != index {
            senses.observe(bot, other, sensor_range, target_range);
        }
    }

    match (senses.predator, senses.target) {
        (Some((_, threat)), _) => Steering::Flee(threat),
        (None, Some((_, prey))) => Steering::Chase(prey),
        (None, None) => Steering::Wander,
    }
}

/// Binary inward push for each axis within `wall_sensor` of an edge
#[inline]
pub fn wall_push(position: Vec2, world_size: f32, wall_sensor: f32) -> Vec2 {
    let axis = |v: f32| {
        if v < wall_sensor {
            1.0
        } else if v > world_size - wall_sensor {
            -1.0
        } else {
            0.0
        }
    };
    Vec2::new(axis(position.x), axis(position.y))
}

/// Compute one bot's velocity and wander heading
///
/// `wander_delta` is the heading change used only when the bot wanders.
pub fn decide(
    state: &WorldState,
    index: usize,
    config: &SimConfig,
    wander_delta: f32,
) -> Option<BotDecision> {
    let bot = state.bots.get(index)?;
    let Role::Bot { mut wander_angle } = bot.role else {
        return None;
    };

    let desired = match classify(state, index, config) {
        Steering::Flee(threat) => bot.position - threat,
        Steering::Chase(prey) => prey - bot.position,
        Steering::Wander => {
            let turned = wander_angle + wander_delta;
            if turned.is_finite() {
                wander_angle = turned;
            }
            Vec2::from_angle(wander_angle)
        }
    };

    let push = wall_push(bot.position, config.world_size, config.wall_sensor);
    let heading = (desired.normalize() + push * config.wall_weight).normalize();
    let speed = radius_to_speed(bot.radius) * BOT_FACTOR;

    Some(BotDecision {
        velocity: heading * speed,
        wander_angle,
    })
}

/// Steer and move every bot for one tick
/// Uses rayon for parallel decision computation, then applies updates sequentially
pub fn update<R: Rng + ?Sized>(state: &mut WorldState, config: &SimConfig, rng: &mut R) {
    // Draw wander deltas up front so the parallel pass stays deterministic
    let jitter = config.wander_jitter;
    let deltas: Vec<f32> = (0..state.bots.len())
        .map(|_| {
            if jitter > 0.0 {
                rng.gen_range(-jitter..=jitter)
            } else {
                0.0
            }
        })
        .collect();

    let snapshot: &WorldState = state;
    let decisions: Vec<Option<BotDecision>> = deltas
        .par_iter()
        .enumerate()
        .map(|(index, &delta)| decide(snapshot, index, config, delta))
        .collect();

    for (bot, decision) in state.bots.iter_mut().zip(decisions) {
        let Some(decision) = decision else {
            continue;
        };
        bot.velocity = decision.velocity;
        if let Role::Bot { wander_angle } = &mut bot.role {
            *wander_angle = decision.wander_angle;
        }
    }

    movement::update_bots(state, config.world_size);
}
