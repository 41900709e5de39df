use rayon::prelude::*;

use crate::game::state::{Entity, WorldState};

/// Integrate one circle: position += velocity, then clamp inside the arena
#[inline]
pub fn integrate(entity: &mut Entity, world_size: f32) {
    entity.position += entity.velocity;
    entity.clamp_to_world(world_size);
}

/// Move the player by its current velocity
pub fn update_player(state: &mut WorldState, world_size: f32) {
    integrate(&mut state.player, world_size);
}

/// Move every bot by its current velocity
/// Uses rayon for parallel iteration; bots never touch each other here
pub fn update_bots(state: &mut WorldState, world_size: f32) {
    state
        .bots
        .par_iter_mut()
        .for_each(|bot| integrate(bot, world_size));
}
