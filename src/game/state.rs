//! World state definitions
//!
//! Contains the entity type (player, bots and food share one physical payload
//! with a role tag) and the `WorldState` aggregate owned by the simulation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::game::constants::{area_to_radius, player, radius_to_area};
use crate::util::vec2::Vec2;

/// Unique entity identifier ("player", "bot-7", "food-123")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(String);

impl EntityId {
    pub fn player() -> Self {
        Self("player".to_string())
    }

    pub fn bot(serial: u64) -> Self {
        Self(format!("bot-{}", serial))
    }

    pub fn food(serial: u64) -> Self {
        Self(format!("food-{}", serial))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display color, formatted as a CSS color string
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Color {
    Rgb(u8, u8, u8),
    Rgba(u8, u8, u8, f32),
    /// Hue in degrees, saturation and lightness in percent
    Hsl(u16, u8, u8),
}

impl Color {
    pub const PLAYER: Color = Color::Rgb(0xec, 0x48, 0x99);
    pub const WHITE: Color = Color::Rgb(0xff, 0xff, 0xff);

    /// Vivid pastel used for bots and pellets
    pub fn pastel(hue: u16) -> Self {
        Color::Hsl(hue % 360, 85, 65)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Color::Rgb(r, g, b) => write!(f, "#{:02x}{:02x}{:02x}", r, g, b),
            Color::Rgba(r, g, b, a) => write!(f, "rgba({},{},{},{})", r, g, b, a),
            Color::Hsl(h, s, l) => write!(f, "hsl({}, {}%, {}%)", h, s, l),
        }
    }
}

/// Role-specific payload of an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Role {
    Player,
    Bot {
        /// Persistent idle heading in radians
        wander_angle: f32,
    },
    Food,
}

/// A simulated circle: the player, a bot or a food pellet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Center in world coordinates
    pub position: Vec2,
    /// Displacement applied per frame
    pub velocity: Vec2,
    /// Collision and render radius
    pub radius: f32,
    pub role: Role,
    pub id: EntityId,
    pub color: Color,
    pub name: Option<String>,
}

impl Entity {
    pub fn new_player(position: Vec2, radius: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            radius,
            role: Role::Player,
            id: EntityId::player(),
            color: Color::PLAYER,
            name: Some(player::NAME.to_string()),
        }
    }

    pub fn new_bot(
        id: EntityId,
        position: Vec2,
        radius: f32,
        name: String,
        color: Color,
        wander_angle: f32,
    ) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            radius,
            role: Role::Bot { wander_angle },
            id,
            color,
            name: Some(name),
        }
    }

    pub fn new_food(id: EntityId, position: Vec2, radius: f32, color: Color) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            radius,
            role: Role::Food,
            id,
            color,
            name: None,
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self.role, Role::Player)
    }

    pub fn is_bot(&self) -> bool {
        matches!(self.role, Role::Bot { .. })
    }

    pub fn is_food(&self) -> bool {
        matches!(self.role, Role::Food)
    }

    /// Name for HUD and game-over display
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }

    pub fn area(&self) -> f32 {
        radius_to_area(self.radius)
    }

    /// Absorb `efficiency` of another circle's area, conserving area
    pub fn absorb(&mut self, eaten_radius: f32, efficiency: f32) {
        self.radius = grown_radius(self.radius, eaten_radius, efficiency);
    }

    /// Keep the circle fully inside the `[0, world_size]` square
    pub fn clamp_to_world(&mut self, world_size: f32) {
        self.position = self
            .position
            .clamp_components(self.radius, world_size - self.radius);
    }

    pub fn within_world(&self, world_size: f32) -> bool {
        let (lo, hi) = (self.radius, world_size - self.radius);
        (lo..=hi).contains(&self.position.x) && (lo..=hi).contains(&self.position.y)
    }
}

/// Radius after an eater of radius `eater` absorbs `efficiency` of the area of a
/// circle of radius `eaten`. Degenerate inputs never yield NaN or a shrink.
pub fn grown_radius(eater: f32, eaten: f32, efficiency: f32) -> f32 {
    let current = radius_to_area(eater.max(0.0));
    let gained = radius_to_area(eaten.max(0.0)) * efficiency.max(0.0);
    let grown = area_to_radius(current + gained);
    if grown.is_finite() && grown >= eater {
        grown
    } else {
        eater
    }
}

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SessionPhase {
    /// Simulation ticks every frame
    #[default]
    Running,
    /// Player was eaten; nothing updates until a restart
    Ended,
}

/// Complete world state owned by the simulation tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldState {
    /// Frames simulated since the last reset
    pub frame: u64,
    pub player: Entity,
    pub bots: Vec<Entity>,
    pub food: Vec<Entity>,
    next_entity_id: u64,
}

impl WorldState {
    /// Empty arena with the player at the center
    pub fn new(config: &SimConfig) -> Self {
        let center = Vec2::new(config.world_size / 2.0, config.world_size / 2.0);
        Self {
            frame: 0,
            player: Entity::new_player(center, config.start_radius),
            bots: Vec::with_capacity(config.bot_count),
            food: Vec::with_capacity(config.food_count),
            next_entity_id: 0,
        }
    }

    /// Generate a new serial for bot/food ids
    pub fn next_entity_id(&mut self) -> u64 {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        id
    }

    /// Player followed by all bots
    pub fn contenders(&self) -> impl Iterator<Item = &Entity> {
        std::iter::once(&self.player).chain(self.bots.iter())
    }

    /// Every live entity: food, bots, then the player
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.food
            .iter()
            .chain(self.bots.iter())
            .chain(std::iter::once(&self.player))
    }

    pub fn get_bot(&self, id: &EntityId) -> Option<&Entity> {
        self.bots.iter().find(|b| &b.id == id)
    }

    pub fn entity_count(&self) -> usize {
        self.food.len() + self.bots.len() + 1
    }
}
