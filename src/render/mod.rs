//! Render pipeline: world-to-screen camera, arena drawing and HUD
//!
//! Drawing only reads the world. The surface is an immediate-mode 2D context
//! supplied by the host.

pub mod camera;
pub mod hud;
pub mod recording;

use tracing::trace;

use crate::game::constants::{hud as hud_consts, world};
use crate::game::state::{Color, Entity, WorldState};
use crate::util::vec2::Vec2;

pub use camera::Camera;
pub use hud::Hud;
pub use recording::{DrawCommand, RecordingSurface};

/// Arena background
pub const BACKGROUND: Color = Color::Rgb(0xfc, 0xe7, 0xf3);
/// Grid line color
pub const GRID: Color = Color::Rgba(0, 0, 0, 0.05);
pub const GRID_WIDTH: f32 = 2.0;
/// World border color
pub const BORDER: Color = Color::Rgb(0xf4, 0x3f, 0x5e);
pub const BORDER_WIDTH: f32 = 20.0;
/// Player outline
pub const PLAYER_OUTLINE_WIDTH: f32 = 4.0;
/// Bot name color
pub const BOT_LABEL: Color = Color::Rgba(255, 255, 255, 0.8);

/// Immediate-mode 2D drawing context
pub trait RenderSurface {
    /// Drop any translation so coordinates are screen pixels
    fn reset_transform(&mut self);
    /// Shift all following draws by `offset`
    fn translate(&mut self, offset: Vec2);
    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color);
    fn stroke_rect(&mut self, origin: Vec2, size: Vec2, color: Color, width: f32);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Color, width: f32);
    /// Bold text centered horizontally on `at`
    fn fill_text(&mut self, text: &str, at: Vec2, font_px: f32, color: Color);
}

/// Counts from one draw pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub circles: usize,
    pub labels: usize,
    pub visible: usize,
}

/// Player label font size
#[inline]
pub fn player_font_px(radius: f32) -> f32 {
    (radius / 2.0).max(12.0)
}

/// Bot label font size
#[inline]
pub fn bot_font_px(radius: f32) -> f32 {
    (radius / 2.5).max(10.0)
}

/// Label baseline sits a quarter radius below the center
#[inline]
pub fn label_anchor(entity: &Entity) -> Vec2 {
    Vec2::new(entity.position.x, entity.position.y + entity.radius / 4.0)
}

/// Draw the arena centered on the player.
///
/// Order: background, grid, border, then every live entity sorted ascending by
/// radius so bigger circles paint over smaller ones.
pub fn draw_world<S: RenderSurface + ?Sized>(
    surface: &mut S,
    state: &WorldState,
    world_size: f32,
    viewport: Vec2,
) -> DrawStats {
    surface.reset_transform();
    surface.fill_rect(Vec2::ZERO, viewport, BACKGROUND);

    let camera = Camera::follow(state.player.position, viewport);
    surface.translate(camera.offset);

    draw_grid(surface, world_size);
    surface.stroke_rect(
        Vec2::ZERO,
        Vec2::new(world_size, world_size),
        BORDER,
        BORDER_WIDTH,
    );

    let mut queue: Vec<&Entity> = state.entities().collect();
    queue.sort_by(|a, b| a.radius.total_cmp(&b.radius));

    let mut stats = DrawStats::default();
    for entity in queue {
        if camera.is_visible(entity.position, entity.radius, viewport) {
            stats.visible += 1;
        }
        if draw_entity(surface, entity) {
            stats.labels += 1;
        }
        stats.circles += 1;
    }

    trace!(
        "Drew {} circles ({} visible, {} labels)",
        stats.circles,
        stats.visible,
        stats.labels
    );
    stats
}

fn draw_grid<S: RenderSurface + ?Sized>(surface: &mut S, world_size: f32) {
    let lines = (world_size / world::GRID_SPACING).floor() as u32;
    for i in 0..=lines {
        let v = i as f32 * world::GRID_SPACING;
        surface.stroke_line(Vec2::new(v, 0.0), Vec2::new(v, world_size), GRID, GRID_WIDTH);
    }
    for i in 0..=lines {
        let v = i as f32 * world::GRID_SPACING;
        surface.stroke_line(Vec2::new(0.0, v), Vec2::new(world_size, v), GRID, GRID_WIDTH);
    }
}

/// Draw one circle and its label; returns whether a label was drawn
fn draw_entity<S: RenderSurface + ?Sized>(surface: &mut S, entity: &Entity) -> bool {
    surface.fill_circle(entity.position, entity.radius, entity.color);

    if entity.is_player() {
        surface.stroke_circle(entity.position, entity.radius, Color::WHITE, PLAYER_OUTLINE_WIDTH);
        surface.fill_text(
            entity.display_name(),
            label_anchor(entity),
            player_font_px(entity.radius),
            Color::WHITE,
        );
        return true;
    }

    match &entity.name {
        Some(name) if entity.radius > hud_consts::LABEL_MIN_RADIUS => {
            surface.fill_text(
                name,
                label_anchor(entity),
                bot_font_px(entity.radius),
                BOT_LABEL,
            );
            true
        }
        _ => false,
    }
}

/// Draw a full frame: the arena, then the HUD in screen space
pub fn draw_frame<S: RenderSurface + ?Sized>(
    surface: &mut S,
    state: &WorldState,
    hud: &Hud,
    world_size: f32,
    viewport: Vec2,
) -> DrawStats {
    let stats = draw_world(surface, state, world_size, viewport);
    surface.reset_transform();
    hud::draw_hud(surface, hud, viewport);
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::game::state::EntityId;

    const VIEWPORT: Vec2 = Vec2 { x: 1280.0, y: 720.0 };

    fn create_test_state() -> WorldState {
        let mut state = WorldState::new(&SimConfig::default());
        state.bots.push(Entity::new_bot(
            EntityId::bot(0),
            Vec2::new(2100.0, 2000.0),
            40.0,
            "Si Cantik".to_string(),
            Color::pastel(300),
            0.0,
        ));
        state.bots.push(Entity::new_bot(
            EntityId::bot(1),
            Vec2::new(1900.0, 2000.0),
            20.0,
            "Si Pesek".to_string(),
            Color::pastel(100),
            0.0,
        ));
        state.food.push(Entity::new_food(
            EntityId::food(2),
            Vec2::new(2000.0, 2100.0),
            6.0,
            Color::pastel(10),
        ));
        state
    }

    #[test]
    fn test_draw_order_ascending_radius() {
        let state = create_test_state();
        let mut surface = RecordingSurface::new();
        draw_world(&mut surface, &state, 4000.0, VIEWPORT);

        let radii: Vec<f32> = surface.circle_fills().map(|(_, r, _)| r).collect();
        assert_eq!(radii, vec![6.0, 20.0, 25.0, 40.0]);
    }

    #[test]
    fn test_background_grid_border_before_entities() {
        let state = create_test_state();
        let mut surface = RecordingSurface::new();
        draw_world(&mut surface, &state, 4000.0, VIEWPORT);

        let cmds = surface.commands();
        assert!(matches!(cmds[0], DrawCommand::ResetTransform));
        assert!(matches!(cmds[1], DrawCommand::FillRect { color, .. } if color == BACKGROUND));
        assert!(matches!(cmds[2], DrawCommand::Translate(_)));
        let border = cmds
            .iter()
            .position(|c| matches!(c, DrawCommand::StrokeRect { color, .. } if *color == BORDER))
            .unwrap();
        let first_circle = cmds
            .iter()
            .position(|c| matches!(c, DrawCommand::FillCircle { .. }))
            .unwrap();
        let last_grid = cmds
            .iter()
            .rposition(|c| matches!(c, DrawCommand::StrokeLine { .. }))
            .unwrap();
        assert!(last_grid < border && border < first_circle);
        // 41 vertical + 41 horizontal lines
        let lines = cmds
            .iter()
            .filter(|c| matches!(c, DrawCommand::StrokeLine { .. }))
            .count();
        assert_eq!(lines, 82);
    }

    #[test]
    fn test_camera_translation_centers_player() {
        let state = create_test_state();
        let mut surface = RecordingSurface::new();
        draw_world(&mut surface, &state, 4000.0, VIEWPORT);
        assert_eq!(surface.translation(), Vec2::new(-1360.0, -1640.0));
    }

    #[test]
    fn test_labels() {
        let state = create_test_state();
        let mut surface = RecordingSurface::new();
        let stats = draw_world(&mut surface, &state, 4000.0, VIEWPORT);

        let texts: Vec<(String, f32)> = surface
            .texts()
            .map(|(t, _, size)| (t.to_string(), size))
            .collect();
        // The r=20 bot sits exactly on the threshold and stays unlabeled
        assert_eq!(
            texts,
            vec![("Kamu".to_string(), 12.5), ("Si Cantik".to_string(), 16.0)]
        );
        assert_eq!(stats.labels, 2);
        assert_eq!(stats.circles, 4);
    }

    #[test]
    fn test_player_outline() {
        let state = create_test_state();
        let mut surface = RecordingSurface::new();
        draw_world(&mut surface, &state, 4000.0, VIEWPORT);
        let outlines = surface
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::StrokeCircle { width, .. } if *width == PLAYER_OUTLINE_WIDTH))
            .count();
        assert_eq!(outlines, 1);
    }

    #[test]
    fn test_font_sizes() {
        assert_eq!(player_font_px(10.0), 12.0);
        assert_eq!(player_font_px(60.0), 30.0);
        assert_eq!(bot_font_px(20.0), 10.0);
        assert_eq!(bot_font_px(50.0), 20.0);
    }

    #[test]
    fn test_draw_does_not_mutate_world() {
        let state = create_test_state();
        let before = serde_json::to_string(&state).unwrap();
        let mut surface = RecordingSurface::new();
        draw_frame(&mut surface, &state, &Hud::default(), 4000.0, VIEWPORT);
        assert_eq!(serde_json::to_string(&state).unwrap(), before);
    }
}
