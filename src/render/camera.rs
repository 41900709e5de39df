use crate::util::vec2::Vec2;

/// Translation-only camera: the player's world position maps to the screen
/// center. One world pixel is always one screen pixel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Camera {
    /// Added to world coordinates to get screen coordinates
    pub offset: Vec2,
}

impl Camera {
    /// Center the view on `target` for a viewport of `viewport` pixels
    pub fn follow(target: Vec2, viewport: Vec2) -> Self {
        Self {
            offset: screen_center(viewport) - target,
        }
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world + self.offset
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        screen - self.offset
    }

    /// Whether a circle overlaps the viewport
    pub fn is_visible(&self, center: Vec2, radius: f32, viewport: Vec2) -> bool {
        let p = self.world_to_screen(center);
        p.x + radius >= 0.0
            && p.y + radius >= 0.0
            && p.x - radius <= viewport.x
            && p.y - radius <= viewport.y
    }
}

/// Middle of a viewport in screen pixels
#[inline]
pub fn screen_center(viewport: Vec2) -> Vec2 {
    viewport * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Vec2 = Vec2 { x: 1280.0, y: 720.0 };

    #[test]
    fn test_player_maps_to_center() {
        let player = Vec2::new(2000.0, 1500.0);
        let camera = Camera::follow(player, VIEWPORT);
        assert_eq!(camera.world_to_screen(player), Vec2::new(640.0, 360.0));
        assert_eq!(camera.offset, Vec2::new(-1360.0, -1140.0));
    }

    #[test]
    fn test_pure_translation() {
        let camera = Camera::follow(Vec2::new(100.0, 100.0), VIEWPORT);
        let a = Vec2::new(150.0, 80.0);
        let b = Vec2::new(250.0, 180.0);
        let d_world = b - a;
        let d_screen = camera.world_to_screen(b) - camera.world_to_screen(a);
        assert_eq!(d_world, d_screen);
        assert_eq!(camera.screen_to_world(camera.world_to_screen(a)), a);
    }

    #[test]
    fn test_visibility() {
        let camera = Camera::follow(Vec2::new(2000.0, 2000.0), VIEWPORT);
        assert!(camera.is_visible(Vec2::new(2000.0, 2000.0), 10.0, VIEWPORT));
        assert!(!camera.is_visible(Vec2::new(3000.0, 2000.0), 10.0, VIEWPORT));
        // Edge overlap counts
        assert!(camera.is_visible(Vec2::new(1355.0, 2000.0), 10.0, VIEWPORT));
    }
}
