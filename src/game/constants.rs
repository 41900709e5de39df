/// Arena constants
pub mod world {
    /// Side length of the square arena in world pixels
    pub const SIZE: f32 = 4000.0;
    /// Grid line spacing drawn on the arena floor
    pub const GRID_SPACING: f32 = 100.0;
}

/// Player constants
pub mod player {
    /// Radius the player starts every session with
    pub const START_RADIUS: f32 = 25.0;
    /// Display name drawn inside the player circle
    pub const NAME: &str = "Kamu";
}

/// Movement speed constants
/// Speed is in world pixels per frame (the simulation is frame-driven, not fixed-timestep)
pub mod speed {
    /// Speed at the reference radius
    pub const BASE: f32 = 3.5;
    /// Radius at which speed equals BASE
    pub const REFERENCE_RADIUS: f32 = 20.0;
    /// Exponent of the slowdown curve: speed = BASE / (r / REFERENCE_RADIUS)^EXPONENT
    pub const EXPONENT: f32 = 0.45;
    /// Bots move slightly slower than the player at equal radius
    pub const BOT_FACTOR: f32 = 0.9;
    /// Velocity multiplier applied per frame when there is no directional intent
    pub const DAMPING: f32 = 0.95;
    /// Smallest radius fed into the speed curve (keeps the curve finite)
    pub const MIN_RADIUS: f32 = 1.0;
}

/// Consumption and growth constants
pub mod growth {
    /// Fraction of a pellet's area gained when eating it
    pub const FOOD_EAT_EFFICIENCY: f32 = 1.0;
    /// Fraction of an entity's area gained when eating it
    pub const PVP_EAT_EFFICIENCY: f32 = 0.4;
    /// A must be this many times B's radius to eat B
    pub const SIZE_TO_EAT_RATIO: f32 = 1.05;
    /// Predation needs dist < A.r - B.r * OVERLAP_FACTOR
    pub const OVERLAP_FACTOR: f32 = 0.3;
    /// Pellet consumption needs dist < eater.r - pellet.r * FOOD_OVERLAP_FACTOR
    pub const FOOD_OVERLAP_FACTOR: f32 = 0.5;
}

/// Food pellet constants
pub mod food {
    /// Number of pellets kept alive in the arena
    pub const COUNT: usize = 400;
    /// Pellet radius range (uniform)
    pub const MIN_RADIUS: f32 = 5.0;
    pub const MAX_RADIUS: f32 = 8.0;
}

/// Bot population constants
pub mod bot {
    /// Target bot population
    pub const COUNT: usize = 18;
    /// Radius range for bots created at session start
    pub const INITIAL_MIN_RADIUS: f32 = 20.0;
    pub const INITIAL_MAX_RADIUS: f32 = 35.0;
    /// Radius range for replacement bots
    pub const RESPAWN_MIN_RADIUS: f32 = 20.0;
    pub const RESPAWN_MAX_RADIUS: f32 = 30.0;
    /// Per-frame chance of spawning one replacement while below target
    pub const RESPAWN_CHANCE: f64 = 0.05;
    /// Name pool for bots
    pub const NAMES: [&str; 15] = [
        "Ayang Galak",
        "Ayang Manja",
        "Si Cantik",
        "Tukang Ngambek",
        "My Love",
        "Bebenyu",
        "Si Pesek",
        "Mantan",
        "Gebetan",
        "Kang Ghosting",
        "Buaya Darat",
        "Si Setia",
        "Playboy",
        "Si Polos",
        "Kang Tikung",
    ];
}

/// Spawn placement constants
pub mod spawn {
    /// Candidates are drawn from [PADDING, SIZE - PADDING) on both axes
    pub const PADDING: f32 = 200.0;
    /// Minimum distance from the player for a safe candidate
    pub const PLAYER_CLEARANCE: f32 = 500.0;
    /// Minimum clearance beyond an existing bot's radius
    pub const BOT_CLEARANCE: f32 = 300.0;
    /// Candidates tried before accepting the last one anyway
    pub const MAX_ATTEMPTS: u32 = 10;
}

/// Bot navigation constants (empirically tuned balance parameters)
pub mod navigation {
    /// Base sensor radius; the bot's own radius is added on top
    pub const SENSOR_RANGE: f32 = 600.0;
    /// Targets are searched this much farther than predators
    pub const TARGET_RANGE_FACTOR: f32 = 1.2;
    /// Pellets closer than this to any edge are ignored
    pub const UNSAFE_FOOD_MARGIN: f32 = 80.0;
    /// Distance from an edge at which the wall push kicks in
    pub const WALL_SENSOR: f32 = 150.0;
    /// Weight of the wall push added to the unit steering vector
    pub const WALL_WEIGHT: f32 = 1.5;
    /// Wander heading changes by a uniform delta in [-JITTER, JITTER] per frame
    pub const WANDER_JITTER: f32 = 0.15;
}

/// Input translation constants
pub mod input {
    /// Tilt angles are clamped to +/- this many degrees by the input layer
    pub const TILT_LIMIT_DEGREES: f32 = 30.0;
    /// Tilt vector scale applied by the translator
    pub const TILT_SCALE: f32 = 1.5;
    /// Capacity of the input event channel between the input layer and the tick
    pub const EVENT_CAPACITY: usize = 256;
}

/// Leaderboard / HUD constants
pub mod hud {
    /// Rows shown on the leaderboard
    pub const LEADERBOARD_SIZE: usize = 5;
    /// Leaderboard is recomputed every this many frames
    pub const LEADERBOARD_INTERVAL: u64 = 30;
    /// Bots at or below this radius are drawn without a name
    pub const LABEL_MIN_RADIUS: f32 = 20.0;
}

/// Circle area for a radius
#[inline]
pub fn radius_to_area(radius: f32) -> f32 {
    std::f32::consts::PI * radius * radius
}

/// Radius of a circle with the given area; non-positive or NaN areas give 0
#[inline]
pub fn area_to_radius(area: f32) -> f32 {
    if area > 0.0 {
        (area / std::f32::consts::PI).sqrt()
    } else {
        0.0
    }
}

/// Movement speed for a radius: BASE / (r / REFERENCE_RADIUS)^EXPONENT
///
/// Continuous and strictly decreasing in radius. Radii below MIN_RADIUS
/// (including zero, negative and NaN) are evaluated at MIN_RADIUS.
#[inline]
pub fn radius_to_speed(radius: f32) -> f32 {
    let r = if radius >= speed::MIN_RADIUS {
        radius
    } else {
        speed::MIN_RADIUS
    };
    speed::BASE / (r / speed::REFERENCE_RADIUS).powf(speed::EXPONENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_radius_roundtrip() {
        let r = 37.5;
        assert!((area_to_radius(radius_to_area(r)) - r).abs() < 0.001);
    }

    #[test]
    fn test_area_to_radius_guards_degenerate_areas() {
        assert_eq!(area_to_radius(0.0), 0.0);
        assert_eq!(area_to_radius(-10.0), 0.0);
        assert_eq!(area_to_radius(f32::NAN), 0.0);
    }

    #[test]
    fn test_speed_at_reference_radius() {
        let s = radius_to_speed(speed::REFERENCE_RADIUS);
        assert!((s - speed::BASE).abs() < 0.0001);
    }

    #[test]
    fn test_speed_at_start_radius() {
        // 3.5 / 1.25^0.45
        let s = radius_to_speed(player::START_RADIUS);
        assert!((s - 3.1657).abs() < 0.01, "got {}", s);
    }

    #[test]
    fn test_speed_strictly_decreasing() {
        let radii = [
            1.0,
            5.0,
            player::START_RADIUS,
            50.0,
            100.0,
            400.0,
            1000.0,
            world::SIZE / 2.0,
        ];
        for pair in radii.windows(2) {
            let (r1, r2) = (pair[0], pair[1]);
            assert!(
                radius_to_speed(r1) > radius_to_speed(r2),
                "speed({}) = {} should exceed speed({}) = {}",
                r1,
                radius_to_speed(r1),
                r2,
                radius_to_speed(r2)
            );
        }
    }

    #[test]
    fn test_speed_continuous() {
        // Small radius steps only produce small speed steps
        let mut r = 10.0;
        while r < 500.0 {
            let delta = (radius_to_speed(r) - radius_to_speed(r + 0.01)).abs();
            assert!(delta < 0.01, "jump of {} at r={}", delta, r);
            r += 7.3;
        }
    }

    #[test]
    fn test_speed_no_nan_or_inf() {
        for r in [0.0, -1.0, f32::NAN, f32::EPSILON, f32::MAX] {
            let s = radius_to_speed(r);
            assert!(s.is_finite(), "bad speed {} for r={}", s, r);
            assert!(s > 0.0);
        }
    }

    #[test]
    fn test_eat_ratio_above_one() {
        assert!(growth::SIZE_TO_EAT_RATIO > 1.0);
        assert!(growth::PVP_EAT_EFFICIENCY < growth::FOOD_EAT_EFFICIENCY);
    }

    #[test]
    fn test_spawn_padding_inside_world() {
        assert!(spawn::PADDING * 2.0 < world::SIZE);
        assert!(navigation::UNSAFE_FOOD_MARGIN < navigation::WALL_SENSOR);
    }
}
