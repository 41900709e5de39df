//! HUD composition: score, best score and the leaderboard

use crate::game::leaderboard::LeaderboardSnapshot;
use crate::game::session::Session;
use crate::game::state::Color;
use crate::render::RenderSurface;
use crate::util::vec2::Vec2;

const MARGIN: f32 = 16.0;
const LINE_HEIGHT: f32 = 18.0;
const FONT_PX: f32 = 14.0;
const ROW_FONT_PX: f32 = 12.0;
const PANEL_WIDTH: f32 = 192.0;

/// Highlighted leaderboard row
pub const HIGHLIGHT: Color = Color::Rgb(0xfa, 0xcc, 0x15);
const TEXT: Color = Color::WHITE;
const MUTED: Color = Color::Rgba(255, 255, 255, 0.5);
const TROPHY: Color = HIGHLIGHT;

/// One leaderboard line as shown
#[derive(Debug, Clone, PartialEq)]
pub struct HudRow {
    pub rank: usize,
    pub name: String,
    pub score: u32,
    pub highlighted: bool,
}

/// Read-only projection of the session for the overlay
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hud {
    pub score: u32,
    pub best_score: u32,
    pub rows: Vec<HudRow>,
}

impl Hud {
    pub fn new(score: u32, best_score: u32, leaderboard: &LeaderboardSnapshot) -> Self {
        let rows = leaderboard
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| HudRow {
                rank: i + 1,
                name: row.name.clone(),
                score: row.score,
                highlighted: row.is_player,
            })
            .collect();
        Self {
            score,
            best_score,
            rows,
        }
    }

    pub fn from_session(session: &Session) -> Self {
        Self::new(session.score(), session.best_score(), session.leaderboard())
    }

    /// No snapshot has been taken yet
    pub fn is_loading(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Draw the HUD in screen space: scores top-left, leaderboard top-right
pub fn draw_hud<S: RenderSurface + ?Sized>(surface: &mut S, hud: &Hud, viewport: Vec2) {
    let left = MARGIN + PANEL_WIDTH / 4.0;
    surface.fill_text(
        &format!("Skor: {}", hud.score),
        Vec2::new(left, MARGIN + LINE_HEIGHT),
        FONT_PX,
        TEXT,
    );
    surface.fill_text(
        &format!("Best: {}", hud.best_score),
        Vec2::new(left, MARGIN + LINE_HEIGHT * 2.0),
        FONT_PX,
        TROPHY,
    );

    let panel_x = (viewport.x - MARGIN - PANEL_WIDTH / 2.0).max(0.0);
    surface.fill_text(
        "Leaderboard",
        Vec2::new(panel_x, MARGIN + LINE_HEIGHT),
        FONT_PX,
        TEXT,
    );

    if hud.is_loading() {
        surface.fill_text(
            "Loading...",
            Vec2::new(panel_x, MARGIN + LINE_HEIGHT * 2.0),
            ROW_FONT_PX,
            MUTED,
        );
        return;
    }

    for (i, row) in hud.rows.iter().enumerate() {
        let color = if row.highlighted { HIGHLIGHT } else { TEXT };
        surface.fill_text(
            &format!("{}. {}  {}", row.rank, row.name, row.score),
            Vec2::new(panel_x, MARGIN + LINE_HEIGHT * (i as f32 + 2.0)),
            ROW_FONT_PX,
            color,
        );
    }
}
