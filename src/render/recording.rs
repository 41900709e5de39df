use serde::Serialize;

use crate::game::state::Color;
use crate::render::RenderSurface;
use crate::util::vec2::Vec2;

/// One recorded drawing primitive, in the coordinates it was issued with
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawCommand {
    ResetTransform,
    Translate(Vec2),
    FillRect { origin: Vec2, size: Vec2, color: Color },
    StrokeRect { origin: Vec2, size: Vec2, color: Color, width: f32 },
    StrokeLine { from: Vec2, to: Vec2, color: Color, width: f32 },
    FillCircle { center: Vec2, radius: f32, color: Color },
    StrokeCircle { center: Vec2, radius: f32, color: Color, width: f32 },
    FillText { text: String, at: Vec2, font_px: f32, color: Color },
}

/// Surface that records draw calls instead of rasterizing them.
/// Backs the headless host and render tests.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    translation: Vec2,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Accumulated translation at the end of the recording
    pub fn translation(&self) -> Vec2 {
        self.translation
    }

    /// Forget recorded commands, e.g. before the next frame
    pub fn clear(&mut self) {
        self.commands.clear();
        self.translation = Vec2::ZERO;
    }

    /// Filled circles as (center, radius, color) in draw order
    pub fn circle_fills(&self) -> impl Iterator<Item = (Vec2, f32, Color)> + '_ {
        self.commands.iter().filter_map(|c| match *c {
            DrawCommand::FillCircle {
                center,
                radius,
                color,
            } => Some((center, radius, color)),
            _ => None,
        })
    }

    /// Text draws as (text, anchor, font size) in draw order
    pub fn texts(&self) -> impl Iterator<Item = (&str, Vec2, f32)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::FillText {
                text, at, font_px, ..
            } => Some((text.as_str(), *at, *font_px)),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl RenderSurface for RecordingSurface {
    fn reset_transform(&mut self) {
        self.translation = Vec2::ZERO;
        self.commands.push(DrawCommand::ResetTransform);
    }

    fn translate(&mut self, offset: Vec2) {
        self.translation += offset;
        self.commands.push(DrawCommand::Translate(offset));
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color) {
        self.commands.push(DrawCommand::FillRect { origin, size, color });
    }

    fn stroke_rect(&mut self, origin: Vec2, size: Vec2, color: Color, width: f32) {
        self.commands.push(DrawCommand::StrokeRect {
            origin,
            size,
            color,
            width,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32) {
        self.commands.push(DrawCommand::StrokeLine {
            from,
            to,
            color,
            width,
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Color, width: f32) {
        self.commands.push(DrawCommand::StrokeCircle {
            center,
            radius,
            color,
            width,
        });
    }

    fn fill_text(&mut self, text: &str, at: Vec2, font_px: f32, color: Color) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_string(),
            at,
            font_px,
            color,
        });
    }
}
