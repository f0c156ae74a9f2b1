//! Paint command set for the poster display list.
//!
//! All coordinates are logical (canvas) units; the rasterizer applies the
//! surface's density scale.

use crate::theme::Rgba;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// How a shape or glyph run is colored
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill {
    Solid(Rgba),
    /// Two-stop linear gradient, padded beyond its ends
    Linear {
        start: Point,
        end: Point,
        from: Rgba,
        to: Rgba,
    },
    /// Concentric two-stop radial gradient: `from` inside `inner_radius`,
    /// blending to `to` at `outer_radius`
    Radial {
        center: Point,
        inner_radius: f32,
        outer_radius: f32,
        from: Rgba,
        to: Rgba,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub fill: Fill,
    pub width: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub color: Rgba,
    /// Canvas-style blur radius; the Gaussian sigma is half of it
    pub blur: f32,
    pub offset_y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenericFamily {
    Serif,
    SansSerif,
}

/// Requested face: preferred families in order, then a generic fallback
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub families: &'static [&'static str],
    pub generic: GenericFamily,
    pub weight: u16,
    pub size: f32,
}

/// One centred line of text, painted shadow first, then stroke, then fill
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub anchor: Point,
    pub font: FontSpec,
    pub fill: Fill,
    pub stroke: Option<StrokeStyle>,
    pub shadow: Option<Shadow>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Fill,
    },
    FillCircle {
        center: Point,
        radius: f32,
        fill: Fill,
    },
    StrokeLine {
        from: Point,
        to: Point,
        stroke: StrokeStyle,
        opacity: f32,
    },
    StrokeCircle {
        center: Point,
        radius: f32,
        stroke: StrokeStyle,
    },
    Text(TextRun),
}

impl PaintCommand {
    pub fn is_text(&self) -> bool {
        matches!(self, PaintCommand::Text(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_text_commands_report_text() {
        let rect = PaintCommand::FillRect {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            fill: Fill::Solid(Rgba::rgb(255, 0, 0)),
        };
        assert!(!rect.is_text());

        let text = PaintCommand::Text(TextRun {
            text: String::new(),
            anchor: Point::new(0.0, 0.0),
            font: FontSpec {
                families: &["Cairo"],
                generic: GenericFamily::SansSerif,
                weight: 700,
                size: 44.0,
            },
            fill: Fill::Solid(Rgba::rgb(255, 255, 255)),
            stroke: None,
            shadow: None,
        });
        assert!(text.is_text());
    }
}
