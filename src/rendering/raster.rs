//! Executes paint commands on a surface's tiny-skia pixmap

use crate::rendering::layout::{Layer, PosterLayout};
use crate::rendering::paint::{Fill, PaintCommand, Point, StrokeStyle, TextRun};
use crate::rendering::effects::{Clip, Coverage};
use crate::rendering::text::Typesetter;
use crate::rendering::Surface;
use crate::theme::Rgba;
use log::{debug, warn};
use tiny_skia::{
    Color, FillRule, GradientStop, LinearGradient, Paint, PathBuilder, RadialGradient, Rect,
    Shader, SpreadMode, Stroke, Transform,
};

fn color(c: Rgba) -> Color {
    Color::from_rgba(
        f32::from(c.r) / 255.0,
        f32::from(c.g) / 255.0,
        f32::from(c.b) / 255.0,
        c.a.clamp(0.0, 1.0),
    )
    .unwrap_or(Color::TRANSPARENT)
}

fn point(p: Point) -> tiny_skia::Point {
    tiny_skia::Point::from_xy(p.x, p.y)
}

/// Shader for `fill` with `opacity` folded into every stop.
fn shader(fill: &Fill, opacity: f32) -> Option<Shader<'static>> {
    match *fill {
        Fill::Solid(c) => Some(Shader::SolidColor(color(c.with_opacity(opacity)))),
        Fill::Linear {
            start,
            end,
            from,
            to,
        } => LinearGradient::new(
            point(start),
            point(end),
            vec![
                GradientStop::new(0.0, color(from.with_opacity(opacity))),
                GradientStop::new(1.0, color(to.with_opacity(opacity))),
            ],
            SpreadMode::Pad,
            Transform::identity(),
        ),
        Fill::Radial {
            center,
            inner_radius,
            outer_radius,
            from,
            to,
        } => {
            // Concentric circles: everything inside the inner radius takes the first stop.
            let inner = if outer_radius > 0.0 {
                (inner_radius / outer_radius).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let c0 = color(from.with_opacity(opacity));
            RadialGradient::new(
                point(center),
                point(center),
                outer_radius,
                vec![
                    GradientStop::new(0.0, c0),
                    GradientStop::new(inner, c0),
                    GradientStop::new(1.0, color(to.with_opacity(opacity))),
                ],
                SpreadMode::Pad,
                Transform::identity(),
            )
        }
    }
}

fn paint(fill: &Fill, opacity: f32) -> Option<Paint<'static>> {
    let shader = shader(fill, opacity)?;
    Some(Paint {
        shader,
        anti_alias: true,
        ..Paint::default()
    })
}

fn stroke(style: &StrokeStyle) -> Stroke {
    Stroke {
        width: style.width,
        ..Stroke::default()
    }
}

/// Paint a composed poster, all layers in order.
pub fn rasterize(surface: &mut Surface, layout: &PosterLayout, mut fonts: Option<&mut Typesetter>) {
    for layer in &layout.layers {
        paint_layer(surface, layer, fonts.as_deref_mut());
    }
}

/// Paint one layer's commands in order.
///
/// Text commands need a typesetter; without one they are skipped.
pub fn paint_layer(surface: &mut Surface, layer: &Layer, mut fonts: Option<&mut Typesetter>) {
    debug!("painting {:?} ({} commands)", layer.kind, layer.commands.len());
    for command in &layer.commands {
        paint_command(surface, command, fonts.as_deref_mut());
    }
}

pub fn paint_command(surface: &mut Surface, command: &PaintCommand, fonts: Option<&mut Typesetter>) {
    let ts = surface.transform();
    match command {
        PaintCommand::FillRect {
            x,
            y,
            width,
            height,
            fill,
        } => {
            if let (Some(rect), Some(paint)) = (Rect::from_xywh(*x, *y, *width, *height), paint(fill, 1.0)) {
                surface.pixmap_mut().fill_rect(rect, &paint, ts, None);
            }
        }
        PaintCommand::FillCircle {
            center,
            radius,
            fill,
        } => {
            if let (Some(path), Some(paint)) = (PathBuilder::from_circle(center.x, center.y, *radius), paint(fill, 1.0)) {
                surface
                    .pixmap_mut()
                    .fill_path(&path, &paint, FillRule::Winding, ts, None);
            }
        }
        PaintCommand::StrokeLine {
            from,
            to,
            stroke: style,
            opacity,
        } => {
            let mut pb = PathBuilder::new();
            pb.move_to(from.x, from.y);
            pb.line_to(to.x, to.y);
            if let (Some(path), Some(paint)) = (pb.finish(), paint(&style.fill, *opacity)) {
                surface
                    .pixmap_mut()
                    .stroke_path(&path, &paint, &stroke(style), ts, None);
            }
        }
        PaintCommand::StrokeCircle {
            center,
            radius,
            stroke: style,
        } => {
            if let (Some(path), Some(paint)) = (PathBuilder::from_circle(center.x, center.y, *radius), paint(&style.fill, 1.0)) {
                surface
                    .pixmap_mut()
                    .stroke_path(&path, &paint, &stroke(style), ts, None);
            }
        }
        PaintCommand::Text(run) => match fonts {
            Some(typesetter) => paint_text(surface, run, typesetter),
            None => debug!("no typesetter; skipping text run"),
        },
    }
}

fn paint_text(surface: &mut Surface, run: &TextRun, typesetter: &mut Typesetter) {
    let scale = surface.density();
    let anchor = (run.anchor.x * scale, run.anchor.y * scale);
    let clip = Clip::surface(
        surface.width(),
        surface.height(),
        (effect_reach(run) * scale).ceil() as i32,
    );
    let glyphs = typesetter.coverage(&run.text, &run.font, anchor, scale, clip);
    if glyphs.is_empty() {
        return;
    }
    if let Some(shadow) = &run.shadow {
        let cast = glyphs
            .offset((shadow.offset_y * scale).round() as i32)
            .blurred(shadow.blur / 2.0 * scale);
        fill_through(surface, &cast, &Fill::Solid(shadow.color));
    }
    if let Some(style) = &run.stroke {
        fill_through(surface, &glyphs.dilated(style.width / 2.0 * scale), &style.fill);
    }
    fill_through(surface, &glyphs, &run.fill);
}

/// How far (logical px) stroke and shadow effects can pull ink onto the surface from outside it.
fn effect_reach(run: &TextRun) -> f32 {
    let stroke = run.stroke.map_or(0.0, |s| s.width / 2.0);
    let shadow = run
        .shadow
        .map_or(0.0, |s| s.blur / 2.0 * 3.0 + s.offset_y.abs());
    stroke.max(shadow) + 1.0
}

/// Fill the coverage's bounding box with `fill`, masked by the coverage.
fn fill_through(surface: &mut Surface, coverage: &Coverage, fill: &Fill) {
    let Some(mask) = coverage.to_mask(surface.width(), surface.height()) else {
        warn!("cannot allocate text mask; skipping run");
        return;
    };
    let scale = surface.density();
    let (x, y, w, h) = coverage.bounds();
    let rect = Rect::from_xywh(
        x as f32 / scale,
        y as f32 / scale,
        w as f32 / scale,
        h as f32 / scale,
    );
    if let (Some(rect), Some(paint)) = (rect, paint(fill, 1.0)) {
        let ts = surface.transform();
        surface.pixmap_mut().fill_rect(rect, &paint, ts, Some(&mask));
    }
}
