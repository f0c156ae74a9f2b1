//! Poster composition: turns a theme and a seeded generator into ordered paint layers.
//!
//! Layer order is fixed and later layers paint over earlier ones:
//! background, stars, halos, rays, title, subtitle, ornament.
//!
//! Generator draws happen in exactly this order and nowhere else:
//! [`DRAWS_PER_STAR`] per star (x, y, radius, alpha), then [`DRAWS_PER_RAY`]
//! per ray (angle jitter, length jitter). Changing either sequence changes
//! every poster ever rendered.

use crate::random::SeededRandom;
use crate::rendering::paint::{
    Fill, FontSpec, GenericFamily, PaintCommand, Point, Shadow, StrokeStyle, TextRun,
};
use crate::rendering::LogicalSize;
use crate::theme::{Rgba, Theme};
use std::f64::consts::PI;

pub const STAR_COUNT: usize = 400;
/// x, y, radius, alpha
pub const DRAWS_PER_STAR: usize = 4;
pub const RAY_COUNT: usize = 24;
/// angle jitter, then length jitter
pub const DRAWS_PER_RAY: usize = 2;
/// Total generator draws consumed by one composition
pub const DRAWS_PER_POSTER: usize = STAR_COUNT * DRAWS_PER_STAR + RAY_COUNT * DRAWS_PER_RAY;

pub const HALO_COUNT: usize = 7;
const HALO_INNER: Rgba = Rgba::rgba(255, 215, 0, 0.12);
const HALO_OUTER: Rgba = Rgba::rgba(255, 215, 0, 0.02);

const RAY_WIDTH: f32 = 2.2;
const RAY_OPACITY: f32 = 0.6;
const ORNAMENT_WIDTH: f32 = 3.0;
const SIGIL_RADIUS: f32 = 12.0;

pub const TITLE_FONT: FontSpec = FontSpec {
    families: &["Amiri", "Cairo"],
    generic: GenericFamily::Serif,
    weight: 700,
    size: 92.0,
};

pub const SUBTITLE_FONT: FontSpec = FontSpec {
    families: &["Cairo", "Amiri"],
    generic: GenericFamily::SansSerif,
    weight: 700,
    size: 44.0,
};

/// Focal point and halo extent of the composition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub width: f32,
    pub height: f32,
    pub cx: f32,
    pub cy: f32,
    pub max_r: f32,
}

impl Geometry {
    pub fn for_canvas(size: LogicalSize) -> Self {
        let width = size.width as f32;
        let height = size.height as f32;
        Self {
            width,
            height,
            cx: width / 2.0,
            cy: height * 0.42,
            max_r: width.min(height) * 0.35,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub alpha: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub angle: f64,
    pub inner_radius: f32,
    pub outer_radius: f32,
}

impl Ray {
    fn endpoints(&self, cx: f32, cy: f32) -> (Point, Point) {
        let (sin, cos) = self.angle.sin_cos();
        let at = |r: f32| {
            Point::new(
                (f64::from(cx) + cos * f64::from(r)) as f32,
                (f64::from(cy) + sin * f64::from(r)) as f32,
            )
        };
        (at(self.inner_radius), at(self.outer_radius))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Background,
    Stars,
    Halos,
    Rays,
    Title,
    Subtitle,
    Ornament,
}

impl LayerKind {
    /// Layers that must wait for the font gate before painting
    pub fn needs_fonts(self) -> bool {
        matches!(self, LayerKind::Title | LayerKind::Subtitle)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub kind: LayerKind,
    pub commands: Vec<PaintCommand>,
}

/// A fully composed poster, ready to rasterize
#[derive(Debug, Clone, PartialEq)]
pub struct PosterLayout {
    pub geometry: Geometry,
    pub stars: Vec<Star>,
    pub rays: Vec<Ray>,
    pub layers: Vec<Layer>,
    /// Generator draws consumed while composing
    pub draws: u64,
}

impl PosterLayout {
    pub fn layer(&self, kind: LayerKind) -> Option<&Layer> {
        self.layers.iter().find(|l| l.kind == kind)
    }
}

/// Compose a poster for `(title, subtitle)` in `theme` on the standard canvas.
pub fn compose_poster(theme: &Theme, title: &str, subtitle: &str) -> PosterLayout {
    let mut rng = SeededRandom::for_poster(title, subtitle);
    compose_with(LogicalSize::POSTER, theme, title, subtitle, &mut rng)
}

/// Compose with an explicit canvas and generator.
pub fn compose_with(
    size: LogicalSize,
    theme: &Theme,
    title: &str,
    subtitle: &str,
    rng: &mut SeededRandom,
) -> PosterLayout {
    let start = rng.draws();
    let geometry = Geometry::for_canvas(size);
    let gold = Fill::Linear {
        start: Point::new(0.0, 0.0),
        end: Point::new(geometry.width, 0.0),
        from: theme.gold_a,
        to: theme.gold_b,
    };

    let stars = scatter_stars(&geometry, rng);
    let rays = cast_rays(&geometry, rng);

    let layers = vec![
        Layer {
            kind: LayerKind::Background,
            commands: vec![PaintCommand::FillRect {
                x: 0.0,
                y: 0.0,
                width: geometry.width,
                height: geometry.height,
                fill: Fill::Linear {
                    start: Point::new(0.0, 0.0),
                    end: Point::new(0.0, geometry.height),
                    from: theme.background_a,
                    to: theme.background_b,
                },
            }],
        },
        Layer {
            kind: LayerKind::Stars,
            commands: stars
                .iter()
                .map(|s| PaintCommand::FillCircle {
                    center: Point::new(s.x, s.y),
                    radius: s.radius,
                    fill: Fill::Solid(theme.star_color.with_opacity(s.alpha)),
                })
                .collect(),
        },
        Layer {
            kind: LayerKind::Halos,
            commands: halos(&geometry),
        },
        Layer {
            kind: LayerKind::Rays,
            commands: rays
                .iter()
                .map(|ray| {
                    let (from, to) = ray.endpoints(geometry.cx, geometry.cy);
                    PaintCommand::StrokeLine {
                        from,
                        to,
                        stroke: StrokeStyle {
                            fill: gold,
                            width: RAY_WIDTH,
                        },
                        opacity: RAY_OPACITY,
                    }
                })
                .collect(),
        },
        Layer {
            kind: LayerKind::Title,
            commands: title_runs(&geometry, theme, title),
        },
        Layer {
            kind: LayerKind::Subtitle,
            commands: vec![subtitle_run(&geometry, subtitle)],
        },
        Layer {
            kind: LayerKind::Ornament,
            commands: ornament(&geometry, gold),
        },
    ];

    PosterLayout {
        geometry,
        stars,
        rays,
        layers,
        draws: rng.draws() - start,
    }
}

fn scatter_stars(g: &Geometry, rng: &mut SeededRandom) -> Vec<Star> {
    (0..STAR_COUNT)
        .map(|_| {
            let x = (rng.next_f64() * f64::from(g.width)).floor() as f32;
            let y = (rng.next_f64() * f64::from(g.height)).floor() as f32;
            let radius = (rng.next_f64() * 1.5 + 0.2) as f32;
            let alpha = (0.6 + rng.next_f64() * 0.4) as f32;
            Star { x, y, radius, alpha }
        })
        .collect()
}

fn cast_rays(g: &Geometry, rng: &mut SeededRandom) -> Vec<Ray> {
    (0..RAY_COUNT)
        .map(|i| {
            let angle = (i as f64 / RAY_COUNT as f64) * PI * 2.0 + rng.next_f64() * 0.02;
            let inner_radius = g.max_r * 0.15;
            let outer_radius = g.max_r * (0.8 + rng.next_f64() * 0.2) as f32;
            Ray {
                angle,
                inner_radius,
                outer_radius,
            }
        })
        .collect()
}

fn halos(g: &Geometry) -> Vec<PaintCommand> {
    let center = Point::new(g.cx, g.cy);
    (0..HALO_COUNT)
        .map(|i| {
            let t = i as f32 / (HALO_COUNT - 1) as f32;
            let radius = g.max_r * (0.25 + t * 0.75);
            PaintCommand::FillCircle {
                center,
                radius,
                fill: Fill::Radial {
                    center,
                    inner_radius: radius * 0.2,
                    outer_radius: radius,
                    from: HALO_INNER,
                    to: HALO_OUTER,
                },
            }
        })
        .collect()
}

fn title_runs(g: &Geometry, theme: &Theme, title: &str) -> Vec<PaintCommand> {
    let y = g.cy + g.max_r * 0.15;
    let shadow = TextRun {
        text: title.to_string(),
        anchor: Point::new(g.cx, y + 2.0),
        font: TITLE_FONT,
        fill: Fill::Solid(Rgba::rgba(0, 0, 0, 0.45)),
        stroke: Some(StrokeStyle {
            fill: Fill::Solid(Rgba::rgba(0, 0, 0, 0.35)),
            width: 8.0,
        }),
        shadow: None,
    };
    let gilded = TextRun {
        text: title.to_string(),
        anchor: Point::new(g.cx, y),
        font: TITLE_FONT,
        fill: Fill::Linear {
            start: Point::new(g.cx - 200.0, g.cy),
            end: Point::new(g.cx + 200.0, g.cy),
            from: theme.gold_a,
            to: theme.gold_b,
        },
        stroke: Some(StrokeStyle {
            fill: Fill::Solid(Rgba::rgba(255, 255, 255, 0.25)),
            width: 2.0,
        }),
        shadow: None,
    };
    vec![PaintCommand::Text(shadow), PaintCommand::Text(gilded)]
}

fn subtitle_run(g: &Geometry, subtitle: &str) -> PaintCommand {
    PaintCommand::Text(TextRun {
        text: subtitle.to_string(),
        anchor: Point::new(g.cx, g.cy + g.max_r * 0.28),
        font: SUBTITLE_FONT,
        fill: Fill::Solid(Rgba::rgba(255, 255, 255, 0.92)),
        stroke: None,
        shadow: Some(Shadow {
            color: Rgba::rgba(0, 0, 0, 0.35),
            blur: 18.0,
            offset_y: 0.0,
        }),
    })
}

fn ornament(g: &Geometry, gold: Fill) -> Vec<PaintCommand> {
    let stroke = StrokeStyle {
        fill: gold,
        width: ORNAMENT_WIDTH,
    };
    let ox = g.width * 0.16;
    let oy = g.height * 0.86;
    vec![
        PaintCommand::StrokeLine {
            from: Point::new(ox, oy),
            to: Point::new(g.width - ox, oy),
            stroke,
            opacity: 1.0,
        },
        PaintCommand::StrokeCircle {
            center: Point::new(g.cx, oy),
            radius: SIGIL_RADIUS,
            stroke,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::{theme_at, THEMES};

    #[test]
    fn geometry_of_standard_canvas() {
        let g = Geometry::for_canvas(LogicalSize::POSTER);
        assert_eq!(g.cx, 800.0);
        assert!((g.cy - 1075.2).abs() < 1e-3);
        assert!((g.max_r - 560.0).abs() < 1e-3);
    }

    #[test]
    fn draw_count_is_fixed_regardless_of_text() {
        let long = "نجوم ".repeat(500);
        for (title, subtitle) in [("", ""), ("A", "B"), (long.as_str(), "x")] {
            let layout = compose_poster(theme_at(0), title, subtitle);
            assert_eq!(layout.stars.len(), STAR_COUNT);
            assert_eq!(layout.rays.len(), RAY_COUNT);
            assert_eq!(layout.draws as usize, DRAWS_PER_POSTER);
            assert_eq!(DRAWS_PER_POSTER, 400 * 4 + 24 * 2);
        }
    }

    #[test]
    fn first_star_uses_first_four_draws() {
        let layout = compose_poster(theme_at(0), "A", "B");
        let mut rng = SeededRandom::for_poster("A", "B");
        let x = (rng.next_f64() * 1600.0).floor() as f32;
        let y = (rng.next_f64() * 2560.0).floor() as f32;
        let radius = (rng.next_f64() * 1.5 + 0.2) as f32;
        let alpha = (0.6 + rng.next_f64() * 0.4) as f32;
        assert_eq!(layout.stars[0], Star { x, y, radius, alpha });
        assert_eq!((layout.stars[0].x, layout.stars[0].y), (161.0, 15.0));
        assert!((layout.stars[0].alpha - 0.959_331_9).abs() < 1e-6);
    }

    #[test]
    fn rays_follow_stars_in_draw_order() {
        let layout = compose_poster(theme_at(0), "a", "b");
        let mut rng = SeededRandom::for_poster("a", "b");
        for _ in 0..STAR_COUNT * DRAWS_PER_STAR {
            rng.next_f64();
        }
        let jitter = rng.next_f64() * 0.02;
        let length = rng.next_f64();
        assert_eq!(layout.rays[0].angle, jitter);
        assert_eq!(layout.rays[0].outer_radius, 560.0 * (0.8 + length * 0.2) as f32);
    }

    #[test]
    fn stars_and_rays_stay_in_bounds() {
        let layout = compose_poster(theme_at(2), "عنوان", "سطر");
        for s in &layout.stars {
            assert!(s.x >= 0.0 && s.x < 1600.0);
            assert!(s.y >= 0.0 && s.y < 2560.0);
            assert!(s.radius >= 0.2 && s.radius <= 1.7);
            assert!(s.alpha >= 0.6 && s.alpha <= 1.0);
        }
        for (i, r) in layout.rays.iter().enumerate() {
            let base = i as f64 / 24.0 * PI * 2.0;
            assert!(r.angle >= base && r.angle < base + 0.02);
            assert!(r.outer_radius >= 560.0 * 0.8 && r.outer_radius <= 560.0);
        }
    }

    #[test]
    fn layers_are_in_paint_order() {
        let layout = compose_poster(theme_at(0), "A", "B");
        let kinds: Vec<LayerKind> = layout.layers.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![
                LayerKind::Background,
                LayerKind::Stars,
                LayerKind::Halos,
                LayerKind::Rays,
                LayerKind::Title,
                LayerKind::Subtitle,
                LayerKind::Ornament,
            ]
        );
        assert_eq!(layout.layer(LayerKind::Halos).unwrap().commands.len(), HALO_COUNT);
        assert_eq!(layout.layer(LayerKind::Title).unwrap().commands.len(), 2);
    }

    #[test]
    fn halos_grow_outward() {
        let layout = compose_poster(theme_at(0), "", "");
        let radii: Vec<f32> = layout
            .layer(LayerKind::Halos)
            .unwrap()
            .commands
            .iter()
            .map(|c| match c {
                PaintCommand::FillCircle { radius, .. } => *radius,
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert!((radii[0] - 140.0).abs() < 1e-3);
        assert!((radii[6] - 560.0).abs() < 1e-3);
        assert!(radii.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn theme_changes_colors_not_geometry() {
        let a = compose_poster(&THEMES[0], "A", "B");
        let b = compose_poster(&THEMES[1], "A", "B");
        assert_eq!(a.stars, b.stars);
        assert_eq!(a.rays, b.rays);
        assert_ne!(a.layers, b.layers);
    }

    #[test]
    fn empty_text_still_emits_text_commands() {
        let layout = compose_poster(theme_at(0), "", "");
        let sub = layout.layer(LayerKind::Subtitle).unwrap();
        assert_eq!(sub.commands.len(), 1);
        assert!(sub.commands[0].is_text());
    }
}
