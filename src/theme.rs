//! Fixed, ordered catalog of poster color themes.
//!
//! Selection wraps around the catalog, so every index maps to exactly one theme.

use serde::Serialize;
use std::fmt;

/// Straight (non-premultiplied) sRGB color with a fractional alpha
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Multiply the alpha channel by `opacity`.
    pub fn with_opacity(self, opacity: f32) -> Self {
        Self {
            a: (self.a * opacity).clamp(0.0, 1.0),
            ..self
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a >= 1.0 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.a)
        }
    }
}

/// An immutable set of colors applied uniformly across one render
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Theme {
    pub name: &'static str,
    /// Backdrop gradient, top stop
    pub background_a: Rgba,
    /// Backdrop gradient, bottom stop
    pub background_b: Rgba,
    pub star_color: Rgba,
    /// Gold gradient start (rays, ornament, title fill)
    pub gold_a: Rgba,
    /// Gold gradient end
    pub gold_b: Rgba,
}

pub const THEMES: [Theme; 4] = [
    Theme {
        name: "midnight",
        background_a: Rgba::rgb(0x0b, 0x0f, 0x2b),
        background_b: Rgba::rgb(0x00, 0x00, 0x00),
        star_color: Rgba::rgba(255, 255, 255, 0.9),
        gold_a: Rgba::rgb(0xf6, 0xd3, 0x65),
        gold_b: Rgba::rgb(0xfd, 0xa0, 0x85),
    },
    Theme {
        name: "royal",
        background_a: Rgba::rgb(0x12, 0x0a, 0x3a),
        background_b: Rgba::rgb(0x00, 0x00, 0x00),
        star_color: Rgba::rgba(220, 235, 255, 0.95),
        gold_a: Rgba::rgb(0xff, 0xd7, 0x00),
        gold_b: Rgba::rgb(0xb8, 0x86, 0x0b),
    },
    Theme {
        name: "lagoon",
        background_a: Rgba::rgb(0x0f, 0x20, 0x27),
        background_b: Rgba::rgb(0x00, 0x00, 0x00),
        star_color: Rgba::rgba(240, 248, 255, 0.95),
        gold_a: Rgba::rgb(0xf0, 0xe6, 0x8c),
        gold_b: Rgba::rgb(0xff, 0xd7, 0x00),
    },
    Theme {
        name: "amethyst",
        background_a: Rgba::rgb(0x1b, 0x00, 0x28),
        background_b: Rgba::rgb(0x00, 0x00, 0x00),
        star_color: Rgba::rgba(255, 255, 255, 0.9),
        gold_a: Rgba::rgb(0xf8, 0xd3, 0x7f),
        gold_b: Rgba::rgb(0xf3, 0xa9, 0x53),
    },
];

/// Number of themes in the catalog
pub const CATALOG_SIZE: usize = THEMES.len();

/// Index the UI starts on
pub const DEFAULT_THEME_INDEX: usize = 1;

/// Theme for `index`, wrapping around the catalog.
pub fn theme_at(index: usize) -> &'static Theme {
    &THEMES[index % CATALOG_SIZE]
}

/// The index after `current`, wrapping around the catalog.
pub fn next_theme(current: usize) -> usize {
    (current % CATALOG_SIZE + 1) % CATALOG_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_wraps_around() {
        assert_eq!(theme_at(0).name, "midnight");
        assert_eq!(theme_at(CATALOG_SIZE), theme_at(0));
        assert_eq!(theme_at(CATALOG_SIZE * 7 + 2), theme_at(2));
        let _ = theme_at(usize::MAX);
    }

    #[test]
    fn next_theme_cycles_back_to_start() {
        for start in [0usize, 1, 3, 17, usize::MAX] {
            let mut i = start;
            for _ in 0..CATALOG_SIZE {
                i = next_theme(i);
            }
            assert_eq!(i, start % CATALOG_SIZE);
        }
        assert_eq!(next_theme(CATALOG_SIZE - 1), 0);
    }

    #[test]
    fn theme_names_are_unique() {
        for (i, a) in THEMES.iter().enumerate() {
            for b in &THEMES[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn rgba_display() {
        assert_eq!(THEMES[0].background_a.to_string(), "#0b0f2b");
        assert_eq!(THEMES[0].star_color.to_string(), "rgba(255,255,255,0.9)");
    }
}
