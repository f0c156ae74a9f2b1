//! Alpha coverage buffers and the effects applied to them.
//!
//! Text strokes are realised by dilating glyph coverage, drop shadows by
//! blurring it. Both grow the buffer, so samples are kept inside a [`Clip`]
//! window before any effect runs.

use tiny_skia::Mask;

/// Physical-pixel window that coverage samples are kept within
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clip {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl Clip {
    /// A `width`×`height` surface grown by `margin` pixels on every side.
    pub fn surface(width: u32, height: u32, margin: i32) -> Self {
        let margin = margin.max(0);
        Self {
            x0: -margin,
            y0: -margin,
            x1: i32::try_from(width).unwrap_or(i32::MAX).saturating_add(margin),
            y1: i32::try_from(height).unwrap_or(i32::MAX).saturating_add(margin),
        }
    }

    /// No bound at all.
    pub fn unbounded() -> Self {
        Self {
            x0: i32::MIN,
            y0: i32::MIN,
            x1: i32::MAX,
            y1: i32::MAX,
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    /// Whether the half-open span `[x, x + width)` reaches into the window horizontally.
    pub fn overlaps_columns(&self, x: i32, width: i32) -> bool {
        x.saturating_add(width) > self.x0 && x < self.x1
    }
}

/// Alpha coverage over a bounded pixel rectangle, values in `[0, 1]`
#[derive(Debug, Clone, PartialEq)]
pub struct Coverage {
    x: i32,
    y: i32,
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl Coverage {
    pub fn empty() -> Self {
        Self {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            data: Vec::new(),
        }
    }

    /// Build from `(x, y, alpha)` samples; overlapping samples keep the maximum.
    pub fn from_pixels(pixels: &[(i32, i32, u8)]) -> Self {
        let Some(&(fx, fy, _)) = pixels.first() else {
            return Self::empty();
        };
        let (mut x0, mut y0, mut x1, mut y1) = (fx, fy, fx, fy);
        for &(x, y, _) in pixels {
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
        let width = (x1 - x0 + 1) as usize;
        let height = (y1 - y0 + 1) as usize;
        let mut data = vec![0.0f32; width * height];
        for &(x, y, a) in pixels {
            let idx = (y - y0) as usize * width + (x - x0) as usize;
            data[idx] = data[idx].max(f32::from(a) / 255.0);
        }
        Self {
            x: x0,
            y: y0,
            width,
            height,
            data,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|&a| a <= 0.0)
    }

    /// `(x, y, width, height)` in physical pixels
    pub fn bounds(&self) -> (i32, i32, usize, usize) {
        (self.x, self.y, self.width, self.height)
    }

    #[cfg(test)]
    pub(crate) fn at(&self, x: i32, y: i32) -> f32 {
        if x < self.x || y < self.y {
            return 0.0;
        }
        let (cx, cy) = ((x - self.x) as usize, (y - self.y) as usize);
        if cx >= self.width || cy >= self.height {
            return 0.0;
        }
        self.data[cy * self.width + cx]
    }

    /// Same coverage moved down by `dy` pixels.
    pub fn offset(&self, dy: i32) -> Self {
        Self {
            y: self.y + dy,
            ..self.clone()
        }
    }

    fn padded(&self, pad: usize) -> Self {
        let width = self.width + pad * 2;
        let height = self.height + pad * 2;
        let mut data = vec![0.0f32; width * height];
        for row in 0..self.height {
            let src = &self.data[row * self.width..(row + 1) * self.width];
            let start = (row + pad) * width + pad;
            data[start..start + self.width].copy_from_slice(src);
        }
        Self {
            x: self.x - pad as i32,
            y: self.y - pad as i32,
            width,
            height,
            data,
        }
    }

    /// Grow the shape outward by `radius` pixels with an anti-aliased edge.
    pub fn dilated(&self, radius: f32) -> Self {
        if radius <= 0.0 || self.width == 0 {
            return self.clone();
        }
        let reach = radius.ceil() as i32 + 1;
        let src = self.padded(reach as usize);
        let mut kernel = Vec::new();
        for oy in -reach..=reach {
            for ox in -reach..=reach {
                let dist = ((ox * ox + oy * oy) as f32).sqrt();
                let weight = (radius + 0.5 - dist).clamp(0.0, 1.0);
                if weight > 0.0 {
                    kernel.push((ox, oy, weight));
                }
            }
        }
        let (w, h) = (src.width as i32, src.height as i32);
        let mut data = vec![0.0f32; src.data.len()];
        for y in 0..h {
            for x in 0..w {
                let mut best = 0.0f32;
                for &(ox, oy, weight) in &kernel {
                    let (sx, sy) = (x + ox, y + oy);
                    if sx < 0 || sy < 0 || sx >= w || sy >= h {
                        continue;
                    }
                    let v = src.data[(sy * w + sx) as usize] * weight;
                    if v > best {
                        best = v;
                        if best >= 1.0 {
                            break;
                        }
                    }
                }
                data[(y * w + x) as usize] = best;
            }
        }
        Self { data, ..src }
    }

    /// Approximate Gaussian blur (three box passes) with standard deviation `sigma`.
    pub fn blurred(&self, sigma: f32) -> Self {
        if sigma <= 0.0 || self.width == 0 {
            return self.clone();
        }
        let mut out = self.padded((sigma * 3.0).ceil() as usize);
        let mut scratch = vec![0.0f32; out.data.len()];
        for size in box_sizes(sigma) {
            let r = (size - 1) / 2;
            box_blur_rows(&out.data, &mut scratch, out.width, out.height, r);
            box_blur_cols(&scratch, &mut out.data, out.width, out.height, r);
        }
        out
    }

    /// Place the coverage into a full-surface mask.
    pub fn to_mask(&self, width: u32, height: u32) -> Option<Mask> {
        let mut mask = Mask::new(width, height)?;
        let stride = width as usize;
        let data = mask.data_mut();
        for row in 0..self.height {
            let y = self.y + row as i32;
            if y < 0 || y >= height as i32 {
                continue;
            }
            for col in 0..self.width {
                let x = self.x + col as i32;
                if x < 0 || x >= width as i32 {
                    continue;
                }
                let a = self.data[row * self.width + col];
                data[y as usize * stride + x as usize] = (a.clamp(0.0, 1.0) * 255.0).round() as u8;
            }
        }
        Some(mask)
    }
}

/// Box widths whose successive application approximates a Gaussian.
fn box_sizes(sigma: f32) -> [usize; 3] {
    let n = 3.0f32;
    let ideal = (12.0 * sigma * sigma / n + 1.0).sqrt();
    let mut lower = ideal.floor() as i32;
    if lower % 2 == 0 {
        lower -= 1;
    }
    let lower = lower.max(1);
    let upper = lower + 2;
    let lf = lower as f32;
    let m = ((12.0 * sigma * sigma - n * lf * lf - 4.0 * n * lf - 3.0 * n) / (-4.0 * lf - 4.0))
        .round() as i32;
    let mut sizes = [0usize; 3];
    for (i, size) in sizes.iter_mut().enumerate() {
        *size = (if (i as i32) < m { lower } else { upper }) as usize;
    }
    sizes
}

fn box_blur_rows(src: &[f32], dst: &mut [f32], width: usize, height: usize, r: usize) {
    let norm = 1.0 / (2 * r + 1) as f32;
    let mut prefix = vec![0.0f32; width + 1];
    for row in 0..height {
        let line = &src[row * width..(row + 1) * width];
        for (i, v) in line.iter().enumerate() {
            prefix[i + 1] = prefix[i] + v;
        }
        for x in 0..width {
            let lo = x.saturating_sub(r);
            let hi = (x + r + 1).min(width);
            dst[row * width + x] = (prefix[hi] - prefix[lo]) * norm;
        }
    }
}

fn box_blur_cols(src: &[f32], dst: &mut [f32], width: usize, height: usize, r: usize) {
    let norm = 1.0 / (2 * r + 1) as f32;
    let mut prefix = vec![0.0f32; height + 1];
    for col in 0..width {
        for y in 0..height {
            prefix[y + 1] = prefix[y] + src[y * width + col];
        }
        for y in 0..height {
            let lo = y.saturating_sub(r);
            let hi = (y + r + 1).min(height);
            dst[y * width + col] = (prefix[hi] - prefix[lo]) * norm;
        }
    }
}
