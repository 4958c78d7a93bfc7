//! Software rasterizer backing headless output and the windowed host

use crate::canvas::{Canvas, LinearGradient};
use drift_core::{Color, Rect, Vec2};
use image::{Rgba, RgbaImage};

/// RGBA8 pixel surface with source-over compositing.
///
/// Starts fully transparent, like a freshly created browser canvas.
#[derive(Clone, Debug)]
pub struct PixelCanvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Raw RGBA8 bytes, row-major
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let i = self.index(x, y);
            Rgba([
                self.pixels[i],
                self.pixels[i + 1],
                self.pixels[i + 2],
                self.pixels[i + 3],
            ])
        })
    }

    /// Flatten the surface over an opaque `backdrop` into 0RGB words.
    ///
    /// `opacity` scales the whole layer, as a CSS opacity on the canvas
    /// element would. `out` must hold `width * height` words; extra words
    /// are left alone.
    pub fn present_into(&self, out: &mut [u32], opacity: f32, backdrop: Color) {
        let opacity = opacity.clamp(0.0, 1.0);
        let back = [backdrop.r, backdrop.g, backdrop.b];
        for (word, px) in out.iter_mut().zip(self.pixels.chunks_exact(4)) {
            let a = px[3] as f32 / 255.0 * opacity;
            let mut rgb = [0u32; 3];
            for c in 0..3 {
                let src = px[c] as f32 / 255.0;
                let v = src * a + back[c] * (1.0 - a);
                rgb[c] = (v.clamp(0.0, 1.0) * 255.0).round() as u32;
            }
            *word = (rgb[0] << 16) | (rgb[1] << 8) | rgb[2];
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Source-over blend of a straight-alpha color into one pixel
    fn blend(&mut self, x: u32, y: u32, color: Color) {
        if color.a <= 0.0 {
            return;
        }
        let i = self.index(x, y);
        let sa = color.a.clamp(0.0, 1.0);
        let da = self.pixels[i + 3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            return;
        }
        let src = [color.r, color.g, color.b];
        for (c, s) in src.iter().enumerate() {
            let d = self.pixels[i + c] as f32 / 255.0;
            let v = (s * sa + d * da * (1.0 - sa)) / out_a;
            self.pixels[i + c] = unit_to_u8(v);
        }
        self.pixels[i + 3] = unit_to_u8(out_a);
    }

    /// Pixel index range covering [lo, hi) along one axis
    fn span(lo: f32, hi: f32, limit: u32) -> (u32, u32) {
        let start = lo.floor().max(0.0) as u32;
        let end = (hi.ceil().max(0.0) as u32).min(limit);
        (start.min(limit), end)
    }
}

fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Interpolate in premultiplied space so fading to transparent keeps the hue
fn lerp_premultiplied(a: Color, b: Color, t: f32) -> Color {
    let alpha = a.a + (b.a - a.a) * t;
    if alpha <= 0.0 {
        return Color::TRANSPARENT;
    }
    let ch = |ca: f32, cb: f32| (ca * a.a + (cb * b.a - ca * a.a) * t) / alpha;
    Color::new(ch(a.r, b.r), ch(a.g, b.g), ch(a.b, b.b), alpha)
}

fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

impl Canvas for PixelCanvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![0; width as usize * height as usize * 4];
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let (x0, x1) = Self::span(rect.x, rect.x + rect.width, self.width);
        let (y0, y1) = Self::span(rect.y, rect.y + rect.height, self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend(x, y, color);
            }
        }
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, gradient: &LinearGradient) {
        let half = width.max(0.0) / 2.0;
        // Coverage ramps over one pixel outside the nominal stroke
        let reach = half + 0.5;
        let min = from.min(to) - Vec2::splat(reach);
        let max = from.max(to) + Vec2::splat(reach);
        let (x0, x1) = Self::span(min.x, max.x, self.width);
        let (y0, y1) = Self::span(min.y, max.y, self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let coverage = (reach - distance_to_segment(center, from, to)).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }
                let color = gradient.color_at(center);
                self.blend(x, y, color.with_alpha(color.a * coverage));
            }
        }
    }

    fn fill_radial(&mut self, center: Vec2, radius: f32, inner: Color, outer: Color) {
        if radius <= 0.0 {
            return;
        }
        let (x0, x1) = Self::span(center.x - radius, center.x + radius, self.width);
        let (y0, y1) = Self::span(center.y - radius, center.y + radius, self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let t = p.distance(center) / radius;
                if t >= 1.0 {
                    continue;
                }
                self.blend(x, y, lerp_premultiplied(inner, outer, t));
            }
        }
    }
}
