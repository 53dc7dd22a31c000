use anyhow::{Context, Result};
use drift_common::{HexColor, Vec2};
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut, Blend};
use imageproc::rect::Rect;
use std::path::Path;

/// Stroke applied to one particle segment.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Stroke {
    pub color: HexColor,
    /// Opacity out of 255.
    pub alpha: f32,
    /// Line thickness in pixels.
    pub weight: f32,
}

/// Persistent RGB render surface. Frames accumulate on top of each other;
/// only `fill` wipes the history.
pub struct Canvas {
    surface: Blend<RgbaImage>,
}

impl Canvas {
    /// Acquires a `width` x `height` surface painted with `background`.
    pub fn new(width: u32, height: u32, background: HexColor) -> Result<Self> {
        if width == 0 || height == 0 {
            anyhow::bail!("Cannot create a {}x{} render surface.", width, height);
        }
        let image = RgbaImage::from_pixel(width, height, opaque(background));
        Ok(Canvas { surface: Blend(image) })
    }

    pub fn width(&self) -> u32 {
        self.surface.0.width()
    }

    pub fn height(&self) -> u32 {
        self.surface.0.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgb<u8> {
        let Rgba([r, g, b, _]) = *self.surface.0.get_pixel(x, y);
        Rgb([r, g, b])
    }

    /// Repaints the whole surface with a solid color.
    pub fn fill(&mut self, color: HexColor) {
        let solid = opaque(color);
        self.surface.0.pixels_mut().for_each(|p| *p = solid);
    }

    /// Blends a translucent full-canvas rectangle over the previous frames.
    pub fn fade(&mut self, color: HexColor, alpha: f32) {
        let alpha = alpha.round().clamp(0.0, 255.0) as u8;
        if alpha == 0 {
            return;
        }
        let rect = Rect::at(0, 0).of_size(self.width(), self.height());
        draw_filled_rect_mut(&mut self.surface, rect, with_alpha(color, alpha));
    }

    /// Draws a segment from `from` to `to`, alpha-blended.
    ///
    /// Weights above one pixel add a parallel pass whose opacity carries the
    /// extra thickness; weights below one thin the main pass.
    pub fn stroke_segment(&mut self, from: Vec2, to: Vec2, stroke: &Stroke) {
        let weight = stroke.weight.max(0.0);
        let core_alpha = stroke.alpha * weight.min(1.0);
        self.draw_pass(from, to, stroke.color, core_alpha);

        if weight > 1.0 {
            let offset = (to - from).perp().normalize_or_zero();
            if offset != Vec2::ZERO {
                self.draw_pass(from + offset, to + offset, stroke.color, stroke.alpha * (weight - 1.0));
            }
        }
    }

    fn draw_pass(&mut self, from: Vec2, to: Vec2, color: HexColor, alpha: f32) {
        let alpha = alpha.round().clamp(0.0, 255.0) as u8;
        if alpha == 0 {
            return;
        }
        draw_line_segment_mut(&mut self.surface, (from.x, from.y), (to.x, to.y), with_alpha(color, alpha));
    }

    /// Copy of the current pixels without the alpha channel.
    pub fn to_rgb_image(&self) -> RgbImage {
        let (width, height) = (self.width(), self.height());
        RgbImage::from_fn(width, height, |x, y| self.pixel(x, y))
    }

    /// Writes the current pixels as an RGB PNG.
    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.to_rgb_image()
            .save_with_format(path, ImageFormat::Png)
            .with_context(|| format!("Failed to write PNG to {}", path.display()))
    }
}

fn opaque(color: HexColor) -> Rgba<u8> {
    with_alpha(color, 255)
}

fn with_alpha(color: HexColor, alpha: u8) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, alpha])
}
