//! Overlay drawing surfaces.
//!
//! Frame processors render visualizations through the [`Canvas`] trait so
//! they do not depend on a particular raster backend:
//! - [`RasterCanvas`] draws into an RGBA bitmap used as the snapshot overlay.
//! - [`RecordingCanvas`] captures draw calls, for vector export and tests.

use std::path::Path;
use std::sync::Arc;

use image::{Rgba, RgbaImage};
use imageproc::rect::Rect;
use landmarks_models::{BoundingBox, FrameSize};
use rusttype::{Font, Scale};
use tracing::{debug, trace};

use crate::error::{PipelineError, PipelineResult};

/// RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    fn to_pixel(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }
}

/// Whether a shape is filled or outlined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaintStyle {
    #[default]
    Fill,
    Stroke,
}

/// Drawing attributes for a single draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub color: Color,
    pub style: PaintStyle,
    /// Outline thickness in pixels, used by `PaintStyle::Stroke`
    pub stroke_width: f32,
    /// Glyph height in pixels, used by text
    pub text_size: f32,
}

impl Paint {
    pub fn fill(color: Color) -> Self {
        Self {
            color,
            style: PaintStyle::Fill,
            stroke_width: 1.0,
            text_size: 16.0,
        }
    }

    pub fn stroke(color: Color, stroke_width: f32) -> Self {
        Self {
            color,
            style: PaintStyle::Stroke,
            stroke_width,
            text_size: 16.0,
        }
    }

    pub fn text(color: Color, text_size: f32) -> Self {
        Self {
            color,
            style: PaintStyle::Fill,
            stroke_width: 1.0,
            text_size,
        }
    }

    fn thickness(&self) -> i32 {
        (self.stroke_width.round() as i32).max(1)
    }
}

/// A surface that visualizations draw onto.
///
/// Coordinates are frame pixels. Text is positioned by its baseline.
pub trait Canvas: Send {
    /// Pixel extent of the canvas.
    fn size(&self) -> FrameSize;

    fn draw_rect(&mut self, rect: &BoundingBox, paint: &Paint);

    fn draw_circle(&mut self, center: (f32, f32), radius: f32, paint: &Paint);

    fn draw_text(&mut self, text: &str, baseline_origin: (f32, f32), paint: &Paint);
}

/// Load a TrueType/OpenType font for overlay text.
pub fn load_font(path: impl AsRef<Path>) -> PipelineResult<Arc<Font<'static>>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    Font::try_from_vec(bytes)
        .map(Arc::new)
        .ok_or_else(|| PipelineError::Font(format!("{} is not a valid font", path.display())))
}

/// Canvas backed by a transparent RGBA bitmap.
pub struct RasterCanvas {
    image: RgbaImage,
    font: Option<Arc<Font<'static>>>,
    touched: bool,
}

impl RasterCanvas {
    /// Create a fully transparent canvas of the given size.
    pub fn new(size: FrameSize) -> Self {
        Self {
            image: RgbaImage::from_pixel(size.width, size.height, Color::TRANSPARENT.to_pixel()),
            font: None,
            touched: false,
        }
    }

    /// Enable text rendering. Without a font, text draw calls are skipped.
    pub fn with_font(mut self, font: Option<Arc<Font<'static>>>) -> Self {
        self.font = font;
        self
    }

    /// Whether any draw call changed the bitmap.
    pub fn is_touched(&self) -> bool {
        self.touched
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Whether a `width` x `height` area at (`x`, `y`) covers any canvas pixel.
    fn overlaps(&self, x: i32, y: i32, width: i32, height: i32) -> bool {
        width > 0
            && height > 0
            && x < self.image.width() as i32
            && y < self.image.height() as i32
            && x.saturating_add(width) > 0
            && y.saturating_add(height) > 0
    }

    fn circle_visible(&self, center: (i32, i32), radius: i32) -> bool {
        let side = radius.saturating_mul(2).saturating_add(1);
        self.overlaps(
            center.0.saturating_sub(radius),
            center.1.saturating_sub(radius),
            side,
            side,
        )
    }

    /// Whether an outline of the area runs entirely outside the canvas.
    fn encloses(&self, x: i32, y: i32, width: i32, height: i32) -> bool {
        x < 0
            && y < 0
            && x.saturating_add(width) > self.image.width() as i32
            && y.saturating_add(height) > self.image.height() as i32
    }
}

impl Canvas for RasterCanvas {
    fn size(&self) -> FrameSize {
        FrameSize {
            width: self.image.width(),
            height: self.image.height(),
        }
    }

    fn draw_rect(&mut self, rect: &BoundingBox, paint: &Paint) {
        if rect.is_empty() {
            return;
        }
        let color = paint.color.to_pixel();
        let x = rect.x.round() as i32;
        let y = rect.y.round() as i32;
        let width = rect.width.round() as i32;
        let height = rect.height.round() as i32;

        match paint.style {
            PaintStyle::Fill => {
                if self.overlaps(x, y, width, height) {
                    let area = Rect::at(x, y).of_size(width as u32, height as u32);
                    imageproc::drawing::draw_filled_rect_mut(&mut self.image, area, color);
                    self.touched = true;
                }
            }
            PaintStyle::Stroke => {
                // Centre the stroke on the rectangle edge.
                let thickness = paint.thickness();
                for i in 0..thickness {
                    let inset = i - thickness / 2;
                    let (ox, oy) = (x + inset, y + inset);
                    let w = width - 2 * inset;
                    let h = height - 2 * inset;
                    if !self.overlaps(ox, oy, w, h) || self.encloses(ox, oy, w, h) {
                        continue;
                    }
                    let outline = Rect::at(ox, oy).of_size(w as u32, h as u32);
                    imageproc::drawing::draw_hollow_rect_mut(&mut self.image, outline, color);
                    self.touched = true;
                }
            }
        }
    }

    fn draw_circle(&mut self, center: (f32, f32), radius: f32, paint: &Paint) {
        if !center.0.is_finite() || !center.1.is_finite() || radius <= 0.0 {
            return;
        }
        let color = paint.color.to_pixel();
        let c = (center.0.round() as i32, center.1.round() as i32);
        let r = radius.round() as i32;

        match paint.style {
            PaintStyle::Fill => {
                if self.circle_visible(c, r) {
                    imageproc::drawing::draw_filled_circle_mut(&mut self.image, c, r, color);
                    self.touched = true;
                }
            }
            PaintStyle::Stroke => {
                let thickness = paint.thickness();
                for i in 0..thickness {
                    let ring = r - thickness / 2 + i;
                    if ring > 0 && self.circle_visible(c, ring) {
                        imageproc::drawing::draw_hollow_circle_mut(&mut self.image, c, ring, color);
                        self.touched = true;
                    }
                }
            }
        }
    }

    fn draw_text(&mut self, text: &str, baseline_origin: (f32, f32), paint: &Paint) {
        if text.is_empty() {
            return;
        }
        let Some(font) = self.font.as_ref() else {
            static WARNED: std::sync::Once = std::sync::Once::new();
            WARNED.call_once(|| {
                debug!("No overlay font configured, overlay text is not drawn");
            });
            trace!(text, "Skipping overlay text");
            return;
        };
        let scale = Scale::uniform(paint.text_size);
        let ascent = font.v_metrics(scale).ascent;
        let x = baseline_origin.0.round() as i32;
        let y = (baseline_origin.1 - ascent).round() as i32;
        imageproc::drawing::draw_text_mut(
            &mut self.image,
            paint.color.to_pixel(),
            x,
            y,
            scale,
            font,
            text,
        );
        self.touched = true;
    }
}

/// A single recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Rect {
        rect: BoundingBox,
        paint: Paint,
    },
    Circle {
        center: (f32, f32),
        radius: f32,
        paint: Paint,
    },
    Text {
        text: String,
        origin: (f32, f32),
        paint: Paint,
    },
}

/// Canvas that records draw calls instead of rasterizing them.
#[derive(Debug, Clone)]
pub struct RecordingCanvas {
    size: FrameSize,
    ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    pub fn new(size: FrameSize) -> Self {
        Self {
            size,
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Text of every recorded text call, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> FrameSize {
        self.size
    }

    fn draw_rect(&mut self, rect: &BoundingBox, paint: &Paint) {
        self.ops.push(DrawOp::Rect {
            rect: *rect,
            paint: *paint,
        });
    }

    fn draw_circle(&mut self, center: (f32, f32), radius: f32, paint: &Paint) {
        self.ops.push(DrawOp::Circle {
            center,
            radius,
            paint: *paint,
        });
    }

    fn draw_text(&mut self, text: &str, baseline_origin: (f32, f32), paint: &Paint) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            origin: baseline_origin,
            paint: *paint,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size() -> FrameSize {
        FrameSize::new(40, 30).unwrap()
    }

    #[test]
    fn test_new_canvas_is_transparent() {
        let canvas = RasterCanvas::new(size());
        assert!(!canvas.is_touched());
        assert!(canvas.image().pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn test_filled_rect_paints_pixels() {
        let mut canvas = RasterCanvas::new(size());
        canvas.draw_rect(
            &BoundingBox::new(5.0, 5.0, 10.0, 10.0),
            &Paint::fill(Color::RED),
        );
        assert!(canvas.is_touched());
        assert_eq!(canvas.image().get_pixel(10, 10).0, [255, 0, 0, 255]);
        assert_eq!(canvas.image().get_pixel(20, 20).0[3], 0);
    }

    #[test]
    fn test_stroked_rect_leaves_interior() {
        let mut canvas = RasterCanvas::new(size());
        canvas.draw_rect(
            &BoundingBox::new(5.0, 5.0, 20.0, 20.0),
            &Paint::stroke(Color::GREEN, 2.0),
        );
        assert_eq!(canvas.image().get_pixel(5, 15).0, [0, 255, 0, 255]);
        assert_eq!(canvas.image().get_pixel(15, 15).0[3], 0);
    }

    #[test]
    fn test_rect_rounding_to_nothing_leaves_canvas_untouched() {
        let mut canvas = RasterCanvas::new(size());
        canvas.draw_rect(
            &BoundingBox::new(5.0, 5.0, 0.3, 10.0),
            &Paint::fill(Color::RED),
        );
        canvas.draw_rect(
            &BoundingBox::new(5.0, 5.0, 10.0, 0.4),
            &Paint::stroke(Color::RED, 1.0),
        );
        assert!(!canvas.is_touched());
        assert!(canvas.image().pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn test_offscreen_shapes_leave_canvas_untouched() {
        let mut canvas = RasterCanvas::new(size());
        canvas.draw_rect(
            &BoundingBox::new(100.0, 100.0, 10.0, 10.0),
            &Paint::fill(Color::RED),
        );
        canvas.draw_rect(
            &BoundingBox::new(-30.0, -30.0, 10.0, 10.0),
            &Paint::stroke(Color::RED, 2.0),
        );
        canvas.draw_circle((200.0, 200.0), 5.0, &Paint::fill(Color::RED));
        assert!(!canvas.is_touched());

        canvas.draw_rect(
            &BoundingBox::new(-5.0, -5.0, 10.0, 10.0),
            &Paint::fill(Color::RED),
        );
        assert!(canvas.is_touched());
        assert_eq!(canvas.image().get_pixel(0, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_circle_ignores_nan_center() {
        let mut canvas = RasterCanvas::new(size());
        canvas.draw_circle((f32::NAN, 4.0), 3.0, &Paint::fill(Color::RED));
        assert!(!canvas.is_touched());
        canvas.draw_circle((10.0, 10.0), 3.0, &Paint::fill(Color::RED));
        assert_eq!(canvas.image().get_pixel(10, 10).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_text_without_font_is_skipped() {
        let mut canvas = RasterCanvas::new(size());
        canvas.draw_text("ID: 1", (2.0, 20.0), &Paint::text(Color::WHITE, 12.0));
        assert!(!canvas.is_touched());
    }

    #[test]
    fn test_recording_canvas_keeps_order() {
        let mut canvas = RecordingCanvas::new(size());
        canvas.draw_rect(&BoundingBox::new(0.0, 0.0, 1.0, 1.0), &Paint::fill(Color::RED));
        canvas.draw_text("a", (0.0, 0.0), &Paint::text(Color::WHITE, 10.0));
        canvas.draw_circle((1.0, 1.0), 2.0, &Paint::fill(Color::BLUE));
        assert_eq!(canvas.ops().len(), 3);
        assert!(matches!(canvas.ops()[0], DrawOp::Rect { .. }));
        assert_eq!(canvas.texts(), vec!["a"]);
    }

    #[test]
    fn test_load_font_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"not a font").unwrap();
        assert!(matches!(load_font(&path), Err(PipelineError::Font(_))));
        assert!(matches!(
            load_font(dir.path().join("missing.ttf")),
            Err(PipelineError::Io(_))
        ));
    }
}
