//! Cropper engine seam.
//!
//! The modal talks to the engine through [`CropperEngine`] only: crop-box
//! geometry, drag handling, and raster extraction. [`BoxCropper`] is the
//! bundled implementation; tests and hosts can substitute their own.
//!
//! The crop box lives in normalized image coordinates (0.0..=1.0 on both
//! axes), so it survives window resizes unchanged; screen mapping happens at
//! the call sites that know the display rectangle.

use std::sync::Arc;

use eframe::egui::{self, Pos2, Rect, Vec2};
use image::imageops::FilterType;
use image::{DynamicImage, Rgba, RgbaImage, imageops};

/// Which part of the crop box a drag grabbed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Top,
    Bottom,
    Left,
    Right,
    /// Inside the box: moves it without resizing.
    Move,
}

/// Parameters for a raster extraction.
#[derive(Clone, Copy, Debug)]
pub struct ExtractOptions {
    pub width: u32,
    pub height: u32,
    /// High-quality resampling when set, nearest-neighbor otherwise.
    pub smooth: bool,
    /// RGB backing for transparent source pixels.
    pub fill: [u8; 3],
}

/// The modal's view of a cropping engine.
pub trait CropperEngine {
    /// Current crop box in normalized image coordinates.
    fn crop_rect(&self) -> Rect;

    /// Maps a pointer position to the handle it would grab, if any.
    fn hit_test(&self, pos: Pos2, screen_rect: Rect) -> Option<Handle>;

    fn begin_drag(&mut self, handle: Option<Handle>);

    /// Applies a pointer delta (already normalized against the display size)
    /// to the active handle. `display_size` is the on-screen pixel size of
    /// the preview, needed to keep the aspect lock correct in screen space.
    fn drag_by(&mut self, delta: Vec2, display_size: Vec2);

    fn end_drag(&mut self);

    fn dragging(&self) -> bool;

    /// Extracts the crop as a raster of exactly the requested size, or `None`
    /// when the box is degenerate.
    fn extract(&self, opts: &ExtractOptions) -> Option<RgbaImage>;
}

const HANDLE_TOLERANCE: f32 = 10.0;

/// Default engine: an aspect-locked, movable, resizable crop box.
pub struct BoxCropper {
    image: Arc<DynamicImage>,
    crop: Rect,
    /// Requested width-to-height ratio in pixels.
    aspect_ratio: f32,
    /// The same ratio expressed in normalized coordinates.
    norm_aspect: f32,
    active: Option<Handle>,
}

impl BoxCropper {
    /// Builds an engine with the crop box centered and sized to
    /// `auto_crop_area` of the image, constrained to `aspect_ratio`.
    pub fn new(image: Arc<DynamicImage>, aspect_ratio: f32, auto_crop_area: f32) -> Self {
        let norm_aspect = aspect_ratio * (image.height() as f32 / image.width() as f32);
        let crop = initial_box(norm_aspect, auto_crop_area.clamp(0.05, 1.0));
        Self {
            image,
            crop,
            aspect_ratio,
            norm_aspect,
            active: None,
        }
    }

    fn clamp_to_bounds(&mut self) {
        let crop = &mut self.crop;
        if crop.min.x < 0.0 {
            crop.min.x = 0.0;
        }
        if crop.min.y < 0.0 {
            crop.min.y = 0.0;
        }
        if crop.max.x > 1.0 {
            crop.max.x = 1.0;
        }
        if crop.max.y > 1.0 {
            crop.max.y = 1.0;
        }
        if crop.min.x > crop.max.x {
            std::mem::swap(&mut crop.min.x, &mut crop.max.x);
        }
        if crop.min.y > crop.max.y {
            std::mem::swap(&mut crop.min.y, &mut crop.max.y);
        }
    }

    fn pan(&mut self, delta: Vec2) {
        let crop = self.crop;
        let mut d = delta;
        if crop.min.x + d.x < 0.0 {
            d.x = -crop.min.x;
        }
        if crop.max.x + d.x > 1.0 {
            d.x = 1.0 - crop.max.x;
        }
        if crop.min.y + d.y < 0.0 {
            d.y = -crop.min.y;
        }
        if crop.max.y + d.y > 1.0 {
            d.y = 1.0 - crop.max.y;
        }
        self.crop = crop.translate(d);
    }

    fn resize_corner(&mut self, handle: Handle, delta: Vec2, display_size: Vec2) {
        let crop = self.crop;
        // Opposite corner stays fixed; the grabbed corner follows the pointer.
        let (anchor, mut corner) = match handle {
            Handle::TopLeft => (crop.max, crop.min),
            Handle::TopRight => (
                egui::pos2(crop.min.x, crop.max.y),
                egui::pos2(crop.max.x, crop.min.y),
            ),
            Handle::BottomLeft => (
                egui::pos2(crop.max.x, crop.min.y),
                egui::pos2(crop.min.x, crop.max.y),
            ),
            _ => (crop.min, crop.max),
        };
        corner += delta;

        // Project the dragged size onto the aspect vector in screen space so
        // the lock feels uniform regardless of how the preview is scaled.
        let raw = egui::vec2(
            (corner.x - anchor.x).abs() * display_size.x,
            (corner.y - anchor.y).abs() * display_size.y,
        );
        let u = egui::vec2(self.aspect_ratio, 1.0);
        let lambda = raw.dot(u) / u.length_sq();
        let constrained = u * lambda;
        let dim = egui::vec2(constrained.x / display_size.x, constrained.y / display_size.y);

        self.crop = match handle {
            Handle::TopLeft => Rect::from_min_max(anchor - dim, anchor),
            Handle::TopRight => Rect::from_min_max(
                egui::pos2(anchor.x, anchor.y - dim.y),
                egui::pos2(anchor.x + dim.x, anchor.y),
            ),
            Handle::BottomLeft => Rect::from_min_max(
                egui::pos2(anchor.x - dim.x, anchor.y),
                egui::pos2(anchor.x, anchor.y + dim.y),
            ),
            _ => Rect::from_min_max(anchor, anchor + dim),
        };
    }

    fn resize_side(&mut self, handle: Handle, delta: Vec2) {
        let crop = &mut self.crop;
        match handle {
            Handle::Left | Handle::Right => {
                // Width drives, height follows around the same center.
                let mut new_w = crop.width();
                if handle == Handle::Left {
                    crop.min.x += delta.x;
                    new_w -= delta.x;
                } else {
                    crop.max.x += delta.x;
                    new_w += delta.x;
                }
                let new_h = new_w / self.norm_aspect;
                let center_y = crop.center().y;
                crop.min.y = center_y - new_h * 0.5;
                crop.max.y = center_y + new_h * 0.5;
            }
            _ => {
                let mut new_h = crop.height();
                if handle == Handle::Top {
                    crop.min.y += delta.y;
                    new_h -= delta.y;
                } else {
                    crop.max.y += delta.y;
                    new_h += delta.y;
                }
                let new_w = new_h * self.norm_aspect;
                let center_x = crop.center().x;
                crop.min.x = center_x - new_w * 0.5;
                crop.max.x = center_x + new_w * 0.5;
            }
        }
    }
}

impl CropperEngine for BoxCropper {
    fn crop_rect(&self) -> Rect {
        self.crop
    }

    fn hit_test(&self, pos: Pos2, screen_rect: Rect) -> Option<Handle> {
        let min = screen_rect.min;
        let max = screen_rect.max;

        if pos.distance(min) < HANDLE_TOLERANCE {
            return Some(Handle::TopLeft);
        }
        if pos.distance(egui::pos2(max.x, min.y)) < HANDLE_TOLERANCE {
            return Some(Handle::TopRight);
        }
        if pos.distance(egui::pos2(min.x, max.y)) < HANDLE_TOLERANCE {
            return Some(Handle::BottomLeft);
        }
        if pos.distance(max) < HANDLE_TOLERANCE {
            return Some(Handle::BottomRight);
        }

        if (pos.x - min.x).abs() < HANDLE_TOLERANCE && pos.y > min.y && pos.y < max.y {
            return Some(Handle::Left);
        }
        if (pos.x - max.x).abs() < HANDLE_TOLERANCE && pos.y > min.y && pos.y < max.y {
            return Some(Handle::Right);
        }
        if (pos.y - min.y).abs() < HANDLE_TOLERANCE && pos.x > min.x && pos.x < max.x {
            return Some(Handle::Top);
        }
        if (pos.y - max.y).abs() < HANDLE_TOLERANCE && pos.x > min.x && pos.x < max.x {
            return Some(Handle::Bottom);
        }

        if screen_rect.contains(pos) {
            return Some(Handle::Move);
        }
        None
    }

    fn begin_drag(&mut self, handle: Option<Handle>) {
        self.active = handle;
    }

    fn drag_by(&mut self, delta: Vec2, display_size: Vec2) {
        let Some(handle) = self.active else { return };
        match handle {
            Handle::Move => self.pan(delta),
            Handle::TopLeft | Handle::TopRight | Handle::BottomLeft | Handle::BottomRight => {
                self.resize_corner(handle, delta, display_size);
            }
            Handle::Top | Handle::Bottom | Handle::Left | Handle::Right => {
                self.resize_side(handle, delta);
            }
        }
        self.clamp_to_bounds();
    }

    fn end_drag(&mut self) {
        self.active = None;
    }

    fn dragging(&self) -> bool {
        self.active.is_some()
    }

    fn extract(&self, opts: &ExtractOptions) -> Option<RgbaImage> {
        if opts.width == 0 || opts.height == 0 {
            return None;
        }

        let img_w = self.image.width() as f32;
        let img_h = self.image.height() as f32;

        // A box that maps to less than a pixel of source has nothing to crop.
        if self.crop.width() * img_w < 1.0 || self.crop.height() * img_h < 1.0 {
            return None;
        }

        let x = (self.crop.min.x * img_w).max(0.0) as u32;
        let y = (self.crop.min.y * img_h).max(0.0) as u32;
        let width = (self.crop.width() * img_w).max(1.0) as u32;
        let height = (self.crop.height() * img_h).max(1.0) as u32;

        let x = x.min(self.image.width() - 1);
        let y = y.min(self.image.height() - 1);
        let width = width.min(self.image.width() - x);
        let height = height.min(self.image.height() - y);

        let cropped = self.image.crop_imm(x, y, width, height).to_rgba8();
        let filter = if opts.smooth {
            FilterType::CatmullRom
        } else {
            FilterType::Nearest
        };
        let scaled = imageops::resize(&cropped, opts.width, opts.height, filter);

        // Backing fill shows through wherever the source was transparent.
        let [r, g, b] = opts.fill;
        let mut canvas = RgbaImage::from_pixel(opts.width, opts.height, Rgba([r, g, b, 255]));
        imageops::overlay(&mut canvas, &scaled, 0, 0);

        Some(canvas)
    }
}

fn initial_box(norm_aspect: f32, area: f32) -> Rect {
    let (mut w, mut h) = if norm_aspect >= 1.0 {
        (area, area / norm_aspect)
    } else {
        (area * norm_aspect, area)
    };
    if w > 1.0 {
        w = 1.0;
        h = w / norm_aspect;
    }
    if h > 1.0 {
        h = 1.0;
        w = h * norm_aspect;
    }
    Rect::from_center_size(egui::pos2(0.5, 0.5), egui::vec2(w, h))
}
