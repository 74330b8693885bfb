use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Rectangle in original image pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Shrinks the rectangle so it lies inside a `width` x `height` image.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Self> {
        let x = self.x.min(width);
        let y = self.y.min(height);
        let clamped = Self {
            x,
            y,
            width: self.width.min(width - x),
            height: self.height.min(height - y),
        };
        (!clamped.is_empty()).then_some(clamped)
    }
}

/// Placement of an image scaled to fit an area, aspect ratio kept and centred.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Letterbox {
    /// Where the image ends up on screen.
    pub screen: Rect,
    /// Screen points per image pixel.
    pub scale: f32,
    image_size: Vec2,
}

impl Letterbox {
    pub fn fit(image_size: Vec2, area: Rect) -> Option<Self> {
        if image_size.x <= 0.0 || image_size.y <= 0.0 || area.width() <= 0.0 || area.height() <= 0.0
        {
            return None;
        }
        let scale = (area.width() / image_size.x).min(area.height() / image_size.y);
        let screen = Rect::from_center_size(area.center(), image_size * scale);
        Some(Self {
            screen,
            scale,
            image_size,
        })
    }

    pub fn image_size(&self) -> Vec2 {
        self.image_size
    }

    /// Screen to image coordinates, clamped to the image bounds.
    pub fn screen_to_image(&self, pos: Pos2) -> Pos2 {
        let p = (pos - self.screen.min) / self.scale;
        Pos2::new(
            p.x.clamp(0.0, self.image_size.x),
            p.y.clamp(0.0, self.image_size.y),
        )
    }

    pub fn image_to_screen(&self, pos: Pos2) -> Pos2 {
        self.screen.min + pos.to_vec2() * self.scale
    }

    /// Maps the two corners of a rubber band (in any drag direction) to
    /// image pixels. Parts outside the image are clipped.
    pub fn selection_to_pixels(&self, a: Pos2, b: Pos2) -> Option<PixelRect> {
        let band = Rect::from_two_pos(a, b);
        let min = self.screen_to_image(band.min);
        let max = self.screen_to_image(band.max);

        let x = min.x.floor() as u32;
        let y = min.y.floor() as u32;
        let rect = PixelRect {
            x,
            y,
            width: (max.x.floor() as u32).saturating_sub(x),
            height: (max.y.floor() as u32).saturating_sub(y),
        };
        rect.clamp_to(
            self.image_size.x.round() as u32,
            self.image_size.y.round() as u32,
        )
    }

    pub fn pixels_to_screen(&self, rect: PixelRect) -> Rect {
        Rect::from_min_max(
            self.image_to_screen(Pos2::new(rect.x as f32, rect.y as f32)),
            self.image_to_screen(Pos2::new(rect.right() as f32, rect.bottom() as f32)),
        )
    }
}
