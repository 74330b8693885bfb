use eframe::egui;
use image::DynamicImage;
use log::debug;

use crate::geometry::{Letterbox, PixelRect};

// ── Interaction State ───────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug)]
enum DragState {
    None,
    Drawing { start: egui::Pos2 },
}

// ── Canvas ──────────────────────────────────────────────────────────────────

/// A rectangle drawn on top of the image, in image pixels.
pub struct Overlay {
    pub rect: PixelRect,
    pub color: egui::Color32,
    pub caption: Option<String>,
}

/// Letterboxed image canvas with a rubber band selection.
pub struct Preview {
    raw_image: Option<DynamicImage>,
    texture: Option<egui::TextureHandle>,
    image_size: [u32; 2],
    drag: DragState,
    min_drag_distance: f32,
}

const BAND_COLOR: egui::Color32 = egui::Color32::from_rgb(0, 120, 255);

impl Preview {
    pub fn new(min_drag_distance: f32) -> Self {
        Self {
            raw_image: None,
            texture: None,
            image_size: [0, 0],
            drag: DragState::None,
            min_drag_distance,
        }
    }

    pub fn set_image(&mut self, image: DynamicImage) {
        self.image_size = [image.width(), image.height()];
        self.raw_image = Some(image);
        self.texture = None;
        self.drag = DragState::None;
    }

    pub fn clear(&mut self) {
        self.raw_image = None;
        self.texture = None;
        self.image_size = [0, 0];
        self.drag = DragState::None;
    }

    pub fn has_image(&self) -> bool {
        self.raw_image.is_some()
    }

    /// Dimensions of the original image.
    pub fn image_size(&self) -> Option<[u32; 2]> {
        self.raw_image.as_ref().map(|_| self.image_size)
    }

    fn ensure_texture(&mut self, ctx: &egui::Context) {
        if self.texture.is_some() {
            return;
        }
        let Some(ref img) = self.raw_image else {
            return;
        };
        let max_side = ctx.input(|i| i.max_texture_side) as u32;
        // Only the displayed copy shrinks, selections map to the original size.
        let rgba = if img.width() > max_side || img.height() > max_side {
            debug!("Downscaling {}x{} for display", img.width(), img.height());
            img.thumbnail(max_side, max_side).to_rgba8()
        } else {
            img.to_rgba8()
        };
        let size = [rgba.width() as usize, rgba.height() as usize];
        let pixels = rgba.as_flat_samples();
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
        self.texture = Some(ctx.load_texture("image", color_image, egui::TextureOptions::LINEAR));
    }

    /// Paints the canvas and returns a finished selection in image pixels.
    pub fn show(&mut self, ui: &mut egui::Ui, overlay: Option<&Overlay>) -> Option<PixelRect> {
        self.ensure_texture(ui.ctx());

        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let canvas_rect = response.rect;
        painter.rect_filled(canvas_rect, 0.0, egui::Color32::from_gray(40));

        let Some(tex) = self.texture.as_ref() else {
            painter.text(
                canvas_rect.center(),
                egui::Align2::CENTER_CENTER,
                "No image",
                egui::FontId::proportional(18.0),
                egui::Color32::GRAY,
            );
            self.drag = DragState::None;
            return None;
        };
        let image_size = egui::vec2(self.image_size[0] as f32, self.image_size[1] as f32);
        let Some(letterbox) = Letterbox::fit(image_size, canvas_rect) else {
            self.drag = DragState::None;
            return None;
        };

        painter.image(
            tex.id(),
            letterbox.screen,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        if let Some(overlay) = overlay {
            let rect = letterbox.pixels_to_screen(overlay.rect);
            painter.rect_stroke(
                rect,
                0.0,
                egui::Stroke::new(2.0, overlay.color),
                egui::StrokeKind::Middle,
            );
            if let Some(caption) = &overlay.caption {
                painter.text(
                    rect.left_top() - egui::vec2(0.0, 2.0),
                    egui::Align2::LEFT_BOTTOM,
                    caption,
                    egui::FontId::proportional(14.0),
                    overlay.color,
                );
            }
        }

        // egui reports the drag once the pointer has left its click radius,
        // the band starts where the button went down.
        if response.drag_started_by(egui::PointerButton::Primary) {
            if let Some(origin) = ui.ctx().input(|i| i.pointer.press_origin()) {
                if letterbox.screen.contains(origin) {
                    self.drag = DragState::Drawing { start: origin };
                }
            }
        }

        if let DragState::Drawing { start } = self.drag {
            if let Some(current) = response.interact_pointer_pos() {
                let band = egui::Rect::from_two_pos(start, current).intersect(letterbox.screen);
                painter.rect_filled(band, 0.0, BAND_COLOR.gamma_multiply(0.15));
                painter.rect_stroke(
                    band,
                    0.0,
                    egui::Stroke::new(1.5, BAND_COLOR),
                    egui::StrokeKind::Middle,
                );
            }
        }

        if response.drag_stopped_by(egui::PointerButton::Primary) {
            let DragState::Drawing { start } = self.drag else {
                return None;
            };
            self.drag = DragState::None;
            let end = response
                .interact_pointer_pos()
                .or(ui.ctx().input(|i| i.pointer.latest_pos()))?;
            if (end - start).length() <= self.min_drag_distance {
                debug!("Ignoring click-sized drag");
                return None;
            }
            return letterbox.selection_to_pixels(start, end);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2, Event, Pos2, RawInput, Rect};

    /// Feeds one batch of events per frame to a 200x200 canvas and collects
    /// every finished selection.
    fn run_frames(
        ctx: &egui::Context,
        preview: &mut Preview,
        frames: Vec<Vec<Event>>,
    ) -> Vec<PixelRect> {
        let mut selections = Vec::new();
        for events in std::iter::once(Vec::new()).chain(frames) {
            let input = RawInput {
                screen_rect: Some(Rect::from_min_size(Pos2::ZERO, vec2(200.0, 200.0))),
                events,
                ..Default::default()
            };
            let _ = ctx.run(input, |ctx| {
                egui::CentralPanel::default()
                    .frame(egui::Frame::default())
                    .show(ctx, |ui| selections.extend(preview.show(ui, None)));
            });
        }
        selections
    }

    fn drive(preview: &mut Preview, frames: Vec<Vec<Event>>) -> Vec<PixelRect> {
        run_frames(&egui::Context::default(), preview, frames)
    }

    fn button(pos: Pos2, pressed: bool) -> Event {
        Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: egui::Modifiers::NONE,
        }
    }

    /// Press at `from`, move in 5 point steps along the diagonal, release.
    fn diagonal_drag(from: f32, to: f32) -> Vec<Vec<Event>> {
        let mut frames = vec![
            vec![Event::PointerMoved(pos2(from, from))],
            vec![button(pos2(from, from), true)],
        ];
        let mut at = from;
        while at < to {
            at = (at + 5.0).min(to);
            frames.push(vec![Event::PointerMoved(pos2(at, at))]);
        }
        frames.push(vec![button(pos2(to, to), false)]);
        frames.push(Vec::new());
        frames
    }

    fn square_preview(min_drag_distance: f32) -> Preview {
        let mut preview = Preview::new(min_drag_distance);
        preview.set_image(DynamicImage::new_rgb8(200, 200));
        preview
    }

    #[test]
    fn selection_starts_where_the_button_went_down() {
        let mut preview = square_preview(5.0);
        let selections = drive(&mut preview, diagonal_drag(20.0, 100.0));
        assert_eq!(selections, [PixelRect::new(20, 20, 80, 80)]);
    }

    #[test]
    fn drag_within_min_distance_is_ignored() {
        let mut preview = square_preview(20.0);
        assert!(drive(&mut preview, diagonal_drag(20.0, 30.0)).is_empty());

        let mut preview = square_preview(5.0);
        assert_eq!(
            drive(&mut preview, diagonal_drag(20.0, 30.0)),
            [PixelRect::new(20, 20, 10, 10)]
        );
    }

    #[test]
    fn click_selects_nothing() {
        let mut preview = square_preview(5.0);
        let frames = vec![
            vec![Event::PointerMoved(pos2(50.0, 50.0))],
            vec![button(pos2(50.0, 50.0), true)],
            vec![button(pos2(50.0, 50.0), false)],
            Vec::new(),
        ];
        assert!(drive(&mut preview, frames).is_empty());
    }

    #[test]
    fn pending_drag_is_dropped_with_the_image() {
        let ctx = egui::Context::default();
        let mut preview = square_preview(5.0);
        let mut frames = diagonal_drag(20.0, 100.0);
        let release = frames.split_off(frames.len() - 2);
        assert!(run_frames(&ctx, &mut preview, frames).is_empty());
        assert!(matches!(preview.drag, DragState::Drawing { .. }));

        preview.clear();
        assert!(run_frames(&ctx, &mut preview, release).is_empty());
        assert!(matches!(preview.drag, DragState::None));
    }
}
