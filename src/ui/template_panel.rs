// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Template preview and mask painting panel.
//!
//! This module shows the captured template with the painted mask tinted on
//! top, and turns drags over it into mask strokes.

use crate::models::region::PixelPos;
use crate::util::geometry::screen_to_frame;
use image::GrayImage;

/// Mask painting requests, in template pixel coordinates.
pub enum MaskAction {
    None,
    StrokeBegin(PixelPos),
    StrokeExtend(PixelPos),
    StrokeEnd,
    /// A click without a drag paints a single dab.
    Dab(PixelPos),
    ClearMask,
}

/// Tint applied to painted (ignored) pixels.
const MASK_TINT: [u8; 3] = [220, 40, 40];

/// Compose the template and mask surface into a displayable image.
pub fn template_preview(template: &GrayImage, surface: &GrayImage) -> egui::ColorImage {
    let size = [template.width() as usize, template.height() as usize];
    let same_size = surface.dimensions() == template.dimensions();

    let pixels = template
        .enumerate_pixels()
        .map(|(x, y, luma)| {
            let gray = luma[0];
            if same_size && surface.get_pixel(x, y)[0] >= 128 {
                let blend = |tint: u8| ((u16::from(gray) + u16::from(tint)) / 2) as u8;
                let [r, g, b] = MASK_TINT.map(blend);
                egui::Color32::from_rgb(r, g, b)
            } else {
                egui::Color32::from_gray(gray)
            }
        })
        .collect();

    egui::ColorImage { size, pixels }
}

/// Display the template panel.
pub fn show(
    ui: &mut egui::Ui,
    texture: &Option<egui::TextureHandle>,
    template_size: Option<(u32, u32)>,
    has_mask: bool,
) -> MaskAction {
    let mut action = MaskAction::None;

    ui.heading("Template");
    ui.separator();

    let (Some(texture), Some((width, height))) = (texture, template_size) else {
        ui.label(
            egui::RichText::new("Drag a rectangle on the live view to start watching it")
                .weak(),
        );
        return action;
    };

    // Shrink to the panel width, never enlarge
    let scale = (ui.available_width() / width as f32).min(1.0);
    let display = egui::vec2(width as f32 * scale, height as f32 * scale);
    let (rect, response) = ui.allocate_exact_size(display, egui::Sense::click_and_drag());

    ui.painter().image(
        texture.id(),
        rect,
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        egui::Color32::WHITE,
    );

    let to_template = |pos: egui::Pos2| screen_to_frame(pos, rect, width, height);

    if response.drag_started() {
        let origin = ui
            .input(|i| i.pointer.press_origin())
            .or_else(|| response.interact_pointer_pos());
        if let Some(pos) = origin {
            action = MaskAction::StrokeBegin(to_template(pos));
        }
    } else if response.dragged() {
        if let Some(pos) = response.interact_pointer_pos() {
            action = MaskAction::StrokeExtend(to_template(pos));
        }
    } else if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            action = MaskAction::Dab(to_template(pos));
        }
    }
    if response.drag_stopped() {
        action = MaskAction::StrokeEnd;
    }

    ui.label(format!("{} x {} px", width, height));
    ui.label(
        egui::RichText::new("Paint over parts of the template that should be ignored")
            .italics()
            .weak(),
    );

    if ui.add_enabled(has_mask, egui::Button::new("Clear mask")).clicked() {
        action = MaskAction::ClearMask;
    }

    action
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_preview_tints_painted_pixels() {
        let template = GrayImage::from_pixel(3, 2, Luma([100]));
        let mut surface = GrayImage::new(3, 2);
        surface.put_pixel(1, 0, Luma([255]));

        let preview = template_preview(&template, &surface);
        assert_eq!(preview.size, [3, 2]);
        assert_eq!(preview.pixels[0], egui::Color32::from_gray(100));
        assert_eq!(preview.pixels[1], egui::Color32::from_rgb(160, 70, 70));
    }

    #[test]
    fn test_preview_ignores_stale_surface() {
        let template = GrayImage::from_pixel(2, 2, Luma([50]));
        let surface = GrayImage::from_pixel(4, 4, Luma([255]));

        let preview = template_preview(&template, &surface);
        assert!(preview.pixels.iter().all(|p| *p == egui::Color32::from_gray(50)));
    }
}
