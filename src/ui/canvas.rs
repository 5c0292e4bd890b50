// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Live view canvas.
//!
//! This module displays the current frame, lets the user drag out the
//! region to watch, and draws the selection, search window, and best-match
//! outlines on top of the frame.

use crate::models::{
    region::{PixelPos, Region},
    session::SessionState,
    settings::Dimensions,
};
use crate::util::geometry::{fit_image, frame_to_screen, screen_to_frame};

pub const SELECTION_COLOR: egui::Color32 = egui::Color32::BLUE;
pub const ROI_COLOR: egui::Color32 = egui::Color32::GREEN;
pub const MATCH_COLOR: egui::Color32 = egui::Color32::RED;

/// Result of canvas interaction, in frame pixel coordinates.
pub enum CanvasAction {
    None,
    PointerDown(PixelPos),
    PointerMove(PixelPos),
    PointerUp,
}

/// Display the live view and handle selection drags.
pub fn show(
    ui: &mut egui::Ui,
    texture: &Option<egui::TextureHandle>,
    frame_size: Option<Dimensions>,
    session: &SessionState,
) -> CanvasAction {
    let mut action = CanvasAction::None;

    let (Some(texture), Some(size)) = (texture, frame_size) else {
        // Show a waiting message until the first frame arrives
        ui.centered_and_justified(|ui| {
            ui.label(
                egui::RichText::new("Waiting for the first frame...")
                    .size(16.0)
                    .color(egui::Color32::from_gray(120)),
            );
        });
        return action;
    };

    let image_rect = fit_image(ui.available_rect_before_wrap(), size.width, size.height);

    ui.painter().image(
        texture.id(),
        image_rect,
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        egui::Color32::WHITE,
    );

    let response = ui.allocate_rect(image_rect, egui::Sense::drag());
    let to_frame = |pos: egui::Pos2| screen_to_frame(pos, image_rect, size.width, size.height);

    if response.drag_started() {
        // Start from where the button went down, not where egui noticed the drag
        let origin = ui
            .input(|i| i.pointer.press_origin())
            .or_else(|| response.interact_pointer_pos());
        if let Some(pos) = origin {
            action = CanvasAction::PointerDown(to_frame(pos));
        }
    } else if response.dragged() {
        if let Some(pos) = response.interact_pointer_pos() {
            action = CanvasAction::PointerMove(to_frame(pos));
        }
    }
    if response.drag_stopped() {
        action = CanvasAction::PointerUp;
    }

    if response.hovered() || response.dragged() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::Crosshair);
    }

    let painter = ui.painter_at(image_rect);
    let outline = |region: &Region, color: egui::Color32| {
        if region.is_active() {
            painter.rect_stroke(
                frame_to_screen(region, image_rect, size.width, size.height),
                0.0,
                egui::Stroke::new(1.0, color),
            );
        }
    };

    if session.is_dragging() {
        outline(&session.rectangle(), SELECTION_COLOR);
    } else if let Some(overlay) = session.overlay() {
        outline(&overlay.roi, ROI_COLOR);
        if let Some(best) = &overlay.best_match {
            outline(best, MATCH_COLOR);
        }
        outline(&overlay.selection, SELECTION_COLOR);
    } else if session.template().is_some() {
        outline(&session.rectangle(), SELECTION_COLOR);
    }

    action
}
