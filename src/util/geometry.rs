// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module converts between screen coordinates of a displayed image and
//! pixel coordinates of the underlying frame, and computes the clamped
//! search window around the watched region.

use crate::models::region::{PixelPos, Region};

/// Largest rectangle with the image's aspect ratio, centered in `available`.
pub fn fit_image(available: egui::Rect, image_width: u32, image_height: u32) -> egui::Rect {
    let img_aspect = image_width as f32 / image_height.max(1) as f32;
    let available_aspect = available.width() / available.height().max(1.0);

    let size = if img_aspect > available_aspect {
        // Image is wider - fit to width
        egui::vec2(available.width(), available.width() / img_aspect)
    } else {
        // Image is taller - fit to height
        egui::vec2(available.height() * img_aspect, available.height())
    };

    egui::Rect::from_center_size(available.center(), size)
}

/// Convert a screen position over `image_rect` to frame pixel coordinates.
///
/// Positions outside the displayed image are clamped onto its border, so a
/// drag that leaves the view still yields a rectangle inside the frame.
pub fn screen_to_frame(
    pos: egui::Pos2,
    image_rect: egui::Rect,
    width: u32,
    height: u32,
) -> PixelPos {
    let rel_x = ((pos.x - image_rect.min.x) / image_rect.width()).clamp(0.0, 1.0);
    let rel_y = ((pos.y - image_rect.min.y) / image_rect.height()).clamp(0.0, 1.0);

    PixelPos::new(
        ((rel_x * width as f32).floor() as u32).min(width),
        ((rel_y * height as f32).floor() as u32).min(height),
    )
}

/// Convert a frame rectangle to the screen rectangle it covers.
pub fn frame_to_screen(
    region: &Region,
    image_rect: egui::Rect,
    width: u32,
    height: u32,
) -> egui::Rect {
    let scale_x = image_rect.width() / width.max(1) as f32;
    let scale_y = image_rect.height() / height.max(1) as f32;

    egui::Rect::from_min_size(
        image_rect.min + egui::vec2(region.left as f32 * scale_x, region.top as f32 * scale_y),
        egui::vec2(region.width as f32 * scale_x, region.height as f32 * scale_y),
    )
}

/// The search window around `selection`, grown by `margin` on every side and
/// clamped to a `frame_width` x `frame_height` frame.
///
/// The origin saturates at zero and the size is cut back at the right and
/// bottom edges, so the window never leaves the frame.
pub fn search_window(
    selection: &Region,
    margin: u32,
    frame_width: u32,
    frame_height: u32,
) -> Region {
    let left = selection.left.saturating_sub(margin).min(frame_width);
    let top = selection.top.saturating_sub(margin).min(frame_height);

    let width = selection.width.saturating_add(margin.saturating_mul(2));
    let height = selection.height.saturating_add(margin.saturating_mul(2));

    Region::new(
        left,
        top,
        width.min(frame_width - left),
        height.min(frame_height - top),
    )
}
