// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Free-hand mask painting over the template.
//!
//! The mask surface is a single-channel image at the template's canvas
//! size. Painted pixels hold `INK` and are excluded from matching. The
//! surface follows the session's template: whenever the template is
//! replaced or dropped, the surface is resized and wiped.

use crate::models::{
    region::{PixelPos, Region},
    session::SessionState,
};
use image::{imageops, GrayImage, Luma};
use imageproc::drawing::draw_filled_circle_mut;
use std::time::{Duration, Instant};

/// Value written by the brush.
const INK: Luma<u8> = Luma([255]);

/// Surface values at or above this count as painted.
const PAINTED_THRESHOLD: u8 = 128;

/// Mask painter state: the surface plus the stroke in progress.
pub struct MaskPainter {
    surface: GrayImage,
    /// Template generation the surface was sized for.
    generation: u64,
    /// Last brush position while a stroke is active.
    last_point: Option<PixelPos>,
    last_event: Option<Instant>,
    brush_width: u32,
    timeout: Duration,
}

impl MaskPainter {
    pub fn new(brush_width: u32, timeout: Duration) -> Self {
        Self {
            surface: GrayImage::new(0, 0),
            generation: 0,
            last_point: None,
            last_event: None,
            brush_width: brush_width.max(1),
            timeout,
        }
    }

    pub fn surface(&self) -> &GrayImage {
        &self.surface
    }

    pub fn is_stroking(&self) -> bool {
        self.last_point.is_some()
    }

    /// Bring the surface in line with the session's template.
    pub fn sync(&mut self, session: &SessionState) {
        if self.generation == session.template_generation() {
            return;
        }
        self.generation = session.template_generation();
        let (width, height) = session.template().map(|t| t.dimensions()).unwrap_or((0, 0));
        self.surface = GrayImage::new(width, height);
        self.last_point = None;
        self.last_event = None;
    }

    /// Start a stroke at `at` (template coordinates).
    pub fn stroke_begin(&mut self, session: &mut SessionState, at: PixelPos, now: Instant) {
        self.sync(session);
        if session.template().is_none() {
            return;
        }
        self.last_point = Some(at);
        self.paint(session, at, at, now);
    }

    /// Extend the active stroke to `at`.
    pub fn stroke_extend(&mut self, session: &mut SessionState, at: PixelPos, now: Instant) {
        self.sync(session);
        let Some(from) = self.last_point else {
            return;
        };
        self.last_point = Some(at);
        self.paint(session, from, at, now);
    }

    pub fn stroke_end(&mut self) {
        if self.last_point.take().is_some() {
            log::debug!("Mask stroke finished");
        }
        self.last_event = None;
    }

    /// Release a stroke whose end event never arrived.
    ///
    /// Returns true if a stroke was forcibly ended.
    pub fn poll_timeout(&mut self, now: Instant) -> bool {
        match self.last_event {
            Some(last)
                if self.is_stroking() && now.saturating_duration_since(last) >= self.timeout =>
            {
                log::debug!("Mask stroke released after {:?} of inactivity", self.timeout);
                self.stroke_end();
                true
            }
            _ => false,
        }
    }

    /// Wipe the surface and drop the session's mask.
    pub fn clear(&mut self, session: &mut SessionState) {
        self.sync(session);
        self.surface.pixels_mut().for_each(|p| *p = Luma([0]));
        self.stroke_end();
        session.clear_mask();
    }

    fn paint(&mut self, session: &mut SessionState, from: PixelPos, to: PixelPos, now: Instant) {
        self.last_event = Some(now);
        paint_segment(&mut self.surface, from, to, self.brush_width);

        if let Err(e) = session.set_mask(self.surface.clone()) {
            log::warn!("Failed to store mask: {:#}", e);
        }
    }
}

/// Draw a round-capped line of `width` pixels from `from` to `to`.
fn paint_segment(surface: &mut GrayImage, from: PixelPos, to: PixelPos, width: u32) {
    let radius = (width / 2) as i32;
    let (x0, y0) = (from.x as i32, from.y as i32);
    let (dx, dy) = (to.x as i32 - x0, to.y as i32 - y0);
    let steps = dx.abs().max(dy.abs()).max(1);

    for i in 0..=steps {
        let x = x0 + dx * i / steps;
        let y = y0 + dy * i / steps;
        draw_filled_circle_mut(surface, (x, y), radius, INK);
    }
}

/// Matching weights for a mask, at the selection's source resolution.
///
/// The mask is binarized with inverted polarity: painted pixels get weight
/// 0 and are ignored, everything else gets 255. Nearest-neighbour resizing
/// keeps the result binary.
pub fn matching_weights(mask: &GrayImage, selection: &Region) -> GrayImage {
    let binary = GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        if mask.get_pixel(x, y)[0] >= PAINTED_THRESHOLD {
            Luma([0])
        } else {
            Luma([255])
        }
    });

    if binary.dimensions() == selection.size() {
        binary
    } else {
        imageops::resize(&binary, selection.width, selection.height, imageops::FilterType::Nearest)
    }
}
