// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Region selection by dragging over the live view.

use crate::models::{
    region::{PixelPos, Region},
    session::SessionState,
    settings::Dimensions,
};
use crate::vision::reference::extract_reference;
use image::RgbaImage;

/// Turns pointer events on the live view into the watched rectangle.
pub struct RegionSelector {
    template_max: Dimensions,
}

impl RegionSelector {
    pub fn new(template_max: Dimensions) -> Self {
        Self { template_max }
    }

    /// Begin a drag. The current reference is discarded.
    pub fn pointer_down(&self, session: &mut SessionState, at: PixelPos) {
        session.begin_drag(at);
    }

    /// Stretch the rectangle between the drag origin and `at`.
    pub fn pointer_move(&self, session: &mut SessionState, at: PixelPos) {
        if let Some(origin) = session.drag_origin() {
            session.set_rectangle(Region::from_corners(origin, at));
        }
    }

    /// End the drag and capture the reference from `frame`.
    ///
    /// Returns the finalized rectangle when it has a positive area and its
    /// reference could be extracted.
    pub fn pointer_up(&self, session: &mut SessionState, frame: &RgbaImage) -> Option<Region> {
        session.end_drag()?;

        let rectangle = session.rectangle();
        if !rectangle.is_active() {
            return None;
        }

        match extract_reference(frame, &rectangle, self.template_max) {
            Ok(template) => {
                log::info!("Selected region {:?}", rectangle);
                session.install_template(template);
                Some(rectangle)
            }
            Err(e) => {
                log::warn!("Failed to capture reference: {:#}", e);
                None
            }
        }
    }
}
