// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Rectangle and point types in source-frame pixel coordinates.
//!
//! Every rectangle the application deals with (the watched selection, the
//! search window around it, the best-match box) lives in the coordinate
//! space of the captured frame, not of the screen.

use serde::{Deserialize, Serialize};

/// A pixel position inside the captured frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PixelPos {
    pub x: u32,
    pub y: u32,
}

impl PixelPos {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle `{left, top, width, height}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Region {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Bounding box of two corner points, in either order.
    pub fn from_corners(a: PixelPos, b: PixelPos) -> Self {
        Self {
            left: a.x.min(b.x),
            top: a.y.min(b.y),
            width: a.x.abs_diff(b.x),
            height: a.y.abs_diff(b.y),
        }
    }

    /// A rectangle only means something once it has a positive area.
    pub fn is_active(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn right(&self) -> u32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.top + self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether the rectangle lies entirely inside a `width` x `height` frame.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= width && self.bottom() <= height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_any_drag_direction() {
        let expected = Region::new(10, 20, 30, 40);

        // Down-right, up-left, and the two diagonals all give the same box
        let drags = [
            (PixelPos::new(10, 20), PixelPos::new(40, 60)),
            (PixelPos::new(40, 60), PixelPos::new(10, 20)),
            (PixelPos::new(40, 20), PixelPos::new(10, 60)),
            (PixelPos::new(10, 60), PixelPos::new(40, 20)),
        ];

        for (start, end) in drags {
            assert_eq!(Region::from_corners(start, end), expected);
        }
    }

    #[test]
    fn test_degenerate_drag_is_inactive() {
        let horizontal = Region::from_corners(PixelPos::new(5, 5), PixelPos::new(25, 5));
        assert_eq!(horizontal.width, 20);
        assert!(!horizontal.is_active());

        let point = Region::from_corners(PixelPos::new(5, 5), PixelPos::new(5, 5));
        assert!(!point.is_active());
    }

    #[test]
    fn test_fits_within() {
        let region = Region::new(600, 400, 40, 80);
        assert!(region.fits_within(640, 480));
        assert!(!region.fits_within(639, 480));
    }
}
