// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Reference (template) extraction.
//!
//! The template is the grayscale snapshot of the selected region taken when
//! the selection drag ends. Selections larger than the template canvas are
//! scaled down uniformly so both sides fit.

use crate::models::{region::Region, settings::Dimensions};
use anyhow::{bail, Result};
use image::{imageops, GrayImage, RgbaImage};

/// Template canvas size for a `width` x `height` selection.
///
/// The factor is `min(max.width / width, max.height / height)`, applied to
/// both sides and floored; each side is then clamped to `1..=max`.
pub fn scaled_size(width: u32, height: u32, max: Dimensions) -> (u32, u32) {
    if width <= max.width && height <= max.height {
        return (width, height);
    }

    // Compare max.width / width against max.height / height without floats
    let (max_w, max_h) = (u64::from(max.width), u64::from(max.height));
    let (w, h) = (u64::from(width), u64::from(height));
    let (num, den) = if max_w * h <= max_h * w { (max_w, w) } else { (max_h, h) };

    let scale = |dim: u32, limit: u32| -> u32 {
        let scaled = (u64::from(dim) * num / den) as u32;
        scaled.clamp(1, limit.max(1))
    };

    (scale(width, max.width), scale(height, max.height))
}

/// A captured reference.
///
/// `full` keeps the selection's source resolution and is what gets matched.
/// `canvas` is the copy shown in the template panel and painted on; it is
/// reduced for oversized selections and identical to `full` otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub full: GrayImage,
    pub canvas: GrayImage,
}

impl From<GrayImage> for Reference {
    fn from(full: GrayImage) -> Self {
        Self {
            canvas: full.clone(),
            full,
        }
    }
}

/// Snapshot the pixels under `region` as a grayscale reference.
pub fn extract_reference(frame: &RgbaImage, region: &Region, max: Dimensions) -> Result<Reference> {
    if !region.is_active() {
        bail!("cannot extract a reference from an empty region {:?}", region);
    }
    if !region.fits_within(frame.width(), frame.height()) {
        bail!(
            "region {:?} lies outside the {}x{} frame",
            region,
            frame.width(),
            frame.height()
        );
    }

    let patch =
        imageops::crop_imm(frame, region.left, region.top, region.width, region.height).to_image();
    let full = imageops::grayscale(&patch);

    let (width, height) = scaled_size(region.width, region.height, max);
    if (width, height) == region.size() {
        return Ok(full.into());
    }

    log::debug!(
        "Scaling template canvas {}x{} down to {}x{}",
        region.width,
        region.height,
        width,
        height
    );
    let canvas = imageops::resize(&full, width, height, imageops::FilterType::Triangle);

    Ok(Reference { full, canvas })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const MAX: Dimensions = Dimensions::new(180, 180);

    #[test]
    fn test_small_selection_is_kept_at_full_size() {
        assert_eq!(scaled_size(100, 80, MAX), (100, 80));
        assert_eq!(scaled_size(180, 180, MAX), (180, 180));
    }

    #[test]
    fn test_oversized_selection_is_scaled_uniformly() {
        // factor = min(180/300, 180/50) = 0.6
        assert_eq!(scaled_size(300, 50, MAX), (180, 30));
        // factor = min(180/200, 180/400) = 0.45
        assert_eq!(scaled_size(200, 400, MAX), (90, 180));
        // Very thin selections keep at least one pixel
        assert_eq!(scaled_size(1000, 2, MAX), (180, 1));
    }

    #[test]
    fn test_scaled_size_respects_unequal_limits() {
        let max = Dimensions::new(200, 100);
        // factor = min(200/400, 100/100) = 0.5
        assert_eq!(scaled_size(400, 100, max), (200, 50));
        // factor = min(200/300, 100/300) = 1/3
        assert_eq!(scaled_size(300, 300, max), (100, 100));
    }

    #[test]
    fn test_extract_reference_dimensions() {
        let frame = RgbaImage::from_pixel(640, 480, Rgba([10, 20, 30, 255]));

        let reference = extract_reference(&frame, &Region::new(10, 10, 100, 80), MAX).unwrap();
        assert_eq!(reference.canvas.dimensions(), (100, 80));
        assert_eq!(reference.full.dimensions(), (100, 80));

        let reference = extract_reference(&frame, &Region::new(0, 100, 300, 50), MAX).unwrap();
        assert_eq!(reference.canvas.dimensions(), (180, 30));
        assert_eq!(reference.full.dimensions(), (300, 50));
    }

    #[test]
    fn test_extract_reference_is_grayscale_copy_of_region() {
        let mut frame = RgbaImage::from_pixel(64, 48, Rgba([0, 0, 0, 255]));
        for y in 10..20 {
            for x in 10..20 {
                frame.put_pixel(x, y, Rgba([255, 255, 255, 255]));
            }
        }

        let reference = extract_reference(&frame, &Region::new(10, 10, 10, 10), MAX).unwrap();
        assert!(reference.full.pixels().all(|p| p[0] == 255));
        assert_eq!(reference.canvas, reference.full);

        let reference = extract_reference(&frame, &Region::new(20, 20, 5, 5), MAX).unwrap();
        assert!(reference.full.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_extract_reference_rejects_bad_regions() {
        let frame = RgbaImage::new(64, 48);
        assert!(extract_reference(&frame, &Region::new(0, 0, 0, 10), MAX).is_err());
        assert!(extract_reference(&frame, &Region::new(60, 0, 10, 10), MAX).is_err());
    }

    #[test]
    fn test_reduced_canvas_keeps_full_resolution_copy() {
        let frame = RgbaImage::from_fn(400, 200, |x, y| {
            let v = ((x * 7 + y * 13 + x * y) % 256) as u8;
            Rgba([v, v, v, 255])
        });

        let reference = extract_reference(&frame, &Region::new(50, 60, 300, 50), MAX).unwrap();
        let patch = imageops::crop_imm(&frame, 50, 60, 300, 50).to_image();
        assert_eq!(reference.full, imageops::grayscale(&patch));
    }
}
