// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Masked zero-mean normalized cross-correlation.
//!
//! Scores every placement of the template inside the search window with
//!
//! ```text
//!            sum (I - mean I) * (T - mean T)
//! score = -------------------------------------
//!         sqrt(sum (I - mean I)^2 * sum (T - mean T)^2)
//! ```
//!
//! over the pixels the mask keeps. This is the same quantity as OpenCV's
//! `TM_CCOEFF_NORMED`, so scores lie in [-1, 1] and do not move with
//! uniform brightness changes.

use super::matcher::{MatchResult, Matcher};
use anyhow::{bail, Result};
use image::GrayImage;

/// Variance below which a window or template counts as flat.
const FLAT_EPSILON: f64 = 1e-6;

/// Mean difference under which two flat patches count as the same.
const FLAT_MEAN_TOLERANCE: f64 = 2.0;

#[derive(Debug, Default)]
pub struct ZnccMatcher;

/// Template pixels that take part in the score.
struct TemplateSamples {
    /// Offset of each sample inside a search-window-sized row layout.
    offsets: Vec<usize>,
    /// Template value minus the template mean.
    centered: Vec<f64>,
    mean: f64,
    /// Sum of squared centered values.
    energy: f64,
}

impl TemplateSamples {
    fn collect(template: &GrayImage, mask: Option<&GrayImage>, search_width: u32) -> Result<Self> {
        let mut offsets = Vec::new();
        let mut values = Vec::new();

        for (x, y, pixel) in template.enumerate_pixels() {
            if mask.is_some_and(|m| m.get_pixel(x, y)[0] == 0) {
                continue;
            }
            offsets.push(y as usize * search_width as usize + x as usize);
            values.push(f64::from(pixel[0]));
        }

        if values.is_empty() {
            bail!("mask excludes every template pixel");
        }

        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let centered: Vec<f64> = values.iter().map(|v| v - mean).collect();
        let energy = centered.iter().map(|v| v * v).sum();

        Ok(Self {
            offsets,
            centered,
            mean,
            energy,
        })
    }

    fn len(&self) -> f64 {
        self.offsets.len() as f64
    }
}

impl ZnccMatcher {
    fn score_at(samples: &TemplateSamples, data: &[u8], base: usize) -> f64 {
        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        let mut cross = 0.0;

        for (offset, t) in samples.offsets.iter().zip(&samples.centered) {
            let value = f64::from(data[base + offset]);
            sum += value;
            sum_sq += value * value;
            cross += value * t;
        }

        let n = samples.len();
        let window_energy = (sum_sq - sum * sum / n).max(0.0);
        let template_flat = samples.energy < FLAT_EPSILON;
        let window_flat = window_energy < FLAT_EPSILON;

        match (template_flat, window_flat) {
            (false, false) => (cross / (samples.energy * window_energy).sqrt()).clamp(-1.0, 1.0),
            // Two uniform patches correlate perfectly only if they agree
            (true, true) => {
                if (sum / n - samples.mean).abs() <= FLAT_MEAN_TOLERANCE {
                    1.0
                } else {
                    0.0
                }
            }
            _ => 0.0,
        }
    }
}

impl Matcher for ZnccMatcher {
    fn find_best(
        &mut self,
        search: &GrayImage,
        template: &GrayImage,
        mask: Option<&GrayImage>,
    ) -> Result<MatchResult> {
        let (search_w, search_h) = search.dimensions();
        let (template_w, template_h) = template.dimensions();

        if template_w == 0 || template_h == 0 {
            bail!("template is empty");
        }
        if template_w > search_w || template_h > search_h {
            bail!(
                "template {}x{} does not fit in search window {}x{}",
                template_w,
                template_h,
                search_w,
                search_h
            );
        }
        if let Some(mask) = mask {
            if mask.dimensions() != template.dimensions() {
                bail!(
                    "mask {}x{} does not match template {}x{}",
                    mask.width(),
                    mask.height(),
                    template_w,
                    template_h
                );
            }
        }

        let samples = TemplateSamples::collect(template, mask, search_w)?;
        let data = search.as_raw();

        let mut best = MatchResult {
            location: (0, 0),
            score: f64::NEG_INFINITY,
        };

        for y in 0..=(search_h - template_h) {
            for x in 0..=(search_w - template_w) {
                let base = y as usize * search_w as usize + x as usize;
                let score = Self::score_at(&samples, data, base);
                if score > best.score {
                    best = MatchResult {
                        location: (x, y),
                        score,
                    };
                }
            }
        }

        Ok(best)
    }

    fn name(&self) -> &'static str {
        "zncc"
    }
}
