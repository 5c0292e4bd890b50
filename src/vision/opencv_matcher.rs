// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! OpenCV-backed template matching (`video-opencv` feature).

use super::matcher::{MatchResult, Matcher};
use anyhow::{bail, Context, Result};
use image::GrayImage;
use opencv::{
    core::{self, Mat, Point},
    imgproc,
    prelude::*,
};

/// `TM_CCOEFF_NORMED` through `imgproc::match_template`.
pub struct OpencvMatcher;

/// Copy a grayscale buffer into an owned single-channel `Mat`.
pub(crate) fn gray_to_mat(image: &GrayImage) -> Result<Mat> {
    let (rows, cols) = (image.height() as i32, image.width() as i32);
    let borrowed = Mat::new_rows_cols_with_data(rows, cols, image.as_raw())
        .context("wrapping grayscale buffer")?;
    Ok(borrowed.try_clone()?)
}

impl Matcher for OpencvMatcher {
    fn find_best(
        &mut self,
        search: &GrayImage,
        template: &GrayImage,
        mask: Option<&GrayImage>,
    ) -> Result<MatchResult> {
        if template.width() > search.width() || template.height() > search.height() {
            bail!(
                "template {}x{} does not fit in search window {}x{}",
                template.width(),
                template.height(),
                search.width(),
                search.height()
            );
        }

        // Mats are dropped at the end of this call on every path
        let search_mat = gray_to_mat(search)?;
        let template_mat = gray_to_mat(template)?;
        let mask_mat = match mask {
            Some(mask) => gray_to_mat(mask)?,
            None => Mat::default(),
        };

        let mut scores = Mat::default();
        imgproc::match_template(
            &search_mat,
            &template_mat,
            &mut scores,
            imgproc::TM_CCOEFF_NORMED,
            &mask_mat,
        )
        .context("matchTemplate failed")?;

        let mut max_val = 0.0;
        let mut max_loc = Point::default();
        core::min_max_loc(
            &scores,
            None,
            Some(&mut max_val),
            None,
            Some(&mut max_loc),
            &core::no_array(),
        )
        .context("minMaxLoc failed")?;

        if !max_val.is_finite() {
            bail!("matchTemplate produced a non-finite score");
        }

        Ok(MatchResult {
            location: (max_loc.x.max(0) as u32, max_loc.y.max(0) as u32),
            score: max_val.min(1.0),
        })
    }

    fn name(&self) -> &'static str {
        "opencv"
    }
}
