// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! The alarm loop tick.
//!
//! Each tick either applies a pending clear or, when a reference is ready,
//! cuts the search window around the selection out of the current frame,
//! scores it against the template, and raises the alarm on a breach. Once a
//! second it also reports the tick rate and drives the alarm flash.
//!
//! A tick without a frame still applies a pending clear and keeps the flash
//! going; it only skips the measurement.

use super::clock::SecondCounter;
use crate::models::{
    region::Region,
    session::{MatchOverlay, SessionState},
};
use crate::util::geometry::search_window;
use crate::vision::{
    mask::matching_weights,
    matcher::{similarity_percent, MatchResult, Matcher},
};
use anyhow::{Context, Result};
use image::{imageops, RgbaImage};
use std::time::Instant;

/// Once-a-second status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readout {
    pub fps: u32,
    pub width: u32,
    pub height: u32,
}

/// What a tick asks of its caller.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// A similarity was measured this tick.
    pub measured: bool,
    /// Refreshed status, once a second.
    pub readout: Option<Readout>,
    /// The flash just turned on; play the alarm sound.
    pub play_sound: bool,
}

pub struct AlarmLoop {
    seconds: SecondCounter,
}

impl AlarmLoop {
    pub fn new(now: Instant) -> Self {
        Self {
            seconds: SecondCounter::new(now),
        }
    }

    /// Run one tick against the current `frame`, if one was grabbed.
    pub fn tick(
        &mut self,
        session: &mut SessionState,
        frame: Option<&RgbaImage>,
        matcher: &mut dyn Matcher,
        now: Instant,
    ) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        if session.take_clear_request() {
            session.apply_clear();
        } else if let Some(frame) = frame.filter(|_| session.ready_to_match()) {
            outcome.measured = match_step(session, frame, matcher);
        }

        if let Some(fps) = self.seconds.record(now) {
            if let Some(frame) = frame {
                let readout = Readout {
                    fps,
                    width: frame.width(),
                    height: frame.height(),
                };
                log::debug!(
                    "resolution: {}x{} fps: {}",
                    readout.width,
                    readout.height,
                    readout.fps
                );
                outcome.readout = Some(readout);
            }

            // The sound only plays as the flash turns on
            if session.alarm() && session.toggle_flash() {
                outcome.play_sound = true;
            }
        }

        outcome
    }
}

/// Measure similarity around the selection and update the session.
///
/// A failure is logged and leaves the previous similarity and alarm alone.
fn match_step(session: &mut SessionState, frame: &RgbaImage, matcher: &mut dyn Matcher) -> bool {
    let selection = session.rectangle();
    let margin = session.controls.take_margin();
    let roi = search_window(&selection, margin, frame.width(), frame.height());

    match measure(session, frame, &roi, &selection, matcher) {
        Ok(result) => {
            let similarity = similarity_percent(result.score);
            session.record_similarity(similarity);
            session.set_overlay(MatchOverlay {
                roi,
                best_match: Some(Region::new(
                    roi.left + result.location.0,
                    roi.top + result.location.1,
                    selection.width,
                    selection.height,
                )),
                selection,
            });
            true
        }
        Err(e) => {
            log::warn!("Match step failed with {}: {:#}", matcher.name(), e);
            session.set_overlay(MatchOverlay {
                roi,
                best_match: None,
                selection,
            });
            false
        }
    }
}

fn measure(
    session: &SessionState,
    frame: &RgbaImage,
    roi: &Region,
    selection: &Region,
    matcher: &mut dyn Matcher,
) -> Result<MatchResult> {
    let template = session.matching_template().context("no template to match")?;

    let patch = imageops::crop_imm(frame, roi.left, roi.top, roi.width, roi.height).to_image();
    let search = imageops::grayscale(&patch);
    let weights = session.mask().map(|mask| matching_weights(mask, selection));

    matcher
        .find_best(&search, template, weights.as_ref())
        .with_context(|| format!("matching {:?} inside {:?}", selection, roi))
}
