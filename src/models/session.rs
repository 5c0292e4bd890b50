// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Session state shared by the region selector, the mask painter, and the
//! alarm loop.
//!
//! Everything here lives for one run of the application and is only touched
//! from the UI thread. The invariants the rest of the code relies on are
//! enforced by the methods rather than by callers:
//!
//! - the mask always has the template's dimensions and disappears with it,
//! - the alarm can only be raised while watching.

use super::region::{PixelPos, Region};
use crate::vision::reference::Reference;
use anyhow::{bail, Result};
use image::GrayImage;

/// Whether a similarity breach may raise the alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Watching,
    Stopped,
}

/// User-editable numeric inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    /// Search margin around the selection, in pixels. Negative input is
    /// clamped to zero when read.
    pub margin: i32,
    /// Alarm threshold in percent.
    pub alarm_threshold: i32,
}

impl Controls {
    /// Read the margin, writing the clamped value back to the input.
    pub fn take_margin(&mut self) -> u32 {
        self.margin = self.margin.max(0);
        self.margin as u32
    }

    pub fn threshold(&self) -> u32 {
        self.alarm_threshold.clamp(0, 100) as u32
    }
}

/// Outlines drawn over the live view after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOverlay {
    /// The search window.
    pub roi: Region,
    /// Where the template matched best, absent if the match step failed.
    pub best_match: Option<Region>,
    /// The watched selection.
    pub selection: Region,
}

/// State of one monitoring session.
#[derive(Debug)]
pub struct SessionState {
    rectangle: Region,
    drag_origin: Option<PixelPos>,
    template: Option<Reference>,
    mask: Option<GrayImage>,
    /// Bumped whenever the template is replaced or dropped.
    template_generation: u64,
    watch: WatchState,
    alarm: bool,
    flash_on: bool,
    clear_requested: bool,
    similarity: Option<u32>,
    overlay: Option<MatchOverlay>,
    pub controls: Controls,
}

impl SessionState {
    pub fn new(margin: u32, alarm_threshold: u32) -> Self {
        Self {
            rectangle: Region::default(),
            drag_origin: None,
            template: None,
            mask: None,
            template_generation: 0,
            watch: WatchState::Watching,
            alarm: false,
            flash_on: false,
            clear_requested: false,
            similarity: None,
            overlay: None,
            controls: Controls {
                margin: i32::try_from(margin).unwrap_or(i32::MAX),
                alarm_threshold: alarm_threshold.min(100) as i32,
            },
        }
    }

    pub fn rectangle(&self) -> Region {
        self.rectangle
    }

    pub fn set_rectangle(&mut self, rectangle: Region) {
        self.rectangle = rectangle;
    }

    /// Start a selection drag. Any existing reference is discarded.
    pub fn begin_drag(&mut self, origin: PixelPos) {
        self.drag_origin = Some(origin);
        self.discard_reference();
    }

    pub fn drag_origin(&self) -> Option<PixelPos> {
        self.drag_origin
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_origin.is_some()
    }

    /// Finish the drag, returning where it started.
    pub fn end_drag(&mut self) -> Option<PixelPos> {
        self.drag_origin.take()
    }

    /// The template canvas shown in the panel. Masks are painted at its size.
    pub fn template(&self) -> Option<&GrayImage> {
        self.template.as_ref().map(|t| &t.canvas)
    }

    /// The template at the selection's source resolution, for matching.
    pub fn matching_template(&self) -> Option<&GrayImage> {
        self.template.as_ref().map(|t| &t.full)
    }

    pub fn mask(&self) -> Option<&GrayImage> {
        self.mask.as_ref()
    }

    pub fn template_generation(&self) -> u64 {
        self.template_generation
    }

    /// Replace the reference image. The old mask no longer applies.
    pub fn install_template(&mut self, template: Reference) {
        log::info!(
            "Stored template {}x{} for region {:?}",
            template.canvas.width(),
            template.canvas.height(),
            self.rectangle
        );
        self.template = Some(template);
        self.mask = None;
        self.template_generation += 1;
    }

    /// Store a mask snapshot. It must match the current template.
    pub fn set_mask(&mut self, mask: GrayImage) -> Result<()> {
        let Some(template) = self.template() else {
            bail!("cannot store a mask without a template");
        };
        if template.dimensions() != mask.dimensions() {
            bail!(
                "mask is {}x{} but the template is {}x{}",
                mask.width(),
                mask.height(),
                template.width(),
                template.height()
            );
        }
        self.mask = Some(mask);
        Ok(())
    }

    pub fn clear_mask(&mut self) {
        self.mask = None;
    }

    fn discard_reference(&mut self) {
        if self.template.is_some() {
            self.template_generation += 1;
        }
        self.template = None;
        self.mask = None;
        self.overlay = None;
    }

    pub fn watch_state(&self) -> WatchState {
        self.watch
    }

    pub fn alarm(&self) -> bool {
        self.alarm
    }

    pub fn flash_on(&self) -> bool {
        self.flash_on
    }

    pub fn similarity(&self) -> Option<u32> {
        self.similarity
    }

    pub fn overlay(&self) -> Option<&MatchOverlay> {
        self.overlay.as_ref()
    }

    pub fn set_overlay(&mut self, overlay: MatchOverlay) {
        self.overlay = Some(overlay);
    }

    /// Ask the loop to drop the reference on its next tick.
    ///
    /// The alarm, the flash and the watch state reset right away; the
    /// template itself goes on the next tick so an in-flight match never
    /// sees it vanish.
    pub fn request_clear(&mut self) {
        self.clear_requested = true;
        self.alarm = false;
        self.flash_on = false;
        self.watch = WatchState::Watching;
    }

    /// Consume a pending clear request.
    pub fn take_clear_request(&mut self) -> bool {
        std::mem::take(&mut self.clear_requested)
    }

    /// Drop the template, mask, overlays and similarity readout.
    pub fn apply_clear(&mut self) {
        self.discard_reference();
        self.similarity = None;
        log::info!("Template and alarm cleared");
    }

    /// Switch between watching and stopped.
    pub fn toggle_watch(&mut self) -> WatchState {
        self.watch = match self.watch {
            WatchState::Watching => {
                self.alarm = false;
                self.flash_on = false;
                WatchState::Stopped
            }
            WatchState::Stopped => WatchState::Watching,
        };
        log::info!("Watch state: {:?}", self.watch);
        self.watch
    }

    /// Whether the loop should run the match step this tick.
    pub fn ready_to_match(&self) -> bool {
        self.template.is_some() && !self.is_dragging() && self.rectangle.is_active()
    }

    /// Record a measured similarity and raise the alarm on a breach.
    ///
    /// A high similarity never lowers the alarm.
    pub fn record_similarity(&mut self, similarity: u32) {
        self.similarity = Some(similarity);
        if similarity < self.controls.threshold() && self.watch == WatchState::Watching {
            if !self.alarm {
                log::info!(
                    "Alarm raised: similarity {}% below threshold {}%",
                    similarity,
                    self.controls.threshold()
                );
            }
            self.alarm = true;
        }
    }

    /// Flip the alarm flash, returning whether it is now on.
    pub fn toggle_flash(&mut self) -> bool {
        self.flash_on = !self.flash_on;
        self.flash_on
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_template() -> SessionState {
        let mut session = SessionState::new(10, 80);
        session.set_rectangle(Region::new(50, 50, 40, 30));
        session.install_template(GrayImage::new(40, 30).into());
        session
    }

    #[test]
    fn test_alarm_never_raised_while_stopped() {
        let mut session = session_with_template();
        session.toggle_watch();
        assert_eq!(session.watch_state(), WatchState::Stopped);

        for similarity in [0, 10, 50, 79, 80, 100] {
            session.record_similarity(similarity);
            assert!(!session.alarm());
        }
        assert_eq!(session.similarity(), Some(100));
    }

    #[test]
    fn test_high_similarity_does_not_lower_alarm() {
        let mut session = session_with_template();
        session.record_similarity(50);
        assert!(session.alarm());

        session.record_similarity(99);
        assert!(session.alarm());
    }

    #[test]
    fn test_stop_clears_alarm_and_restore_keeps_it_clear() {
        let mut session = session_with_template();
        session.record_similarity(10);
        session.toggle_flash();
        assert!(session.alarm());

        session.toggle_watch();
        assert!(!session.alarm());
        assert!(!session.flash_on());

        session.toggle_watch();
        assert_eq!(session.watch_state(), WatchState::Watching);
        assert!(!session.alarm());

        session.record_similarity(10);
        assert!(session.alarm());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut session = session_with_template();
        session.set_mask(GrayImage::new(40, 30)).unwrap();
        session.record_similarity(5);
        session.toggle_flash();
        session.toggle_watch();

        session.request_clear();
        assert!(!session.alarm());
        assert!(!session.flash_on());
        assert_eq!(session.watch_state(), WatchState::Watching);

        assert!(session.take_clear_request());
        session.apply_clear();
        assert!(session.template().is_none());
        assert!(session.mask().is_none());
        assert!(session.similarity().is_none());
        assert!(session.overlay().is_none());
        assert!(!session.take_clear_request());
    }

    #[test]
    fn test_new_template_invalidates_mask() {
        let mut session = session_with_template();
        session.set_mask(GrayImage::new(40, 30)).unwrap();
        let generation = session.template_generation();

        session.install_template(GrayImage::new(20, 20).into());
        assert!(session.mask().is_none());
        assert!(session.template_generation() > generation);
    }

    #[test]
    fn test_mask_must_match_template() {
        let mut session = SessionState::new(10, 80);
        assert!(session.set_mask(GrayImage::new(4, 4)).is_err());

        session.install_template(GrayImage::new(8, 8).into());
        assert!(session.set_mask(GrayImage::new(4, 4)).is_err());
        assert!(session.set_mask(GrayImage::new(8, 8)).is_ok());
    }

    #[test]
    fn test_drag_suppresses_matching_and_drops_reference() {
        let mut session = session_with_template();
        assert!(session.ready_to_match());

        session.begin_drag(PixelPos::new(1, 1));
        assert!(session.is_dragging());
        assert!(session.template().is_none());
        assert!(!session.ready_to_match());

        assert_eq!(session.end_drag(), Some(PixelPos::new(1, 1)));
        assert!(!session.is_dragging());
    }

    #[test]
    fn test_margin_is_clamped_and_written_back() {
        let mut controls = Controls {
            margin: -5,
            alarm_threshold: 150,
        };
        assert_eq!(controls.take_margin(), 0);
        assert_eq!(controls.margin, 0);
        assert_eq!(controls.threshold(), 100);
    }
}
