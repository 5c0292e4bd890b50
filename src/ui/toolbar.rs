// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar with the watch controls.
//!
//! This module provides the margin and threshold inputs, the clear and
//! stop/restore buttons, and the similarity readout.

use crate::models::session::{SessionState, WatchState};

/// Button presses the app has to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    None,
    Clear,
    ToggleWatch,
}

/// Display the toolbar. Numeric inputs edit the session controls in place.
pub fn show(ui: &mut egui::Ui, session: &mut SessionState) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.label("ROI margin:");
        // Negative input is allowed here; the loop clamps and writes back
        ui.add(egui::DragValue::new(&mut session.controls.margin).suffix(" px"));

        ui.separator();

        ui.label("Alarm threshold:");
        ui.add(
            egui::DragValue::new(&mut session.controls.alarm_threshold)
                .range(0..=100)
                .suffix("%"),
        );

        ui.separator();

        if ui.button("Clear").on_hover_text("Forget the template and reset the alarm").clicked() {
            action = ToolbarAction::Clear;
        }

        let toggle_label = match session.watch_state() {
            WatchState::Watching => "Stop",
            WatchState::Stopped => "Restore",
        };
        if ui.button(toggle_label).clicked() {
            action = ToolbarAction::ToggleWatch;
        }

        ui.separator();

        let similarity_text = session
            .similarity()
            .map(|s| format!("{}%", s))
            .unwrap_or_default();
        ui.label(egui::RichText::new(format!("Similarity: {}", similarity_text)).strong());

        if session.watch_state() == WatchState::Stopped {
            ui.label(egui::RichText::new("alarms suppressed").italics().weak());
        }
    });

    action
}
