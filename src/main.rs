// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Cam_alarm - camera region watcher
//!
//! A desktop application that watches a user-selected region of a live
//! camera feed and raises a visual and audio alarm when the region stops
//! looking like its captured reference.
//!
//! Usage: `cam_alarm [settings.yaml | settings.json | image]`

mod app;
mod io;
mod models;
mod monitor;
mod ui;
mod util;
mod vision;

use anyhow::Result;
use app::CamAlarmApp;
use models::settings::Settings;
use std::path::PathBuf;

/// Settings from the command line: a settings file, or an image to watch.
fn settings_from_args() -> Result<Settings> {
    let Some(arg) = std::env::args_os().nth(1).map(PathBuf::from) else {
        return Ok(Settings::default());
    };

    if io::capture::is_image_path(&arg) {
        Ok(Settings {
            source: io::capture::image_source(arg),
            ..Settings::default()
        })
    } else {
        io::serialization::load_settings(&arg)
    }
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let settings = settings_from_args().inspect_err(|e| log::error!("init ERROR: {:#}", e))?;

    // Without a frame source there is nothing to watch
    let source = io::capture::open_source(&settings)
        .inspect_err(|e| log::error!("init ERROR: {:#}", e))?;

    let title = settings.title.clone();
    let resolution = source.resolution();

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([
                (resolution.width as f32 + 260.0).max(800.0),
                (resolution.height as f32 + 120.0).max(600.0),
            ])
            .with_min_inner_size([640.0, 480.0])
            .with_title(&title),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        &title,
        options,
        Box::new(|_cc| Ok(Box::new(CamAlarmApp::new(settings, source)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
