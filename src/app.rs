// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements the
//! egui::App trait. It owns the session state, routes pointer events to the
//! region selector and mask painter, and drives the alarm loop at its
//! target rate by scheduling repaints.

use crate::io::{
    audio::{self, AudioCue},
    capture::{self, FrameSource, StillImageSource},
    serialization,
};
use crate::models::{
    region::Region,
    session::{SessionState, WatchState},
    settings::{Dimensions, Settings},
};
use crate::monitor::{
    alarm_loop::{AlarmLoop, Readout},
    clock::TickClock,
    selector::RegionSelector,
};
use crate::ui::{canvas, template_panel, toolbar};
use crate::vision::{
    mask::MaskPainter,
    matcher::{self, Matcher},
};
use image::RgbaImage;
use std::time::Instant;

/// Background behind the live view.
const IDLE_BACKGROUND: egui::Color32 = egui::Color32::LIGHT_GRAY;
const FLASH_BACKGROUND: egui::Color32 = egui::Color32::RED;

/// Main application state.
pub struct CamAlarmApp {
    settings: Settings,

    /// Shared state read by the loop and mutated by pointer handlers
    session: SessionState,

    selector: RegionSelector,
    painter: MaskPainter,
    alarm_loop: AlarmLoop,
    clock: TickClock,
    matcher: Box<dyn Matcher>,
    source: Box<dyn FrameSource>,
    audio: Box<dyn AudioCue>,

    /// Latest captured frame
    frame: Option<RgbaImage>,

    /// Live view texture for display
    frame_texture: Option<egui::TextureHandle>,

    /// Template preview with the mask tinted on top
    template_texture: Option<egui::TextureHandle>,

    /// Template generation the preview was built from; cleared to force a rebuild
    preview_generation: Option<u64>,

    /// Last once-a-second status
    readout: Option<Readout>,
}

impl CamAlarmApp {
    /// Create the application around an already opened frame source.
    pub fn new(settings: Settings, source: Box<dyn FrameSource>) -> Self {
        log::info!("Watching {} with the {:?} matcher", source.describe(), settings.matcher);

        Self {
            session: SessionState::new(settings.roi_margin, settings.alarm_threshold),
            selector: RegionSelector::new(settings.template_max),
            painter: MaskPainter::new(settings.brush_width, settings.stroke_timeout()),
            alarm_loop: AlarmLoop::new(Instant::now()),
            clock: TickClock::new(settings.tick_period()),
            matcher: matcher::create_matcher(settings.matcher),
            audio: audio::create_cue(&settings),
            source,
            frame: None,
            frame_texture: None,
            template_texture: None,
            preview_generation: None,
            readout: None,
            settings,
        }
    }

    /// Run one alarm loop tick and schedule the next.
    ///
    /// A failed grab still runs the tick so a pending clear is applied.
    fn run_tick(&mut self, ctx: &egui::Context, started: Instant) {
        let frame = match self.source.grab() {
            Ok(frame) => {
                self.upload_frame(ctx, &frame);
                Some(frame)
            }
            Err(e) => {
                log::warn!("Failed to grab frame from {}: {:#}", self.source.describe(), e);
                None
            }
        };

        let outcome = self
            .alarm_loop
            .tick(&mut self.session, frame.as_ref(), self.matcher.as_mut(), started);
        if outcome.play_sound {
            self.audio.play();
        }
        if let Some(readout) = outcome.readout {
            if self.clock.deadline_misses() > 0 {
                log::debug!(
                    "{} ticks overran the {:?} period so far",
                    self.clock.deadline_misses(),
                    self.clock.period()
                );
            }
            self.readout = Some(readout);
        }

        if let Some(frame) = frame {
            self.frame = Some(frame);
        }

        let delay = self.clock.finish_tick(started, Instant::now());
        log::trace!("Next tick in {:?}", delay);
    }

    fn upload_frame(&mut self, ctx: &egui::Context, frame: &RgbaImage) {
        let size = [frame.width() as usize, frame.height() as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, frame.as_raw());

        match &mut self.frame_texture {
            Some(texture) => texture.set(color_image, egui::TextureOptions::LINEAR),
            None => {
                self.frame_texture = Some(ctx.load_texture(
                    "live_view",
                    color_image,
                    egui::TextureOptions::LINEAR,
                ));
            }
        }
    }

    /// Rebuild the template preview if the template or mask changed.
    fn refresh_template_preview(&mut self, ctx: &egui::Context) {
        let generation = self.session.template_generation();
        if self.preview_generation == Some(generation) {
            return;
        }
        self.preview_generation = Some(generation);

        self.template_texture = self.session.template().map(|template| {
            let preview = template_panel::template_preview(template, self.painter.surface());
            ctx.load_texture("template", preview, egui::TextureOptions::NEAREST)
        });
    }

    /// Swap the frame source for a still image picked by the user.
    fn open_image_source(&mut self, path: std::path::PathBuf) {
        match StillImageSource::open(&path) {
            Ok(source) => {
                self.source = Box::new(source);
                self.settings.source = capture::image_source(path);
                self.frame = None;
                self.frame_texture = None;
                self.session.set_rectangle(Region::default());
                self.session.request_clear();
            }
            Err(e) => log::error!("{:#}", e),
        }
    }

    /// Apply settings loaded at runtime. The frame source is kept.
    fn apply_settings(&mut self, settings: Settings) {
        self.session.controls.margin = i32::try_from(settings.roi_margin).unwrap_or(i32::MAX);
        self.session.controls.alarm_threshold = settings.alarm_threshold.min(100) as i32;
        self.selector = RegionSelector::new(settings.template_max);
        self.painter = MaskPainter::new(settings.brush_width, settings.stroke_timeout());
        self.clock = TickClock::new(settings.tick_period());
        self.matcher = matcher::create_matcher(settings.matcher);
        self.audio = audio::create_cue(&settings);
        self.preview_generation = None;

        let source = self.settings.source.clone();
        self.settings = Settings { source, ..settings };
    }

    /// Current settings with the live control values folded in.
    fn current_settings(&self) -> Settings {
        Settings {
            roi_margin: self.session.controls.margin.max(0) as u32,
            alarm_threshold: self.session.controls.threshold(),
            ..self.settings.clone()
        }
    }

    fn frame_size(&self) -> Option<Dimensions> {
        self.frame.as_ref().map(|f| Dimensions::new(f.width(), f.height()))
    }

    fn handle_canvas_action(&mut self, action: canvas::CanvasAction) {
        match action {
            canvas::CanvasAction::PointerDown(pos) => {
                self.selector.pointer_down(&mut self.session, pos);
            }
            canvas::CanvasAction::PointerMove(pos) => {
                self.selector.pointer_move(&mut self.session, pos);
            }
            canvas::CanvasAction::PointerUp => {
                let finalized = match &self.frame {
                    Some(frame) => self.selector.pointer_up(&mut self.session, frame),
                    None => {
                        self.session.end_drag();
                        None
                    }
                };
                if finalized.is_some() {
                    self.painter.sync(&self.session);
                }
            }
            canvas::CanvasAction::None => {}
        }
    }

    fn handle_mask_action(&mut self, action: template_panel::MaskAction) {
        let now = Instant::now();
        match action {
            template_panel::MaskAction::StrokeBegin(pos) => {
                self.painter.stroke_begin(&mut self.session, pos, now);
            }
            template_panel::MaskAction::StrokeExtend(pos) => {
                self.painter.stroke_extend(&mut self.session, pos, now);
            }
            template_panel::MaskAction::StrokeEnd => {
                self.painter.stroke_end();
            }
            template_panel::MaskAction::Dab(pos) => {
                self.painter.stroke_begin(&mut self.session, pos, now);
                self.painter.stroke_end();
            }
            template_panel::MaskAction::ClearMask => {
                self.painter.clear(&mut self.session);
                log::info!("Mask cleared");
            }
            template_panel::MaskAction::None => return,
        }
        self.preview_generation = None;
    }

    fn handle_toolbar_action(&mut self, action: toolbar::ToolbarAction) {
        match action {
            toolbar::ToolbarAction::Clear => {
                self.session.request_clear();
            }
            toolbar::ToolbarAction::ToggleWatch => {
                self.session.toggle_watch();
            }
            toolbar::ToolbarAction::None => {}
        }
    }
}

impl eframe::App for CamAlarmApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        // A stroke whose release event was missed ends on its own
        self.painter.poll_timeout(now);
        self.painter.sync(&self.session);

        if self.clock.is_due(now) {
            self.run_tick(ctx, now);
        }

        self.refresh_template_preview(ctx);

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Image Source...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Images", &["jpg", "jpeg", "png", "bmp", "tiff", "tif"])
                            .pick_file()
                        {
                            self.open_image_source(path);
                        }
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Load Settings...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Settings", &["yaml", "yml", "json"])
                            .pick_file()
                        {
                            match serialization::load_settings(&path) {
                                Ok(settings) => self.apply_settings(settings),
                                Err(e) => log::error!("{:#}", e),
                            }
                        }
                        ui.close_menu();
                    }
                    if ui.button("Export Settings...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Settings", &["yaml", "yml", "json"])
                            .set_file_name("cam_alarm.yaml")
                            .save_file()
                        {
                            let settings = self.current_settings();
                            if let Err(e) = serialization::save_settings(&settings, &path) {
                                log::error!("{:#}", e);
                            }
                        }
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.separator();
                ui.label(egui::RichText::new(&self.settings.title).strong());
            });
        });

        // Toolbar
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, &mut self.session))
            .inner;
        self.handle_toolbar_action(toolbar_action);

        // Status bar
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                match self.readout {
                    Some(readout) => ui.label(format!(
                        "resolution: {}x{} fps: {}",
                        readout.width, readout.height, readout.fps
                    )),
                    None => {
                        let resolution = self.source.resolution();
                        ui.label(format!("resolution: {}x{}", resolution.width, resolution.height))
                    }
                };
                ui.separator();
                ui.label(self.source.describe());
                ui.separator();
                match self.session.watch_state() {
                    WatchState::Watching => ui.label("Watching"),
                    WatchState::Stopped => ui.label("Stopped"),
                };
                if self.session.alarm() {
                    ui.separator();
                    ui.label(egui::RichText::new("ALARM").strong().color(FLASH_BACKGROUND));
                }
            });
        });

        // Template and mask panel (right side)
        let template_size = self.session.template().map(|t| t.dimensions());
        let mask_action = egui::SidePanel::right("template")
            .default_width(220.0)
            .show(ctx, |ui| {
                template_panel::show(
                    ui,
                    &self.template_texture,
                    template_size,
                    self.session.mask().is_some(),
                )
            })
            .inner;
        self.handle_mask_action(mask_action);

        // Live view (center), flashing while the alarm is raised
        let background = if self.session.flash_on() {
            FLASH_BACKGROUND
        } else {
            IDLE_BACKGROUND
        };
        let frame_size = self.frame_size();
        let canvas_action = egui::CentralPanel::default()
            .frame(egui::Frame::central_panel(&ctx.style()).fill(background))
            .show(ctx, |ui| canvas::show(ui, &self.frame_texture, frame_size, &self.session))
            .inner;
        self.handle_canvas_action(canvas_action);

        ctx.request_repaint_after(self.clock.until_due(Instant::now()));
    }
}
