// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application settings.
//!
//! Settings are loaded once at startup (see `io::serialization`) and every
//! field falls back to its default, so a settings file only needs to name
//! what it changes.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const APP_NAME: &str = "Cam_alarm v. 1.1";

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Where live frames come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceSettings {
    /// A camera opened through OpenCV (`video-opencv` feature).
    Camera { index: i32 },
    /// A still image served as every frame.
    Image { path: PathBuf },
}

/// Which template matcher scores the search window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatcherKind {
    /// Built-in masked zero-mean normalized cross-correlation.
    Zncc,
    /// OpenCV `TM_CCOEFF_NORMED` (`video-opencv` feature).
    Opencv,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub title: String,
    /// Requested capture resolution.
    pub video: Dimensions,
    /// Target rate of the alarm loop.
    pub fps: u32,
    /// Largest template canvas; bigger selections are scaled down to fit.
    pub template_max: Dimensions,
    /// Initial search margin around the selection, in pixels.
    pub roi_margin: u32,
    /// Initial alarm threshold, in percent.
    pub alarm_threshold: u32,
    /// Width of a mask brush stroke, in template pixels.
    pub brush_width: u32,
    /// Inactivity after which an unfinished mask stroke is released.
    pub stroke_timeout_ms: u64,
    pub source: SourceSettings,
    pub matcher: MatcherKind,
    /// Audio file played on each alarm flash (`sound` feature).
    pub alarm_sound: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: APP_NAME.to_string(),
            video: Dimensions::new(640, 480),
            fps: 30,
            template_max: Dimensions::new(180, 180),
            roi_margin: 10,
            alarm_threshold: 80,
            brush_width: 8,
            stroke_timeout_ms: 2000,
            source: SourceSettings::Camera { index: 0 },
            matcher: MatcherKind::Zncc,
            alarm_sound: None,
        }
    }
}

impl Settings {
    /// Target tick period, `1000 / fps` milliseconds.
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.fps.max(1)))
    }

    pub fn stroke_timeout(&self) -> Duration {
        Duration::from_millis(self.stroke_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.video, Dimensions::new(640, 480));
        assert_eq!(settings.template_max, Dimensions::new(180, 180));
        assert_eq!(settings.tick_period(), Duration::from_millis(33));
        assert_eq!(settings.stroke_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "fps: 10\nsource:\n  kind: image\n  path: frame.png\n";
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(settings.fps, 10);
        assert_eq!(settings.tick_period(), Duration::from_millis(100));
        assert_eq!(
            settings.source,
            SourceSettings::Image {
                path: PathBuf::from("frame.png")
            }
        );
        assert_eq!(settings.alarm_threshold, 80);
        assert_eq!(settings.matcher, MatcherKind::Zncc);
    }

    #[test]
    fn test_zero_fps_does_not_divide_by_zero() {
        let settings = Settings {
            fps: 0,
            ..Settings::default()
        };
        assert_eq!(settings.tick_period(), Duration::from_secs(1));
    }
}
