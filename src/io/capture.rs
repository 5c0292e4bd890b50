// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Live frame sources.
//!
//! This module provides the camera source (OpenCV, behind the
//! `video-opencv` feature) and a still-image source that serves one decoded
//! image as every frame. Both hand out RGBA buffers ready for egui textures
//! and for region extraction.

use crate::models::settings::{Dimensions, Settings, SourceSettings};
use anyhow::{Context, Result};
use image::RgbaImage;
use std::path::{Path, PathBuf};

/// Supplies the current frame once per tick.
pub trait FrameSource {
    /// Read the current frame.
    fn grab(&mut self) -> Result<RgbaImage>;

    /// Native frame size.
    fn resolution(&self) -> Dimensions;

    /// Human-readable name for logs and the status bar.
    fn describe(&self) -> String;
}

/// Serves a single image as a never-changing feed.
pub struct StillImageSource {
    frame: RgbaImage,
    origin: String,
}

impl StillImageSource {
    /// Load an image file.
    pub fn open(path: &Path) -> Result<Self> {
        let frame = image::open(path)
            .with_context(|| format!("Failed to load image {}", path.display()))?
            .to_rgba8();
        log::info!("Loaded image: {} ({}x{})", path.display(), frame.width(), frame.height());
        Ok(Self {
            frame,
            origin: path.display().to_string(),
        })
    }

    pub fn from_image(frame: RgbaImage, origin: impl Into<String>) -> Self {
        Self {
            frame,
            origin: origin.into(),
        }
    }
}

impl FrameSource for StillImageSource {
    fn grab(&mut self) -> Result<RgbaImage> {
        Ok(self.frame.clone())
    }

    fn resolution(&self) -> Dimensions {
        Dimensions::new(self.frame.width(), self.frame.height())
    }

    fn describe(&self) -> String {
        format!("image {}", self.origin)
    }
}

#[cfg(feature = "video-opencv")]
pub use camera::OpencvCamera;

#[cfg(feature = "video-opencv")]
mod camera {
    use super::FrameSource;
    use crate::models::settings::Dimensions;
    use anyhow::{bail, Context, Result};
    use image::RgbaImage;
    use opencv::{core::Mat, imgproc, prelude::*, videoio};

    /// A camera opened through `videoio::VideoCapture`.
    pub struct OpencvCamera {
        index: i32,
        capture: videoio::VideoCapture,
        frame: Mat,
        resolution: Dimensions,
    }

    impl OpencvCamera {
        /// Open camera `index`, asking for the `requested` resolution.
        pub fn open(index: i32, requested: Dimensions) -> Result<Self> {
            let mut capture = videoio::VideoCapture::new(index, videoio::CAP_ANY)
                .with_context(|| format!("Failed to open camera {}", index))?;
            if !capture.is_opened()? {
                bail!("Camera {} could not be opened", index);
            }

            capture.set(videoio::CAP_PROP_FRAME_WIDTH, f64::from(requested.width))?;
            capture.set(videoio::CAP_PROP_FRAME_HEIGHT, f64::from(requested.height))?;

            // The driver may settle on a different mode than requested
            let resolution = Dimensions::new(
                capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as u32,
                capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as u32,
            );
            log::info!(
                "Opened camera {} at {}x{}",
                index,
                resolution.width,
                resolution.height
            );

            Ok(Self {
                index,
                capture,
                frame: Mat::default(),
                resolution,
            })
        }
    }

    impl FrameSource for OpencvCamera {
        fn grab(&mut self) -> Result<RgbaImage> {
            if !self.capture.read(&mut self.frame)? || self.frame.empty() {
                bail!("Camera {} returned no frame", self.index);
            }

            // Convert the OpenCV Mat (BGR) to an RGBA buffer
            let mut rgba = Mat::default();
            imgproc::cvt_color(&self.frame, &mut rgba, imgproc::COLOR_BGR2RGBA, 0)?;

            let (width, height) = (rgba.cols() as u32, rgba.rows() as u32);
            let pixels = rgba.data_bytes()?.to_vec();
            RgbaImage::from_raw(width, height, pixels)
                .context("Camera frame has an unexpected layout")
        }

        fn resolution(&self) -> Dimensions {
            self.resolution
        }

        fn describe(&self) -> String {
            format!("camera {}", self.index)
        }
    }
}

/// Open the source named in the settings.
///
/// Failing to acquire the source is fatal to startup; there is no retry.
pub fn open_source(settings: &Settings) -> Result<Box<dyn FrameSource>> {
    match &settings.source {
        SourceSettings::Image { path } => Ok(Box::new(StillImageSource::open(path)?)),
        #[cfg(feature = "video-opencv")]
        SourceSettings::Camera { index } => {
            Ok(Box::new(OpencvCamera::open(*index, settings.video)?))
        }
        #[cfg(not(feature = "video-opencv"))]
        SourceSettings::Camera { index } => anyhow::bail!(
            "Camera {} needs the video-opencv feature; \
             pass an image file or set source.kind to image",
            index
        ),
    }
}

/// Whether a path looks like an image rather than a settings file.
pub fn is_image_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()).map(str::to_ascii_lowercase).as_deref(),
        Some("jpg" | "jpeg" | "png" | "bmp" | "tiff" | "tif")
    )
}

/// Settings pointing at `path` as the frame source.
pub fn image_source(path: PathBuf) -> SourceSettings {
    SourceSettings::Image { path }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_still_image_serves_same_frame() {
        let frame = RgbaImage::from_pixel(32, 24, Rgba([1, 2, 3, 255]));
        let mut source = StillImageSource::from_image(frame.clone(), "test");

        assert_eq!(source.resolution(), Dimensions::new(32, 24));
        assert_eq!(source.grab().unwrap(), frame);
        assert_eq!(source.grab().unwrap(), frame);
        assert_eq!(source.describe(), "image test");
    }

    #[test]
    fn test_open_missing_image_fails() {
        let settings = Settings {
            source: image_source(PathBuf::from("/nonexistent/frame.png")),
            ..Settings::default()
        };
        assert!(open_source(&settings).is_err());
    }

    #[test]
    fn test_open_image_from_disk() {
        let name = format!("cam_alarm_capture_{}.png", std::process::id());
        let path = std::env::temp_dir().join(name);
        RgbaImage::from_pixel(16, 8, Rgba([200, 10, 10, 255])).save(&path).unwrap();

        let settings = Settings {
            source: image_source(path.clone()),
            ..Settings::default()
        };
        let mut source = open_source(&settings).unwrap();
        assert_eq!(source.resolution(), Dimensions::new(16, 8));
        assert_eq!(source.grab().unwrap().get_pixel(3, 3), &Rgba([200, 10, 10, 255]));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_is_image_path() {
        assert!(is_image_path(Path::new("frame.PNG")));
        assert!(is_image_path(Path::new("dir/shot.jpeg")));
        assert!(!is_image_path(Path::new("settings.yaml")));
        assert!(!is_image_path(Path::new("noext")));
    }
}
