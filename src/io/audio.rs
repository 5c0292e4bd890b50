// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Alarm sound cue.
//!
//! Playback is fire-and-forget: the alarm loop never waits for or inspects
//! the result of a cue.

use crate::models::settings::Settings;
use std::io::Write;

pub trait AudioCue {
    fn play(&mut self);
}

/// Rings the terminal bell.
pub struct TerminalBell;

impl AudioCue for TerminalBell {
    fn play(&mut self) {
        let mut stderr = std::io::stderr();
        if let Err(e) = stderr.write_all(b"\x07").and_then(|_| stderr.flush()) {
            log::debug!("Terminal bell failed: {}", e);
        }
    }
}

#[cfg(feature = "sound")]
pub use sound_file::SoundFile;

#[cfg(feature = "sound")]
mod sound_file {
    use super::AudioCue;
    use anyhow::{Context, Result};
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Source};
    use std::io::Cursor;
    use std::path::Path;
    use std::sync::Arc;

    /// Plays an audio file through the default output device.
    pub struct SoundFile {
        // Dropping the stream silences every sound played through it
        _stream: OutputStream,
        handle: OutputStreamHandle,
        bytes: Arc<[u8]>,
    }

    impl SoundFile {
        pub fn open(path: &Path) -> Result<Self> {
            let bytes: Arc<[u8]> = std::fs::read(path)
                .with_context(|| format!("Failed to read alarm sound {}", path.display()))?
                .into();
            Decoder::new(Cursor::new(bytes.clone()))
                .with_context(|| format!("Unsupported alarm sound {}", path.display()))?;

            let (stream, handle) = OutputStream::try_default().context("No audio output device")?;
            log::info!("Loaded alarm sound: {}", path.display());

            Ok(Self {
                _stream: stream,
                handle,
                bytes,
            })
        }
    }

    impl AudioCue for SoundFile {
        fn play(&mut self) {
            let result = Decoder::new(Cursor::new(self.bytes.clone()))
                .map_err(anyhow::Error::from)
                .and_then(|source| {
                    self.handle
                        .play_raw(source.convert_samples())
                        .map_err(anyhow::Error::from)
                });
            if let Err(e) = result {
                log::warn!("Failed to play alarm sound: {:#}", e);
            }
        }
    }
}

/// The configured cue, falling back to the terminal bell.
pub fn create_cue(settings: &Settings) -> Box<dyn AudioCue> {
    #[cfg(feature = "sound")]
    {
        if let Some(path) = &settings.alarm_sound {
            match SoundFile::open(path) {
                Ok(sound) => return Box::new(sound),
                Err(e) => log::warn!("{:#}; using the terminal bell", e),
            }
        }
    }

    #[cfg(not(feature = "sound"))]
    {
        if settings.alarm_sound.is_some() {
            log::warn!(
                "Alarm sound configured but the sound feature is disabled; using the terminal bell"
            );
        }
    }

    Box::new(TerminalBell)
}
