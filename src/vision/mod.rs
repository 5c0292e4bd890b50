// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image processing: reference extraction, mask painting, and template
//! matching.

pub mod mask;
pub mod matcher;
#[cfg(feature = "video-opencv")]
pub mod opencv_matcher;
pub mod reference;
pub mod zncc;
