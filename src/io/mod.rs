// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O: frame capture, the alarm sound, and settings files.

pub mod audio;
pub mod capture;
pub mod serialization;
