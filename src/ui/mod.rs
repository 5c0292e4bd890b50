// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the camera alarm.

pub mod canvas;
pub mod template_panel;
pub mod toolbar;
