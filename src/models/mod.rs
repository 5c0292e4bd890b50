// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model: geometry, session state, and settings.

pub mod region;
pub mod session;
pub mod settings;
