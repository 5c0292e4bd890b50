// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Monitoring: region selection, tick pacing, and the alarm loop.

pub mod alarm_loop;
pub mod clock;
pub mod selector;
