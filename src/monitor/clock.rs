// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Tick pacing for the alarm loop.
//!
//! The loop targets a fixed period. After each tick the next one is
//! scheduled `max(0, period - elapsed)` later, so slow ticks run back to
//! back and fast ones never run ahead of the target rate.

use std::time::{Duration, Instant};

/// Self-correcting fixed-rate timer.
#[derive(Debug)]
pub struct TickClock {
    period: Duration,
    next_due: Option<Instant>,
    deadline_misses: u64,
}

impl TickClock {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
            deadline_misses: 0,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Delay before the next tick, given how long this one took.
    pub fn remaining(&self, elapsed: Duration) -> Duration {
        self.period.saturating_sub(elapsed)
    }

    /// Whether a tick should run at `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        self.next_due.map_or(true, |due| now >= due)
    }

    /// Time left until the next tick is due.
    pub fn until_due(&self, now: Instant) -> Duration {
        self.next_due
            .map_or(Duration::ZERO, |due| due.saturating_duration_since(now))
    }

    /// Schedule the next tick after one that ran from `started` to `finished`.
    ///
    /// Returns the delay until the next tick.
    pub fn finish_tick(&mut self, started: Instant, finished: Instant) -> Duration {
        let elapsed = finished.saturating_duration_since(started);
        if elapsed > self.period {
            self.deadline_misses += 1;
        }
        let delay = self.remaining(elapsed);
        self.next_due = Some(finished + delay);
        delay
    }

    pub fn deadline_misses(&self) -> u64 {
        self.deadline_misses
    }
}

/// Counts ticks and reports once per second.
#[derive(Debug)]
pub struct SecondCounter {
    frames: u32,
    began: Instant,
}

impl SecondCounter {
    pub fn new(now: Instant) -> Self {
        Self { frames: 0, began: now }
    }

    /// Count one tick. Returns the tick count of the last second when a
    /// full second has passed, then starts a new one.
    pub fn record(&mut self, now: Instant) -> Option<u32> {
        self.frames += 1;
        if now.saturating_duration_since(self.began) < Duration::from_secs(1) {
            return None;
        }
        let frames = std::mem::take(&mut self.frames);
        self.began = now;
        Some(frames)
    }
}
