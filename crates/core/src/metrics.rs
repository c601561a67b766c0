// DFP Harness - Decimal Floating-Point Smoke Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::harness::IterationReport;
use crate::{HarnessObserver, StopReason};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

#[derive(Debug)]
pub struct HarnessMetrics {
    iteration_count: AtomicU64,
    byte_count: AtomicU64,
    flagged_count: AtomicU64,
    last_stop: Mutex<Option<StopReason>>,
    start_time: Instant,
}

impl Default for HarnessMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl HarnessMetrics {
    pub fn new() -> Self {
        Self {
            iteration_count: AtomicU64::new(0),
            byte_count: AtomicU64::new(0),
            flagged_count: AtomicU64::new(0),
            last_stop: Mutex::new(None),
            start_time: Instant::now(),
        }
    }

    pub fn reset(&self) {
        self.iteration_count.store(0, Ordering::SeqCst);
        self.byte_count.store(0, Ordering::SeqCst);
        self.flagged_count.store(0, Ordering::SeqCst);
        if let Ok(mut s) = self.last_stop.lock() {
            *s = None;
        }
    }

    pub fn get_iterations(&self) -> u64 {
        self.iteration_count.load(Ordering::SeqCst)
    }

    pub fn get_bytes(&self) -> u64 {
        self.byte_count.load(Ordering::SeqCst)
    }

    pub fn get_flagged(&self) -> u64 {
        self.flagged_count.load(Ordering::SeqCst)
    }

    pub fn last_stop(&self) -> Option<StopReason> {
        self.last_stop.lock().ok().and_then(|s| *s)
    }

    pub fn get_iterations_per_sec(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.get_iterations() as f64 / elapsed
        } else {
            0.0
        }
    }
}

impl HarnessObserver for HarnessMetrics {
    fn on_iteration(&self, report: &IterationReport) {
        self.iteration_count.fetch_add(1, Ordering::SeqCst);
        self.byte_count.fetch_add(report.bytes, Ordering::SeqCst);
        if !report.flags.is_empty() {
            self.flagged_count.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn on_stop(&self, reason: StopReason) {
        if let Ok(mut s) = self.last_stop.lock() {
            *s = Some(reason);
        }
    }
}
