// DFP Harness - Decimal Floating-Point Smoke Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! The smoke-test loop: parse both operands, add, format, emit one line,
//! pause, repeat.

use crate::serial::SerialChannel;
use crate::{HarnessError, HarnessObserver, HarnessResult, StopReason};
use dfp_config::{HarnessConfig, Operands};
use dfp_decimal::{Bid128, Context, StatusFlags};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const BANNER: &str = "=== Decimal128 Arithmetic Smoke Test ===";

/// Cloneable flag another thread can use to end [`Harness::run`].
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of a single loop iteration.
#[derive(Debug, Clone)]
pub struct IterationReport {
    /// 1-based.
    pub iteration: u64,
    /// The emitted line, without the trailing newline.
    pub line: String,
    pub sum: Bid128,
    pub flags: StatusFlags,
    /// Bytes written to the channel for this line.
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RunSummary {
    pub iterations: u64,
    pub bytes_written: u64,
    pub flagged_iterations: u64,
    pub stop_reason: StopReason,
}

pub struct Harness<C: SerialChannel> {
    channel: C,
    operands: Operands,
    context: Context,
    pacing: Duration,
    max_iterations: Option<u64>,
    max_output_bytes: Option<u64>,
    banner: bool,
    observers: Vec<Arc<dyn HarnessObserver>>,
    stop: StopHandle,

    iterations: u64,
    bytes_written: u64,
    flagged_iterations: u64,
}

impl<C: SerialChannel> Harness<C> {
    pub fn new(channel: C, config: &HarnessConfig) -> HarnessResult<Self> {
        let max_output_bytes = config
            .max_output_bytes()
            .map_err(|e| HarnessError::Config(format!("{:#}", e)))?;

        Ok(Self {
            channel,
            operands: config.operands.clone(),
            context: Context::new(config.rounding),
            pacing: config.pacing_delay(),
            max_iterations: config.limits.max_iterations,
            max_output_bytes,
            banner: config.banner,
            observers: Vec::new(),
            stop: StopHandle::default(),
            iterations: 0,
            bytes_written: 0,
            flagged_iterations: 0,
        })
    }

    pub fn add_observer(&mut self, observer: Arc<dyn HarnessObserver>) {
        self.observers.push(observer);
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn into_channel(self) -> C {
        self.channel
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Announces the channel and writes the banner, if enabled.
    pub fn setup(&mut self) -> HarnessResult<()> {
        info!(
            "Serial channel {} open at {} baud",
            self.channel.describe(),
            self.channel.baud_rate()
        );
        if self.banner {
            self.emit(BANNER)?;
        }
        for observer in &self.observers {
            observer.on_start();
        }
        Ok(())
    }

    /// Runs one loop body and writes exactly one line.
    pub fn step(&mut self) -> HarnessResult<IterationReport> {
        // Flags left by a failed step belong to no iteration.
        self.context.clear_flags();
        let lhs = self
            .context
            .parse(&self.operands.lhs)
            .map_err(|source| HarnessError::Literal {
                operand: "lhs",
                source,
            })?;
        let rhs = self
            .context
            .parse(&self.operands.rhs)
            .map_err(|source| HarnessError::Literal {
                operand: "rhs",
                source,
            })?;
        let sum = self.context.add(lhs, rhs);
        let flags = self.context.take_flags();

        let line = format!("{} + {} = {}", self.operands.lhs, self.operands.rhs, sum);
        let bytes = self.emit(&line)?;
        self.iterations += 1;

        if !flags.is_empty() {
            self.flagged_iterations += 1;
            warn!(
                iteration = self.iterations,
                ?flags,
                "Decimal status flags raised: {}",
                line
            );
        }
        debug!(iteration = self.iterations, %sum, "Iteration complete");

        let report = IterationReport {
            iteration: self.iterations,
            line,
            sum,
            flags,
            bytes,
        };
        for observer in &self.observers {
            observer.on_iteration(&report);
        }
        Ok(report)
    }

    /// Loops until a stop is requested or a configured limit is reached.
    /// Without limits this only returns on error or external request.
    pub fn run(&mut self) -> HarnessResult<RunSummary> {
        self.setup()?;

        let stop_reason = loop {
            if self.stop.is_requested() {
                break StopReason::Requested;
            }

            self.step()?;

            if self.max_iterations.is_some_and(|max| self.iterations >= max) {
                break StopReason::MaxIterations;
            }
            if self
                .max_output_bytes
                .is_some_and(|max| self.bytes_written >= max)
            {
                break StopReason::MaxOutputBytes;
            }

            if !self.pacing.is_zero() {
                std::thread::sleep(self.pacing);
            }
        };

        info!(
            "Harness stopped after {} iterations ({:?})",
            self.iterations, stop_reason
        );
        for observer in &self.observers {
            observer.on_stop(stop_reason);
        }

        Ok(RunSummary {
            iterations: self.iterations,
            bytes_written: self.bytes_written,
            flagged_iterations: self.flagged_iterations,
            stop_reason,
        })
    }

    fn emit(&mut self, line: &str) -> HarnessResult<u64> {
        self.channel.write_all(line.as_bytes())?;
        self.channel.write_all(b"\n")?;
        self.channel.flush()?;
        let bytes = line.len() as u64 + 1;
        self.bytes_written += bytes;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CaptureSerial;

    #[test]
    fn test_failed_step_does_not_leak_flags() {
        let config = HarnessConfig {
            operands: Operands {
                lhs: "1.00000000000000000000000000000000001".to_string(),
                rhs: "n/a".to_string(),
            },
            banner: false,
            ..HarnessConfig::default()
        };
        let mut h = Harness::new(CaptureSerial::new(115_200), &config).unwrap();
        assert!(matches!(
            h.step(),
            Err(HarnessError::Literal { operand: "rhs", .. })
        ));
        assert_eq!(h.context.flags(), StatusFlags::INEXACT);

        h.operands = Operands::default();
        let report = h.step().unwrap();
        assert!(report.flags.is_empty());
        assert_eq!(h.flagged_iterations, 0);
    }
}
