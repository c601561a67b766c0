// DFP Harness - Decimal Floating-Point Smoke Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

pub mod harness;
pub mod metrics;
pub mod serial;


pub use harness::{Harness, IterationReport, RunSummary, StopHandle};
pub use serial::{open_channel, CaptureSerial, ConsoleSerial, PortSerial, SerialChannel};

use dfp_decimal::DecimalError;

#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("Operand '{operand}' is not a decimal literal")]
    Literal {
        operand: &'static str,
        #[source]
        source: DecimalError,
    },
    #[error("Serial write failed")]
    Io(#[from] std::io::Error),
    #[error("Failed to open serial port {port}")]
    Serial {
        port: String,
        #[source]
        source: serialport::Error,
    },
    #[error("Invalid harness configuration: {0}")]
    Config(String),
}

pub type HarnessResult<T> = Result<T, HarnessError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// A [`StopHandle`] asked the loop to stop.
    Requested,
    MaxIterations,
    MaxOutputBytes,
}

/// Hooks for watching the loop without touching its output.
pub trait HarnessObserver: std::fmt::Debug + Send + Sync {
    fn on_start(&self) {}
    fn on_iteration(&self, _report: &IterationReport) {}
    fn on_stop(&self, _reason: StopReason) {}
}
