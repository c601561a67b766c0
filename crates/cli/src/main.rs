// DFP Harness - Decimal Floating-Point Smoke Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand};
use dfp_config::HarnessConfig;
use dfp_core::metrics::HarnessMetrics;
use dfp_core::{open_channel, CaptureSerial, Harness};
use dfp_decimal::{Context, RoundingMode, StatusFlags};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

const EXIT_PASS: u8 = 0;
const EXIT_ASSERT_FAIL: u8 = 1;
const EXIT_CONFIG_ERROR: u8 = 2;
const EXIT_RUNTIME_ERROR: u8 = 3;

const RESULT_SCHEMA_VERSION: &str = "1.0";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Decimal128 Serial Smoke Harness",
    long_about = None
)]
struct Cli {
    /// Path to the harness config (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the sum line forever (or until a limit is hit). Default command.
    Run(RunArgs),

    /// Run a single iteration and compare the sum with the expected string.
    Check(CheckArgs),

    /// Add two literals once and report the result and raised flags.
    Eval(EvalArgs),
}

/// Overrides applied on top of the config file.
#[derive(Args, Debug, Default, Clone)]
struct OverrideArgs {
    /// Serial device path (omit to write to stdout)
    #[arg(long)]
    port: Option<String>,

    /// Serial baud rate (default: 115200)
    #[arg(long)]
    baud: Option<u32>,

    /// Left operand literal (default: 123.456)
    #[arg(long, allow_hyphen_values = true)]
    lhs: Option<String>,

    /// Right operand literal (default: 78.9)
    #[arg(long, allow_hyphen_values = true)]
    rhs: Option<String>,

    /// Rounding mode: nearest_even, nearest_away, toward_zero, upward, downward
    #[arg(long)]
    rounding: Option<RoundingMode>,
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    #[command(flatten)]
    overrides: OverrideArgs,

    /// Pause between iterations in milliseconds (default: 1)
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Stop after this many iterations (default: run forever)
    #[arg(long)]
    iterations: Option<u64>,

    /// Stop once this much output was written, e.g. "64KB"
    #[arg(long)]
    max_output: Option<String>,

    /// Do not print the banner line at startup
    #[arg(long)]
    no_banner: bool,
}

#[derive(Args, Debug)]
struct CheckArgs {
    #[command(flatten)]
    overrides: OverrideArgs,

    /// Expected formatted sum (default: config `expect`, else 202.356)
    #[arg(long, allow_hyphen_values = true)]
    expect: Option<String>,

    /// Print a JSON result instead of echoing the serial line
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct EvalArgs {
    #[arg(allow_hyphen_values = true)]
    lhs: String,

    #[arg(allow_hyphen_values = true)]
    rhs: String,

    /// Rounding mode (default: nearest_even)
    #[arg(long)]
    rounding: Option<RoundingMode>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    result_schema_version: String,
    status: String,
    line: String,
    expected: String,
    actual: String,
    bid: String,
    flags: Vec<String>,
}

#[derive(Debug, Serialize)]
struct EvalResult {
    lhs: String,
    rhs: String,
    rounding: RoundingMode,
    sum: String,
    bid: String,
    flags: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only serial output.
    let level = if cli.trace {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Some(Commands::Run(args)) => run_loop(config_path, args),
        Some(Commands::Check(args)) => run_check(config_path, args),
        Some(Commands::Eval(args)) => run_eval(args),
        None => run_loop(config_path, RunArgs::default()),
    }
}

fn load_config(path: Option<&Path>) -> Result<HarnessConfig> {
    match path {
        Some(path) => HarnessConfig::from_file(path),
        None => Ok(HarnessConfig::default()),
    }
}

fn apply_overrides(config: &mut HarnessConfig, overrides: &OverrideArgs) {
    if let Some(port) = &overrides.port {
        config.serial.port = Some(port.clone());
    }
    if let Some(baud) = overrides.baud {
        config.serial.baud_rate = baud;
    }
    if let Some(lhs) = &overrides.lhs {
        config.operands.lhs = lhs.clone();
    }
    if let Some(rhs) = &overrides.rhs {
        config.operands.rhs = rhs.clone();
    }
    if let Some(rounding) = overrides.rounding {
        config.rounding = rounding;
    }
}

fn build_run_config(path: Option<&Path>, args: &RunArgs) -> Result<HarnessConfig> {
    let mut config = load_config(path)?;
    apply_overrides(&mut config, &args.overrides);
    if let Some(delay_ms) = args.delay_ms {
        config.pacing.delay_ms = delay_ms;
    }
    if let Some(iterations) = args.iterations {
        config.limits.max_iterations = Some(iterations);
    }
    if let Some(max_output) = &args.max_output {
        config.limits.max_output = Some(max_output.clone());
    }
    if args.no_banner {
        config.banner = false;
    }
    config
        .validate()
        .context("Invalid harness configuration after command-line overrides")?;
    Ok(config)
}

fn run_loop(path: Option<&Path>, args: RunArgs) -> ExitCode {
    let config = match build_run_config(path, &args) {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let channel = match open_channel(&config.serial) {
        Ok(channel) => channel,
        Err(e) => {
            error!("{:#}", anyhow::Error::from(e));
            return ExitCode::from(EXIT_RUNTIME_ERROR);
        }
    };

    let mut harness = match Harness::new(channel, &config) {
        Ok(h) => h,
        Err(e) => {
            error!("{:#}", anyhow::Error::from(e));
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };
    let metrics = Arc::new(HarnessMetrics::new());
    harness.add_observer(metrics.clone());

    info!(
        "Adding {} + {} every {} ms (rounding: {})",
        config.operands.lhs, config.operands.rhs, config.pacing.delay_ms, config.rounding
    );

    match harness.run() {
        Ok(summary) => {
            info!(
                "Finished: {} iterations, {} bytes, {} flagged, {:.0} iterations/s",
                summary.iterations,
                summary.bytes_written,
                summary.flagged_iterations,
                metrics.get_iterations_per_sec()
            );
            ExitCode::from(EXIT_PASS)
        }
        Err(e) => {
            error!("{:#}", anyhow::Error::from(e));
            ExitCode::from(EXIT_RUNTIME_ERROR)
        }
    }
}

fn run_check(path: Option<&Path>, args: CheckArgs) -> ExitCode {
    let config = match load_config(path).and_then(|mut config| {
        apply_overrides(&mut config, &args.overrides);
        if let Some(expect) = &args.expect {
            config.expect = Some(expect.clone());
        }
        config.banner = false;
        config
            .validate()
            .context("Invalid harness configuration after command-line overrides")?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let serial = CaptureSerial::new(config.serial.baud_rate).with_echo(!args.json);
    let mut harness = match Harness::new(serial, &config) {
        Ok(h) => h,
        Err(e) => {
            error!("{:#}", anyhow::Error::from(e));
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let report = match harness.setup().and_then(|_| harness.step()) {
        Ok(report) => report,
        Err(e) => {
            error!("{:#}", anyhow::Error::from(e));
            return ExitCode::from(EXIT_RUNTIME_ERROR);
        }
    };

    let expected = config.expected_sum().to_string();
    let actual = report.sum.to_string();
    let passed = actual == expected;

    if args.json {
        let result = CheckResult {
            result_schema_version: RESULT_SCHEMA_VERSION.to_string(),
            status: if passed { "pass" } else { "fail" }.to_string(),
            line: report.line.clone(),
            expected: expected.clone(),
            actual: actual.clone(),
            bid: report.sum.to_bid_string(),
            flags: flag_names(report.flags),
        };
        match serde_json::to_string(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize check result: {}", e);
                return ExitCode::from(EXIT_RUNTIME_ERROR);
            }
        }
    }

    if passed {
        info!("PASS: {} == {}", actual, expected);
        ExitCode::from(EXIT_PASS)
    } else {
        error!("FAIL: expected {}, got {}", expected, actual);
        ExitCode::from(EXIT_ASSERT_FAIL)
    }
}

fn run_eval(args: EvalArgs) -> ExitCode {
    let rounding = args.rounding.unwrap_or_default();
    let mut ctx = Context::new(rounding);

    let operands = ctx
        .parse(&args.lhs)
        .with_context(|| format!("Invalid left operand '{}'", args.lhs))
        .and_then(|lhs| {
            ctx.parse(&args.rhs)
                .with_context(|| format!("Invalid right operand '{}'", args.rhs))
                .map(|rhs| (lhs, rhs))
        });
    let (lhs, rhs) = match operands {
        Ok(pair) => pair,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let sum = ctx.add(lhs, rhs);
    let flags = ctx.take_flags();

    if args.json {
        let result = EvalResult {
            lhs: args.lhs,
            rhs: args.rhs,
            rounding,
            sum: sum.to_string(),
            bid: sum.to_bid_string(),
            flags: flag_names(flags),
        };
        match serde_json::to_string(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize eval result: {}", e);
                return ExitCode::from(EXIT_RUNTIME_ERROR);
            }
        }
    } else {
        println!("{} + {} = {}", args.lhs, args.rhs, sum);
        println!("bid: {}", sum.to_bid_string());
        if !flags.is_empty() {
            println!("flags: {}", flag_names(flags).join(" | "));
        }
    }
    ExitCode::from(EXIT_PASS)
}

fn flag_names(flags: StatusFlags) -> Vec<String> {
    flags
        .iter_names()
        .map(|(name, _)| name.to_string())
        .collect()
}
