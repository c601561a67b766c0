// DFP Harness - Decimal Floating-Point Smoke Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::{Context, Result};
use dfp_decimal::{Bid128, RoundingMode};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const SCHEMA_VERSION: &str = "1.0";
pub const DEFAULT_BAUD_RATE: u32 = 115_200;
pub const DEFAULT_LHS: &str = "123.456";
pub const DEFAULT_RHS: &str = "78.9";
/// Sum of [`DEFAULT_LHS`] and [`DEFAULT_RHS`].
pub const DEFAULT_EXPECTED: &str = "202.356";
pub const DEFAULT_DELAY_MS: u64 = 1;
pub const DEFAULT_WRITE_TIMEOUT_MS: u64 = 100;

/// Default schema version for YAML configs
fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SerialConfig {
    /// Serial device path. `None` writes to stdout.
    pub port: Option<String>,
    pub baud_rate: u32,
    pub write_timeout_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            write_timeout_ms: DEFAULT_WRITE_TIMEOUT_MS,
        }
    }
}

impl SerialConfig {
    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

/// Literal text of both addends. The text is echoed verbatim on every line.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Operands {
    pub lhs: String,
    pub rhs: String,
}

impl Default for Operands {
    fn default() -> Self {
        Self {
            lhs: DEFAULT_LHS.to_string(),
            rhs: DEFAULT_RHS.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Pacing {
    pub delay_ms: u64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_DELAY_MS,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RunLimits {
    /// Unbounded when absent.
    pub max_iterations: Option<u64>,
    /// Output budget as a human-readable size, e.g. "64KB".
    pub max_output: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub operands: Operands,
    #[serde(default)]
    pub rounding: RoundingMode,
    #[serde(default)]
    pub pacing: Pacing,
    #[serde(default)]
    pub limits: RunLimits,
    /// Expected formatted sum, checked by `dfp-harness check`.
    #[serde(default)]
    pub expect: Option<String>,
    /// Print a banner line once the channel is open.
    #[serde(default = "default_true")]
    pub banner: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            serial: SerialConfig::default(),
            operands: Operands::default(),
            rounding: RoundingMode::default(),
            pacing: Pacing::default(),
            limits: RunLimits::default(),
            expect: None,
            banner: true,
        }
    }
}

impl HarnessConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read harness config at {:?}", path))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Invalid harness config {:?}", path))?;
        tracing::debug!("Loaded harness config from {:?}", path);
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(yaml).context("Failed to parse harness config YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.schema_version != SCHEMA_VERSION {
            anyhow::bail!(
                "Unsupported schema_version '{}'. Supported versions: '{}'",
                self.schema_version,
                SCHEMA_VERSION
            );
        }

        if self.serial.baud_rate == 0 {
            anyhow::bail!("Serial 'baud_rate' must be greater than zero");
        }

        if let Some(port) = &self.serial.port {
            if port.trim().is_empty() {
                anyhow::bail!("Serial 'port' cannot be empty; omit it to write to stdout");
            }
        }

        parse_literal("operands.lhs", &self.operands.lhs)?;
        parse_literal("operands.rhs", &self.operands.rhs)?;
        if let Some(expect) = &self.expect {
            parse_literal("expect", expect)?;
        }

        if self.limits.max_iterations == Some(0) {
            anyhow::bail!("Limit 'max_iterations' must be greater than zero");
        }
        if self.max_output_bytes()? == Some(0) {
            anyhow::bail!("Limit 'max_output' must be greater than zero");
        }

        Ok(())
    }

    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.pacing.delay_ms)
    }

    pub fn max_output_bytes(&self) -> Result<Option<u64>> {
        self.limits
            .max_output
            .as_deref()
            .map(|s| parse_size(s).with_context(|| format!("Invalid limit 'max_output': {}", s)))
            .transpose()
    }

    /// The expected sum, falling back to [`DEFAULT_EXPECTED`].
    pub fn expected_sum(&self) -> &str {
        self.expect.as_deref().unwrap_or(DEFAULT_EXPECTED)
    }
}

fn parse_literal(field: &str, literal: &str) -> Result<Bid128> {
    literal
        .parse::<Bid128>()
        .with_context(|| format!("Field '{}' is not a decimal literal", field))
}

pub fn parse_size(size_str: &str) -> Result<u64> {
    use human_size::{Byte, Size, SpecificSize};
    let s: Size = size_str
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid size format: {}", e))?;
    let bytes: SpecificSize<Byte> = s.into();
    Ok(bytes.value() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn test_valid_config() {
        let yaml = r#"
schema_version: "1.0"
serial:
  port: "/dev/ttyUSB0"
  baud_rate: 9600
operands:
  lhs: "1.5"
  rhs: "2.25"
rounding: toward_zero
pacing:
  delay_ms: 10
limits:
  max_iterations: 5
  max_output: "4KB"
expect: "3.75"
banner: false
"#;
        let config = HarnessConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.serial.port.as_deref(), Some("/dev/ttyUSB0"));
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.serial.write_timeout_ms, DEFAULT_WRITE_TIMEOUT_MS);
        assert_eq!(config.rounding, RoundingMode::TowardZero);
        assert_eq!(config.pacing_delay(), Duration::from_millis(10));
        assert_eq!(config.limits.max_iterations, Some(5));
        assert_eq!(config.max_output_bytes().unwrap(), Some(4000));
        assert_eq!(config.expected_sum(), "3.75");
        assert!(!config.banner);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = HarnessConfig::from_yaml("{}").unwrap();
        assert_eq!(config, HarnessConfig::default());
        assert_eq!(config.serial.baud_rate, 115_200);
        assert_eq!(config.operands.lhs, "123.456");
        assert_eq!(config.operands.rhs, "78.9");
        assert_eq!(config.pacing_delay(), Duration::from_millis(1));
        assert_eq!(config.limits.max_iterations, None);
        assert_eq!(config.expected_sum(), "202.356");
        assert!(config.banner);
    }

    #[test]
    fn test_invalid_version() {
        let err = HarnessConfig::from_yaml("schema_version: \"2.0\"").unwrap_err();
        assert!(err.to_string().contains("Unsupported schema_version"));
    }

    #[test]
    fn test_zero_baud_rate() {
        let yaml = r#"
serial:
  baud_rate: 0
"#;
        let err = HarnessConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("baud_rate"));
    }

    #[test]
    fn test_empty_port() {
        let yaml = r#"
serial:
  port: "  "
"#;
        let err = HarnessConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("port"));
    }

    #[test]
    fn test_malformed_operand() {
        let yaml = r#"
operands:
  lhs: "12.3.4"
"#;
        let err = HarnessConfig::from_yaml(yaml).unwrap_err();
        assert!(format!("{:#}", err).contains("operands.lhs"));
        assert!(format!("{:#}", err).contains("12.3.4"));
    }

    #[test]
    fn test_zero_max_iterations() {
        let yaml = r#"
limits:
  max_iterations: 0
"#;
        let err = HarnessConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("max_iterations"));
    }

    #[test]
    fn test_bad_max_output() {
        let yaml = r#"
limits:
  max_output: "lots"
"#;
        let err = HarnessConfig::from_yaml(yaml).unwrap_err();
        assert!(format!("{:#}", err).contains("max_output"));
    }

    #[test]
    fn test_zero_max_output() {
        let yaml = r#"
limits:
  max_output: "0B"
"#;
        let err = HarnessConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("max_output"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = r#"
serial:
  parity: even
"#;
        assert!(HarnessConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_unknown_rounding_rejected() {
        assert!(HarnessConfig::from_yaml("rounding: sideways").is_err());
    }

    fn write_temp_file(prefix: &str, contents: &str) -> std::path::PathBuf {
        let mut dir = std::env::temp_dir();
        dir.push("dfp-config-tests");
        let _ = std::fs::create_dir_all(&dir);

        let nonce = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = dir.join(format!("{}-{}.yaml", prefix, nonce));
        std::fs::write(&path, contents).expect("Failed to write temp file");
        path
    }

    #[test]
    fn test_from_file() {
        let path = write_temp_file(
            "harness",
            r#"
schema_version: "1.0"
pacing:
  delay_ms: 0
"#,
        );
        let config = HarnessConfig::from_file(&path).unwrap();
        assert_eq!(config.pacing.delay_ms, 0);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_from_missing_file() {
        let err = HarnessConfig::from_file("/nonexistent/dfp-harness.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read harness config"));
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("1KB").unwrap(), 1000);
        assert_eq!(parse_size("2KiB").unwrap(), 2048);
        assert!(parse_size("many").is_err());
    }
}
