// DFP Harness - Decimal Floating-Point Smoke Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::{HarnessError, HarnessResult};
use dfp_config::SerialConfig;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Byte-oriented text output with a nominal line rate.
pub trait SerialChannel: Write + Send {
    fn baud_rate(&self) -> u32;

    /// Human-readable name for logs, e.g. `stdout` or `/dev/ttyUSB0`.
    fn describe(&self) -> String;
}

impl<T: SerialChannel + ?Sized> SerialChannel for Box<T> {
    fn baud_rate(&self) -> u32 {
        (**self).baud_rate()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Opens the channel selected by `config`: a serial device when `port` is
/// set, stdout otherwise.
pub fn open_channel(config: &SerialConfig) -> HarnessResult<Box<dyn SerialChannel>> {
    match &config.port {
        None => Ok(Box::new(ConsoleSerial::new(config.baud_rate))),
        Some(path) => {
            Ok(Box::new(PortSerial::open(
                path,
                config.baud_rate,
                config.write_timeout(),
            )?))
        }
    }
}

/// Stdout standing in for a UART. The baud rate is informational.
#[derive(Debug)]
pub struct ConsoleSerial {
    baud_rate: u32,
    out: io::Stdout,
}

impl ConsoleSerial {
    pub fn new(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            out: io::stdout(),
        }
    }
}

impl Write for ConsoleSerial {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.out.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl SerialChannel for ConsoleSerial {
    fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    fn describe(&self) -> String {
        "stdout".to_string()
    }
}

/// In-memory channel; the buffer is shared so it can be read while the
/// harness owns the channel.
#[derive(Debug, Clone)]
pub struct CaptureSerial {
    baud_rate: u32,
    sink: Arc<Mutex<Vec<u8>>>,
    echo_stdout: bool,
}

impl CaptureSerial {
    pub fn new(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            sink: Arc::new(Mutex::new(Vec::new())),
            echo_stdout: false,
        }
    }

    /// Also copy every byte to stdout.
    pub fn with_echo(mut self, echo_stdout: bool) -> Self {
        self.echo_stdout = echo_stdout;
        self
    }

    pub fn sink(&self) -> Arc<Mutex<Vec<u8>>> {
        Arc::clone(&self.sink)
    }

    pub fn contents(&self) -> String {
        self.sink
            .lock()
            .map(|buf| String::from_utf8_lossy(&buf).into_owned())
            .unwrap_or_default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for CaptureSerial {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sink
            .lock()
            .map_err(|_| io::Error::other("capture buffer poisoned"))?
            .extend_from_slice(buf);

        if self.echo_stdout {
            let mut out = io::stdout();
            out.write_all(buf)?;
            out.flush()?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SerialChannel for CaptureSerial {
    fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    fn describe(&self) -> String {
        "capture".to_string()
    }
}

/// A host serial device, 8N1 at the configured baud rate.
pub struct PortSerial {
    path: String,
    baud_rate: u32,
    port: Box<dyn serialport::SerialPort>,
}

impl std::fmt::Debug for PortSerial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortSerial")
            .field("path", &self.path)
            .field("baud_rate", &self.baud_rate)
            .finish()
    }
}

impl PortSerial {
    pub fn open(path: &str, baud_rate: u32, timeout: Duration) -> HarnessResult<Self> {
        let port = serialport::new(path, baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .timeout(timeout)
            .open()
            .map_err(|source| HarnessError::Serial {
                port: path.to_string(),
                source,
            })?;
        tracing::debug!("Opened serial port {} at {} baud", path, baud_rate);
        Ok(Self {
            path: path.to_string(),
            baud_rate,
            port,
        })
    }
}

impl Write for PortSerial {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}

impl SerialChannel for PortSerial {
    fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    fn describe(&self) -> String {
        self.path.clone()
    }
}
