//! # Serial Communication Module
//!
//! Handles the serial link to the motor controller board.
//!
//! This module handles:
//! - Opening the configured port (falling back to common USB serial paths)
//! - Writing motor frames with a per-write timeout
//! - Reporting failures without stalling the control loop

pub mod port_trait;

use std::time::Duration;

use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, warn};

use crate::error::{Result, TeleopError};
use port_trait::{SerialPortIO, TokioSerialPort};

/// Paths tried after the configured one (in order of preference)
const FALLBACK_DEVICE_PATHS: &[&str] = &[
    "/dev/ttyUSB0", // USB-to-serial adapters
    "/dev/ttyACM0", // USB CDC devices
];

/// Motor controller serial link
pub struct MotorSerial {
    port: Box<dyn SerialPortIO>,
    device_path: String,
    write_timeout: Duration,
}

impl std::fmt::Debug for MotorSerial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotorSerial")
            .field("device_path", &self.device_path)
            .field("write_timeout", &self.write_timeout)
            .finish_non_exhaustive()
    }
}

impl MotorSerial {
    /// Open the configured port, then the fallback paths
    ///
    /// # Errors
    ///
    /// Returns `SerialPortNotFound` if no candidate can be opened
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use chairbot_teleop::serial::MotorSerial;
    ///
    /// fn main() -> anyhow::Result<()> {
    ///     let serial = MotorSerial::open("/dev/ttyUSB0", 115200, 100)?;
    ///     println!("Connected to: {}", serial.device_path());
    ///     Ok(())
    /// }
    /// ```
    pub fn open(preferred: &str, baud_rate: u32, timeout_ms: u64) -> Result<Self> {
        let mut candidates = vec![preferred];
        candidates.extend(FALLBACK_DEVICE_PATHS.iter().filter(|p| **p != preferred));
        Self::open_with_paths(&candidates, baud_rate, timeout_ms)
    }

    /// Open the first path that works
    pub fn open_with_paths(paths: &[&str], baud_rate: u32, timeout_ms: u64) -> Result<Self> {
        for path in paths {
            debug!("Trying to open serial port: {}", path);

            match Self::open_port(path, baud_rate) {
                Ok(port) => {
                    info!("Opened motor controller at {} ({} baud)", path, baud_rate);
                    return Ok(Self::with_port(
                        Box::new(TokioSerialPort::new(port)),
                        path,
                        timeout_ms,
                    ));
                }
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                }
            }
        }

        Err(TeleopError::SerialPortNotFound(paths.join(", ")))
    }

    /// Wrap an already-open port
    pub fn with_port(port: Box<dyn SerialPortIO>, device_path: &str, timeout_ms: u64) -> Self {
        Self {
            port,
            device_path: device_path.to_string(),
            write_timeout: Duration::from_millis(timeout_ms),
        }
    }

    /// 8N1, no flow control
    fn open_port(path: &str, baud_rate: u32) -> Result<tokio_serial::SerialStream> {
        tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| TeleopError::Serial(format!("Failed to open {}: {}", path, e)))
    }

    /// Send one motor frame
    ///
    /// # Errors
    ///
    /// Returns `Serial` if the write or flush fails or exceeds the timeout
    pub async fn send_frame(&mut self, frame: &[u8]) -> Result<()> {
        let limit = self.write_timeout;
        let port = &mut self.port;
        let write = async move {
            port.write_all(frame).await?;
            port.flush().await
        };

        match tokio::time::timeout(limit, write).await {
            Ok(Ok(())) => {
                debug!("Sent motor frame ({} bytes)", frame.len());
                Ok(())
            }
            Ok(Err(e)) => Err(TeleopError::Serial(format!("Failed to write frame: {}", e))),
            Err(_) => Err(TeleopError::Serial(format!(
                "Write timed out after {} ms",
                limit.as_millis()
            ))),
        }
    }

    /// Path of the opened device
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}
