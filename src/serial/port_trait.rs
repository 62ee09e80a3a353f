//! The write half of the motor controller port, behind a trait so
//! [`MotorSerial`](super::MotorSerial) runs against a recording port in tests.

use async_trait::async_trait;
use std::io;
use tokio::io::AsyncWriteExt;
use tokio_serial::SerialStream;

/// Byte sink a motor frame is written to
#[async_trait]
pub trait SerialPortIO: Send {
    async fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Push buffered bytes onto the wire
    async fn flush(&mut self) -> io::Result<()>;
}

/// An opened [`SerialStream`]
pub struct TokioSerialPort(SerialStream);

impl TokioSerialPort {
    pub fn new(stream: SerialStream) -> Self {
        Self(stream)
    }
}

#[async_trait]
impl SerialPortIO for TokioSerialPort {
    async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        AsyncWriteExt::write_all(&mut self.0, data).await
    }

    async fn flush(&mut self) -> io::Result<()> {
        AsyncWriteExt::flush(&mut self.0).await
    }
}
