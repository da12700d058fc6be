//! Point-to-point UART link to the remote temperature server, plus a log
//! fallback for host runs without a serial device.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio_serial::{DataBits, Parity, SerialPortBuilderExt, SerialStream, StopBits};
use tracing::info;

use crate::drivers::StatusReporter;

pub struct SerialReporter {
    port: SerialStream,
}

impl SerialReporter {
    /// 8N1 with a one second timeout; the record itself carries no
    /// terminator, that policy belongs here if the far end ever needs one.
    pub fn open(path: &str, baud: u32) -> tokio_serial::Result<Self> {
        let port = tokio_serial::new(path, baud)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(Duration::from_secs(1))
            .open_native_async()?;
        Ok(Self { port })
    }
}

#[async_trait]
impl StatusReporter for SerialReporter {
    async fn send(&mut self, payload: &[u8]) -> std::io::Result<()> {
        self.port.write_all(payload).await?;
        self.port.flush().await
    }
}

/// No serial device configured; surface the records in the log so a host
/// run still shows what would have gone out.
pub struct LogReporter;

#[async_trait]
impl StatusReporter for LogReporter {
    async fn send(&mut self, payload: &[u8]) -> std::io::Result<()> {
        info!("status report: {}", String::from_utf8_lossy(payload));
        Ok(())
    }
}
