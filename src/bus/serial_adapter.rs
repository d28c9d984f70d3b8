//! Serial adapter for `BusTransport`.
//!
//! Wraps any byte stream implementing `embedded_io_async::{Read, Write}`
//! (on the Pico that is `embassy_rp::uart::BufferedUart` at 4800 baud) and
//! cuts it into 3-byte frames.
//!
//! The line carries no delimiters. The only frame boundary is the silence
//! between messages: once part of a frame has arrived, the rest must follow
//! within [`FRAME_GAP_TIMEOUT`] or the partial frame is dropped. A noise byte
//! therefore costs at most the frame it lands in.
//!
//! ## Example
//!
//! ```rust,ignore
//! use simplebus_bridge::bus::SerialBusTransport;
//! use simplebus_bridge::time::EmbassyClock;
//!
//! let uart = BufferedUart::new(p.UART0, p.PIN_0, p.PIN_1, Irqs, tx_buf, rx_buf, config);
//! let mut bus = SerialBusTransport::new(uart, EmbassyClock);
//! let frame = bus.read_frame().await?;
//! ```

use core::time::Duration;

use embassy_futures::select::{select, Either};
use embedded_io_async::{Read, Write};

use crate::bus::transport::BusTransport;
use crate::bus::FrameAssembler;
use crate::error::{BridgeError, Result};
use crate::protocol::{Frame, FRAME_GAP_TIMEOUT, FRAME_LEN};
use crate::time::Clock;

/// `BusTransport` over a serial byte stream.
///
/// Reads never ask the UART for more than the current frame still needs, so
/// bytes of the next frame stay in the UART buffer and the partial frame
/// lives in the adapter. Cancelling `read_frame` is therefore safe as long
/// as the UART's own `read` is cancel-safe, which `BufferedUart` is.
///
/// The gap timer only runs while `read_frame` is actually waiting on the
/// UART. Bytes that piled up in the UART buffer while the caller was busy
/// are read at once and never count as a gap.
#[derive(Debug)]
pub struct SerialBusTransport<U, C> {
    uart: U,
    clock: C,
    assembler: FrameAssembler,
    gap_timeout: Duration,
}

impl<U, C> SerialBusTransport<U, C>
where
    U: Read + Write,
    C: Clock,
{
    /// Wrap a configured serial port; `clock` times the gap between bytes.
    pub const fn new(uart: U, clock: C) -> Self {
        Self {
            uart,
            clock,
            assembler: FrameAssembler::new(),
            gap_timeout: FRAME_GAP_TIMEOUT,
        }
    }

    /// Use a different inter-byte gap timeout
    #[must_use]
    pub fn with_gap_timeout(mut self, gap_timeout: Duration) -> Self {
        self.gap_timeout = gap_timeout;
        self
    }

    /// Current inter-byte gap timeout
    pub const fn gap_timeout(&self) -> Duration {
        self.gap_timeout
    }

    /// Bytes of a frame received but not yet returned
    pub const fn pending(&self) -> usize {
        self.assembler.pending()
    }

    /// Drop a partially received frame
    pub fn resync(&mut self) {
        self.assembler.reset();
    }

    /// Give the serial port back
    pub fn into_inner(self) -> U {
        self.uart
    }
}

impl<U, C> BusTransport for SerialBusTransport<U, C>
where
    U: Read + Write,
    C: Clock,
{
    async fn read_frame(&mut self) -> Result<Frame> {
        loop {
            let mut buf = [0u8; FRAME_LEN];
            let want = self.assembler.remaining();

            let read = if self.assembler.pending() == 0 {
                self.uart.read(&mut buf[..want]).await
            } else {
                match select(
                    self.uart.read(&mut buf[..want]),
                    self.clock.sleep(self.gap_timeout),
                )
                .await
                {
                    Either::First(read) => read,
                    Either::Second(()) => {
                        bus_log!(warn, "Line idle mid-frame, dropping {} byte(s)", self.assembler.pending());
                        self.assembler.reset();
                        continue;
                    }
                }
            };

            let n = match read {
                Ok(0) => return Err(BridgeError::transport_closed()),
                Ok(n) => n,
                Err(_) => return Err(BridgeError::receive_failed()),
            };

            for &byte in &buf[..n] {
                if let Some(frame) = self.assembler.push(byte) {
                    return Ok(frame);
                }
            }
        }
    }

    async fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        if self.uart.write_all(frame).await.is_err() {
            return Err(BridgeError::send_failed());
        }
        if self.uart.flush().await.is_err() {
            return Err(BridgeError::send_failed());
        }
        Ok(())
    }
}
