//! Bus access: frame assembly and the transport abstraction.
//!
//! The SimpleBus line has no delimiters, only silence between messages.
//! [`FrameAssembler`] collects bytes one at a time so a read that is
//! cancelled halfway (for example by `select` in the firmware loop) never
//! loses or shifts bytes, and the serial adapter resets it when the line
//! goes quiet mid-frame.

pub mod mock_transport;
pub mod serial_adapter;
pub mod transport;

pub use mock_transport::MockBusTransport;
pub use serial_adapter::SerialBusTransport;
pub use transport::BusTransport;

use crate::protocol::{Frame, FRAME_LEN};

/// Collects line bytes into whole frames.
///
/// # Examples
///
/// ```
/// use simplebus_bridge::bus::FrameAssembler;
///
/// let mut assembler = FrameAssembler::new();
/// assert_eq!(assembler.push(0x00), None);
/// assert_eq!(assembler.push(0xC4), None);
/// assert_eq!(assembler.push(0x30), Some([0x00, 0xC4, 0x30]));
/// assert_eq!(assembler.pending(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameAssembler {
    buf: Frame,
    filled: usize,
}

impl FrameAssembler {
    /// Empty assembler
    pub const fn new() -> Self {
        Self {
            buf: [0; FRAME_LEN],
            filled: 0,
        }
    }

    /// Add one byte; returns the frame once the third byte arrives.
    pub fn push(&mut self, byte: u8) -> Option<Frame> {
        self.buf[self.filled] = byte;
        self.filled += 1;

        if self.filled == FRAME_LEN {
            self.filled = 0;
            Some(self.buf)
        } else {
            None
        }
    }

    /// Bytes of the current frame already received
    pub const fn pending(&self) -> usize {
        self.filled
    }

    /// Bytes still needed to complete the current frame
    pub const fn remaining(&self) -> usize {
        FRAME_LEN - self.filled
    }

    /// Drop a partial frame
    pub fn reset(&mut self) {
        self.filled = 0;
    }
}
