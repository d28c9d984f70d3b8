//! SimpleBus frame encoding and decoding.
//!
//! A message is a 6-bit code and an 8-bit address. On the wire it travels as
//! three bytes with a 4-bit checksum, packed across byte boundaries:
//!
//! ```text
//!          7   6   5   4   3   2   1   0
//!        ┌───────┬───────────────────────┐
//! byte0  │ c1 c0 │   (unused, ignored)   │
//!        ├───────┴───────┬───────────────┤
//! byte1  │  a3 a2 a1 a0  │  c5 c4 c3 c2  │
//!        ├───────────────┼───────────────┤
//! byte2  │  checksum     │  a7 a6 a5 a4  │
//!        └───────────────┴───────────────┘
//! ```
//!
//! The checksum is `popcount(code) + popcount(address)` truncated to four
//! bits. It detects any single flipped payload bit but misses corruptions that
//! keep the popcount sum unchanged, and it does not cover the low six bits of
//! byte0 at all.
//!
//! The layout is dictated by the intercom hardware and is reproduced bit for
//! bit. Encoding a code above 63 is allowed but the extra bits land in the
//! address nibble, so such a message does not survive a round trip.

use core::fmt;

use crate::error::{BridgeError, Result};
use crate::protocol::constants::{MessageCode, CHECKSUM_MASK, CODE_MASK, FRAME_LEN, MAX_CODE};

/// Raw SimpleBus frame as it appears on the line.
pub type Frame = [u8; FRAME_LEN];

/// A decoded bus message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    /// Message code (see [`MessageCode`] for the known values)
    pub code: u8,
    /// Destination unit address
    pub address: u8,
}

/// Computes the 4-bit checksum for a code/address pair.
#[inline]
pub const fn checksum(code: u8, address: u8) -> u8 {
    ((code.count_ones() + address.count_ones()) as u8) & CHECKSUM_MASK
}

impl Message {
    /// Create a message from a raw code and address
    #[inline]
    pub const fn new(code: u8, address: u8) -> Self {
        Self { code, address }
    }

    /// Create a message from a known code
    #[inline]
    pub const fn from_code(code: MessageCode, address: u8) -> Self {
        Self::new(code.to_u8(), address)
    }

    /// The known code this message carries, if any
    pub const fn kind(&self) -> Option<MessageCode> {
        MessageCode::from_u8(self.code)
    }

    /// Returns true if this message carries `code`
    pub const fn is(&self, code: MessageCode) -> bool {
        self.code == code.to_u8()
    }

    /// Checksum nibble this message is sent with
    pub const fn checksum(&self) -> u8 {
        checksum(self.code, self.address)
    }

    /// Whether `decode(encode(self))` gives back `self`.
    ///
    /// Only codes `1..=63` fit the 6-bit code field and zero is the idle
    /// line, so everything else is either lossy or rejected.
    pub const fn is_representable(&self) -> bool {
        self.code != 0 && self.code <= MAX_CODE
    }

    /// Encode the message into a wire frame.
    ///
    /// # Examples
    ///
    /// ```
    /// use simplebus_bridge::protocol::{Message, MessageCode};
    ///
    /// let frame = Message::from_code(MessageCode::OpenDoor, 12).encode();
    /// assert_eq!(frame, [0x00, 0xC4, 0x30]);
    /// ```
    #[inline]
    pub const fn encode(&self) -> Frame {
        let cs = self.checksum();
        [
            self.code << 6,
            (self.address << 4) | (self.code >> 2),
            (cs << 4) | (self.address >> 4),
        ]
    }

    /// Decode a wire frame.
    ///
    /// # Errors
    ///
    /// - the recovered code is zero (idle line), whatever the checksum says
    /// - the checksum nibble does not match the recovered payload
    ///
    /// # Examples
    ///
    /// ```
    /// use simplebus_bridge::protocol::Message;
    ///
    /// let msg = Message::decode(&[0x00, 0xC4, 0x30]).unwrap();
    /// assert_eq!(msg, Message::new(16, 12));
    ///
    /// assert!(Message::decode(&[0x00, 0x00, 0x00]).is_err());
    /// ```
    pub fn decode(frame: &Frame) -> Result<Self> {
        let [b0, b1, b2] = *frame;

        let address = (b2 << 4) | (b1 >> 4);
        let code = ((b1 << 2) | (b0 >> 6)) & CODE_MASK;
        let expected = b2 >> 4;

        if code == 0 {
            return Err(BridgeError::zero_code());
        }
        if checksum(code, address) != expected {
            return Err(BridgeError::invalid_checksum());
        }

        Ok(Self { code, address })
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            Some(kind) => write!(f, "{:?}({}) @ {}", kind, self.code, self.address),
            None => write!(f, "code {} @ {}", self.code, self.address),
        }
    }
}
