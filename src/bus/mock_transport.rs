//! Mock bus transport for testing.
//!
//! Frames queued with [`MockBusTransport::push_frame`] are handed out by
//! `read_frame()` in FIFO order; everything written is recorded. An empty
//! queue reads as a timeout, which lets a test drain the bus and stop.

use heapless::{Deque, Vec};

use crate::bus::transport::BusTransport;
use crate::error::{BridgeError, Result};
use crate::protocol::{Frame, Message};

/// Maximum frames the mock can queue or record.
pub const MOCK_BUS_CAPACITY: usize = 32;

/// In-memory SimpleBus line.
///
/// # Examples
///
/// ```
/// use simplebus_bridge::bus::MockBusTransport;
/// use simplebus_bridge::protocol::Message;
///
/// let mut bus = MockBusTransport::new();
/// bus.push_frame([0x00, 0xC4, 0x30]);
/// assert_eq!(bus.queued(), 1);
/// assert!(bus.sent().is_empty());
/// ```
#[derive(Debug)]
pub struct MockBusTransport {
    incoming: Deque<Frame, MOCK_BUS_CAPACITY>,
    sent: Vec<Frame, MOCK_BUS_CAPACITY>,
    fail_writes: bool,
}

impl MockBusTransport {
    /// Create an empty line
    pub fn new() -> Self {
        Self {
            incoming: Deque::new(),
            sent: Vec::new(),
            fail_writes: false,
        }
    }

    /// Queue a raw frame to be read. Frames beyond capacity are dropped.
    pub fn push_frame(&mut self, frame: Frame) {
        let _ = self.incoming.push_back(frame);
    }

    /// Queue the encoding of `message`
    pub fn push_message(&mut self, message: Message) {
        self.push_frame(message.encode());
    }

    /// Frames still waiting to be read
    pub fn queued(&self) -> usize {
        self.incoming.len()
    }

    /// Every frame written so far, oldest first
    pub fn sent(&self) -> &[Frame] {
        &self.sent
    }

    /// Written frames that decode to a valid message
    pub fn sent_messages(&self) -> impl Iterator<Item = Message> + '_ {
        self.sent.iter().filter_map(|frame| Message::decode(frame).ok())
    }

    /// Forget recorded writes
    pub fn clear_sent(&mut self) {
        self.sent.clear();
    }

    /// Make subsequent writes fail
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl Default for MockBusTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl BusTransport for MockBusTransport {
    async fn read_frame(&mut self) -> Result<Frame> {
        self.incoming.pop_front().ok_or(BridgeError::Timeout)
    }

    async fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        if self.fail_writes {
            return Err(BridgeError::send_failed());
        }
        self.sent
            .push(*frame)
            .map_err(|_full| BridgeError::send_failed())
    }
}
