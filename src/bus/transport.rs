//! Bus transport abstraction.
//!
//! The control loop talks to the intercom line only through [`BusTransport`],
//! so the same call logic runs against the real UART and against
//! [`MockBusTransport`](crate::bus::MockBusTransport) in tests.

use crate::error::Result;
use crate::protocol::Frame;

/// Half-duplex, frame-oriented access to the SimpleBus line.
///
/// Frames are always read and written whole.
///
/// # Examples
///
/// ```
/// use simplebus_bridge::bus::{BusTransport, MockBusTransport};
/// use simplebus_bridge::protocol::Message;
///
/// # tokio_test_block(async {
/// let mut bus = MockBusTransport::new();
/// bus.push_message(Message::new(48, 12));
///
/// let frame = bus.read_frame().await.unwrap();
/// assert_eq!(Message::decode(&frame).unwrap(), Message::new(48, 12));
/// # });
/// # fn tokio_test_block<F: core::future::Future>(f: F) {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f);
/// # }
/// ```
#[allow(async_fn_in_trait, reason = "single-threaded executors only")]
pub trait BusTransport {
    /// Wait for the next complete frame.
    ///
    /// Implementations must be cancel-safe: dropping the future must not
    /// lose bytes that were already taken off the line.
    ///
    /// # Errors
    ///
    /// Returns error if the line fails or is closed.
    async fn read_frame(&mut self) -> Result<Frame>;

    /// Put a frame on the line.
    ///
    /// # Errors
    ///
    /// Returns error if the write fails.
    async fn write_frame(&mut self, frame: &Frame) -> Result<()>;
}
