//! The bridge control loop.
//!
//! [`Bridge`] owns the bus transport, the notifier, the clock and the single
//! [`CallState`], and exposes one method per kind of input. The caller (the
//! firmware main loop, or a test) decides when each input happens; every
//! method runs to completion, including the settle delay before an automatic
//! reopen, before the next input is handled.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut bridge = Bridge::new(&config, bus, notifier, EmbassyClock);
//! bridge.self_test().await;
//!
//! loop {
//!     match select(bridge.next_frame(), button_edge()).await {
//!         Either::First(Ok(frame)) => { bridge.handle_frame(&frame).await?; }
//!         Either::First(Err(e)) => bus_log!(error, "Bus read failed: {}", e),
//!         Either::Second(Edge::Down) => bridge.button_pressed(),
//!         Either::Second(Edge::Up) => bridge.button_released().await?,
//!     }
//! }
//! ```

use crate::bus::BusTransport;
use crate::call::{apply_remote_command, ButtonHandler, CallState, Dispatcher, Effect, LocalAction};
use crate::command::RemoteCommand;
use crate::configuration::BridgeConfig;
use crate::error::Result;
use crate::notify::{idle_color, Alert, Color, Notifier};
use crate::protocol::{Frame, Message};
use crate::time::Clock;

/// Colours flashed by [`Bridge::self_test`], in order.
pub const SELF_TEST_COLORS: [Color; 3] = [Color::RED, Color::GREEN, Color::BLUE];

/// Intercom bridge: SimpleBus on one side, the occupant and a remote
/// controller on the other.
#[derive(Debug)]
pub struct Bridge<T, N, C> {
    transport: T,
    notifier: N,
    clock: C,
    dispatcher: Dispatcher,
    button: ButtonHandler,
    state: CallState,
}

impl<T, N, C> Bridge<T, N, C>
where
    T: BusTransport,
    N: Notifier,
    C: Clock,
{
    /// Create a bridge with fresh call state.
    pub fn new(config: &BridgeConfig, transport: T, notifier: N, clock: C) -> Self {
        Self {
            transport,
            notifier,
            clock,
            dispatcher: Dispatcher::from_config(config),
            button: ButtonHandler::new(config.address, config.long_press),
            state: CallState::new(),
        }
    }

    /// Current call state (read-only)
    pub fn state(&self) -> &CallState {
        &self.state
    }

    /// The dispatcher in use
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// The bus transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The bus transport, mutably (for test setup)
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// The notifier
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// The notifier, mutably
    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    /// The clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The clock, mutably (tests advance it)
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Flash red, green, blue and settle on the idle colour.
    pub async fn self_test(&mut self) {
        bus_log!(info, "Self test, unit address {}", self.dispatcher.address());
        for color in SELF_TEST_COLORS {
            self.notifier
                .alert(Alert::new(color, self.state.is_silent()))
                .await;
        }
        self.notifier
            .set_idle_display(idle_color(self.state.is_silent()))
            .await;
    }

    /// Wait for the next frame on the bus.
    ///
    /// Cancel-safe, so it can sit in a `select` next to other inputs. The
    /// frame should then be passed to [`handle_frame`](Self::handle_frame)
    /// outside the `select`.
    pub async fn next_frame(&mut self) -> Result<Frame> {
        self.transport.read_frame().await
    }

    /// Decode and act on one received frame.
    ///
    /// Returns the decoded message, whatever its address, so the caller can
    /// forward it. A corrupt frame is logged and dropped: `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Only if an automatic reopen fails to transmit.
    pub async fn handle_frame(&mut self, frame: &Frame) -> Result<Option<Message>> {
        let message = match Message::decode(frame) {
            Ok(message) => message,
            Err(err) => {
                bus_log!(warn, "Dropping bus frame {:?}: {}", frame, err);
                return Ok(None);
            }
        };
        bus_log!(info, "Bus rx: {}", message);

        let effect = self
            .dispatcher
            .dispatch(&mut self.state, &message, self.clock.now());
        self.apply(effect).await?;

        Ok(Some(message))
    }

    /// Read one frame and handle it.
    ///
    /// # Errors
    ///
    /// Transport failures, or a failed automatic reopen.
    pub async fn receive(&mut self) -> Result<Option<Message>> {
        let frame = self.next_frame().await?;
        self.handle_frame(&frame).await
    }

    /// Encode and send a message.
    pub async fn transmit(&mut self, message: Message) -> Result<()> {
        let frame = message.encode();
        match self.transport.write_frame(&frame).await {
            Ok(()) => {
                bus_log!(info, "Bus tx: {}", message);
                Ok(())
            }
            Err(err) => {
                bus_log!(error, "Bus tx of {} failed: {}", message, err);
                Err(err)
            }
        }
    }

    /// The button went down.
    pub fn button_pressed(&mut self) {
        self.button.press(self.clock.now());
    }

    /// The button is still down; call periodically while held.
    pub async fn button_held(&mut self) -> Result<()> {
        let action = self.button.poll(&mut self.state, self.clock.now());
        self.perform(action).await
    }

    /// The button came up.
    pub async fn button_released(&mut self) -> Result<()> {
        let action = self.button.release(&mut self.state, self.clock.now());
        self.perform(action).await
    }

    /// Parse a remote payload and execute it.
    ///
    /// Rejected payloads are logged and never reach the bus.
    pub async fn remote_command(&mut self, payload: &[u8]) -> Result<Message> {
        let own_address = self.dispatcher.address();
        match RemoteCommand::parse(payload, own_address) {
            Ok(command) => self.execute(command).await,
            Err(err) => {
                bus_log!(warn, "Rejected remote command: {}", err);
                Err(err)
            }
        }
    }

    /// Transmit a validated remote command.
    pub async fn execute(&mut self, command: RemoteCommand) -> Result<Message> {
        bus_log!(info, "Remote command: code {} @ {}", command.code(), command.address());
        let message = apply_remote_command(&mut self.state, &command, self.clock.now());
        self.transmit(message).await?;
        Ok(message)
    }

    async fn perform(&mut self, action: LocalAction) -> Result<()> {
        match action {
            LocalAction::None => Ok(()),
            LocalAction::Transmit(message) => {
                self.notifier.button_feedback().await;
                self.transmit(message).await
            }
            LocalAction::SilentToggled { silent } => {
                bus_log!(info, "Silent mode: {}", silent);
                self.notifier.set_idle_display(idle_color(silent)).await;
                Ok(())
            }
        }
    }

    async fn apply(&mut self, effect: Effect) -> Result<()> {
        match effect {
            Effect::None => Ok(()),
            Effect::OpenRecorded => {
                bus_log!(debug, "Door opening recorded");
                Ok(())
            }
            Effect::Alert(alert) => {
                bus_log!(info, "Incoming call, audible: {}", alert.audible);
                self.notifier.alert(alert).await;
                Ok(())
            }
            Effect::TransmitAfter { delay, message } => {
                bus_log!(info, "Same visitor, reopening in {} ms", delay.as_millis() as u64);
                self.clock.sleep(delay).await;
                self.transmit(message).await
            }
        }
    }
}
