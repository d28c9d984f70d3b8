//! Local actions: the physical button and remote commands.

use core::time::Duration;

use crate::call::state::CallState;
use crate::command::RemoteCommand;
use crate::protocol::{Message, MessageCode};
use crate::time::Instant;

/// Hold time that turns a press into a silent-mode toggle.
pub const LONG_PRESS: Duration = Duration::from_millis(1000);

/// What the control loop must do after a button event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LocalAction {
    /// Nothing
    None,
    /// Put `Message` on the bus
    Transmit(Message),
    /// Silent mode changed, `silent` is the new value
    SilentToggled {
        /// Silent mode after the toggle
        silent: bool,
    },
}

/// Classifies presses of the single user button.
///
/// Feed it edges with [`press`](Self::press) / [`release`](Self::release) and
/// call [`poll`](Self::poll) while the button is held so a long press takes
/// effect without waiting for the release.
///
/// - released before [`LONG_PRESS`]: tap, opens the door
/// - held for [`LONG_PRESS`] or longer: toggles silent mode exactly once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonHandler {
    address: u8,
    long_press: Duration,
    pressed_at: Option<Instant>,
}

impl ButtonHandler {
    /// Handler for unit `address`
    pub const fn new(address: u8, long_press: Duration) -> Self {
        Self {
            address,
            long_press,
            pressed_at: None,
        }
    }

    /// Whether the button is currently down
    pub const fn is_pressed(&self) -> bool {
        self.pressed_at.is_some()
    }

    /// Button went down at `now`. A repeated press edge keeps the first one.
    pub fn press(&mut self, now: Instant) {
        if self.pressed_at.is_none() {
            self.pressed_at = Some(now);
        }
    }

    /// Button is still down at `now`.
    pub fn poll(&mut self, state: &mut CallState, now: Instant) -> LocalAction {
        let Some(pressed_at) = self.pressed_at else {
            return LocalAction::None;
        };
        if state.is_long_press_active() || now.duration_since(pressed_at) < self.long_press {
            return LocalAction::None;
        }

        state.set_long_press_active(true);
        LocalAction::SilentToggled {
            silent: state.toggle_silent(),
        }
    }

    /// Button came up at `now`.
    pub fn release(&mut self, state: &mut CallState, now: Instant) -> LocalAction {
        let Some(pressed_at) = self.pressed_at.take() else {
            return LocalAction::None;
        };

        if state.is_long_press_active() {
            state.set_long_press_active(false);
            return LocalAction::None;
        }

        if now.duration_since(pressed_at) < self.long_press {
            state.record_open(now);
            return LocalAction::Transmit(Message::from_code(MessageCode::OpenDoor, self.address));
        }

        // Long press that was never polled
        LocalAction::SilentToggled {
            silent: state.toggle_silent(),
        }
    }
}

/// Turns a validated remote command into the message to transmit.
///
/// An `OpenDoor` command counts as an opening at `now`, so a call arriving
/// shortly after is handled by the reopen window.
pub fn apply_remote_command(state: &mut CallState, command: &RemoteCommand, now: Instant) -> Message {
    let message = command.message();
    if message.is(MessageCode::OpenDoor) {
        state.record_open(now);
    }
    message
}
