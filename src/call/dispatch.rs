//! Decides what a received bus message means for this unit.
//!
//! ## Decision table
//!
//! For a valid message addressed to this unit, with `recent` meaning the door
//! was opened less than the call window (60 s) ago:
//!
//! | Code                                | Condition   | Effect                              |
//! |-------------------------------------|-------------|-------------------------------------|
//! | `CallFromEntryDoorScreenOn`         | recent      | transmit `OpenDoor` after 2.5 s      |
//! | `CallFromEntryDoorScreenOn`         | not recent  | red alert                           |
//! | `CallFromEntryDoor`, `CallToSecondarySwitchboard` | not recent | red alert          |
//! | `CallFromEntryDoor`, `CallToSecondarySwitchboard` | recent | per [`ScreenOffCallPolicy`] |
//! | `CallFromFloorDoor`                 | always      | blue alert                          |
//! | `OpenDoor`                          | always      | record the opening                  |
//! | anything else                       | always      | nothing                             |
//!
//! Messages for other addresses have no effect.

use core::str::FromStr;
use core::time::Duration;

use crate::call::state::CallState;
use crate::configuration::BridgeConfig;
use crate::error::BridgeError;
use crate::notify::{Alert, Color};
use crate::protocol::{Message, MessageCode};
use crate::time::Instant;

/// How long after an opening a repeated call counts as the same visitor.
pub const CALL_WINDOW: Duration = Duration::from_secs(60);

/// Pause before an automatic reopen.
pub const SETTLE_DELAY: Duration = Duration::from_millis(2500);

/// What to do with a screen-off call that arrives inside the call window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScreenOffCallPolicy {
    /// No alert, no reopen
    #[default]
    Ignore,
    /// Alert as if the window had expired
    Alert,
    /// Reopen like a screen-on call
    AutoReopen,
}

impl FromStr for ScreenOffCallPolicy {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ignore" => Ok(Self::Ignore),
            "alert" => Ok(Self::Alert),
            "auto-reopen" => Ok(Self::AutoReopen),
            _ => Err(BridgeError::invalid_config_value()),
        }
    }
}

/// Outcome of dispatching one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Nothing to do
    None,
    /// Notify the occupant
    Alert(Alert),
    /// Wait `delay`, then put `message` on the bus
    TransmitAfter {
        /// Pause before sending
        delay: Duration,
        /// Message to send
        message: Message,
    },
    /// An opening was observed and recorded; nothing else to do
    OpenRecorded,
}

/// The call-handling state machine.
///
/// Holds only configuration; the mutable part lives in [`CallState`] and is
/// passed in for each message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatcher {
    address: u8,
    call_window: Duration,
    settle_delay: Duration,
    screen_off_call: ScreenOffCallPolicy,
}

impl Dispatcher {
    /// Dispatcher for unit `address` with the stock timings.
    pub const fn new(address: u8) -> Self {
        Self {
            address,
            call_window: CALL_WINDOW,
            settle_delay: SETTLE_DELAY,
            screen_off_call: ScreenOffCallPolicy::Ignore,
        }
    }

    /// Dispatcher configured from `config`.
    pub fn from_config(config: &BridgeConfig) -> Self {
        Self {
            address: config.address,
            call_window: config.call_window,
            settle_delay: config.settle_delay,
            screen_off_call: config.screen_off_call,
        }
    }

    /// Replace the screen-off call policy
    #[must_use]
    pub const fn with_screen_off_call(mut self, policy: ScreenOffCallPolicy) -> Self {
        self.screen_off_call = policy;
        self
    }

    /// This unit's bus address
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Window during which a repeated call is treated as the same visitor
    pub const fn call_window(&self) -> Duration {
        self.call_window
    }

    /// Pause before an automatic reopen
    pub const fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Decide the effect of `message` received at `now`.
    ///
    /// Never fails. Only an `OpenDoor` for this unit changes `state`.
    ///
    /// # Examples
    ///
    /// ```
    /// use simplebus_bridge::call::{CallState, Dispatcher, Effect};
    /// use simplebus_bridge::protocol::{Message, MessageCode};
    /// use simplebus_bridge::time::Instant;
    ///
    /// let dispatcher = Dispatcher::new(12);
    /// let mut state = CallState::new();
    ///
    /// let open = Message::from_code(MessageCode::OpenDoor, 12);
    /// let effect = dispatcher.dispatch(&mut state, &open, Instant::from_secs(1));
    /// assert_eq!(effect, Effect::OpenRecorded);
    /// assert_eq!(state.last_open(), Some(Instant::from_secs(1)));
    /// ```
    pub fn dispatch(&self, state: &mut CallState, message: &Message, now: Instant) -> Effect {
        if message.address != self.address {
            return Effect::None;
        }
        let Some(kind) = message.kind() else {
            return Effect::None;
        };

        let recent = state.opened_within(now, self.call_window);

        match kind {
            MessageCode::OpenDoor => {
                state.record_open(now);
                Effect::OpenRecorded
            }
            MessageCode::CallFromEntryDoorScreenOn => {
                if recent {
                    self.reopen()
                } else {
                    Effect::Alert(Alert::new(Color::RED, state.is_silent()))
                }
            }
            MessageCode::CallFromEntryDoor | MessageCode::CallToSecondarySwitchboard => {
                if !recent {
                    return Effect::Alert(Alert::new(Color::RED, state.is_silent()));
                }
                match self.screen_off_call {
                    ScreenOffCallPolicy::Ignore => Effect::None,
                    ScreenOffCallPolicy::Alert => {
                        Effect::Alert(Alert::new(Color::RED, state.is_silent()))
                    }
                    ScreenOffCallPolicy::AutoReopen => self.reopen(),
                }
            }
            MessageCode::CallFromFloorDoor => {
                Effect::Alert(Alert::new(Color::BLUE, state.is_silent()))
            }
            _ => Effect::None,
        }
    }

    fn reopen(&self) -> Effect {
        Effect::TransmitAfter {
            delay: self.settle_delay,
            message: Message::from_code(MessageCode::OpenDoor, self.address),
        }
    }
}
