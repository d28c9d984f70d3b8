#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
#![doc = include_str!("../README.md")]

//! # simplebus-bridge
//!
//! SimpleBus intercom bridge for embedded systems.
//!
//! This crate provides a `no_std` implementation of the SimpleBus frame codec
//! and the call-handling logic of a remote unit that sits next to an
//! apartment handset, designed for use with the Embassy async runtime.
//!
//! ## Features
//!
//! - Bit-exact 3-byte frame codec with checksum
//! - Reopen window for a visitor who rings again after the door was opened
//! - Button tap / long press handling with silent mode
//! - Remote commands (keywords or JSON)
//! - Hardware-free testing through mock transport, notifier and clock
//!
//! ## Example
//!
//! ```rust
//! use simplebus_bridge::{Message, MessageCode};
//!
//! let frame = Message::from_code(MessageCode::OpenDoor, 12).encode();
//! assert_eq!(Message::decode(&frame).unwrap().code, 16);
//! ```

#[cfg(feature = "json")]
extern crate alloc;

// Macro modules (must be declared before use)
#[macro_use]
pub mod logging;
#[macro_use]
pub mod macros;

pub mod bus;
pub mod call;
pub mod command;
pub mod configuration;
pub mod controller;
pub mod error;
pub mod notify;
pub mod protocol;
pub mod time;
pub mod utility;

// Re-export commonly used types
#[doc(inline)]
pub use bus::{BusTransport, FrameAssembler, MockBusTransport, SerialBusTransport};
#[doc(inline)]
pub use call::{ButtonHandler, CallState, Dispatcher, Effect, LocalAction, ScreenOffCallPolicy};
#[doc(inline)]
pub use command::RemoteCommand;
#[doc(inline)]
pub use configuration::BridgeConfig;
#[doc(inline)]
pub use controller::Bridge;
#[doc(inline)]
pub use error::{BridgeError, Result};
#[doc(inline)]
pub use notify::{Alert, Color, MockNotifier, Notifier};
#[doc(inline)]
pub use protocol::{Frame, Message, MessageCode};
#[doc(inline)]
pub use time::{Clock, Instant, ManualClock};
