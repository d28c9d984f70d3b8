//! Call handling: state, dispatch of bus messages, and local actions.

pub mod actions;
pub mod dispatch;
pub mod state;

pub use actions::{apply_remote_command, ButtonHandler, LocalAction, LONG_PRESS};
pub use dispatch::{Dispatcher, Effect, ScreenOffCallPolicy, CALL_WINDOW, SETTLE_DELAY};
pub use state::CallState;
