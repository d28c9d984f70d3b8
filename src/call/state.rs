//! Call-handling state shared by the dispatcher and the local handlers.

use core::time::Duration;

use crate::time::Instant;

/// Mutable state of the call logic.
///
/// There is exactly one instance per bridge, owned by the control loop and
/// lent to the dispatcher and the action handlers for the duration of a
/// single event. Only code inside this crate can change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CallState {
    last_open: Option<Instant>,
    silent: bool,
    long_press_active: bool,
}

impl CallState {
    /// Fresh state: no door opening seen, audible alerts.
    pub const fn new() -> Self {
        Self {
            last_open: None,
            silent: false,
            long_press_active: false,
        }
    }

    /// When the door was last opened, from the bus or locally.
    pub const fn last_open(&self) -> Option<Instant> {
        self.last_open
    }

    /// Audible alerts are suppressed.
    pub const fn is_silent(&self) -> bool {
        self.silent
    }

    /// A long press already toggled silent mode and the button is still down.
    pub const fn is_long_press_active(&self) -> bool {
        self.long_press_active
    }

    /// True iff the door was opened less than `window` before `now`.
    ///
    /// The bound is exclusive: exactly `window` after the opening is outside.
    pub fn opened_within(&self, now: Instant, window: Duration) -> bool {
        self.last_open
            .is_some_and(|at| now.duration_since(at) < window)
    }

    pub(crate) fn record_open(&mut self, at: Instant) {
        self.last_open = Some(at);
    }

    pub(crate) fn toggle_silent(&mut self) -> bool {
        self.silent = !self.silent;
        self.silent
    }

    pub(crate) fn set_long_press_active(&mut self, active: bool) {
        self.long_press_active = active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let state = CallState::new();
        assert_eq!(state.last_open(), None);
        assert!(!state.is_silent());
        assert!(!state.is_long_press_active());
        assert_eq!(state, CallState::default());
    }

    #[test]
    fn test_window_is_exclusive() {
        let mut state = CallState::new();
        let window = Duration::from_secs(60);
        assert!(!state.opened_within(Instant::from_secs(5), window));

        state.record_open(Instant::from_secs(100));
        assert!(state.opened_within(Instant::from_secs(100), window));
        assert!(state.opened_within(Instant::from_millis(159_999), window));
        assert!(!state.opened_within(Instant::from_secs(160), window));
    }

    #[test]
    fn test_toggle_silent() {
        let mut state = CallState::new();
        assert!(state.toggle_silent());
        assert!(!state.toggle_silent());
    }
}
