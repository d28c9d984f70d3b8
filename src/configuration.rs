//! File di configurazione di variabili ambiente
//! da modificare a seconda del proprio ambiente.
//!
//! `CONFIG` is compiled into the firmware; [`BridgeConfig::parse`] turns the
//! call-handling keys into typed settings. Missing keys fall back to the
//! stock values, malformed ones are rejected.

use core::time::Duration;

use crate::call::{ScreenOffCallPolicy, CALL_WINDOW, LONG_PRESS, SETTLE_DELAY};
use crate::error::{BridgeError, Result};
use crate::utility::config_value;

pub const CONFIG: &str = r#"
WIFI_NETWORK=YOUR_WIFI_SSID
WIFI_PASSWORD=YOUR_WIFI_PASSWORD
INTERCOM_ADDRESS=12
REMOTE_PEER_IP=192.168.1.50
REMOTE_PORT=4210
CALL_WINDOW_SECS=60
SETTLE_DELAY_MS=2500
LONG_PRESS_MS=1000
SCREEN_OFF_CALL=ignore
"#;

/// Longest accepted pause before an automatic reopen.
pub const MAX_SETTLE_DELAY: Duration = Duration::from_secs(10);

/// Default bus address of this unit.
pub const DEFAULT_ADDRESS: u8 = 12;

/// Call-handling settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Bus address of this unit
    pub address: u8,
    /// Repeated calls inside this window trigger the reopen logic
    pub call_window: Duration,
    /// Pause before an automatic reopen
    pub settle_delay: Duration,
    /// Hold time for a long button press
    pub long_press: Duration,
    /// Handling of screen-off calls inside the window
    pub screen_off_call: ScreenOffCallPolicy,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            call_window: CALL_WINDOW,
            settle_delay: SETTLE_DELAY,
            long_press: LONG_PRESS,
            screen_off_call: ScreenOffCallPolicy::Ignore,
        }
    }
}

impl BridgeConfig {
    /// Parse `KEY=VALUE` configuration text.
    ///
    /// # Errors
    ///
    /// - a value is not a number (or not a known policy name)
    /// - the address does not fit 8 bits
    /// - the call window or long press is zero
    /// - the settle delay exceeds [`MAX_SETTLE_DELAY`]
    ///
    /// # Examples
    ///
    /// ```
    /// use simplebus_bridge::configuration::BridgeConfig;
    ///
    /// let config = BridgeConfig::parse("INTERCOM_ADDRESS=7\nSETTLE_DELAY_MS=3000").unwrap();
    /// assert_eq!(config.address, 7);
    /// assert_eq!(config.settle_delay.as_millis(), 3000);
    /// assert_eq!(config.call_window.as_secs(), 60);
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let mut config = Self::default();

        if let Some(address) = number(text, "INTERCOM_ADDRESS")? {
            config.address = u8::try_from(address)
                .ok()
                .ok_or_else(BridgeError::config_out_of_range)?;
        }
        if let Some(secs) = number(text, "CALL_WINDOW_SECS")? {
            config.call_window = nonzero(Duration::from_secs(secs))?;
        }
        if let Some(millis) = number(text, "SETTLE_DELAY_MS")? {
            let delay = Duration::from_millis(millis);
            if delay > MAX_SETTLE_DELAY {
                return Err(BridgeError::config_out_of_range());
            }
            config.settle_delay = delay;
        }
        if let Some(millis) = number(text, "LONG_PRESS_MS")? {
            config.long_press = nonzero(Duration::from_millis(millis))?;
        }
        if let Some(policy) = config_value(text, "SCREEN_OFF_CALL") {
            config.screen_off_call = policy.parse()?;
        }

        Ok(config)
    }

    /// Settings from the compiled-in [`CONFIG`].
    pub fn from_build_config() -> Result<Self> {
        Self::parse(CONFIG)
    }
}

fn number(text: &str, key: &str) -> Result<Option<u64>> {
    config_value(text, key)
        .map(|value| {
            value
                .parse::<u64>()
                .ok()
                .ok_or_else(BridgeError::invalid_config_value)
        })
        .transpose()
}

fn nonzero(duration: Duration) -> Result<Duration> {
    if duration.is_zero() {
        Err(BridgeError::config_out_of_range())
    } else {
        Ok(duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_config_matches_defaults() {
        assert_eq!(BridgeConfig::from_build_config().unwrap(), BridgeConfig::default());
    }

    #[test]
    fn test_empty_text_gives_defaults() {
        let config = BridgeConfig::parse("").unwrap();
        assert_eq!(config.address, 12);
        assert_eq!(config.call_window, Duration::from_secs(60));
        assert_eq!(config.settle_delay, Duration::from_millis(2500));
        assert_eq!(config.long_press, Duration::from_millis(1000));
        assert_eq!(config.screen_off_call, ScreenOffCallPolicy::Ignore);
    }

    #[test]
    fn test_overrides() {
        let text = "CALL_WINDOW_SECS=90\nLONG_PRESS_MS=1500\nSCREEN_OFF_CALL=auto-reopen\n";
        let config = BridgeConfig::parse(text).unwrap();
        assert_eq!(config.call_window, Duration::from_secs(90));
        assert_eq!(config.long_press, Duration::from_millis(1500));
        assert_eq!(config.screen_off_call, ScreenOffCallPolicy::AutoReopen);
    }

    #[test]
    fn test_rejections() {
        let err = BridgeConfig::parse("INTERCOM_ADDRESS=twelve").unwrap_err();
        assert!(err.as_config().unwrap().is_invalid_value());

        let err = BridgeConfig::parse("INTERCOM_ADDRESS=300").unwrap_err();
        assert!(err.as_config().unwrap().is_out_of_range());

        let err = BridgeConfig::parse("SETTLE_DELAY_MS=10001").unwrap_err();
        assert!(err.as_config().unwrap().is_out_of_range());

        let err = BridgeConfig::parse("CALL_WINDOW_SECS=0").unwrap_err();
        assert!(err.as_config().unwrap().is_out_of_range());

        let err = BridgeConfig::parse("SCREEN_OFF_CALL=maybe").unwrap_err();
        assert!(err.as_config().unwrap().is_invalid_value());
    }
}
