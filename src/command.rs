//! Remote command payloads.
//!
//! A companion app or home-automation controller asks the bridge to put a
//! message on the bus. Two payload shapes are understood:
//!
//! - a plain keyword addressed to this unit: `open_door`, `camera_on`
//! - a JSON object with integer fields: `{"code": 16, "address": 12}`
//!   (feature `json`)
//!
//! Anything else is rejected before it gets near the bus.

use crate::error::{BridgeError, Result};
use crate::protocol::{Message, MessageCode, MAX_CODE};

#[cfg(feature = "json")]
use alloc::string::String;

/// A validated request to transmit a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RemoteCommand {
    code: u8,
    address: u8,
}

impl RemoteCommand {
    /// Validate raw integer fields.
    ///
    /// Non-zero codes above 63 are refused on purpose rather than sent as-is:
    /// their top two bits would land in the address nibble of the frame, so
    /// the line would carry a different code for a different unit.
    ///
    /// # Errors
    ///
    /// Out of range if `code` is not in `1..=63` or `address` is not in
    /// `0..=255`.
    pub fn new(code: i64, address: i64) -> Result<Self> {
        let code = u8::try_from(code)
            .ok()
            .filter(|code| (1..=MAX_CODE).contains(code))
            .ok_or_else(BridgeError::command_out_of_range)?;
        let address = u8::try_from(address)
            .ok()
            .ok_or_else(BridgeError::command_out_of_range)?;
        Ok(Self { code, address })
    }

    /// Command carrying a known code
    pub const fn from_code(code: MessageCode, address: u8) -> Self {
        Self {
            code: code.to_u8(),
            address,
        }
    }

    /// Parse a payload received on the remote channel.
    ///
    /// Keywords are addressed to `own_address`. Surrounding ASCII whitespace
    /// is ignored.
    ///
    /// # Errors
    ///
    /// - unknown keyword
    /// - JSON that does not parse, or a field that is not an integer
    /// - missing `code` or `address`
    /// - values outside the bus range
    ///
    /// # Examples
    ///
    /// ```
    /// use simplebus_bridge::command::RemoteCommand;
    /// use simplebus_bridge::protocol::Message;
    ///
    /// let cmd = RemoteCommand::parse(b"open_door\n", 12).unwrap();
    /// assert_eq!(cmd.message(), Message::new(16, 12));
    ///
    /// assert!(RemoteCommand::parse(b"ring", 12).is_err());
    /// ```
    pub fn parse(payload: &[u8], own_address: u8) -> Result<Self> {
        let payload = payload.trim_ascii();

        match payload {
            b"open_door" => Ok(Self::from_code(MessageCode::OpenDoor, own_address)),
            b"camera_on" => Ok(Self::from_code(MessageCode::CameraOn, own_address)),
            [b'{', ..] => Self::parse_json(payload),
            [] => Err(BridgeError::malformed_command()),
            _ => Err(BridgeError::unknown_keyword()),
        }
    }

    #[cfg(feature = "json")]
    fn parse_json(payload: &[u8]) -> Result<Self> {
        #[derive(serde::Deserialize)]
        struct RawCommand {
            code: Option<i64>,
            address: Option<i64>,
        }

        let Ok(raw) = serde_json::from_slice::<RawCommand>(payload) else {
            return Err(BridgeError::malformed_command());
        };
        match (raw.code, raw.address) {
            (Some(code), Some(address)) => Self::new(code, address),
            _ => Err(BridgeError::missing_field()),
        }
    }

    #[cfg(not(feature = "json"))]
    fn parse_json(_payload: &[u8]) -> Result<Self> {
        Err(BridgeError::malformed_command())
    }

    /// Message code to send
    pub const fn code(&self) -> u8 {
        self.code
    }

    /// Destination address
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// The bus message this command asks for
    pub const fn message(&self) -> Message {
        Message::new(self.code, self.address)
    }
}

/// Render a received message for the remote channel as
/// `{"code":n,"address":m}`.
#[cfg(feature = "json")]
pub fn observation_json(message: &Message) -> Result<String> {
    let Ok(json) = serde_json::to_string(message) else {
        return Err(BridgeError::malformed_command());
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        let cmd = RemoteCommand::parse(b"open_door", 7).unwrap();
        assert_eq!(cmd.message(), Message::new(16, 7));

        let cmd = RemoteCommand::parse(b"  camera_on\r\n", 7).unwrap();
        assert_eq!(cmd.message(), Message::new(20, 7));
    }

    #[test]
    fn test_unknown_keyword() {
        let err = RemoteCommand::parse(b"OPEN_DOOR", 7).unwrap_err();
        assert!(err.as_command().unwrap().is_unknown_keyword());
    }

    #[test]
    fn test_empty_payload() {
        let err = RemoteCommand::parse(b"  \n", 7).unwrap_err();
        assert!(err.as_command().unwrap().is_malformed());
    }

    #[test]
    fn test_new_ranges() {
        assert!(RemoteCommand::new(1, 0).is_ok());
        assert!(RemoteCommand::new(63, 255).is_ok());

        for (code, address) in [(0, 12), (64, 12), (-1, 12), (16, -1), (16, 256)] {
            let err = RemoteCommand::new(code, address).unwrap_err();
            assert!(err.as_command().unwrap().is_out_of_range(), "{code} {address}");
        }
    }

    #[test]
    fn test_wide_codes_never_reach_the_bus() {
        for code in [64_u8, 80, 0xC0, 0xFF] {
            assert!(!Message::new(code, 12).is_representable());
            let err = RemoteCommand::new(i64::from(code), 12).unwrap_err();
            assert!(err.as_command().unwrap().is_out_of_range());
        }
    }

    #[cfg(not(feature = "json"))]
    #[test]
    fn test_json_payload_without_json_support() {
        let err = RemoteCommand::parse(br#"{"code": 16, "address": 12}"#, 12).unwrap_err();
        assert!(err.as_command().unwrap().is_malformed());
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_json_command() {
        let cmd = RemoteCommand::parse(br#"{"code": 50, "address": 3}"#, 12).unwrap();
        assert_eq!(cmd.code(), 50);
        assert_eq!(cmd.address(), 3);
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_json_rejections() {
        let err = RemoteCommand::parse(br#"{"code": 16}"#, 12).unwrap_err();
        assert!(err.as_command().unwrap().is_missing_field());

        let err = RemoteCommand::parse(br#"{"code": "16", "address": 12}"#, 12).unwrap_err();
        assert!(err.as_command().unwrap().is_malformed());

        let err = RemoteCommand::parse(br#"{"code": 16.5, "address": 12}"#, 12).unwrap_err();
        assert!(err.as_command().unwrap().is_malformed());

        let err = RemoteCommand::parse(br#"{"code": 16, "address": 12"#, 12).unwrap_err();
        assert!(err.as_command().unwrap().is_malformed());

        let err = RemoteCommand::parse(br#"{"code": 0, "address": 12}"#, 12).unwrap_err();
        assert!(err.as_command().unwrap().is_out_of_range());
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_observation_json() {
        let json = observation_json(&Message::new(48, 12)).unwrap();
        assert_eq!(json, r#"{"code":48,"address":12}"#);
    }
}
