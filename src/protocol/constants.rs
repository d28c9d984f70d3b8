//! SimpleBus line constants and message code identifiers.

use core::time::Duration;

/// Length of a SimpleBus frame on the wire (3 bytes)
pub const FRAME_LEN: usize = 3;

/// Bus serial speed, 8N1
pub const BUS_BAUD_RATE: u32 = 4800;

/// Silence after which a partially received frame is dropped.
///
/// A byte takes about 2 ms at 4800 baud 8N1 and the three bytes of a frame
/// arrive back to back, so this is roughly five byte-times.
pub const FRAME_GAP_TIMEOUT: Duration = Duration::from_millis(10);

/// The bus hardware carries the message code as a 6-bit field
pub const CODE_MASK: u8 = 0x3F;

/// Highest code that survives the frame layout
pub const MAX_CODE: u8 = CODE_MASK;

/// Checksum is the low nibble of the popcount sum
pub const CHECKSUM_MASK: u8 = 0x0F;

// =============================================================================
// Message Codes
// =============================================================================

/// Known SimpleBus message codes.
///
/// Numeric values are fixed by the intercom hardware and must not change.
/// Any other code is valid on the wire but carries no meaning for the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MessageCode {
    /// Handset calls the main switchboard
    CallToMainSwitchboard = 8,
    /// Caretaker call to a door entry phone
    CallCaretakerDoorEntryPhone = 9,
    /// Release the door lock
    OpenDoor = 16,
    /// Handset lifted
    HookOff = 17,
    /// Handset replaced
    HookOn = 18,
    /// Call towards the secondary switchboard
    CallToSecondarySwitchboard = 19,
    /// Turn the entry camera on
    CameraOn = 20,
    /// Ring from the apartment (floor) door
    CallFromFloorDoor = 21,
    /// Intercom call between units
    CallIntercom = 24,
    /// Answer to an intercom call
    CallIntercomResponse = 26,
    /// Generic actuator command
    GenericActuator = 29,
    /// High priority call to the main switchboard
    HighPrioCallToMainSwitchboard = 30,
    /// Switchboard call, line 1
    CallFromSwitchboard1 = 32,
    /// Switchboard call, line 2
    CallFromSwitchboard2 = 37,
    /// Switchboard call, line 3
    CallFromSwitchboard3 = 42,
    /// Switchboard call, line 4
    CallFromSwitchboard4 = 43,
    /// Switchboard call, line 5, with the screen on
    CallFromSwitchboard5ScreenOn = 45,
    /// Ring from the entry door
    CallFromEntryDoor = 48,
    /// Video screen switched off
    ScreenOff = 49,
    /// Ring from the entry door with the screen on
    CallFromEntryDoorScreenOn = 50,
    /// Open-door button starts blinking
    StartBlinkingOpenDoorButton = 51,
    /// Open-door button stops blinking
    StopBlinkingOpenDoorButton = 52,
}

impl MessageCode {
    /// Convert a raw code to `MessageCode`
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            8 => Some(Self::CallToMainSwitchboard),
            9 => Some(Self::CallCaretakerDoorEntryPhone),
            16 => Some(Self::OpenDoor),
            17 => Some(Self::HookOff),
            18 => Some(Self::HookOn),
            19 => Some(Self::CallToSecondarySwitchboard),
            20 => Some(Self::CameraOn),
            21 => Some(Self::CallFromFloorDoor),
            24 => Some(Self::CallIntercom),
            26 => Some(Self::CallIntercomResponse),
            29 => Some(Self::GenericActuator),
            30 => Some(Self::HighPrioCallToMainSwitchboard),
            32 => Some(Self::CallFromSwitchboard1),
            37 => Some(Self::CallFromSwitchboard2),
            42 => Some(Self::CallFromSwitchboard3),
            43 => Some(Self::CallFromSwitchboard4),
            45 => Some(Self::CallFromSwitchboard5ScreenOn),
            48 => Some(Self::CallFromEntryDoor),
            49 => Some(Self::ScreenOff),
            50 => Some(Self::CallFromEntryDoorScreenOn),
            51 => Some(Self::StartBlinkingOpenDoorButton),
            52 => Some(Self::StopBlinkingOpenDoorButton),
            _ => None,
        }
    }

    /// Convert `MessageCode` to its wire value
    pub const fn to_u8(self) -> u8 {
        self as u8
    }
}

impl From<MessageCode> for u8 {
    fn from(code: MessageCode) -> u8 {
        code.to_u8()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_round_trip() {
        for raw in 0..=u8::MAX {
            if let Some(code) = MessageCode::from_u8(raw) {
                assert_eq!(code.to_u8(), raw);
                assert!(raw <= MAX_CODE);
            }
        }
    }

    #[test]
    fn test_contract_values() {
        assert_eq!(MessageCode::OpenDoor.to_u8(), 16);
        assert_eq!(MessageCode::CallToSecondarySwitchboard.to_u8(), 19);
        assert_eq!(MessageCode::CallFromEntryDoor.to_u8(), 48);
        assert_eq!(MessageCode::CallFromEntryDoorScreenOn.to_u8(), 50);
    }

    #[test]
    fn test_undocumented_code_is_unknown() {
        assert_eq!(MessageCode::from_u8(33), None);
        assert_eq!(MessageCode::from_u8(0), None);
    }
}
