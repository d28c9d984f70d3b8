//! Convenience macros for building bus messages.

/// Creates a [`Message`](crate::protocol::Message) with compile-time checks.
///
/// # Syntax
///
/// ```text
/// bus_message!(CodeName @ address)
/// bus_message!(code @ address)
/// ```
///
/// `CodeName` is a [`MessageCode`](crate::protocol::MessageCode) variant. A
/// numeric code must be in `1..=63`, the range the bus can carry.
///
/// # Examples
///
/// ```
/// use simplebus_bridge::bus_message;
/// use simplebus_bridge::protocol::Message;
///
/// assert_eq!(bus_message!(OpenDoor @ 12), Message::new(16, 12));
/// assert_eq!(bus_message!(33 @ 4), Message::new(33, 4));
/// ```
///
/// # Compile-Time Validation
///
/// ```compile_fail
/// // Code zero is the idle line
/// let msg = simplebus_bridge::bus_message!(0 @ 12);
/// ```
///
/// ```compile_fail
/// // Does not fit the 6-bit code field
/// let msg = simplebus_bridge::bus_message!(64 @ 12);
/// ```
#[macro_export]
macro_rules! bus_message {
    ($code:ident @ $address:literal) => {{
        const _: () = {
            if $address > 255 {
                panic!("Address must be 0-255");
            }
        };
        $crate::protocol::Message::from_code($crate::protocol::MessageCode::$code, $address)
    }};
    ($code:literal @ $address:literal) => {{
        const _: () = {
            if $code < 1 || $code > 63 {
                panic!("Code must be 1-63");
            }
            if $address > 255 {
                panic!("Address must be 0-255");
            }
        };
        $crate::protocol::Message::new($code, $address)
    }};
}

#[cfg(test)]
mod tests {
    use crate::protocol::{Message, MessageCode};

    #[test]
    fn test_named_code() {
        let msg = bus_message!(CallFromEntryDoorScreenOn @ 12);
        assert_eq!(msg, Message::from_code(MessageCode::CallFromEntryDoorScreenOn, 12));
    }

    #[test]
    fn test_numeric_code() {
        assert_eq!(bus_message!(63 @ 255), Message::new(63, 255));
        assert_eq!(bus_message!(1 @ 0), Message::new(1, 0));
    }
}
