//! Error types for bridge operations.
//!
//! Every error carries a small private kind and exposes `is_*` helpers instead
//! of public enum variants, so new failure causes can be added without
//! breaking callers. Backtraces are captured when the `std` feature is enabled.

use core::fmt;

#[cfg(feature = "std")]
use std::backtrace::Backtrace;

/// Result type alias for bridge operations.
pub type Result<T> = core::result::Result<T, BridgeError>;

// =============================================================================
// Error Kind Enums (Internal)
// =============================================================================

/// Frame decoding failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProtocolErrorKind {
    /// Decoded code was zero (idle line or noise)
    ZeroCode,
    /// Checksum nibble does not match the payload
    InvalidChecksum,
}

/// Remote command failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CommandErrorKind {
    Malformed,
    MissingField,
    OutOfRange,
    UnknownKeyword,
}

/// Bus transport failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransportErrorKind {
    SendFailed,
    ReceiveFailed,
    Closed,
}

/// Configuration failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfigErrorKind {
    InvalidValue,
    OutOfRange,
}

// =============================================================================
// Main Error Type
// =============================================================================

/// Bridge error type.
///
/// Nothing in the call-handling core is fatal: callers are expected to log
/// these and keep the control loop running.
#[derive(Debug)]
pub enum BridgeError {
    /// Frame-level errors (checksum, zero code)
    Protocol(ProtocolError),
    /// Remote command payload errors
    Command(CommandError),
    /// Bus transport errors
    Transport(TransportError),
    /// Configuration parsing errors
    Config(ConfigError),
    /// No data arrived in time
    Timeout,
}

// =============================================================================
// Structured Error Types
// =============================================================================

/// Frame decoding error
#[derive(Debug)]
pub struct ProtocolError {
    kind: ProtocolErrorKind,
    #[cfg(feature = "std")]
    backtrace: Backtrace,
}

impl ProtocolError {
    pub(crate) fn new(kind: ProtocolErrorKind) -> Self {
        Self {
            kind,
            #[cfg(feature = "std")]
            backtrace: Backtrace::capture(),
        }
    }

    /// The frame decoded to code zero
    pub fn is_zero_code(&self) -> bool {
        matches!(self.kind, ProtocolErrorKind::ZeroCode)
    }

    /// The checksum nibble did not match
    pub fn is_invalid_checksum(&self) -> bool {
        matches!(self.kind, ProtocolErrorKind::InvalidChecksum)
    }

    /// Where the error was raised
    #[cfg(feature = "std")]
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

/// Remote command error
#[derive(Debug)]
pub struct CommandError {
    kind: CommandErrorKind,
    #[cfg(feature = "std")]
    backtrace: Backtrace,
}

impl CommandError {
    pub(crate) fn new(kind: CommandErrorKind) -> Self {
        Self {
            kind,
            #[cfg(feature = "std")]
            backtrace: Backtrace::capture(),
        }
    }

    /// Payload could not be parsed at all, or a field was not an integer
    pub fn is_malformed(&self) -> bool {
        matches!(self.kind, CommandErrorKind::Malformed)
    }

    /// `code` or `address` was absent
    pub fn is_missing_field(&self) -> bool {
        matches!(self.kind, CommandErrorKind::MissingField)
    }

    /// A field was numeric but outside the bus range
    pub fn is_out_of_range(&self) -> bool {
        matches!(self.kind, CommandErrorKind::OutOfRange)
    }

    /// Plain-text payload is not a known keyword
    pub fn is_unknown_keyword(&self) -> bool {
        matches!(self.kind, CommandErrorKind::UnknownKeyword)
    }

    /// Where the error was raised
    #[cfg(feature = "std")]
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

/// Transport error
#[derive(Debug)]
pub struct TransportError {
    kind: TransportErrorKind,
    #[cfg(feature = "std")]
    backtrace: Backtrace,
}

impl TransportError {
    pub(crate) fn new(kind: TransportErrorKind) -> Self {
        Self {
            kind,
            #[cfg(feature = "std")]
            backtrace: Backtrace::capture(),
        }
    }

    /// Writing a frame failed
    pub fn is_send_failed(&self) -> bool {
        matches!(self.kind, TransportErrorKind::SendFailed)
    }

    /// Reading from the line failed
    pub fn is_receive_failed(&self) -> bool {
        matches!(self.kind, TransportErrorKind::ReceiveFailed)
    }

    /// The underlying channel reported end of stream
    pub fn is_closed(&self) -> bool {
        matches!(self.kind, TransportErrorKind::Closed)
    }

    /// Where the error was raised
    #[cfg(feature = "std")]
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    kind: ConfigErrorKind,
    #[cfg(feature = "std")]
    backtrace: Backtrace,
}

impl ConfigError {
    pub(crate) fn new(kind: ConfigErrorKind) -> Self {
        Self {
            kind,
            #[cfg(feature = "std")]
            backtrace: Backtrace::capture(),
        }
    }

    /// A value could not be parsed
    pub fn is_invalid_value(&self) -> bool {
        matches!(self.kind, ConfigErrorKind::InvalidValue)
    }

    /// A value parsed but is outside the accepted bounds
    pub fn is_out_of_range(&self) -> bool {
        matches!(self.kind, ConfigErrorKind::OutOfRange)
    }

    /// Where the error was raised
    #[cfg(feature = "std")]
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

// =============================================================================
// Convenience Constructors for BridgeError
// =============================================================================

impl BridgeError {
    // Protocol errors
    pub(crate) fn zero_code() -> Self {
        Self::Protocol(ProtocolError::new(ProtocolErrorKind::ZeroCode))
    }

    pub(crate) fn invalid_checksum() -> Self {
        Self::Protocol(ProtocolError::new(ProtocolErrorKind::InvalidChecksum))
    }

    // Command errors
    pub(crate) fn malformed_command() -> Self {
        Self::Command(CommandError::new(CommandErrorKind::Malformed))
    }

    #[cfg_attr(not(feature = "json"), allow(dead_code, reason = "only JSON payloads have fields"))]
    pub(crate) fn missing_field() -> Self {
        Self::Command(CommandError::new(CommandErrorKind::MissingField))
    }

    pub(crate) fn command_out_of_range() -> Self {
        Self::Command(CommandError::new(CommandErrorKind::OutOfRange))
    }

    pub(crate) fn unknown_keyword() -> Self {
        Self::Command(CommandError::new(CommandErrorKind::UnknownKeyword))
    }

    // Transport errors
    pub(crate) fn send_failed() -> Self {
        Self::Transport(TransportError::new(TransportErrorKind::SendFailed))
    }

    pub(crate) fn receive_failed() -> Self {
        Self::Transport(TransportError::new(TransportErrorKind::ReceiveFailed))
    }

    pub(crate) fn transport_closed() -> Self {
        Self::Transport(TransportError::new(TransportErrorKind::Closed))
    }

    // Config errors
    pub(crate) fn invalid_config_value() -> Self {
        Self::Config(ConfigError::new(ConfigErrorKind::InvalidValue))
    }

    pub(crate) fn config_out_of_range() -> Self {
        Self::Config(ConfigError::new(ConfigErrorKind::OutOfRange))
    }

    /// Returns the protocol error, if this is one.
    pub fn as_protocol(&self) -> Option<&ProtocolError> {
        match self {
            Self::Protocol(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the command error, if this is one.
    pub fn as_command(&self) -> Option<&CommandError> {
        match self {
            Self::Command(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the transport error, if this is one.
    pub fn as_transport(&self) -> Option<&TransportError> {
        match self {
            Self::Transport(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the configuration error, if this is one.
    pub fn as_config(&self) -> Option<&ConfigError> {
        match self {
            Self::Config(e) => Some(e),
            _ => None,
        }
    }

    /// Backtrace captured when the error was raised. `Timeout` has none.
    #[cfg(feature = "std")]
    pub fn backtrace(&self) -> Option<&Backtrace> {
        match self {
            Self::Protocol(e) => Some(e.backtrace()),
            Self::Command(e) => Some(e.backtrace()),
            Self::Transport(e) => Some(e.backtrace()),
            Self::Config(e) => Some(e.backtrace()),
            Self::Timeout => None,
        }
    }
}

// =============================================================================
// Display Implementation
// =============================================================================

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::Protocol(e) => write!(f, "Protocol error: {:?}", e.kind),
            BridgeError::Command(e) => write!(f, "Command error: {:?}", e.kind),
            BridgeError::Transport(e) => write!(f, "Transport error: {:?}", e.kind),
            BridgeError::Config(e) => write!(f, "Config error: {:?}", e.kind),
            BridgeError::Timeout => write!(f, "Operation timeout"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for BridgeError {
    fn format(&self, f: defmt::Formatter<'_>) {
        defmt::write!(f, "{}", defmt::Display2Format(self));
    }
}

// Implement std::error::Error for std-based applications
#[cfg(feature = "std")]
impl std::error::Error for BridgeError {}
