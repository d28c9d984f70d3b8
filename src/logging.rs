//! Unified logging macro for the bridge.
//!
//! `bus_log!` selects the backend from the active feature flags:
//!
//! - `log` (enabled by `usb-logger`) - routes through the `log` facade
//! - `defmt` without `log` - routes through `defmt`
//! - neither - compiles to nothing, which is what host tests get
//!
//! Keep format strings to plain `{}` / `{:?}` so they are valid for both
//! backends.
//!
//! ```text
//! bus_log!(info, "Bus frame accepted: {}", message);
//! bus_log!(warn, "Dropping frame {:?}", frame);
//! ```

/// Unified logging macro - selects `log::` or `defmt::` based on features.
#[macro_export]
#[cfg(feature = "log")]
macro_rules! bus_log {
    (info, $($arg:tt)*) => { ::log::info!($($arg)*) };
    (debug, $($arg:tt)*) => { ::log::debug!($($arg)*) };
    (warn, $($arg:tt)*) => { ::log::warn!($($arg)*) };
    (error, $($arg:tt)*) => { ::log::error!($($arg)*) };
    (trace, $($arg:tt)*) => { ::log::trace!($($arg)*) };
}

#[macro_export]
#[cfg(all(feature = "defmt", not(feature = "log")))]
macro_rules! bus_log {
    (info, $($arg:tt)*) => { ::defmt::info!($($arg)*) };
    (debug, $($arg:tt)*) => { ::defmt::debug!($($arg)*) };
    (warn, $($arg:tt)*) => { ::defmt::warn!($($arg)*) };
    (error, $($arg:tt)*) => { ::defmt::error!($($arg)*) };
    (trace, $($arg:tt)*) => { ::defmt::trace!($($arg)*) };
}

// Arguments are still type-checked so a missing backend never hides a broken
// log line.
#[macro_export]
#[cfg(not(any(feature = "log", feature = "defmt")))]
macro_rules! bus_log {
    ($level:ident, $($arg:tt)*) => {{
        let _ = ::core::format_args!($($arg)*);
    }};
}
