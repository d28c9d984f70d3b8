//! SimpleBus protocol implementation.
//!
//! This module contains the message code table and the 3-byte frame codec.
//! Nothing here performs I/O or keeps state.

pub mod constants;
pub mod frame;

pub use constants::*;
pub use frame::*;
