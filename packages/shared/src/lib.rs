//! Utilities shared by the Lantern binaries: logging setup and clocks.

pub mod logger;
pub mod time;
