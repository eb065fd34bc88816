//! Infrastructure layer: wire formats and the concrete feed transport.

pub mod dto;
pub mod transport;
