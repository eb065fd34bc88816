//! Data Transfer Objects (DTOs) for the status feed.
//!
//! - `websocket`: the JSON frames the feed sends
//! - `conversion`: frame → domain message conversion

pub mod conversion;
pub mod websocket;
