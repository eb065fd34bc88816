//! Terminal rendering surface.

pub mod formatter;
pub mod terminal;

pub use terminal::TerminalSink;
