//! Output seam: whatever surface the monitor writes to.

use super::presentation::{Presentation, Summary, UptimeKind};

/// Rendering surface injected into the monitor.
///
/// Calls always describe the complete current value for their key, so a
/// sink may simply overwrite what it showed before.
#[cfg_attr(test, mockall::automock)]
pub trait RenderSink {
    /// One group's status tuple
    fn render(&mut self, group_key: &str, presentation: &Presentation);

    /// One uptime counter, already formatted
    fn render_uptime(&mut self, kind: UptimeKind, text: &str);

    /// The global banner
    fn render_summary(&mut self, summary: &Summary);

    /// Usernames currently on one of the group's servers
    fn render_players(&mut self, _group_key: &str, _usernames: &[String]) {}
}
