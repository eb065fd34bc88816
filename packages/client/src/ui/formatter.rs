//! Line formatting for the terminal surface.

use crate::domain::{ColorClass, Presentation, Summary, UptimeKind};

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const BLINK: &str = "\x1b[5m";
const RESET: &str = "\x1b[0m";

/// Marker appended to pulsing entries when colors are off
const PULSE_MARKER: &str = " ...";

/// Status line formatter for terminal display
#[derive(Debug, Clone, Copy)]
pub struct StatusFormatter {
    color: bool,
}

impl StatusFormatter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Format one group's status line
    ///
    /// # Arguments
    ///
    /// * `name` - Display name of the group
    /// * `presentation` - The projected status
    ///
    /// # Returns
    ///
    /// A single line such as `Survival: 12 online`
    pub fn format_group(&self, name: &str, presentation: &Presentation) -> String {
        format!("{}: {}\n", name, self.paint(presentation))
    }

    /// Format an uptime line
    pub fn format_uptime(&self, kind: UptimeKind, text: &str) -> String {
        let title = match kind {
            UptimeKind::Current => "Uptime",
            UptimeKind::Cumulative => "Total uptime",
        };
        format!("{}: {}\n", title, text)
    }

    /// Format the global banner, with the maintenance start when present
    pub fn format_summary(&self, summary: &Summary) -> String {
        let mut output = String::new();
        output.push_str("============================================================\n");
        output.push_str(&format!("Players: {}\n", self.paint(&summary.presentation)));
        if let Some(since) = &summary.maintenance_since {
            output.push_str(&format!("Maintenance since {}\n", since));
        }
        output.push_str("============================================================\n");
        output
    }

    /// Format the who's-online list of a group
    pub fn format_players(&self, name: &str, usernames: &[String]) -> String {
        if usernames.is_empty() {
            format!("{}: (No players)\n", name)
        } else {
            format!("{}: {}\n", name, usernames.join(", "))
        }
    }

    fn paint(&self, presentation: &Presentation) -> String {
        if !self.color {
            let marker = if presentation.pulsing { PULSE_MARKER } else { "" };
            return format!("{}{}", presentation.label, marker);
        }
        let color = match presentation.color {
            ColorClass::Green => GREEN,
            ColorClass::Yellow => YELLOW,
            ColorClass::Red => RED,
        };
        let blink = if presentation.pulsing { BLINK } else { "" };
        format!("{}{}{}{}", color, blink, presentation.label, RESET)
    }
}
