//! `RenderSink` that prints to a terminal (or any writer).

use std::collections::HashMap;
use std::io::Write;

use crate::domain::{Presentation, RenderSink, ServerGroup, Summary, UptimeKind};

use super::formatter::StatusFormatter;

/// Prints a line whenever a displayed value changes.
///
/// Repeated renders of an unchanged value print nothing, so the once-a-second
/// uptime refresh stays quiet until the minute rolls over.
pub struct TerminalSink<W: Write> {
    out: W,
    formatter: StatusFormatter,
    names: HashMap<String, String>,
    shown: HashMap<String, String>,
    show_players: bool,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, groups: &[ServerGroup], color: bool) -> Self {
        Self {
            out,
            formatter: StatusFormatter::new(color),
            names: groups
                .iter()
                .map(|group| (group.key().to_string(), group.name().to_string()))
                .collect(),
            shown: HashMap::new(),
            show_players: false,
        }
    }

    /// Also print who's-online lists
    pub fn with_players(mut self, show_players: bool) -> Self {
        self.show_players = show_players;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn name<'a>(&'a self, group_key: &'a str) -> &'a str {
        self.names
            .get(group_key)
            .map(String::as_str)
            .unwrap_or(group_key)
    }

    fn show(&mut self, slot: String, line: String) {
        if self.shown.get(&slot) == Some(&line) {
            return;
        }
        if let Err(e) = self
            .out
            .write_all(line.as_bytes())
            .and_then(|()| self.out.flush())
        {
            tracing::warn!("Failed to write status line: {}", e);
        }
        self.shown.insert(slot, line);
    }
}

impl<W: Write> RenderSink for TerminalSink<W> {
    fn render(&mut self, group_key: &str, presentation: &Presentation) {
        let line = self
            .formatter
            .format_group(self.name(group_key), presentation);
        self.show(format!("group:{}", group_key), line);
    }

    fn render_uptime(&mut self, kind: UptimeKind, text: &str) {
        let line = self.formatter.format_uptime(kind, text);
        self.show(format!("uptime:{}", kind.key()), line);
    }

    fn render_summary(&mut self, summary: &Summary) {
        let block = self.formatter.format_summary(summary);
        self.show("summary".to_string(), block);
    }

    fn render_players(&mut self, group_key: &str, usernames: &[String]) {
        if !self.show_players {
            return;
        }
        let line = self
            .formatter
            .format_players(self.name(group_key), usernames);
        self.show(format!("players:{}", group_key), line);
    }
}
