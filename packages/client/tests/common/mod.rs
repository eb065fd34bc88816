//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use lantern_client::domain::{
    Presentation, ReconnectPolicy, RenderSink, ServerGroup, ServerId, Summary, UptimeKind,
};

/// One call made on the sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Group { key: String, presentation: Presentation },
    Uptime { kind: UptimeKind, text: String },
    Summary(Summary),
    Players { key: String, usernames: Vec<String> },
}

/// Records every render call; clones share the same history
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    history: Arc<Mutex<Vec<Rendered>>>,
}

impl RecordingSink {
    pub fn history(&self) -> Vec<Rendered> {
        self.history.lock().unwrap().clone()
    }

    /// Every label rendered for the group, oldest first
    pub fn labels(&self, group_key: &str) -> Vec<String> {
        self.history()
            .into_iter()
            .filter_map(|rendered| match rendered {
                Rendered::Group { key, presentation } if key == group_key => {
                    Some(presentation.label)
                }
                _ => None,
            })
            .collect()
    }

    pub fn last_label(&self, group_key: &str) -> Option<String> {
        self.labels(group_key).pop()
    }

    pub fn uptimes(&self, kind: UptimeKind) -> Vec<String> {
        self.history()
            .into_iter()
            .filter_map(|rendered| match rendered {
                Rendered::Uptime { kind: k, text } if k == kind => Some(text),
                _ => None,
            })
            .collect()
    }

    fn push(&self, rendered: Rendered) {
        self.history.lock().unwrap().push(rendered);
    }
}

impl RenderSink for RecordingSink {
    fn render(&mut self, group_key: &str, presentation: &Presentation) {
        self.push(Rendered::Group {
            key: group_key.to_string(),
            presentation: presentation.clone(),
        });
    }

    fn render_uptime(&mut self, kind: UptimeKind, text: &str) {
        self.push(Rendered::Uptime {
            kind,
            text: text.to_string(),
        });
    }

    fn render_summary(&mut self, summary: &Summary) {
        self.push(Rendered::Summary(summary.clone()));
    }

    fn render_players(&mut self, group_key: &str, usernames: &[String]) {
        self.push(Rendered::Players {
            key: group_key.to_string(),
            usernames: usernames.to_vec(),
        });
    }
}

pub fn test_groups() -> Vec<ServerGroup> {
    vec![
        ServerGroup::aggregate("all", "All", vec![ServerId::new("a"), ServerId::new("b")])
            .unwrap(),
        ServerGroup::single("a", "A", ServerId::new("a")),
    ]
}

pub fn fast_policy(max_attempts: u32) -> ReconnectPolicy {
    ReconnectPolicy {
        connect_timeout: Duration::from_millis(500),
        max_attempts,
        delays: vec![Duration::from_millis(10)],
    }
}

pub const FULL_A: &str = r#"{"type":"full","servers":{"a":{"online":5,"isOnline":true},"b":{"online":0,"isOnline":false}},"players":{"online":"5"},"runningTime":120,"totalRunningTime":3600}"#;
