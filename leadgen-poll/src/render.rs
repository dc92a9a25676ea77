//! Plain-text rendering of a poll session

use std::io::Write;

use leadgen_common::entry::{sort_key, Record};
use leadgen_common::search::format_label;
use leadgen_common::time;
use serde_json::Value;

use crate::runner::SessionView;
use crate::session::{PollPhase, PollSession};

/// How results are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// One card per result
    #[default]
    Cards,
    /// The whole list as pretty-printed JSON
    Json,
}

pub fn render_header(session: &PollSession) -> String {
    let mut out = String::from("Webhook Results\n");
    out.push_str(&format!(
        "Polling: {}  |  Sort: {}{}\n",
        if session.is_polling() { "active" } else { "paused" },
        session.sort().label(),
        if session.phase() == PollPhase::Fetching {
            "  |  refreshing..."
        } else {
            ""
        },
    ));
    out.push_str(&format!(
        "Last updated: {}\n",
        session
            .last_updated()
            .map(|t| time::to_iso(&t))
            .unwrap_or_else(|| "Never".to_string())
    ));
    if let Some(error) = session.error() {
        out.push_str(&format!("Error: {}\n", error));
    }
    if session.is_delete_pending() {
        out.push_str("Delete all results? Press y to confirm, n to cancel.\n");
    }
    out
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Array(items) if items.is_empty() => "None".to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => serde_json::to_string_pretty(value).unwrap_or_default(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn render_card(index: usize, record: &Record) -> String {
    let mut out = format!("Result #{}\n", index + 1);
    if let Some(received) = sort_key(record) {
        out.push_str(&format!("Received: {}\n", time::to_iso(&received)));
    }
    for (key, value) in record {
        let shown = display_value(value);
        if shown.contains('\n') {
            out.push_str(&format!("  {}:\n", format_label(key)));
            for line in shown.lines() {
                out.push_str(&format!("    {}\n", line));
            }
        } else {
            out.push_str(&format!("  {}: {}\n", format_label(key), shown));
        }
    }
    out
}

pub fn render_cards(results: &[Record]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, record)| render_card(i, record))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_json(results: &[Record]) -> String {
    serde_json::to_string_pretty(results).unwrap_or_else(|_| "[]".to_string())
}

/// Header plus results (or the empty-state notice)
pub fn render_session(session: &PollSession, mode: ViewMode) -> String {
    let mut out = render_header(session);
    out.push('\n');

    if session.results().is_empty() {
        if session.phase() == PollPhase::Fetching {
            out.push_str("Loading...\n");
        } else {
            out.push_str("No data yet. Results sent to the webhook will appear here.\n");
        }
        return out;
    }

    match mode {
        ViewMode::Cards => out.push_str(&render_cards(session.results())),
        ViewMode::Json => {
            out.push_str(&render_json(session.results()));
            out.push('\n');
        }
    }
    out
}

/// Redraws the whole session on a terminal
pub struct TerminalView<W: Write + Send> {
    out: W,
    mode: ViewMode,
}

impl<W: Write + Send> TerminalView<W> {
    pub fn new(out: W, mode: ViewMode) -> Self {
        Self { out, mode }
    }
}

impl<W: Write + Send> SessionView for TerminalView<W> {
    fn show(&mut self, session: &PollSession) {
        // Clear screen, cursor home
        let frame = format!(
            "\x1b[2J\x1b[H{}\n[r]efresh  [s]ort  [p]olling  [d]elete all  [q]uit\n",
            render_session(session, self.mode)
        );
        if let Err(e) = self
            .out
            .write_all(frame.as_bytes())
            .and_then(|_| self.out.flush())
        {
            tracing::warn!("Failed to draw session: {}", e);
        }
    }
}
