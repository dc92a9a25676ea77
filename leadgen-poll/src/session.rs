//! Poll session state machine
//!
//! `Idle -> Fetching -> Idle`, repeating. A failed fetch or delete never
//! discards the last list that was fetched successfully.

use chrono::{DateTime, Utc};
use leadgen_common::api::{ListResponse, MessageResponse};
use leadgen_common::entry::{sort_key, Record};

use crate::client::ClientError;

/// Order of the displayed results by timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Newest first
    #[default]
    Descending,
    /// Oldest first
    Ascending,
}

impl SortOrder {
    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Descending => SortOrder::Ascending,
            SortOrder::Ascending => SortOrder::Descending,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::Descending => "newest first",
            SortOrder::Ascending => "oldest first",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollPhase {
    #[default]
    Idle,
    Fetching,
}

/// Client-side view of the receiver's accumulated results
#[derive(Debug, Clone)]
pub struct PollSession {
    phase: PollPhase,
    results: Vec<Record>,
    last_updated: Option<DateTime<Utc>>,
    error: Option<String>,
    sort: SortOrder,
    polling: bool,
    pending_delete_confirmation: bool,
}

impl Default for PollSession {
    fn default() -> Self {
        Self {
            phase: PollPhase::Idle,
            results: Vec::new(),
            last_updated: None,
            error: None,
            sort: SortOrder::default(),
            polling: true,
            pending_delete_confirmation: false,
        }
    }
}

impl PollSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> PollPhase {
        self.phase
    }

    pub fn results(&self) -> &[Record] {
        &self.results
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    pub fn is_polling(&self) -> bool {
        self.polling
    }

    pub fn is_delete_pending(&self) -> bool {
        self.pending_delete_confirmation
    }

    pub fn begin_fetch(&mut self) {
        self.phase = PollPhase::Fetching;
    }

    /// Apply the outcome of a list request
    pub fn finish_fetch(&mut self, outcome: Result<ListResponse, ClientError>) {
        self.phase = PollPhase::Idle;
        match outcome {
            Ok(snapshot) => {
                self.results = snapshot.results;
                self.last_updated = snapshot.last_updated;
                self.error = None;
                self.resort();
            }
            Err(e) => {
                self.error = Some(e.to_string());
            }
        }
    }

    /// Flip the order and re-sort the held list; no request is made
    pub fn toggle_sort(&mut self) {
        self.sort = self.sort.flipped();
        self.resort();
    }

    /// Suspend or resume timer-driven fetches; returns the new state
    pub fn toggle_polling(&mut self) -> bool {
        self.polling = !self.polling;
        self.polling
    }

    /// First step of delete-all: ask for confirmation
    pub fn request_delete(&mut self) {
        self.pending_delete_confirmation = true;
    }

    /// True when a delete request should now be sent
    pub fn confirm_delete(&mut self) -> bool {
        std::mem::take(&mut self.pending_delete_confirmation)
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete_confirmation = false;
    }

    /// Apply the outcome of a delete request
    pub fn finish_delete(&mut self, outcome: Result<MessageResponse, ClientError>) {
        match outcome {
            Ok(_) => {
                self.results.clear();
                self.last_updated = None;
                self.error = None;
            }
            Err(e) => {
                self.error = Some(format!("Failed to delete results: {}", e));
            }
        }
    }

    fn resort(&mut self) {
        // Stable sort: records with equal keys keep their relative order
        match self.sort {
            SortOrder::Descending => self.results.sort_by(|a, b| sort_key(b).cmp(&sort_key(a))),
            SortOrder::Ascending => self.results.sort_by(|a, b| sort_key(a).cmp(&sort_key(b))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("test records are objects"),
        }
    }

    fn snapshot() -> ListResponse {
        ListResponse {
            success: true,
            results: vec![
                record(json!({"n": 1, "_receivedAt": "2025-05-14T09:00:00.000Z"})),
                record(json!({"n": 2, "_receivedAt": "2025-05-14T11:00:00.000Z"})),
                record(json!({"n": 3, "timestamp": "2025-05-14T10:00:00.000Z"})),
            ],
            last_updated: leadgen_common::time::parse_iso("2025-05-14T11:00:00.000Z"),
        }
    }

    fn order(session: &PollSession) -> Vec<i64> {
        session
            .results()
            .iter()
            .map(|r| r["n"].as_i64().unwrap())
            .collect()
    }

    #[test]
    fn test_defaults() {
        let session = PollSession::new();
        assert_eq!(session.phase(), PollPhase::Idle);
        assert_eq!(session.sort(), SortOrder::Descending);
        assert!(session.is_polling());
        assert!(session.results().is_empty());
        assert!(session.last_updated().is_none());
    }

    #[test]
    fn test_fetch_success_sorts_newest_first() {
        let mut session = PollSession::new();
        session.begin_fetch();
        assert_eq!(session.phase(), PollPhase::Fetching);

        session.finish_fetch(Ok(snapshot()));
        assert_eq!(session.phase(), PollPhase::Idle);
        assert_eq!(order(&session), vec![2, 3, 1]);
        assert!(session.last_updated().is_some());
    }

    #[test]
    fn test_fetch_error_keeps_previous_list() {
        let mut session = PollSession::new();
        session.finish_fetch(Ok(snapshot()));

        session.begin_fetch();
        session.finish_fetch(Err(ClientError::Status(500, "boom".to_string())));

        assert_eq!(session.phase(), PollPhase::Idle);
        assert_eq!(order(&session), vec![2, 3, 1]);
        assert_eq!(session.error(), Some("Server responded with 500: boom"));

        session.finish_fetch(Ok(snapshot()));
        assert!(session.error().is_none());
    }

    #[test]
    fn test_toggle_sort_twice_restores_order() {
        let mut session = PollSession::new();
        session.finish_fetch(Ok(snapshot()));
        let original = order(&session);

        session.toggle_sort();
        assert_eq!(session.sort(), SortOrder::Ascending);
        assert_eq!(order(&session), vec![1, 3, 2]);

        session.toggle_sort();
        assert_eq!(order(&session), original);
    }

    #[test]
    fn test_records_without_timestamp_sort_as_oldest() {
        let mut session = PollSession::new();
        let mut snap = snapshot();
        snap.results.push(record(json!({"n": 4})));
        session.finish_fetch(Ok(snap));
        assert_eq!(order(&session).last(), Some(&4));
    }

    #[test]
    fn test_toggle_polling() {
        let mut session = PollSession::new();
        assert!(!session.toggle_polling());
        assert!(session.toggle_polling());
    }

    #[test]
    fn test_confirm_without_request_does_nothing() {
        let mut session = PollSession::new();
        assert!(!session.confirm_delete());

        session.request_delete();
        assert!(session.is_delete_pending());
        session.cancel_delete();
        assert!(!session.confirm_delete());

        session.request_delete();
        assert!(session.confirm_delete());
        assert!(!session.is_delete_pending());
    }

    #[test]
    fn test_delete_outcomes() {
        let mut session = PollSession::new();
        session.finish_fetch(Ok(snapshot()));

        session.finish_delete(Err(ClientError::Network("refused".to_string())));
        assert_eq!(session.results().len(), 3);
        assert!(session.error().unwrap().starts_with("Failed to delete results"));

        session.finish_delete(Ok(MessageResponse {
            success: true,
            message: "All results cleared".to_string(),
        }));
        assert!(session.results().is_empty());
        assert!(session.last_updated().is_none());
        assert!(session.error().is_none());
    }
}
