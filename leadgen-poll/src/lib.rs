//! leadgen-poll library - client side of the webhook receiver
//!
//! Watches accumulated results with a timer-driven poll session and submits
//! lead searches to the enrichment API.

pub mod client;
pub mod render;
pub mod runner;
pub mod session;
pub mod submit;

pub use client::{ClientError, WebhookClient};
pub use runner::{PollCommand, PollRunner, SessionView};
pub use session::{PollPhase, PollSession, SortOrder};
pub use submit::{LeadSubmitter, SearchOutcome};
