//! Timer-driven poll loop
//!
//! Fetches once at start, then on every interval tick while polling is on.
//! Manual actions arrive over an mpsc channel. Teardown is signalled with a
//! [`CancellationToken`]: the timer stops immediately, but a request already
//! in flight is allowed to finish and its result is dropped.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::WebhookClient;
use crate::session::PollSession;

/// Default delay between timer-driven fetches
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Manual actions on a running session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollCommand {
    Refresh,
    ToggleSort,
    TogglePolling,
    /// Arm the delete-all confirmation
    DeleteAll,
    ConfirmDelete,
    CancelDelete,
    Quit,
}

/// Receives the session after every state change
pub trait SessionView: Send {
    fn show(&mut self, session: &PollSession);
}

/// Forward snapshots over a channel (used for embedding and tests)
impl SessionView for mpsc::UnboundedSender<PollSession> {
    fn show(&mut self, session: &PollSession) {
        // A closed receiver only means nobody is watching any more
        let _ = self.send(session.clone());
    }
}

/// Drives a [`PollSession`] against a receiver
pub struct PollRunner<V: SessionView> {
    client: WebhookClient,
    session: PollSession,
    view: V,
    interval: Duration,
}

impl<V: SessionView> PollRunner<V> {
    pub fn new(client: WebhookClient, view: V) -> Self {
        Self {
            client,
            session: PollSession::new(),
            view,
            interval: POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run until `Quit`, channel close, or cancellation
    ///
    /// Returns the final session and view.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<PollCommand>,
        shutdown: CancellationToken,
    ) -> (PollSession, V) {
        info!(
            server = %self.client.base_url(),
            interval_ms = self.interval.as_millis() as u64,
            "Poll session started"
        );
        self.view.show(&self.session);

        if !self.fetch(&shutdown).await {
            return (self.session, self.view);
        }

        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!("Poll session cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    if self.session.is_polling() && !self.fetch(&shutdown).await {
                        break;
                    }
                }
                command = commands.recv() => {
                    match command {
                        None | Some(PollCommand::Quit) => break,
                        Some(command) => {
                            if !self.handle(command, &shutdown).await {
                                break;
                            }
                        }
                    }
                }
            }
        }

        info!("Poll session stopped");
        (self.session, self.view)
    }

    /// One list request; false when teardown happened while it was in flight
    async fn fetch(&mut self, shutdown: &CancellationToken) -> bool {
        self.session.begin_fetch();
        self.view.show(&self.session);

        let outcome = self.client.list().await;
        if shutdown.is_cancelled() {
            debug!("Discarding fetch result that arrived after teardown");
            return false;
        }

        if let Err(e) = &outcome {
            warn!("Error fetching results: {}", e);
        }
        self.session.finish_fetch(outcome);
        self.view.show(&self.session);
        true
    }

    async fn handle(&mut self, command: PollCommand, shutdown: &CancellationToken) -> bool {
        match command {
            PollCommand::Refresh => return self.fetch(shutdown).await,
            PollCommand::ToggleSort => self.session.toggle_sort(),
            PollCommand::TogglePolling => {
                let polling = self.session.toggle_polling();
                info!(polling, "Polling toggled");
            }
            PollCommand::DeleteAll => self.session.request_delete(),
            PollCommand::CancelDelete => self.session.cancel_delete(),
            PollCommand::ConfirmDelete => {
                if self.session.confirm_delete() {
                    let outcome = self.client.clear().await;
                    if shutdown.is_cancelled() {
                        return false;
                    }
                    match &outcome {
                        Ok(_) => info!("All results deleted"),
                        Err(e) => warn!("Error deleting results: {}", e),
                    }
                    self.session.finish_delete(outcome);
                }
            }
            PollCommand::Quit => return false,
        }

        self.view.show(&self.session);
        true
    }
}
