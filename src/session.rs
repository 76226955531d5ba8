//! Async search session: one coordinator task owns the controller.
//!
//! Providers run concurrently on their own tasks, but the controller is
//! never shared. Every delivery is sent over a bounded channel to the
//! coordinator, which applies them one at a time and publishes once every
//! provider has answered.
//!
//! ```text
//!  provider A ──┐
//!  provider B ──┼──► mpsc ──► coordinator ──► ResultSetController ──► observer
//!  caller ──────┘              (one task)
//! ```
//!
//! Each submitted query gets a generation number. Deliveries carrying an
//! older generation (a query that was superseded, cleared, or replaced by
//! saved queries) are dropped.

use std::sync::Arc;
use std::time::Duration;

use search_merge::{
    ControllerState, ProviderId, Publication, ResultRecord, ResultSetController,
};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::config::{PanelConfig, SessionConfig};
use crate::error::{PanelError, Result};
use crate::provider::ResultProvider;

/// What a finished query published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutcome {
    /// Number of published results.
    pub size: usize,
    /// The update handed to the observer.
    pub publication: Publication,
    /// The published sequence.
    pub results: Vec<ResultRecord>,
}

/// Point-in-time view of the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: ControllerState,
    pub results: Vec<ResultRecord>,
    /// Providers currently holding a batch.
    pub providers_with_batches: usize,
    /// Providers the in-flight query is still waiting on.
    pub outstanding: usize,
}

enum SessionMessage {
    Submit {
        query: String,
        reply: oneshot::Sender<QueryOutcome>,
    },
    Display {
        query: String,
        reply: oneshot::Sender<QueryOutcome>,
    },
    Delivery {
        generation: u64,
        provider: ProviderId,
        batch: Option<Vec<ResultRecord>>,
    },
    External {
        provider: ProviderId,
        batch: Option<Vec<ResultRecord>>,
    },
    SavedQueries {
        records: Vec<ResultRecord>,
        reply: oneshot::Sender<usize>,
    },
    Clear {
        reply: oneshot::Sender<()>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Shutdown,
}

/// A query waiting for its providers.
struct InFlight {
    generation: u64,
    query: String,
    outstanding: usize,
    reply: oneshot::Sender<QueryOutcome>,
}

/// Handle to a running session coordinator.
pub struct SearchSession {
    tx: mpsc::Sender<SessionMessage>,
    handle: JoinHandle<()>,
}

impl SearchSession {
    /// Builds a controller from `config` and spawns the coordinator.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn from_config(config: &PanelConfig, providers: Vec<Arc<dyn ResultProvider>>) -> Result<Self> {
        config.validate()?;
        let controller = ResultSetController::new(config.pipeline.clone())?;
        Ok(Self::spawn(controller, providers, &config.session))
    }

    /// Spawns the coordinator around an already configured controller
    /// (ranker and observer installed by the caller).
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        controller: ResultSetController,
        providers: Vec<Arc<dyn ResultProvider>>,
        config: &SessionConfig,
    ) -> Self {
        let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
        let coordinator = Coordinator {
            controller,
            providers,
            provider_timeout: Duration::from_millis(config.provider_timeout_ms),
            self_tx: tx.downgrade(),
            generation: 0,
            in_flight: None,
        };
        let handle = tokio::spawn(coordinator.run(rx));
        Self { tx, handle }
    }

    /// Fetches `query` from every provider, then merges and publishes.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Session`] if the query was superseded by a
    /// later submit, a clear, or saved queries before it finished, or if
    /// the coordinator has stopped.
    pub async fn submit(&self, query: impl Into<String>) -> Result<QueryOutcome> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionMessage::Submit {
            query: query.into(),
            reply,
        })
        .await?;
        rx.await
            .map_err(|_| PanelError::Session("query superseded before completion".into()))
    }

    /// Stores a batch pushed by a provider outside of [`submit`](Self::submit).
    /// Does not publish.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Session`] if the coordinator has stopped.
    pub async fn add_search_results(
        &self,
        batch: Option<Vec<ResultRecord>>,
        provider: ProviderId,
    ) -> Result<()> {
        self.send(SessionMessage::External { provider, batch }).await
    }

    /// Merges and publishes whatever has been collected, without fetching.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Session`] if the coordinator has stopped.
    pub async fn display_search_results(&self, query: impl Into<String>) -> Result<QueryOutcome> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionMessage::Display {
            query: query.into(),
            reply,
        })
        .await?;
        rx.await
            .map_err(|_| PanelError::Session("coordinator dropped display reply".into()))
    }

    /// Shows saved queries, cancelling any in-flight query.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Session`] if the coordinator has stopped.
    pub async fn show_saved_queries(&self, records: Vec<ResultRecord>) -> Result<usize> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionMessage::SavedQueries { records, reply })
            .await?;
        rx.await
            .map_err(|_| PanelError::Session("coordinator dropped saved query reply".into()))
    }

    /// Clears all results, cancelling any in-flight query.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Session`] if the coordinator has stopped.
    pub async fn clear(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionMessage::Clear { reply }).await?;
        rx.await
            .map_err(|_| PanelError::Session("coordinator dropped clear reply".into()))
    }

    /// Returns the coordinator's current state.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Session`] if the coordinator has stopped.
    pub async fn snapshot(&self) -> Result<SessionSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionMessage::Snapshot { reply }).await?;
        rx.await
            .map_err(|_| PanelError::Session("coordinator dropped snapshot reply".into()))
    }

    /// Stops the coordinator and waits for it to exit.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Session`] if the coordinator task panicked.
    pub async fn shutdown(self) -> Result<()> {
        // A coordinator that already exited is fine.
        let _ = self.tx.send(SessionMessage::Shutdown).await;
        self.handle
            .await
            .map_err(|e| PanelError::Session(format!("coordinator task failed: {e}")))
    }

    async fn send(&self, message: SessionMessage) -> Result<()> {
        self.tx
            .send(message)
            .await
            .map_err(|_| PanelError::Session("coordinator stopped".into()))
    }
}

struct Coordinator {
    controller: ResultSetController,
    providers: Vec<Arc<dyn ResultProvider>>,
    provider_timeout: Duration,
    /// Weak so the coordinator exits once every handle is dropped.
    self_tx: mpsc::WeakSender<SessionMessage>,
    generation: u64,
    in_flight: Option<InFlight>,
}

impl Coordinator {
    async fn run(mut self, mut rx: mpsc::Receiver<SessionMessage>) {
        tracing::debug!(providers = self.providers.len(), "session coordinator started");
        while let Some(message) = rx.recv().await {
            match message {
                SessionMessage::Submit { query, reply } => self.submit(query, reply),
                SessionMessage::Display { query, reply } => {
                    let _ = reply.send(self.display(&query));
                }
                SessionMessage::Delivery {
                    generation,
                    provider,
                    batch,
                } => self.deliver(generation, provider, batch),
                SessionMessage::External { provider, batch } => {
                    self.controller.add_search_results(batch, provider);
                }
                SessionMessage::SavedQueries { records, reply } => {
                    self.cancel_in_flight();
                    let _ = reply.send(self.controller.display_saved_query(records));
                }
                SessionMessage::Clear { reply } => {
                    self.cancel_in_flight();
                    self.controller.clear_results();
                    let _ = reply.send(());
                }
                SessionMessage::Snapshot { reply } => {
                    let _ = reply.send(self.snapshot());
                }
                SessionMessage::Shutdown => break,
            }
        }
        tracing::debug!("session coordinator stopped");
    }

    fn submit(&mut self, query: String, reply: oneshot::Sender<QueryOutcome>) {
        self.cancel_in_flight();
        let generation = self.generation;

        if self.providers.is_empty() {
            let _ = reply.send(self.display(&query));
            return;
        }
        let Some(tx) = self.self_tx.upgrade() else {
            // Every handle is gone; nobody is waiting for the reply.
            return;
        };

        for provider in &self.providers {
            let provider = Arc::clone(provider);
            let tx = tx.clone();
            let query = query.clone();
            let timeout = self.provider_timeout;
            tokio::spawn(async move {
                let id = provider.id();
                let batch = match tokio::time::timeout(timeout, provider.fetch(&query)).await {
                    Ok(Ok(batch)) => batch,
                    Ok(Err(err)) => {
                        tracing::warn!(provider = %id, error = %err, "provider fetch failed");
                        None
                    }
                    Err(_) => {
                        tracing::warn!(provider = %id, ?timeout, "provider fetch timed out");
                        None
                    }
                };
                let _ = tx
                    .send(SessionMessage::Delivery {
                        generation,
                        provider: id,
                        batch,
                    })
                    .await;
            });
        }

        self.in_flight = Some(InFlight {
            generation,
            query,
            outstanding: self.providers.len(),
            reply,
        });
    }

    fn deliver(&mut self, generation: u64, provider: ProviderId, batch: Option<Vec<ResultRecord>>) {
        let Some(in_flight) = self.in_flight.as_mut().filter(|f| f.generation == generation) else {
            tracing::debug!(%provider, generation, "dropping stale provider delivery");
            return;
        };
        in_flight.outstanding = in_flight.outstanding.saturating_sub(1);
        let done = in_flight.outstanding == 0;
        self.controller.add_search_results(batch, provider);

        if done {
            if let Some(finished) = self.in_flight.take() {
                let outcome = self.display(&finished.query);
                if finished.reply.send(outcome).is_err() {
                    tracing::debug!("query caller went away before results were ready");
                }
            }
        }
    }

    fn display(&mut self, query: &str) -> QueryOutcome {
        let size = self.controller.display_search_results(query);
        QueryOutcome {
            size,
            publication: self
                .controller
                .last_publication()
                .cloned()
                .unwrap_or(Publication::Reset { len: size }),
            results: self.controller.results().to_vec(),
        }
    }

    /// Advances the generation so outstanding deliveries become stale.
    fn cancel_in_flight(&mut self) {
        self.generation += 1;
        if let Some(previous) = self.in_flight.take() {
            tracing::debug!(
                generation = previous.generation,
                outstanding = previous.outstanding,
                "superseding in-flight query"
            );
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.controller.state(),
            results: self.controller.results().to_vec(),
            providers_with_batches: self.controller.collector().len(),
            outstanding: self.in_flight.as_ref().map_or(0, |f| f.outstanding),
        }
    }
}
