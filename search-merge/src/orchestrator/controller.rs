//! Result set controller: collect, merge, rank, diff, publish.
//!
//! Owns the per-provider batches and the published sequence. All mutation
//! goes through `&mut self`, so a controller lives on exactly one
//! coordinating thread or task; callers serialise provider deliveries onto
//! it.
//!
//! # State Machine
//!
//! ```text
//! ┌──────┐ add ┌────────────┐ display ┌─────────┐      ┌───────────┐
//! │ Idle ├────►│ Collecting ├────────►│ Merging ├─────►│ Published │
//! └──────┘     └─────▲──────┘         └─────────┘      └─────┬─────┘
//!                    │                   add                 │
//!                    └───────────────────────────────────────┘
//! clear / saved query: any state ──────────────────────► Published
//! ```

use crate::collector::ResultCollector;
use crate::config::PipelineConfig;
use crate::error::SearchError;
use crate::observer::{Publication, ResultsObserver};
use crate::ranker::{rank_or_keep, ExternalRanker};
use crate::types::{ProviderId, ResultRecord, ViewType};

use super::diff::SequenceDiffer;
use super::merge::RankMerger;

/// Where the controller is in its collect/publish cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Nothing collected since construction.
    Idle,
    /// At least one batch arrived since the last publish.
    Collecting,
    /// Inside `display_search_results`.
    Merging,
    /// A sequence (possibly empty) has been published.
    Published,
}

/// Turns provider batches into a published, ranked result sequence.
pub struct ResultSetController {
    config: PipelineConfig,
    merger: RankMerger,
    collector: ResultCollector,
    current: Vec<ResultRecord>,
    state: ControllerState,
    last_publication: Option<Publication>,
    ranker: Option<Box<dyn ExternalRanker>>,
    observer: Option<Box<dyn ResultsObserver>>,
}

impl std::fmt::Debug for ResultSetController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultSetController")
            .field("config", &self.config)
            .field("providers", &self.collector.len())
            .field("current", &self.current.len())
            .field("state", &self.state)
            .field("ranker", &self.ranker.as_ref().map(|r| r.name().to_owned()))
            .finish()
    }
}

/// Construction.
impl ResultSetController {
    /// Creates a controller with no ranker and no observer.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` fails validation.
    pub fn new(config: PipelineConfig) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self {
            merger: RankMerger::from_config(&config),
            config,
            collector: ResultCollector::new(),
            current: Vec::new(),
            state: ControllerState::Idle,
            last_publication: None,
            ranker: None,
            observer: None,
        })
    }

    /// Installs the external ranker consulted after merging.
    pub fn with_ranker(mut self, ranker: Box<dyn ExternalRanker>) -> Self {
        self.ranker = Some(ranker);
        self
    }

    /// Installs the observer notified on every publish.
    pub fn with_observer(mut self, observer: Box<dyn ResultsObserver>) -> Self {
        self.observer = Some(observer);
        self
    }
}

/// Pipeline operations.
impl ResultSetController {
    /// Stores the latest batch from `provider`. Does not publish.
    ///
    /// `None` means the provider has nothing yet and keeps its previous batch.
    pub fn add_search_results(&mut self, batch: Option<Vec<ResultRecord>>, provider: ProviderId) {
        if self.collector.add_search_results(batch, provider) {
            self.state = ControllerState::Collecting;
        }
    }

    /// Merges the collected batches, ranks them if enabled, publishes the
    /// result as an incremental update, and returns its size.
    pub fn display_search_results(&mut self, query: &str) -> usize {
        self.state = ControllerState::Merging;
        tracing::trace!(query, "displaying search results");

        let merged = self
            .merger
            .merge_collected(&self.collector, &self.config.merge_order);
        let merged_len = merged.len();

        let (results, ranked) = match self.ranker.as_deref() {
            Some(ranker) if self.config.smart_ranking => rank_or_keep(ranker, query, merged),
            _ => (merged, false),
        };

        // Ranking makes order unstable between queries, so only then is it
        // worth looking for moves.
        let script = SequenceDiffer::new(ranked).diff(&self.current, &results);
        tracing::debug!(
            merged = merged_len,
            ranked,
            inserted = script.insertions(),
            removed = script.removals(),
            moved = script.moves(),
            changed = script.changes(),
            "merged search results"
        );

        self.current = results;
        self.publish(Publication::Incremental(script));
        self.current.len()
    }

    /// Replaces everything with `data`, bypassing merge and ranking.
    ///
    /// Pending provider batches are dropped. Returns the number of items.
    pub fn display_saved_query(&mut self, data: Vec<ResultRecord>) -> usize {
        self.collector.clear();
        self.current = data;
        tracing::debug!(count = self.current.len(), "displaying saved queries");
        self.publish(Publication::Reset {
            len: self.current.len(),
        });
        self.current.len()
    }

    /// Drops collected batches and the published sequence.
    pub fn clear_results(&mut self) {
        self.collector.clear();
        self.current.clear();
        self.publish(Publication::Reset { len: 0 });
    }

    fn publish(&mut self, publication: Publication) {
        if let Some(observer) = self.observer.as_mut() {
            observer.on_publish(&publication, &self.current);
        }
        self.last_publication = Some(publication);
        self.state = ControllerState::Published;
    }
}

/// Read-only access to the published sequence.
impl ResultSetController {
    /// The published sequence.
    pub fn results(&self) -> &[ResultRecord] {
        &self.current
    }

    /// Number of published items.
    pub fn len(&self) -> usize {
        self.current.len()
    }

    /// Whether nothing is published.
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// The item at `position`.
    pub fn get(&self, position: usize) -> Option<&ResultRecord> {
        self.current.get(position)
    }

    /// Stable id of the item at `position`.
    pub fn item_id(&self, position: usize) -> Option<i64> {
        self.get(position).map(|r| r.stable_id)
    }

    /// View type of the item at `position`.
    pub fn item_view_type(&self, position: usize) -> Option<ViewType> {
        self.get(position).map(|r| r.view_type)
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// The most recent publication, if any.
    pub fn last_publication(&self) -> Option<&Publication> {
        self.last_publication.as_ref()
    }

    /// Batches collected since the last clear.
    pub fn collector(&self) -> &ResultCollector {
        &self.collector
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}
