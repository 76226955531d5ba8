//! Scripted replays of controller activity.
//!
//! A scenario is a JSON document listing controller calls in order, plus
//! optional ranking orders per query. Replaying it drives a real
//! [`ResultSetController`] and reports what each step published, along with
//! whether an observer that only sees publications stayed in sync.
//!
//! ```json
//! {
//!   "rankings": { "wi": [3, 1] },
//!   "steps": [
//!     { "step": "add", "provider": "search.DatabaseResultProvider",
//!       "results": [{ "stable_id": 1, "rank": 0, "view_type": "intent", "title": "Wi-Fi" }] },
//!     { "step": "display", "query": "wi" },
//!     { "step": "clear" }
//!   ]
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use search_merge::{
    ExternalRanker, ProviderId, Publication, RankingContext, RankingError, RecordingObserver,
    ResultRecord, ResultSetController,
};
use serde::{Deserialize, Serialize};

use crate::config::PanelConfig;
use crate::error::{PanelError, Result};

/// A replayable sequence of controller calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Ranked order of stable ids, per query.
    #[serde(default)]
    pub rankings: HashMap<String, Vec<i64>>,
    /// Queries for which the ranker reports a failure.
    #[serde(default)]
    pub failing_rankings: Vec<String>,
    pub steps: Vec<Step>,
}

/// One controller call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// `add_search_results`; a missing or null `results` is an absent batch.
    Add {
        provider: ProviderId,
        #[serde(default)]
        results: Option<Vec<ResultRecord>>,
    },
    /// `display_search_results`.
    Display { query: String },
    /// `display_saved_query`.
    SavedQuery { results: Vec<ResultRecord> },
    /// `clear_results`.
    Clear,
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Display { .. } => "display",
            Self::SavedQuery { .. } => "saved_query",
            Self::Clear => "clear",
        }
    }
}

/// What a replayed step left behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub step: &'static str,
    /// Published size after the step.
    pub size: usize,
    /// Stable ids of the published sequence, in order.
    pub results: Vec<i64>,
    /// Set when the step published.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication: Option<Publication>,
    /// Whether the observer's mirror equals the published sequence.
    pub mirror_in_sync: bool,
}

impl Scenario {
    /// Parses a scenario from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Scenario`] if `json` is not a valid scenario.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| PanelError::Scenario(e.to_string()))
    }

    /// Reads and parses a scenario file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    fn ranker(&self) -> Option<ScriptedRanker> {
        if self.rankings.is_empty() && self.failing_rankings.is_empty() {
            return None;
        }
        Some(ScriptedRanker {
            orders: self.rankings.clone(),
            failing: self.failing_rankings.iter().cloned().collect(),
        })
    }
}

/// Ranker that applies fixed orders per query.
///
/// Ids missing from a query's order keep their merged order after the
/// listed ones.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRanker {
    orders: HashMap<String, Vec<i64>>,
    failing: HashSet<String>,
}

impl ScriptedRanker {
    pub fn new(orders: HashMap<String, Vec<i64>>) -> Self {
        Self {
            orders,
            failing: HashSet::new(),
        }
    }

    /// Makes `rank` fail for `query`.
    pub fn failing_for(mut self, query: impl Into<String>) -> Self {
        self.failing.insert(query.into());
        self
    }
}

impl ExternalRanker for ScriptedRanker {
    fn is_enabled(&self, context: &RankingContext<'_>) -> bool {
        self.orders.contains_key(context.query) || self.failing.contains(context.query)
    }

    fn rank(&self, query: &str, results: &mut Vec<ResultRecord>) -> std::result::Result<(), RankingError> {
        if self.failing.contains(query) {
            return Err(RankingError::Unavailable("scripted failure".into()));
        }
        let Some(order) = self.orders.get(query) else {
            return Ok(());
        };
        let position: HashMap<i64, usize> = order
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, i))
            .collect();
        results.sort_by_key(|r| position.get(&r.stable_id).copied().unwrap_or(usize::MAX));
        Ok(())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Replays `scenario` against a fresh controller built from `config`.
///
/// # Errors
///
/// Returns an error if `config` is invalid.
pub fn replay(scenario: &Scenario, config: &PanelConfig) -> Result<Vec<StepReport>> {
    config.validate()?;
    let observer = RecordingObserver::new();
    let mut controller = ResultSetController::new(config.pipeline.clone())?
        .with_observer(Box::new(observer.clone()));
    if let Some(ranker) = scenario.ranker() {
        controller = controller.with_ranker(Box::new(ranker));
    }

    let mut reports = Vec::with_capacity(scenario.steps.len());
    for (index, step) in scenario.steps.iter().enumerate() {
        let published_before = observer.publication_count();
        match step {
            Step::Add { provider, results } => {
                controller.add_search_results(results.clone(), provider.clone());
            }
            Step::Display { query } => {
                controller.display_search_results(query);
            }
            Step::SavedQuery { results } => {
                controller.display_saved_query(results.clone());
            }
            Step::Clear => controller.clear_results(),
        }

        let publication = if observer.publication_count() > published_before {
            observer.last()
        } else {
            None
        };
        reports.push(StepReport {
            index,
            step: step.name(),
            size: controller.len(),
            results: controller.results().iter().map(|r| r.stable_id).collect(),
            publication,
            mirror_in_sync: observer.mirror() == controller.results(),
        });
    }

    tracing::info!(
        steps = reports.len(),
        resyncs = observer.resyncs(),
        "scenario replayed"
    );
    Ok(reports)
}
