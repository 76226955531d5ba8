//! Pipeline configuration with sensible defaults.
//!
//! [`PipelineConfig`] controls which providers are merged and in what
//! precedence, the rank range walked by the merger, and whether the
//! external ranker may run.

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::types::{ProviderId, BOTTOM_RANK, TOP_RANK};

/// Configuration for the merge-rank-diff pipeline.
///
/// Use [`Default::default()`] for the standard two-provider setup, or
/// override fields for custom precedence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Providers to merge, highest precedence first. At equal rank, records
    /// from an earlier provider always come before records from a later one.
    pub merge_order: Vec<ProviderId>,
    /// First rank value walked by the merger.
    pub top_rank: i32,
    /// Last rank value walked by the merger.
    pub bottom_rank: i32,
    /// Allows an installed external ranker to reorder merged results.
    pub smart_ranking: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            merge_order: vec![ProviderId::DATABASE, ProviderId::INSTALLED_APPS],
            top_rank: TOP_RANK,
            bottom_rank: BOTTOM_RANK,
            smart_ranking: true,
        }
    }
}

impl PipelineConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `merge_order` must not be empty
    /// - `merge_order` must not name a provider twice
    /// - `top_rank` must be <= `bottom_rank`
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.merge_order.is_empty() {
            return Err(SearchError::Config(
                "merge_order must name at least one provider".into(),
            ));
        }
        for (i, provider) in self.merge_order.iter().enumerate() {
            if self.merge_order[..i].contains(provider) {
                return Err(SearchError::Config(format!(
                    "merge_order lists provider {provider} more than once"
                )));
            }
        }
        if self.top_rank > self.bottom_rank {
            return Err(SearchError::Config(
                "top_rank must be <= bottom_rank".into(),
            ));
        }
        Ok(())
    }
}
