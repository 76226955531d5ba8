//! Per-provider result accumulation.
//!
//! Each provider owns at most one batch. A newer batch from the same
//! provider replaces the older one wholesale; batches are never merged.

use std::collections::HashMap;

use crate::types::{ProviderId, ResultRecord};

/// Holds the latest batch delivered by each provider.
#[derive(Debug, Default, Clone)]
pub struct ResultCollector {
    batches: HashMap<ProviderId, Vec<ResultRecord>>,
}

impl ResultCollector {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `batch` as the current batch for `provider`.
    ///
    /// `None` means "no results yet" and leaves any earlier batch in place.
    /// `Some(vec![])` is a real, empty answer and does replace it.
    ///
    /// Returns `true` when the collector changed.
    pub fn add_search_results(
        &mut self,
        batch: Option<Vec<ResultRecord>>,
        provider: ProviderId,
    ) -> bool {
        let Some(batch) = batch else {
            tracing::trace!(%provider, "provider delivered no batch, keeping previous");
            return false;
        };
        let count = batch.len();
        if let Some(previous) = self.batches.insert(provider.clone(), batch) {
            tracing::debug!(%provider, count, replaced = previous.len(), "replaced provider batch");
        } else {
            tracing::debug!(%provider, count, "stored provider batch");
        }
        true
    }

    /// Returns the batch currently held for `provider`, if any.
    pub fn batch(&self, provider: &ProviderId) -> Option<&[ResultRecord]> {
        self.batches.get(provider).map(Vec::as_slice)
    }

    /// Iterates over providers that currently hold a batch.
    pub fn providers(&self) -> impl Iterator<Item = &ProviderId> {
        self.batches.keys()
    }

    /// Number of providers holding a batch.
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    /// Whether no provider holds a batch.
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Total number of records across all batches.
    pub fn total_records(&self) -> usize {
        self.batches.values().map(Vec::len).sum()
    }

    /// Drops every batch.
    pub fn clear(&mut self) {
        self.batches.clear();
    }
}
