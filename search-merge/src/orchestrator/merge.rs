//! Priority merge of per-provider result batches.
//!
//! Walks the rank range from top to bottom. At each rank value every
//! provider, in precedence order, contributes all of its records with that
//! rank before the merger moves on to the next rank. Records whose rank
//! falls outside the range are appended afterwards, provider by provider.
//!
//! ```text
//! db:  [1@r0, 2@r2]          merged: 1@r0  3@r0  4@r1  2@r2
//! app: [3@r0, 4@r1]                  db    app   app   db
//! ```

use std::iter::Peekable;
use std::vec::IntoIter;

use crate::collector::ResultCollector;
use crate::config::PipelineConfig;
use crate::types::{ProviderId, ResultRecord};

/// Merges rank-sorted batches using a fixed provider precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankMerger {
    top_rank: i32,
    bottom_rank: i32,
}

impl RankMerger {
    /// Creates a merger walking `top_rank..=bottom_rank`.
    pub fn new(top_rank: i32, bottom_rank: i32) -> Self {
        Self {
            top_rank,
            bottom_rank,
        }
    }

    /// Creates a merger for the rank range of `config`.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.top_rank, config.bottom_rank)
    }

    /// Merges `sources`, given highest precedence first.
    ///
    /// Each source is copied and sorted by `(rank, stable_id)` before
    /// merging, so callers need not pre-sort. The output holds every input
    /// record exactly once.
    pub fn merge<'a, I>(&self, sources: I) -> Vec<ResultRecord>
    where
        I: IntoIterator<Item = &'a [ResultRecord]>,
    {
        let mut queues: Vec<Peekable<IntoIter<ResultRecord>>> = sources
            .into_iter()
            .map(|source| {
                let mut sorted = source.to_vec();
                sorted.sort_by(ResultRecord::cmp_rank);
                sorted.into_iter().peekable()
            })
            .collect();
        let total: usize = queues.iter().map(|q| q.len()).sum();
        let mut merged = Vec::with_capacity(total);

        // Only ranks some queue head sits on can drain anything, so skip
        // straight to the next one instead of stepping through the range.
        let mut next = self.next_head_rank(&mut queues, self.top_rank);
        while let Some(rank) = next {
            for queue in &mut queues {
                while let Some(record) = queue.next_if(|r| r.rank == rank) {
                    merged.push(record);
                }
            }
            next = rank
                .checked_add(1)
                .and_then(|from| self.next_head_rank(&mut queues, from));
        }

        // Out-of-range ranks. A source stuck on a rank above the range also
        // keeps its in-range records behind that one.
        for queue in queues {
            merged.extend(queue);
        }

        merged
    }

    /// Smallest head rank in `from..=bottom_rank`. Heads below `from` are
    /// stuck and never drain during the sweep.
    fn next_head_rank(
        &self,
        queues: &mut [Peekable<IntoIter<ResultRecord>>],
        from: i32,
    ) -> Option<i32> {
        queues
            .iter_mut()
            .filter_map(|queue| queue.peek().map(|r| r.rank))
            .filter(|rank| (from..=self.bottom_rank).contains(rank))
            .min()
    }

    /// Merges the batches held by `collector` following `merge_order`.
    ///
    /// A provider in `merge_order` with no batch contributes nothing.
    /// Batches from providers not named in `merge_order` are ignored.
    pub fn merge_collected(
        &self,
        collector: &ResultCollector,
        merge_order: &[ProviderId],
    ) -> Vec<ResultRecord> {
        for provider in collector.providers() {
            if !merge_order.contains(provider) {
                tracing::debug!(%provider, "ignoring batch from provider outside merge order");
            }
        }
        self.merge(
            merge_order
                .iter()
                .map(|provider| collector.batch(provider).unwrap_or_default()),
        )
    }
}

impl Default for RankMerger {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}
