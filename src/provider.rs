//! Trait definition for asynchronous result providers.
//!
//! A provider answers a query with one batch of [`ResultRecord`]s. How it
//! gets them (a database, the package manager, a fixture) is its own
//! business; the session only combines what providers deliver.

use std::time::Duration;

use async_trait::async_trait;
use search_merge::{ProviderId, ResultRecord};

use crate::error::Result;

/// A source of search results.
///
/// All implementations must be `Send + Sync`: each query runs every
/// provider on its own task.
#[async_trait]
pub trait ResultProvider: Send + Sync {
    /// Key under which this provider's batches are stored.
    fn id(&self) -> ProviderId;

    /// Fetch results for `query`.
    ///
    /// `Ok(None)` means "nothing yet" and keeps the provider's previous
    /// batch; `Ok(Some(vec![]))` means "no matches".
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Provider`](crate::error::PanelError::Provider)
    /// if the backing source fails. The session treats a failure like `None`.
    async fn fetch(&self, query: &str) -> Result<Option<Vec<ResultRecord>>>;
}

/// Provider backed by a fixed list of records.
///
/// Matches a record when its title, summary or any breadcrumb contains the
/// query, ignoring case. An empty query matches everything.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    id: ProviderId,
    records: Vec<ResultRecord>,
    delay: Duration,
}

impl StaticProvider {
    pub fn new(id: ProviderId, records: Vec<ResultRecord>) -> Self {
        Self {
            id,
            records,
            delay: Duration::ZERO,
        }
    }

    /// Waits `delay` before answering each fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn matches(record: &ResultRecord, needle: &str) -> bool {
        record.title.to_lowercase().contains(needle)
            || record
                .summary
                .as_deref()
                .is_some_and(|s| s.to_lowercase().contains(needle))
            || record
                .breadcrumbs
                .iter()
                .any(|b| b.to_lowercase().contains(needle))
    }
}

#[async_trait]
impl ResultProvider for StaticProvider {
    fn id(&self) -> ProviderId {
        self.id.clone()
    }

    async fn fetch(&self, query: &str) -> Result<Option<Vec<ResultRecord>>> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let needle = query.trim().to_lowercase();
        let matched: Vec<ResultRecord> = self
            .records
            .iter()
            .filter(|r| Self::matches(r, &needle))
            .cloned()
            .collect();
        tracing::trace!(provider = %self.id, query, count = matched.len(), "static provider matched");
        Ok(Some(matched))
    }
}
