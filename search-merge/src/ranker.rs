//! Trait definition for pluggable result re-ranking.
//!
//! An [`ExternalRanker`] wraps a scoring service that may reorder merged
//! results before they are published. The service itself is opaque; the
//! pipeline only relies on the contract below.

use crate::error::RankingError;
use crate::types::ResultRecord;

/// What a ranker is told when asked whether it wants to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingContext<'a> {
    /// The query the results answer.
    pub query: &'a str,
    /// Number of merged results awaiting ranking.
    pub result_count: usize,
}

/// A pluggable re-ranking backend.
///
/// `rank` is a synchronous and potentially slow call made on the
/// coordinating thread. Implementations are expected to return the same set
/// of records in a new order; the pipeline does not verify this.
///
/// All implementations must be `Send + Sync` so a controller can move
/// between threads.
pub trait ExternalRanker: Send + Sync {
    /// Whether ranking should run for this context.
    fn is_enabled(&self, context: &RankingContext<'_>) -> bool;

    /// Reorders `results` in place for `query`.
    ///
    /// # Errors
    ///
    /// Returns [`RankingError`] if the scoring service fails. The caller then
    /// keeps the merged order.
    fn rank(&self, query: &str, results: &mut Vec<ResultRecord>) -> Result<(), RankingError>;

    /// Short name used in logs.
    fn name(&self) -> &str {
        "external"
    }
}

/// Runs `ranker` over `merged` if it is enabled.
///
/// The ranker works on a copy; on failure the merged order is returned
/// unchanged and the error is logged. The second value reports whether the
/// returned order came from the ranker.
pub fn rank_or_keep(
    ranker: &dyn ExternalRanker,
    query: &str,
    merged: Vec<ResultRecord>,
) -> (Vec<ResultRecord>, bool) {
    let context = RankingContext {
        query,
        result_count: merged.len(),
    };
    if !ranker.is_enabled(&context) {
        tracing::debug!(ranker = ranker.name(), "ranker disabled for this query");
        return (merged, false);
    }

    let mut ranked = merged.clone();
    match ranker.rank(query, &mut ranked) {
        Ok(()) => {
            if ranked.len() != merged.len() {
                tracing::debug!(
                    ranker = ranker.name(),
                    before = merged.len(),
                    after = ranked.len(),
                    "ranker changed result count"
                );
            }
            (ranked, true)
        }
        Err(err) => {
            tracing::warn!(ranker = ranker.name(), error = %err, "ranking failed, keeping merged order");
            (merged, false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ViewType;

    /// Reverses results, or fails when asked to.
    struct ReverseRanker {
        enabled: bool,
        fail: bool,
    }

    impl ExternalRanker for ReverseRanker {
        fn is_enabled(&self, _context: &RankingContext<'_>) -> bool {
            self.enabled
        }

        fn rank(&self, _query: &str, results: &mut Vec<ResultRecord>) -> Result<(), RankingError> {
            // Scramble before failing to prove the caller discards partial work.
            results.reverse();
            if self.fail {
                return Err(RankingError::Failed("mock ranker failure".into()));
            }
            Ok(())
        }

        fn name(&self) -> &str {
            "reverse"
        }
    }

    fn merged() -> Vec<ResultRecord> {
        (1..=3)
            .map(|id| ResultRecord::new(id, 0, ViewType::Intent, format!("Result {id}")))
            .collect()
    }

    fn ids(records: &[ResultRecord]) -> Vec<i64> {
        records.iter().map(|r| r.stable_id).collect()
    }

    #[test]
    fn ranker_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReverseRanker>();
    }

    #[test]
    fn enabled_ranker_reorders() {
        let ranker = ReverseRanker {
            enabled: true,
            fail: false,
        };
        let (ranked, applied) = rank_or_keep(&ranker, "wifi", merged());
        assert!(applied);
        assert_eq!(ids(&ranked), vec![3, 2, 1]);
    }

    #[test]
    fn disabled_ranker_is_skipped() {
        let ranker = ReverseRanker {
            enabled: false,
            fail: false,
        };
        let (ranked, applied) = rank_or_keep(&ranker, "wifi", merged());
        assert!(!applied);
        assert_eq!(ids(&ranked), vec![1, 2, 3]);
    }

    #[test]
    fn failing_ranker_keeps_merged_order() {
        let ranker = ReverseRanker {
            enabled: true,
            fail: true,
        };
        let (ranked, applied) = rank_or_keep(&ranker, "wifi", merged());
        assert!(!applied);
        assert_eq!(ids(&ranked), vec![1, 2, 3]);
    }

    #[test]
    fn context_carries_query_and_count() {
        struct Inspect;
        impl ExternalRanker for Inspect {
            fn is_enabled(&self, context: &RankingContext<'_>) -> bool {
                context.query == "bluetooth" && context.result_count == 3
            }
            fn rank(&self, _query: &str, results: &mut Vec<ResultRecord>) -> Result<(), RankingError> {
                results.swap(0, 2);
                Ok(())
            }
        }

        let (ranked, applied) = rank_or_keep(&Inspect, "bluetooth", merged());
        assert!(applied);
        assert_eq!(ids(&ranked), vec![3, 2, 1]);
        assert_eq!(Inspect.name(), "external");
    }
}
