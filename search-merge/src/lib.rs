//! # search-merge
//!
//! Merges search results delivered by independent providers into one
//! ranked sequence and publishes incremental updates to it.
//!
//! ## Design
//!
//! - Each provider delivers whole batches; the latest batch per provider wins
//! - Batches are merged by rank, with a fixed provider precedence at equal rank
//! - An optional external ranker may reorder the merged sequence
//! - Updates are published as minimal insert/remove/move/change scripts
//! - Everything runs on one coordinating thread; no internal locking
//!
//! ## Privacy
//!
//! - Query text is logged only at trace level
//! - Errors never embed query text
//!
//! ## Example
//!
//! ```
//! use search_merge::{PipelineConfig, ProviderId, ResultRecord, ResultSetController, ViewType};
//!
//! # fn main() -> search_merge::Result<()> {
//! let mut controller = ResultSetController::new(PipelineConfig::default())?;
//! controller.add_search_results(
//!     Some(vec![ResultRecord::new(1, 0, ViewType::Intent, "Wi-Fi")]),
//!     ProviderId::DATABASE,
//! );
//! controller.add_search_results(
//!     Some(vec![ResultRecord::new(2, 0, ViewType::Intent, "Wi-Fi Analyzer")]),
//!     ProviderId::INSTALLED_APPS,
//! );
//! assert_eq!(controller.display_search_results("wi"), 2);
//! assert_eq!(controller.item_id(0), Some(1));
//! # Ok(())
//! # }
//! ```

pub mod collector;
pub mod config;
pub mod error;
pub mod observer;
pub mod orchestrator;
pub mod ranker;
pub mod types;

pub use collector::ResultCollector;
pub use config::PipelineConfig;
pub use error::{RankingError, Result, SearchError};
pub use observer::{Publication, RecordingObserver, ResultsObserver};
pub use orchestrator::controller::{ControllerState, ResultSetController};
pub use orchestrator::diff::{EditOp, EditScript, SequenceDiffer};
pub use orchestrator::merge::RankMerger;
pub use ranker::{ExternalRanker, RankingContext};
pub use types::{ProviderId, ResultRecord, ViewType, BOTTOM_RANK, TOP_RANK};
