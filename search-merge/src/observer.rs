//! Publication of result updates to presentation observers.
//!
//! Every publish step produces a [`Publication`]: either a full reset
//! (saved queries, clear) or an incremental [`EditScript`] (search
//! results). Observers only ever see the published sequence through these
//! notifications.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::orchestrator::diff::EditScript;
use crate::types::ResultRecord;

/// One update of the published sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Publication {
    /// Everything changed; redraw all `len` items.
    Reset { len: usize },
    /// Apply the script to the previous sequence.
    Incremental(EditScript),
}

impl Publication {
    /// Size of the published sequence after this update.
    pub fn len(&self) -> usize {
        match self {
            Self::Reset { len } => *len,
            Self::Incremental(script) => script.new_len(),
        }
    }

    /// Whether the published sequence is empty after this update.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The edit script, for incremental updates.
    pub fn script(&self) -> Option<&EditScript> {
        match self {
            Self::Reset { .. } => None,
            Self::Incremental(script) => Some(script),
        }
    }
}

/// Receives every publication made by a controller.
pub trait ResultsObserver: Send {
    /// Called after the controller has replaced its published sequence.
    /// `results` is the new sequence.
    fn on_publish(&mut self, publication: &Publication, results: &[ResultRecord]);
}

#[derive(Debug, Default)]
struct Recorded {
    publications: Vec<Publication>,
    mirror: Vec<ResultRecord>,
    resyncs: usize,
}

/// Observer that records publications and maintains a mirror list by
/// replaying them, the way a presentation layer would.
///
/// Clones share state, so one clone can be handed to a controller while
/// another is kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingObserver {
    /// Creates an observer with an empty mirror.
    pub fn new() -> Self {
        Self::default()
    }

    /// All publications seen so far.
    pub fn publications(&self) -> Vec<Publication> {
        self.lock().publications.clone()
    }

    /// Number of publications seen so far.
    pub fn publication_count(&self) -> usize {
        self.lock().publications.len()
    }

    /// The most recent publication.
    pub fn last(&self) -> Option<Publication> {
        self.lock().publications.last().cloned()
    }

    /// The mirrored list built only from publications.
    pub fn mirror(&self) -> Vec<ResultRecord> {
        self.lock().mirror.clone()
    }

    /// How many incremental updates failed to apply and forced a resync.
    pub fn resyncs(&self) -> usize {
        self.lock().resyncs
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ResultsObserver for RecordingObserver {
    fn on_publish(&mut self, publication: &Publication, results: &[ResultRecord]) {
        let mut recorded = self.lock();
        match publication {
            Publication::Reset { .. } => {
                recorded.mirror = results.to_vec();
            }
            Publication::Incremental(script) => {
                if let Err(err) = script.apply(&mut recorded.mirror) {
                    tracing::warn!(error = %err, "edit script did not apply, resyncing mirror");
                    recorded.mirror = results.to_vec();
                    recorded.resyncs += 1;
                }
            }
        }
        recorded.publications.push(publication.clone());
    }
}
