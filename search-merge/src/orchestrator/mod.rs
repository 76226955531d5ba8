//! Result orchestration: priority merge, incremental diff, controller.
//!
//! This module merges per-provider batches by rank with a fixed provider
//! precedence, computes the edit script from the previously published
//! sequence, and drives both from [`controller::ResultSetController`].

pub mod controller;
pub mod diff;
pub mod merge;
