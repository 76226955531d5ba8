//! Search panel host.
//!
//! Wraps the [`search_merge`] pipeline for use by an application:
//!
//! - **Config**: TOML configuration covering the pipeline, the session and logging
//! - **Providers**: async sources of result batches
//! - **Session**: a coordinator task that owns the controller and serialises
//!   provider deliveries onto it
//! - **Scenario**: JSON replays of controller calls, used by the
//!   `search-replay` binary and the integration tests

pub mod config;
pub mod error;
pub mod provider;
pub mod scenario;
pub mod session;

pub use config::{LoggingConfig, PanelConfig, SessionConfig};
pub use error::{PanelError, Result};
pub use provider::{ResultProvider, StaticProvider};
pub use scenario::{Scenario, ScriptedRanker, Step, StepReport, replay};
pub use session::{QueryOutcome, SearchSession, SessionSnapshot};
