//! Shared helpers for integration tests.

use std::sync::Arc;
use std::time::Duration;

use search_merge::{ProviderId, ResultRecord, ViewType};
use search_panel::{ResultProvider, StaticProvider};

pub(crate) fn record(id: i64, rank: i32, title: &str) -> ResultRecord {
    ResultRecord::new(id, rank, ViewType::Intent, title)
}

pub(crate) fn ids(records: &[ResultRecord]) -> Vec<i64> {
    records.iter().map(|r| r.stable_id).collect()
}

/// Database and app providers answering "wi" queries, with the app
/// provider slower than the database one unless `apps_delay` says otherwise.
pub(crate) fn wifi_providers(apps_delay: Duration) -> Vec<Arc<dyn ResultProvider>> {
    let db = StaticProvider::new(
        ProviderId::DATABASE,
        vec![
            record(1, 0, "Wi-Fi"),
            record(2, 2, "Wi-Fi calling").with_breadcrumbs(["Network", "Calls"]),
            record(5, 3, "Wi-Fi preferences").with_summary("Turn on automatically"),
        ],
    );
    let apps = StaticProvider::new(
        ProviderId::INSTALLED_APPS,
        vec![record(3, 0, "Wi-Fi Analyzer"), record(4, 1, "Wi-Fi Finder")],
    )
    .with_delay(apps_delay);
    vec![Arc::new(db), Arc::new(apps)]
}

/// Write `contents` to `name` inside a fresh temp dir.
pub(crate) fn write_temp(name: &str, contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("write temp file");
    (dir, path)
}
