//! End-to-end session flows: concurrent providers, stale deliveries,
//! ranking and observers behind the coordinator.

use std::collections::HashMap;
use std::time::Duration;

use search_merge::{
    PipelineConfig, ProviderId, Publication, RecordingObserver, ResultSetController, ViewType,
};
use search_panel::{PanelConfig, ScriptedRanker, SearchSession, SessionConfig};

use crate::helpers::{ids, record, wifi_providers};

#[tokio::test]
async fn concurrent_deliveries_match_sequential_merge() {
    let session =
        SearchSession::from_config(&PanelConfig::default(), wifi_providers(Duration::ZERO)).unwrap();
    let concurrent = session.submit("wi-fi").await.unwrap();
    session.shutdown().await.unwrap();

    // Same batches, delivered one at a time straight to a controller.
    let mut controller = ResultSetController::new(PipelineConfig::default()).unwrap();
    controller.add_search_results(
        Some(vec![
            record(1, 0, "Wi-Fi"),
            record(2, 2, "Wi-Fi calling").with_breadcrumbs(["Network", "Calls"]),
            record(5, 3, "Wi-Fi preferences").with_summary("Turn on automatically"),
        ]),
        ProviderId::DATABASE,
    );
    controller.add_search_results(
        Some(vec![record(3, 0, "Wi-Fi Analyzer"), record(4, 1, "Wi-Fi Finder")]),
        ProviderId::INSTALLED_APPS,
    );
    controller.display_search_results("wi-fi");

    assert_eq!(concurrent.results, controller.results());
    assert_eq!(ids(&concurrent.results), vec![1, 3, 4, 2, 5]);
}

#[tokio::test]
async fn refined_query_publishes_removals_only() {
    let session =
        SearchSession::from_config(&PanelConfig::default(), wifi_providers(Duration::from_millis(10)))
            .unwrap();
    let first = session.submit("wi").await.unwrap();
    assert_eq!(first.size, 5);

    let refined = session.submit("wi-fi f").await.unwrap();
    assert_eq!(ids(&refined.results), vec![4]);
    let script = refined.publication.script().unwrap();
    assert_eq!(script.removals(), 4);
    assert_eq!(script.insertions(), 0);
    assert_eq!(script.applied_to(&first.results).unwrap(), refined.results);
    session.shutdown().await.unwrap();
}

#[tokio::test]
async fn newer_submit_supersedes_older() {
    let session = SearchSession::from_config(
        &PanelConfig::default(),
        wifi_providers(Duration::from_millis(150)),
    )
    .unwrap();

    let (old, new) = tokio::join!(session.submit("calling"), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        session.submit("finder").await
    });
    assert!(old.is_err());
    let new = new.unwrap();
    assert_eq!(ids(&new.results), vec![4]);

    let snapshot = session.snapshot().await.unwrap();
    assert_eq!(snapshot.outstanding, 0);
    assert_eq!(ids(&snapshot.results), vec![4]);
    session.shutdown().await.unwrap();
}

#[tokio::test]
async fn ranker_and_observer_behind_session() {
    let observer = RecordingObserver::new();
    let ranker = ScriptedRanker::new(HashMap::from([("wi".to_owned(), vec![5, 4])]));
    let controller = ResultSetController::new(PipelineConfig::default())
        .unwrap()
        .with_ranker(Box::new(ranker))
        .with_observer(Box::new(observer.clone()));
    let session = SearchSession::spawn(
        controller,
        wifi_providers(Duration::ZERO),
        &SessionConfig::default(),
    );

    let outcome = session.submit("wi").await.unwrap();
    assert_eq!(ids(&outcome.results), vec![5, 4, 1, 3, 2]);
    assert_eq!(observer.mirror(), outcome.results);

    session
        .show_saved_queries(vec![search_merge::ResultRecord::new(
            90,
            0,
            ViewType::SavedQuery,
            "wi",
        )])
        .await
        .unwrap();
    session.clear().await.unwrap();

    let publications = observer.publications();
    assert_eq!(publications.len(), 3);
    assert_eq!(publications[1], Publication::Reset { len: 1 });
    assert_eq!(publications[2], Publication::Reset { len: 0 });
    assert!(observer.mirror().is_empty());
    assert_eq!(observer.resyncs(), 0);
    session.shutdown().await.unwrap();
}
