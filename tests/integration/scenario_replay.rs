//! Replaying the bundled demo scenario end to end.

use std::path::PathBuf;

use search_merge::{EditOp, Publication};
use search_panel::{PanelConfig, PanelError, Scenario, replay};

use crate::helpers::write_temp;

fn demo_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)
}

#[test]
fn demo_scenario_replays_in_sync() {
    let scenario = Scenario::from_file(&demo_path("wifi_scenario.json")).unwrap();
    let reports = replay(&scenario, &PanelConfig::default()).unwrap();
    assert_eq!(reports.len(), 10);
    assert!(reports.iter().all(|r| r.mirror_in_sync));

    // First display: plain merge.
    assert_eq!(reports[2].results, vec![1, 3, 4, 2]);
    assert_eq!(reports[2].publication.as_ref().unwrap().script().unwrap().insertions(), 4);

    // Ranked display: 2 dropped, 4 moved up, 1 gained a summary.
    assert_eq!(reports[4].results, vec![4, 1, 3]);
    let script = reports[4].publication.as_ref().unwrap().script().unwrap();
    assert_eq!(script.removals(), 1);
    assert_eq!(script.insertions(), 0);
    assert!(script.moves() >= 1);
    assert_eq!(script.changes(), 1);
    assert!(script
        .ops()
        .iter()
        .any(|op| matches!(op, EditOp::Change { record, .. } if record.summary.is_some())));

    // Ranker failure: merged order, no moves detected.
    assert_eq!(reports[6].results, vec![1, 3, 4]);
    assert_eq!(reports[6].publication.as_ref().unwrap().script().unwrap().moves(), 0);

    assert_eq!(reports[7].results, vec![100, 101]);
    assert_eq!(reports[7].publication, Some(Publication::Reset { len: 2 }));

    for report in &reports[8..] {
        assert_eq!(report.size, 0);
        assert_eq!(report.publication, Some(Publication::Reset { len: 0 }));
    }
}

#[test]
fn smart_ranking_off_ignores_scripted_orders() {
    let scenario = Scenario::from_file(&demo_path("wifi_scenario.json")).unwrap();
    let mut config = PanelConfig::default();
    config.pipeline.smart_ranking = false;

    let reports = replay(&scenario, &config).unwrap();
    assert_eq!(reports[4].results, vec![1, 3, 4]);
    assert!(reports.iter().all(|r| r.mirror_in_sync));
}

#[test]
fn reports_serialise_as_json_lines() {
    let scenario = Scenario::from_file(&demo_path("wifi_scenario.json")).unwrap();
    let reports = replay(&scenario, &PanelConfig::default()).unwrap();

    let json = serde_json::to_value(&reports[0]).unwrap();
    assert_eq!(json["step"], "add");
    assert!(json.get("publication").is_none());

    let json = serde_json::to_value(&reports[8]).unwrap();
    assert_eq!(json["publication"]["kind"], "reset");
}

#[test]
fn malformed_scenario_file_rejected() {
    let (_dir, path) = write_temp("scenario.json", "{ \"steps\": 3 }");
    assert!(matches!(
        Scenario::from_file(&path),
        Err(PanelError::Scenario(_))
    ));
}

#[test]
fn unknown_provider_batches_are_not_merged() {
    let scenario = Scenario::from_json(
        r#"{ "steps": [
            { "step": "add", "provider": "search.ContactsProvider",
              "results": [{ "stable_id": 9, "rank": 0, "view_type": "intent", "title": "Ann" }] },
            { "step": "display", "query": "a" }
        ] }"#,
    )
    .unwrap();
    let reports = replay(&scenario, &PanelConfig::default()).unwrap();
    assert_eq!(reports[1].size, 0);

    let mut config = PanelConfig::default();
    config
        .pipeline
        .merge_order
        .push(search_merge::ProviderId::new("search.ContactsProvider"));
    let reports = replay(&scenario, &config).unwrap();
    assert_eq!(reports[1].results, vec![9]);
}
