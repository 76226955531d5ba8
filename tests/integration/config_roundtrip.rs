//! Config file round trips and validation at load time.

use search_merge::ProviderId;
use search_panel::{PanelConfig, PanelError};

use crate::helpers::write_temp;

#[test]
fn full_config_file_loads() {
    let (_dir, path) = write_temp(
        "config.toml",
        r#"
[pipeline]
merge_order = ["search.DatabaseResultProvider", "search.InstalledAppResultProvider", "search.ContactsProvider"]
top_rank = 0
bottom_rank = 5
smart_ranking = false

[session]
channel_capacity = 16
provider_timeout_ms = 250

[logging]
filter = "search_panel=debug"
"#,
    );

    let config = PanelConfig::from_file(&path).unwrap();
    assert_eq!(config.pipeline.merge_order.len(), 3);
    assert_eq!(config.pipeline.merge_order[2], ProviderId::new("search.ContactsProvider"));
    assert_eq!(config.pipeline.bottom_rank, 5);
    assert!(!config.pipeline.smart_ranking);
    assert_eq!(config.session.channel_capacity, 16);
    assert_eq!(config.session.provider_timeout_ms, 250);
    assert_eq!(config.logging.filter, "search_panel=debug");
}

#[test]
fn empty_file_is_default() {
    let (_dir, path) = write_temp("config.toml", "");
    assert_eq!(PanelConfig::from_file(&path).unwrap(), PanelConfig::default());
}

#[test]
fn duplicate_provider_rejected_on_load() {
    let (_dir, path) = write_temp(
        "config.toml",
        r#"
[pipeline]
merge_order = ["search.DatabaseResultProvider", "search.DatabaseResultProvider"]
"#,
    );
    let err = PanelConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, PanelError::Pipeline(_)));
    assert!(err.to_string().contains("more than once"));
}

#[test]
fn zero_timeout_rejected_on_load() {
    let (_dir, path) = write_temp("config.toml", "[session]\nprovider_timeout_ms = 0\n");
    assert!(matches!(
        PanelConfig::from_file(&path),
        Err(PanelError::Config(_))
    ));
}

#[test]
fn saved_file_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("search-panel").join("config.toml");

    let mut config = PanelConfig::default();
    config.pipeline.merge_order.reverse();
    config.logging.filter = "warn".into();
    config.save_to_file(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("[pipeline]"));
    assert!(text.contains("[session]"));
    assert_eq!(PanelConfig::from_file(&path).unwrap(), config);
}
