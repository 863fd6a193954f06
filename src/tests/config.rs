use crate::{
    config::Config,
    widgets::{CustomWidget, WidgetSize},
};

fn base_path(tmp: &tempfile::TempDir) -> String {
    tmp.path().to_str().unwrap().to_string()
}

#[test]
fn test_load_creates_default_config() {
    let tmp = tempfile::tempdir().unwrap();
    let config = Config::load_with(&base_path(&tmp)).unwrap();

    assert!(tmp.path().join("config.yaml").exists());
    assert_eq!(config.vault.path, ".");
    assert_eq!(config.vault.extensions, vec!["md"]);
    assert!(!config.query.implicit_and);
    assert_eq!(config.daily.file_format, "%Y-%m-%d");
    assert!(config.weekly.week_starts_on_monday);
    assert!(config.daily_quote);
    assert!(config.quote_data.is_none());
    assert!(config.widgets.is_empty());
}

#[test]
fn test_partial_config_is_completed_and_resaved() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(
        tmp.path().join("config.yaml"),
        "query:\n  implicit_and: true\nwidgets:\n  - title: Inbox\n    query: path:Inbox\n    size: small\n",
    )
    .unwrap();

    let config = Config::load_with(&base_path(&tmp)).unwrap();
    assert!(config.query.implicit_and);
    assert_eq!(config.daily.label_format, "%A %d, %B");
    assert_eq!(config.widgets[0].size, Some(WidgetSize::Small));
    assert_eq!(config.widget("inbox").map(|w| w.title.as_str()), Some("Inbox"));
    assert!(config.widget("missing").is_none());

    let saved = std::fs::read_to_string(tmp.path().join("config.yaml")).unwrap();
    assert!(saved.contains("label_format"));
    assert!(saved.contains("quote_url"));
}

#[test]
fn test_save_roundtrip() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = Config::load_with(&base_path(&tmp)).unwrap();

    config.widgets.push(CustomWidget {
        title: "Work".into(),
        query: Some("tag:work".into()),
        ..Default::default()
    });
    config.save().unwrap();

    let loaded = Config::load_with(&base_path(&tmp)).unwrap();
    assert_eq!(loaded.widgets, config.widgets);
}

#[test]
fn test_validate() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.widgets.push(CustomWidget::default());
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.vault.path = " ".into();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.daily.file_format = "%Q".into();
    assert!(config.validate().is_err());
}

#[test]
fn test_malformed_config_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("config.yaml"), "widgets: 12\n").unwrap();
    assert!(Config::load_with(&base_path(&tmp)).is_err());
}
