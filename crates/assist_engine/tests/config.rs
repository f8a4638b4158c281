use std::time::Duration;

use assist_core::{SelectorList, SummaryLength, Tone};
use assist_engine::{AssistConfig, ConfigError, DEFAULT_BACKEND_BASE_URL};
use pretty_assertions::assert_eq;

#[test]
fn defaults_are_valid() {
    let config = AssistConfig::default();
    assert_eq!(config.backend_base_url, DEFAULT_BACKEND_BASE_URL);
    assert_eq!(config.settle_delay(), Duration::from_millis(500));
    assert_eq!(config.startup_delay(), Duration::from_millis(1200));
    assert_eq!(config.validate(), Ok(()));
}

#[test]
fn partial_documents_fill_in_defaults() {
    let config: AssistConfig = serde_json::from_str(
        r#"{ "tone": "friendly", "summary_length": "long", "selectors": { "toolbar": [".custom"] } }"#,
    )
    .unwrap();

    assert_eq!(config.tone, Tone::Friendly);
    assert_eq!(config.summary_length, SummaryLength::Long);
    assert_eq!(config.selectors.toolbar, SelectorList::new([".custom"]).unwrap());
    assert_eq!(config.selectors.compose_box, SelectorList::compose_box());
    assert_eq!(config.settle_delay_ms, 500);
}

#[test]
fn empty_selector_lists_are_rejected_when_loading() {
    let result: Result<AssistConfig, _> =
        serde_json::from_str(r#"{ "selectors": { "toolbar": ["  "] } }"#);
    assert!(result.is_err());
}

#[test]
fn backend_url_must_be_http() {
    let config = AssistConfig {
        backend_base_url: "ftp://example.com/api".into(),
        ..AssistConfig::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidBackendUrl { .. })
    ));

    let config = AssistConfig {
        backend_base_url: "not a url".into(),
        ..AssistConfig::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidBackendUrl { .. })
    ));
}

#[test]
fn unparsable_selector_fails_validation() {
    let mut config = AssistConfig::default();
    config.selectors.compose_detect = SelectorList::new([".btC", "div["]).unwrap();

    match config.validate() {
        Err(ConfigError::Selector(err)) => assert_eq!(err.selector, "div["),
        other => panic!("expected selector error, got {other:?}"),
    }
}
