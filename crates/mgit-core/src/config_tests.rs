use super::*;

fn provider(name: &str) -> ProviderConfig {
    ProviderConfig {
        name: name.to_string(),
        kind: ProviderKind::GitHub,
        base_url: "https://api.github.com".to_string(),
        user: Some("bot".to_string()),
        secret: SecretString::new("super-secret-token".to_string()),
        workspace: None,
    }
}

#[test]
fn secret_string_debug_never_prints_value() {
    let secret = SecretString::new("super-secret-token".to_string());
    let rendered = format!("{:?}", secret);
    assert!(!rendered.contains("super-secret-token"));
    assert!(rendered.contains("REDACTED"));
}

#[test]
fn secret_string_serializes_as_redacted() {
    let secret = SecretString::new("super-secret-token".to_string());
    let json = serde_json::to_string(&secret).unwrap();
    assert_eq!(json, "\"[REDACTED]\"");
}

#[test]
fn find_is_case_insensitive() {
    let config = EffectiveConfig {
        providers: vec![provider("GH_Primary")],
        global: GlobalConfig::default(),
    };
    assert!(config.find("gh_primary").is_some());
    assert!(config.find("GH_PRIMARY").is_some());
    assert!(config.find("nope").is_none());
}

#[test]
fn concurrency_above_hard_max_is_clamped() {
    let (value, clamped) = EffectiveConfig::clamp_repository_concurrency(100);
    assert_eq!(value, MAX_REPOSITORY_CONCURRENCY);
    assert!(clamped);

    let (value, clamped) = EffectiveConfig::clamp_repository_concurrency(4);
    assert_eq!(value, 4);
    assert!(!clamped);
}

#[test]
fn global_defaults_match_spec() {
    let defaults = GlobalConfig::default();
    assert_eq!(defaults.default_concurrency, 4);
    assert_eq!(defaults.default_update_mode, UpdateMode::Skip);
}
