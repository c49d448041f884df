use crate::apply::{apply_setting, parse_ttl};
use crate::defaults::default_settings;
use crate::errors::SettingsError;
use crate::loader::{load_settings, load_settings_with_options, LoadOptions};
use crate::model::SettingSource;
use std::env;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

#[test]
fn defaults_match_conventional_targets() {
    let settings = default_settings();
    let redirects = settings.redirects();
    assert_eq!(redirects.sign_in, "/sign-in");
    assert_eq!(redirects.landing, "/dashboard");
    assert_eq!(
        settings.session_ttl().unwrap(),
        Some(Duration::from_secs(12 * 3600))
    );
    assert_eq!(settings.bind_addr().unwrap().port(), 3000);
}

#[test]
fn file_overlay_replaces_values_and_records_provenance() {
    let _guard = env_guard().lock().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("gate.yaml");
    std::fs::write(
        &file_path,
        r#"redirects:
  sign_in: /login
session:
  default_ttl: 30m
routes:
  table_path: ./routes.yaml
"#,
    )
    .unwrap();

    let settings = load_settings(Some(&file_path)).unwrap();
    assert_eq!(settings.redirects.sign_in, "/login");
    assert_eq!(settings.redirects.landing, "/dashboard");
    assert_eq!(
        settings.session_ttl().unwrap(),
        Some(Duration::from_secs(30 * 60))
    );
    assert_eq!(
        settings.route_table_path().unwrap().to_str(),
        Some("./routes.yaml")
    );
    assert_eq!(
        settings.source_of("redirects.sign_in"),
        Some(SettingSource::File)
    );
    assert_eq!(
        settings.source_of("redirects.landing"),
        Some(SettingSource::Builtin)
    );
}

#[test]
fn json_file_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("gate.json");
    std::fs::write(&file_path, r#"{"server": {"bind": "0.0.0.0:8080"}}"#).unwrap();

    let options = LoadOptions {
        paths: vec![file_path],
        include_env: false,
        include_cli_env: false,
    };
    let settings = load_settings_with_options(&options).unwrap();
    assert_eq!(settings.bind_addr().unwrap().port(), 8080);
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let options = LoadOptions {
        paths: vec![dir.path().join("absent.yaml")],
        include_env: false,
        include_cli_env: false,
    };
    assert!(matches!(
        load_settings_with_options(&options),
        Err(SettingsError::Io(_))
    ));
}

#[test]
fn unknown_path_in_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("gate.yaml");
    std::fs::write(&file_path, "redirects:\n  logout: /bye\n").unwrap();
    let options = LoadOptions {
        paths: vec![file_path],
        include_env: false,
        include_cli_env: false,
    };
    assert!(matches!(
        load_settings_with_options(&options),
        Err(SettingsError::UnsupportedPath(path)) if path == "redirects.logout"
    ));
}

#[test]
fn env_overlay_applies_and_records_provenance() {
    let _guard = env_guard().lock().unwrap();
    let key = "CAMPUS_GATE__REDIRECTS__LANDING";
    env::set_var(key, "/home");
    let settings = load_settings(None);
    env::remove_var(key);
    let settings = settings.expect("load settings");
    assert_eq!(settings.redirects.landing, "/home");
    assert_eq!(
        settings.source_of("redirects.landing"),
        Some(SettingSource::Env)
    );
}

#[test]
fn cli_overrides_win_over_env() {
    let _guard = env_guard().lock().unwrap();
    env::set_var("CAMPUS_GATE__SESSION__COOKIE_NAME", "from_env");
    env::set_var(
        "CAMPUS_GATE_CLI_OVERRIDES",
        "session.cookie_name=from_cli, session.default_ttl=session",
    );
    let settings = load_settings(None);
    env::remove_var("CAMPUS_GATE__SESSION__COOKIE_NAME");
    env::remove_var("CAMPUS_GATE_CLI_OVERRIDES");
    let settings = settings.expect("load settings with cli");
    assert_eq!(settings.session.cookie_name, "from_cli");
    assert_eq!(settings.session_ttl().unwrap(), None);
    assert_eq!(
        settings.source_of("session.cookie_name"),
        Some(SettingSource::Cli)
    );
}

#[test]
fn redirects_must_stay_local() {
    let mut settings = default_settings();
    for bad in ["login", "//evil.example", "https://evil.example/"] {
        let result = apply_setting(
            &mut settings,
            "redirects.sign_in",
            &serde_json::json!(bad),
            SettingSource::Cli,
        );
        assert!(matches!(result, Err(SettingsError::InvalidValue { .. })), "{bad}");
    }
    assert_eq!(settings.redirects.sign_in, "/sign-in");
}

#[test]
fn invalid_values_are_rejected() {
    let mut settings = default_settings();
    assert!(apply_setting(
        &mut settings,
        "server.bind",
        &serde_json::json!("localhost"),
        SettingSource::File
    )
    .is_err());
    assert!(apply_setting(
        &mut settings,
        "session.cookie_name",
        &serde_json::json!("bad name;"),
        SettingSource::File
    )
    .is_err());
    assert!(apply_setting(
        &mut settings,
        "session.default_ttl",
        &serde_json::json!(30),
        SettingSource::File
    )
    .is_err());
    assert!(parse_ttl("t", "soon").is_err());
    assert_eq!(parse_ttl("t", "SESSION").unwrap(), None);
}

fn env_guard() -> &'static Mutex<()> {
    static ENV_GUARD: OnceLock<Mutex<()>> = OnceLock::new();
    ENV_GUARD.get_or_init(|| Mutex::new(()))
}
