use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::apply::apply_setting;
use crate::defaults::default_settings;
use crate::errors::SettingsError;
use crate::model::{GateSettings, SettingSource};

const ENV_PREFIX: &str = "CAMPUS_GATE__";
const ENV_JSON: &str = "CAMPUS_GATE_OVERRIDE_JSON";
const ENV_CLI_OVERRIDES: &str = "CAMPUS_GATE_CLI_OVERRIDES";

#[derive(Debug, Default)]
pub struct LoadOptions {
    pub paths: Vec<PathBuf>,
    pub include_env: bool,
    pub include_cli_env: bool,
}

impl LoadOptions {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            paths: vec![path.into()],
            include_env: true,
            include_cli_env: true,
        }
    }
}

/// Builtin defaults, then `path` (which must exist when given), then env, then CLI env.
pub fn load_settings(path: Option<&Path>) -> Result<GateSettings, SettingsError> {
    let mut options = LoadOptions::default();
    if let Some(p) = path {
        options.paths.push(p.to_path_buf());
    }
    options.include_env = true;
    options.include_cli_env = true;
    load_settings_with_options(&options)
}

pub fn load_settings_with_options(options: &LoadOptions) -> Result<GateSettings, SettingsError> {
    let mut settings = default_settings();
    bootstrap_builtin_provenance(&mut settings)?;

    for path in &options.paths {
        let overlay = overlays_from_file(path)?;
        debug!(path = %path.display(), entries = overlay.len(), "applying settings file");
        apply_overlays(&mut settings, overlay)?;
    }

    if options.include_env {
        apply_overlays(&mut settings, overlays_from_env()?)?;
    }

    if options.include_cli_env {
        apply_overlays(&mut settings, overlays_from_cli_env())?;
    }

    Ok(settings)
}

struct SettingOverlay {
    path: String,
    value: Value,
    source: SettingSource,
}

fn apply_overlays(
    settings: &mut GateSettings,
    overlays: Vec<SettingOverlay>,
) -> Result<(), SettingsError> {
    for overlay in overlays {
        apply_setting(settings, &overlay.path, &overlay.value, overlay.source)?;
    }
    Ok(())
}

fn overlays_from_file(path: &Path) -> Result<Vec<SettingOverlay>, SettingsError> {
    let content = fs::read_to_string(path)
        .map_err(|err| SettingsError::Io(format!("{}: {}", path.display(), err)))?;
    // YAML is a superset of JSON, so one parser covers both formats.
    let yaml_value: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|err| SettingsError::Invalid(format!("{}", err)))?;
    let json_value =
        serde_json::to_value(yaml_value).map_err(|err| SettingsError::Invalid(format!("{}", err)))?;
    Ok(flatten_value(json_value, None, SettingSource::File))
}

fn overlays_from_env() -> Result<Vec<SettingOverlay>, SettingsError> {
    let mut overlays = env_overlays(env::vars_os());

    if let Ok(raw_json) = env::var(ENV_JSON) {
        if !raw_json.trim().is_empty() {
            let json_value: Value = serde_json::from_str(&raw_json)
                .map_err(|err| SettingsError::Invalid(format!("{ENV_JSON}: {err}")))?;
            overlays.extend(flatten_value(json_value, None, SettingSource::Env));
        }
    }

    Ok(overlays)
}

/// `CAMPUS_GATE__SESSION__COOKIE_NAME=sid` becomes `session.cookie_name`.
/// Variables that are not valid UTF-8 are skipped with a warning.
fn env_overlays(vars: impl IntoIterator<Item = (OsString, OsString)>) -> Vec<SettingOverlay> {
    vars.into_iter()
        .filter_map(|(key, raw)| {
            let key = key.to_str()?;
            let stripped = key.strip_prefix(ENV_PREFIX)?;
            let Some(raw) = raw.to_str() else {
                warn!(variable = key, "ignoring non UTF-8 settings override");
                return None;
            };
            let path = stripped
                .split("__")
                .filter(|segment| !segment.is_empty())
                .map(str::to_ascii_lowercase)
                .collect::<Vec<_>>()
                .join(".");
            (!path.is_empty()).then(|| SettingOverlay {
                path,
                value: parse_env_value(raw),
                source: SettingSource::Env,
            })
        })
        .collect()
}

fn overlays_from_cli_env() -> Vec<SettingOverlay> {
    let mut overlays = Vec::new();
    if let Ok(raw) = env::var(ENV_CLI_OVERRIDES) {
        for token in raw.split(',') {
            let trimmed = token.trim();
            if trimmed.is_empty() {
                continue;
            }
            let (path, value_raw) = trimmed.split_once('=').unwrap_or((trimmed, ""));
            let path = path.trim();
            if path.is_empty() {
                continue;
            }
            overlays.push(SettingOverlay {
                path: path.to_string(),
                value: parse_env_value(value_raw.trim()),
                source: SettingSource::Cli,
            });
        }
    }
    overlays
}

// Everything this crate reads is a string, so only JSON literals are decoded.
fn parse_env_value(raw: &str) -> Value {
    if raw.is_empty() || raw == "null" {
        return Value::Null;
    }
    if raw.starts_with('"') {
        if let Ok(parsed) = serde_json::from_str::<Value>(raw) {
            return parsed;
        }
    }
    Value::String(raw.to_string())
}

fn flatten_value(
    value: Value,
    prefix: Option<String>,
    source: SettingSource,
) -> Vec<SettingOverlay> {
    match value {
        Value::Object(map) => {
            let mut result = Vec::new();
            for (key, value) in map {
                let key_segment = key.trim().to_ascii_lowercase();
                let next_prefix = match &prefix {
                    Some(prefix) if !prefix.is_empty() => format!("{}.{}", prefix, key_segment),
                    _ => key_segment,
                };
                result.extend(flatten_value(value, Some(next_prefix), source));
            }
            result
        }
        other => match prefix {
            Some(path) => vec![SettingOverlay {
                path,
                value: other,
                source,
            }],
            None => Vec::new(),
        },
    }
}

fn bootstrap_builtin_provenance(settings: &mut GateSettings) -> Result<(), SettingsError> {
    let sections = [
        ("redirects", serde_json::to_value(&settings.redirects)),
        ("session", serde_json::to_value(&settings.session)),
        ("server", serde_json::to_value(&settings.server)),
        ("routes", serde_json::to_value(&settings.routes)),
    ];
    let mut overlays = Vec::new();
    for (name, value) in sections {
        let value = value.map_err(|err| SettingsError::Invalid(format!("{}", err)))?;
        overlays.extend(flatten_value(value, Some(name.into()), SettingSource::Builtin));
    }

    for overlay in overlays {
        settings.set_provenance(&overlay.path, overlay.source);
    }
    Ok(())
}
