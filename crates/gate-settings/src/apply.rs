use std::net::SocketAddr;
use std::time::Duration;

use serde_json::Value;

use crate::errors::SettingsError;
use crate::model::{GateSettings, SettingSource};

/// Apply one dotted-path value onto the snapshot, recording where it came from.
pub fn apply_setting(
    settings: &mut GateSettings,
    path: &str,
    value: &Value,
    source: SettingSource,
) -> Result<(), SettingsError> {
    match path {
        "redirects.sign_in" => settings.redirects.sign_in = to_redirect(path, value)?,
        "redirects.landing" => settings.redirects.landing = to_redirect(path, value)?,
        "session.cookie_name" => settings.session.cookie_name = to_cookie_name(path, value)?,
        "session.default_ttl" => {
            let raw = to_string(path, value)?;
            parse_ttl(path, &raw)?;
            settings.session.default_ttl = raw;
        }
        "server.bind" => {
            let raw = to_string(path, value)?;
            raw.parse::<SocketAddr>()
                .map_err(|err| invalid(path, format!("{err}")))?;
            settings.server.bind = raw;
        }
        "routes.table_path" => {
            settings.routes.table_path = match value {
                Value::Null => None,
                other => Some(to_string(path, other)?),
            };
        }
        other => return Err(SettingsError::UnsupportedPath(other.to_string())),
    }
    settings.set_provenance(path, source);
    Ok(())
}

/// `session` (any case) means "no expiry"; anything else is a humantime duration.
pub fn parse_ttl(path: &str, raw: &str) -> Result<Option<Duration>, SettingsError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("session") {
        return Ok(None);
    }
    humantime::parse_duration(trimmed)
        .map(Some)
        .map_err(|err| invalid(path, format!("invalid ttl {trimmed:?}: {err}")))
}

fn to_string(path: &str, value: &Value) -> Result<String, SettingsError> {
    value
        .as_str()
        .map(|raw| raw.trim().to_string())
        .ok_or_else(|| invalid(path, format!("expected string, got {value}")))
}

// Same-origin absolute paths only; `//host` would be protocol-relative.
fn to_redirect(path: &str, value: &Value) -> Result<String, SettingsError> {
    let raw = to_string(path, value)?;
    if !raw.starts_with('/') || raw.starts_with("//") {
        return Err(invalid(path, format!("redirect must be a local path, got {raw:?}")));
    }
    Ok(raw)
}

fn to_cookie_name(path: &str, value: &Value) -> Result<String, SettingsError> {
    let raw = to_string(path, value)?;
    let valid = !raw.is_empty()
        && raw
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.'));
    if valid {
        Ok(raw)
    } else {
        Err(invalid(path, format!("invalid cookie name {raw:?}")))
    }
}

fn invalid(path: &str, reason: String) -> SettingsError {
    SettingsError::InvalidValue {
        path: path.to_string(),
        reason,
    }
}
