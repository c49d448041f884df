use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use campus_gate_core_types::Redirects;
use serde::{Deserialize, Serialize};

use crate::apply::parse_ttl;
use crate::errors::SettingsError;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GateSettings {
    pub redirects: RedirectSettings,
    pub session: SessionSettings,
    pub server: ServerSettings,
    pub routes: RouteSettings,
    #[serde(default)]
    pub provenance: BTreeMap<String, SettingProvenance>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RedirectSettings {
    pub sign_in: String,
    pub landing: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionSettings {
    pub cookie_name: String,
    /// Humantime duration, or `session` for no expiry.
    pub default_ttl: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerSettings {
    pub bind: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RouteSettings {
    pub table_path: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SettingProvenance {
    pub path: String,
    pub source: SettingSource,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum SettingSource {
    Builtin,
    File,
    Env,
    Cli,
}

impl GateSettings {
    pub fn set_provenance(&mut self, path: &str, source: SettingSource) {
        self.provenance.insert(
            path.to_string(),
            SettingProvenance {
                path: path.to_string(),
                source,
            },
        );
    }

    pub fn source_of(&self, path: &str) -> Option<SettingSource> {
        self.provenance.get(path).map(|entry| entry.source)
    }

    pub fn redirects(&self) -> Redirects {
        Redirects {
            sign_in: self.redirects.sign_in.clone(),
            landing: self.redirects.landing.clone(),
        }
    }

    pub fn session_ttl(&self) -> Result<Option<Duration>, SettingsError> {
        parse_ttl("session.default_ttl", &self.session.default_ttl)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.server
            .bind
            .parse()
            .map_err(|err| SettingsError::InvalidValue {
                path: "server.bind".into(),
                reason: format!("{err}"),
            })
    }

    pub fn route_table_path(&self) -> Option<PathBuf> {
        self.routes.table_path.as_ref().map(PathBuf::from)
    }
}
