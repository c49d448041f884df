//! Error handling module

use campus_gate_core_types::UnknownRole;
use campus_gate_route_gate::ConfigError;
use campus_gate_settings::SettingsError;
use thiserror::Error;

/// Failures while assembling the application context.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("settings: {0}")]
    Settings(#[from] SettingsError),
    #[error("route table {path}: {source}")]
    RouteTable {
        path: String,
        #[source]
        source: ConfigError,
    },
    #[error("invalid session seed {raw:?}: {reason}")]
    InvalidSeed { raw: String, reason: String },
    #[error(transparent)]
    UnknownRole(#[from] UnknownRole),
}
