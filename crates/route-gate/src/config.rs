//! Route table definitions for the route gate.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Static route table file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouteTableFile {
    pub version: u32,
    /// Paths reachable without a session.
    pub public: Vec<String>,
    /// Namespaces that authorize per operation instead of per path.
    pub api: Vec<String>,
    pub rules: Vec<RouteRuleSpec>,
}

/// One role restriction. `allow` keeps raw strings so validation can
/// report every unknown role at once.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouteRuleSpec {
    pub prefix: String,
    pub allow: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Errors surfaced while loading or compiling a route table.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to deserialize route table: {0}")]
    Deserialize(String),
    #[error("invalid route table: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

pub fn load_route_table_from_reader<R: Read>(mut reader: R) -> Result<RouteTableFile, ConfigError> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    parse_route_table_str(&buf)
}

pub fn load_route_table_from_path(path: impl AsRef<Path>) -> Result<RouteTableFile, ConfigError> {
    let file = File::open(path.as_ref())?;
    load_route_table_from_reader(file)
}

pub fn parse_route_table_str(raw: &str) -> Result<RouteTableFile, ConfigError> {
    match serde_json::from_str(raw) {
        Ok(table) => Ok(table),
        Err(json_err) => serde_yaml::from_str(raw).map_err(|yaml_err| {
            ConfigError::Deserialize(format!(
                "json error: {}; yaml error: {}",
                json_err, yaml_err
            ))
        }),
    }
}

/// Route table used when no file is configured.
pub fn default_route_table_file() -> RouteTableFile {
    let any_role = ["student", "mentor", "recruiter", "partner_agency", "admin"];
    RouteTableFile {
        version: 1,
        public: ["/", "/sign-in", "/sign-up", "/about", "/courses"]
            .into_iter()
            .map(String::from)
            .collect(),
        api: vec!["/api".into()],
        rules: vec![
            RouteRuleSpec {
                prefix: "/dashboard/admin".into(),
                allow: vec!["admin".into()],
                notes: None,
            },
            RouteRuleSpec {
                prefix: "/dashboard/mentor".into(),
                allow: vec!["mentor".into(), "admin".into()],
                notes: None,
            },
            RouteRuleSpec {
                prefix: "/dashboard/student".into(),
                allow: any_role.into_iter().map(String::from).collect(),
                notes: Some("shared content: every authenticated role may view".into()),
            },
        ],
    }
}
