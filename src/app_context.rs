//! Application context shared by the CLI commands and the HTTP server.

use std::str::FromStr;
use std::sync::Arc;

use campus_gate_action_guard::ActionGuard;
use campus_gate_core_types::{Role, Session, SubjectId};
use campus_gate_route_gate::{
    default_route_table_file, load_route_table_from_path, RouteGate, RouteTable,
};
use campus_gate_session_store::{CredentialNames, InMemorySessionStore, SessionProvider};
use campus_gate_settings::GateSettings;
use tracing::info;

use crate::errors::AppError;

/// A session to pre-load into the in-memory store, written `TOKEN=SUBJECT:ROLE`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionSeed {
    pub token: String,
    pub subject: SubjectId,
    pub role: Role,
}

impl FromStr for SessionSeed {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| AppError::InvalidSeed {
            raw: raw.to_string(),
            reason: reason.to_string(),
        };
        let (token, identity) = raw
            .split_once('=')
            .ok_or_else(|| invalid("expected TOKEN=SUBJECT:ROLE"))?;
        let (subject, role) = identity
            .rsplit_once(':')
            .ok_or_else(|| invalid("expected SUBJECT:ROLE after '='"))?;
        let (token, subject) = (token.trim(), subject.trim());
        if token.is_empty() || subject.is_empty() {
            return Err(invalid("token and subject must be non-empty"));
        }
        Ok(Self {
            token: token.to_string(),
            subject: SubjectId(subject.to_string()),
            role: role.trim().parse()?,
        })
    }
}

/// Everything a request needs: one session provider injected into both the
/// route gate and the action guard.
pub struct AppContext {
    settings: GateSettings,
    gate: Arc<RouteGate>,
    guard: ActionGuard,
    store: Option<Arc<InMemorySessionStore>>,
}

impl AppContext {
    /// Context backed by a fresh in-memory session store.
    pub fn build(settings: GateSettings) -> Result<Self, AppError> {
        let store = Arc::new(InMemorySessionStore::with_names(CredentialNames {
            cookie: settings.session.cookie_name.clone(),
        }));
        let mut ctx = Self::with_provider(settings, store.clone())?;
        ctx.store = Some(store);
        Ok(ctx)
    }

    /// Context over any session collaborator.
    pub fn with_provider(
        settings: GateSettings,
        sessions: Arc<dyn SessionProvider>,
    ) -> Result<Self, AppError> {
        let table = load_route_table(&settings)?;
        let redirects = settings.redirects();
        let gate = Arc::new(RouteGate::new(table, sessions.clone(), redirects.clone()));
        let guard = ActionGuard::new(sessions, redirects);
        Ok(Self {
            settings,
            gate,
            guard,
            store: None,
        })
    }

    pub fn settings(&self) -> &GateSettings {
        &self.settings
    }

    pub fn gate(&self) -> Arc<RouteGate> {
        Arc::clone(&self.gate)
    }

    pub fn guard(&self) -> ActionGuard {
        self.guard.clone()
    }

    pub fn session_store(&self) -> Option<Arc<InMemorySessionStore>> {
        self.store.clone()
    }

    /// Loads seeds into the in-memory store with the configured default TTL.
    /// A context over an external provider has no store and seeds nothing.
    pub fn seed_sessions(&self, seeds: &[SessionSeed]) -> Result<Vec<Session>, AppError> {
        let Some(store) = self.store.as_ref() else {
            return Ok(Vec::new());
        };
        let ttl = self.settings.session_ttl()?;
        let mut seeded = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let session = store.insert(seed.token.clone(), seed.subject.clone(), seed.role, ttl);
            info!(subject = %seed.subject, role = %seed.role, "seeded session");
            seeded.push(session);
        }
        Ok(seeded)
    }
}

fn load_route_table(settings: &GateSettings) -> Result<RouteTable, AppError> {
    let (file, origin) = match settings.route_table_path() {
        Some(path) => {
            let origin = path.display().to_string();
            let file = load_route_table_from_path(&path).map_err(|source| AppError::RouteTable {
                path: origin.clone(),
                source,
            })?;
            (file, origin)
        }
        None => (default_route_table_file(), "<builtin>".to_string()),
    };
    let table = RouteTable::compile(&file).map_err(|source| AppError::RouteTable {
        path: origin.clone(),
        source,
    })?;
    info!(
        source = %origin,
        public = table.public().len(),
        rules = table.rules().len(),
        "route table loaded"
    );
    Ok(table)
}
