use std::collections::BTreeMap;

use campus_gate_core_types::Redirects;

use crate::model::{GateSettings, RedirectSettings, RouteSettings, ServerSettings, SessionSettings};

pub fn default_settings() -> GateSettings {
    let redirects = Redirects::default();
    GateSettings {
        redirects: RedirectSettings {
            sign_in: redirects.sign_in,
            landing: redirects.landing,
        },
        session: SessionSettings {
            cookie_name: "campus_session".to_string(),
            default_ttl: "12h".to_string(),
        },
        server: ServerSettings {
            bind: "127.0.0.1:3000".to_string(),
        },
        routes: RouteSettings { table_path: None },
        provenance: BTreeMap::new(),
    }
}
