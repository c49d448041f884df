use serde::{Deserialize, Serialize};

/// Which of the two redirect targets a failed check resolves to.
///
/// `SignIn` means "log in first", `Landing` means "you are logged in but
/// this area is not yours". The two are never interchangeable.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectKind {
    SignIn,
    Landing,
}

/// Concrete paths for each redirect kind.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Redirects {
    pub sign_in: String,
    pub landing: String,
}

impl Redirects {
    pub fn location(&self, kind: RedirectKind) -> &str {
        match kind {
            RedirectKind::SignIn => &self.sign_in,
            RedirectKind::Landing => &self.landing,
        }
    }
}

impl Default for Redirects {
    fn default() -> Self {
        Self {
            sign_in: "/sign-in".to_string(),
            landing: "/dashboard".to_string(),
        }
    }
}
