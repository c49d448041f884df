use axum::http::{header, HeaderMap};

pub const DEFAULT_SESSION_COOKIE: &str = "campus_session";

/// Where a session token may be carried on a request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CredentialNames {
    pub cookie: String,
}

impl Default for CredentialNames {
    fn default() -> Self {
        Self {
            cookie: DEFAULT_SESSION_COOKIE.to_string(),
        }
    }
}

/// Bearer token first, then the session cookie. Blank values count as absent.
pub fn session_token(headers: &HeaderMap, names: &CredentialNames) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        if let Ok(raw) = value.to_str() {
            if let Some(token) = bearer_token(raw) {
                let trimmed = token.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }

    for value in headers.get_all(header::COOKIE) {
        let Ok(raw) = value.to_str() else {
            continue;
        };
        for pair in raw.split(';') {
            let Some((name, token)) = pair.trim().split_once('=') else {
                continue;
            };
            if name.trim() == names.cookie {
                let trimmed = token.trim().trim_matches('"');
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }

    None
}

/// The auth scheme is case-insensitive.
fn bearer_token(raw: &str) -> Option<&str> {
    let (scheme, token) = raw.trim_start().split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("campus_session=from-cookie"),
        );
        assert_eq!(
            session_token(&headers, &CredentialNames::default()).as_deref(),
            Some("from-header")
        );
    }

    #[test]
    fn bearer_scheme_ignores_case() {
        for raw in ["bearer tok-1", "BEARER tok-1", "BeArEr   tok-1"] {
            let mut headers = HeaderMap::new();
            headers.insert(header::AUTHORIZATION, HeaderValue::from_str(raw).unwrap());
            assert_eq!(
                session_token(&headers, &CredentialNames::default()).as_deref(),
                Some("tok-1"),
                "{raw}"
            );
        }
    }

    #[test]
    fn cookie_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(
            header::COOKIE,
            HeaderValue::from_static("lang=en; campus_session=abc123 ; other=1"),
        );
        assert_eq!(
            session_token(&headers, &CredentialNames::default()).as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn blank_and_foreign_credentials_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        headers.insert(header::COOKIE, HeaderValue::from_static("campus_session="));
        assert!(session_token(&headers, &CredentialNames::default()).is_none());

        let mut basic = HeaderMap::new();
        basic.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        assert!(session_token(&basic, &CredentialNames::default()).is_none());
    }

    #[test]
    fn custom_cookie_name() {
        let names = CredentialNames {
            cookie: "sid".into(),
        };
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("campus_session=nope; sid=yes"),
        );
        assert_eq!(session_token(&headers, &names).as_deref(), Some("yes"));
    }
}
