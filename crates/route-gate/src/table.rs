use std::collections::HashMap;
use std::fmt;

use campus_gate_core_types::{Role, RoleSet};
use serde::Serialize;

use crate::config::{ConfigError, RouteTableFile};

/// A path pattern. `/` matches only the root; anything else matches itself
/// and every path nested under it on a segment boundary.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum PathPattern {
    Root,
    Subtree(String),
}

impl PathPattern {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        if !trimmed.starts_with('/') {
            return Err(format!("pattern {raw:?} must start with '/'"));
        }
        if trimmed.contains(['?', '#', '*']) {
            return Err(format!("pattern {raw:?} must be a plain path"));
        }
        let normalized = normalize_path(trimmed);
        if normalized == "/" {
            Ok(PathPattern::Root)
        } else {
            Ok(PathPattern::Subtree(normalized))
        }
    }

    /// `path` must come from [`normalize_path`] or [`literal_path`].
    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Root => path == "/",
            PathPattern::Subtree(prefix) => match path.strip_prefix(prefix.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            },
        }
    }

    /// Number of path segments; deeper patterns are more specific.
    pub fn specificity(&self) -> usize {
        match self {
            PathPattern::Root => 0,
            PathPattern::Subtree(prefix) => prefix.split('/').filter(|s| !s.is_empty()).count(),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PathPattern::Root => "/",
            PathPattern::Subtree(prefix) => prefix,
        }
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collapses repeated slashes, drops `.` segments, resolves `..`, and strips
/// any query or fragment, so `//dashboard/./admin/` reaches the same rules
/// as `/dashboard/admin`.
pub fn normalize_path(raw: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path_segments(raw) {
        match segment {
            "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    format!("/{}", segments.join("/"))
}

/// The path as a router sees it: repeated slashes collapsed, query and
/// fragment stripped, dot segments kept verbatim.
pub fn literal_path(raw: &str) -> String {
    let segments: Vec<&str> = path_segments(raw).collect();
    format!("/{}", segments.join("/"))
}

fn path_segments(raw: &str) -> impl Iterator<Item = &str> {
    let end = raw.find(['?', '#']).unwrap_or(raw.len());
    raw[..end].split('/').filter(|segment| !segment.is_empty())
}

/// A compiled role restriction.
#[derive(Clone, Debug)]
pub struct RouteRule {
    pub pattern: PathPattern,
    pub allow: RoleSet,
    pub notes: Option<String>,
}

impl RouteRule {
    pub fn permits(&self, role: Role) -> bool {
        self.allow.contains(role)
    }
}

/// Coarse bucket of a path, without the matched rules.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteClassKind {
    Public,
    Api,
    Protected,
}

/// Classification of a concrete path.
#[derive(Clone, Debug)]
pub enum RouteClass<'a> {
    Public,
    Api,
    /// Matching rules, most specific first. Empty means "any session".
    Protected(Vec<&'a RouteRule>),
}

impl RouteClass<'_> {
    pub fn kind(&self) -> RouteClassKind {
        match self {
            RouteClass::Public => RouteClassKind::Public,
            RouteClass::Api => RouteClassKind::Api,
            RouteClass::Protected(_) => RouteClassKind::Protected,
        }
    }
}

/// Validated, ordered route table.
#[derive(Clone, Debug)]
pub struct RouteTable {
    public: Vec<PathPattern>,
    api: Vec<PathPattern>,
    rules: Vec<RouteRule>,
}

impl RouteTable {
    pub fn compile(file: &RouteTableFile) -> Result<Self, ConfigError> {
        let mut problems = Vec::new();
        let mut seen: HashMap<PathPattern, &'static str> = HashMap::new();

        let mut compile_patterns = |raws: &[String], bucket: &'static str, problems: &mut Vec<String>| {
            let mut out = Vec::new();
            for raw in raws {
                match PathPattern::parse(raw) {
                    Ok(pattern) => {
                        if let Some(previous) = seen.insert(pattern.clone(), bucket) {
                            problems.push(format!(
                                "{pattern} listed in both {previous} and {bucket}"
                            ));
                        }
                        out.push(pattern);
                    }
                    Err(err) => problems.push(err),
                }
            }
            out
        };

        let public = compile_patterns(&file.public, "public", &mut problems);
        let api = compile_patterns(&file.api, "api", &mut problems);
        let prefixes: Vec<String> = file.rules.iter().map(|rule| rule.prefix.clone()).collect();
        let rule_patterns = compile_patterns(&prefixes, "rules", &mut problems);

        let mut rules = Vec::new();
        if rule_patterns.len() == file.rules.len() {
            for (spec, pattern) in file.rules.iter().zip(rule_patterns) {
                let mut allow = RoleSet::EMPTY;
                for raw in &spec.allow {
                    match raw.parse::<Role>() {
                        Ok(role) => allow = allow.with(role),
                        Err(err) => problems.push(format!("rule {}: {err}", spec.prefix)),
                    }
                }
                if spec.allow.is_empty() {
                    problems.push(format!("rule {}: allow-list is empty", spec.prefix));
                }
                rules.push(RouteRule {
                    pattern,
                    allow,
                    notes: spec.notes.clone(),
                });
            }
        }

        if !problems.is_empty() {
            return Err(ConfigError::Invalid(problems));
        }

        // Stable: equally specific rules keep declaration order.
        rules.sort_by(|a, b| b.pattern.specificity().cmp(&a.pattern.specificity()));
        Ok(Self { public, api, rules })
    }

    pub fn public(&self) -> &[PathPattern] {
        &self.public
    }

    pub fn api(&self) -> &[PathPattern] {
        &self.api
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// Total: every path lands in exactly one bucket. An open (public or api)
    /// match wins unless some rule is more specific than it.
    ///
    /// A path with dot segments is classified both as written and as
    /// resolved. If either reading is protected, every rule matching either
    /// reading applies.
    pub fn classify(&self, path: &str) -> RouteClass<'_> {
        let resolved = normalize_path(path);
        let literal = literal_path(path);
        let class = self.classify_normalized(&resolved);
        if literal == resolved {
            return class;
        }

        let literal_class = self.classify_normalized(&literal);
        if class.kind() != RouteClassKind::Protected
            && literal_class.kind() != RouteClassKind::Protected
        {
            return class;
        }
        RouteClass::Protected(
            self.rules
                .iter()
                .filter(|rule| rule.pattern.matches(&resolved) || rule.pattern.matches(&literal))
                .collect(),
        )
    }

    fn classify_normalized(&self, path: &str) -> RouteClass<'_> {
        let best_public = best_match(&self.public, path);
        let best_api = best_match(&self.api, path);
        let matching: Vec<&RouteRule> = self
            .rules
            .iter()
            .filter(|rule| rule.pattern.matches(path))
            .collect();
        let best_rule = matching.first().map(|rule| rule.pattern.specificity());

        let open = match (best_public, best_api) {
            (Some(p), Some(a)) if a > p => Some((RouteClass::Api, a)),
            (Some(p), _) => Some((RouteClass::Public, p)),
            (None, Some(a)) => Some((RouteClass::Api, a)),
            (None, None) => None,
        };

        match (open, best_rule) {
            (Some((_, open_depth)), Some(rule_depth)) if rule_depth > open_depth => {
                RouteClass::Protected(matching)
            }
            (Some((class, _)), _) => class,
            (None, _) => RouteClass::Protected(matching),
        }
    }
}

fn best_match(patterns: &[PathPattern], path: &str) -> Option<usize> {
    patterns
        .iter()
        .filter(|pattern| pattern.matches(path))
        .map(PathPattern::specificity)
        .max()
}
