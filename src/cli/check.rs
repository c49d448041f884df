use anyhow::Result;
use campus_gate::AppContext;
use campus_gate_core_types::{Role, RoleSet, Session, SubjectId};
use campus_gate_route_gate::{normalize_path, GateDecision, RouteClass, RouteClassKind};
use clap::Args;
use serde::Serialize;

use super::output::{print_structured, OutputFormat};

#[derive(Args, Clone, Debug)]
pub struct CheckArgs {
    /// Request path to evaluate, e.g. /dashboard/admin
    #[arg(long)]
    pub path: String,

    /// Role of the caller
    #[arg(long, required_unless_present = "anonymous")]
    pub role: Option<Role>,

    /// Evaluate as a visitor without a session
    #[arg(long, conflicts_with = "role")]
    pub anonymous: bool,
}

#[derive(Serialize)]
struct CheckReport {
    path: String,
    normalized: String,
    class: RouteClassKind,
    role: Option<Role>,
    matched_rules: Vec<MatchedRule>,
    decision: GateDecision,
}

#[derive(Serialize)]
struct MatchedRule {
    prefix: String,
    allow: RoleSet,
}

/// Evaluate the gate offline for one path and identity.
pub async fn cmd_check(args: CheckArgs, ctx: &AppContext, format: OutputFormat) -> Result<()> {
    let gate = ctx.gate();
    let class = gate.classify(&args.path);
    let session = args
        .role
        .map(|role| Session::new(SubjectId("cli-check".into()), role, None));
    let decision = gate.decide(&class, session.as_ref());

    let matched_rules = match &class {
        RouteClass::Protected(rules) => rules
            .iter()
            .map(|rule| MatchedRule {
                prefix: rule.pattern.to_string(),
                allow: rule.allow,
            })
            .collect(),
        _ => Vec::new(),
    };
    let report = CheckReport {
        normalized: normalize_path(&args.path),
        path: args.path,
        class: class.kind(),
        role: args.role,
        matched_rules,
        decision,
    };

    if print_structured(format, &report)? {
        return Ok(());
    }

    let who = report
        .role
        .map(|role| role.to_string())
        .unwrap_or_else(|| "anonymous".to_string());
    println!("{} as {} -> {:?}", report.normalized, who, report.class);
    for rule in &report.matched_rules {
        println!("  rule {} allows {}", rule.prefix, rule.allow);
    }
    match &report.decision {
        GateDecision::Pass => println!("  pass"),
        GateDecision::Redirect { kind, location } => {
            println!("  redirect to {} ({:?})", location, kind)
        }
    }
    Ok(())
}
