use anyhow::Result;
use campus_gate::AppContext;
use campus_gate_core_types::RoleSet;
use serde::Serialize;

use super::output::{print_structured, OutputFormat};

#[derive(Serialize)]
struct RoutesReport {
    public: Vec<String>,
    api: Vec<String>,
    /// In evaluation order.
    rules: Vec<RuleReport>,
}

#[derive(Serialize)]
struct RuleReport {
    prefix: String,
    allow: RoleSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

pub async fn cmd_routes(ctx: &AppContext, format: OutputFormat) -> Result<()> {
    let gate = ctx.gate();
    let table = gate.table();
    let report = RoutesReport {
        public: table.public().iter().map(ToString::to_string).collect(),
        api: table.api().iter().map(ToString::to_string).collect(),
        rules: table
            .rules()
            .iter()
            .map(|rule| RuleReport {
                prefix: rule.pattern.to_string(),
                allow: rule.allow,
                notes: rule.notes.clone(),
            })
            .collect(),
    };

    if print_structured(format, &report)? {
        return Ok(());
    }

    println!("Public:");
    for pattern in &report.public {
        println!("  {}", pattern);
    }
    println!("API namespaces:");
    for pattern in &report.api {
        println!("  {}", pattern);
    }
    println!("Rules (evaluation order):");
    for rule in &report.rules {
        match &rule.notes {
            Some(notes) => println!("  {:<24} {}  # {}", rule.prefix, rule.allow, notes),
            None => println!("  {:<24} {}", rule.prefix, rule.allow),
        }
    }
    let redirects = ctx.settings().redirects();
    println!("Redirects: sign-in {}, landing {}", redirects.sign_in, redirects.landing);
    Ok(())
}
