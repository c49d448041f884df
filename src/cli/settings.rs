use anyhow::Result;
use campus_gate::AppContext;

use super::output::{print_structured, OutputFormat};

pub async fn cmd_settings(ctx: &AppContext, format: OutputFormat) -> Result<()> {
    let settings = ctx.settings();
    if print_structured(format, settings)? {
        return Ok(());
    }

    println!("redirects.sign_in   = {}", settings.redirects.sign_in);
    println!("redirects.landing   = {}", settings.redirects.landing);
    println!("session.cookie_name = {}", settings.session.cookie_name);
    println!("session.default_ttl = {}", settings.session.default_ttl);
    println!("server.bind         = {}", settings.server.bind);
    println!(
        "routes.table_path   = {}",
        settings.routes.table_path.as_deref().unwrap_or("<builtin>")
    );
    println!();
    println!("Provenance:");
    for entry in settings.provenance.values() {
        println!("  {:<20} {:?}", entry.path, entry.source);
    }
    Ok(())
}
