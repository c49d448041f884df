use std::net::SocketAddr;

use anyhow::{Context, Result};
use campus_gate::{AppContext, SessionSeed};
use clap::Args;
use tracing::{info, warn};

#[derive(Args, Clone, Debug)]
pub struct ServeArgs {
    /// Address to bind (defaults to server.bind from settings)
    #[arg(long)]
    pub bind: Option<SocketAddr>,

    /// Pre-load a session, TOKEN=SUBJECT:ROLE (repeatable; development only)
    #[arg(long = "seed-session", value_name = "TOKEN=SUBJECT:ROLE")]
    pub seed_sessions: Vec<SessionSeed>,

    /// Log every gate decision as a JSON line
    #[arg(long)]
    pub audit: bool,
}

pub async fn cmd_serve(args: ServeArgs, ctx: &AppContext) -> Result<()> {
    let addr = match args.bind {
        Some(addr) => addr,
        None => ctx.settings().bind_addr().context("invalid server.bind")?,
    };

    let seeded = ctx
        .seed_sessions(&args.seed_sessions)
        .context("failed to seed sessions")?;
    if !seeded.is_empty() {
        warn!(
            count = seeded.len(),
            "seeded sessions accept their tokens as-is; do not use outside development"
        );
    }

    let redirects = ctx.settings().redirects();
    info!(
        sign_in = %redirects.sign_in,
        landing = %redirects.landing,
        cookie = %ctx.settings().session.cookie_name,
        "route gate configured"
    );

    campus_gate::server::serve(ctx, addr, args.audit).await
}
