use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use console::config::Config;
use console::format::{format_datetime, format_status};
use console::session::Session;
use console::state::ConsoleState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Layer1 console v{}", env!("CARGO_PKG_VERSION"));
    info!("REST base: {}", config.rest_base());

    let session = Session::from_env();
    if session.token().is_none() {
        warn!("no ACCESS_TOKEN set; running unauthenticated (no realtime channel)");
    }

    let state = ConsoleState::new(config, session);

    if !state.session.pro_member() {
        match state.subscription.usage().await {
            Ok(usage) => info!(
                "match quota: {}/{} used, {} remaining",
                usage.used, usage.limit, usage.remaining
            ),
            Err(err) => warn!("usage lookup failed: {err}"),
        }
    }

    match state.resumes.list(&state.session).await {
        Ok(rows) => {
            info!("{} resume(s) on file", rows.len());
            for row in &rows {
                info!(
                    "  {} [{}] updated {}",
                    row.filename.as_deref().unwrap_or(&row.id),
                    format_status(row.status.as_str()),
                    format_datetime(Some(&row.updated_at)),
                );
            }
        }
        Err(err) => warn!("resume list failed: {err}"),
    }

    let watchers = state.start();
    info!("watchers running for resumes, jobs and matches");

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    state.shutdown();
    for watcher in watchers {
        let _ = watcher.await;
    }

    Ok(())
}
