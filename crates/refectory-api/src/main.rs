//! Refectory server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, connects the campus SSO adapter, and serves the
//! dining API over HTTP.
//!
//! The token signing secret comes from `secret_key` in the config file or
//! the `REFECTORY_SECRET_KEY` environment variable; without one the server
//! falls back to a development key and logs a warning.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use clap::Parser;
use refectory_api::{AppState, ServerConfig, TokenService};
use refectory_sso::{CasClient, CasConfig};
use refectory_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Refectory dining API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("REFECTORY"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in the database path.
  let database_path = expand_tilde(&server_cfg.database_path);

  // Open SQLite store.
  let store = SqliteStore::open(&database_path)
    .await
    .with_context(|| format!("failed to open store at {database_path:?}"))?;

  // Campus SSO adapter.
  let sso = CasClient::new(CasConfig {
    base_url:    server_cfg.sso_base_url.clone(),
    service_url: server_cfg.sso_service_url.clone(),
    timeout:     Duration::from_secs(server_cfg.sso_timeout_secs),
  })
  .context("failed to build SSO client")?;

  // Token service; the secret is read once, here, and injected.
  let tokens = TokenService::new(
    server_cfg.secret_key.as_deref(),
    chrono::Duration::minutes(server_cfg.access_token_ttl_minutes),
    chrono::Duration::days(server_cfg.refresh_token_ttl_days),
  );

  let state = AppState::new(store, sso, tokens);
  let app = refectory_api::router(state);

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
