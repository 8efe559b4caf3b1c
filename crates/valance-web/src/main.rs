//! valance-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) plus `VALANCE_*`
//! environment variables, opens the SQLite database and serves the contact
//! intake endpoint and admin console over HTTP.
//!
//! # Admin password
//!
//! `admin_password_hash` holds an argon2 PHC string. Generate one with:
//!
//! ```
//! cargo run -p valance-web --bin valance-server -- --hash-password
//! ```

use std::{
  net::SocketAddr,
  path::{Path, PathBuf},
};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use rand_core::OsRng;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use valance_store_sqlite::SqliteDatabase;
use valance_web::{AppState, MAX_SESSION_TTL_MINUTES, ServerConfig};

#[derive(Parser)]
#[command(author, version, about = "Valance contact intake and admin server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,

  /// Insert two sample submissions if the database is empty.
  #[arg(long)]
  seed_sample_data: bool,

  /// Report on the database schema and a test insert, then exit.
  #[arg(long)]
  check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.hash_password {
    let password = read_password()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("VALANCE"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);

  if cli.check {
    return check(&store_path).await;
  }

  if server_cfg.admin_password_hash.is_empty() {
    anyhow::bail!("admin_password_hash is not set; generate one with --hash-password");
  }
  if server_cfg.session_ttl().is_none() {
    anyhow::bail!(
      "session_ttl_minutes must be between 1 and {MAX_SESSION_TTL_MINUTES}, got {}",
      server_cfg.session_ttl_minutes
    );
  }

  let db = SqliteDatabase::open(&store_path)
    .await
    .with_context(|| format!("failed to open database at {store_path:?}"))?;

  if cli.seed_sample_data {
    let inserted = db
      .seed_sample_data()
      .await
      .context("failed to seed sample data")?;
    tracing::info!(inserted, "seeded sample submissions");
  }

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let state = AppState::new(db, server_cfg).context("invalid server configuration")?;
  let app = valance_web::router(state);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
    .await
    .context("server error")?;

  Ok(())
}

async fn check(store_path: &Path) -> anyhow::Result<()> {
  let report = SqliteDatabase::new(store_path)
    .check()
    .await
    .with_context(|| format!("failed to inspect database at {store_path:?}"))?;

  println!("database: {}", store_path.display());
  for table in &report.present_tables {
    println!("  ok       {table}");
  }
  for table in &report.missing_tables {
    println!("  missing  {table}");
  }
  match &report.test_insert_error {
    None => println!("  test insert succeeded (rolled back)"),
    Some(e) => println!("  test insert failed: {e}"),
  }

  if !report.is_healthy() {
    anyhow::bail!("database is not ready; run the server once to create the schema");
  }
  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_owned())
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
