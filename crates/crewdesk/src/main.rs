//! Crewdesk - internal HR portal server

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::Config;
use crewdesk_api::{AppState, create_router};
use crewdesk_auth::{
    CookieOptions, PathPolicy, SessionGate, TokenCodec, generate_salt, hash_password,
};
use crewdesk_db::Database;
use crewdesk_db::models::{EmployeeStatus, NewEmployee};

/// Crewdesk - internal HR portal
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "CREWDESK_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "CREWDESK_PORT")]
    port: Option<u16>,

    /// Session token signing secret
    #[arg(long, env = "CREWDESK_TOKEN_SECRET", hide_env_values = true)]
    token_secret: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration, with CLI/env overrides on top
    let mut config = Config::load(&args.config)?;
    if let Some(secret) = args.token_secret {
        config.auth.token_secret = secret;
    }

    // Initialize logging
    init_logging(&config.logging.level);

    // A missing signing secret is fatal, never a silent fallback.
    config.validate()?;

    info!("Starting Crewdesk v{}", env!("CARGO_PKG_VERSION"));

    // Create the data directory
    if let Some(parent) = std::path::Path::new(&config.database.path).parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    // Initialize database
    let db_path = format!("sqlite:{}?mode=rwc", config.database.path);
    let db = Database::new(&db_path).await?;

    // Seed a default administrator account on first start
    if !db.has_employees().await? {
        info!("Creating default administrator account");
        let salt = generate_salt();
        let password_hash = hash_password("admin", &salt)?;
        let admin = db
            .insert_employee(NewEmployee {
                full_name: "Administrator".to_string(),
                email: "admin@crewdesk.local".to_string(),
                password_hash,
                salt,
                position: Some("Administrator".to_string()),
                department_id: None,
                hire_date: None,
                status: EmployeeStatus::Active,
                created_by: Some("seed".to_string()),
            })
            .await?;
        info!(
            "Default administrator created (employee ID {}, password: admin)",
            admin.employee_id
        );
        warn!("Change the default administrator password before exposing this server");
    }

    // Initialize the session token codec and gate
    let codec = Arc::new(TokenCodec::new(
        &config.auth.token_secret,
        config.auth.token_ttl_hours,
    ));
    let cookies = CookieOptions {
        secure: config.auth.secure_cookies,
        max_age_secs: codec.ttl_seconds(),
    };
    let gate = Arc::new(SessionGate::new(
        codec.clone(),
        PathPolicy::default(),
        cookies,
    ));

    // Create application state
    let state = AppState::new(
        db,
        codec,
        cookies,
        config.auth.register_secret.clone(),
        config.auth.dev_mode,
    );

    // Create router
    let app = create_router(state, gate).layer(TraceLayer::new_for_http());

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Shutdown signal received");
}
