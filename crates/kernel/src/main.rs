//! Dashgate server binary.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use dashgate_kernel::cli::{self, Cli, Command};
use dashgate_kernel::permissions::RoleRegistry;
use dashgate_kernel::{AppState, Config, routes, session};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command() {
        Command::Serve => {
            init_tracing();
            serve().await
        }
        Command::HashPassword { password } => {
            println!("{}", cli::hash_password_command(password)?);
            Ok(())
        }
        Command::CheckMenu { file } => {
            print!("{}", cli::check_menu_command(&file)?);
            Ok(())
        }
        Command::Roles => {
            print!("{}", cli::describe_roles(RoleRegistry::builtin()));
            Ok(())
        }
    }
}

async fn serve() -> Result<()> {
    info!("Starting dashgate");

    let config = Config::from_env().context("failed to load configuration")?;
    info!(port = config.port, "Configuration loaded");

    let state = AppState::new(&config)
        .await
        .context("failed to initialize application state")?;

    // Middleware layers (last added = first executed in request flow):
    // TraceLayer → session → track_requests → enforce_access → routes
    let app = match &config.redis_url {
        Some(url) => {
            let layer = session::create_redis_session_layer(url, &config)
                .await
                .context("failed to create session layer")?;
            info!("Sessions stored in Redis");
            routes::router(&state).layer(layer)
        }
        None => {
            info!("REDIS_URL not set; sessions stored in memory");
            routes::router(&state).layer(session::create_memory_session_layer(&config))
        }
    }
    .layer(TraceLayer::new_for_http())
    .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    info!(%addr, "Server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
