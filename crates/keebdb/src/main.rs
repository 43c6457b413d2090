use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use listenfd::ListenFd;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use keebdb::{
    app::create_app,
    config::Config,
    state::AppState,
    storage::{dynamodb::create_client, DynamoDbStore, InMemoryStore, Provisioned, TableGateway},
};
use keebdb_core::storage::TableStore;
use keebdb_core::Keyboard;

/// Where keyboards are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StorageBackend {
    /// DynamoDB (or DynamoDB Local when AWS_ENDPOINT_URL is set)
    Dynamodb,
    /// Process memory, lost on exit
    Memory,
}

/// keebdb - A keyboard catalog served from a DynamoDB table
#[derive(Parser, Debug)]
#[command(name = "keebdb")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Host address to bind the server to
    #[arg(long, short = 'H', default_value = "0.0.0.0", env = "HOST")]
    host: String,

    /// Port to listen on
    #[arg(long, short, default_value = "3000", env = "PORT")]
    port: u16,

    /// Storage backend
    #[arg(long, value_enum, default_value_t = StorageBackend::Dynamodb, env = "KEEBDB_STORAGE")]
    storage: StorageBackend,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keebdb=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    let store: Arc<dyn TableStore> = match cli.storage {
        StorageBackend::Dynamodb => {
            tracing::info!(endpoint = %config.aws.target_display(), "Using DynamoDB storage");
            Arc::new(DynamoDbStore::new(create_client(&config.aws).await))
        }
        StorageBackend::Memory => {
            tracing::info!("Using in-memory storage");
            Arc::new(InMemoryStore::new())
        }
    };

    let gateway = TableGateway::new(store, config.table_definition())
        .with_wait(config.provision_timeout(), config.provision_poll_interval());

    match gateway
        .ensure_table()
        .await
        .with_context(|| format!("Failed to provision table '{}'", config.table_name))?
    {
        Provisioned::Created(_) => {
            tracing::info!(table = %config.table_name, "Table created");
        }
        Provisioned::AlreadyPresent(descriptor) => {
            tracing::info!(
                table = %config.table_name,
                item_count = ?descriptor.item_count,
                "Table already exists"
            );
        }
    }

    match gateway.scan::<Keyboard>().await {
        Ok(keyboards) => tracing::info!(count = keyboards.len(), "Keyboards in catalog"),
        Err(e) => tracing::warn!(error = %e, "Startup scan failed"),
    }

    let app = create_app(AppState::new(gateway));

    // Auto-reload support via listenfd
    let mut listenfd = ListenFd::from_env();
    let listener = match listenfd.take_tcp_listener(0)? {
        Some(listener) => {
            listener.set_nonblocking(true)?;
            TcpListener::from_std(listener)?
        }
        None => {
            let addr = format!("{}:{}", cli.host, cli.port);
            TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {addr}"))?
        }
    };

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Wait for shutdown signals (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
