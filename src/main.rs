//! Todo Service
//!
//! Serves a todo list over HTTP, backed by either process memory or `SQLite`.
//!
//! # Environment Variables
//!
//! - `STORAGE_MODE`: `in_memory` (default) | `sqlite`
//! - `DATABASE_URL`: `SQLite` connection URL (default `sqlite://todo.db?mode=rwc`)
//! - `TEMPLATE_PATH`: HTML page template (default: compiled-in template)
//! - `RUST_LOG`: Logging level (e.g., `debug`, `info`, `todo_service=debug`)
//! - `HOST`: Server host address (default: `0.0.0.0`)
//! - `PORT`: Server port (default: `8080`)
//! - `WORKER_THREADS`: Number of tokio worker threads (default: logical CPU count)

use std::env;
use std::future::Future;
use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_service::api::{AppState, HtmlTemplate, router};
use todo_service::infrastructure::RepositoryFactory;

/// Result of parsing `WORKER_THREADS` environment variable.
struct WorkerThreadsResult {
    threads: Option<usize>,
    warning_emitted: bool,
}

fn parse_worker_threads() -> WorkerThreadsResult {
    let Ok(value) = env::var("WORKER_THREADS") else {
        return WorkerThreadsResult {
            threads: None,
            warning_emitted: false,
        };
    };

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return WorkerThreadsResult {
            threads: None,
            warning_emitted: false,
        };
    }

    match trimmed.parse::<usize>() {
        Ok(0) => {
            eprintln!("Warning: WORKER_THREADS=0 is invalid (must be > 0), using default");
            WorkerThreadsResult {
                threads: None,
                warning_emitted: true,
            }
        }
        Ok(n) => {
            let max_threads = std::thread::available_parallelism()
                .map(|parallelism| parallelism.get().saturating_mul(4))
                .unwrap_or(64);
            if n > max_threads {
                eprintln!(
                    "Warning: WORKER_THREADS={n} exceeds recommended limit ({max_threads}), capping to {max_threads}"
                );
                WorkerThreadsResult {
                    threads: Some(max_threads),
                    warning_emitted: true,
                }
            } else {
                WorkerThreadsResult {
                    threads: Some(n),
                    warning_emitted: false,
                }
            }
        }
        Err(error) => {
            eprintln!(
                "Warning: WORKER_THREADS='{trimmed}' is not a valid number ({error}), using default"
            );
            WorkerThreadsResult {
                threads: None,
                warning_emitted: true,
            }
        }
    }
}

fn main() {
    dotenvy::dotenv().ok();

    let result = parse_worker_threads();
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();

    if let Some(threads) = result.threads {
        builder.worker_threads(threads);
        if !result.warning_emitted {
            eprintln!("Tokio worker_threads set to: {threads}");
        }
    }

    let runtime = match builder.build() {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("Failed to create tokio runtime: {error}");
            std::process::exit(1);
        }
    };
    runtime.block_on(async_main());
}

async fn async_main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Todo Service");

    let factory = match RepositoryFactory::from_env() {
        Ok(factory) => factory,
        Err(error) => {
            tracing::error!("{}", error);
            std::process::exit(1);
        }
    };

    tracing::info!(
        storage_mode = ?factory.config().storage_mode,
        "Repository configuration loaded"
    );

    let repositories = match factory.create().await {
        Ok(repositories) => {
            tracing::info!("Repositories initialized successfully");
            repositories
        }
        Err(error) => {
            tracing::error!("Failed to initialize repositories: {}", error);
            std::process::exit(1);
        }
    };

    let template = match env::var("TEMPLATE_PATH") {
        Ok(path) if !path.trim().is_empty() => match HtmlTemplate::from_file(path.trim()) {
            Ok(template) => {
                tracing::info!(path = %path.trim(), "Page template loaded");
                template
            }
            Err(error) => {
                tracing::error!(%error, "Failed to load page template");
                std::process::exit(1);
            }
        },
        _ => HtmlTemplate::default(),
    };

    let application_state = AppState::from_repositories(repositories, template);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let application = router(application_state).layer(cors);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(8080);

    let address: SocketAddr = match format!("{host}:{port}").parse() {
        Ok(address) => address,
        Err(error) => {
            tracing::error!(%error, "Invalid server address: {}:{}", host, port);
            std::process::exit(1);
        }
    };

    let listener = match TcpListener::bind(address).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, "Failed to bind to address {}", address);
            std::process::exit(1);
        }
    };

    match listener.local_addr() {
        Ok(address) => tracing::info!("Listening on {}", address),
        Err(error) => tracing::warn!(%error, "Could not determine local address"),
    }

    if let Err(error) = axum::serve(listener, application)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(%error, "Server error");
        std::process::exit(1);
    }

    tracing::info!("Server shutdown complete");
}

/// Completes when SIGINT (Ctrl+C) or, on Unix, SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = signal_or_pending(signal::ctrl_c(), "Ctrl+C");

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

/// Resolves when `signal` fires. A handler that failed to install never fires.
async fn signal_or_pending(signal: impl Future<Output = std::io::Result<()>>, name: &str) {
    if let Err(error) = signal.await {
        tracing::warn!(%error, "Failed to install {} handler", name);
        std::future::pending::<()>().await;
    }
}
