use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use waymate_api::ids::TagGenerator;
use waymate_api::mailer::{HttpMailer, LogMailer, Mailer};
use waymate_api::routes::build_router;
use waymate_api::state::AppState;
use waymate_db::Database;
use waymate_storage::DiskStore;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

/// 10 MB media objects plus headroom handled at the router body limit.
const MAX_MEDIA_SIZE: usize = 10 * 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "waymate=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret = std::env::var("WAYMATE_JWT_SECRET").unwrap_or_default();
    if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
        eprintln!("FATAL: WAYMATE_JWT_SECRET is unset or still a placeholder.");
        eprintln!("       Set it in your .env file and restart.");
        std::process::exit(1);
    }

    let host = std::env::var("WAYMATE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("WAYMATE_PORT")
        .unwrap_or_else(|_| "5000".into())
        .parse()?;
    let db_path: PathBuf = std::env::var("WAYMATE_DB_PATH")
        .unwrap_or_else(|_| "waymate.db".into())
        .into();
    let media_dir: PathBuf = std::env::var("WAYMATE_MEDIA_DIR")
        .unwrap_or_else(|_| "./media-storage".into())
        .into();
    let media_base = std::env::var("WAYMATE_MEDIA_BASE_URL")
        .unwrap_or_else(|_| format!("http://localhost:{}/media", port));

    // Init DB and storage
    let db = Arc::new(Database::open(&db_path)?);
    let media = Arc::new(DiskStore::new(media_dir, media_base, MAX_MEDIA_SIZE).await?);

    // Outbound mail: HTTP API when configured, log-only otherwise
    let mailer: Arc<dyn Mailer> = match std::env::var("WAYMATE_MAIL_API_URL") {
        Ok(endpoint) => {
            let api_key = std::env::var("WAYMATE_MAIL_API_KEY").unwrap_or_default();
            let from = std::env::var("WAYMATE_MAIL_FROM")
                .unwrap_or_else(|_| "no-reply@waymate.app".into());
            info!("Mail dispatch via {}", endpoint);
            Arc::new(HttpMailer::new(endpoint, api_key, from))
        }
        Err(_) => {
            info!("No mail API configured, using log-only mailer");
            Arc::new(LogMailer)
        }
    };

    let state = AppState {
        db,
        media,
        mailer,
        tags: Arc::new(TagGenerator::new()),
        jwt_secret,
    };

    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Waymate server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
