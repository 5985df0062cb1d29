use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use sealbox_api::auth::{self, AppState, AppStateInner};
use sealbox_api::entries;
use sealbox_api::middleware::require_session;
use sealbox_engine::{IntegrityEngine, TamperPolicy};
use sealbox_session::SessionManager;

const DEFAULT_SESSION_SECRET: &str = "default-insecure-secret-change-me";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sealbox=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let production = std::env::var("SEALBOX_ENV").is_ok_and(|v| v == "production");
    let session_secret = match std::env::var("SESSION_SECRET") {
        Ok(secret) => secret,
        Err(_) => {
            if production {
                anyhow::bail!("SESSION_SECRET must be set when SEALBOX_ENV=production");
            }
            warn!("SESSION_SECRET not set; using the insecure development default");
            DEFAULT_SESSION_SECRET.to_string()
        }
    };
    let db_path = std::env::var("SEALBOX_DB_PATH").unwrap_or_else(|_| "sealbox.db".into());
    let host = std::env::var("SEALBOX_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("SEALBOX_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    let tamper_policy = match std::env::var("TAMPER_POLICY").as_deref() {
        Ok("secret") => {
            let key = std::env::var("TAMPER_SECRET_KEY").map_err(|_| {
                anyhow::anyhow!("TAMPER_POLICY=secret requires TAMPER_SECRET_KEY")
            })?;
            TamperPolicy::SharedSecret(key)
        }
        Ok("admin") | Err(_) => TamperPolicy::AdminRole,
        Ok(other) => anyhow::bail!("unknown TAMPER_POLICY '{}'", other),
    };

    // Init database
    let db = Arc::new(sealbox_db::Database::open(&PathBuf::from(&db_path))?);

    // Shared state
    let state: AppState = Arc::new(AppStateInner {
        db: db.clone(),
        engine: IntegrityEngine::new(db, tamper_policy),
        sessions: SessionManager::new(session_secret),
        secure_cookies: production,
    });

    // Routes
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/entries", get(entries::list_entries).post(entries::create_entry))
        .route("/entries/{id}", get(entries::get_entry).delete(entries::delete_entry))
        .route("/entries/{id}/verify", post(entries::verify_entry))
        .route("/entries/{id}/tamper", post(entries::tamper_entry))
        .layer(middleware::from_fn_with_state(state.clone(), require_session))
        .with_state(state);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Sealbox server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
