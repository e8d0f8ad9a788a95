use std::{net::SocketAddr, path::Path, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, auth};
use service::auth::repo::json::JsonAccountRepository;
use service::auth::service::{AuthConfig, AuthService};
use service::catalog::CarCatalog;
use service::contact::ContactLog;
use service::uploads::UploadStore;

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let cfg = configs::AppConfig::load_and_validate()?;
    common::env::ensure_env(&cfg.storage.data_dir, &cfg.storage.upload_dir).await?;

    let data_dir = Path::new(&cfg.storage.data_dir);
    let uploads = UploadStore::new(&cfg.storage.upload_dir);
    let catalog = CarCatalog::new(data_dir.join("cars.json"), uploads.clone()).await?;
    let accounts_repo = JsonAccountRepository::new(data_dir.join("users.json")).await?;
    let contacts = ContactLog::new(data_dir.join("contacts.json")).await?;

    let jwt_secret = if cfg.auth.jwt_secret.trim().is_empty() {
        "dev-secret-change-me".to_string()
    } else {
        cfg.auth.jwt_secret.clone()
    };
    let accounts = Arc::new(AuthService::new(
        accounts_repo,
        AuthConfig { jwt_secret: Some(jwt_secret.clone()) },
    ));

    let state = auth::ServerState {
        catalog,
        accounts,
        contacts,
        uploads,
        auth: auth::ServerAuthConfig { jwt_secret },
    };

    let cors = build_cors();
    let app: Router = routes::build_router(cors, state);

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, "starting car listing server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
