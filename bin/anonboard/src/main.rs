//! # anonboard Binary
//!
//! The entry point: load settings, open storage, serve, then close storage.

use std::sync::Arc;
use std::time::Duration;

use ab_api::AppState;
use ab_config::Settings;
use ab_db_sqlite::SqliteBoardRepo;
use ab_keys_argon2::Argon2KeyHasher;
use actix_web::{web, HttpServer};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    env_logger::init_from_env(env_logger::Env::default().default_filter_or(&settings.log.level));
    log::debug!("settings: {settings:?}");

    // 1. Initialize Database Implementation
    let repo = Arc::new(
        SqliteBoardRepo::connect(
            &settings.database.url,
            settings.database.max_connections,
            Duration::from_secs(settings.database.acquire_timeout_secs),
        )
        .await?,
    );

    // 2. Initialize Delete-Key Hashing
    let keys = Arc::new(Argon2KeyHasher::with_params(
        settings.keys.memory_kib,
        settings.keys.iterations,
        settings.keys.parallelism,
    )?);

    // 3. Wrap in AppState behind the core trait objects
    let state = web::Data::new(AppState::new(repo.clone(), keys));

    let (host, port) = settings.bind_address();
    let public_dir = settings.server.public_dir.clone();
    log::info!("anonboard starting on http://{host}:{port}");

    HttpServer::new(move || ab_api::build_app(state.clone(), &public_dir))
        .bind((host.as_str(), port))?
        .run()
        .await?;

    repo.close().await;
    log::info!("anonboard stopped");
    Ok(())
}
