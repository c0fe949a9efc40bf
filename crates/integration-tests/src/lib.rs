//! Fixtures shared by the integration test targets: an in-memory SQLite
//! repository and a deliberately cheap Argon2 hasher.

use std::sync::Arc;

use ab_api::AppState;
use ab_db_sqlite::SqliteBoardRepo;
use ab_keys_argon2::Argon2KeyHasher;

pub async fn repo() -> Arc<SqliteBoardRepo> {
    Arc::new(
        SqliteBoardRepo::new("sqlite::memory:")
            .await
            .expect("in-memory sqlite"),
    )
}

/// Minimum Argon2 cost; the tests care about behaviour, not strength.
pub fn keys() -> Arc<Argon2KeyHasher> {
    Arc::new(Argon2KeyHasher::with_params(8, 1, 1).expect("argon2 params"))
}

pub async fn state() -> AppState {
    AppState::new(repo().await, keys())
}
