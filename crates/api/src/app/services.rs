//! Infrastructure wiring: store + token codec behind one handle.

use std::sync::Arc;

use campushub_auth::{Hs256Jwt, JwtValidator};
use campushub_infra::{MemoryStore, PostgresStore, Store, StoreError};

/// Shared services handle, injected into handlers as an extension.
pub struct AppServices {
    store: Arc<dyn Store>,
    jwt: Arc<Hs256Jwt>,
}

impl AppServices {
    pub fn new(store: Arc<dyn Store>, jwt_secret: &str) -> Self {
        Self {
            store,
            jwt: Arc::new(Hs256Jwt::new(jwt_secret.as_bytes())),
        }
    }

    /// In-memory store; used by tests and local development.
    pub fn in_memory(jwt_secret: &str) -> Self {
        Self::new(Arc::new(MemoryStore::new()), jwt_secret)
    }

    /// Connect to Postgres and apply pending migrations.
    pub async fn postgres(database_url: &str, jwt_secret: &str) -> Result<Self, StoreError> {
        let store = PostgresStore::connect(database_url).await?;
        store.migrate().await?;
        Ok(Self::new(Arc::new(store), jwt_secret))
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    /// Token codec for the login path.
    pub fn jwt(&self) -> &Hs256Jwt {
        &self.jwt
    }

    /// Validator handle for the auth middleware.
    pub fn validator(&self) -> Arc<dyn JwtValidator> {
        self.jwt.clone()
    }
}
