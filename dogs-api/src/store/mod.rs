//! Dog persistence.
//!
//! Handlers only see [`DogStore`]; which backend sits behind it is decided
//! once at startup by [`open`].

mod memory;
mod sqlite;

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::model::{Dog, DogPatch, NewDog};

pub use memory::MemoryDogStore;
pub use sqlite::SqliteDogStore;

/// `DATABASE_URL` value that selects [`MemoryDogStore`].
pub const MEMORY_URL: &str = "memory";

#[async_trait]
pub trait DogStore: Send + Sync {
    /// Every dog, in store order.
    async fn find_all(&self) -> Result<Vec<Dog>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Dog>>;

    /// Insert and return the row with its assigned id.
    async fn create(&self, dog: NewDog) -> Result<Dog>;

    /// Apply the supplied fields; `None` when no row has `id`.
    async fn update_by_id(&self, id: i64, patch: DogPatch) -> Result<Option<Dog>>;

    /// Delete and return the row as it was; `None` when no row has `id`.
    async fn delete_by_id(&self, id: i64) -> Result<Option<Dog>>;
}

/// Open the store named by `url`: [`MEMORY_URL`] or an sqlx SQLite URL.
pub async fn open(url: &str) -> Result<Arc<dyn DogStore>> {
    if url == MEMORY_URL {
        tracing::info!("using in-memory dog store");
        return Ok(Arc::new(MemoryDogStore::new()));
    }

    let store = SqliteDogStore::connect(url)
        .await
        .with_context(|| format!("failed to open dog store at {url}"))?;
    tracing::info!(url, "connected to sqlite dog store");
    Ok(Arc::new(store))
}
