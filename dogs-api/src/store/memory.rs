use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use super::DogStore;
use crate::model::{Dog, DogPatch, NewDog};

#[derive(Debug, Default)]
struct Table {
    last_id: i64,
    rows: BTreeMap<i64, Dog>,
}

/// Process-local store. Ids count up from 1 and are never reused.
#[derive(Debug, Default)]
pub struct MemoryDogStore {
    table: RwLock<Table>,
}

impl MemoryDogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DogStore for MemoryDogStore {
    async fn find_all(&self) -> Result<Vec<Dog>> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Dog>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn create(&self, dog: NewDog) -> Result<Dog> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        let dog = dog.into_dog(table.last_id);
        table.rows.insert(dog.id, dog.clone());
        Ok(dog)
    }

    async fn update_by_id(&self, id: i64, patch: DogPatch) -> Result<Option<Dog>> {
        let mut table = self.table.write().await;
        Ok(table.rows.get_mut(&id).map(|dog| {
            patch.apply(dog);
            dog.clone()
        }))
    }

    async fn delete_by_id(&self, id: i64) -> Result<Option<Dog>> {
        Ok(self.table.write().await.rows.remove(&id))
    }
}
