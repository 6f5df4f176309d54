use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use kennel_core::errors::KennelError;
use kennel_core::{KennelService, ServiceCapabilities};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::model::{Dog, DogPatch, NewDog};
use crate::services::DogsParams;
use crate::store::DogStore;

use super::dogs_schema::INVALID_DOG;
use super::dogs_shared;

pub const ID_NOT_A_NUMBER: &str = "id should be a number";

/// The `dogs` service: validated JSON in, store call, dog JSON out.
///
/// Bodies arrive already checked by the schema hooks; ids arrive
/// canonicalised by `parse_id`.
pub struct DogsService {
    store: Arc<dyn DogStore>,
}

impl DogsService {
    pub fn new(store: Arc<dyn DogStore>) -> Self {
        Self { store }
    }
}

fn missing(id: &str) -> anyhow::Error {
    KennelError::not_found(format!("No dog found for id '{id}'")).into_anyhow()
}

/// Read a path id the way a loose numeric cast would.
///
/// `Ok(Some(n))` for whole numbers (`"7"`, `"7.0"`, `"7e0"`), `Ok(None)` for
/// numbers no dog can have (`"1.5"`, `"1e30"`, `"Infinity"`), and a 400 for
/// anything that is not a number at all.
pub fn read_dog_id(raw: &str) -> Result<Option<i64>> {
    let raw = raw.trim();
    if let Ok(id) = raw.parse::<i64>() {
        return Ok(Some(id));
    }

    // Rust also reads "inf", "infinity" and "nan" in any case; only the
    // exact `Infinity` spelling counts as a number here.
    let infinity = matches!(raw, "Infinity" | "+Infinity" | "-Infinity");
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() || (n.is_infinite() && infinity) => {
            let whole = n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64;
            Ok(whole.then_some(n as i64))
        }
        _ => Err(KennelError::bad_request(ID_NOT_A_NUMBER).into_anyhow()),
    }
}

/// Only whole ids can name a dog; anything else is simply absent.
fn dog_id(id: &str) -> Result<i64> {
    id.parse::<i64>().map_err(|_| missing(id))
}

fn to_record(dog: &Dog) -> Result<Value> {
    Ok(serde_json::to_value(dog)?)
}

fn from_record<T: DeserializeOwned>(data: Value) -> Result<T> {
    serde_json::from_value(data).map_err(|e| {
        KennelError::bad_request(INVALID_DOG)
            .with_errors([e.to_string()])
            .into_anyhow()
    })
}

#[async_trait]
impl KennelService<Value, DogsParams> for DogsService {
    fn capabilities(&self) -> ServiceCapabilities {
        dogs_shared::crud_capabilities()
    }

    fn parse_id(&self, id: &str) -> Result<String> {
        Ok(match read_dog_id(id)? {
            Some(n) => n.to_string(),
            None => id.to_string(),
        })
    }

    async fn find(&self, _params: DogsParams) -> Result<Vec<Value>> {
        self.store.find_all().await?.iter().map(to_record).collect()
    }

    async fn get(&self, id: &str, _params: DogsParams) -> Result<Value> {
        let dog = self
            .store
            .find_by_id(dog_id(id)?)
            .await?
            .ok_or_else(|| missing(id))?;
        to_record(&dog)
    }

    async fn create(&self, data: Value, _params: DogsParams) -> Result<Value> {
        let new_dog: NewDog = from_record(data)?;
        let dog = self.store.create(new_dog).await?;
        tracing::info!(id = dog.id, "dog created");
        to_record(&dog)
    }

    async fn patch(&self, id: &str, data: Value, _params: DogsParams) -> Result<Value> {
        let key = dog_id(id)?;
        let patch: DogPatch = from_record(data)?;
        let dog = self
            .store
            .update_by_id(key, patch)
            .await?
            .ok_or_else(|| missing(id))?;
        to_record(&dog)
    }

    async fn remove(&self, id: &str, _params: DogsParams) -> Result<Value> {
        let dog = self
            .store
            .delete_by_id(dog_id(id)?)
            .await?
            .ok_or_else(|| missing(id))?;
        tracing::info!(id = dog.id, "dog removed");
        to_record(&dog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_numbers_are_ids() {
        assert_eq!(read_dog_id("7").unwrap(), Some(7));
        assert_eq!(read_dog_id("7.0").unwrap(), Some(7));
        assert_eq!(read_dog_id("7e0").unwrap(), Some(7));
        assert_eq!(read_dog_id("-2").unwrap(), Some(-2));
    }

    #[test]
    fn numbers_without_a_dog_are_not_errors() {
        assert_eq!(read_dog_id("1.5").unwrap(), None);
        assert_eq!(read_dog_id("1e30").unwrap(), None);
        assert_eq!(read_dog_id("Infinity").unwrap(), None);
        assert_eq!(read_dog_id("-Infinity").unwrap(), None);
    }

    #[test]
    fn non_numbers_are_bad_requests() {
        for raw in ["abc", "12abc", "NaN", "", "inf", "infinity", "INF", "-inf", "nan"] {
            let err = read_dog_id(raw).unwrap_err();
            let kennel = KennelError::from_anyhow(&err).unwrap();
            assert_eq!(kennel.code(), 400, "{raw}");
            assert_eq!(kennel.message, ID_NOT_A_NUMBER);
        }
    }
}
