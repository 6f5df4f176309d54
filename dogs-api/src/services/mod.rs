use std::sync::Arc;

use kennel_core::KennelService;
use serde_json::Value;

use crate::store::DogStore;

pub mod dogs;
pub mod types;

pub use types::DogsParams;

pub fn dogs_service(store: Arc<dyn DogStore>) -> Arc<dyn KennelService<Value, DogsParams>> {
    Arc::new(dogs::DogsService::new(store))
}
