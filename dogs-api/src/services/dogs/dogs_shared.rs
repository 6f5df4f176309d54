use kennel_core::{KennelApp, ServiceCapabilities};
use serde_json::Value;

use crate::services::DogsParams;

use super::dogs_schema;

pub const SERVICE_NAME: &str = "dogs";

pub fn crud_capabilities() -> ServiceCapabilities {
    ServiceCapabilities::standard_crud()
}

/// Body validation. Ids are checked earlier, by `DogsService::parse_id`.
pub fn register_hooks(app: &KennelApp<Value, DogsParams>) -> anyhow::Result<()> {
    app.service(SERVICE_NAME)?.hooks(dogs_schema::register);
    Ok(())
}
