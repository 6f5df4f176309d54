//! dogs-api: a small CRUD service for dogs on top of Kennel.

pub mod app;
pub mod config;
mod hooks;
pub mod model;
pub mod services;
pub mod store;

use std::sync::Arc;

use anyhow::Result;
use kennel_axum::AxumApp;
use kennel_core::KennelApp;
use serde_json::Value;

pub use config::Settings;

use crate::services::DogsParams;
use crate::store::DogStore;

/// Configure from `vars`, open the configured store and build the app.
pub async fn build<I>(vars: I) -> Result<AxumApp<Value, DogsParams>>
where
    I: IntoIterator<Item = (String, String)>,
{
    let app: KennelApp<Value, DogsParams> = KennelApp::new();
    let settings = config::load(&app, vars);
    let store = store::open(&settings.database_url).await?;
    app::dogs_app(app, store)
}

/// Build around an already opened store, with default configuration.
pub fn build_with_store(store: Arc<dyn DogStore>) -> Result<AxumApp<Value, DogsParams>> {
    let app: KennelApp<Value, DogsParams> = KennelApp::new();
    config::load(&app, Vec::new());
    app::dogs_app(app, store)
}
