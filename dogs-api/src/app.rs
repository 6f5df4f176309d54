use std::sync::Arc;

use anyhow::Result;
use axum::Json;
use kennel_axum::{axum, AxumApp};
use kennel_core::KennelApp;
use serde_json::{json, Value};

use crate::services::{self, dogs::dogs_shared, DogsParams};
use crate::store::DogStore;

async fn hello() -> Json<Value> {
    Json(json!({ "message": "Hello World!" }))
}

/// Wire hooks, the root route and the `dogs` service onto `app`.
pub fn dogs_app(
    app: KennelApp<Value, DogsParams>,
    store: Arc<dyn DogStore>,
) -> Result<AxumApp<Value, DogsParams>> {
    crate::hooks::global_hooks(&app);

    let ax = axum(app)
        .use_get("/", hello)
        .use_service("/dogs", services::dogs_service(store));

    dogs_shared::register_hooks(&ax.app)?;

    Ok(ax)
}
