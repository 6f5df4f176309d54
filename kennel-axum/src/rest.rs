//! REST routes for one Kennel service.
//!
//! | method | path       | service call | success |
//! |--------|------------|--------------|---------|
//! | GET    | `/`        | `find`       | 200     |
//! | POST   | `/`        | `create`     | 201     |
//! | GET    | `/{id}`    | `get`        | 200     |
//! | PATCH  | `/{id}`    | `patch`      | 201     |
//! | DELETE | `/{id}`    | `remove`     | 200     |
//!
//! Only methods allowed by the service's capabilities are mounted; the rest
//! answer 405.
//!
//! Write bodies are read as JSON only when the request says it is JSON and
//! sends something; otherwise the body is an empty object. On PATCH the id
//! is checked before the body is looked at.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{OriginalUri, Path, Query, State},
    http::{header::CONTENT_TYPE, HeaderMap, Method, StatusCode},
    routing::MethodRouter,
    Json, Router,
};
use kennel_core::errors::KennelError;
use kennel_core::{KennelApp, ServiceCapabilities, ServiceMethodKind};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{
    params::{FromRestParams, RestParams},
    KennelAxumError, KennelAxumState,
};

/// Router state: the app plus the name of the service being served.
struct ServiceRoute<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    state: KennelAxumState<R, P>,
    name: Arc<str>,
}

impl<R, P> Clone for ServiceRoute<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            name: Arc::clone(&self.name),
        }
    }
}

pub fn success_status(method: ServiceMethodKind) -> StatusCode {
    match method {
        ServiceMethodKind::Create | ServiceMethodKind::Patch => StatusCode::CREATED,
        ServiceMethodKind::Find | ServiceMethodKind::Get | ServiceMethodKind::Remove => {
            StatusCode::OK
        }
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

/// Decode a write body; absent, blank or non-JSON bodies read as `{}`.
fn read_body<R: DeserializeOwned>(headers: &HeaderMap, body: &[u8]) -> Result<R, KennelAxumError> {
    let blank = body.iter().all(u8::is_ascii_whitespace);
    let raw: &[u8] = if blank || !is_json(headers) { b"{}" } else { body };

    serde_json::from_slice(raw).map_err(|e| {
        tracing::debug!(reason = %e, "rejected request body");
        KennelError::bad_request("Failed to parse the request body as JSON").into()
    })
}

fn rest_params<P: FromRestParams>(
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    method: Method,
    OriginalUri(uri): OriginalUri,
) -> P {
    P::from_rest_params(RestParams::from_parts(&headers, query, &method, &uri))
}

async fn find<R, P>(
    State(route): State<ServiceRoute<R, P>>,
    headers: HeaderMap,
    query: Query<HashMap<String, String>>,
    method: Method,
    uri: OriginalUri,
) -> Result<(StatusCode, Json<Vec<R>>), KennelAxumError>
where
    R: Serialize + DeserializeOwned + Send + Sync + 'static,
    P: FromRestParams + Send + Sync + Clone + 'static,
{
    let params: P = rest_params(headers, query, method, uri);
    let svc = route.state.app.service(&route.name)?;
    let res = svc.find(params).await?;
    Ok((success_status(ServiceMethodKind::Find), Json(res)))
}

async fn get<R, P>(
    State(route): State<ServiceRoute<R, P>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    query: Query<HashMap<String, String>>,
    method: Method,
    uri: OriginalUri,
) -> Result<(StatusCode, Json<R>), KennelAxumError>
where
    R: Serialize + DeserializeOwned + Send + Sync + 'static,
    P: FromRestParams + Send + Sync + Clone + 'static,
{
    let params: P = rest_params(headers, query, method, uri);
    let svc = route.state.app.service(&route.name)?;
    let res = svc.get(&id, params).await?;
    Ok((success_status(ServiceMethodKind::Get), Json(res)))
}

async fn create<R, P>(
    State(route): State<ServiceRoute<R, P>>,
    headers: HeaderMap,
    query: Query<HashMap<String, String>>,
    method: Method,
    uri: OriginalUri,
    body: Bytes,
) -> Result<(StatusCode, Json<R>), KennelAxumError>
where
    R: Serialize + DeserializeOwned + Send + Sync + 'static,
    P: FromRestParams + Send + Sync + Clone + 'static,
{
    let data: R = read_body(&headers, &body)?;
    let params: P = rest_params(headers, query, method, uri);
    let svc = route.state.app.service(&route.name)?;
    let res = svc.create(data, params).await?;
    Ok((success_status(ServiceMethodKind::Create), Json(res)))
}

async fn patch<R, P>(
    State(route): State<ServiceRoute<R, P>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    query: Query<HashMap<String, String>>,
    method: Method,
    uri: OriginalUri,
    body: Bytes,
) -> Result<(StatusCode, Json<R>), KennelAxumError>
where
    R: Serialize + DeserializeOwned + Send + Sync + 'static,
    P: FromRestParams + Send + Sync + Clone + 'static,
{
    let svc = route.state.app.service(&route.name)?;
    svc.parse_id(&id)?;
    let data: R = read_body(&headers, &body)?;
    let params: P = rest_params(headers, query, method, uri);
    let res = svc.patch(&id, data, params).await?;
    Ok((success_status(ServiceMethodKind::Patch), Json(res)))
}

async fn remove<R, P>(
    State(route): State<ServiceRoute<R, P>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    query: Query<HashMap<String, String>>,
    method: Method,
    uri: OriginalUri,
) -> Result<(StatusCode, Json<R>), KennelAxumError>
where
    R: Serialize + DeserializeOwned + Send + Sync + 'static,
    P: FromRestParams + Send + Sync + Clone + 'static,
{
    let params: P = rest_params(headers, query, method, uri);
    let svc = route.state.app.service(&route.name)?;
    let res = svc.remove(&id, params).await?;
    Ok((success_status(ServiceMethodKind::Remove), Json(res)))
}

/// Build the router for `service_name`, mounting only `capabilities`.
pub fn service_router<R, P>(
    service_name: &str,
    app: KennelApp<R, P>,
    capabilities: &ServiceCapabilities,
) -> Router<()>
where
    R: Serialize + DeserializeOwned + Send + Sync + 'static,
    P: FromRestParams + Send + Sync + Clone + 'static,
{
    use ServiceMethodKind::*;

    let route = ServiceRoute {
        state: KennelAxumState::new(app),
        name: Arc::from(service_name),
    };

    let mut collection: MethodRouter<ServiceRoute<R, P>> = MethodRouter::new();
    if capabilities.allows(Find) {
        collection = collection.get(find::<R, P>);
    }
    if capabilities.allows(Create) {
        collection = collection.post(create::<R, P>);
    }

    let mut item: MethodRouter<ServiceRoute<R, P>> = MethodRouter::new();
    if capabilities.allows(Get) {
        item = item.get(get::<R, P>);
    }
    if capabilities.allows(Patch) {
        item = item.patch(patch::<R, P>);
    }
    if capabilities.allows(Remove) {
        item = item.delete(remove::<R, P>);
    }

    Router::new()
        .route("/", collection)
        .route("/{id}", item)
        .with_state(route)
}
