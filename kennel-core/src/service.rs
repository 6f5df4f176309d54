use anyhow::Result;
use async_trait::async_trait;

use crate::errors::KennelError;

/// Standard service methods: find, get, create, patch, remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceMethodKind {
    Find,
    Get,
    Create,
    Patch,
    Remove,
}

impl ServiceMethodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceMethodKind::Find => "find",
            ServiceMethodKind::Get => "get",
            ServiceMethodKind::Create => "create",
            ServiceMethodKind::Patch => "patch",
            ServiceMethodKind::Remove => "remove",
        }
    }

    /// Methods addressed at a single record by id.
    pub fn takes_id(&self) -> bool {
        matches!(
            self,
            ServiceMethodKind::Get | ServiceMethodKind::Patch | ServiceMethodKind::Remove
        )
    }
}

/// Capabilities describe which methods a service wants to expose
/// to the outside world.
///
/// Adapters (like kennel-axum) use this to mount only allowed routes.
#[derive(Debug, Clone)]
pub struct ServiceCapabilities {
    pub allowed_methods: Vec<ServiceMethodKind>,
}

impl ServiceCapabilities {
    /// Full CRUD: find, get, create, patch, remove.
    pub fn standard_crud() -> Self {
        use ServiceMethodKind::*;
        Self {
            allowed_methods: vec![Find, Get, Create, Patch, Remove],
        }
    }

    pub fn allows(&self, method: ServiceMethodKind) -> bool {
        self.allowed_methods.contains(&method)
    }
}

/// Core Kennel service trait:
///
/// - `find`   → list many
/// - `get`    → fetch one by id
/// - `create` → create one
/// - `patch`  → partial update by id
/// - `remove` → delete one by id
///
/// Every method defaults to a `NotImplemented` error, so a service
/// overrides only what it actually supports.
#[async_trait]
pub trait KennelService<R, P = ()>: Send + Sync
where
    R: Send + 'static,
    P: Send + 'static,
{
    /// Which methods adapters may expose for this service.
    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::standard_crud()
    }

    /// Check a record id and return its canonical form.
    ///
    /// Runs before any hook or body handling for get, patch and remove, so a
    /// malformed id is always the first thing reported.
    fn parse_id(&self, id: &str) -> Result<String> {
        Ok(id.to_string())
    }

    async fn find(&self, _params: P) -> Result<Vec<R>> {
        Err(KennelError::not_implemented("Method not implemented: find").into_anyhow())
    }

    async fn get(&self, _id: &str, _params: P) -> Result<R> {
        Err(KennelError::not_implemented("Method not implemented: get").into_anyhow())
    }

    async fn create(&self, _data: R, _params: P) -> Result<R> {
        Err(KennelError::not_implemented("Method not implemented: create").into_anyhow())
    }

    /// Partially update an existing record; fields absent from `data`
    /// keep their stored values.
    async fn patch(&self, _id: &str, _data: R, _params: P) -> Result<R> {
        Err(KennelError::not_implemented("Method not implemented: patch").into_anyhow())
    }

    /// Remove an existing record, returning what was removed.
    async fn remove(&self, _id: &str, _params: P) -> Result<R> {
        Err(KennelError::not_implemented("Method not implemented: remove").into_anyhow())
    }
}
