//! Hooks run around, before, after, or on the error of a service call.
//!
//! Pipeline order for one call:
//! around (first registered is outermost) → before → service → after
//! (reverse registration order) → error hooks if anything failed.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::{KennelConfigSnapshot, ServiceMethodKind};

/// What the service call produced.
#[derive(Debug, Clone, PartialEq)]
pub enum HookResult<R> {
    One(R),
    Many(Vec<R>),
}

/// Context passed to hooks.
///
/// R = record type
/// P = params type
#[derive(Debug)]
pub struct HookContext<R, P> {
    pub service: String,
    pub method: ServiceMethodKind,
    pub id: Option<String>,
    pub params: P,
    /// Input payload for create/patch.
    pub data: Option<R>,
    /// Output, set by the service call, visible to after hooks.
    pub result: Option<HookResult<R>>,
    /// Failure, visible to error hooks. Clearing it recovers the call.
    pub error: Option<anyhow::Error>,
    pub config: KennelConfigSnapshot,
}

impl<R, P> HookContext<R, P> {
    pub fn new(
        service: impl Into<String>,
        method: ServiceMethodKind,
        params: P,
        config: KennelConfigSnapshot,
    ) -> Self {
        Self {
            service: service.into(),
            method,
            id: None,
            params,
            data: None,
            result: None,
            error: None,
            config,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_data(mut self, data: R) -> Self {
        self.data = Some(data);
        self
    }
}

pub type HookFut<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

type NextFn<R, P> = Box<dyn for<'a> FnOnce(&'a mut HookContext<R, P>) -> HookFut<'a> + Send>;

/// The rest of the pipeline, handed to around hooks.
pub struct Next<R, P> {
    call: NextFn<R, P>,
}

impl<R, P> Next<R, P> {
    pub fn new<F>(call: F) -> Self
    where
        F: for<'a> FnOnce(&'a mut HookContext<R, P>) -> HookFut<'a> + Send + 'static,
    {
        Self {
            call: Box::new(call),
        }
    }

    pub async fn run(self, ctx: &mut HookContext<R, P>) -> Result<()> {
        (self.call)(ctx).await
    }
}

#[async_trait]
pub trait KennelAroundHook<R, P>: Send + Sync
where
    R: Send + 'static,
    P: Send + 'static,
{
    async fn run(&self, ctx: &mut HookContext<R, P>, next: Next<R, P>) -> Result<()>;
}

#[async_trait]
pub trait KennelBeforeHook<R, P>: Send + Sync
where
    R: Send + 'static,
    P: Send + 'static,
{
    async fn run(&self, ctx: &mut HookContext<R, P>) -> Result<()>;
}

#[async_trait]
pub trait KennelAfterHook<R, P>: Send + Sync
where
    R: Send + 'static,
    P: Send + 'static,
{
    async fn run(&self, ctx: &mut HookContext<R, P>) -> Result<()>;
}

#[async_trait]
pub trait KennelErrorHook<R, P>: Send + Sync
where
    R: Send + 'static,
    P: Send + 'static,
{
    async fn run(&self, ctx: &mut HookContext<R, P>) -> Result<()>;
}

/// Hook registrations for the whole app or for one service.
pub struct ServiceHooks<R, P>
where
    R: Send + 'static,
    P: Send + 'static,
{
    around: Vec<(Option<ServiceMethodKind>, Arc<dyn KennelAroundHook<R, P>>)>,
    before: Vec<(Option<ServiceMethodKind>, Arc<dyn KennelBeforeHook<R, P>>)>,
    after: Vec<(Option<ServiceMethodKind>, Arc<dyn KennelAfterHook<R, P>>)>,
    error: Vec<(Option<ServiceMethodKind>, Arc<dyn KennelErrorHook<R, P>>)>,
}

impl<R, P> Default for ServiceHooks<R, P>
where
    R: Send + 'static,
    P: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R, P> ServiceHooks<R, P>
where
    R: Send + 'static,
    P: Send + 'static,
{
    pub fn new() -> Self {
        Self {
            around: Vec::new(),
            before: Vec::new(),
            after: Vec::new(),
            error: Vec::new(),
        }
    }

    pub fn around_all(&mut self, hook: Arc<dyn KennelAroundHook<R, P>>) -> &mut Self {
        self.around.push((None, hook));
        self
    }

    pub fn before_all(&mut self, hook: Arc<dyn KennelBeforeHook<R, P>>) -> &mut Self {
        self.before.push((None, hook));
        self
    }

    pub fn before(
        &mut self,
        method: ServiceMethodKind,
        hook: Arc<dyn KennelBeforeHook<R, P>>,
    ) -> &mut Self {
        self.before.push((Some(method), hook));
        self
    }

    pub fn after_all(&mut self, hook: Arc<dyn KennelAfterHook<R, P>>) -> &mut Self {
        self.after.push((None, hook));
        self
    }

    pub fn error_all(&mut self, hook: Arc<dyn KennelErrorHook<R, P>>) -> &mut Self {
        self.error.push((None, hook));
        self
    }
}

/// Hooks scoped to `method`, or to every method (`None`), in registration order.
fn for_method<H: ?Sized>(
    hooks: &[(Option<ServiceMethodKind>, Arc<H>)],
    method: ServiceMethodKind,
) -> Vec<Arc<H>> {
    hooks
        .iter()
        .filter(|(scope, _)| scope.map_or(true, |m| m == method))
        .map(|(_, h)| Arc::clone(h))
        .collect()
}

/// Hooks that apply to one method, global ones first.
pub(crate) struct MethodHooks<R, P>
where
    R: Send + 'static,
    P: Send + 'static,
{
    pub around: Vec<Arc<dyn KennelAroundHook<R, P>>>,
    pub before: Vec<Arc<dyn KennelBeforeHook<R, P>>>,
    pub after: Vec<Arc<dyn KennelAfterHook<R, P>>>,
    pub error: Vec<Arc<dyn KennelErrorHook<R, P>>>,
}

impl<R, P> MethodHooks<R, P>
where
    R: Send + 'static,
    P: Send + 'static,
{
    pub(crate) fn collect(
        global: &ServiceHooks<R, P>,
        service: Option<&ServiceHooks<R, P>>,
        method: ServiceMethodKind,
    ) -> Self {
        let mut out = Self {
            around: for_method(&global.around, method),
            before: for_method(&global.before, method),
            after: for_method(&global.after, method),
            error: for_method(&global.error, method),
        };

        if let Some(s) = service {
            out.around.extend(for_method(&s.around, method));
            out.before.extend(for_method(&s.before, method));
            out.after.extend(for_method(&s.after, method));
            out.error.extend(for_method(&s.error, method));
        }

        out
    }
}
