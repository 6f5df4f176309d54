//! # Schema hooks
//!
//! - ResolveData: mutate ctx.data for write methods
//! - ValidateData: validate ctx.data for write methods
//!
//! Resolvers/validators take `&HookMeta` (immutable view) so they can run
//! while `ctx.data` is borrowed mutably.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::{
    HookContext, KennelBeforeHook, KennelConfigSnapshot, ServiceHooks, ServiceMethodKind,
};

/// Which write methods should a schema hook apply to?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMethods {
    Create,
    Patch,
    AllWrites,
}

impl WriteMethods {
    #[inline]
    pub fn matches(&self, method: ServiceMethodKind) -> bool {
        match self {
            WriteMethods::AllWrites => {
                matches!(method, ServiceMethodKind::Create | ServiceMethodKind::Patch)
            }
            WriteMethods::Create => method == ServiceMethodKind::Create,
            WriteMethods::Patch => method == ServiceMethodKind::Patch,
        }
    }
}

/// Immutable view of the hook context.
#[derive(Debug, Clone)]
pub struct HookMeta {
    pub service: String,
    pub method: ServiceMethodKind,
    pub id: Option<String>,
    pub config: KennelConfigSnapshot,
}

impl HookMeta {
    pub fn from_ctx<R, P>(ctx: &HookContext<R, P>) -> Self {
        Self {
            service: ctx.service.clone(),
            method: ctx.method,
            id: ctx.id.clone(),
            config: ctx.config.clone(),
        }
    }
}

pub type ValidateFn<R> = Arc<dyn Fn(&R, &HookMeta) -> Result<()> + Send + Sync + 'static>;

pub type ResolveFn<R> = Arc<dyn Fn(&mut R, &HookMeta) -> Result<()> + Send + Sync + 'static>;

/// Validate `ctx.data` for create/patch.
pub struct ValidateData<R> {
    methods: WriteMethods,
    validator: ValidateFn<R>,
}

impl<R> ValidateData<R> {
    pub fn new(validator: impl Fn(&R, &HookMeta) -> Result<()> + Send + Sync + 'static) -> Self {
        Self {
            methods: WriteMethods::AllWrites,
            validator: Arc::new(validator),
        }
    }

    pub fn with_methods(mut self, methods: WriteMethods) -> Self {
        self.methods = methods;
        self
    }
}

#[async_trait]
impl<R, P> KennelBeforeHook<R, P> for ValidateData<R>
where
    R: Send + Sync + 'static,
    P: Send + 'static,
{
    async fn run(&self, ctx: &mut HookContext<R, P>) -> Result<()> {
        if !self.methods.matches(ctx.method) {
            return Ok(());
        }

        let meta = HookMeta::from_ctx(ctx);

        let data = ctx
            .data
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("ValidateData requires ctx.data on write methods"))?;

        (self.validator)(data, &meta)
    }
}

/// Resolve/mutate `ctx.data` for create/patch.
pub struct ResolveData<R> {
    methods: WriteMethods,
    resolver: ResolveFn<R>,
}

impl<R> ResolveData<R> {
    pub fn new(resolver: impl Fn(&mut R, &HookMeta) -> Result<()> + Send + Sync + 'static) -> Self {
        Self {
            methods: WriteMethods::AllWrites,
            resolver: Arc::new(resolver),
        }
    }

    pub fn with_methods(mut self, methods: WriteMethods) -> Self {
        self.methods = methods;
        self
    }
}

#[async_trait]
impl<R, P> KennelBeforeHook<R, P> for ResolveData<R>
where
    R: Send + Sync + 'static,
    P: Send + 'static,
{
    async fn run(&self, ctx: &mut HookContext<R, P>) -> Result<()> {
        if !self.methods.matches(ctx.method) {
            return Ok(());
        }

        let meta = HookMeta::from_ctx(ctx);

        let data = ctx
            .data
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("ResolveData requires ctx.data on write methods"))?;

        (self.resolver)(data, &meta)
    }
}

/// Fluent builder used by `ServiceHooks::schema(...)`.
///
/// Each `validate`/`resolve` call registers a before hook, so they run in
/// the order they are declared.
pub struct SchemaBuilder<'a, R, P>
where
    R: Send + 'static,
    P: Send + 'static,
{
    hooks: &'a mut ServiceHooks<R, P>,
    current_methods: WriteMethods,
}

impl<'a, R, P> SchemaBuilder<'a, R, P>
where
    R: Send + Sync + 'static,
    P: Send + 'static,
{
    fn new(hooks: &'a mut ServiceHooks<R, P>) -> Self {
        Self {
            hooks,
            current_methods: WriteMethods::AllWrites,
        }
    }

    pub fn on_create(&mut self) -> &mut Self {
        self.current_methods = WriteMethods::Create;
        self
    }

    pub fn on_patch(&mut self) -> &mut Self {
        self.current_methods = WriteMethods::Patch;
        self
    }

    pub fn on_writes(&mut self) -> &mut Self {
        self.current_methods = WriteMethods::AllWrites;
        self
    }

    pub fn resolve(
        &mut self,
        f: impl Fn(&mut R, &HookMeta) -> Result<()> + Send + Sync + 'static,
    ) -> &mut Self {
        let hook = ResolveData::<R>::new(f).with_methods(self.current_methods);
        self.hooks.before_all(Arc::new(hook));
        self
    }

    pub fn validate(
        &mut self,
        f: impl Fn(&R, &HookMeta) -> Result<()> + Send + Sync + 'static,
    ) -> &mut Self {
        let hook = ValidateData::<R>::new(f).with_methods(self.current_methods);
        self.hooks.before_all(Arc::new(hook));
        self
    }
}

/// Extension method: `hooks.schema(|s| ...)`
pub trait SchemaHooksExt<R, P>
where
    R: Send + 'static,
    P: Send + 'static,
{
    fn schema<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut SchemaBuilder<'_, R, P>);
}

impl<R, P> SchemaHooksExt<R, P> for ServiceHooks<R, P>
where
    R: Send + Sync + 'static,
    P: Send + 'static,
{
    fn schema<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut SchemaBuilder<'_, R, P>),
    {
        let mut b = SchemaBuilder::new(self);
        f(&mut b);
        self
    }
}
