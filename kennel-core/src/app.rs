use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use anyhow::Result;

use crate::hooks::MethodHooks;
use crate::{
    HookContext, HookResult, KennelConfig, KennelConfigSnapshot, KennelService,
    KennelServiceRegistry, Next, ServiceHooks, ServiceMethodKind,
};

struct KennelAppInner<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    registry: RwLock<KennelServiceRegistry<R, P>>,
    global_hooks: RwLock<ServiceHooks<R, P>>,
    service_hooks: RwLock<HashMap<String, ServiceHooks<R, P>>>,
    config: RwLock<KennelConfig>,
}

/// KennelApp is the central application container.
///
/// Framework-agnostic. Holds:
/// - service registry
/// - app hooks
/// - per-service hooks
/// - config
///
/// Cloning is cheap; clones share the same registry.
pub struct KennelApp<R, P = ()>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    inner: Arc<KennelAppInner<R, P>>,
}

impl<R, P> Default for KennelApp<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R, P> Clone for KennelApp<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R, P> KennelApp<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(KennelAppInner {
                registry: RwLock::new(KennelServiceRegistry::new()),
                global_hooks: RwLock::new(ServiceHooks::new()),
                service_hooks: RwLock::new(HashMap::new()),
                config: RwLock::new(KennelConfig::new()),
            }),
        }
    }

    pub fn register_service<S>(&self, name: S, service: Arc<dyn KennelService<R, P>>)
    where
        S: Into<String>,
    {
        self.inner
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register(name, service);
    }

    /// App-wide hooks, run before any service hooks.
    pub fn hooks<F>(&self, f: F)
    where
        F: FnOnce(&mut ServiceHooks<R, P>),
    {
        let mut g = self
            .inner
            .global_hooks
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut g);
    }

    pub(crate) fn configure_service_hooks<F>(&self, service_name: &str, f: F)
    where
        F: FnOnce(&mut ServiceHooks<R, P>),
    {
        let mut map = self
            .inner
            .service_hooks
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let hooks = map.entry(service_name.to_string()).or_default();
        f(hooks);
    }

    /// Look up a registered service; calls through the handle run hooks.
    pub fn service(&self, name: &str) -> Result<ServiceHandle<R, P>> {
        let svc = self
            .inner
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("KennelService not found: {name}"))?;

        Ok(ServiceHandle {
            app: self.clone(),
            name: name.to_string(),
            service: svc,
        })
    }

    pub fn set<K, V>(&self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.inner
            .config
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set(key, value);
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let cfg = self
            .inner
            .config
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        cfg.get(key).map(|v| v.to_string())
    }

    /// Layer `(key, value)` pairs whose key starts with `prefix` over the
    /// current config.
    pub fn load_vars<I>(&self, prefix: &str, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.inner
            .config
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .load_vars(prefix, vars);
    }

    pub fn config_snapshot(&self) -> KennelConfigSnapshot {
        self.inner
            .config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot()
    }
}

pub struct ServiceHandle<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    app: KennelApp<R, P>,
    name: String,
    service: Arc<dyn KennelService<R, P>>,
}

impl<R, P> ServiceHandle<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    /// Register hooks for this service only.
    pub fn hooks<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut ServiceHooks<R, P>),
    {
        self.app.configure_service_hooks(&self.name, f);
        self
    }
}

// ──────────────────────────────────────────────────────────────
// Pipeline
// ──────────────────────────────────────────────────────────────

/// Call the service method named by `ctx.method` and store its result.
async fn dispatch<R, P>(svc: &dyn KennelService<R, P>, ctx: &mut HookContext<R, P>) -> Result<()>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    let method = ctx.method;
    let params = ctx.params.clone();
    let id = ctx.id.clone();
    let require_id = || id.clone().ok_or_else(|| anyhow::anyhow!("{}() requires an id", method.as_str()));

    let result = match method {
        ServiceMethodKind::Find => HookResult::Many(svc.find(params).await?),
        ServiceMethodKind::Get => HookResult::One(svc.get(&require_id()?, params).await?),
        ServiceMethodKind::Create => {
            let data = ctx
                .data
                .take()
                .ok_or_else(|| anyhow::anyhow!("create() requires ctx.data"))?;
            HookResult::One(svc.create(data, params).await?)
        }
        ServiceMethodKind::Patch => {
            let id = require_id()?;
            let data = ctx
                .data
                .take()
                .ok_or_else(|| anyhow::anyhow!("patch() requires ctx.data"))?;
            HookResult::One(svc.patch(&id, data, params).await?)
        }
        ServiceMethodKind::Remove => HookResult::One(svc.remove(&require_id()?, params).await?),
    };

    ctx.result = Some(result);
    Ok(())
}

impl<R, P> ServiceHandle<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    fn collect_hooks(&self, method: ServiceMethodKind) -> MethodHooks<R, P> {
        let g = self
            .app
            .inner
            .global_hooks
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let map = self
            .app
            .inner
            .service_hooks
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        MethodHooks::collect(&g, map.get(&self.name), method)
    }

    /// around → before → service call → after; error hooks on failure.
    async fn run_pipeline(&self, mut ctx: HookContext<R, P>) -> Result<HookContext<R, P>> {
        let MethodHooks {
            around,
            before,
            after,
            error,
        } = self.collect_hooks(ctx.method);

        let svc = Arc::clone(&self.service);

        let mut next: Next<R, P> = Next::new(move |ctx| {
            Box::pin(async move {
                for h in &before {
                    h.run(ctx).await?;
                }

                dispatch(svc.as_ref(), ctx).await?;

                for h in after.iter().rev() {
                    h.run(ctx).await?;
                }

                Ok(())
            })
        });

        // first registered around hook ends up outermost
        for hook in around.into_iter().rev() {
            let prev = next;
            next = Next::new(move |ctx| Box::pin(async move { hook.run(ctx, prev).await }));
        }

        if let Err(e) = next.run(&mut ctx).await {
            ctx.error = Some(e);

            for h in &error {
                let _ = h.run(&mut ctx).await;
            }

            if let Some(err) = ctx.error.take() {
                return Err(err);
            }
        }

        Ok(ctx)
    }

    fn context(&self, method: ServiceMethodKind, params: P) -> HookContext<R, P> {
        HookContext::new(self.name.clone(), method, params, self.app.config_snapshot())
    }

    pub async fn find(&self, params: P) -> Result<Vec<R>> {
        let ctx = self.context(ServiceMethodKind::Find, params);
        let ctx = self.run_pipeline(ctx).await?;

        match ctx.result {
            Some(HookResult::Many(v)) => Ok(v),
            Some(HookResult::One(_)) => Err(anyhow::anyhow!(
                "find() produced HookResult::One unexpectedly"
            )),
            None => Ok(vec![]),
        }
    }

    /// The service's canonical form of `id`, or its rejection.
    pub fn parse_id(&self, id: &str) -> Result<String> {
        self.service.parse_id(id)
    }

    pub async fn get(&self, id: &str, params: P) -> Result<R> {
        let id = self.parse_id(id)?;
        let ctx = self.context(ServiceMethodKind::Get, params).with_id(id);
        one(self.run_pipeline(ctx).await?, "get")
    }

    pub async fn create(&self, data: R, params: P) -> Result<R> {
        let ctx = self.context(ServiceMethodKind::Create, params).with_data(data);
        one(self.run_pipeline(ctx).await?, "create")
    }

    pub async fn patch(&self, id: &str, data: R, params: P) -> Result<R> {
        let id = self.parse_id(id)?;
        let ctx = self
            .context(ServiceMethodKind::Patch, params)
            .with_id(id)
            .with_data(data);
        one(self.run_pipeline(ctx).await?, "patch")
    }

    pub async fn remove(&self, id: &str, params: P) -> Result<R> {
        let id = self.parse_id(id)?;
        let ctx = self.context(ServiceMethodKind::Remove, params).with_id(id);
        one(self.run_pipeline(ctx).await?, "remove")
    }
}

fn one<R, P>(ctx: HookContext<R, P>, method: &str) -> Result<R> {
    match ctx.result {
        Some(HookResult::One(v)) => Ok(v),
        Some(HookResult::Many(_)) => Err(anyhow::anyhow!(
            "{method}() produced HookResult::Many unexpectedly"
        )),
        None => Err(anyhow::anyhow!("{method}() produced no result")),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::errors::KennelError;
    use crate::{KennelAfterHook, KennelAroundHook, KennelBeforeHook, KennelErrorHook};

    type Trace = Arc<Mutex<Vec<String>>>;

    struct Echo {
        trace: Trace,
    }

    #[async_trait]
    impl KennelService<String, ()> for Echo {
        fn parse_id(&self, id: &str) -> Result<String> {
            match id.trim() {
                "" | "bad" => Err(KennelError::bad_request("id is malformed").into_anyhow()),
                id => Ok(id.to_string()),
            }
        }

        async fn get(&self, id: &str, _params: ()) -> Result<String> {
            self.trace.lock().unwrap().push("service".to_string());
            if id == "missing" {
                return Err(KennelError::not_found("no such record").into_anyhow());
            }
            Ok(format!("record {id}"))
        }

        async fn create(&self, data: String, _params: ()) -> Result<String> {
            Ok(data)
        }
    }

    struct Mark(&'static str, Trace);

    #[async_trait]
    impl KennelBeforeHook<String, ()> for Mark {
        async fn run(&self, _ctx: &mut HookContext<String, ()>) -> Result<()> {
            self.1.lock().unwrap().push(self.0.to_string());
            Ok(())
        }
    }

    #[async_trait]
    impl KennelAfterHook<String, ()> for Mark {
        async fn run(&self, _ctx: &mut HookContext<String, ()>) -> Result<()> {
            self.1.lock().unwrap().push(self.0.to_string());
            Ok(())
        }
    }

    #[async_trait]
    impl KennelAroundHook<String, ()> for Mark {
        async fn run(&self, ctx: &mut HookContext<String, ()>, next: Next<String, ()>) -> Result<()> {
            self.1.lock().unwrap().push(format!("{}:in", self.0));
            let res = next.run(ctx).await;
            self.1.lock().unwrap().push(format!("{}:out", self.0));
            res
        }
    }

    struct Recover;

    #[async_trait]
    impl KennelErrorHook<String, ()> for Recover {
        async fn run(&self, ctx: &mut HookContext<String, ()>) -> Result<()> {
            let not_found = ctx
                .error
                .as_ref()
                .and_then(KennelError::from_anyhow)
                .is_some_and(|e| e.code() == 404);
            if not_found {
                ctx.error = None;
                ctx.result = Some(HookResult::One("fallback".to_string()));
            }
            Ok(())
        }
    }

    fn app_with_trace() -> (KennelApp<String, ()>, Trace) {
        let trace: Trace = Arc::new(Mutex::new(Vec::new()));
        let app: KennelApp<String, ()> = KennelApp::new();
        app.register_service("echo", Arc::new(Echo { trace: Arc::clone(&trace) }));
        (app, trace)
    }

    #[tokio::test]
    async fn hooks_run_in_pipeline_order() {
        let (app, trace) = app_with_trace();

        app.hooks(|h| {
            h.around_all(Arc::new(Mark("around-1", Arc::clone(&trace))));
            h.around_all(Arc::new(Mark("around-2", Arc::clone(&trace))));
            h.before_all(Arc::new(Mark("before-global", Arc::clone(&trace))));
            h.after_all(Arc::new(Mark("after-1", Arc::clone(&trace))));
        });
        let echo = app
            .service("echo")
            .unwrap()
            .hooks(|h| {
                h.before(ServiceMethodKind::Get, Arc::new(Mark("before-service", Arc::clone(&trace))));
                h.after_all(Arc::new(Mark("after-2", Arc::clone(&trace))));
            });

        let out = echo.get("7", ()).await.unwrap();
        assert_eq!(out, "record 7");

        assert_eq!(
            *trace.lock().unwrap(),
            vec![
                "around-1:in",
                "around-2:in",
                "before-global",
                "before-service",
                "service",
                "after-2",
                "after-1",
                "around-2:out",
                "around-1:out",
            ]
        );
    }

    #[tokio::test]
    async fn method_scoped_hooks_skip_other_methods() {
        let (app, trace) = app_with_trace();
        let echo = app.service("echo").unwrap().hooks(|h| {
            h.before(
                ServiceMethodKind::Create,
                Arc::new(Mark("before-create", Arc::clone(&trace))),
            );
        });

        echo.get("1", ()).await.unwrap();
        assert_eq!(*trace.lock().unwrap(), vec!["service"]);
    }

    #[tokio::test]
    async fn ids_are_checked_before_any_hook() {
        let (app, trace) = app_with_trace();
        app.hooks(|h| {
            h.around_all(Arc::new(Mark("around", Arc::clone(&trace))));
            h.before_all(Arc::new(Mark("before", Arc::clone(&trace))));
        });
        let echo = app.service("echo").unwrap();

        let err = echo.get("bad", ()).await.unwrap_err();
        assert_eq!(KennelError::from_anyhow(&err).unwrap().code(), 400);
        assert!(trace.lock().unwrap().is_empty());

        assert_eq!(echo.get(" 7 ", ()).await.unwrap(), "record 7");
    }

    #[tokio::test]
    async fn error_hooks_can_recover() {
        let (app, _trace) = app_with_trace();
        let echo = app.service("echo").unwrap();

        let err = echo.get("missing", ()).await.unwrap_err();
        assert_eq!(KennelError::from_anyhow(&err).unwrap().code(), 404);

        app.hooks(|h| {
            h.error_all(Arc::new(Recover));
        });
        assert_eq!(echo.get("missing", ()).await.unwrap(), "fallback");
    }

    #[tokio::test]
    async fn unimplemented_methods_report_501() {
        let (app, _trace) = app_with_trace();
        let err = app.service("echo").unwrap().find(()).await.unwrap_err();
        assert_eq!(KennelError::from_anyhow(&err).unwrap().code(), 501);
    }

    #[tokio::test]
    async fn unknown_service_is_an_error() {
        let app: KennelApp<String, ()> = KennelApp::new();
        assert!(app.service("nope").is_err());
    }

    #[test]
    fn config_round_trips_through_the_app() {
        let app: KennelApp<String, ()> = KennelApp::new();
        app.set("http.port", "3001");
        assert_eq!(app.get("http.port").as_deref(), Some("3001"));
        assert_eq!(app.config_snapshot().get_u16("http.port"), Some(3001));
    }
}
