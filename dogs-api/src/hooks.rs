use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;
use kennel_core::errors::KennelError;
use kennel_core::hooks::{HookContext, KennelAroundHook, KennelErrorHook, Next};
use kennel_core::KennelApp;
use serde_json::Value;

use crate::services::DogsParams;

pub struct LogAround;

#[async_trait]
impl KennelAroundHook<Value, DogsParams> for LogAround {
    async fn run(
        &self,
        ctx: &mut HookContext<Value, DogsParams>,
        next: Next<Value, DogsParams>,
    ) -> Result<()> {
        let started = Instant::now();
        let service = ctx.service.clone();
        let method = ctx.method.as_str();
        let request_id = ctx.params.request_id.clone().unwrap_or_default();

        tracing::debug!(%service, method, id = ?ctx.id, %request_id, "-> call");

        let res = next.run(ctx).await;

        tracing::info!(
            %service,
            method,
            %request_id,
            ok = res.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "<- call"
        );

        res
    }
}

/// Server faults at `error`, caller mistakes at `debug`.
pub struct LogErrors;

#[async_trait]
impl KennelErrorHook<Value, DogsParams> for LogErrors {
    async fn run(&self, ctx: &mut HookContext<Value, DogsParams>) -> Result<()> {
        let Some(err) = &ctx.error else {
            return Ok(());
        };

        let client_fault = KennelError::from_anyhow(err).is_some_and(|e| e.kind.is_client_error());
        if client_fault {
            tracing::debug!(service = %ctx.service, method = ctx.method.as_str(), error = %err, "rejected");
        } else {
            tracing::error!(service = %ctx.service, method = ctx.method.as_str(), error = ?err, "failed");
        }

        Ok(())
    }
}

pub fn global_hooks(app: &KennelApp<Value, DogsParams>) {
    app.hooks(|h| {
        h.around_all(Arc::new(LogAround));
        h.error_all(Arc::new(LogErrors));
    });
}
