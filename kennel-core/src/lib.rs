//! kennel-core: framework-agnostic core for Kennel services.

pub mod app;
pub mod config;
pub mod errors;
pub mod hooks;
pub mod registry;
pub mod schema;
pub mod service;

pub use app::{KennelApp, ServiceHandle};
pub use config::{KennelConfig, KennelConfigSnapshot};
pub use errors::{ErrorKind, KennelError};
pub use hooks::{
    HookContext, HookResult, KennelAfterHook, KennelAroundHook, KennelBeforeHook,
    KennelErrorHook, Next, ServiceHooks,
};
pub use registry::KennelServiceRegistry;
pub use service::{KennelService, ServiceCapabilities, ServiceMethodKind};
