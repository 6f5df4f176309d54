//! kennel-axum: Axum adapter for Kennel.
//!
//! Turns registered Kennel services into REST routers and translates
//! pipeline failures into HTTP responses.

pub mod app;
pub mod params;
pub mod rest;
pub mod state;
mod error;
pub use error::KennelAxumError;
pub use state::KennelAxumState;

pub use app::{axum, AxumApp};
