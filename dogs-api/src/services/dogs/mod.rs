pub mod dogs_schema;
pub mod dogs_service;
pub mod dogs_shared;

pub use dogs_service::DogsService;
