//! Body rules for dog writes.
//!
//! create: unknown keys → field types (age must be whole)
//! patch:  unknown keys → non-empty body → coercion
//!
//! Each stage reports every violation it finds as `{errors: [...]}`.

use std::sync::Arc;

use kennel_core::schema::SchemaHooksExt;
use kennel_core::ServiceHooks;
use kennel_schema::{require_object, ErrorList, FieldKind, RecordSchema};
use serde_json::Value;

use crate::services::DogsParams;

pub const INVALID_DOG: &str = "Invalid dog";
pub const EMPTY_BODY: &str = "request body cannot be empty";

pub fn dog_schema() -> RecordSchema {
    RecordSchema::new()
        .field("age", FieldKind::Number)
        .field("name", FieldKind::String)
        .field("description", FieldKind::String)
        .field("breed", FieldKind::String)
}

pub fn register(hooks: &mut ServiceHooks<Value, DogsParams>) {
    let schema = Arc::new(dog_schema());

    hooks.schema(|s| {
        let keys = Arc::clone(&schema);
        s.on_writes().validate(move |data, _meta| {
            let obj = require_object(data, INVALID_DOG)?;
            keys.unknown_keys(obj).into_result(INVALID_DOG)
        });

        let types = Arc::clone(&schema);
        s.on_create().validate(move |data, _meta| {
            let obj = require_object(data, INVALID_DOG)?;
            types.type_errors(obj).into_result(INVALID_DOG)
        });

        s.on_patch().validate(|data, _meta| {
            let mut errors = ErrorList::new();
            if require_object(data, INVALID_DOG)?.is_empty() {
                errors.push(EMPTY_BODY);
            }
            errors.into_result(INVALID_DOG)
        });

        let coerce = Arc::clone(&schema);
        s.on_patch().resolve(move |data, _meta| {
            let obj = require_object(data, INVALID_DOG)?;
            let coerced = coerce
                .coerce(obj)
                .map_err(|errors| errors.into_bad_request(INVALID_DOG))?;
            *data = Value::Object(coerced);
            Ok(())
        });
    });
}
