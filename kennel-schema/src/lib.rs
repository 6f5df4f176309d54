//! Flat record schemas: an allowed-key set where every key has a runtime
//! type, plus coercion for loosely typed writes.
//!
//! Checks never stop at the first violation; every message is collected in
//! an [`ErrorList`] and reported together.

use kennel_core::errors::KennelError;
use serde_json::{Map, Number, Value};

/// Runtime JSON type of a schema field. `Number` fields hold whole numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Number,
    String,
}

impl FieldKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Number => "number",
            FieldKind::String => "string",
        }
    }

    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldKind::Number => value.as_number().and_then(whole_number).is_some(),
            FieldKind::String => value.is_string(),
        }
    }

    /// Loosely convert `value` into this kind.
    ///
    /// `None` when the value has no whole-number reading; fractions are
    /// rejected, never rounded.
    pub fn coerce(&self, value: &Value) -> Option<Value> {
        match self {
            FieldKind::Number => coerce_number(value).map(|n| Value::Number(Number::from(n))),
            FieldKind::String => Some(Value::String(coerce_string(value))),
        }
    }
}

fn whole(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64)
        .then_some(f as i64)
}

fn whole_number(n: &Number) -> Option<i64> {
    n.as_i64().or_else(|| n.as_f64().and_then(whole))
}

fn coerce_number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => whole_number(n),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Some(0);
            }
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole))
        }
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Null => Some(0),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Accumulated validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorList {
    messages: Vec<String>,
}

impl ErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, msg: impl Into<String>) {
        self.messages.push(msg.into());
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// A 400 `KennelError` carrying every message.
    pub fn into_bad_request(self, message: &str) -> anyhow::Error {
        KennelError::bad_request(message)
            .with_errors(self.messages)
            .into_anyhow()
    }

    /// `Ok` when nothing was collected, otherwise the 400 error.
    pub fn into_result(self, message: &str) -> anyhow::Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.into_bad_request(message))
        }
    }
}

/// Ordered set of `(field, kind)` pairs.
#[derive(Debug, Clone, Default)]
pub struct RecordSchema {
    fields: Vec<(&'static str, FieldKind)>,
}

impl RecordSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.fields.push((name, kind));
        self
    }

    pub fn kind_of(&self, key: &str) -> Option<FieldKind> {
        self.fields
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, kind)| *kind)
    }

    /// `'<key>' is not a valid key` for every key outside the schema.
    pub fn unknown_keys(&self, obj: &Map<String, Value>) -> ErrorList {
        let mut errors = ErrorList::new();
        for key in obj.keys() {
            if self.kind_of(key).is_none() {
                errors.push(format!("'{key}' is not a valid key"));
            }
        }
        errors
    }

    /// `<field> should be a <type>` for every schema field that is missing
    /// or holds the wrong JSON type.
    pub fn type_errors(&self, obj: &Map<String, Value>) -> ErrorList {
        let mut errors = ErrorList::new();
        for (name, kind) in &self.fields {
            let ok = obj.get(*name).is_some_and(|v| kind.matches(v));
            if !ok {
                errors.push(format!("{name} should be a {}", kind.type_name()));
            }
        }
        errors
    }

    /// Coerce every present schema field; unknown keys are dropped.
    pub fn coerce(&self, obj: &Map<String, Value>) -> Result<Map<String, Value>, ErrorList> {
        let mut out = Map::new();
        let mut errors = ErrorList::new();

        for (name, kind) in &self.fields {
            let Some(value) = obj.get(*name) else {
                continue;
            };
            match kind.coerce(value) {
                Some(v) => {
                    out.insert((*name).to_string(), v);
                }
                None => errors.push(format!("{name} should be a {}", kind.type_name())),
            }
        }

        if errors.is_empty() {
            Ok(out)
        } else {
            Err(errors)
        }
    }
}

/// Borrow `data` as a JSON object or fail with a 400.
pub fn require_object<'a>(data: &'a Value, message: &str) -> anyhow::Result<&'a Map<String, Value>> {
    data.as_object().ok_or_else(|| {
        let mut errors = ErrorList::new();
        errors.push("request body must be a JSON object");
        errors.into_bad_request(message)
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn dog_schema() -> RecordSchema {
        RecordSchema::new()
            .field("age", FieldKind::Number)
            .field("name", FieldKind::String)
            .field("description", FieldKind::String)
            .field("breed", FieldKind::String)
    }

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn unknown_keys_are_all_reported() {
        let errors = dog_schema().unknown_keys(&obj(json!({"foo": 1, "name": "Rex", "bar": 2})));
        assert_eq!(
            errors.messages(),
            ["'foo' is not a valid key", "'bar' is not a valid key"]
        );
    }

    #[test]
    fn type_errors_cover_missing_and_mistyped_fields() {
        let errors = dog_schema().type_errors(&obj(json!({"age": "three", "name": "Rex", "breed": 4})));
        assert_eq!(
            errors.messages(),
            [
                "age should be a number",
                "description should be a string",
                "breed should be a string",
            ]
        );
    }

    #[test]
    fn valid_record_has_no_errors() {
        let data = obj(json!({"age": 3, "name": "Rex", "description": "friendly", "breed": "lab"}));
        assert!(dog_schema().unknown_keys(&data).is_empty());
        assert!(dog_schema().type_errors(&data).is_empty());
    }

    #[test]
    fn coerce_converts_loose_values() {
        let out = dog_schema()
            .coerce(&obj(json!({"age": "5", "name": 12, "breed": true})))
            .unwrap();
        assert_eq!(Value::Object(out), json!({"age": 5, "name": "12", "breed": "true"}));
    }

    #[test]
    fn fractions_are_not_numbers() {
        assert!(!FieldKind::Number.matches(&json!(3.5)));
        assert!(FieldKind::Number.matches(&json!(3.0)));
        assert_eq!(FieldKind::Number.coerce(&json!(4.6)), None);
        assert_eq!(FieldKind::Number.coerce(&json!("4.5")), None);

        let errors = dog_schema().type_errors(&obj(json!({
            "age": 3.5, "name": "Rex", "description": "friendly", "breed": "lab"
        })));
        assert_eq!(errors.messages(), ["age should be a number"]);
    }

    #[test]
    fn coerce_reads_blank_as_zero() {
        assert_eq!(FieldKind::Number.coerce(&json!(4.0)), Some(json!(4)));
        assert_eq!(FieldKind::Number.coerce(&json!("  ")), Some(json!(0)));
        assert_eq!(FieldKind::Number.coerce(&json!(null)), Some(json!(0)));
        assert_eq!(FieldKind::String.coerce(&json!(null)), Some(json!("null")));
    }

    #[test]
    fn coerce_reports_values_without_a_number_reading() {
        let errors = dog_schema()
            .coerce(&obj(json!({"age": "old", "name": "Rex"})))
            .unwrap_err();
        assert_eq!(errors.messages(), ["age should be a number"]);
        assert_eq!(FieldKind::Number.coerce(&json!([1])), None);
    }

    #[test]
    fn error_list_becomes_bad_request() {
        let mut errors = ErrorList::new();
        errors.push("age should be a number");
        let err = errors.into_result("invalid dog").unwrap_err();
        let kennel = KennelError::from_anyhow(&err).unwrap();
        assert_eq!(kennel.code(), 400);
        assert_eq!(kennel.errors, vec!["age should be a number".to_string()]);
    }

    #[test]
    fn non_objects_are_rejected() {
        let err = require_object(&json!([1, 2]), "invalid dog").unwrap_err();
        assert_eq!(KennelError::from_anyhow(&err).unwrap().code(), 400);
        assert!(require_object(&json!({}), "invalid dog").is_ok());
    }
}
