//! # Errors
//!
//! Kennel carries failures as `anyhow::Error` through the hook pipeline and
//! keeps the structured part in a [`KennelError`] that adapters downcast at
//! the edge.
//!
//! - every error has a kind with a fixed HTTP status
//! - a single message, or a list of messages when several violations co-occur
//! - transport-agnostic (the server crate decides how to serialize)

use std::fmt;

use anyhow::Error as AnyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,     // 400
    NotFound,       // 404
    GeneralError,   // 500
    NotImplemented, // 501
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::GeneralError => 500,
            ErrorKind::NotImplemented => 501,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::GeneralError => "GeneralError",
            ErrorKind::NotImplemented => "NotImplemented",
        }
    }

    /// True for failures caused by the caller rather than the server.
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

/// A structured Kennel error that can live inside `anyhow::Error`.
#[derive(Debug)]
pub struct KennelError {
    pub kind: ErrorKind,
    pub message: String,
    pub errors: Vec<String>,
    pub source: Option<AnyError>,
}

impl KennelError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            errors: Vec::new(),
            source: None,
        }
    }

    pub fn with_errors<I, S>(mut self, errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.errors = errors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_source(mut self, source: AnyError) -> Self {
        self.source = Some(source);
        self
    }

    pub fn code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Convert into `anyhow::Error` so it flows through the hook pipeline.
    pub fn into_anyhow(self) -> AnyError {
        AnyError::new(self)
    }

    /// Find a `KennelError` anywhere in an `anyhow::Error` chain.
    pub fn from_anyhow(err: &AnyError) -> Option<&KennelError> {
        err.chain().find_map(|e| e.downcast_ref::<KennelError>())
    }

    /// Turn any error into a KennelError:
    /// - if it's already a KennelError, keep it
    /// - otherwise wrap as GeneralError
    pub fn normalize(err: AnyError) -> KennelError {
        match err.downcast::<KennelError>() {
            Ok(kennel) => kennel,
            Err(other) => match Self::from_anyhow(&other) {
                Some(inner) => inner.sanitize_for_client(),
                None => KennelError::new(ErrorKind::GeneralError, other.to_string()).with_source(other),
            },
        }
    }

    /// Copy without the inner `source`, suitable for returning to clients.
    pub fn sanitize_for_client(&self) -> KennelError {
        KennelError {
            kind: self.kind,
            message: self.message.clone(),
            errors: self.errors.clone(),
            source: None,
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, msg)
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, msg)
    }
    pub fn general_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::GeneralError, msg)
    }
    pub fn not_implemented(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotImplemented, msg)
    }
}

impl fmt::Display for KennelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.code(), self.message)?;
        if !self.errors.is_empty() {
            write!(f, " [{}]", self.errors.join("; "))?;
        }
        Ok(())
    }
}

impl std::error::Error for KennelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

#[cfg(feature = "serde")]
impl KennelError {
    /// Client payload: `{"errors": [...]}` when a list is attached,
    /// otherwise `{"message": "..."}`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;

        if self.errors.is_empty() {
            json!({ "message": self.message })
        } else {
            json!({ "errors": self.errors })
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Context;

    use super::*;

    #[test]
    fn normalize_keeps_kennel_errors() {
        let err = KennelError::bad_request("id should be a number").into_anyhow();
        let normalized = KennelError::normalize(err);
        assert_eq!(normalized.kind, ErrorKind::BadRequest);
        assert_eq!(normalized.message, "id should be a number");
    }

    #[test]
    fn normalize_finds_kennel_errors_behind_context() {
        let err = Err::<(), _>(KennelError::not_found("gone").into_anyhow())
            .context("loading dog")
            .unwrap_err();
        assert_eq!(KennelError::normalize(err).kind, ErrorKind::NotFound);
    }

    #[test]
    fn foreign_errors_become_general_errors() {
        let normalized = KennelError::normalize(anyhow::anyhow!("disk on fire"));
        assert_eq!(normalized.kind, ErrorKind::GeneralError);
        assert_eq!(normalized.code(), 500);
        assert!(normalized.message.contains("disk on fire"));
        assert!(normalized.sanitize_for_client().source.is_none());
    }

    #[test]
    fn client_errors_are_below_500() {
        assert!(ErrorKind::BadRequest.is_client_error());
        assert!(ErrorKind::NotFound.is_client_error());
        assert!(!ErrorKind::GeneralError.is_client_error());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_prefers_error_list_over_message() {
        let single = KennelError::bad_request("id should be a number");
        assert_eq!(single.to_json(), serde_json::json!({"message": "id should be a number"}));

        let many = KennelError::bad_request("invalid body").with_errors(["a", "b"]);
        assert_eq!(many.to_json(), serde_json::json!({"errors": ["a", "b"]}));
    }
}
