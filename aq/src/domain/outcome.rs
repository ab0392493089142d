//! Settled result of a task operation

use serde::{Deserialize, Serialize};

/// Result of running a task's operation
///
/// A failure is a normal terminal state: it is delivered to observers the
/// same way a success is, with the failure message inside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "kebab-case")]
pub enum Outcome {
    /// The operation resolved with a value
    Success(serde_json::Value),

    /// The operation failed (returned an error or panicked)
    Failure(String),
}

impl Outcome {
    /// Successful outcome with a payload
    pub fn success(value: impl Into<serde_json::Value>) -> Self {
        Self::Success(value.into())
    }

    /// Failed outcome with a message
    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure(reason.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Success payload, if any
    pub fn value(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    /// Failure message, if any
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure(reason) => Some(reason),
        }
    }
}

impl<E: std::fmt::Display> From<Result<serde_json::Value, E>> for Outcome {
    fn from(result: Result<serde_json::Value, E>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(e) => Self::Failure(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_result() {
        let ok: Outcome = Ok::<_, String>(serde_json::json!("0 is done")).into();
        assert!(ok.is_success());
        assert_eq!(ok.value(), Some(&serde_json::json!("0 is done")));

        let err: Outcome = Err::<serde_json::Value, _>("1 rejected").into();
        assert!(err.is_failure());
        assert_eq!(err.error(), Some("1 rejected"));
        assert!(err.value().is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(Outcome::failure("boom")).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["value"], "boom");

        let json = serde_json::to_value(Outcome::success(3)).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["value"], 3);
    }
}
