use thiserror::Error;

/// Main error type for the planner
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Provider returned HTTP {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Invalid completion response: {0}")]
    InvalidResponse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("All {attempts} candidate models failed; last error: {last}")]
    AllModelsFailed {
        attempts: usize,
        last: Box<PlannerError>,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, PlannerError>;

impl PlannerError {
    /// Check if retrying the whole request could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            PlannerError::Http(_) => true,
            PlannerError::Provider { status, .. } => *status == 429 || *status >= 500,
            PlannerError::AllModelsFailed { last, .. } => last.is_retryable(),
            _ => false,
        }
    }

    /// Get the error code for structured responses
    pub fn error_code(&self) -> &'static str {
        match self {
            PlannerError::Config(_) => "CONFIG_ERROR",
            PlannerError::Http(_) => "HTTP_ERROR",
            PlannerError::Provider { .. } => "PROVIDER_ERROR",
            PlannerError::InvalidResponse(_) => "INVALID_RESPONSE",
            PlannerError::Serialization(_) => "SERIALIZATION_ERROR",
            PlannerError::Validation(_) => "VALIDATION_ERROR",
            PlannerError::AllModelsFailed { .. } => "ALL_MODELS_FAILED",
        }
    }

    /// Convert to a structured error payload
    pub fn to_error_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "retryable": self.is_retryable()
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_error_inherits_retryability_from_last_failure() {
        let err = PlannerError::AllModelsFailed {
            attempts: 2,
            last: Box::new(PlannerError::Provider {
                status: 503,
                message: "overloaded".to_string(),
            }),
        };
        assert!(err.is_retryable());
        assert!(err.to_string().contains("overloaded"));

        let err = PlannerError::AllModelsFailed {
            attempts: 2,
            last: Box::new(PlannerError::Provider {
                status: 401,
                message: "bad token".to_string(),
            }),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn payload_carries_code_and_flag() {
        let payload = PlannerError::Config("missing HF_TOKEN".to_string()).to_error_payload();
        assert_eq!(payload["error"]["code"], "CONFIG_ERROR");
        assert_eq!(payload["error"]["retryable"], false);
        assert!(payload["error"]["message"]
            .as_str()
            .unwrap()
            .contains("HF_TOKEN"));
    }
}
