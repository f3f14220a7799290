use thiserror::Error;

/// Closed set of failure reasons for a single fetch attempt.
///
/// Every variant names the source that failed so retry logs and user
/// notifications can say which API was at fault. Only `AuthFailed` is
/// terminal — it means the configuration itself is bad and the host must
/// re-prompt for setup; everything else is worth another attempt.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Credentials or configuration rejected by the upstream. Never retried.
    #[error("{name} API authentication failed")]
    AuthFailed { name: String },

    /// The response decoded fine but held no usable station data.
    #[error("no valid data found in the {name} API response")]
    DataNotFound { name: String },

    /// A record-oriented lookup matched nothing.
    #[error("no records found in the {name} API response")]
    RecordNotFound { name: String },

    /// Non-2xx HTTP response.
    #[error("{name} API returned unexpected status code {code}")]
    UnexpectedStatus { name: String, code: u16 },

    #[error("{name} API request timed out: {detail}")]
    RequestTimeout { name: String, detail: String },

    /// Any transport failure that is not a timeout.
    #[error("{name} API request failed: {detail}")]
    RequestFailed { name: String, detail: String },
}

impl ApiError {
    /// The source tag carried by every variant.
    pub fn source_name(&self) -> &str {
        match self {
            ApiError::AuthFailed { name }
            | ApiError::DataNotFound { name }
            | ApiError::RecordNotFound { name }
            | ApiError::UnexpectedStatus { name, .. }
            | ApiError::RequestTimeout { name, .. }
            | ApiError::RequestFailed { name, .. } => name,
        }
    }

    pub fn is_retryable(&self) -> bool {
        !matches!(self, ApiError::AuthFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failure_is_terminal() {
        let err = ApiError::AuthFailed { name: "Test".into() };
        assert!(!err.is_retryable());
    }

    #[test]
    fn other_kinds_are_retryable() {
        let errors = [
            ApiError::DataNotFound { name: "Test".into() },
            ApiError::RecordNotFound { name: "Test".into() },
            ApiError::UnexpectedStatus { name: "Test".into(), code: 503 },
            ApiError::RequestTimeout { name: "Test".into(), detail: "deadline".into() },
            ApiError::RequestFailed { name: "Test".into(), detail: "reset".into() },
        ];
        for err in errors {
            assert!(err.is_retryable(), "{} should be retryable", err);
            assert_eq!(err.source_name(), "Test");
        }
    }

    #[test]
    fn status_error_names_the_code() {
        let err = ApiError::UnexpectedStatus { name: "Test".into(), code: 429 };
        assert!(err.to_string().contains("429"));
    }
}
