use thiserror::Error;

/// Reasons a query could not be turned into filters.
///
/// Every variant is terminal for the current extraction; nothing here is
/// retried by the pipeline.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid {field} value: {value}")]
    InvalidParam { field: &'static str, value: String },

    #[error("Invalid operator value: {value}")]
    InvalidOperatorValue { value: String },

    #[error("Filter {index} has no operator but is not the last filter")]
    InconsistentOperatorChain { index: usize },

    #[error("Oracle returned an empty filter list")]
    EmptyPayload,

    #[error("Oracle unavailable (HTTP {status})")]
    OracleUnavailable { status: u16 },

    #[error("Oracle did not respond before the timeout")]
    OracleTimeout,

    #[error("Oracle request failed: {0}")]
    OracleRequest(String),

    #[error("No JSON object or array found in oracle response")]
    NoJsonFound,

    #[error("Malformed JSON in oracle response: {reason}")]
    MalformedJson { reason: String },
}

impl FilterError {
    /// Stable label for error bodies, logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            FilterError::InvalidParam { .. } => "invalid_param",
            FilterError::InvalidOperatorValue { .. } => "invalid_operator_value",
            FilterError::InconsistentOperatorChain { .. } => "inconsistent_operator_chain",
            FilterError::EmptyPayload => "empty_payload",
            FilterError::OracleUnavailable { .. } => "oracle_unavailable",
            FilterError::OracleTimeout => "oracle_timeout",
            FilterError::OracleRequest(_) => "oracle_request",
            FilterError::NoJsonFound => "no_json_found",
            FilterError::MalformedJson { .. } => "malformed_json",
        }
    }

    /// Whether the failure came from the oracle transport rather than its content
    pub fn is_oracle_failure(&self) -> bool {
        matches!(
            self,
            FilterError::OracleUnavailable { .. }
                | FilterError::OracleTimeout
                | FilterError::OracleRequest(_)
        )
    }
}
