use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

/// Failure taxonomy of the attendance engine.
///
/// `NotificationDelivery` and `StatePersistence` are non-fatal by design:
/// they are logged during a scan cycle and never abort the remaining
/// employees, so they normally never reach an HTTP handler.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed or incomplete bulk submission. Nothing is written.
    #[error("{message}")]
    Validation {
        message: String,
        /// Employee ids the submitter must correct, when applicable.
        offenders: Vec<u64>,
    },

    #[error("{0}")]
    NotFound(String),

    /// Transient storage failure. Nothing was partially committed; the
    /// caller may safely retry.
    #[error("storage unavailable: {0}")]
    Repository(#[from] sqlx::Error),

    /// The external notifier rejected or could not be reached. Escalation
    /// state is not advanced so the next cycle retries the same escalation.
    #[error("notification delivery failed: {0}")]
    NotificationDelivery(String),

    /// State update failed after the notification was already dispatched.
    /// Known duplicate-notification risk, logged and accepted.
    #[error("escalation state persistence failed: {0}")]
    StatePersistence(String),
}

impl EngineError {
    pub fn validation(message: impl Into<String>) -> Self {
        EngineError::Validation {
            message: message.into(),
            offenders: Vec::new(),
        }
    }

    pub fn validation_with_offenders(message: impl Into<String>, mut offenders: Vec<u64>) -> Self {
        offenders.sort_unstable();
        offenders.dedup();
        EngineError::Validation {
            message: message.into(),
            offenders,
        }
    }
}

impl ResponseError for EngineError {
    fn status_code(&self) -> StatusCode {
        match self {
            EngineError::Validation { .. } => StatusCode::BAD_REQUEST,
            EngineError::NotFound(_) => StatusCode::NOT_FOUND,
            EngineError::Repository(_) => StatusCode::SERVICE_UNAVAILABLE,
            EngineError::NotificationDelivery(_) | EngineError::StatePersistence(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = serde_json::json!({ "message": self.to_string() });
        if let EngineError::Validation { offenders, .. } = self {
            if !offenders.is_empty() {
                body["offenders"] = serde_json::json!(offenders);
            }
        }
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request_with_offender_list() {
        let err = EngineError::validation_with_offenders("sheet mismatch", vec![9, 3, 3]);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        match err {
            EngineError::Validation { offenders, .. } => assert_eq!(offenders, vec![3, 9]),
            _ => unreachable!(),
        }
    }

    #[test]
    fn repository_errors_are_retryable_service_unavailable() {
        let err = EngineError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
