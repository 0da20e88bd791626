use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors produced by the backend gateway layer.
///
/// Callers switch on the variant, never on the message text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Not signed in")]
    Unauthenticated,

    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Not authorized: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

/// Error payload shapes returned by the table, auth and storage services
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
    /// String for the table service ("PGRST116"), number for the auth service
    #[serde(default)]
    code: Option<serde_json::Value>,
}

impl ErrorBody {
    fn code(&self) -> Option<String> {
        match &self.code {
            Some(serde_json::Value::String(code)) => Some(code.clone()),
            _ => None,
        }
    }

    fn message(&self) -> Option<String> {
        self.message
            .clone()
            .or_else(|| self.msg.clone())
            .or_else(|| self.error_description.clone())
            .or_else(|| self.error.clone())
    }
}

// Table-service codes
const NO_ROWS: &str = "PGRST116";
const JWT_EXPIRED: &str = "PGRST301";
const UNIQUE_VIOLATION: &str = "23505";

impl ApiError {
    /// Classify a failed response by status and error code
    pub fn from_status(status: StatusCode, body: String) -> Self {
        let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();

        let msg = parsed
            .message()
            .or_else(|| (!body.trim().is_empty()).then(|| body.clone()))
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());

        let credentials_rejected = matches!(
            parsed.error_code.as_deref(),
            Some("invalid_credentials")
        ) || matches!(parsed.error.as_deref(), Some("invalid_grant"));

        if credentials_rejected {
            return ApiError::InvalidCredentials;
        }

        match parsed.code().as_deref() {
            Some(NO_ROWS) => return ApiError::NotFound(msg),
            Some(JWT_EXPIRED) => return ApiError::Unauthenticated,
            Some(UNIQUE_VIOLATION) => return ApiError::Conflict(msg),
            _ => {}
        }

        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthenticated,
            StatusCode::FORBIDDEN => ApiError::Forbidden(msg),
            StatusCode::NOT_FOUND => ApiError::NotFound(msg),
            StatusCode::CONFLICT => ApiError::Conflict(msg),
            status if status.is_server_error() => ApiError::ServerError(msg),
            _ => ApiError::BadRequest(msg),
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, ApiError::Unauthenticated)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let error = ApiError::from_status(StatusCode::UNAUTHORIZED, String::new());
        assert_eq!(error, ApiError::Unauthenticated);

        let error = ApiError::from_status(StatusCode::NOT_FOUND, "Not Found".to_string());
        assert!(matches!(error, ApiError::NotFound(_)));

        let error = ApiError::from_status(StatusCode::BAD_REQUEST, String::new());
        assert_eq!(error, ApiError::BadRequest("Bad Request".to_string()));

        let error = ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream".to_string());
        assert_eq!(error, ApiError::ServerError("upstream".to_string()));
    }

    #[test]
    fn test_invalid_credentials_by_code() {
        let body = r#"{"code":400,"error_code":"invalid_credentials","msg":"Invalid login credentials"}"#;
        let error = ApiError::from_status(StatusCode::BAD_REQUEST, body.to_string());
        assert_eq!(error, ApiError::InvalidCredentials);

        let legacy = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        let error = ApiError::from_status(StatusCode::BAD_REQUEST, legacy.to_string());
        assert_eq!(error, ApiError::InvalidCredentials);
    }

    #[test]
    fn test_table_service_codes() {
        let body = r#"{"code":"23505","message":"duplicate key value violates unique constraint \"students_email_key\""}"#;
        let error = ApiError::from_status(StatusCode::CONFLICT, body.to_string());
        assert!(matches!(error, ApiError::Conflict(msg) if msg.contains("students_email_key")));

        let body = r#"{"code":"PGRST116","message":"JSON object requested, multiple (or no) rows returned"}"#;
        let error = ApiError::from_status(StatusCode::NOT_ACCEPTABLE, body.to_string());
        assert!(matches!(error, ApiError::NotFound(_)));

        let body = r#"{"code":"PGRST301","message":"JWT expired"}"#;
        let error = ApiError::from_status(StatusCode::UNAUTHORIZED, body.to_string());
        assert!(error.is_unauthenticated());
    }
}
