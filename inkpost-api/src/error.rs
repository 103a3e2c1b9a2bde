use serde_json::json;

/// Errors the blog service reports, with their HTTP encoding
#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    Invalid(String),

    #[error("Invalid field {field}: {message}")]
    InvalidField { field: String, message: String },

    #[error("Null byte in string is not allowed {0:?}")]
    NullByteInString(String),
}

impl Error {
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::PermissionDenied(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Invalid(_) => StatusCode::BAD_REQUEST,
            Error::InvalidField { .. } => StatusCode::BAD_REQUEST,
            Error::NullByteInString(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({ "detail": msg }),
            Error::Unauthenticated => json!({
                "detail": "Authentication credentials were not provided.",
            }),
            Error::InvalidCredentials => json!({
                "detail": "No active account found with the given credentials",
            }),
            Error::PermissionDenied(msg) => json!({ "detail": msg }),
            Error::NotFound(msg) => json!({ "detail": msg }),
            Error::Invalid(msg) => json!({ "detail": msg }),
            // field errors carry no `detail`, matching the service's validation responses
            Error::InvalidField { field, message } => {
                let mut errors = serde_json::Map::new();
                errors.insert(field.clone(), json!([message]));
                serde_json::Value::Object(errors)
            }
            Error::NullByteInString(_) => json!({
                "detail": "there was a null byte in argument string",
            }),
        })
        .expect("serializing error contents")
    }

    /// Extracts the human-readable reason from an error body, if it has one
    pub fn parse_reason(body: &[u8]) -> Option<String> {
        let data: serde_json::Value = serde_json::from_slice(body).ok()?;
        ["detail", "error"]
            .iter()
            .find_map(|k| data.get(k).and_then(|v| v.as_str()))
            .filter(|r| !r.is_empty())
            .map(String::from)
    }
}

/// Failure of one remote call, as seen by the client
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum RequestError {
    /// The request never got a usable answer (unreachable host, broken body, ...)
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// The service answered with a non-success status
    #[error("request rejected with {status}: {}", .reason.as_deref().unwrap_or("no reason given"))]
    RequestRejected {
        status: http::StatusCode,
        reason: Option<String>,
    },
}

impl RequestError {
    pub fn rejected(status: http::StatusCode, reason: impl Into<String>) -> RequestError {
        RequestError::RequestRejected {
            status,
            reason: Some(reason.into()),
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            RequestError::NetworkFailure(_) => None,
            RequestError::RequestRejected { reason, .. } => reason.as_deref(),
        }
    }
}

impl From<Error> for RequestError {
    fn from(e: Error) -> RequestError {
        RequestError::RequestRejected {
            status: e.status_code(),
            reason: Error::parse_reason(&e.contents()),
        }
    }
}
