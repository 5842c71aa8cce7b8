use thiserror::Error;
use tide::{Response, StatusCode};

/**
 * Everything a request handler can fail with.
 *
 * Handlers simply `?` these into a `tide::Error`, the `render_errors` middleware then picks the
 * status code and writes the JSON error body.
 */
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing required fields")]
    MissingField,
    #[error("Invalid vote option")]
    InvalidOption,
    #[error("Missing latitude or longitude")]
    MissingCoordinates,
    #[error("No file uploaded")]
    NoFile,
    #[error("File too large")]
    TooLarge,
    #[error("Malformed request body: {0}")]
    MalformedBody(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Failed to fetch directions")]
    Upstream(#[source] UpstreamError),
    #[error("Failed to store upload")]
    Storage(#[from] std::io::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingField
            | AppError::InvalidOption
            | AppError::MissingCoordinates
            | AppError::NoFile
            | AppError::MalformedBody(_) => StatusCode::BadRequest,
            AppError::NotFound(_) => StatusCode::NotFound,
            AppError::TooLarge => StatusCode::PayloadTooLarge,
            AppError::Upstream(_) | AppError::Storage(_) => StatusCode::InternalServerError,
        }
    }
}

/**
 * Reasons the directions service could not be reached or refused us
 */
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("upstream returned {0}")]
    Status(u16),
}

/**
 * Problems with the process environment detected at startup
 */
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} has an invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/**
 * Renders every failed response as `{"error": "..."}`, meant to be wrapped in `tide::utils::After`
 *
 * `AppError` carries its own status, anything else keeps whatever status tide gave it.
 */
pub async fn render_errors(mut res: Response) -> tide::Result {
    let rendered = if let Some(err) = res.downcast_error::<AppError>() {
        Some((err.status(), err.to_string()))
    } else {
        res.error().map(|err| (err.status(), err.to_string()))
    };

    if let Some((status, message)) = rendered {
        res.set_status(status);
        res.set_body(serde_json::json!({ "error": message }));
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_bad_requests() {
        assert_eq!(AppError::MissingField.status(), StatusCode::BadRequest);
        assert_eq!(AppError::InvalidOption.status(), StatusCode::BadRequest);
        assert_eq!(AppError::MissingCoordinates.status(), StatusCode::BadRequest);
        assert_eq!(AppError::NoFile.status(), StatusCode::BadRequest);
    }

    #[test]
    fn not_found_names_the_record_kind() {
        let err = AppError::NotFound("Complaint");
        assert_eq!(err.status(), StatusCode::NotFound);
        assert_eq!(err.to_string(), "Complaint not found");
    }

    #[test]
    fn oversized_uploads_are_payload_too_large() {
        assert_eq!(AppError::TooLarge.status(), StatusCode::PayloadTooLarge);
        assert_eq!(AppError::TooLarge.to_string(), "File too large");
    }

    #[test]
    fn upstream_failures_hide_the_cause() {
        let err = AppError::Upstream(UpstreamError::Status(503));
        assert_eq!(err.status(), StatusCode::InternalServerError);
        assert_eq!(err.to_string(), "Failed to fetch directions");
    }
}
