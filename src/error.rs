//! Error handling.

use axum::{
    extract::rejection::JsonRejection,
    http::header,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{event, Level};

/// Message returned to clients in place of the details of a server error.
const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// HPI server error type
///
/// This type encapsulates the various errors that may occur.
/// Each variant may result in a different API error response.
#[derive(Debug, Error)]
pub enum HpiError {
    /// No samples exist for the requested location
    #[error("No data found for location: {location}")]
    LocationNotFound { location: String },

    /// Error deserialising request data
    #[error("request data is not valid")]
    RequestDataJsonRejection(#[from] JsonRejection),

    /// Error validating request data
    #[error("request data is not valid")]
    RequestDataValidation(#[from] validator::ValidationErrors),

    /// Error reading or writing the backing data file
    #[error("failed to access data file")]
    DataFile(#[from] std::io::Error),

    /// Error encoding a sample as a CSV record
    #[error("failed to encode CSV record")]
    CsvEncode(#[from] csv::Error),
}

impl IntoResponse for HpiError {
    /// Convert from an `HpiError` into an [axum::response::Response].
    fn into_response(self) -> Response {
        ErrorResponse::from(self).into_response()
    }
}

/// Body of error response
///
/// Implements serde (de)serialise.
#[derive(Deserialize, Serialize)]
struct ErrorBody {
    /// Main error message
    message: String,

    /// Optional list of causes
    #[serde(skip_serializing_if = "Option::is_none")]
    caused_by: Option<Vec<String>>,
}

impl ErrorBody {
    /// Return a new ErrorBody
    ///
    /// # Arguments
    ///
    /// * `error`: The error that occurred
    fn new<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        let message = error.to_string();
        let mut caused_by = None;
        let mut current = error.source();
        while let Some(source) = current {
            let mut causes: Vec<String> = caused_by.unwrap_or_default();
            causes.push(source.to_string());
            caused_by = Some(causes);
            current = source.source();
        }
        // Remove duplicate entries.
        if let Some(caused_by) = caused_by.as_mut() {
            caused_by.dedup()
        }
        ErrorBody { message, caused_by }
    }

    /// Return an ErrorBody that reveals nothing about the underlying error.
    fn opaque() -> Self {
        ErrorBody {
            message: INTERNAL_ERROR_MESSAGE.to_string(),
            caused_by: None,
        }
    }
}

/// A response to send in error cases
///
/// Implements serde (de)serialise.
#[derive(Deserialize, Serialize)]
struct ErrorResponse {
    /// HTTP status of the response
    #[serde(skip)]
    status: StatusCode,

    /// Response body
    error: ErrorBody,
}

impl ErrorResponse {
    /// Return a new ErrorResponse
    ///
    /// # Arguments
    ///
    /// * `status`: HTTP status of the response
    /// * `error`: The error that occurred. This will be formatted into a suitable `ErrorBody`
    fn new<E>(status: StatusCode, error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        ErrorResponse {
            status,
            error: ErrorBody::new(error),
        }
    }

    /// Return a 400 bad request ErrorResponse
    fn bad_request<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    /// Return a 404 not found ErrorResponse
    fn not_found<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::NOT_FOUND, error)
    }

    /// Return a 500 internal server error ErrorResponse
    ///
    /// The error is logged along with its causes, but the body only carries a generic message.
    fn internal_server_error<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        event!(Level::ERROR, "{}", error.to_string());
        let mut current = error.source();
        while let Some(source) = current {
            event!(Level::ERROR, "Caused by: {}", source.to_string());
            current = source.source();
        }
        ErrorResponse {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: ErrorBody::opaque(),
        }
    }
}

impl From<HpiError> for ErrorResponse {
    /// Convert from an `HpiError` into an `ErrorResponse`.
    fn from(error: HpiError) -> Self {
        match &error {
            // Bad request
            HpiError::RequestDataJsonRejection(_) | HpiError::RequestDataValidation(_) => {
                Self::bad_request(&error)
            }

            // Not found
            HpiError::LocationNotFound { location: _ } => Self::not_found(&error),

            // Internal server error
            HpiError::DataFile(_) | HpiError::CsvEncode(_) => Self::internal_server_error(&error),
        }
    }
}

impl IntoResponse for ErrorResponse {
    /// Convert from an `ErrorResponse` into an `axum::response::Response`.
    ///
    /// Renders the response as JSON.
    fn into_response(self) -> Response {
        let json_body = serde_json::to_string_pretty(&self);
        match json_body {
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to serialise error response: {}", err),
            )
                .into_response(),
            Ok(json_body) => (
                self.status,
                [(&header::CONTENT_TYPE, mime::APPLICATION_JSON.to_string())],
                json_body,
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use hyper::HeaderMap;

    // Jump through the hoops to get the body as a string.
    async fn body_string(response: Response) -> String {
        String::from_utf8(
            hyper::body::to_bytes(response.into_body())
                .await
                .unwrap()
                .to_vec(),
        )
        .unwrap()
    }

    async fn test_hpi_error(
        error: HpiError,
        status: StatusCode,
        message: &str,
        caused_by: Option<Vec<&'static str>>,
    ) {
        let response = error.into_response();
        assert_eq!(status, response.status());
        let mut headers = HeaderMap::new();
        headers.insert(&header::CONTENT_TYPE, "application/json".parse().unwrap());
        assert_eq!(headers, *response.headers());
        let error_response: ErrorResponse =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(message.to_string(), error_response.error.message);
        // Map Vec items from str to String
        let caused_by = caused_by.map(|cb| cb.iter().map(|s| s.to_string()).collect());
        assert_eq!(caused_by, error_response.error.caused_by);
    }

    #[tokio::test]
    async fn location_not_found() {
        let error = HpiError::LocationNotFound {
            location: "Lake, North".to_string(),
        };
        let message = "No data found for location: Lake, North";
        test_hpi_error(error, StatusCode::NOT_FOUND, message, None).await;
    }

    #[tokio::test]
    async fn request_data_validation() {
        let mut validation_errors = validator::ValidationErrors::new();
        let validation_error = validator::ValidationError::new("foo");
        validation_errors.add("bar", validation_error);
        let error = HpiError::RequestDataValidation(validation_errors);
        let message = "request data is not valid";
        let caused_by = Some(vec!["bar: Validation error: foo [{}]"]);
        test_hpi_error(error, StatusCode::BAD_REQUEST, message, caused_by).await;
    }

    #[tokio::test]
    async fn data_file_error_is_opaque() {
        let io_error = std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "/srv/data/groundwater_data.csv: permission denied",
        );
        let error = HpiError::DataFile(io_error);
        test_hpi_error(
            error,
            StatusCode::INTERNAL_SERVER_ERROR,
            INTERNAL_ERROR_MESSAGE,
            None,
        )
        .await;
    }

    #[tokio::test]
    async fn csv_encode_error_is_opaque() {
        let io_error = std::io::Error::from(std::io::ErrorKind::WriteZero);
        let error = HpiError::CsvEncode(csv::Error::from(io_error));
        test_hpi_error(
            error,
            StatusCode::INTERNAL_SERVER_ERROR,
            INTERNAL_ERROR_MESSAGE,
            None,
        )
        .await;
    }
}
