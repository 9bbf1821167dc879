//! Defines the app level error type and its conversion to JSON error responses.
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::ALLOW},
    response::{IntoResponse, Response},
};
use rusqlite::ErrorCode;
use serde::Serialize;

/// The message shown to clients for errors whose details should stay in the server logs.
const INTERNAL_ERROR_MESSAGE: &str =
    "An unexpected error occurred, check the server logs for more details.";

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request did not contain an `action`, or named one that does not exist.
    ///
    /// Holds the raw selector (empty when missing) for logging.
    #[error("Unknown or missing action")]
    UnknownAction(String),

    /// A write action was sent as a read request.
    #[error("The action \"{0}\" must be sent as a POST request")]
    MethodNotAllowed(String),

    /// The request body or query string could not be decoded as form data.
    #[error("Could not parse the request parameters: {0}")]
    InvalidParameters(String),

    /// An item was added with an empty name or category, or one that was
    /// just whitespace.
    #[error("Parameters \"name\" and \"category\" are required")]
    MissingNameOrCategory,

    /// The item ID was missing, not a number or not positive.
    #[error("Parameter \"id\" is required")]
    InvalidItemId,

    /// The requested resource was not found.
    #[error("Not found")]
    NotFound,

    /// Another connection held the database lock for longer than the busy
    /// timeout.
    ///
    /// The request did not change anything and the client should retry it.
    #[error("The database is busy, please try again")]
    DatabaseBusy,

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(sql_error, _)
                if matches!(
                    sql_error.code,
                    ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
                ) =>
            {
                tracing::warn!("the database is busy: {sql_error}");
                Error::DatabaseBusy
            }
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// The HTTP status code that best describes the error to a client.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::UnknownAction(_)
            | Error::InvalidParameters(_)
            | Error::MissingNameOrCategory
            | Error::InvalidItemId => StatusCode::BAD_REQUEST,
            Error::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::DatabaseBusy => StatusCode::SERVICE_UNAVAILABLE,
            Error::DatabaseLockError | Error::SqlError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// The body of every error response, e.g. `{"error": "Not found"}`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let allow_post = matches!(self, Error::MethodNotAllowed(_));

        let message = match self {
            Error::DatabaseLockError | Error::SqlError(_) => {
                tracing::error!("An unexpected error occurred: {}", self);
                INTERNAL_ERROR_MESSAGE.to_owned()
            }
            error => {
                tracing::debug!("Rejecting request: {error:?}");
                error.to_string()
            }
        };

        let mut response = (status, Json(ErrorBody { error: message })).into_response();

        if allow_post {
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("POST"));
        }

        response
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{
        body::to_bytes,
        http::{HeaderValue, StatusCode, header::ALLOW},
        response::IntoResponse,
    };
    use rusqlite::ffi;
    use serde_json::{Value, json};

    use crate::Error;

    async fn get_json_body(error: Error) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Could not read response body");

        (
            status,
            serde_json::from_slice(&body).expect("Could not parse response body as JSON"),
        )
    }

    #[tokio::test]
    async fn unknown_action_is_a_client_error() {
        let (status, body) = get_json_body(Error::UnknownAction("nope".to_owned())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Unknown or missing action"}));
    }

    #[tokio::test]
    async fn sql_error_details_are_not_sent_to_client() {
        let (status, body) =
            get_json_body(Error::SqlError(rusqlite::Error::InvalidQuery)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": super::INTERNAL_ERROR_MESSAGE}));
    }

    #[tokio::test]
    async fn busy_database_is_retryable() {
        let (status, body) = get_json_body(Error::DatabaseBusy).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, json!({"error": "The database is busy, please try again"}));
    }

    #[tokio::test]
    async fn empty_name_or_category_is_a_client_error() {
        let (status, body) = get_json_body(Error::MissingNameOrCategory).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"error": "Parameters \"name\" and \"category\" are required"})
        );
    }

    #[test]
    fn method_not_allowed_lists_allowed_method() {
        let response = Error::MethodNotAllowed("add".to_owned()).into_response();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response.headers().get(ALLOW),
            Some(&HeaderValue::from_static("POST"))
        );
    }

    #[test]
    fn other_errors_have_no_allow_header() {
        let response = Error::InvalidItemId.into_response();

        assert_eq!(response.headers().get(ALLOW), None);
    }

    #[test]
    fn busy_and_locked_sqlite_failures_map_to_database_busy() {
        for code in [ffi::SQLITE_BUSY, ffi::SQLITE_LOCKED] {
            let error = rusqlite::Error::SqliteFailure(ffi::Error::new(code), None);

            assert_eq!(Error::from(error), Error::DatabaseBusy);
        }
    }

    #[test]
    fn other_sqlite_failures_are_kept() {
        let error = rusqlite::Error::QueryReturnedNoRows;

        assert_eq!(
            Error::from(error),
            Error::SqlError(rusqlite::Error::QueryReturnedNoRows)
        );
    }
}
