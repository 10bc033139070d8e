//! Unified error handling with Sentry integration.
//!
//! Handlers return `Result<T, AppError>`. Server errors are logged and
//! captured to Sentry before a fixed, per-operation message goes back to the
//! client; the underlying cause never leaves the process.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use people_core::PageError;

use crate::db::RepositoryError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Client input was rejected. The message is returned verbatim.
    #[error("{0}")]
    Validation(String),

    /// The requested person doesn't exist.
    #[error("not found")]
    NotFound,

    /// A repository call failed.
    ///
    /// `context` is the message the client sees.
    #[error("{context}: {source}")]
    Database {
        context: &'static str,
        #[source]
        source: RepositoryError,
    },
}

impl AppError {
    /// Build a mapper from `RepositoryError` for one operation.
    ///
    /// `RepositoryError::NotFound` becomes [`AppError::NotFound`]; everything
    /// else becomes [`AppError::Database`] carrying `context`.
    ///
    /// ```rust,ignore
    /// repo.update(id, &input).await.map_err(AppError::repository("Error updating person"))?;
    /// ```
    pub fn repository(context: &'static str) -> impl FnOnce(RepositoryError) -> Self {
        move |source| match source {
            RepositoryError::NotFound => Self::NotFound,
            source => Self::Database { context, source },
        }
    }
}

impl From<PageError> for AppError {
    fn from(err: PageError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            Self::NotFound => StatusCode::NOT_FOUND.into_response(),
            Self::Database { context, ref source } => {
                let event_id = sentry::capture_error(&self);
                tracing::error!(
                    error = %source,
                    sentry_event_id = %event_id,
                    "{context}"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, context).into_response()
            }
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    async fn get_body(err: AppError) -> String {
        let bytes = to_bytes(err.into_response().into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::Validation("bad".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(get_status(AppError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            get_status(AppError::Database {
                context: "Error getting person",
                source: RepositoryError::DataCorruption("bad person type".to_string()),
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_not_found_maps_to_not_found() {
        let err = AppError::repository("Error updating person")(RepositoryError::NotFound);
        assert!(matches!(err, AppError::NotFound));
    }

    #[test]
    fn test_repository_conflict_maps_to_database() {
        let err = AppError::repository("Error creating person")(RepositoryError::Conflict(
            "credit card 7 already exists".to_string(),
        ));
        assert!(matches!(
            err,
            AppError::Database {
                context: "Error creating person",
                source: RepositoryError::Conflict(_)
            }
        ));
    }

    #[test]
    fn test_page_error_is_validation() {
        let err = AppError::from(PageError::PageTooSmall);
        assert_eq!(err.to_string(), "Page must be greater than or equal to 1");
    }

    #[tokio::test]
    async fn test_validation_body_is_message() {
        let body = get_body(AppError::from(PageError::PageSizeTooLarge { max: 100 })).await;
        assert_eq!(body, "Page size must be less than or equal to 100");
    }

    #[tokio::test]
    async fn test_not_found_body_is_empty() {
        assert!(get_body(AppError::NotFound).await.is_empty());
    }

    #[tokio::test]
    async fn test_database_body_hides_cause() {
        let body = get_body(AppError::Database {
            context: "Error searching for people",
            source: RepositoryError::DataCorruption("secret detail".to_string()),
        })
        .await;
        assert_eq!(body, "Error searching for people");
    }
}
