use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Everything that can end a storybook request early.
#[derive(Debug, thiserror::Error)]
pub enum StoryError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    #[error("No story template available for ages {bracket}")]
    NoTemplateAvailable { bracket: String },

    #[error("Could not decode photo: {0}")]
    ImageDecode(String),

    #[error("Could not assemble PDF: {0}")]
    Serialization(String),

    #[error("Invalid story catalog: {0}")]
    Catalog(String),
}

pub type StoryResult<T> = Result<T, StoryError>;

impl StoryError {
    fn status(&self) -> StatusCode {
        match self {
            StoryError::Validation(_) => StatusCode::BAD_REQUEST,
            StoryError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn summary(&self) -> &'static str {
        match self {
            StoryError::Validation(_) => "Invalid request",
            StoryError::PayloadTooLarge(_) => "Request too large",
            StoryError::NoTemplateAvailable { .. } => "No story available",
            StoryError::ImageDecode(_) => "Failed to read photo",
            StoryError::Serialization(_) => "Failed to create PDF",
            StoryError::Catalog(_) => "Story catalog unavailable",
        }
    }
}

impl From<JsonRejection> for StoryError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            StoryError::PayloadTooLarge(rejection.body_text())
        } else {
            StoryError::Validation(rejection.body_text())
        }
    }
}

impl IntoResponse for StoryError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Storybook generation failed");
        } else {
            tracing::warn!(error = %self, "Rejected storybook request");
        }

        let body = json!({
            "error": self.summary(),
            "details": self.to_string(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let err = StoryError::Validation("at least one photo is required".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_string(),
            "Invalid request: at least one photo is required"
        );
    }

    #[test]
    fn domain_failures_map_to_server_error() {
        let errors = [
            StoryError::NoTemplateAvailable {
                bracket: "4-6".into(),
            },
            StoryError::ImageDecode("bad base64".into()),
            StoryError::Serialization("worker panicked".into()),
        ];
        for err in errors {
            assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}
