// src/errors.rs
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

use crate::models::ErrorBody;

pub const MISSING_JSON_IMAGE: &str = "Missing image data";
pub const MISSING_JSON_IMAGE_MESSAGE: &str = "Please provide a base64 encoded image";
pub const IMAGE_REQUIRED: &str = "Image data is required";
pub const UPSTREAM_FAILURE: &str = "Failed to analyze image";
pub const UPSTREAM_PARSE_FAILURE: &str = "Failed to parse color analysis";
pub const PAYLOAD_TOO_LARGE: &str = "Payload too large";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("{error}")]
    MissingInput {
        error: &'static str,
        message: Option<String>,
    },

    #[error("Payload exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    #[error("Vision provider unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Vision provider returned unparseable content: {0}")]
    UpstreamParseError(String),
}

impl AnalysisError {
    /// Missing or empty `image` in a JSON body.
    pub fn missing_json_image() -> Self {
        AnalysisError::MissingInput {
            error: MISSING_JSON_IMAGE,
            message: Some(MISSING_JSON_IMAGE_MESSAGE.to_string()),
        }
    }

    /// Malformed JSON body; carries the parser's complaint.
    pub fn malformed_json(reason: impl Into<String>) -> Self {
        AnalysisError::MissingInput {
            error: MISSING_JSON_IMAGE,
            message: Some(reason.into()),
        }
    }

    /// Missing image on the `/api/color-analysis` routes, whether the body
    /// was JSON or multipart.
    pub fn image_required() -> Self {
        AnalysisError::MissingInput {
            error: IMAGE_REQUIRED,
            message: None,
        }
    }

    pub fn body(&self) -> ErrorBody {
        match self {
            AnalysisError::MissingInput { error, message } => ErrorBody {
                error: error.to_string(),
                message: message.clone(),
                details: None,
            },
            AnalysisError::PayloadTooLarge { .. } => ErrorBody {
                error: PAYLOAD_TOO_LARGE.to_string(),
                message: Some(self.to_string()),
                details: None,
            },
            AnalysisError::UpstreamUnavailable(details) => ErrorBody {
                error: UPSTREAM_FAILURE.to_string(),
                message: None,
                details: Some(details.clone()),
            },
            AnalysisError::UpstreamParseError(details) => ErrorBody {
                error: UPSTREAM_PARSE_FAILURE.to_string(),
                message: None,
                details: Some(details.clone()),
            },
        }
    }
}

impl ResponseError for AnalysisError {
    fn status_code(&self) -> StatusCode {
        match self {
            AnalysisError::MissingInput { .. } => StatusCode::BAD_REQUEST,
            AnalysisError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AnalysisError::UpstreamUnavailable(_) | AnalysisError::UpstreamParseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.body())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CaptureError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Capture failed: {0}")]
    CaptureFailed(String),

    #[error("Image processing error: {0}")]
    Preprocess(String),
}

/// Coarse failure class for user messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No permission, no image, or an image the service refused.
    Input,
    /// The proxy or the provider behind it failed.
    Service,
    Cancelled,
    /// The client refused to start; nothing was sent.
    Rejected,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("An analysis is already in progress")]
    Busy,

    #[error("The previous analysis outcome has not been taken")]
    OutcomePending,

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("{error}")]
    MissingInput { error: String },

    #[error("Analysis service returned {status}: {error}")]
    Service {
        status: u16,
        error: String,
        detail: Option<String>,
    },

    #[error("Analysis request failed: {0}")]
    Transport(String),

    #[error("Analysis request timed out")]
    Timeout,

    #[error("Unexpected analysis response: {0}")]
    Decode(String),

    #[error("Analysis cancelled")]
    Cancelled,
}

impl ClientError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ClientError::Capture(_) | ClientError::MissingInput { .. } => FailureKind::Input,
            ClientError::Service { status, .. } if (400..500).contains(status) => {
                FailureKind::Input
            }
            ClientError::Cancelled => FailureKind::Cancelled,
            ClientError::Busy | ClientError::OutcomePending => FailureKind::Rejected,
            ClientError::Service { .. }
            | ClientError::Transport(_)
            | ClientError::Timeout
            | ClientError::Decode(_) => FailureKind::Service,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    #[error("Please enter a name for this item")]
    MissingName,

    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}
