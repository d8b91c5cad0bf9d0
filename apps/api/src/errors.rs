use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::extractor::ExtractError;
use crate::analysis::{AnalysisError, FailureKind, InvalidUpload, Stage};
use crate::analysis::parser::ParseError;
use crate::auth::token::TokenError;
use crate::courses::CatalogError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Course catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String, Option<Stage>) {
        match self {
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            AppError::Analysis(e) => {
                let (status, code, message) = analysis_parts(&e.kind);
                (status, code, message, Some(e.stage))
            }
            AppError::Token(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "TOKEN_ERROR",
                "Could not issue an authentication token".to_string(),
                None,
            ),
            AppError::Catalog(_) => (
                StatusCode::BAD_GATEWAY,
                "CATALOG_ERROR",
                "The course catalog is currently unavailable".to_string(),
                None,
            ),
        }
    }
}

fn analysis_parts(kind: &FailureKind) -> (StatusCode, &'static str, String) {
    match kind {
        FailureKind::InvalidUpload(e) => {
            let message = match e {
                InvalidUpload::Missing => "Please select a PDF file to upload",
                InvalidUpload::Empty => "The uploaded file is empty",
                InvalidUpload::NotPdf { .. } => "Only PDF files are allowed",
            };
            (StatusCode::BAD_REQUEST, "INVALID_UPLOAD", message.to_string())
        }
        FailureKind::Extract(ExtractError::Decode(_)) => (
            StatusCode::BAD_REQUEST,
            "DOCUMENT_DECODE_ERROR",
            "The uploaded file could not be read as a PDF document".to_string(),
        ),
        FailureKind::Extract(ExtractError::EmptyContent) => (
            StatusCode::BAD_REQUEST,
            "EMPTY_CONTENT",
            "Could not extract text from PDF".to_string(),
        ),
        FailureKind::Upstream(LlmError::Unavailable(_)) => (
            StatusCode::BAD_GATEWAY,
            "UPSTREAM_UNAVAILABLE",
            "Failed to connect to AI service. Please check your internet connection and try again."
                .to_string(),
        ),
        FailureKind::Upstream(LlmError::Timeout(_)) => (
            StatusCode::GATEWAY_TIMEOUT,
            "UPSTREAM_TIMEOUT",
            "Connection to AI service timed out. Please try again.".to_string(),
        ),
        FailureKind::Upstream(LlmError::Rejected { status, .. }) => (
            StatusCode::BAD_GATEWAY,
            "UPSTREAM_REJECTED",
            format!("The AI service rejected the request (status {status})"),
        ),
        FailureKind::Upstream(LlmError::Malformed(_)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "MALFORMED_UPSTREAM_RESPONSE",
            "Invalid response structure from AI service".to_string(),
        ),
        FailureKind::Parse(ParseError::Schema(_)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "RESPONSE_PARSE_ERROR",
            "Failed to get AI recommendations".to_string(),
        ),
        FailureKind::Parse(ParseError::EmptyRecommendations) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "EMPTY_RECOMMENDATIONS",
            "Failed to generate recommendations. Please try again.".to_string(),
        ),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, stage) = self.parts();
        if status.is_server_error() {
            tracing::error!(code, "{}", self);
        } else {
            tracing::warn!(code, "{}", self);
        }

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(stage) = stage {
            error["stage"] = json!(stage);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
