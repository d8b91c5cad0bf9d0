//! Axum route handlers for CV analysis.

use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::info;

use crate::analysis::models::{RecommendationResult, UploadedDocument};
use crate::analysis::pipeline::analyze_cv;
use crate::errors::AppError;
use crate::state::AppState;

const FILE_FIELD: &str = "file";

/// POST /api/cv/upload
///
/// Multipart form with a single `file` part holding the PDF CV.
pub async fn handle_upload_cv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<RecommendationResult>, AppError> {
    let mut document: Option<UploadedDocument> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let filename = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read uploaded file: {e}")))?;
        document = Some(UploadedDocument::new(bytes, content_type, filename));
        break;
    }

    if let Some(doc) = &document {
        info!(
            filename = doc.filename.as_deref().unwrap_or("<unnamed>"),
            size = doc.size(),
            content_type = doc.content_type.as_deref().unwrap_or("<none>"),
            "CV upload received"
        );
    }

    let result = analyze_cv(document, state.completion.as_ref()).await?;
    Ok(Json(result))
}
