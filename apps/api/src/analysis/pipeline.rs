//! CV analysis pipeline.
//!
//! Received → Validated → Extracted → PromptBuilt → UpstreamCalled → Parsed → Done.
//! Any step can fail; the error carries the stage it was trying to reach.
//! Nothing is kept between invocations.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analysis::extractor::{extract_text, ExtractError};
use crate::analysis::models::{RecommendationResult, UploadedDocument, PDF_MEDIA_TYPE};
use crate::analysis::parser::{parse_recommendations, ParseError};
use crate::analysis::prompts::build_prompt;
use crate::llm_client::{CompletionBackend, LlmError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Received,
    Validated,
    Extracted,
    PromptBuilt,
    UpstreamCalled,
    Parsed,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::Validated => "validated",
            Stage::Extracted => "extracted",
            Stage::PromptBuilt => "prompt_built",
            Stage::UpstreamCalled => "upstream_called",
            Stage::Parsed => "parsed",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum InvalidUpload {
    #[error("No file uploaded")]
    Missing,

    #[error("Uploaded file is empty")]
    Empty,

    #[error("Only PDF files are allowed (received {received})")]
    NotPdf { received: String },
}

#[derive(Debug, Error)]
pub enum FailureKind {
    #[error(transparent)]
    InvalidUpload(#[from] InvalidUpload),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Upstream(#[from] LlmError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Terminal `Failed(stage, error)` state of a pipeline run.
#[derive(Debug, Error)]
#[error("CV analysis failed at stage '{stage}': {kind}")]
pub struct AnalysisError {
    pub stage: Stage,
    #[source]
    pub kind: FailureKind,
}

impl AnalysisError {
    fn at(stage: Stage, kind: impl Into<FailureKind>) -> Self {
        Self {
            stage,
            kind: kind.into(),
        }
    }
}

fn validate_upload(document: Option<UploadedDocument>) -> Result<UploadedDocument, InvalidUpload> {
    let document = document.ok_or(InvalidUpload::Missing)?;
    if document.size() == 0 {
        return Err(InvalidUpload::Empty);
    }
    match document.content_type.as_deref() {
        Some(PDF_MEDIA_TYPE) => Ok(document),
        other => Err(InvalidUpload::NotPdf {
            received: other.unwrap_or("none").to_string(),
        }),
    }
}

/// Runs one CV through extraction, the AI service and response validation.
pub async fn analyze_cv(
    document: Option<UploadedDocument>,
    backend: &dyn CompletionBackend,
) -> Result<RecommendationResult, AnalysisError> {
    let analysis_id = Uuid::new_v4();
    let mut stage = Stage::Received;
    info!(%analysis_id, %stage, "Starting CV analysis");

    stage = Stage::Validated;
    let document = validate_upload(document).map_err(|e| {
        warn!(%analysis_id, "Rejected upload: {e}");
        AnalysisError::at(stage, e)
    })?;
    info!(
        %analysis_id,
        filename = document.filename.as_deref().unwrap_or("<unnamed>"),
        size = document.size(),
        "Upload accepted"
    );

    stage = Stage::Extracted;
    let text = extract_text(document.bytes)
        .await
        .map_err(|e| {
            warn!(%analysis_id, "PDF extraction failed: {e}");
            AnalysisError::at(stage, e)
        })?;
    info!(%analysis_id, content_chars = text.len(), "Document parsed");
    debug!(%analysis_id, preview = %preview(&text, 100), "CV content preview");

    stage = Stage::PromptBuilt;
    let prompt = build_prompt(&text);
    drop(text);
    debug!(%analysis_id, %stage, prompt_chars = prompt.len());

    stage = Stage::UpstreamCalled;
    let raw = backend
        .complete(&prompt)
        .await
        .map_err(|e| AnalysisError::at(stage, e))?;

    stage = Stage::Parsed;
    let result = parse_recommendations(&raw).map_err(|e| {
        warn!(%analysis_id, "AI response rejected: {e}");
        debug!(%analysis_id, "Raw AI response: {raw}");
        AnalysisError::at(stage, e)
    })?;

    stage = Stage::Done;
    info!(
        %analysis_id,
        %stage,
        recommendations = result.recommendations.len(),
        "CV analysis completed"
    );
    Ok(result)
}

fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::http::StatusCode;

    use super::*;
    use crate::analysis::extractor::fixtures::{blank_pdf, single_page_pdf};
    use crate::llm_client::testing::{ai_config, config_for, fake_upstream};
    use crate::llm_client::LlmClient;

    const THREE_RECOMMENDATIONS_ENVELOPE: &str = r#"{"choices":[{"message":{"role":"assistant","content":"{\"skills\":[\"Rust\",\"SQL\"],\"gaps\":[\"Cloud\",\"ML\"],\"recommendations\":[{\"title\":\"Cloud Architecture\",\"provider\":\"Coursera\",\"matchScore\":95,\"reason\":\"No cloud experience\",\"skillGapAddressed\":\"Cloud\",\"estimatedTimeToComplete\":\"6 weeks\",\"difficultyLevel\":\"Intermediate\",\"prerequisites\":[\"Linux\"],\"careerImpact\":\"Platform roles\"},{\"title\":\"Machine Learning\",\"provider\":\"Stanford Online\",\"matchScore\":88,\"reason\":\"ML gap\",\"skillGapAddressed\":\"ML\",\"estimatedTimeToComplete\":\"3 months\",\"difficultyLevel\":\"Advanced\",\"prerequisites\":[\"Python\",\"Linear algebra\"],\"careerImpact\":\"Data roles\"},{\"title\":\"Kubernetes Basics\",\"provider\":\"edX\",\"matchScore\":80,\"reason\":\"Deployment gap\",\"skillGapAddressed\":\"Cloud\",\"estimatedTimeToComplete\":\"2 weeks\",\"difficultyLevel\":\"Beginner\",\"prerequisites\":[],\"careerImpact\":\"DevOps exposure\"}]}"}}]}"#;

    /// Backend returning a canned reply and counting calls.
    struct CannedBackend {
        reply: Result<String, fn() -> LlmError>,
        calls: AtomicUsize,
    }

    impl CannedBackend {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionBackend for CannedBackend {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    fn pdf_upload(bytes: Vec<u8>) -> Option<UploadedDocument> {
        Some(UploadedDocument::new(
            bytes,
            Some(PDF_MEDIA_TYPE.to_string()),
            Some("cv.pdf".to_string()),
        ))
    }

    fn cv_pdf() -> Vec<u8> {
        single_page_pdf(&["Jane Doe", "Backend engineer", "Rust PostgreSQL Kafka"])
    }

    #[tokio::test]
    async fn test_plain_text_upload_rejected_before_network() {
        let backend = CannedBackend::ok("{}");
        let doc = UploadedDocument::new(
            b"hello".to_vec(),
            Some("text/plain".to_string()),
            Some("cv.txt".to_string()),
        );
        let err = analyze_cv(Some(doc), &backend).await.unwrap_err();
        assert_eq!(err.stage, Stage::Validated);
        assert!(matches!(
            err.kind,
            FailureKind::InvalidUpload(InvalidUpload::NotPdf { .. })
        ));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_and_empty_uploads_rejected() {
        let backend = CannedBackend::ok("{}");

        let err = analyze_cv(None, &backend).await.unwrap_err();
        assert!(matches!(
            err.kind,
            FailureKind::InvalidUpload(InvalidUpload::Missing)
        ));

        let err = analyze_cv(pdf_upload(Vec::new()), &backend).await.unwrap_err();
        assert_eq!(err.stage, Stage::Validated);
        assert!(matches!(
            err.kind,
            FailureKind::InvalidUpload(InvalidUpload::Empty)
        ));

        let untyped = UploadedDocument::new(cv_pdf(), None, None);
        let err = analyze_cv(Some(untyped), &backend).await.unwrap_err();
        assert!(matches!(
            err.kind,
            FailureKind::InvalidUpload(InvalidUpload::NotPdf { .. })
        ));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_blank_pdf_fails_at_extraction() {
        let backend = CannedBackend::ok("{}");
        let err = analyze_cv(pdf_upload(blank_pdf()), &backend)
            .await
            .unwrap_err();
        assert_eq!(err.stage, Stage::Extracted);
        assert!(matches!(
            err.kind,
            FailureKind::Extract(ExtractError::EmptyContent)
        ));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_pdf_fails_at_extraction() {
        let backend = CannedBackend::ok("{}");
        let err = analyze_cv(pdf_upload(b"%PDF-1.4 garbage".to_vec()), &backend)
            .await
            .unwrap_err();
        assert_eq!(err.stage, Stage::Extracted);
        assert!(matches!(
            err.kind,
            FailureKind::Extract(ExtractError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_upstream_timeout_surfaces_without_result() {
        let addr = fake_upstream(
            StatusCode::OK,
            THREE_RECOMMENDATIONS_ENVELOPE,
            Duration::from_secs(5),
        )
        .await;
        let client =
            LlmClient::new(ai_config(format!("http://{addr}"), Duration::from_millis(200))).unwrap();

        let err = analyze_cv(pdf_upload(cv_pdf()), &client).await.unwrap_err();
        assert_eq!(err.stage, Stage::UpstreamCalled);
        assert!(matches!(err.kind, FailureKind::Upstream(LlmError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_valid_reply_yields_three_recommendations() {
        let addr = fake_upstream(StatusCode::OK, THREE_RECOMMENDATIONS_ENVELOPE, Duration::ZERO).await;
        let client = LlmClient::new(config_for(addr)).unwrap();

        let result = analyze_cv(pdf_upload(cv_pdf()), &client).await.unwrap();
        assert_eq!(result.skills, vec!["Rust", "SQL"]);
        assert_eq!(result.gaps, vec!["Cloud", "ML"]);
        assert_eq!(result.recommendations.len(), 3);

        let titles: Vec<_> = result.recommendations.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["Cloud Architecture", "Machine Learning", "Kubernetes Basics"]);
        assert_eq!(result.recommendations[1].provider, "Stanford Online");
        assert_eq!(result.recommendations[1].match_score, 88.0);
        assert_eq!(
            result.recommendations[1].prerequisites,
            vec!["Python", "Linear algebra"]
        );
        assert!(result.recommendations[2].prerequisites.is_empty());
    }

    #[tokio::test]
    async fn test_rate_limited_upstream_keeps_body() {
        let addr = fake_upstream(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"message":"Rate limit exceeded: free-models-per-day"}}"#,
            Duration::ZERO,
        )
        .await;
        let client = LlmClient::new(config_for(addr)).unwrap();

        let err = analyze_cv(pdf_upload(cv_pdf()), &client).await.unwrap_err();
        assert_eq!(err.stage, Stage::UpstreamCalled);
        match err.kind {
            FailureKind::Upstream(LlmError::Rejected { status, body }) => {
                assert_eq!(status, 429);
                assert!(body.contains("free-models-per-day"));
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_recommendations_fail_at_parse() {
        let backend = CannedBackend::ok(r#"{"skills":["Go"],"gaps":[],"recommendations":[]}"#);
        let err = analyze_cv(pdf_upload(cv_pdf()), &backend).await.unwrap_err();
        assert_eq!(err.stage, Stage::Parsed);
        assert!(matches!(
            err.kind,
            FailureKind::Parse(ParseError::EmptyRecommendations)
        ));
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_backend_error_is_tagged_with_upstream_stage() {
        let backend = CannedBackend {
            reply: Err(|| LlmError::Unavailable("connection refused".to_string())),
            calls: AtomicUsize::new(0),
        };
        let err = analyze_cv(pdf_upload(cv_pdf()), &backend).await.unwrap_err();
        assert_eq!(err.stage, Stage::UpstreamCalled);
        assert!(matches!(
            err.kind,
            FailureKind::Upstream(LlmError::Unavailable(_))
        ));
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        assert_eq!(preview("héllo wörld", 4), "héll...");
        assert_eq!(preview("short", 100), "short");
    }
}
