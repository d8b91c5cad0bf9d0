use bytes::Bytes;
use serde::{Deserialize, Serialize};

pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// A single file received from the upload form. Lives for one analysis only.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub bytes: Bytes,
    pub content_type: Option<String>,
    pub filename: Option<String>,
}

impl UploadedDocument {
    pub fn new(
        bytes: impl Into<Bytes>,
        content_type: Option<String>,
        filename: Option<String>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            content_type,
            filename,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Structured answer the model is asked to produce for a CV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub gaps: Vec<String>,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub title: String,
    pub provider: String,
    /// Expected in 0..=100, not enforced.
    pub match_score: f64,
    pub reason: String,
    pub skill_gap_addressed: String,
    pub estimated_time_to_complete: String,
    /// Open set: "Beginner", "Intermediate", "Advanced", or whatever the model chose.
    pub difficulty_level: String,
    pub prerequisites: Vec<String>,
    pub career_impact: String,
}
