//! Course catalog pass-through. The upstream body is returned untouched.

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog returned status {status}: {body}")]
    Api { status: u16, body: String },
}

#[derive(Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    pub async fn courses_by_category(&self, category: &str) -> Result<String, CatalogError> {
        let url = format!("{}/courses.v1", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(url)
            .query(&[("q", "search"), ("query", category)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!(status = status.as_u16(), "Course catalog error: {body}");
            return Err(CatalogError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub category: String,
}

/// GET /api/courses?category=...
pub async fn handle_get_courses(
    State(state): State<AppState>,
    Query(params): Query<CategoryQuery>,
) -> Result<impl IntoResponse, AppError> {
    if params.category.trim().is_empty() {
        return Err(AppError::Validation("category cannot be empty".to_string()));
    }
    info!(category = %params.category, "Fetching courses");
    let body = state.catalog.courses_by_category(&params.category).await?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body))
}
