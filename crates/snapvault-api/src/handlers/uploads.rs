use std::sync::Arc;

use axum::{
    extract::{rejection::PathRejection, rejection::QueryRejection, Path, Query, State},
    Json,
};
use serde::Deserialize;
use snapvault_core::models::{UploadPage, UploadRecord};
use snapvault_core::AppError;
use utoipa::IntoParams;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::{AppState, ListingConfig};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// 1-based page number (default 1)
    pub page: Option<u32>,
    /// Records per page; capped at the configured maximum
    pub page_size: Option<u32>,
}

/// Resolved `(page, page_size, offset)`.
fn resolve_page(query: &ListQuery, listing: ListingConfig) -> Result<(u32, u32, i64), AppError> {
    let page = query.page.unwrap_or(1);
    if page < 1 {
        return Err(AppError::InvalidInput("page must be >= 1".to_string()));
    }

    let page_size = query.page_size.unwrap_or(listing.default_page_size);
    if page_size < 1 {
        return Err(AppError::InvalidInput("page_size must be >= 1".to_string()));
    }
    let page_size = page_size.min(listing.max_page_size);

    let offset = i64::from(page - 1) * i64::from(page_size);
    Ok((page, page_size, offset))
}

#[utoipa::path(
    get,
    path = "/api/v1/uploads",
    tag = "uploads",
    params(ListQuery),
    responses(
        (status = 200, description = "Newest uploads first", body = UploadPage),
        (status = 400, description = "Invalid pagination", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query), fields(operation = "list_uploads"))]
pub async fn list_uploads(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<UploadPage>, HttpAppError> {
    let Query(query) =
        query.map_err(|e| AppError::InvalidInput(format!("Invalid query: {}", e.body_text())))?;
    let (page, page_size, offset) = resolve_page(&query, state.listing)?;

    let total = state.repository.count().await?;
    let items = state
        .repository
        .list(i64::from(page_size), offset)
        .await?;

    Ok(Json(UploadPage::new(items, total, page, page_size)))
}

#[utoipa::path(
    get,
    path = "/api/v1/uploads/{id}",
    tag = "uploads",
    params(
        ("id" = i64, Path, description = "Upload ID")
    ),
    responses(
        (status = 200, description = "Upload found", body = UploadRecord),
        (status = 404, description = "Upload not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, id), fields(operation = "get_upload"))]
pub async fn get_upload(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<UploadRecord>, HttpAppError> {
    let Path(id) =
        id.map_err(|e| AppError::InvalidInput(format!("Invalid upload id: {}", e.body_text())))?;

    let record = state
        .repository
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Upload {} not found", id)))?;

    Ok(Json(record))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: ListingConfig = ListingConfig {
        default_page_size: 20,
        max_page_size: 100,
    };

    fn query(page: Option<u32>, page_size: Option<u32>) -> ListQuery {
        ListQuery { page, page_size }
    }

    #[test]
    fn test_defaults() {
        assert_eq!(resolve_page(&ListQuery::default(), LISTING).unwrap(), (1, 20, 0));
    }

    #[test]
    fn test_offset_and_cap() {
        assert_eq!(resolve_page(&query(Some(3), Some(2)), LISTING).unwrap(), (3, 2, 4));
        assert_eq!(resolve_page(&query(Some(2), Some(500)), LISTING).unwrap(), (2, 100, 100));
    }

    #[test]
    fn test_zero_values_rejected() {
        assert!(resolve_page(&query(Some(0), None), LISTING).is_err());
        assert!(resolve_page(&query(None, Some(0)), LISTING).is_err());
    }

    #[test]
    fn test_offset_does_not_overflow() {
        let (_, _, offset) = resolve_page(&query(Some(u32::MAX), Some(100)), LISTING).unwrap();
        assert_eq!(offset, (u32::MAX as i64 - 1) * 100);
    }
}
