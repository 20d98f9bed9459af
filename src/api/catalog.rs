//! Catalog index endpoint

use axum::{extract::State, Json};

use crate::{error::AppResult, services::catalog::CatalogCounts, AppState};

/// Record counts for the catalog home page
#[utoipa::path(
    get,
    path = "/catalog",
    tag = "catalog",
    responses(
        (status = 200, description = "Record counts", body = CatalogCounts)
    )
)]
pub async fn get_counts(State(state): State<AppState>) -> AppResult<Json<CatalogCounts>> {
    Ok(Json(state.services.catalog.counts().await?))
}
