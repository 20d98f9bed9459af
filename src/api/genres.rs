//! Genre endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{book::BookSummary, DependentSummary, EntityKind, Genre, GenreForm},
    services::validation::Submission,
    AppState,
};

use super::{json_body, parse_id};

#[derive(Debug, Serialize, ToSchema)]
pub struct GenreView {
    pub id: String,
    pub name: String,
    pub url: String,
}

impl From<Genre> for GenreView {
    fn from(genre: Genre) -> Self {
        Self {
            id: genre.id.to_string(),
            url: genre.url(),
            name: genre.name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenreDetailResponse {
    pub genre: GenreView,
    pub books: Vec<BookSummary>,
}

/// List all genres
#[utoipa::path(
    get,
    path = "/genres",
    tag = "genres",
    responses(
        (status = 200, description = "Genres ordered by name", body = Vec<GenreView>)
    )
)]
pub async fn list_genres(State(state): State<AppState>) -> AppResult<Json<Vec<GenreView>>> {
    let genres = state.services.genres.list().await?;
    Ok(Json(genres.into_iter().map(GenreView::from).collect()))
}

/// Get a genre with its books
#[utoipa::path(
    get,
    path = "/genres/{id}",
    tag = "genres",
    params(("id" = String, Path, description = "Genre ID")),
    responses(
        (status = 200, description = "Genre details", body = GenreDetailResponse),
        (status = 404, description = "Genre not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_genre(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<GenreDetailResponse>> {
    let id = parse_id(EntityKind::Genre, &id)?;
    let detail = state.services.genres.detail(id).await?;
    Ok(Json(GenreDetailResponse {
        genre: detail.genre.into(),
        books: detail.books,
    }))
}

/// Create a genre (returns the existing genre if the name is taken)
#[utoipa::path(
    post,
    path = "/genres",
    tag = "genres",
    request_body = GenreForm,
    responses(
        (status = 201, description = "Genre created", body = GenreView),
        (status = 200, description = "A genre with this name already exists", body = GenreView),
        (status = 422, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_genre(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<(StatusCode, Json<GenreView>)> {
    let submission = Submission::<GenreForm>::from_json(json_body(body)?);
    let (genre, created) = state.services.genres.create(submission).await?;
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(genre.into())))
}

/// Rename a genre
#[utoipa::path(
    put,
    path = "/genres/{id}",
    tag = "genres",
    params(("id" = String, Path, description = "Genre ID")),
    request_body = GenreForm,
    responses(
        (status = 200, description = "Genre updated", body = GenreView),
        (status = 404, description = "Genre not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid input or name taken", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_genre(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<GenreView>> {
    let id = parse_id(EntityKind::Genre, &id)?;
    let submission = Submission::<GenreForm>::from_json(json_body(body)?);
    let genre = state.services.genres.replace(id, submission).await?;
    Ok(Json(genre.into()))
}

/// Delete a genre
#[utoipa::path(
    delete,
    path = "/genres/{id}",
    tag = "genres",
    params(("id" = String, Path, description = "Genre ID")),
    responses(
        (status = 204, description = "Genre deleted"),
        (status = 404, description = "Genre not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Books are still filed under this genre", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_genre(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(EntityKind::Genre, &id)?;
    state.services.genres.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/genres/{id}/dependents",
    tag = "genres",
    params(("id" = String, Path, description = "Genre ID")),
    responses(
        (status = 200, description = "Dependent records", body = Vec<DependentSummary>),
        (status = 404, description = "Genre not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn genre_dependents(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<DependentSummary>>> {
    let id = parse_id(EntityKind::Genre, &id)?;
    Ok(Json(state.services.genres.dependents(id).await?))
}
