//! Author endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{book::BookSummary, Author, AuthorForm, DependentSummary, EntityKind},
    services::validation::Submission,
    AppState,
};

use super::{json_body, parse_id};

/// Author as returned by the API, derived fields included
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthorView {
    pub id: String,
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
    /// "family_name, first_name"
    pub full_name: String,
    /// "Dec 16, 1775 - Jul 18, 1817"
    pub lifespan: String,
    pub date_of_birth_iso: String,
    pub date_of_death_iso: String,
    pub url: String,
}

impl From<Author> for AuthorView {
    fn from(author: Author) -> Self {
        Self {
            id: author.id.to_string(),
            full_name: author.full_name(),
            lifespan: author.lifespan(),
            date_of_birth_iso: author.date_of_birth_iso(),
            date_of_death_iso: author.date_of_death_iso(),
            url: author.url(),
            first_name: author.first_name,
            family_name: author.family_name,
            date_of_birth: author.date_of_birth,
            date_of_death: author.date_of_death,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthorDetailResponse {
    pub author: AuthorView,
    /// Books by this author
    pub books: Vec<BookSummary>,
}

/// List all authors
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    responses(
        (status = 200, description = "Authors ordered by family name", body = Vec<AuthorView>)
    )
)]
pub async fn list_authors(State(state): State<AppState>) -> AppResult<Json<Vec<AuthorView>>> {
    let authors = state.services.authors.list().await?;
    Ok(Json(authors.into_iter().map(AuthorView::from).collect()))
}

/// Get an author with their books
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = String, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author details", body = AuthorDetailResponse),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<AuthorDetailResponse>> {
    let id = parse_id(EntityKind::Author, &id)?;
    let detail = state.services.authors.detail(id).await?;
    Ok(Json(AuthorDetailResponse {
        author: detail.author.into(),
        books: detail.books,
    }))
}

/// Create an author
#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    request_body = AuthorForm,
    responses(
        (status = 201, description = "Author created", body = AuthorView),
        (status = 422, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_author(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<(StatusCode, Json<AuthorView>)> {
    let submission = Submission::<AuthorForm>::from_json(json_body(body)?);
    let author = state.services.authors.create(submission).await?;
    Ok((StatusCode::CREATED, Json(author.into())))
}

/// Replace an author
#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = String, Path, description = "Author ID")),
    request_body = AuthorForm,
    responses(
        (status = 200, description = "Author updated", body = AuthorView),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_author(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<AuthorView>> {
    let id = parse_id(EntityKind::Author, &id)?;
    let submission = Submission::<AuthorForm>::from_json(json_body(body)?);
    let author = state.services.authors.replace(id, submission).await?;
    Ok(Json(author.into()))
}

/// Delete an author
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = String, Path, description = "Author ID")),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Author still has books", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_author(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(EntityKind::Author, &id)?;
    state.services.authors.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Books that would block deleting this author
#[utoipa::path(
    get,
    path = "/authors/{id}/dependents",
    tag = "authors",
    params(("id" = String, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Dependent records", body = Vec<DependentSummary>),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn author_dependents(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<DependentSummary>>> {
    let id = parse_id(EntityKind::Author, &id)?;
    Ok(Json(state.services.authors.dependents(id).await?))
}
