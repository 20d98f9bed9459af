//! Book instance endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{BookInstance, BookInstanceForm, BookInstanceStatus, DependentSummary, EntityKind},
    services::validation::Submission,
    AppState,
};

use super::{
    books::{BookView, BookWithRelationsView},
    json_body, parse_id,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct BookInstanceView {
    pub id: String,
    /// Book ID
    pub book: String,
    pub imprint: String,
    pub status: BookInstanceStatus,
    pub due_back: DateTime<Utc>,
    /// "Oct 16, 2026, 3:04 PM"
    pub due_back_formatted: String,
    pub due_back_iso: String,
    pub url: String,
}

impl From<BookInstance> for BookInstanceView {
    fn from(instance: BookInstance) -> Self {
        Self {
            id: instance.id.to_string(),
            book: instance.book.to_string(),
            due_back_formatted: instance.due_back_formatted(),
            due_back_iso: instance.due_back_iso(),
            url: instance.url(),
            imprint: instance.imprint,
            status: instance.status,
            due_back: instance.due_back,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookInstanceListItem {
    pub instance: BookInstanceView,
    pub book: Option<BookView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookInstanceDetailResponse {
    pub instance: BookInstanceView,
    pub book: Option<BookWithRelationsView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookInstanceFormOptionsResponse {
    pub books: Vec<BookView>,
    pub statuses: Vec<BookInstanceStatus>,
}

/// List all book instances
#[utoipa::path(
    get,
    path = "/bookinstances",
    tag = "bookinstances",
    responses(
        (status = 200, description = "Every copy with its book", body = Vec<BookInstanceListItem>)
    )
)]
pub async fn list_book_instances(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<BookInstanceListItem>>> {
    let instances = state.services.book_instances.list().await?;
    Ok(Json(
        instances
            .into_iter()
            .map(|entry| BookInstanceListItem {
                instance: entry.instance.into(),
                book: entry.book.map(BookView::from),
            })
            .collect(),
    ))
}

/// Get a book instance with its book resolved
#[utoipa::path(
    get,
    path = "/bookinstances/{id}",
    tag = "bookinstances",
    params(("id" = String, Path, description = "Book instance ID")),
    responses(
        (status = 200, description = "Book instance details", body = BookInstanceDetailResponse),
        (status = 404, description = "Book instance not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book_instance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<BookInstanceDetailResponse>> {
    let id = parse_id(EntityKind::BookInstance, &id)?;
    let detail = state.services.book_instances.detail(id).await?;
    Ok(Json(BookInstanceDetailResponse {
        instance: detail.instance.into(),
        book: detail.book.map(BookWithRelationsView::from),
    }))
}

/// Books and statuses to choose from when editing a copy
#[utoipa::path(
    get,
    path = "/bookinstances/form-options",
    tag = "bookinstances",
    responses(
        (status = 200, description = "Form choices", body = BookInstanceFormOptionsResponse)
    )
)]
pub async fn book_instance_form_options(
    State(state): State<AppState>,
) -> AppResult<Json<BookInstanceFormOptionsResponse>> {
    let options = state.services.book_instances.form_options().await?;
    Ok(Json(BookInstanceFormOptionsResponse {
        books: options.books.into_iter().map(BookView::from).collect(),
        statuses: options.statuses,
    }))
}

/// Create a book instance
#[utoipa::path(
    post,
    path = "/bookinstances",
    tag = "bookinstances",
    request_body = BookInstanceForm,
    responses(
        (status = 201, description = "Book instance created", body = BookInstanceView),
        (status = 422, description = "Invalid input or unknown book", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book_instance(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<(StatusCode, Json<BookInstanceView>)> {
    let submission = Submission::<BookInstanceForm>::from_json(json_body(body)?);
    let instance = state.services.book_instances.create(submission).await?;
    Ok((StatusCode::CREATED, Json(instance.into())))
}

/// Replace a book instance
#[utoipa::path(
    put,
    path = "/bookinstances/{id}",
    tag = "bookinstances",
    params(("id" = String, Path, description = "Book instance ID")),
    request_body = BookInstanceForm,
    responses(
        (status = 200, description = "Book instance updated", body = BookInstanceView),
        (status = 404, description = "Book instance not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid input or unknown book", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book_instance(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<BookInstanceView>> {
    let id = parse_id(EntityKind::BookInstance, &id)?;
    let submission = Submission::<BookInstanceForm>::from_json(json_body(body)?);
    let instance = state.services.book_instances.replace(id, submission).await?;
    Ok(Json(instance.into()))
}

/// Delete a book instance
#[utoipa::path(
    delete,
    path = "/bookinstances/{id}",
    tag = "bookinstances",
    params(("id" = String, Path, description = "Book instance ID")),
    responses(
        (status = 204, description = "Book instance deleted"),
        (status = 404, description = "Book instance not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book_instance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(EntityKind::BookInstance, &id)?;
    state.services.book_instances.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/bookinstances/{id}/dependents",
    tag = "bookinstances",
    params(("id" = String, Path, description = "Book instance ID")),
    responses(
        (status = 200, description = "Always empty: nothing references a copy", body = Vec<DependentSummary>),
        (status = 404, description = "Book instance not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn book_instance_dependents(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<DependentSummary>>> {
    let id = parse_id(EntityKind::BookInstance, &id)?;
    Ok(Json(state.services.book_instances.dependents(id).await?))
}
