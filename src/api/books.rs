//! Book endpoints

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
    models::{book::BookWithRelations, Book, BookForm, DependentSummary, EntityKind},
    services::validation::Submission,
    AppState,
};

use super::{
    authors::AuthorView, book_instances::BookInstanceView, genres::GenreView, json_body, parse_id,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct BookView {
    pub id: String,
    pub title: String,
    /// Author ID
    pub author: String,
    pub summary: String,
    pub isbn: String,
    /// Genre IDs
    pub genre: Vec<String>,
    pub url: String,
}

impl From<Book> for BookView {
    fn from(book: Book) -> Self {
        Self {
            id: book.id.to_string(),
            url: book.url(),
            author: book.author.to_string(),
            genre: book.genre.iter().map(ToString::to_string).collect(),
            title: book.title,
            summary: book.summary,
            isbn: book.isbn,
        }
    }
}

/// Book with its author and genres inline
#[derive(Debug, Serialize, ToSchema)]
pub struct BookWithRelationsView {
    pub book: BookView,
    pub author: Option<AuthorView>,
    pub genres: Vec<GenreView>,
}

impl From<BookWithRelations> for BookWithRelationsView {
    fn from(resolved: BookWithRelations) -> Self {
        Self {
            book: resolved.book.into(),
            author: resolved.author.map(AuthorView::from),
            genres: resolved.genres.into_iter().map(GenreView::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookListItem {
    pub id: String,
    pub title: String,
    pub url: String,
    pub author: Option<AuthorView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookDetailResponse {
    pub book: BookWithRelationsView,
    /// Every copy of this book
    pub instances: Vec<BookInstanceView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookFormOptionsResponse {
    pub authors: Vec<AuthorView>,
    pub genres: Vec<GenreView>,
}

/// List all books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "Books ordered by title", body = Vec<BookListItem>)
    )
)]
pub async fn list_books(State(state): State<AppState>) -> AppResult<Json<Vec<BookListItem>>> {
    let books = state.services.books.list().await?;
    Ok(Json(
        books
            .into_iter()
            .map(|entry| BookListItem {
                id: entry.id.to_string(),
                url: EntityKind::Book.url_for(entry.id),
                title: entry.title,
                author: entry.author.map(AuthorView::from),
            })
            .collect(),
    ))
}

/// Get a book with its author, genres and copies
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookDetailResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<BookDetailResponse>> {
    let id = parse_id(EntityKind::Book, &id)?;
    let detail = state.services.books.detail(id).await?;
    Ok(Json(BookDetailResponse {
        book: detail.book.into(),
        instances: detail.instances.into_iter().map(BookInstanceView::from).collect(),
    }))
}

/// Authors and genres to choose from when editing a book
#[utoipa::path(
    get,
    path = "/books/form-options",
    tag = "books",
    responses(
        (status = 200, description = "Form choices", body = BookFormOptionsResponse)
    )
)]
pub async fn book_form_options(
    State(state): State<AppState>,
) -> AppResult<Json<BookFormOptionsResponse>> {
    let options = state.services.books.form_options().await?;
    Ok(Json(BookFormOptionsResponse {
        authors: options.authors.into_iter().map(AuthorView::from).collect(),
        genres: options.genres.into_iter().map(GenreView::from).collect(),
    }))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = BookForm,
    responses(
        (status = 201, description = "Book created", body = BookView),
        (status = 422, description = "Invalid input or unknown author/genre", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<(StatusCode, Json<BookView>)> {
    let submission = Submission::<BookForm>::from_json(json_body(body)?);
    let book = state.services.books.create(submission).await?;
    Ok((StatusCode::CREATED, Json(book.into())))
}

/// Replace a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    request_body = BookForm,
    responses(
        (status = 200, description = "Book updated", body = BookView),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid input or unknown author/genre", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<BookView>> {
    let id = parse_id(EntityKind::Book, &id)?;
    let submission = Submission::<BookForm>::from_json(json_body(body)?);
    let book = state.services.books.replace(id, submission).await?;
    Ok(Json(book.into()))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Copies of this book still exist", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(EntityKind::Book, &id)?;
    state.services.books.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/books/{id}/dependents",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Dependent records", body = Vec<DependentSummary>),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn book_dependents(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<DependentSummary>>> {
    let id = parse_id(EntityKind::Book, &id)?;
    Ok(Json(state.services.books.dependents(id).await?))
}
