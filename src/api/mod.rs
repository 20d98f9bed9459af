//! API handlers for the catalog REST endpoints

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod catalog;
pub mod genres;
pub mod health;
pub mod openapi;

use axum::{extract::rejection::JsonRejection, routing::get, Json, Router};
use serde_json::Value;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::{AppError, AppResult, FieldError},
    models::{EntityKind, RecordId},
    AppState,
};

/// A path id that does not parse cannot name a record
pub(crate) fn parse_id(kind: EntityKind, raw: &str) -> AppResult<RecordId> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("{} {} not found", kind, raw)))
}

/// Unwrap a JSON body; an unreadable body is a validation failure on the form
pub(crate) fn json_body(body: Result<Json<Value>, JsonRejection>) -> AppResult<Value> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(AppError::Validation(vec![FieldError::new(
            "form",
            rejection.body_text(),
        )])),
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Catalog index
        .route("/catalog", get(catalog::get_counts))
        // Authors
        .route("/authors", get(authors::list_authors).post(authors::create_author))
        .route(
            "/authors/:id",
            get(authors::get_author)
                .put(authors::update_author)
                .delete(authors::delete_author),
        )
        .route("/authors/:id/dependents", get(authors::author_dependents))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/form-options", get(books::book_form_options))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route("/books/:id/dependents", get(books::book_dependents))
        // Book instances
        .route(
            "/bookinstances",
            get(book_instances::list_book_instances).post(book_instances::create_book_instance),
        )
        .route(
            "/bookinstances/form-options",
            get(book_instances::book_instance_form_options),
        )
        .route(
            "/bookinstances/:id",
            get(book_instances::get_book_instance)
                .put(book_instances::update_book_instance)
                .delete(book_instances::delete_book_instance),
        )
        .route(
            "/bookinstances/:id/dependents",
            get(book_instances::book_instance_dependents),
        )
        // Genres
        .route("/genres", get(genres::list_genres).post(genres::create_genre))
        .route(
            "/genres/:id",
            get(genres::get_genre)
                .put(genres::update_genre)
                .delete(genres::delete_genre),
        )
        .route("/genres/:id/dependents", get(genres::genre_dependents))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
