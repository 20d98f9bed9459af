//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{authors, book_instances, books, catalog, genres, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Local Library API",
        version = "0.1.0",
        description = "Catalog of authors, books, book instances and genres"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Catalog
        catalog::get_counts,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        authors::author_dependents,
        // Books
        books::list_books,
        books::get_book,
        books::book_form_options,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::book_dependents,
        // Book instances
        book_instances::list_book_instances,
        book_instances::get_book_instance,
        book_instances::book_instance_form_options,
        book_instances::create_book_instance,
        book_instances::update_book_instance,
        book_instances::delete_book_instance,
        book_instances::book_instance_dependents,
        // Genres
        genres::list_genres,
        genres::get_genre,
        genres::create_genre,
        genres::update_genre,
        genres::delete_genre,
        genres::genre_dependents,
    ),
    components(
        schemas(
            // Forms
            crate::models::AuthorForm,
            crate::models::BookForm,
            crate::models::BookInstanceForm,
            crate::models::GenreForm,
            crate::models::BookInstanceStatus,
            crate::models::EntityKind,
            crate::models::RecordId,
            crate::models::DependentSummary,
            crate::models::book::BookSummary,
            // Views
            authors::AuthorView,
            authors::AuthorDetailResponse,
            books::BookView,
            books::BookWithRelationsView,
            books::BookListItem,
            books::BookDetailResponse,
            books::BookFormOptionsResponse,
            book_instances::BookInstanceView,
            book_instances::BookInstanceListItem,
            book_instances::BookInstanceDetailResponse,
            book_instances::BookInstanceFormOptionsResponse,
            genres::GenreView,
            genres::GenreDetailResponse,
            crate::services::catalog::CatalogCounts,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::FieldError,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Catalog overview"),
        (name = "authors", description = "Author management"),
        (name = "books", description = "Book management"),
        (name = "bookinstances", description = "Book copy management"),
        (name = "genres", description = "Genre management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
