//! Business logic services

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod catalog;
pub mod genres;
pub mod guard;
pub mod validation;

use crate::{error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub guard: guard::ReferentialGuard,
    pub authors: authors::AuthorsService,
    pub books: books::BooksService,
    pub book_instances: book_instances::BookInstancesService,
    pub genres: genres::GenresService,
    repository: Repository,
}

impl Services {
    /// Create all services over the given repository
    pub fn new(repository: Repository) -> Self {
        let catalog = catalog::CatalogService::new(repository.clone());
        let guard = guard::ReferentialGuard::new(repository.clone(), catalog.clone());

        Self {
            authors: authors::AuthorsService::new(repository.clone(), catalog.clone(), guard.clone()),
            books: books::BooksService::new(repository.clone(), catalog.clone(), guard.clone()),
            book_instances: book_instances::BookInstancesService::new(
                repository.clone(),
                catalog.clone(),
                guard.clone(),
            ),
            genres: genres::GenresService::new(repository.clone(), catalog.clone(), guard.clone()),
            catalog,
            guard,
            repository,
        }
    }

    /// Whether the store answers
    pub async fn ready(&self) -> AppResult<()> {
        self.repository.store().ping().await
    }

    /// Release the store at shutdown
    pub async fn shutdown(&self) {
        self.repository.store().close().await;
    }
}
