//! Books service

use crate::{
    error::AppResult,
    models::{
        book::{BookListEntry, BookWithRelations},
        Book, BookForm, DependentSummary, EntityKind, RecordId,
    },
    repository::Repository,
    services::{
        catalog::{BookDetail, BookFormOptions, CatalogService},
        guard::ReferentialGuard,
        validation::Submission,
    },
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
    catalog: CatalogService,
    guard: ReferentialGuard,
}

impl BooksService {
    pub fn new(repository: Repository, catalog: CatalogService, guard: ReferentialGuard) -> Self {
        Self {
            repository,
            catalog,
            guard,
        }
    }

    /// All books by title, with authors resolved
    pub async fn list(&self) -> AppResult<Vec<BookListEntry>> {
        self.catalog.book_list().await
    }

    pub async fn get(&self, id: RecordId) -> AppResult<BookWithRelations> {
        self.catalog.book_with_relations(id).await
    }

    /// Book with author, genres and every copy
    pub async fn detail(&self, id: RecordId) -> AppResult<BookDetail> {
        self.catalog.book_detail(id).await
    }

    pub async fn form_options(&self) -> AppResult<BookFormOptions> {
        self.catalog.book_form_options().await
    }

    /// Create a book; the author and every genre must exist
    pub async fn create(&self, form: impl Into<Submission<BookForm>>) -> AppResult<Book> {
        let data = self.guard.admit::<BookForm>(form.into()).await?;
        let book = self.repository.create::<Book>(data).await?;
        tracing::info!("Created book {} ({})", book.id, book.title);
        Ok(book)
    }

    pub async fn replace(
        &self,
        id: RecordId,
        form: impl Into<Submission<BookForm>>,
    ) -> AppResult<Book> {
        self.repository.get::<Book>(id).await?;
        let data = self.guard.admit::<BookForm>(form.into()).await?;
        let book = self.repository.replace::<Book>(id, data).await?;
        tracing::info!("Updated book {}", id);
        Ok(book)
    }

    /// Delete a book with no remaining copies
    pub async fn delete(&self, id: RecordId) -> AppResult<()> {
        self.guard.guarded_delete::<Book>(id).await?;
        tracing::info!("Deleted book {}", id);
        Ok(())
    }

    pub async fn dependents(&self, id: RecordId) -> AppResult<Vec<DependentSummary>> {
        self.repository.get::<Book>(id).await?;
        self.catalog.dependents_of(EntityKind::Book, id).await
    }
}
