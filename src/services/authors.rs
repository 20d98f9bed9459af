//! Authors service

use crate::{
    error::AppResult,
    models::{Author, AuthorForm, DependentSummary, EntityKind, RecordId},
    repository::Repository,
    services::{
        catalog::{AuthorDetail, CatalogService},
        guard::ReferentialGuard,
        validation::Submission,
    },
};

#[derive(Clone)]
pub struct AuthorsService {
    repository: Repository,
    catalog: CatalogService,
    guard: ReferentialGuard,
}

impl AuthorsService {
    pub fn new(repository: Repository, catalog: CatalogService, guard: ReferentialGuard) -> Self {
        Self {
            repository,
            catalog,
            guard,
        }
    }

    /// All authors ordered by family name
    pub async fn list(&self) -> AppResult<Vec<Author>> {
        self.repository.authors_list().await
    }

    pub async fn get(&self, id: RecordId) -> AppResult<Author> {
        self.repository.get::<Author>(id).await
    }

    /// Author with the books they wrote
    pub async fn detail(&self, id: RecordId) -> AppResult<AuthorDetail> {
        self.catalog.author_detail(id).await
    }

    pub async fn create(&self, form: impl Into<Submission<AuthorForm>>) -> AppResult<Author> {
        let data = self.guard.admit::<AuthorForm>(form.into()).await?;
        let author = self.repository.create::<Author>(data).await?;
        tracing::info!("Created author {} ({})", author.id, author.full_name());
        Ok(author)
    }

    /// Replace every field of an existing author
    pub async fn replace(
        &self,
        id: RecordId,
        form: impl Into<Submission<AuthorForm>>,
    ) -> AppResult<Author> {
        self.repository.get::<Author>(id).await?;
        let data = self.guard.admit::<AuthorForm>(form.into()).await?;
        let author = self.repository.replace::<Author>(id, data).await?;
        tracing::info!("Updated author {}", id);
        Ok(author)
    }

    /// Delete an author who has no books
    pub async fn delete(&self, id: RecordId) -> AppResult<()> {
        self.guard.guarded_delete::<Author>(id).await?;
        tracing::info!("Deleted author {}", id);
        Ok(())
    }

    /// Books still written by this author
    pub async fn dependents(&self, id: RecordId) -> AppResult<Vec<DependentSummary>> {
        self.repository.get::<Author>(id).await?;
        self.catalog.dependents_of(EntityKind::Author, id).await
    }
}
