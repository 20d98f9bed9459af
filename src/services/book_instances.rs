//! Book instances service

use crate::{
    error::AppResult,
    models::{
        book_instance::{BookInstanceListEntry, BookInstanceWithRelations},
        BookInstance, BookInstanceForm, DependentSummary, EntityKind, RecordId,
    },
    repository::Repository,
    services::{
        catalog::{BookInstanceFormOptions, CatalogService},
        guard::ReferentialGuard,
        validation::Submission,
    },
};

#[derive(Clone)]
pub struct BookInstancesService {
    repository: Repository,
    catalog: CatalogService,
    guard: ReferentialGuard,
}

impl BookInstancesService {
    pub fn new(repository: Repository, catalog: CatalogService, guard: ReferentialGuard) -> Self {
        Self {
            repository,
            catalog,
            guard,
        }
    }

    pub async fn list(&self) -> AppResult<Vec<BookInstanceListEntry>> {
        self.catalog.book_instance_list().await
    }

    /// Copy with its book, author and genres resolved
    pub async fn detail(&self, id: RecordId) -> AppResult<BookInstanceWithRelations> {
        self.catalog.book_instance_with_relations(id).await
    }

    pub async fn form_options(&self) -> AppResult<BookInstanceFormOptions> {
        self.catalog.book_instance_form_options().await
    }

    pub async fn create(&self, form: impl Into<Submission<BookInstanceForm>>) -> AppResult<BookInstance> {
        let data = self.guard.admit::<BookInstanceForm>(form.into()).await?;
        let instance = self.repository.create::<BookInstance>(data).await?;
        tracing::info!(
            "Created book instance {} of book {} ({})",
            instance.id,
            instance.book,
            instance.status
        );
        Ok(instance)
    }

    pub async fn replace(
        &self,
        id: RecordId,
        form: impl Into<Submission<BookInstanceForm>>,
    ) -> AppResult<BookInstance> {
        self.repository.get::<BookInstance>(id).await?;
        let data = self.guard.admit::<BookInstanceForm>(form.into()).await?;
        let instance = self.repository.replace::<BookInstance>(id, data).await?;
        tracing::info!("Updated book instance {}", id);
        Ok(instance)
    }

    /// Nothing references a copy, so the guard always allows this
    pub async fn delete(&self, id: RecordId) -> AppResult<()> {
        self.guard.guarded_delete::<BookInstance>(id).await?;
        tracing::info!("Deleted book instance {}", id);
        Ok(())
    }

    pub async fn dependents(&self, id: RecordId) -> AppResult<Vec<DependentSummary>> {
        self.repository.get::<BookInstance>(id).await?;
        self.catalog.dependents_of(EntityKind::BookInstance, id).await
    }
}
