//! Genres service
//!
//! Genre names are unique. Uniqueness is checked before the write, so two
//! concurrent creates of the same name can both succeed.

use crate::{
    error::{AppError, AppResult, FieldError},
    models::{DependentSummary, EntityKind, Genre, GenreForm, RecordId},
    repository::Repository,
    services::{
        catalog::{CatalogService, GenreDetail},
        guard::ReferentialGuard,
        validation::Submission,
    },
};

#[derive(Clone)]
pub struct GenresService {
    repository: Repository,
    catalog: CatalogService,
    guard: ReferentialGuard,
}

impl GenresService {
    pub fn new(repository: Repository, catalog: CatalogService, guard: ReferentialGuard) -> Self {
        Self {
            repository,
            catalog,
            guard,
        }
    }

    /// All genres ordered by name
    pub async fn list(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres_list().await
    }

    pub async fn get(&self, id: RecordId) -> AppResult<Genre> {
        self.repository.get::<Genre>(id).await
    }

    /// Genre with the books filed under it
    pub async fn detail(&self, id: RecordId) -> AppResult<GenreDetail> {
        self.catalog.genre_detail(id).await
    }

    /// Create a genre, or return the existing one with the same name.
    ///
    /// The flag is true when a new record was written.
    pub async fn create(&self, form: impl Into<Submission<GenreForm>>) -> AppResult<(Genre, bool)> {
        let data = self.guard.admit::<GenreForm>(form.into()).await?;

        if let Some(existing) = self.repository.genres_find_by_name(&data.name, None).await? {
            tracing::debug!("Genre '{}' already exists as {}", data.name, existing.id);
            return Ok((existing, false));
        }

        let genre = self.repository.create::<Genre>(data).await?;
        tracing::info!("Created genre {} ({})", genre.id, genre.name);
        Ok((genre, true))
    }

    /// Rename an existing genre; the new name must not belong to another genre
    pub async fn replace(
        &self,
        id: RecordId,
        form: impl Into<Submission<GenreForm>>,
    ) -> AppResult<Genre> {
        self.repository.get::<Genre>(id).await?;
        let data = self.guard.admit::<GenreForm>(form.into()).await?;

        if let Some(other) = self.repository.genres_find_by_name(&data.name, Some(id)).await? {
            return Err(AppError::Validation(vec![FieldError::new(
                "name",
                format!("Genre '{}' already exists ({})", other.name, other.id),
            )]));
        }

        let genre = self.repository.replace::<Genre>(id, data).await?;
        tracing::info!("Updated genre {}", id);
        Ok(genre)
    }

    /// Delete a genre no book is filed under
    pub async fn delete(&self, id: RecordId) -> AppResult<()> {
        self.guard.guarded_delete::<Genre>(id).await?;
        tracing::info!("Deleted genre {}", id);
        Ok(())
    }

    pub async fn dependents(&self, id: RecordId) -> AppResult<Vec<DependentSummary>> {
        self.repository.get::<Genre>(id).await?;
        self.catalog.dependents_of(EntityKind::Genre, id).await
    }
}
