//! Referential integrity checks.
//!
//! The store has no foreign keys, so every reference is checked here:
//! targets must exist before a write, and a record cannot be deleted while
//! anything still points at it. Check and write are separate store calls;
//! a concurrent writer can slip in between them.

use crate::{
    error::{AppError, AppResult, FieldError},
    models::{DependentSummary, Entity, EntityKind, RecordId, Reference},
    repository::{not_found, Repository},
    services::{
        catalog::CatalogService,
        validation::{self, Form, Submission},
    },
};

/// Outcome of a pre-delete check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteCheck {
    Allowed,
    Blocked(Vec<DependentSummary>),
}

#[derive(Clone)]
pub struct ReferentialGuard {
    repository: Repository,
    catalog: CatalogService,
}

impl ReferentialGuard {
    pub fn new(repository: Repository, catalog: CatalogService) -> Self {
        Self {
            repository,
            catalog,
        }
    }

    pub async fn can_delete(&self, kind: EntityKind, id: RecordId) -> AppResult<DeleteCheck> {
        let dependents = self.catalog.dependents_of(kind, id).await?;
        if dependents.is_empty() {
            Ok(DeleteCheck::Allowed)
        } else {
            Ok(DeleteCheck::Blocked(dependents))
        }
    }

    /// Look up each referenced record; a miss becomes an error on the referencing field
    pub async fn resolve_references(&self, references: &[Reference]) -> AppResult<Vec<FieldError>> {
        let mut errors = Vec::new();
        for reference in references {
            if !self.repository.exists(reference.kind, reference.id).await? {
                errors.push(FieldError::new(
                    reference.field,
                    format!("{} {} not found", reference.kind, reference.id),
                ));
            }
        }
        Ok(errors)
    }

    /// Sanitize a submission and resolve its references in one pass.
    ///
    /// Field errors and missing references are reported together.
    pub async fn admit<F: Form>(&self, submission: Submission<F>) -> AppResult<F::Data> {
        let references = submission.form.references();
        let validated = validation::sanitize_submission(submission);
        let missing = self.resolve_references(&references).await?;

        let result = validation::merge(validated, missing);
        if let Err(AppError::Validation(errors)) = &result {
            tracing::debug!("Submission rejected with {} field error(s)", errors.len());
        }
        result
    }

    /// Delete a record once nothing references it
    pub async fn guarded_delete<E: Entity>(&self, id: RecordId) -> AppResult<()> {
        if !self.repository.exists(E::KIND, id).await? {
            return Err(not_found(E::KIND, id));
        }

        match self.can_delete(E::KIND, id).await? {
            DeleteCheck::Allowed => self.repository.delete(E::KIND, id).await,
            DeleteCheck::Blocked(dependents) => {
                tracing::warn!(
                    "Refusing to delete {} {}: {} dependent record(s)",
                    E::KIND,
                    id,
                    dependents.len()
                );
                Err(AppError::DeleteBlocked {
                    kind: E::KIND,
                    id,
                    dependents,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{Author, AuthorData, BookForm, Genre, GenreData},
        repository::{MemoryStore, MockDocumentStore},
    };
    use std::sync::Arc;

    fn guard_over(repository: Repository) -> ReferentialGuard {
        ReferentialGuard::new(repository.clone(), CatalogService::new(repository))
    }

    fn memory_guard() -> (ReferentialGuard, Repository) {
        let repository = Repository::new(Arc::new(MemoryStore::new()));
        (guard_over(repository.clone()), repository)
    }

    #[tokio::test]
    async fn test_missing_references_are_field_errors() {
        let (guard, repository) = memory_guard();
        let genre = repository
            .create::<Genre>(GenreData { name: "Romance".to_string() })
            .await
            .unwrap();
        let missing = RecordId::new();

        let errors = guard
            .resolve_references(&[
                Reference { field: "author", kind: EntityKind::Author, id: missing },
                Reference { field: "genre", kind: EntityKind::Genre, id: genre.id },
            ])
            .await
            .unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "author");
        assert!(errors[0].message.contains(&missing.to_string()));
    }

    #[tokio::test]
    async fn test_admit_merges_field_and_reference_errors() {
        let (guard, _) = memory_guard();
        let form = BookForm {
            title: String::new(),
            author: RecordId::new().to_string(),
            summary: "...".to_string(),
            isbn: "123".to_string(),
            genre: vec![],
        };
        let err = guard.admit(Submission::from(form)).await.unwrap_err();
        let fields: Vec<_> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "author"]);
    }

    #[tokio::test]
    async fn test_admit_reports_shape_and_reference_errors_together() {
        let (guard, _) = memory_guard();
        let submission = Submission::<BookForm>::from_json(serde_json::json!({
            "title": "Emma",
            "author": RecordId::new().to_string(),
            "summary": { "text": "..." },
            "isbn": 9780141439587u64,
        }));
        let err = guard.admit(submission).await.unwrap_err();
        let fields: Vec<_> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["summary", "author"]);
    }

    #[tokio::test]
    async fn test_guarded_delete_missing_record() {
        let (guard, _) = memory_guard();
        let result = guard.guarded_delete::<Author>(RecordId::new()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unreferenced_author_is_deleted() {
        let (guard, repository) = memory_guard();
        let author = repository
            .create::<Author>(AuthorData {
                first_name: "Emily".to_string(),
                family_name: "Bronte".to_string(),
                date_of_birth: None,
                date_of_death: None,
            })
            .await
            .unwrap();

        assert_eq!(
            guard.can_delete(EntityKind::Author, author.id).await.unwrap(),
            DeleteCheck::Allowed
        );
        guard.guarded_delete::<Author>(author.id).await.unwrap();
        assert!(repository.find::<Author>(author.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_error_aborts_delete() {
        let mut store = MockDocumentStore::new();
        let id = RecordId::new();
        store.expect_get().returning(move |_, _| {
            Ok(Some(crate::repository::Document {
                id,
                body: serde_json::json!({ "name": "Poetry" }),
            }))
        });
        store
            .expect_list()
            .returning(|_, _, _| Err(AppError::Store("timeout".to_string())));
        store.expect_delete().never();

        let guard = guard_over(Repository::new(Arc::new(store)));
        let result = guard.guarded_delete::<Genre>(id).await;
        assert!(matches!(result, Err(AppError::Store(_))));
    }
}
