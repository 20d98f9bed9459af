//! Catalog query and aggregation service.
//!
//! Read-only composites built from the store: counts for the index page,
//! references resolved inline, dependents of a record, detail and list
//! views.

use std::collections::HashMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        book::{BookListEntry, BookSummary, BookWithRelations},
        book_instance::{BookInstanceListEntry, BookInstanceWithRelations},
        Author, Book, BookInstance, BookInstanceStatus, DependentSummary, EntityKind, Genre,
        RecordId, Relation,
    },
    repository::{Filter, Repository},
};

/// Record totals shown on the catalog index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CatalogCounts {
    pub book_count: u64,
    pub book_instance_count: u64,
    pub book_instance_available_count: u64,
    pub author_count: u64,
    pub genre_count: u64,
}

/// Any record with its references resolved
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum RelatedRecord {
    Author(Author),
    Book(BookWithRelations),
    BookInstance(BookInstanceWithRelations),
    Genre(Genre),
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorDetail {
    pub author: Author,
    pub books: Vec<BookSummary>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GenreDetail {
    pub genre: Genre,
    pub books: Vec<BookSummary>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetail {
    pub book: BookWithRelations,
    pub instances: Vec<BookInstance>,
}

/// Choices offered by the book form
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookFormOptions {
    pub authors: Vec<Author>,
    pub genres: Vec<Genre>,
}

/// Choices offered by the book instance form
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookInstanceFormOptions {
    pub books: Vec<Book>,
    pub statuses: Vec<BookInstanceStatus>,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Totals for every kind, queried concurrently
    pub async fn counts(&self) -> AppResult<CatalogCounts> {
        let (book_count, book_instance_count, book_instance_available_count, author_count, genre_count) =
            tokio::try_join!(
                self.repository.count(EntityKind::Book, &Filter::All),
                self.repository.count(EntityKind::BookInstance, &Filter::All),
                self.repository.book_instances_count_by_status(BookInstanceStatus::Available),
                self.repository.count(EntityKind::Author, &Filter::All),
                self.repository.count(EntityKind::Genre, &Filter::All),
            )?;

        Ok(CatalogCounts {
            book_count,
            book_instance_count,
            book_instance_available_count,
            author_count,
            genre_count,
        })
    }

    /// Every record that references `id`, across all relations targeting `kind`
    pub async fn dependents_of(
        &self,
        kind: EntityKind,
        id: RecordId,
    ) -> AppResult<Vec<DependentSummary>> {
        let mut dependents = Vec::new();
        for relation in Relation::pointing_at(kind) {
            let title_field = relation.from.title_field();
            let docs = self
                .repository
                .documents(relation.from, &relation.filter(id), Some(title_field))
                .await?;
            dependents.extend(docs.into_iter().map(|doc| DependentSummary {
                kind: relation.from,
                title: doc.text(title_field),
                id: doc.id,
            }));
        }
        Ok(dependents)
    }

    /// Fetch any record with its references resolved inline
    pub async fn with_relations(&self, kind: EntityKind, id: RecordId) -> AppResult<RelatedRecord> {
        Ok(match kind {
            EntityKind::Author => RelatedRecord::Author(self.repository.get::<Author>(id).await?),
            EntityKind::Book => RelatedRecord::Book(self.book_with_relations(id).await?),
            EntityKind::BookInstance => {
                RelatedRecord::BookInstance(self.book_instance_with_relations(id).await?)
            }
            EntityKind::Genre => RelatedRecord::Genre(self.repository.get::<Genre>(id).await?),
        })
    }

    pub async fn book_with_relations(&self, id: RecordId) -> AppResult<BookWithRelations> {
        let book = self.repository.get::<Book>(id).await?;
        self.resolve_book(book).await
    }

    pub async fn book_instance_with_relations(
        &self,
        id: RecordId,
    ) -> AppResult<BookInstanceWithRelations> {
        let instance = self.repository.get::<BookInstance>(id).await?;
        let book = match self.repository.find::<Book>(instance.book).await? {
            Some(book) => Some(self.resolve_book(book).await?),
            None => None,
        };
        Ok(BookInstanceWithRelations { instance, book })
    }

    async fn resolve_book(&self, book: Book) -> AppResult<BookWithRelations> {
        let author = self.repository.find::<Author>(book.author).await?;
        let mut genres = Vec::with_capacity(book.genre.len());
        for genre_id in &book.genre {
            // dangling ids are skipped, as a populate would
            if let Some(genre) = self.repository.find::<Genre>(*genre_id).await? {
                genres.push(genre);
            }
        }
        Ok(BookWithRelations {
            book,
            author,
            genres,
        })
    }

    // =========================================================================
    // Detail composites
    // =========================================================================

    pub async fn author_detail(&self, id: RecordId) -> AppResult<AuthorDetail> {
        let (author, books) = tokio::try_join!(
            self.repository.get::<Author>(id),
            self.repository.books_by_author(id),
        )?;
        Ok(AuthorDetail {
            author,
            books: books.iter().map(BookSummary::from).collect(),
        })
    }

    pub async fn genre_detail(&self, id: RecordId) -> AppResult<GenreDetail> {
        let (genre, books) = tokio::try_join!(
            self.repository.get::<Genre>(id),
            self.repository.books_by_genre(id),
        )?;
        Ok(GenreDetail {
            genre,
            books: books.iter().map(BookSummary::from).collect(),
        })
    }

    pub async fn book_detail(&self, id: RecordId) -> AppResult<BookDetail> {
        let (book, instances) = tokio::try_join!(
            self.book_with_relations(id),
            self.repository.book_instances_of_book(id),
        )?;
        Ok(BookDetail { book, instances })
    }

    // =========================================================================
    // List composites
    // =========================================================================

    /// All books by title, each with its author
    pub async fn book_list(&self) -> AppResult<Vec<BookListEntry>> {
        let (books, authors) = tokio::try_join!(
            self.repository.books_list(),
            self.repository.authors_list(),
        )?;
        let authors: HashMap<RecordId, Author> =
            authors.into_iter().map(|a| (a.id, a)).collect();

        Ok(books
            .into_iter()
            .map(|book| BookListEntry {
                id: book.id,
                author: authors.get(&book.author).cloned(),
                title: book.title,
            })
            .collect())
    }

    /// All copies, each with its book
    pub async fn book_instance_list(&self) -> AppResult<Vec<BookInstanceListEntry>> {
        let (instances, books) = tokio::try_join!(
            self.repository.book_instances_list(),
            self.repository.books_list(),
        )?;
        let books: HashMap<RecordId, Book> = books.into_iter().map(|b| (b.id, b)).collect();

        Ok(instances
            .into_iter()
            .map(|instance| BookInstanceListEntry {
                book: books.get(&instance.book).cloned(),
                instance,
            })
            .collect())
    }

    // =========================================================================
    // Form options
    // =========================================================================

    pub async fn book_form_options(&self) -> AppResult<BookFormOptions> {
        let (authors, genres) = tokio::try_join!(
            self.repository.authors_list(),
            self.repository.genres_list(),
        )?;
        Ok(BookFormOptions { authors, genres })
    }

    pub async fn book_instance_form_options(&self) -> AppResult<BookInstanceFormOptions> {
        Ok(BookInstanceFormOptions {
            books: self.repository.books_list().await?,
            statuses: BookInstanceStatus::ALL.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AppError,
        models::{AuthorData, BookData, BookInstanceData, GenreData},
        repository::{MemoryStore, MockDocumentStore},
    };
    use std::sync::Arc;

    async fn seeded() -> (CatalogService, Author, Genre, Book) {
        let repository = Repository::new(Arc::new(MemoryStore::new()));
        let author = repository
            .create::<Author>(AuthorData {
                first_name: "Jane".to_string(),
                family_name: "Austen".to_string(),
                date_of_birth: None,
                date_of_death: None,
            })
            .await
            .unwrap();
        let genre = repository
            .create::<Genre>(GenreData { name: "Romance".to_string() })
            .await
            .unwrap();
        let book = repository
            .create::<Book>(BookData {
                title: "Emma".to_string(),
                author: author.id,
                summary: "Matchmaking".to_string(),
                isbn: "9780141439587".to_string(),
                genre: vec![genre.id],
            })
            .await
            .unwrap();
        for (imprint, status) in [
            ("Penguin", BookInstanceStatus::Available),
            ("Murray", BookInstanceStatus::Loaned),
        ] {
            repository
                .create::<BookInstance>(BookInstanceData {
                    book: book.id,
                    imprint: imprint.to_string(),
                    status,
                    due_back: chrono::Utc::now(),
                })
                .await
                .unwrap();
        }
        (CatalogService::new(repository), author, genre, book)
    }

    #[tokio::test]
    async fn test_counts() {
        let (catalog, ..) = seeded().await;
        let counts = catalog.counts().await.unwrap();
        assert_eq!(
            counts,
            CatalogCounts {
                book_count: 1,
                book_instance_count: 2,
                book_instance_available_count: 1,
                author_count: 1,
                genre_count: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_dependents_of_each_kind() {
        let (catalog, author, genre, book) = seeded().await;

        let of_author = catalog.dependents_of(EntityKind::Author, author.id).await.unwrap();
        assert_eq!(of_author.len(), 1);
        assert_eq!(of_author[0].title, "Emma");

        let of_genre = catalog.dependents_of(EntityKind::Genre, genre.id).await.unwrap();
        assert_eq!(of_genre[0].id, book.id);

        let of_book = catalog.dependents_of(EntityKind::Book, book.id).await.unwrap();
        let imprints: Vec<_> = of_book.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(imprints, vec!["Murray", "Penguin"]);
        assert!(of_book.iter().all(|d| d.kind == EntityKind::BookInstance));
    }

    #[tokio::test]
    async fn test_book_instance_with_relations_resolves_chain() {
        let (catalog, author, genre, book) = seeded().await;
        let instance_id = catalog.book_instance_list().await.unwrap()[0].instance.id;

        let resolved = catalog.book_instance_with_relations(instance_id).await.unwrap();
        let book_rel = resolved.book.unwrap();
        assert_eq!(book_rel.book.id, book.id);
        assert_eq!(book_rel.author.unwrap().id, author.id);
        assert_eq!(book_rel.genres, vec![genre]);
    }

    #[tokio::test]
    async fn test_detail_composites() {
        let (catalog, author, genre, book) = seeded().await;

        let detail = catalog.author_detail(author.id).await.unwrap();
        assert_eq!(detail.books, vec![BookSummary::from(&book)]);

        let detail = catalog.genre_detail(genre.id).await.unwrap();
        assert_eq!(detail.books.len(), 1);

        let detail = catalog.book_detail(book.id).await.unwrap();
        assert_eq!(detail.instances.len(), 2);

        let missing = catalog.author_detail(RecordId::new()).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_with_relations_dispatch() {
        let (catalog, _, genre, book) = seeded().await;
        match catalog.with_relations(EntityKind::Book, book.id).await.unwrap() {
            RelatedRecord::Book(resolved) => assert_eq!(resolved.genres, vec![genre]),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut store = MockDocumentStore::new();
        store
            .expect_count()
            .returning(|_, _| Err(AppError::Store("connection reset".to_string())));
        let catalog = CatalogService::new(Repository::new(Arc::new(store)));

        let result = catalog.counts().await;
        assert!(matches!(result, Err(AppError::Store(_))));
    }
}
