//! Catalog scenarios against the in-memory store

use std::sync::Arc;

use chrono::NaiveDate;
use local_library::{
    error::AppError,
    models::{
        AuthorForm, BookForm, BookInstanceForm, BookInstanceStatus, EntityKind, GenreForm,
        RecordId,
    },
    repository::{MemoryStore, Repository},
    services::{catalog::RelatedRecord, guard::DeleteCheck, Services},
};

fn services() -> Services {
    Services::new(Repository::new(Arc::new(MemoryStore::new())))
}

fn author_form(first: &str, family: &str) -> AuthorForm {
    AuthorForm {
        first_name: first.to_string(),
        family_name: family.to_string(),
        date_of_birth: None,
        date_of_death: None,
    }
}

fn genre_form(name: &str) -> GenreForm {
    GenreForm {
        name: name.to_string(),
    }
}

fn book_form(title: &str, author: RecordId, genre: Vec<RecordId>) -> BookForm {
    BookForm {
        title: title.to_string(),
        author: author.to_string(),
        summary: format!("Summary of {}", title),
        isbn: "9780141439587".to_string(),
        genre: genre.iter().map(ToString::to_string).collect(),
    }
}

#[tokio::test]
async fn test_austen_scenario() {
    let services = services();

    let austen = services
        .authors
        .create(AuthorForm {
            first_name: " Jane ".to_string(),
            family_name: "Austen".to_string(),
            date_of_birth: Some("1775-12-16".to_string()),
            date_of_death: Some("1817-07-18".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(austen.full_name(), "Austen, Jane");
    assert_eq!(austen.lifespan(), "Dec 16, 1775 - Jul 18, 1817");
    assert_eq!(austen.date_of_birth, NaiveDate::from_ymd_opt(1775, 12, 16));

    let (romance, _) = services.genres.create(genre_form("Romance")).await.unwrap();
    let emma = services
        .books
        .create(book_form("Emma", austen.id, vec![romance.id]))
        .await
        .unwrap();

    let copy = services
        .book_instances
        .create(BookInstanceForm {
            book: emma.id.to_string(),
            imprint: "John Murray, 1815".to_string(),
            status: Some("Available".to_string()),
            due_back: None,
        })
        .await
        .unwrap();
    assert_eq!(copy.status, BookInstanceStatus::Available);

    let counts = services.catalog.counts().await.unwrap();
    assert_eq!(counts.author_count, 1);
    assert_eq!(counts.book_count, 1);
    assert_eq!(counts.book_instance_count, 1);
    assert_eq!(counts.book_instance_available_count, 1);
    assert_eq!(counts.genre_count, 1);

    let detail = services.authors.detail(austen.id).await.unwrap();
    assert_eq!(detail.books.len(), 1);
    assert_eq!(detail.books[0].title, "Emma");

    // the author is blocked by Emma, Emma by its copy
    let err = services.authors.delete(austen.id).await.unwrap_err();
    match err {
        AppError::DeleteBlocked { kind, dependents, .. } => {
            assert_eq!(kind, EntityKind::Author);
            assert_eq!(dependents.len(), 1);
            assert_eq!(dependents[0].id, emma.id);
            assert_eq!(dependents[0].title, "Emma");
        }
        other => panic!("expected DeleteBlocked, got {:?}", other),
    }
    assert!(matches!(
        services.books.delete(emma.id).await,
        Err(AppError::DeleteBlocked { .. })
    ));

    // unwinding in dependency order succeeds
    services.book_instances.delete(copy.id).await.unwrap();
    services.books.delete(emma.id).await.unwrap();
    services.authors.delete(austen.id).await.unwrap();
    assert!(matches!(
        services.authors.get(austen.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_book_with_missing_author_is_not_written() {
    let services = services();
    let missing = RecordId::new();

    let err = services
        .books
        .create(book_form("Orphan", missing, vec![]))
        .await
        .unwrap_err();
    let fields: Vec<_> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["author"]);
    assert_eq!(services.catalog.counts().await.unwrap().book_count, 0);
}

#[tokio::test]
async fn test_book_with_missing_genre_names_genre() {
    let services = services();
    let author = services.authors.create(author_form("Mary", "Shelley")).await.unwrap();
    let (horror, _) = services.genres.create(genre_form("Horror")).await.unwrap();
    let missing = RecordId::new();

    let err = services
        .books
        .create(book_form("Frankenstein", author.id, vec![horror.id, missing]))
        .await
        .unwrap_err();
    assert_eq!(err.field_errors().len(), 1);
    assert_eq!(err.field_errors()[0].field, "genre");
    assert!(err.field_errors()[0].message.contains(&missing.to_string()));
}

#[tokio::test]
async fn test_invalid_author_reports_every_field() {
    let services = services();
    let err = services
        .authors
        .create(AuthorForm {
            first_name: String::new(),
            family_name: "Le Guin".to_string(),
            date_of_birth: Some("not a date".to_string()),
            date_of_death: None,
        })
        .await
        .unwrap_err();
    let fields: Vec<_> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["first_name", "family_name", "date_of_birth"]);
}

#[tokio::test]
async fn test_genre_delete_blocked_then_allowed() {
    let services = services();
    let author = services.authors.create(author_form("Jane", "Austen")).await.unwrap();
    let (romance, _) = services.genres.create(genre_form("Romance")).await.unwrap();
    let (satire, _) = services.genres.create(genre_form("Satire")).await.unwrap();
    let emma = services
        .books
        .create(book_form("Emma", author.id, vec![romance.id]))
        .await
        .unwrap();

    match services.guard.can_delete(EntityKind::Genre, romance.id).await.unwrap() {
        DeleteCheck::Blocked(dependents) => assert_eq!(dependents[0].id, emma.id),
        DeleteCheck::Allowed => panic!("romance is referenced by Emma"),
    }
    assert!(matches!(
        services.genres.delete(romance.id).await,
        Err(AppError::DeleteBlocked { .. })
    ));
    assert_eq!(services.genres.get(romance.id).await.unwrap().name, "Romance");

    services.genres.delete(satire.id).await.unwrap();
    assert!(matches!(
        services.genres.get(satire.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_replace_keeps_id() {
    let services = services();
    let author = services.authors.create(author_form("Jane", "Austen")).await.unwrap();
    let book = services
        .books
        .create(book_form("Emma", author.id, vec![]))
        .await
        .unwrap();

    let replaced = services
        .books
        .replace(book.id, book_form("Persuasion", author.id, vec![]))
        .await
        .unwrap();
    assert_eq!(replaced.id, book.id);

    let fetched = services.books.get(book.id).await.unwrap();
    assert_eq!(fetched.book.title, "Persuasion");
    assert_eq!(fetched.author.unwrap().id, author.id);
    assert_eq!(services.books.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_replace_missing_record_is_not_found_before_validation() {
    let services = services();
    let result = services
        .authors
        .replace(RecordId::new(), author_form("", ""))
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_created_genre_keeps_submitted_name() {
    let services = services();
    let (genre, _) = services.genres.create(genre_form("Gothic Fiction")).await.unwrap();
    let stored = services.genres.get(genre.id).await.unwrap();
    assert_eq!(stored.name, "Gothic Fiction");
}

#[tokio::test]
async fn test_lists_are_sorted() {
    let services = services();
    let bronte = services.authors.create(author_form("Emily", "Bronte")).await.unwrap();
    services.authors.create(author_form("Jane", "Austen")).await.unwrap();
    services.authors.create(author_form("Anne", "Bronte")).await.unwrap();

    let names: Vec<_> = services
        .authors
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.full_name())
        .collect();
    assert_eq!(names, vec!["Austen, Jane", "Bronte, Emily", "Bronte, Anne"]);

    for title in ["Wuthering Heights", "Agnes Grey"] {
        services
            .books
            .create(book_form(title, bronte.id, vec![]))
            .await
            .unwrap();
    }
    let titles: Vec<_> = services
        .books
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.title)
        .collect();
    assert_eq!(titles, vec!["Agnes Grey", "Wuthering Heights"]);
}

#[tokio::test]
async fn test_instance_detail_resolves_book_and_author() {
    let services = services();
    let author = services.authors.create(author_form("Jane", "Austen")).await.unwrap();
    let book = services
        .books
        .create(book_form("Emma", author.id, vec![]))
        .await
        .unwrap();
    let copy = services
        .book_instances
        .create(BookInstanceForm {
            book: book.id.to_string(),
            imprint: "Penguin".to_string(),
            status: None,
            due_back: Some("2026-11-01".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(copy.status, BookInstanceStatus::Maintenance);

    match services
        .catalog
        .with_relations(EntityKind::BookInstance, copy.id)
        .await
        .unwrap()
    {
        RelatedRecord::BookInstance(resolved) => {
            let book = resolved.book.unwrap();
            assert_eq!(book.book.title, "Emma");
            assert_eq!(book.author.unwrap().family_name, "Austen");
        }
        other => panic!("unexpected {:?}", other),
    }

    let options = services.book_instances.form_options().await.unwrap();
    assert_eq!(options.books.len(), 1);
    assert_eq!(options.statuses.len(), 4);
}

#[tokio::test]
async fn test_instance_with_unknown_book_is_rejected() {
    let services = services();
    let err = services
        .book_instances
        .create(BookInstanceForm {
            book: RecordId::new().to_string(),
            imprint: "Penguin".to_string(),
            status: Some("Lost".to_string()),
            due_back: None,
        })
        .await
        .unwrap_err();
    let fields: Vec<_> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["status", "book"]);
}
