//! Book (catalog entry) model and related types

use serde::{Deserialize, Serialize};
use serde_with::{formats::PreferMany, serde_as, OneOrMany};
use utoipa::ToSchema;
use validator::Validate;

use super::{Author, Entity, EntityKind, Genre, RecordId};

/// Full book record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub id: RecordId,
    pub title: String,
    /// Author id
    pub author: RecordId,
    pub summary: String,
    pub isbn: String,
    /// Genre ids, possibly empty
    pub genre: Vec<RecordId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookData {
    pub title: String,
    pub author: RecordId,
    pub summary: String,
    pub isbn: String,
    #[serde(default)]
    pub genre: Vec<RecordId>,
}

/// Raw book submission.
///
/// `genre` accepts a single id or a list of ids; a missing field is an
/// empty list.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct BookForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Title field can NOT be empty"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Author field can NOT be empty"))]
    pub author: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Summary field can NOT be empty"))]
    pub summary: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "ISBN field can NOT be empty"))]
    pub isbn: String,
    #[serde_as(as = "OneOrMany<_, PreferMany>")]
    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub genre: Vec<String>,
}

impl Entity for Book {
    const KIND: EntityKind = EntityKind::Book;

    type Data = BookData;

    fn from_data(id: RecordId, data: BookData) -> Self {
        Self {
            id,
            title: data.title,
            author: data.author,
            summary: data.summary,
            isbn: data.isbn,
            genre: data.genre,
        }
    }

    fn id(&self) -> RecordId {
        self.id
    }
}

impl Book {
    pub fn url(&self) -> String {
        EntityKind::Book.url_for(self.id)
    }
}

/// Book with its author and genres resolved inline
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookWithRelations {
    pub book: Book,
    /// None only if the author vanished after the book was written
    pub author: Option<Author>,
    pub genres: Vec<Genre>,
}

/// Book list row: title plus the resolved author
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookListEntry {
    pub id: RecordId,
    pub title: String,
    pub author: Option<Author>,
}

/// Title and summary of a book, as listed under an author or a genre
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BookSummary {
    pub id: RecordId,
    pub title: String,
    pub summary: String,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            summary: book.summary.clone(),
        }
    }
}
