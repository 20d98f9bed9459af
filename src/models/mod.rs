//! Data models for the library catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::repository::Filter;

// Re-export commonly used types
pub use author::{Author, AuthorData, AuthorForm};
pub use book::{Book, BookData, BookForm};
pub use book_instance::{BookInstance, BookInstanceData, BookInstanceForm, BookInstanceStatus};
pub use genre::{Genre, GenreData, GenreForm};

/// The four record kinds held by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Author,
    Book,
    BookInstance,
    Genre,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Author,
        EntityKind::Book,
        EntityKind::BookInstance,
        EntityKind::Genre,
    ];

    /// Collection name used by the document store
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Author => "author",
            EntityKind::Book => "book",
            EntityKind::BookInstance => "book_instance",
            EntityKind::Genre => "genre",
        }
    }

    /// Body field used as the display title of a record of this kind
    pub fn title_field(&self) -> &'static str {
        match self {
            EntityKind::Author => "family_name",
            EntityKind::Book => "title",
            EntityKind::BookInstance => "imprint",
            EntityKind::Genre => "name",
        }
    }

    /// Path segment of the catalog URL for this kind
    pub fn url_segment(&self) -> &'static str {
        match self {
            EntityKind::Author => "author",
            EntityKind::Book => "book",
            EntityKind::BookInstance => "bookinstance",
            EntityKind::Genre => "genre",
        }
    }

    pub fn url_for(&self, id: RecordId) -> String {
        format!("/catalog/{}/{}", self.url_segment(), id)
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Author => "Author",
            EntityKind::Book => "Book",
            EntityKind::BookInstance => "BookInstance",
            EntityKind::Genre => "Genre",
        };
        f.write_str(name)
    }
}

/// Opaque record identity, assigned by the store at creation
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for RecordId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// A typed record kind stored as a schema-less document.
///
/// `Data` is exactly what gets persisted; the identity lives beside it
/// and derived attributes are computed by methods on the record.
pub trait Entity: Sized + Send {
    const KIND: EntityKind;

    type Data: Serialize + DeserializeOwned + Send + Sync;

    fn from_data(id: RecordId, data: Self::Data) -> Self;

    fn id(&self) -> RecordId;
}

/// A foreign reference declared by a record about to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub field: &'static str,
    pub kind: EntityKind,
    pub id: RecordId,
}

/// A stored reference field pointing from one kind at another
#[derive(Debug, Clone, Copy)]
pub struct Relation {
    pub from: EntityKind,
    pub field: &'static str,
    pub to: EntityKind,
    /// The field holds a set of references rather than a single one
    pub many: bool,
}

/// Every reference field in the catalog. Nothing is stored on the target side.
pub const RELATIONS: &[Relation] = &[
    Relation {
        from: EntityKind::Book,
        field: "author",
        to: EntityKind::Author,
        many: false,
    },
    Relation {
        from: EntityKind::Book,
        field: "genre",
        to: EntityKind::Genre,
        many: true,
    },
    Relation {
        from: EntityKind::BookInstance,
        field: "book",
        to: EntityKind::Book,
        many: false,
    },
];

impl Relation {
    /// Relations whose target is `kind`
    pub fn pointing_at(kind: EntityKind) -> impl Iterator<Item = &'static Relation> {
        RELATIONS.iter().filter(move |r| r.to == kind)
    }

    /// Store filter selecting the documents that reference `id` through this relation
    pub fn filter(&self, id: RecordId) -> Filter {
        let value = serde_json::Value::String(id.to_string());
        if self.many {
            Filter::Contains(self.field, value)
        } else {
            Filter::Eq(self.field, value)
        }
    }
}

/// Lightweight view of a record that blocks a delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DependentSummary {
    pub kind: EntityKind,
    pub id: RecordId,
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_parse() {
        let id = RecordId::new();
        let parsed: RecordId = format!(" {} ", id).parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-an-id".parse::<RecordId>().is_err());
    }

    #[test]
    fn test_relations_pointing_at() {
        let book_refs: Vec<_> = Relation::pointing_at(EntityKind::Book).collect();
        assert_eq!(book_refs.len(), 1);
        assert_eq!(book_refs[0].from, EntityKind::BookInstance);

        assert_eq!(Relation::pointing_at(EntityKind::BookInstance).count(), 0);
    }

    #[test]
    fn test_relation_filter_shape() {
        let id = RecordId::new();
        let genre = RELATIONS.iter().find(|r| r.field == "genre").unwrap();
        assert!(matches!(genre.filter(id), Filter::Contains("genre", _)));
        let author = RELATIONS.iter().find(|r| r.field == "author").unwrap();
        assert!(matches!(author.filter(id), Filter::Eq("author", _)));
    }

    #[test]
    fn test_urls() {
        let id = RecordId::new();
        assert_eq!(
            EntityKind::BookInstance.url_for(id),
            format!("/catalog/bookinstance/{}", id)
        );
    }
}
