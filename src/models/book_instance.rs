//! Book instance (physical copy) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::book::BookWithRelations;
use super::{Book, Entity, EntityKind, RecordId};

/// Medium date-time format for due dates ("Oct 16, 2026, 3:04 PM")
pub const DATETIME_MED: &str = "%b %-d, %Y, %-I:%M %p";

/// Lending status of a copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum BookInstanceStatus {
    Available,
    #[default]
    Maintenance,
    Loaned,
    Reserve,
}

impl BookInstanceStatus {
    pub const ALL: [BookInstanceStatus; 4] = [
        BookInstanceStatus::Available,
        BookInstanceStatus::Maintenance,
        BookInstanceStatus::Loaned,
        BookInstanceStatus::Reserve,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookInstanceStatus::Available => "Available",
            BookInstanceStatus::Maintenance => "Maintenance",
            BookInstanceStatus::Loaned => "Loaned",
            BookInstanceStatus::Reserve => "Reserve",
        }
    }
}

impl std::fmt::Display for BookInstanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BookInstanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookInstanceStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Invalid book instance status: {}", s))
    }
}

/// Full book instance record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookInstance {
    pub id: RecordId,
    /// Book id
    pub book: RecordId,
    pub imprint: String,
    pub status: BookInstanceStatus,
    pub due_back: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookInstanceData {
    pub book: RecordId,
    pub imprint: String,
    #[serde(default)]
    pub status: BookInstanceStatus,
    pub due_back: DateTime<Utc>,
}

/// Raw book instance submission
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct BookInstanceForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Book must be specified"))]
    pub book: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Imprint must be specified"))]
    pub imprint: String,
    /// One of Available, Maintenance, Loaned, Reserve; blank means Maintenance
    pub status: Option<String>,
    /// ISO-8601 date or date-time; blank means now
    pub due_back: Option<String>,
}

impl Entity for BookInstance {
    const KIND: EntityKind = EntityKind::BookInstance;

    type Data = BookInstanceData;

    fn from_data(id: RecordId, data: BookInstanceData) -> Self {
        Self {
            id,
            book: data.book,
            imprint: data.imprint,
            status: data.status,
            due_back: data.due_back,
        }
    }

    fn id(&self) -> RecordId {
        self.id
    }
}

impl BookInstance {
    pub fn url(&self) -> String {
        EntityKind::BookInstance.url_for(self.id)
    }

    pub fn due_back_formatted(&self) -> String {
        self.due_back.format(DATETIME_MED).to_string()
    }

    /// Due date as YYYY-MM-DD for form pre-fill
    pub fn due_back_iso(&self) -> String {
        self.due_back.format("%Y-%m-%d").to_string()
    }
}

/// Instance with its book resolved inline
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookInstanceWithRelations {
    pub instance: BookInstance,
    /// The book, with its own author and genres resolved
    pub book: Option<BookWithRelations>,
}

/// Instance list row: the copy plus its book
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookInstanceListEntry {
    pub instance: BookInstance,
    pub book: Option<Book>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_status_parse() {
        assert_eq!("Loaned".parse::<BookInstanceStatus>(), Ok(BookInstanceStatus::Loaned));
        assert!("loaned".parse::<BookInstanceStatus>().is_err());
        assert_eq!(BookInstanceStatus::default(), BookInstanceStatus::Maintenance);
    }

    #[test]
    fn test_due_back_formats() {
        let instance = BookInstance {
            id: RecordId::new(),
            book: RecordId::new(),
            imprint: "London, 1815".to_string(),
            status: BookInstanceStatus::Loaned,
            due_back: Utc.with_ymd_and_hms(2026, 10, 16, 15, 4, 0).unwrap(),
        };
        assert_eq!(instance.due_back_formatted(), "Oct 16, 2026, 3:04 PM");
        assert_eq!(instance.due_back_iso(), "2026-10-16");
    }
}
