//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::{Entity, EntityKind, RecordId};

/// Medium date format shared by derived display fields ("Dec 16, 1775")
pub const DATE_MED: &str = "%b %-d, %Y";

/// Full author record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Author {
    pub id: RecordId,
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

/// Sanitized author fields as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorData {
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

/// Raw author submission, used for both create and full replace
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct AuthorForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "First name must be specified."))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Family name must be given."))]
    pub family_name: String,
    /// ISO-8601 date; blank means unknown
    pub date_of_birth: Option<String>,
    /// ISO-8601 date; blank means unknown
    pub date_of_death: Option<String>,
}

impl Entity for Author {
    const KIND: EntityKind = EntityKind::Author;

    type Data = AuthorData;

    fn from_data(id: RecordId, data: AuthorData) -> Self {
        Self {
            id,
            first_name: data.first_name,
            family_name: data.family_name,
            date_of_birth: data.date_of_birth,
            date_of_death: data.date_of_death,
        }
    }

    fn id(&self) -> RecordId {
        self.id
    }
}

impl Author {
    /// "family_name, first_name", or empty when either part is missing
    pub fn full_name(&self) -> String {
        if self.first_name.is_empty() || self.family_name.is_empty() {
            return String::new();
        }
        format!("{}, {}", self.family_name, self.first_name)
    }

    /// "<birth> - <death>" with unknown dates left blank
    pub fn lifespan(&self) -> String {
        format!(
            "{} - {}",
            format_date(self.date_of_birth, DATE_MED),
            format_date(self.date_of_death, DATE_MED)
        )
    }

    pub fn url(&self) -> String {
        EntityKind::Author.url_for(self.id)
    }

    /// Birth date as YYYY-MM-DD for form pre-fill
    pub fn date_of_birth_iso(&self) -> String {
        format_date(self.date_of_birth, "%Y-%m-%d")
    }

    /// Death date as YYYY-MM-DD for form pre-fill
    pub fn date_of_death_iso(&self) -> String {
        format_date(self.date_of_death, "%Y-%m-%d")
    }
}

fn format_date(date: Option<NaiveDate>, fmt: &str) -> String {
    date.map(|d| d.format(fmt).to_string()).unwrap_or_default()
}
