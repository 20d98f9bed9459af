//! Genre model

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::{Entity, EntityKind, RecordId};

/// Genre record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Genre {
    pub id: RecordId,
    /// Unique among genres (checked on write)
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreData {
    pub name: String,
}

/// Raw genre submission
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct GenreForm {
    #[serde(default)]
    #[validate(length(min = 3, message = "Genre name must contain at least 3 characters"))]
    pub name: String,
}

impl Entity for Genre {
    const KIND: EntityKind = EntityKind::Genre;

    type Data = GenreData;

    fn from_data(id: RecordId, data: GenreData) -> Self {
        Self {
            id,
            name: data.name,
        }
    }

    fn id(&self) -> RecordId {
        self.id
    }
}

impl Genre {
    pub fn url(&self) -> String {
        EntityKind::Genre.url_for(self.id)
    }
}
