//! Author queries on Repository

use super::{Filter, Repository};
use crate::{error::AppResult, models::Author};

impl Repository {
    /// All authors ordered by family name
    pub async fn authors_list(&self) -> AppResult<Vec<Author>> {
        self.list::<Author>(&Filter::All, Some("family_name")).await
    }
}
