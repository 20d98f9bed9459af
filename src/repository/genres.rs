//! Genre queries on Repository

use serde_json::Value;

use super::{Filter, Repository};
use crate::{
    error::AppResult,
    models::{Genre, RecordId},
};

impl Repository {
    /// All genres ordered by name
    pub async fn genres_list(&self) -> AppResult<Vec<Genre>> {
        self.list::<Genre>(&Filter::All, Some("name")).await
    }

    /// Genre carrying exactly this name, optionally ignoring one record
    pub async fn genres_find_by_name(
        &self,
        name: &str,
        exclude_id: Option<RecordId>,
    ) -> AppResult<Option<Genre>> {
        let filter = Filter::Eq("name", Value::String(name.to_string()));
        Ok(self
            .list::<Genre>(&filter, None)
            .await?
            .into_iter()
            .find(|genre| Some(genre.id) != exclude_id))
    }
}
