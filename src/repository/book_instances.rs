//! Book instance queries on Repository

use serde_json::Value;

use super::{Filter, Repository};
use crate::{
    error::AppResult,
    models::{BookInstance, BookInstanceStatus, EntityKind, RecordId},
};

impl Repository {
    /// All copies in insertion order
    pub async fn book_instances_list(&self) -> AppResult<Vec<BookInstance>> {
        self.list::<BookInstance>(&Filter::All, None).await
    }

    /// Copies of one book
    pub async fn book_instances_of_book(&self, book_id: RecordId) -> AppResult<Vec<BookInstance>> {
        let filter = Filter::Eq("book", Value::String(book_id.to_string()));
        self.list::<BookInstance>(&filter, None).await
    }

    /// Number of copies with the given status
    pub async fn book_instances_count_by_status(&self, status: BookInstanceStatus) -> AppResult<u64> {
        let filter = Filter::Eq("status", Value::String(status.as_str().to_string()));
        self.count(EntityKind::BookInstance, &filter).await
    }
}
