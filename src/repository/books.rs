//! Book queries on Repository

use serde_json::Value;

use super::{Filter, Repository};
use crate::{
    error::AppResult,
    models::{Book, RecordId},
};

impl Repository {
    /// All books ordered by title
    pub async fn books_list(&self) -> AppResult<Vec<Book>> {
        self.list::<Book>(&Filter::All, Some("title")).await
    }

    /// Books written by an author
    pub async fn books_by_author(&self, author_id: RecordId) -> AppResult<Vec<Book>> {
        let filter = Filter::Eq("author", Value::String(author_id.to_string()));
        self.list::<Book>(&filter, Some("title")).await
    }

    /// Books filed under a genre
    pub async fn books_by_genre(&self, genre_id: RecordId) -> AppResult<Vec<Book>> {
        let filter = Filter::Contains("genre", Value::String(genre_id.to_string()));
        self.list::<Book>(&filter, Some("title")).await
    }
}
