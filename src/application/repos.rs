//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::application::pagination::PageRequest;
use crate::domain::entities::{AuthorRecord, BookRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("record not found")]
    NotFound,
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct NewAuthor {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub cover_text: String,
    pub author_id: Option<i64>,
}

#[async_trait]
pub trait AuthorsRepo: Send + Sync {
    async fn find_page(&self, page: PageRequest) -> Result<Vec<AuthorRecord>, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<AuthorRecord>, RepoError>;

    /// Batch lookup used when resolving the authors of a page of books.
    /// Unknown ids are silently absent from the result.
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<AuthorRecord>, RepoError>;

    async fn create(&self, params: NewAuthor) -> Result<AuthorRecord, RepoError>;

    /// Persist the full state of an existing author. `NotFound` when the
    /// id no longer matches a row.
    async fn update(&self, record: &AuthorRecord) -> Result<(), RepoError>;

    /// `NotFound` when the id no longer matches a row.
    async fn delete(&self, id: i64) -> Result<(), RepoError>;
}

#[async_trait]
pub trait BooksRepo: Send + Sync {
    async fn find_page(&self, page: PageRequest) -> Result<Vec<BookRecord>, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<BookRecord>, RepoError>;

    /// Batch lookup used when embedding an author's books into its view.
    async fn find_by_author_ids(&self, author_ids: &[i64]) -> Result<Vec<BookRecord>, RepoError>;

    async fn create(&self, params: NewBook) -> Result<BookRecord, RepoError>;

    async fn update(&self, record: &BookRecord) -> Result<(), RepoError>;

    async fn delete(&self, id: i64) -> Result<(), RepoError>;
}
