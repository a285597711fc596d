//! Wire views for catalog entities.
//!
//! One fixed selection shape serves every endpoint: an author embeds
//! its books as summaries, a book embeds its author as a summary, and
//! neither summary recurses back into the other side.

use serde::Serialize;

use crate::domain::entities::{AuthorRecord, BookRecord};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorView {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub books: Vec<BookSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    pub id: i64,
    pub title: String,
    pub cover_text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookView {
    pub id: i64,
    pub title: String,
    pub cover_text: String,
    pub author: Option<AuthorSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl AuthorView {
    /// Build the view for one author, picking its books out of the
    /// pool fetched for the whole page.
    pub fn assemble(author: AuthorRecord, books: &[BookRecord]) -> Self {
        let books = books
            .iter()
            .filter(|book| book.author_id == Some(author.id))
            .cloned()
            .map(BookSummary::from)
            .collect();
        Self {
            id: author.id,
            first_name: author.first_name,
            last_name: author.last_name,
            books,
        }
    }
}

impl BookView {
    /// `author` is the resolved record for `book.author_id`, or `None`
    /// when the reference is absent or dangling; the view serializes
    /// that as a JSON null.
    pub fn assemble(book: BookRecord, author: Option<AuthorRecord>) -> Self {
        Self {
            id: book.id,
            title: book.title,
            cover_text: book.cover_text,
            author: author.map(AuthorSummary::from),
        }
    }
}

impl From<BookRecord> for BookSummary {
    fn from(book: BookRecord) -> Self {
        Self {
            id: book.id,
            title: book.title,
            cover_text: book.cover_text,
        }
    }
}

impl From<AuthorRecord> for AuthorSummary {
    fn from(author: AuthorRecord) -> Self {
        Self {
            id: author.id,
            first_name: author.first_name,
            last_name: author.last_name,
        }
    }
}
