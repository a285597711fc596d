//! Domain entities mirrored from persistent storage.

/// An author as stored. Identity is store-assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorRecord {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

/// A book as stored. `author_id` is nullable: a book whose author was
/// never resolved (or has since been deleted) keeps a dangling or
/// absent reference rather than failing.
#[derive(Debug, Clone, PartialEq)]
pub struct BookRecord {
    pub id: i64,
    pub title: String,
    pub cover_text: String,
    pub author_id: Option<i64>,
}
