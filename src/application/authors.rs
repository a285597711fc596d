use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;

use crate::application::pagination::PageRequest;
use crate::application::repos::{AuthorsRepo, BooksRepo, NewAuthor, RepoError};
use crate::application::views::AuthorView;
use crate::cache::{CacheKey, CacheTag, Loaded, TagCache};
use crate::domain::entities::AuthorRecord;
use crate::domain::validate::{self, Violation};

#[derive(Debug, Error)]
pub enum AuthorError {
    #[error("author not found")]
    NotFound,
    #[error("author failed validation")]
    Validation(Vec<Violation>),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct AuthorDraft {
    pub first_name: String,
    pub last_name: String,
}

/// Populate-style update: present fields overwrite, absent fields keep
/// their stored value.
#[derive(Debug, Clone, Default)]
pub struct AuthorPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// A freshly created author: the serialized view plus the id the
/// handler needs for the `Location` header.
#[derive(Debug)]
pub struct CreatedAuthor {
    pub id: i64,
    pub payload: Bytes,
}

#[derive(Clone)]
pub struct AuthorService {
    authors: Arc<dyn AuthorsRepo>,
    books: Arc<dyn BooksRepo>,
    cache: Arc<TagCache>,
}

impl AuthorService {
    pub fn new(
        authors: Arc<dyn AuthorsRepo>,
        books: Arc<dyn BooksRepo>,
        cache: Arc<TagCache>,
    ) -> Self {
        Self {
            authors,
            books,
            cache,
        }
    }

    /// Serve one pagination window of authors through the cache. The
    /// loader queries the store and serializes the page; the entry is
    /// tagged with the authors collection so any author write clears it.
    pub async fn list(&self, page: PageRequest) -> Result<Bytes, AuthorError> {
        let key = CacheKey::list(CacheTag::Authors, page.page(), page.limit());
        self.cache
            .get_with(key, || async move {
                let authors = self.authors.find_page(page).await?;
                let payload = self.render_page(authors).await?;
                Ok(Loaded::tagged(payload, CacheTag::Authors))
            })
            .await
    }

    /// By-id lookups bypass the cache entirely.
    pub async fn get(&self, id: i64) -> Result<Bytes, AuthorError> {
        let author = self
            .authors
            .find_by_id(id)
            .await?
            .ok_or(AuthorError::NotFound)?;
        let books = self.books.find_by_author_ids(&[author.id]).await?;
        let view = AuthorView::assemble(author, &books);
        Ok(Bytes::from(serde_json::to_vec(&view)?))
    }

    pub async fn create(&self, draft: AuthorDraft) -> Result<CreatedAuthor, AuthorError> {
        let violations = validate::check_author(&draft.first_name, &draft.last_name);
        if !violations.is_empty() {
            return Err(AuthorError::Validation(violations));
        }

        self.cache.invalidate_tags(&[CacheTag::Authors]);

        let record = self
            .authors
            .create(NewAuthor {
                first_name: draft.first_name,
                last_name: draft.last_name,
            })
            .await?;
        let id = record.id;
        // A brand-new author owns no books yet.
        let view = AuthorView::assemble(record, &[]);
        Ok(CreatedAuthor {
            id,
            payload: Bytes::from(serde_json::to_vec(&view)?),
        })
    }

    pub async fn update(&self, id: i64, patch: AuthorPatch) -> Result<(), AuthorError> {
        let mut record = self
            .authors
            .find_by_id(id)
            .await?
            .ok_or(AuthorError::NotFound)?;
        if let Some(first_name) = patch.first_name {
            record.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            record.last_name = last_name;
        }

        let violations = validate::check_author(&record.first_name, &record.last_name);
        if !violations.is_empty() {
            return Err(AuthorError::Validation(violations));
        }

        self.cache.invalidate_tags(&[CacheTag::Authors]);
        self.persist_update(&record).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), AuthorError> {
        if self.authors.find_by_id(id).await?.is_none() {
            return Err(AuthorError::NotFound);
        }

        self.cache.invalidate_tags(&[CacheTag::Authors]);
        match self.authors.delete(id).await {
            Err(RepoError::NotFound) => Err(AuthorError::NotFound),
            other => other.map_err(AuthorError::from),
        }
    }

    async fn persist_update(&self, record: &AuthorRecord) -> Result<(), AuthorError> {
        match self.authors.update(record).await {
            Err(RepoError::NotFound) => Err(AuthorError::NotFound),
            other => other.map_err(AuthorError::from),
        }
    }

    async fn render_page(&self, authors: Vec<AuthorRecord>) -> Result<Vec<u8>, AuthorError> {
        let ids: Vec<i64> = authors.iter().map(|author| author.id).collect();
        let books = if ids.is_empty() {
            Vec::new()
        } else {
            self.books.find_by_author_ids(&ids).await?
        };
        let views: Vec<AuthorView> = authors
            .into_iter()
            .map(|author| AuthorView::assemble(author, &books))
            .collect();
        Ok(serde_json::to_vec(&views)?)
    }
}
