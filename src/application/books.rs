use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;

use crate::application::pagination::PageRequest;
use crate::application::repos::{AuthorsRepo, BooksRepo, NewBook, RepoError};
use crate::application::views::BookView;
use crate::cache::{CacheKey, CacheTag, Loaded, TagCache};
use crate::domain::entities::{AuthorRecord, BookRecord};
use crate::domain::validate::{self, Violation};

/// Sentinel used when a payload carries no `idAuthor`; no author can
/// have this id, so resolution comes back empty and the book is stored
/// without an author.
const UNRESOLVED_AUTHOR: i64 = -1;

#[derive(Debug, Error)]
pub enum BookError {
    #[error("book not found")]
    NotFound,
    #[error("book failed validation")]
    Validation(Vec<Violation>),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default)]
pub struct BookDraft {
    pub title: String,
    pub cover_text: String,
    pub id_author: Option<i64>,
}

/// Populate-style update: present fields overwrite, absent fields keep
/// their stored value. The author reference is the exception — it is
/// re-resolved from `id_author` unconditionally, so a payload without
/// the field detaches the author.
#[derive(Debug, Clone, Default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub cover_text: Option<String>,
    pub id_author: Option<i64>,
}

#[derive(Debug)]
pub struct CreatedBook {
    pub id: i64,
    pub payload: Bytes,
}

#[derive(Clone)]
pub struct BookService {
    books: Arc<dyn BooksRepo>,
    authors: Arc<dyn AuthorsRepo>,
    cache: Arc<TagCache>,
}

impl BookService {
    pub fn new(
        books: Arc<dyn BooksRepo>,
        authors: Arc<dyn AuthorsRepo>,
        cache: Arc<TagCache>,
    ) -> Self {
        Self {
            books,
            authors,
            cache,
        }
    }

    /// Serve one pagination window of books through the cache, tagged
    /// with the books collection.
    pub async fn list(&self, page: PageRequest) -> Result<Bytes, BookError> {
        let key = CacheKey::list(CacheTag::Books, page.page(), page.limit());
        self.cache
            .get_with(key, || async move {
                let books = self.books.find_page(page).await?;
                let payload = self.render_page(books).await?;
                Ok(Loaded::tagged(payload, CacheTag::Books))
            })
            .await
    }

    /// By-id lookups bypass the cache entirely.
    pub async fn get(&self, id: i64) -> Result<Bytes, BookError> {
        let book = self.books.find_by_id(id).await?.ok_or(BookError::NotFound)?;
        let author = self.resolve_stored_author(&book).await?;
        let view = BookView::assemble(book, author);
        Ok(Bytes::from(serde_json::to_vec(&view)?))
    }

    pub async fn create(&self, draft: BookDraft) -> Result<CreatedBook, BookError> {
        // An unknown id (including the sentinel for an absent field)
        // attaches no author; that is not a validation failure.
        let author = self.resolve_author(draft.id_author).await?;

        let violations = validate::check_book(&draft.title, &draft.cover_text);
        if !violations.is_empty() {
            return Err(BookError::Validation(violations));
        }

        self.cache.invalidate_tags(&[CacheTag::Books]);

        let record = self
            .books
            .create(NewBook {
                title: draft.title,
                cover_text: draft.cover_text,
                author_id: author.as_ref().map(|a| a.id),
            })
            .await?;
        let id = record.id;
        let view = BookView::assemble(record, author);
        Ok(CreatedBook {
            id,
            payload: Bytes::from(serde_json::to_vec(&view)?),
        })
    }

    pub async fn update(&self, id: i64, patch: BookPatch) -> Result<(), BookError> {
        let mut record = self.books.find_by_id(id).await?.ok_or(BookError::NotFound)?;
        if let Some(title) = patch.title {
            record.title = title;
        }
        if let Some(cover_text) = patch.cover_text {
            record.cover_text = cover_text;
        }
        record.author_id = self
            .resolve_author(patch.id_author)
            .await?
            .map(|author| author.id);

        let violations = validate::check_book(&record.title, &record.cover_text);
        if !violations.is_empty() {
            return Err(BookError::Validation(violations));
        }

        self.cache.invalidate_tags(&[CacheTag::Books]);
        match self.books.update(&record).await {
            Err(RepoError::NotFound) => Err(BookError::NotFound),
            other => other.map_err(BookError::from),
        }
    }

    pub async fn delete(&self, id: i64) -> Result<(), BookError> {
        if self.books.find_by_id(id).await?.is_none() {
            return Err(BookError::NotFound);
        }

        self.cache.invalidate_tags(&[CacheTag::Books]);
        match self.books.delete(id).await {
            Err(RepoError::NotFound) => Err(BookError::NotFound),
            other => other.map_err(BookError::from),
        }
    }

    async fn resolve_author(
        &self,
        id_author: Option<i64>,
    ) -> Result<Option<AuthorRecord>, RepoError> {
        let id = id_author.unwrap_or(UNRESOLVED_AUTHOR);
        self.authors.find_by_id(id).await
    }

    async fn resolve_stored_author(
        &self,
        book: &BookRecord,
    ) -> Result<Option<AuthorRecord>, RepoError> {
        match book.author_id {
            Some(author_id) => self.authors.find_by_id(author_id).await,
            None => Ok(None),
        }
    }

    async fn render_page(&self, books: Vec<BookRecord>) -> Result<Vec<u8>, BookError> {
        let author_ids: Vec<i64> = books.iter().filter_map(|book| book.author_id).collect();
        let authors = if author_ids.is_empty() {
            Vec::new()
        } else {
            self.authors.find_by_ids(&author_ids).await?
        };
        let views: Vec<BookView> = books
            .into_iter()
            .map(|book| {
                let author = book
                    .author_id
                    .and_then(|id| authors.iter().find(|author| author.id == id).cloned());
                BookView::assemble(book, author)
            })
            .collect();
        Ok(serde_json::to_vec(&views)?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::application::repos::NewAuthor;
    use crate::cache::CacheConfig;

    #[derive(Default)]
    struct MemoryBooksRepo {
        books: Mutex<Vec<BookRecord>>,
        next_id: AtomicI64,
        page_queries: AtomicUsize,
        fail_writes: bool,
    }

    #[async_trait]
    impl BooksRepo for MemoryBooksRepo {
        async fn find_page(&self, page: PageRequest) -> Result<Vec<BookRecord>, RepoError> {
            self.page_queries.fetch_add(1, Ordering::SeqCst);
            let books = self.books.lock().unwrap();
            Ok(books
                .iter()
                .skip(page.offset() as usize)
                .take(page.limit() as usize)
                .cloned()
                .collect())
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<BookRecord>, RepoError> {
            Ok(self
                .books
                .lock()
                .unwrap()
                .iter()
                .find(|book| book.id == id)
                .cloned())
        }

        async fn find_by_author_ids(
            &self,
            author_ids: &[i64],
        ) -> Result<Vec<BookRecord>, RepoError> {
            Ok(self
                .books
                .lock()
                .unwrap()
                .iter()
                .filter(|book| book.author_id.is_some_and(|id| author_ids.contains(&id)))
                .cloned()
                .collect())
        }

        async fn create(&self, params: NewBook) -> Result<BookRecord, RepoError> {
            if self.fail_writes {
                return Err(RepoError::from_persistence("writes disabled"));
            }
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            let record = BookRecord {
                id,
                title: params.title,
                cover_text: params.cover_text,
                author_id: params.author_id,
            };
            self.books.lock().unwrap().push(record.clone());
            Ok(record)
        }

        async fn update(&self, record: &BookRecord) -> Result<(), RepoError> {
            let mut books = self.books.lock().unwrap();
            match books.iter_mut().find(|book| book.id == record.id) {
                Some(existing) => {
                    *existing = record.clone();
                    Ok(())
                }
                None => Err(RepoError::NotFound),
            }
        }

        async fn delete(&self, id: i64) -> Result<(), RepoError> {
            let mut books = self.books.lock().unwrap();
            let before = books.len();
            books.retain(|book| book.id != id);
            if books.len() == before {
                return Err(RepoError::NotFound);
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemoryAuthorsRepo {
        authors: Mutex<Vec<AuthorRecord>>,
    }

    #[async_trait]
    impl AuthorsRepo for MemoryAuthorsRepo {
        async fn find_page(&self, _page: PageRequest) -> Result<Vec<AuthorRecord>, RepoError> {
            Ok(Vec::new())
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<AuthorRecord>, RepoError> {
            Ok(self
                .authors
                .lock()
                .unwrap()
                .iter()
                .find(|author| author.id == id)
                .cloned())
        }

        async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<AuthorRecord>, RepoError> {
            Ok(self
                .authors
                .lock()
                .unwrap()
                .iter()
                .filter(|author| ids.contains(&author.id))
                .cloned()
                .collect())
        }

        async fn create(&self, _params: NewAuthor) -> Result<AuthorRecord, RepoError> {
            unreachable!("not used in these tests")
        }

        async fn update(&self, _record: &AuthorRecord) -> Result<(), RepoError> {
            unreachable!("not used in these tests")
        }

        async fn delete(&self, _id: i64) -> Result<(), RepoError> {
            unreachable!("not used in these tests")
        }
    }

    fn known_author() -> AuthorRecord {
        AuthorRecord {
            id: 1,
            first_name: "Jules".into(),
            last_name: "Verne".into(),
        }
    }

    fn build(
        books: Arc<MemoryBooksRepo>,
        authors: Vec<AuthorRecord>,
    ) -> (BookService, Arc<TagCache>) {
        let cache = Arc::new(TagCache::new(&CacheConfig::default()));
        let service = BookService::new(
            books,
            Arc::new(MemoryAuthorsRepo {
                authors: Mutex::new(authors),
            }),
            cache.clone(),
        );
        (service, cache)
    }

    fn page(page: u32, limit: u32) -> PageRequest {
        PageRequest::new(page, limit).expect("valid window")
    }

    fn draft(title: &str, id_author: Option<i64>) -> BookDraft {
        BookDraft {
            title: title.into(),
            cover_text: "C".into(),
            id_author,
        }
    }

    #[tokio::test]
    async fn unknown_author_id_attaches_nothing() {
        let repo = Arc::new(MemoryBooksRepo::default());
        let (service, _) = build(repo.clone(), vec![known_author()]);

        let created = service
            .create(draft("T", Some(999)))
            .await
            .expect("create succeeds");

        let parsed: serde_json::Value =
            serde_json::from_slice(&created.payload).expect("valid json");
        assert_eq!(parsed["author"], serde_json::Value::Null);
        assert_eq!(repo.books.lock().unwrap()[0].author_id, None);
    }

    #[tokio::test]
    async fn absent_author_field_means_unresolved() {
        let repo = Arc::new(MemoryBooksRepo::default());
        let (service, _) = build(repo.clone(), vec![known_author()]);

        service.create(draft("T", None)).await.expect("create succeeds");
        assert_eq!(repo.books.lock().unwrap()[0].author_id, None);
    }

    #[tokio::test]
    async fn known_author_id_is_attached() {
        let repo = Arc::new(MemoryBooksRepo::default());
        let (service, _) = build(repo.clone(), vec![known_author()]);

        let created = service
            .create(draft("T", Some(1)))
            .await
            .expect("create succeeds");

        let parsed: serde_json::Value =
            serde_json::from_slice(&created.payload).expect("valid json");
        assert_eq!(parsed["author"]["firstName"], "Jules");
        assert_eq!(repo.books.lock().unwrap()[0].author_id, Some(1));
    }

    #[tokio::test]
    async fn validation_failure_leaves_cache_and_store_untouched() {
        let repo = Arc::new(MemoryBooksRepo::default());
        let (service, cache) = build(repo.clone(), Vec::new());
        service.list(page(1, 3)).await.expect("list succeeds");
        assert_eq!(cache.len(), 1);

        let result = service.create(draft("", None)).await;
        assert!(matches!(result, Err(BookError::Validation(_))));
        assert!(repo.books.lock().unwrap().is_empty());
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn invalidation_precedes_the_store_commit() {
        let repo = Arc::new(MemoryBooksRepo {
            fail_writes: true,
            ..Default::default()
        });
        let (service, cache) = build(repo, Vec::new());
        service.list(page(1, 3)).await.expect("list succeeds");
        assert_eq!(cache.len(), 1);

        // The insert fails, but the tag was already invalidated: the
        // cached window is gone even though nothing was persisted.
        let result = service.create(draft("T", None)).await;
        assert!(matches!(result, Err(BookError::Repo(_))));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn update_without_author_field_detaches_the_author() {
        let repo = Arc::new(MemoryBooksRepo::default());
        let (service, _) = build(repo.clone(), vec![known_author()]);
        let created = service
            .create(draft("T", Some(1)))
            .await
            .expect("create succeeds");

        service
            .update(
                created.id,
                BookPatch {
                    title: Some("T2".into()),
                    ..Default::default()
                },
            )
            .await
            .expect("update succeeds");

        let stored = repo.books.lock().unwrap()[0].clone();
        assert_eq!(stored.title, "T2");
        assert_eq!(stored.cover_text, "C");
        assert_eq!(stored.author_id, None);
    }

    #[tokio::test]
    async fn list_reflects_a_create_through_the_same_window() {
        let repo = Arc::new(MemoryBooksRepo::default());
        let (service, _) = build(repo.clone(), Vec::new());

        let before = service.list(page(1, 3)).await.expect("list succeeds");
        assert_eq!(before, Bytes::from("[]"));

        service.create(draft("T", None)).await.expect("create succeeds");

        let after = service.list(page(1, 3)).await.expect("list succeeds");
        let parsed: serde_json::Value = serde_json::from_slice(&after).expect("valid json");
        assert_eq!(parsed.as_array().map(Vec::len), Some(1));
        assert_eq!(repo.page_queries.load(Ordering::SeqCst), 2);
    }
}
