use async_trait::async_trait;

use crate::application::pagination::PageRequest;
use crate::application::repos::{BooksRepo, NewBook, RepoError};
use crate::domain::entities::BookRecord;

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct BookRow {
    id: i64,
    title: String,
    cover_text: String,
    author_id: Option<i64>,
}

impl From<BookRow> for BookRecord {
    fn from(row: BookRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            cover_text: row.cover_text,
            author_id: row.author_id,
        }
    }
}

#[async_trait]
impl BooksRepo for PostgresRepositories {
    async fn find_page(&self, page: PageRequest) -> Result<Vec<BookRecord>, RepoError> {
        let rows = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT id, title, cover_text, author_id
            FROM books
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(i64::from(page.limit()))
        .bind(page.offset())
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(BookRecord::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<BookRecord>, RepoError> {
        let row = sqlx::query_as::<_, BookRow>(
            "SELECT id, title, cover_text, author_id FROM books WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(BookRecord::from))
    }

    async fn find_by_author_ids(&self, author_ids: &[i64]) -> Result<Vec<BookRecord>, RepoError> {
        let rows = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT id, title, cover_text, author_id
            FROM books
            WHERE author_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(author_ids)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(BookRecord::from).collect())
    }

    async fn create(&self, params: NewBook) -> Result<BookRecord, RepoError> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            INSERT INTO books (title, cover_text, author_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, cover_text, author_id
            "#,
        )
        .bind(&params.title)
        .bind(&params.cover_text)
        .bind(params.author_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(BookRecord::from(row))
    }

    async fn update(&self, record: &BookRecord) -> Result<(), RepoError> {
        let result = sqlx::query(
            "UPDATE books SET title = $2, cover_text = $3, author_id = $4 WHERE id = $1",
        )
        .bind(record.id)
        .bind(&record.title)
        .bind(&record.cover_text)
        .bind(record.author_id)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
