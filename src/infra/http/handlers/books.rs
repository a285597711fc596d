//! Book handlers.

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;

use crate::application::books::{BookDraft, BookPatch};
use crate::application::pagination::PageRequest;
use crate::infra::http::auth::{Principal, Role};
use crate::infra::http::error::ApiError;
use crate::infra::http::models::{BookCreateRequest, BookUpdateRequest, ListQuery};
use crate::infra::http::state::ApiState;

use super::{book_error_to_api, created_body, json_body, pagination_to_api};

const DEFAULT_PAGE_SIZE: u32 = 3;

pub async fn list(
    State(state): State<ApiState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, ApiError> {
    let page = PageRequest::from_query(query.page, query.limit, DEFAULT_PAGE_SIZE)
        .map_err(pagination_to_api)?;
    let payload = state.books.list(page).await.map_err(book_error_to_api)?;
    Ok(json_body(StatusCode::OK, payload))
}

pub async fn detail(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let payload = state.books.get(id).await.map_err(book_error_to_api)?;
    Ok(json_body(StatusCode::OK, payload))
}

pub async fn create(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<BookCreateRequest>,
) -> Result<Response, ApiError> {
    principal
        .require(Role::Admin)
        .map_err(|_| ApiError::forbidden())?;

    let created = state
        .books
        .create(BookDraft {
            title: payload.title,
            cover_text: payload.cover_text,
            id_author: payload.id_author,
        })
        .await
        .map_err(book_error_to_api)?;

    Ok(created_body(
        format!("/api/books/{}", created.id),
        created.payload,
    ))
}

pub async fn update(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    Json(payload): Json<BookUpdateRequest>,
) -> Result<StatusCode, ApiError> {
    principal
        .require(Role::Admin)
        .map_err(|_| ApiError::forbidden())?;

    state
        .books
        .update(
            id,
            BookPatch {
                title: payload.title,
                cover_text: payload.cover_text,
                id_author: payload.id_author,
            },
        )
        .await
        .map_err(book_error_to_api)?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    principal
        .require(Role::Admin)
        .map_err(|_| ApiError::forbidden())?;

    state.books.delete(id).await.map_err(book_error_to_api)?;

    Ok(StatusCode::NO_CONTENT)
}
