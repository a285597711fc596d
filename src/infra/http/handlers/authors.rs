//! Author handlers.

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;

use crate::application::authors::{AuthorDraft, AuthorPatch};
use crate::application::pagination::PageRequest;
use crate::infra::http::auth::{Principal, Role};
use crate::infra::http::error::ApiError;
use crate::infra::http::models::{AuthorCreateRequest, AuthorUpdateRequest, ListQuery};
use crate::infra::http::state::ApiState;

use super::{author_error_to_api, created_body, json_body, pagination_to_api};

const DEFAULT_PAGE_SIZE: u32 = 10;

pub async fn list(
    State(state): State<ApiState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, ApiError> {
    let page = PageRequest::from_query(query.page, query.limit, DEFAULT_PAGE_SIZE)
        .map_err(pagination_to_api)?;
    let payload = state
        .authors
        .list(page)
        .await
        .map_err(author_error_to_api)?;
    Ok(json_body(StatusCode::OK, payload))
}

pub async fn detail(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let payload = state.authors.get(id).await.map_err(author_error_to_api)?;
    Ok(json_body(StatusCode::OK, payload))
}

pub async fn create(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<AuthorCreateRequest>,
) -> Result<Response, ApiError> {
    principal
        .require(Role::Admin)
        .map_err(|_| ApiError::forbidden())?;

    let created = state
        .authors
        .create(AuthorDraft {
            first_name: payload.first_name,
            last_name: payload.last_name,
        })
        .await
        .map_err(author_error_to_api)?;

    Ok(created_body(
        format!("/api/authors/{}", created.id),
        created.payload,
    ))
}

pub async fn update(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    Json(payload): Json<AuthorUpdateRequest>,
) -> Result<StatusCode, ApiError> {
    principal
        .require(Role::Admin)
        .map_err(|_| ApiError::forbidden())?;

    state
        .authors
        .update(
            id,
            AuthorPatch {
                first_name: payload.first_name,
                last_name: payload.last_name,
            },
        )
        .await
        .map_err(author_error_to_api)?;

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

    state
        .authors
        .delete(id)
        .await
        .map_err(author_error_to_api)?;

    Ok(StatusCode::NO_CONTENT)
}
