pub mod authors;
pub mod books;

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::application::authors::AuthorError;
use crate::application::books::BookError;
use crate::application::pagination::PaginationError;
use crate::application::repos::RepoError;

use super::error::ApiError;

pub(super) fn json_body(status: StatusCode, payload: Bytes) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json".to_string())],
        payload,
    )
        .into_response()
}

pub(super) fn created_body(location: String, payload: Bytes) -> Response {
    (
        StatusCode::CREATED,
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::LOCATION, location),
        ],
        payload,
    )
        .into_response()
}

pub(super) fn pagination_to_api(err: PaginationError) -> ApiError {
    ApiError::bad_request("Invalid pagination parameters", Some(err.to_string()))
}

pub(super) fn author_error_to_api(err: AuthorError) -> ApiError {
    match err {
        AuthorError::NotFound => ApiError::not_found("author not found"),
        AuthorError::Validation(violations) => ApiError::validation(violations),
        AuthorError::Repo(err) => repo_error_to_api(err),
        AuthorError::Serialize(err) => ApiError::internal(err.to_string()),
    }
}

pub(super) fn book_error_to_api(err: BookError) -> ApiError {
    match err {
        BookError::NotFound => ApiError::not_found("book not found"),
        BookError::Validation(violations) => ApiError::validation(violations),
        BookError::Repo(err) => repo_error_to_api(err),
        BookError::Serialize(err) => ApiError::internal(err.to_string()),
    }
}

fn repo_error_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::NotFound => ApiError::not_found("resource not found"),
        RepoError::Timeout => ApiError::unavailable("database timeout"),
        RepoError::Persistence(message) => ApiError::internal(message),
    }
}
