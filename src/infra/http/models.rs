//! Wire models for the catalog API.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Creation payloads default absent text fields to empty strings and
/// let validation report them, mirroring deserialize-then-validate
/// semantics rather than rejecting at the parsing layer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorCreateRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorUpdateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookCreateRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub cover_text: String,
    /// Read from the raw body; not part of the serialized book view.
    pub id_author: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookUpdateRequest {
    pub title: Option<String>,
    pub cover_text: Option<String>,
    pub id_author: Option<i64>,
}
