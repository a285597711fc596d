//! Libris: a catalog API for authors and books.
//!
//! The interesting part is the list cache: pagination windows are
//! cached per `(collection, page, limit)` and grouped under a
//! collection tag, and every write to a collection invalidates the
//! whole tag before committing to the store.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
