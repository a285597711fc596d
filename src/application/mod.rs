//! Application services layer.

pub mod authors;
pub mod books;
pub mod error;
pub mod pagination;
pub mod repos;
pub mod views;
