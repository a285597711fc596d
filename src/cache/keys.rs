//! Cache key and tag definitions.

use std::fmt;

/// Groups cache entries by source collection for bulk invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheTag {
    Authors,
    Books,
}

impl CacheTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authors => "authors",
            Self::Books => "books",
        }
    }
}

impl fmt::Display for CacheTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Addresses one cached list payload. A list key composes the
/// collection label with the pagination window, so every `(page,
/// limit)` combination is its own entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn list(collection: CacheTag, page: u32, limit: u32) -> Self {
        Self(format!("{collection}-{page}-{limit}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
