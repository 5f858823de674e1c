// file: src/models/search_result.rs
// description: search result records handed from the search stage to extraction
// reference: internal data structures

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRecord {
    pub content: String,
    /// True for records fabricated by the placeholder search.
    pub synthetic: bool,
}

impl SearchRecord {
    pub fn synthetic(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            synthetic: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultSet {
    /// Search queries the model proposed. Currently unused by retrieval.
    pub generated_queries: String,
    pub results: Vec<SearchRecord>,
}

impl SearchResultSet {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl fmt::Display for SearchResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let contents: Vec<&str> = self.results.iter().map(|r| r.content.as_str()).collect();
        write!(f, "[{}]", contents.join(", "))
    }
}
