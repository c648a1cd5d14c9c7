use serde::{Deserialize, Serialize};

use crate::query_engine::{ArticleView, SearchResult};

/// Body of `GET /api/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub posts: Vec<ArticleView>,
    pub total: u64,
    pub pages: u64,
    pub current_page: u64,
}

impl SearchResponse {
    pub fn empty(current_page: u64) -> Self {
        Self {
            posts: Vec::new(),
            total: 0,
            pages: 0,
            current_page,
        }
    }
}

impl From<SearchResult> for SearchResponse {
    fn from(result: SearchResult) -> Self {
        Self {
            posts: result.articles,
            total: result.total_matches,
            pages: result.total_pages,
            current_page: result.current_page,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
