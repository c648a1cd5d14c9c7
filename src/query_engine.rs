use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

use crate::analyzer::{SearchTerms, TextAnalyzer, sanitize_text};
use crate::data_models::{Article, TermSummary};
use crate::errors::SearchError;
use crate::query::SearchQuery;
use crate::store::ContentStore;

/// Words kept when an excerpt has to be generated from the article body.
pub const EXCERPT_WORDS: usize = 55;
const EXCERPT_MORE: &str = " […]";

/// One article as returned to clients: taxonomy as summaries, no body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleView {
    pub id: u64,
    pub title: String,
    pub excerpt: String,
    /// RFC 3339 publication timestamp
    pub date: String,
    pub link: String,
    pub author: String,
    pub categories: Vec<TermSummary>,
    pub tags: Vec<TermSummary>,
    pub featured_image: Option<String>,
}

impl From<&Article> for ArticleView {
    fn from(article: &Article) -> Self {
        ArticleView {
            id: article.id,
            title: article.title.clone(),
            excerpt: excerpt_for(article),
            date: article.published_at.to_rfc3339(),
            link: article.url.clone(),
            author: article.author.clone(),
            categories: article.categories.clone(),
            tags: article.tags.clone(),
            featured_image: article.featured_image_url.clone(),
        }
    }
}

/// The stored excerpt, or the first [`EXCERPT_WORDS`] words of the body.
pub fn excerpt_for(article: &Article) -> String {
    if !article.excerpt.trim().is_empty() {
        return article.excerpt.clone();
    }
    let text = sanitize_text(&article.content);
    let words: Vec<&str> = text.split(' ').filter(|w| !w.is_empty()).collect();
    if words.len() > EXCERPT_WORDS {
        format!("{}{}", words[..EXCERPT_WORDS].join(" "), EXCERPT_MORE)
    } else {
        words.join(" ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub articles: Vec<ArticleView>,
    pub total_matches: u64,
    pub total_pages: u64,
    pub current_page: u64,
}

/// `ceil(total / page_size)`, 0 when there is nothing to page through.
pub fn total_pages(total_matches: u64, page_size: u64) -> u64 {
    if total_matches == 0 || page_size == 0 {
        return 0;
    }
    total_matches.div_ceil(page_size)
}

/// Every criterion of a [`SearchQuery`] in matchable form.
pub struct ArticleFilter<'q> {
    query: &'q SearchQuery,
    terms: SearchTerms,
}

impl<'q> ArticleFilter<'q> {
    pub fn new(query: &'q SearchQuery, analyzer: &TextAnalyzer) -> Self {
        Self {
            query,
            terms: SearchTerms::parse(analyzer, &query.keyword),
        }
    }

    pub fn matches(&self, article: &Article) -> bool {
        if !article.is_published() {
            return false;
        }
        if self.query.category_id > 0 && !article.in_category(self.query.category_id) {
            return false;
        }
        if !self.query.tag_ids.is_empty() && !article.has_any_tag(self.query.tag_ids.iter()) {
            return false;
        }
        if self.terms.is_empty() {
            return true;
        }

        let title = article.title.to_lowercase();
        let excerpt = sanitize_text(&article.excerpt).to_lowercase();
        let content = sanitize_text(&article.content).to_lowercase();
        self.terms.matches(&[&title, &excerpt, &content])
    }
}

/// Most recent first; id breaks ties so the order never depends on the store.
fn newest_first(a: &Article, b: &Article) -> Ordering {
    b.published_at
        .cmp(&a.published_at)
        .then_with(|| b.id.cmp(&a.id))
}

pub struct ArticleFilterEngine {
    store: Arc<dyn ContentStore>,
    analyzer: TextAnalyzer,
}

impl ArticleFilterEngine {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            store,
            analyzer: TextAnalyzer::search_terms(),
        }
    }

    pub fn analyzer(&self) -> &TextAnalyzer {
        &self.analyzer
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResult, SearchError> {
        let start = Instant::now();

        let articles = self
            .store
            .published_articles()
            .await
            .map_err(SearchError::HostUnavailable)?;
        let candidates = articles.len();

        let filter = ArticleFilter::new(query, &self.analyzer);
        let mut matches: Vec<Article> = articles.into_iter().filter(|a| filter.matches(a)).collect();
        matches.sort_by(newest_first);

        let total_matches = matches.len() as u64;
        let window: Vec<ArticleView> = matches
            .iter()
            .skip(query.offset())
            .take(query.page_size as usize)
            .map(ArticleView::from)
            .collect();

        log::debug!(
            "search q={:?} cat={} tags={:?} page={} -> {}/{} matches, {} returned in {}ms",
            query.keyword,
            query.category_id,
            query.tag_ids,
            query.page,
            total_matches,
            candidates,
            window.len(),
            start.elapsed().as_millis()
        );

        Ok(SearchResult {
            articles: window,
            total_matches,
            total_pages: total_pages(total_matches, query.page_size),
            current_page: query.page,
        })
    }
}

#[test]
fn test_total_pages() {
    assert_eq!(total_pages(0, 10), 0);
    assert_eq!(total_pages(1, 10), 1);
    assert_eq!(total_pages(10, 10), 1);
    assert_eq!(total_pages(11, 10), 2);
    assert_eq!(total_pages(25, 10), 3);
    assert_eq!(total_pages(25, 1), 25);
}

#[test]
fn test_excerpt_generated_from_content() {
    use chrono::Utc;

    let mut article = Article::new(1, "Long", Utc::now());
    article.content = format!("<p>{}</p>", vec!["word"; 60].join(" "));
    let excerpt = excerpt_for(&article);
    assert!(excerpt.ends_with(" […]"));
    assert_eq!(excerpt.trim_end_matches(" […]").split(' ').count(), EXCERPT_WORDS);

    article.content = "<p>Short <em>body</em></p>".into();
    assert_eq!(excerpt_for(&article), "Short body");

    article.excerpt = "<strong>Hand</strong> written".into();
    assert_eq!(excerpt_for(&article), "<strong>Hand</strong> written");
}
