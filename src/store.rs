use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data_models::{Article, Category, Tag};

/// Read-only view of the host's content. Everything the search core knows
/// about articles and taxonomies comes through this trait.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Articles with status `publish`, in no particular order.
    async fn published_articles(&self) -> Result<Vec<Article>>;

    /// Every category, including ones with no articles.
    async fn categories(&self) -> Result<Vec<Category>>;

    /// Every tag, including ones with no articles.
    async fn tags(&self) -> Result<Vec<Tag>>;
}

/// Serialized corpus, the format of `CORPUS_FILE` and of `import`.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Corpus {
    #[serde(default)]
    pub articles: Vec<Article>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Corpus {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Corpus> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read corpus file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse corpus file {}", path.display()))
    }
}

/// Store backed by a corpus held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    corpus: Corpus,
}

impl InMemoryStore {
    pub fn new(corpus: Corpus) -> Self {
        Self { corpus }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let corpus = Corpus::from_json_file(path)?;
        log::info!(
            "Loaded corpus: {} articles, {} categories, {} tags",
            corpus.articles.len(),
            corpus.categories.len(),
            corpus.tags.len()
        );
        Ok(Self::new(corpus))
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }
}

#[async_trait]
impl ContentStore for InMemoryStore {
    async fn published_articles(&self) -> Result<Vec<Article>> {
        Ok(self
            .corpus
            .articles
            .iter()
            .filter(|a| a.is_published())
            .cloned()
            .collect())
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        Ok(self.corpus.categories.clone())
    }

    async fn tags(&self) -> Result<Vec<Tag>> {
        Ok(self.corpus.tags.clone())
    }
}
