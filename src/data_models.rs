use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Publication state of an article as tracked by the host.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Publish,
    Draft,
    Pending,
    Private,
    Future,
    Trash,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: u64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub count: u64,
}

/// Same shape as [`Category`] but a separate id space.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: u64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub count: u64,
}

/// Denormalized taxonomy entry carried on an article.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TermSummary {
    pub id: u64,
    pub name: String,
    pub slug: String,
}

impl TermSummary {
    pub fn new(id: u64, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            slug: slug.into(),
        }
    }
}

impl From<&Category> for TermSummary {
    fn from(c: &Category) -> Self {
        TermSummary::new(c.id, c.name.clone(), c.slug.clone())
    }
}

impl From<&Tag> for TermSummary {
    fn from(t: &Tag) -> Self {
        TermSummary::new(t.id, t.name.clone(), t.slug.clone())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Article {
    pub id: u64,

    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub status: PostStatus,
    pub published_at: DateTime<Utc>,
    pub url: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub categories: Vec<TermSummary>,
    #[serde(default)]
    pub tags: Vec<TermSummary>,
    #[serde(default)]
    pub featured_image_url: Option<String>,
}

impl Article {
    pub fn new(id: u64, title: impl Into<String>, published_at: DateTime<Utc>) -> Article {
        Article {
            id,
            title: title.into(),
            excerpt: String::new(),
            content: String::new(),
            status: PostStatus::Publish,
            published_at,
            url: format!("/?p={id}"),
            author: String::new(),
            categories: Vec::new(),
            tags: Vec::new(),
            featured_image_url: None,
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Publish
    }

    pub fn in_category(&self, category_id: u64) -> bool {
        self.categories.iter().any(|c| c.id == category_id)
    }

    pub fn has_any_tag<'a>(&self, mut tag_ids: impl Iterator<Item = &'a u64>) -> bool {
        tag_ids.any(|id| self.tags.iter().any(|t| t.id == *id))
    }
}
