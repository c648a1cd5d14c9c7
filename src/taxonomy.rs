use std::sync::Arc;

use crate::data_models::{Category, Tag};
use crate::errors::SearchError;
use crate::store::ContentStore;

/// Lists every category and tag for the filter controls, empty ones included.
pub struct TaxonomyLister {
    store: Arc<dyn ContentStore>,
}

fn by_name(a_name: &str, a_id: u64, b_name: &str, b_id: u64) -> std::cmp::Ordering {
    a_name
        .to_lowercase()
        .cmp(&b_name.to_lowercase())
        .then(a_id.cmp(&b_id))
}

impl TaxonomyLister {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, SearchError> {
        let mut categories = self
            .store
            .categories()
            .await
            .map_err(SearchError::HostUnavailable)?;
        categories.sort_by(|a, b| by_name(&a.name, a.id, &b.name, b.id));
        Ok(categories)
    }

    pub async fn list_tags(&self) -> Result<Vec<Tag>, SearchError> {
        let mut tags = self
            .store
            .tags()
            .await
            .map_err(SearchError::HostUnavailable)?;
        tags.sort_by(|a, b| by_name(&a.name, a.id, &b.name, b.id));
        Ok(tags)
    }
}
