use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::{Url, form_urlencoded};

use crate::api::models::SearchResponse;
use crate::data_models::{Category, Tag};
use crate::errors::ClientError;

use super::state::ClientSearchState;

/// Parameters of one call to the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub keyword: String,
    pub category_id: u64,
    pub tag_ids: Vec<u64>,
    pub page: u64,
    pub per_page: u64,
}

impl SearchRequest {
    pub fn from_state(state: &ClientSearchState, per_page: u64) -> Self {
        Self {
            keyword: state.keyword.clone(),
            category_id: state.category_id,
            tag_ids: state.tag_ids.clone(),
            page: state.page,
            per_page,
        }
    }

    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        if !self.keyword.is_empty() {
            serializer.append_pair("q", &self.keyword);
        }
        if self.category_id > 0 {
            serializer.append_pair("cat", &self.category_id.to_string());
        }
        for id in &self.tag_ids {
            serializer.append_pair("tags[]", &id.to_string());
        }
        serializer.append_pair("page", &self.page.to_string());
        serializer.append_pair("per_page", &self.per_page.to_string());
        serializer.finish()
    }
}

/// The three read operations of the search endpoint, as seen by the widget.
#[async_trait]
pub trait SearchApi: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ClientError>;
    async fn categories(&self) -> Result<Vec<Category>, ClientError>;
    async fn tags(&self) -> Result<Vec<Tag>, ClientError>;
}

/// [`SearchApi`] over HTTP.
pub struct HttpSearchApi {
    client: reqwest::Client,
    search_url: Url,
    categories_url: Url,
    tags_url: Url,
}

impl HttpSearchApi {
    /// `base` is the API root, e.g. `http://localhost:3000/api/`.
    pub fn new(base: &str) -> Result<Self> {
        let mut base = Url::parse(base).with_context(|| format!("Invalid API base URL {base}"))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            client: reqwest::Client::new(),
            search_url: base.join("search")?,
            categories_url: base.join("categories")?,
            tags_url: base.join("tags")?,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            log::warn!("GET {url} failed with {status}");
            return Err(ClientError::Status(status.as_u16()));
        }
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait]
impl SearchApi for HttpSearchApi {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ClientError> {
        let mut url = self.search_url.clone();
        url.set_query(Some(&request.to_query_string()));
        self.get_json(url).await
    }

    async fn categories(&self) -> Result<Vec<Category>, ClientError> {
        self.get_json(self.categories_url.clone()).await
    }

    async fn tags(&self) -> Result<Vec<Tag>, ClientError> {
        self.get_json(self.tags_url.clone()).await
    }
}
