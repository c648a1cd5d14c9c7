use anyhow::Result;
use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use chrono::{Duration, TimeZone, Utc};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use article_search::api::models::SearchResponse;
use article_search::api::{AppState, api_router, create_router};
use article_search::data_models::{Article, Category, Tag, TermSummary};
use article_search::store::{ContentStore, Corpus, InMemoryStore};

fn corpus() -> Corpus {
    let base = Utc.with_ymd_and_hms(2024, 1, 31, 8, 0, 0).unwrap();
    let articles = (1..=25)
        .map(|id| {
            let mut a = Article::new(id, format!("Post {id}"), base - Duration::hours(id as i64));
            if id % 5 == 0 {
                a.categories.push(TermSummary::new(5, "Guides", "guides"));
            }
            if id == 2 {
                a.tags.push(TermSummary::new(7, "rust", "rust"));
            }
            a
        })
        .collect();
    Corpus {
        articles,
        categories: vec![
            Category {
                id: 5,
                name: "Guides".into(),
                slug: "guides".into(),
                count: 5,
            },
            Category {
                id: 1,
                name: "Announcements".into(),
                slug: "announcements".into(),
                count: 0,
            },
        ],
        tags: vec![
            Tag {
                id: 7,
                name: "rust".into(),
                slug: "rust".into(),
                count: 1,
            },
            Tag {
                id: 8,
                name: "Go".into(),
                slug: "go".into(),
                count: 0,
            },
        ],
    }
}

fn app() -> Router {
    let store = Arc::new(InMemoryStore::new(corpus()));
    api_router(Arc::new(AppState::new(store)))
}

async fn get(app: Router, uri: &str) -> Result<(StatusCode, Vec<u8>)> {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty())?)
        .await?;
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, body.to_vec()))
}

#[tokio::test]
async fn test_search_defaults() -> Result<()> {
    let (status, body) = get(app(), "/search").await?;
    assert_eq!(status, StatusCode::OK);

    let response: SearchResponse = serde_json::from_slice(&body)?;
    assert_eq!(response.total, 25);
    assert_eq!(response.pages, 3);
    assert_eq!(response.current_page, 1);
    assert_eq!(response.posts.len(), 10);
    assert_eq!(response.posts[0].id, 1);
    Ok(())
}

#[tokio::test]
async fn test_search_wire_shape() -> Result<()> {
    let (_, body) = get(app(), "/search?tags%5B%5D=7").await?;
    let json: Value = serde_json::from_slice(&body)?;

    assert_eq!(json["total"], 1);
    assert_eq!(json["pages"], 1);
    assert_eq!(json["current_page"], 1);
    let post = &json["posts"][0];
    assert_eq!(post["id"], 2);
    assert_eq!(post["title"], "Post 2");
    assert_eq!(post["tags"][0]["slug"], "rust");
    assert!(post["featured_image"].is_null());
    for key in ["excerpt", "date", "link", "author", "categories"] {
        assert!(post.get(key).is_some(), "missing {key}");
    }
    Ok(())
}

#[tokio::test]
async fn test_search_malformed_params_are_normalized() -> Result<()> {
    let (status, body) = get(
        app(),
        "/search?cat=abc&page=-3&per_page=9999&tags%5B%5D=x&q=%3Cb%3E%3C%2Fb%3E",
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let response: SearchResponse = serde_json::from_slice(&body)?;
    assert_eq!(response.current_page, 1);
    assert_eq!(response.total, 25);
    assert_eq!(response.pages, 1);
    assert_eq!(response.posts.len(), 25);
    Ok(())
}

#[tokio::test]
async fn test_search_category_and_out_of_range_page() -> Result<()> {
    let (_, body) = get(app(), "/search?cat=5&per_page=2&page=99").await?;
    let response: SearchResponse = serde_json::from_slice(&body)?;
    assert_eq!(response.total, 5);
    assert_eq!(response.pages, 3);
    assert_eq!(response.current_page, 99);
    assert!(response.posts.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_search_oversized_numbers_saturate() -> Result<()> {
    let huge = "99999999999999999999999";

    let (_, body) = get(app(), &format!("/search?cat={huge}")).await?;
    let response: SearchResponse = serde_json::from_slice(&body)?;
    assert_eq!(response.total, 0);

    let (_, body) = get(app(), &format!("/search?tags%5B%5D={huge}")).await?;
    let response: SearchResponse = serde_json::from_slice(&body)?;
    assert_eq!(response.total, 0);

    let (_, body) = get(app(), &format!("/search?per_page={huge}&page={huge}")).await?;
    let response: SearchResponse = serde_json::from_slice(&body)?;
    assert_eq!(response.total, 25);
    assert_eq!(response.pages, 1);
    assert_eq!(response.current_page, u64::MAX);
    assert!(response.posts.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_categories_and_tags_ordered_by_name() -> Result<()> {
    let (status, body) = get(app(), "/categories").await?;
    assert_eq!(status, StatusCode::OK);
    let categories: Vec<Category> = serde_json::from_slice(&body)?;
    let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Announcements", "Guides"]);
    assert_eq!(categories[0].count, 0);

    let (_, body) = get(app(), "/tags").await?;
    let tags: Vec<Tag> = serde_json::from_slice(&body)?;
    let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Go", "rust"]);
    Ok(())
}

#[tokio::test]
async fn test_health() -> Result<()> {
    let (status, body) = get(app(), "/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, br#"{"status":"ok"}"#);
    Ok(())
}

#[tokio::test]
async fn test_full_router_mounts_api_under_prefix() -> Result<()> {
    let store = Arc::new(InMemoryStore::new(corpus()));
    let router = create_router(Arc::new(AppState::new(store)), "does-not-exist");

    let (status, _) = get(router.clone(), "/api/tags").await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(router, "/missing.css").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

struct DownStore;

#[async_trait]
impl ContentStore for DownStore {
    async fn published_articles(&self) -> Result<Vec<Article>> {
        anyhow::bail!("store offline")
    }
    async fn categories(&self) -> Result<Vec<Category>> {
        anyhow::bail!("store offline")
    }
    async fn tags(&self) -> Result<Vec<Tag>> {
        anyhow::bail!("store offline")
    }
}

#[tokio::test]
async fn test_store_down_is_service_unavailable() -> Result<()> {
    let router = api_router(Arc::new(AppState::new(Arc::new(DownStore))));
    for uri in ["/search", "/categories", "/tags"] {
        let (status, body) = get(router.clone(), uri).await?;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{uri}");
        assert!(String::from_utf8(body)?.contains("store offline"));
    }
    Ok(())
}
