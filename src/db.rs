use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::options::ClientOptions;
use mongodb::{
    Client, Collection, Database as MongoDatabase,
    bson::{Document, doc},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::config::CONFIG;
use crate::data_models::{Article, Category, Tag};
use crate::store::{ContentStore, Corpus};

/// Collection names as constants for consistency
pub mod collections {
    pub const ARTICLES: &str = "articles";
    pub const CATEGORIES: &str = "categories";
    pub const TAGS: &str = "tags";
}

/// Main database wrapper providing connection management and collection access
#[derive(Debug, Clone)]
pub struct Database {
    client: Client,
    db: MongoDatabase,
}

impl Database {
    /// Create a new Database instance with custom URI and database name.
    /// Useful for testing with a different database.
    pub async fn new(uri: &str, db_name: &str) -> Result<Self> {
        let client_options = ClientOptions::parse(uri)
            .await
            .context("Failed to parse MongoDB connection string")?;

        let client =
            Client::with_options(client_options).context("Failed to create MongoDB client")?;

        // Ping the database to verify connection
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .context("Failed to connect to MongoDB")?;

        log::info!("Connected to MongoDB database: {}", db_name);

        let db = client.database(db_name);

        Ok(Self { client, db })
    }

    /// Create a Database instance using environment configuration
    pub async fn from_config() -> Result<Self> {
        let uri = CONFIG
            .mongo_uri
            .as_deref()
            .context("MONGO_URI is not set")?;
        Self::new(uri, &CONFIG.mongo_db_name).await
    }

    /// Get a typed collection by name
    pub fn collection<T>(&self, name: &str) -> Collection<T>
    where
        T: Send + Sync,
    {
        self.db.collection(name)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn articles_repo(&self) -> Repository<Article> {
        Repository::new(self.collection(collections::ARTICLES))
    }

    pub fn categories_repo(&self) -> Repository<Category> {
        Repository::new(self.collection(collections::CATEGORIES))
    }

    pub fn tags_repo(&self) -> Repository<Tag> {
        Repository::new(self.collection(collections::TAGS))
    }
}

/// Thin typed wrapper over a collection.
pub struct Repository<T>
where
    T: Send + Sync,
{
    collection: Collection<T>,
}

impl<T> Repository<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    pub fn new(collection: Collection<T>) -> Self {
        Self { collection }
    }

    /// Insert multiple documents, returns how many were written
    pub async fn insert_many(&self, docs: &[T]) -> Result<usize> {
        if docs.is_empty() {
            return Ok(0);
        }
        let result = self
            .collection
            .insert_many(docs)
            .await
            .context("Failed to insert documents")?;
        Ok(result.inserted_ids.len())
    }

    /// Find all documents matching a filter
    pub async fn find(&self, filter: Document) -> Result<Vec<T>> {
        let cursor = self
            .collection
            .find(filter)
            .await
            .context("Failed to execute find query")?;

        cursor
            .try_collect()
            .await
            .context("Failed to collect results")
    }

    pub async fn find_all(&self) -> Result<Vec<T>> {
        self.find(doc! {}).await
    }

    /// Delete multiple documents matching a filter
    pub async fn delete_many(&self, filter: Document) -> Result<u64> {
        let result = self
            .collection
            .delete_many(filter)
            .await
            .context("Failed to delete documents")?;

        Ok(result.deleted_count)
    }

    /// Count documents matching a filter
    pub async fn count(&self, filter: Document) -> Result<u64> {
        self.collection
            .count_documents(filter)
            .await
            .context("Failed to count documents")
    }
}

/// Content store reading from the `articles`, `categories` and `tags` collections.
#[derive(Debug, Clone)]
pub struct MongoContentStore {
    db: Database,
}

impl MongoContentStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Replaces the stored corpus with `corpus`.
    pub async fn import(&self, corpus: &Corpus) -> Result<()> {
        let articles = self.db.articles_repo();
        let categories = self.db.categories_repo();
        let tags = self.db.tags_repo();

        articles.delete_many(doc! {}).await?;
        categories.delete_many(doc! {}).await?;
        tags.delete_many(doc! {}).await?;

        let a = articles.insert_many(&corpus.articles).await?;
        let c = categories.insert_many(&corpus.categories).await?;
        let t = tags.insert_many(&corpus.tags).await?;
        log::info!("Imported {a} articles, {c} categories, {t} tags");
        Ok(())
    }
}

#[async_trait]
impl ContentStore for MongoContentStore {
    async fn published_articles(&self) -> Result<Vec<Article>> {
        self.db
            .articles_repo()
            .find(doc! { "status": "publish" })
            .await
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        self.db.categories_repo().find_all().await
    }

    async fn tags(&self) -> Result<Vec<Tag>> {
        self.db.tags_repo().find_all().await
    }
}

// =============================================================================
// Test utilities
// =============================================================================

#[cfg(test)]
pub mod test_utils {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static TEST_DB_COUNTER: AtomicUsize = AtomicUsize::new(0);

    /// Create a unique test database name
    pub fn unique_test_db_name() -> String {
        let count = TEST_DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_millis();
        format!("article_search_test_{}_{}", timestamp, count)
    }

    /// Uses MONGO_URI from environment but creates a unique test database.
    pub async fn create_test_db() -> Result<(Database, String)> {
        dotenvy::dotenv().ok();
        let uri =
            std::env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let db_name = unique_test_db_name();
        let db = Database::new(&uri, &db_name).await?;
        Ok((db, db_name))
    }

    pub async fn cleanup_test_db(db: &Database, db_name: &str) -> Result<()> {
        db.client()
            .database(db_name)
            .drop()
            .await
            .context("Failed to drop test database")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_models::PostStatus;
    use chrono::{TimeZone, Utc};
    use test_utils::*;

    #[tokio::test]
    #[ignore = "requires a running MongoDB"]
    async fn test_import_and_read_back() -> Result<()> {
        let (db, db_name) = create_test_db().await?;
        let store = MongoContentStore::new(db.clone());

        let date = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut draft = Article::new(2, "Unfinished", date);
        draft.status = PostStatus::Draft;
        let corpus = Corpus {
            articles: vec![Article::new(1, "Hello", date), draft],
            categories: vec![Category {
                id: 3,
                name: "News".into(),
                slug: "news".into(),
                count: 1,
            }],
            tags: vec![],
        };

        store.import(&corpus).await?;
        assert_eq!(db.articles_repo().count(doc! {}).await?, 2);

        let published = store.published_articles().await?;
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].published_at, date);
        assert_eq!(store.categories().await?.len(), 1);
        assert!(store.tags().await?.is_empty());

        // Importing again replaces rather than appends
        store.import(&corpus).await?;
        assert_eq!(db.articles_repo().count(doc! {}).await?, 2);

        cleanup_test_db(&db, &db_name).await?;
        Ok(())
    }
}
