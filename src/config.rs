use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config {
        bind_addr: get_env_or_default("BIND_ADDR", "0.0.0.0:3000"),
        static_dir: get_env_or_default("STATIC_DIR", "static"),
        corpus_file: get_env_opt("CORPUS_FILE"),
        mongo_uri: get_env_opt("MONGO_URI"),
        mongo_db_name: get_env_or_default("MONGO_DB_NAME", "article_search"),
        client_timeout: Duration::from_secs(
            get_env_or_default("CLIENT_TIMEOUT_SECS", "15")
                .parse()
                .unwrap_or(15),
        ),
        log_level: get_env_or_default("LOG_LEVEL", "info"),
    }
});

pub struct Config {
    pub bind_addr: String,
    pub static_dir: String,
    /// JSON corpus served from memory. Takes precedence over MongoDB.
    pub corpus_file: Option<String>,
    pub mongo_uri: Option<String>,
    pub mongo_db_name: String,
    pub client_timeout: Duration,
    pub log_level: String,
}

impl Config {
    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}

fn get_env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
