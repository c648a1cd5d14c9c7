pub mod analyzer;
pub mod api;
pub mod client;
pub mod config;
pub mod data_models;
pub mod db;
pub mod errors;
pub mod query;
pub mod query_engine;
pub mod store;
pub mod taxonomy;
pub mod widget;
