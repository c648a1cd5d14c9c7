//! Configuration the host renders onto the widget container.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::query::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    pub show_tags: bool,
    pub show_pagination: bool,
    pub posts_per_page: u64,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            show_tags: true,
            show_pagination: true,
            posts_per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

fn clamp_page_size(n: u64) -> u64 {
    n.clamp(1, MAX_PAGE_SIZE)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim() {
        "true" | "1" => Some(true),
        "false" | "0" | "" => Some(false),
        _ => None,
    }
}

impl WidgetConfig {
    /// Reads the JSON blob from the container's `data-attributes`. Each known
    /// field is taken only if it has the right type; anything else keeps its default.
    pub fn from_blob(blob: &str) -> WidgetConfig {
        let defaults = WidgetConfig::default();
        let fields: Map<String, Value> = match serde_json::from_str(blob) {
            Ok(Value::Object(fields)) => fields,
            Ok(other) => {
                log::warn!("widget attributes are not an object ({other}), using defaults");
                return defaults;
            }
            Err(e) => {
                log::warn!("widget attributes are not valid JSON ({e}), using defaults");
                return defaults;
            }
        };

        let mut config = defaults;
        for (key, value) in fields {
            match (key.as_str(), value) {
                ("showTags", Value::Bool(b)) => config.show_tags = b,
                ("showPagination", Value::Bool(b)) => config.show_pagination = b,
                ("postsPerPage", Value::Number(n)) => {
                    if let Some(n) = n.as_i64() {
                        config.posts_per_page = clamp_page_size(n.max(1) as u64);
                    }
                }
                (known @ ("showTags" | "showPagination" | "postsPerPage"), other) => {
                    log::warn!("widget attribute {known} has unexpected value {other}, ignored");
                }
                (unknown, _) => log::debug!("ignoring unknown widget attribute {unknown}"),
            }
        }
        config
    }

    /// Reads the `data-show-tags`, `data-show-pagination` and `data-posts-per-page`
    /// attribute form of the same configuration.
    pub fn from_data_attributes<'a>(
        attributes: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> WidgetConfig {
        let mut config = WidgetConfig::default();
        for (name, value) in attributes {
            match name {
                "data-show-tags" => {
                    if let Some(b) = parse_flag(value) {
                        config.show_tags = b;
                    }
                }
                "data-show-pagination" => {
                    if let Some(b) = parse_flag(value) {
                        config.show_pagination = b;
                    }
                }
                "data-posts-per-page" => {
                    if let Ok(n) = value.trim().parse::<i64>() {
                        config.posts_per_page = clamp_page_size(n.max(1) as u64);
                    }
                }
                _ => {}
            }
        }
        config
    }
}
