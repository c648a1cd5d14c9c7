use chrono::DateTime;
use std::fmt::Write;

use crate::analyzer::sanitize_text;

use super::api::SearchApi;
use super::controller::{Phase, SearchController};
use super::history::History;

/// Pages shown on each side of the current one.
const PAGE_WINDOW: u64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u64),
    Ellipsis,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationControls {
    pub items: Vec<PageItem>,
    pub current: u64,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

/// First, last and the pages within two of `current`, gaps collapsed to one ellipsis.
pub fn pagination_items(current: u64, pages: u64) -> Vec<PageItem> {
    let mut items = Vec::new();
    for page in 1..=pages {
        let near = page + PAGE_WINDOW >= current && page <= current.saturating_add(PAGE_WINDOW);
        if page == 1 || page == pages || near {
            items.push(PageItem::Page(page));
        } else if items.last() != Some(&PageItem::Ellipsis) {
            items.push(PageItem::Ellipsis);
        }
    }
    items
}

/// `None` when pagination is switched off or everything fits on one page.
pub fn pagination(show_pagination: bool, current: u64, pages: u64) -> Option<PaginationControls> {
    if !show_pagination || pages <= 1 {
        return None;
    }
    Some(PaginationControls {
        items: pagination_items(current, pages),
        current,
        prev_enabled: current > 1,
        next_enabled: current < pages,
    })
}

pub fn results_count_label(total: u64) -> String {
    let noun = if total == 1 { "result" } else { "results" };
    format!("Found {total} {noun}")
}

/// `2024-01-05T…` → `January 5, 2024`. Unparseable input is returned as is.
pub fn format_date(date: &str) -> String {
    DateTime::parse_from_rfc3339(date)
        .map(|d| d.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|_| date.to_string())
}

impl<A: SearchApi + 'static, H: History> SearchController<A, H> {
    pub fn pagination(&self) -> Option<PaginationControls> {
        pagination(
            self.config().show_pagination,
            self.state().page,
            self.results().pages,
        )
    }

    /// Plain-text rendering of the form state and the current results.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let state = self.state();

        let category = self
            .categories()
            .iter()
            .find(|c| c.id == state.category_id)
            .map(|c| c.name.as_str())
            .unwrap_or("All Categories");
        let _ = writeln!(out, "Search: {:?}  Category: {}", state.keyword, category);
        if self.config().show_tags && !state.tag_ids.is_empty() {
            let names: Vec<String> = state
                .tag_ids
                .iter()
                .map(|id| {
                    self.tags()
                        .iter()
                        .find(|t| t.id == *id)
                        .map(|t| t.name.clone())
                        .unwrap_or_else(|| id.to_string())
                })
                .collect();
            let _ = writeln!(out, "Tags: {}", names.join(", "));
        }
        out.push('\n');

        if state.loading {
            out.push_str("Loading results...\n");
            return out;
        }
        if let Phase::Error(message) = self.phase() {
            let _ = writeln!(out, "Search failed: {message}");
        }

        let results = self.results();
        if results.posts.is_empty() {
            out.push_str("No posts found\nTry adjusting your search filters or search terms\n");
            return out;
        }

        let _ = writeln!(out, "{}\n", results_count_label(results.total));
        for post in &results.posts {
            if !post.categories.is_empty() {
                let names: Vec<&str> = post.categories.iter().map(|c| c.name.as_str()).collect();
                let _ = writeln!(out, "[{}]", names.join("] ["));
            }
            let _ = writeln!(out, "{}", post.title);
            let _ = writeln!(out, "  By {} | {}", post.author, format_date(&post.date));
            let excerpt = sanitize_text(&post.excerpt);
            if !excerpt.is_empty() {
                let _ = writeln!(out, "  {excerpt}");
            }
            if !post.tags.is_empty() {
                let names: Vec<String> = post.tags.iter().map(|t| format!("#{}", t.name)).collect();
                let _ = writeln!(out, "  {}", names.join(" "));
            }
            let _ = writeln!(out, "  {}\n", post.link);
        }

        if let Some(controls) = self.pagination() {
            let mut line = String::from(if controls.prev_enabled { "< Previous" } else { "  Previous" });
            for item in &controls.items {
                match item {
                    PageItem::Page(p) if *p == controls.current => {
                        let _ = write!(line, " [{p}]");
                    }
                    PageItem::Page(p) => {
                        let _ = write!(line, " {p}");
                    }
                    PageItem::Ellipsis => line.push_str(" ..."),
                }
            }
            line.push_str(if controls.next_enabled { " Next >" } else { " Next  " });
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}
