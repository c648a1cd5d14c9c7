//! Turns raw request parameters into a canonical [`SearchQuery`].
//!
//! Nothing here can fail: every malformed value is clamped or replaced by its default.

use std::collections::BTreeSet;

use crate::analyzer::sanitize_text;

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 50;

/// Parameters exactly as received, before any validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSearchParams {
    pub q: Option<String>,
    pub cat: Option<String>,
    pub tags: Vec<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

impl RawSearchParams {
    /// Reads `q`, `cat`, `tags[]` (also `tags`, comma-separated allowed), `page`
    /// and `per_page` from a URL query string. Unknown keys are ignored; for
    /// repeated scalar keys the last one wins.
    pub fn from_query_string(query: &str) -> RawSearchParams {
        let mut raw = RawSearchParams::default();
        for (key, value) in url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            match key.as_ref() {
                "q" => raw.q = Some(value.into_owned()),
                "cat" => raw.cat = Some(value.into_owned()),
                "page" => raw.page = Some(value.into_owned()),
                "per_page" => raw.per_page = Some(value.into_owned()),
                "tags[]" | "tags" => raw
                    .tags
                    .extend(value.split(',').map(|t| t.to_string()).filter(|t| !t.trim().is_empty())),
                _ => {}
            }
        }
        raw
    }
}

/// Canonical, validated search intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub keyword: String,
    /// 0 means no category filter
    pub category_id: u64,
    /// Empty means no tag filter
    pub tag_ids: BTreeSet<u64>,
    pub page: u64,
    pub page_size: u64,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            category_id: 0,
            tag_ids: BTreeSet::new(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchQuery {
    /// Index of the first match on the requested page.
    pub fn offset(&self) -> usize {
        usize::try_from((self.page - 1).saturating_mul(self.page_size)).unwrap_or(usize::MAX)
    }
}

/// Decimal integer with an optional sign. Magnitudes too large to represent
/// saturate instead of being treated as garbage.
fn parse_int(value: &str) -> Option<i128> {
    let value = value.trim();
    let (negative, digits) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let magnitude = digits.parse::<i128>().unwrap_or(i128::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

fn saturate_u64(n: i128) -> u64 {
    u64::try_from(n.max(0)).unwrap_or(u64::MAX)
}

fn parse_non_negative(value: &str) -> Option<u64> {
    parse_int(value).filter(|n| *n >= 0).map(saturate_u64)
}

pub fn normalize(raw: &RawSearchParams) -> SearchQuery {
    let keyword = raw.q.as_deref().map(sanitize_text).unwrap_or_default();

    let category_id = raw
        .cat
        .as_deref()
        .and_then(parse_non_negative)
        .unwrap_or(0);

    let tag_ids = raw.tags.iter().filter_map(|t| parse_non_negative(t)).collect();

    let page = raw
        .page
        .as_deref()
        .and_then(parse_int)
        .map(|p| saturate_u64(p.max(1)))
        .unwrap_or(1);

    let page_size = raw
        .per_page
        .as_deref()
        .and_then(parse_int)
        .map(|n| saturate_u64(n.clamp(1, MAX_PAGE_SIZE as i128)))
        .unwrap_or(DEFAULT_PAGE_SIZE);

    SearchQuery {
        keyword,
        category_id,
        tag_ids,
        page,
        page_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn raw(q: &str) -> RawSearchParams {
        RawSearchParams::from_query_string(q)
    }

    #[test]
    fn test_defaults_when_absent() {
        assert_eq!(normalize(&RawSearchParams::default()), SearchQuery::default());
    }

    #[test]
    fn test_keyword_is_sanitized() {
        let query = normalize(&raw("q=%20%3Cb%3Erust%3C%2Fb%3E%0A%20async%20"));
        assert_eq!(query.keyword, "rust async");
    }

    #[test]
    fn test_category_rules() {
        assert_eq!(normalize(&raw("cat=5")).category_id, 5);
        assert_eq!(normalize(&raw("cat=-5")).category_id, 0);
        assert_eq!(normalize(&raw("cat=abc")).category_id, 0);
        assert_eq!(normalize(&raw("cat=")).category_id, 0);
        assert_eq!(normalize(&raw("cat=99999999999999999999999")).category_id, u64::MAX);
        assert_eq!(normalize(&raw("cat=-99999999999999999999999")).category_id, 0);
    }

    #[test]
    fn test_tags_rules() {
        let query = normalize(&raw("tags[]=7&tags[]=x&tags[]=-3&tags[]=9&tags[]=7&tags=11,12"));
        assert_eq!(query.tag_ids, BTreeSet::from([7, 9, 11, 12]));

        let huge = normalize(&raw("tags[]=184467440737095516160000"));
        assert_eq!(huge.tag_ids, BTreeSet::from([u64::MAX]));
    }

    #[test]
    fn test_page_rules() {
        assert_eq!(normalize(&raw("page=3")).page, 3);
        assert_eq!(normalize(&raw("page=0")).page, 1);
        assert_eq!(normalize(&raw("page=-4")).page, 1);
        assert_eq!(normalize(&raw("page=two")).page, 1);
        assert_eq!(normalize(&raw("page=1e3")).page, 1);
        assert_eq!(normalize(&raw("page=+2")).page, 2);
        assert_eq!(normalize(&raw("page=99999999999999999999999")).page, u64::MAX);
        assert_eq!(normalize(&raw("page=-99999999999999999999999")).page, 1);
    }

    #[test]
    fn test_page_size_rules() {
        assert_eq!(normalize(&raw("per_page=20")).page_size, 20);
        assert_eq!(normalize(&raw("per_page=500")).page_size, 50);
        assert_eq!(normalize(&raw("per_page=0")).page_size, 1);
        assert_eq!(normalize(&raw("per_page=-1")).page_size, 1);
        assert_eq!(normalize(&raw("per_page=lots")).page_size, 10);
        assert_eq!(normalize(&raw("per_page=99999999999999999999999")).page_size, 50);
        assert_eq!(normalize(&raw("per_page=-99999999999999999999999")).page_size, 1);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let parsed = raw("?foo=bar&q=hello");
        assert_eq!(parsed.q.as_deref(), Some("hello"));
        assert!(parsed.tags.is_empty());
    }

    #[test]
    fn test_offset() {
        let query = SearchQuery {
            page: 3,
            page_size: 10,
            ..Default::default()
        };
        assert_eq!(query.offset(), 20);
        let huge = SearchQuery {
            page: u64::MAX,
            page_size: 50,
            ..Default::default()
        };
        assert_eq!(huge.offset(), usize::MAX);
    }

    proptest! {
        #[test]
        fn prop_normalize_always_in_range(
            q in proptest::option::of(".*"),
            cat in proptest::option::of(".*"),
            tags in proptest::collection::vec(".*", 0..6),
            page in proptest::option::of(prop_oneof![".*".boxed(), any::<i64>().prop_map(|n| n.to_string()).boxed()]),
            per_page in proptest::option::of(prop_oneof![".*".boxed(), any::<i64>().prop_map(|n| n.to_string()).boxed()]),
        ) {
            let query = normalize(&RawSearchParams { q, cat, tags, page, per_page });
            prop_assert!(query.page >= 1);
            prop_assert!((1..=MAX_PAGE_SIZE).contains(&query.page_size));
            prop_assert_eq!(query.keyword.trim(), query.keyword.as_str());
        }

        #[test]
        fn prop_tags_keep_only_non_negative_integers(tags in proptest::collection::vec(any::<i64>(), 0..10)) {
            let raw = RawSearchParams {
                tags: tags.iter().map(|t| t.to_string()).collect(),
                ..Default::default()
            };
            let query = normalize(&raw);
            let expected: BTreeSet<u64> = tags.iter().filter(|t| **t >= 0).map(|t| *t as u64).collect();
            prop_assert_eq!(query.tag_ids, expected);
        }
    }
}
