use url::form_urlencoded;

/// Filter and page state owned by the widget, mirrored in the address bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSearchState {
    pub keyword: String,
    pub category_id: u64,
    /// In the order the user selected them
    pub tag_ids: Vec<u64>,
    pub page: u64,
    pub loading: bool,
    pub initial_load_completed: bool,
}

impl Default for ClientSearchState {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            category_id: 0,
            tag_ids: Vec::new(),
            page: 1,
            loading: false,
            initial_load_completed: false,
        }
    }
}

/// Everything the user can do to the filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Form submission with all three filters at once
    Submit {
        keyword: String,
        category_id: u64,
        tag_ids: Vec<u64>,
    },
    SubmitKeyword(String),
    SelectCategory(u64),
    ToggleTag(u64),
    GoToPage(u64),
    ClearFilters,
}

fn push_unique(ids: &mut Vec<u64>, id: u64) {
    if !ids.contains(&id) {
        ids.push(id);
    }
}

impl ClientSearchState {
    /// Reads `q`, `cat`, `tags[]` and `page` from the address bar. Tags are
    /// also accepted as `tags=` and comma-separated lists, as the endpoint
    /// does. Values that don't parse fall back to their defaults.
    pub fn from_query_string(query: &str) -> ClientSearchState {
        let mut state = ClientSearchState::default();
        for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            match key.as_ref() {
                "q" => state.keyword = value.into_owned(),
                "cat" => state.category_id = value.trim().parse().unwrap_or(0),
                "tags[]" | "tags" => {
                    for id in value.split(',').filter_map(|t| t.trim().parse().ok()) {
                        push_unique(&mut state.tag_ids, id);
                    }
                }
                "page" => state.page = value.trim().parse::<u64>().unwrap_or(1).max(1),
                _ => {}
            }
        }
        state
    }

    /// The address-bar form of the filters. Defaults are left out, so an
    /// unfiltered first page is the empty string.
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
        if self.page > 1 {
            serializer.append_pair("page", &self.page.to_string());
        }
        serializer.finish()
    }

    /// Copies only the filter fields of `other`, keeping the UI flags.
    pub fn with_filters_of(&self, other: &ClientSearchState) -> ClientSearchState {
        ClientSearchState {
            keyword: other.keyword.clone(),
            category_id: other.category_id,
            tag_ids: other.tag_ids.clone(),
            page: other.page,
            ..self.clone()
        }
    }

    /// The single state-update function: every filter change resets to page 1,
    /// only pagination moves the page.
    pub fn apply(&self, action: &Action) -> ClientSearchState {
        let mut next = self.clone();
        next.page = 1;
        match action {
            Action::Submit {
                keyword,
                category_id,
                tag_ids,
            } => {
                next.keyword = keyword.trim().to_string();
                next.category_id = *category_id;
                next.tag_ids.clear();
                for id in tag_ids {
                    push_unique(&mut next.tag_ids, *id);
                }
            }
            Action::SubmitKeyword(keyword) => next.keyword = keyword.trim().to_string(),
            Action::SelectCategory(id) => next.category_id = *id,
            Action::ToggleTag(id) => {
                if let Some(pos) = next.tag_ids.iter().position(|t| t == id) {
                    next.tag_ids.remove(pos);
                } else {
                    next.tag_ids.push(*id);
                }
            }
            Action::GoToPage(page) => next.page = (*page).max(1),
            Action::ClearFilters => {
                next.keyword.clear();
                next.category_id = 0;
                next.tag_ids.clear();
            }
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_round_trip() {
        let state = ClientSearchState {
            keyword: "rust async".into(),
            category_id: 5,
            tag_ids: vec![7, 9],
            page: 2,
            ..Default::default()
        };
        let query = state.to_query_string();
        assert_eq!(query, "q=rust+async&cat=5&tags%5B%5D=7&tags%5B%5D=9&page=2");
        assert_eq!(ClientSearchState::from_query_string(&query), state);
    }

    #[test]
    fn test_defaults_are_omitted() {
        assert_eq!(ClientSearchState::default().to_query_string(), "");
        let state = ClientSearchState {
            keyword: "x".into(),
            ..Default::default()
        };
        assert_eq!(state.to_query_string(), "q=x");
    }

    #[test]
    fn test_garbage_url_falls_back_to_defaults() {
        let state = ClientSearchState::from_query_string("?cat=abc&page=-2&tags[]=x&tags[]=4&other=1");
        assert_eq!(state.category_id, 0);
        assert_eq!(state.page, 1);
        assert_eq!(state.tag_ids, vec![4]);
    }

    #[test]
    fn test_shared_link_tag_forms() {
        let state = ClientSearchState::from_query_string("?tags=7,9&tags[]=3&tags=9");
        assert_eq!(state.tag_ids, vec![7, 9, 3]);
        // Re-emitted in the canonical form
        assert_eq!(
            state.to_query_string(),
            "tags%5B%5D=7&tags%5B%5D=9&tags%5B%5D=3"
        );
    }

    #[test]
    fn test_filter_changes_reset_page() {
        let state = ClientSearchState {
            page: 4,
            tag_ids: vec![3],
            ..Default::default()
        };
        assert_eq!(state.apply(&Action::SubmitKeyword(" news ".into())).keyword, "news");
        assert_eq!(state.apply(&Action::SubmitKeyword("news".into())).page, 1);
        assert_eq!(state.apply(&Action::SelectCategory(2)).page, 1);

        let toggled = state.apply(&Action::ToggleTag(8));
        assert_eq!(toggled.tag_ids, vec![3, 8]);
        assert_eq!(toggled.page, 1);
        assert_eq!(toggled.apply(&Action::ToggleTag(3)).tag_ids, vec![8]);
    }

    #[test]
    fn test_go_to_page_sets_page_directly() {
        let state = ClientSearchState {
            keyword: "kept".into(),
            ..Default::default()
        };
        let next = state.apply(&Action::GoToPage(3));
        assert_eq!(next.page, 3);
        assert_eq!(next.keyword, "kept");
        assert_eq!(state.apply(&Action::GoToPage(0)).page, 1);
    }

    #[test]
    fn test_clear_filters() {
        let state = ClientSearchState {
            keyword: "a".into(),
            category_id: 2,
            tag_ids: vec![1, 2],
            page: 5,
            initial_load_completed: true,
            ..Default::default()
        };
        let cleared = state.apply(&Action::ClearFilters);
        assert_eq!(
            cleared,
            ClientSearchState {
                initial_load_completed: true,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_submit_replaces_all_filters() {
        let state = ClientSearchState {
            tag_ids: vec![1],
            page: 3,
            ..Default::default()
        };
        let next = state.apply(&Action::Submit {
            keyword: "q".into(),
            category_id: 4,
            tag_ids: vec![9, 9, 2],
        });
        assert_eq!(next.tag_ids, vec![9, 2]);
        assert_eq!(next.category_id, 4);
        assert_eq!(next.page, 1);
    }
}
