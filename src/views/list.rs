use chrono::{DateTime, Utc};

use super::Route;
use crate::api::types::Setting;
use crate::api::SettingsApi;
use crate::error::AppError;
use crate::format::{format_relative, truncate_chars, truncate_value, type_badge};

/// Rows per page.
pub const PAGE_SIZE: usize = 20;

const KEY_COLUMN_MAX: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState {
    Loading,
    Loaded,
    /// Terminal: the table is replaced by this message.
    Failed(String),
}

/// Landing page: every setting, most recently updated first, with a key
/// search and fixed-size pages.
#[derive(Debug)]
pub struct ListView {
    state: ListState,
    settings: Vec<Setting>,
    /// Indices into `settings` matching the current query, in display order.
    filtered: Vec<usize>,
    query: String,
    page: usize,
}

impl Default for ListView {
    fn default() -> Self {
        Self::new()
    }
}

impl ListView {
    pub fn new() -> Self {
        Self {
            state: ListState::Loading,
            settings: Vec::new(),
            filtered: Vec::new(),
            query: String::new(),
            page: 1,
        }
    }

    /// Fetch-on-mount. A failure is kept as the terminal view state and also
    /// returned so the caller can react to auth failures.
    pub async fn load(&mut self, api: &dyn SettingsApi) -> Result<(), AppError> {
        self.state = ListState::Loading;
        match api.list().await {
            Ok(settings) => {
                tracing::debug!(count = settings.len(), "settings loaded");
                self.set_settings(settings);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(kind = e.kind(), "Failed to load settings: {}", e);
                self.settings.clear();
                self.filtered.clear();
                self.state = ListState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Replace the data set, ordering it by recency.
    pub fn set_settings(&mut self, mut settings: Vec<Setting>) {
        settings.sort_by(|a, b| {
            b.last_modified()
                .cmp(&a.last_modified())
                .then_with(|| a.key.cmp(&b.key))
        });
        self.settings = settings;
        self.state = ListState::Loaded;
        self.refilter();
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Update the key filter. Case-insensitive substring, key only. Always
    /// returns to the first page.
    pub fn search(&mut self, query: &str) {
        self.query = query.to_string();
        self.refilter();
    }

    fn refilter(&mut self) {
        let needle = self.query.to_lowercase();
        self.filtered = self
            .settings
            .iter()
            .enumerate()
            .filter(|(_, s)| s.key.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect();
        self.page = 1;
    }

    pub fn filtered(&self) -> impl Iterator<Item = &Setting> {
        self.filtered.iter().map(|&i| &self.settings[i])
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    /// True once loaded with no settings at all (not merely none matching).
    pub fn is_empty_state(&self) -> bool {
        self.state == ListState::Loaded && self.settings.is_empty()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total_pages(&self) -> usize {
        self.filtered.len().div_ceil(PAGE_SIZE).max(1)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.page + 1);
    }

    pub fn prev_page(&mut self) {
        self.go_to_page(self.page.saturating_sub(1));
    }

    /// Jump to `page`, clamped to the valid range.
    pub fn go_to_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages());
    }

    /// Rows on the current page.
    pub fn visible(&self) -> Vec<&Setting> {
        let start = (self.page - 1) * PAGE_SIZE;
        self.filtered
            .iter()
            .skip(start)
            .take(PAGE_SIZE)
            .map(|&i| &self.settings[i])
            .collect()
    }

    /// Detail route for a 1-based row number on the current page.
    pub fn route_for_row(&self, row: usize) -> Option<Route> {
        let setting = self.visible().into_iter().nth(row.checked_sub(1)?)?;
        Some(Route::Detail(Some(setting.key.clone())))
    }

    pub fn render(&self, now: DateTime<Utc>) -> String {
        let mut out = String::from("Dynamic Settings\n\n");

        match &self.state {
            ListState::Loading => {
                out.push_str("Loading settings...");
                return out;
            }
            ListState::Failed(message) => {
                out.push_str(&format!("Error: {message}"));
                return out;
            }
            ListState::Loaded => {}
        }

        if self.is_empty_state() {
            out.push_str("No settings yet.\nType `new` to create your first setting.");
            return out;
        }

        out.push_str(&format!("Search by key: {}\n\n", self.query));

        let rows = self.visible();
        if rows.is_empty() {
            out.push_str(&format!("No settings match '{}'.\n", self.query));
        } else {
            let key_width = rows
                .iter()
                .map(|s| s.key.chars().count().min(KEY_COLUMN_MAX))
                .max()
                .unwrap_or(3)
                .max(3);
            out.push_str(&format!(
                "{:>3}  {:<key_width$}  {:<7}  {:<53}  {}\n",
                "#", "KEY", "TYPE", "VALUE", "UPDATED"
            ));
            for (i, setting) in rows.iter().enumerate() {
                let updated = setting
                    .last_modified()
                    .map(|at| format_relative(at, now))
                    .unwrap_or_else(|| "-".to_string());
                out.push_str(&format!(
                    "{:>3}  {:<key_width$}  {}  {:<53}  {}\n",
                    i + 1,
                    truncate_chars(&setting.key, KEY_COLUMN_MAX),
                    type_badge(setting.value_type),
                    truncate_value(&single_line(&setting.value)),
                    updated,
                ));
            }
        }

        let prev = if self.has_prev() { "< Prev" } else { "      " };
        let next = if self.has_next() { "Next >" } else { "      " };
        out.push_str(&format!(
            "\n{prev}   Page {} of {}   {next}",
            self.page,
            self.total_pages()
        ));
        out
    }
}

fn single_line(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ValueType;
    use crate::views::testing::FakeSettings;
    use proptest::prelude::*;

    async fn loaded(count: usize) -> ListView {
        let api = FakeSettings::with_generated(count);
        let mut view = ListView::new();
        view.load(&api).await.unwrap();
        view
    }

    #[tokio::test]
    async fn test_sorted_most_recent_first() {
        let view = loaded(5).await;
        let keys: Vec<&str> = view.filtered().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["key-004", "key-003", "key-002", "key-001", "key-000"]);
        let stamps: Vec<_> = view.filtered().map(|s| s.updated_at.unwrap()).collect();
        assert!(stamps.windows(2).all(|w| w[0] > w[1]));
    }

    #[tokio::test]
    async fn test_pagination_bounds() {
        let mut view = loaded(45).await;
        assert_eq!(view.total_pages(), 3);
        assert_eq!(view.page(), 1);
        assert!(!view.has_prev());
        assert_eq!(view.visible().len(), PAGE_SIZE);

        view.prev_page();
        assert_eq!(view.page(), 1);

        view.next_page();
        view.next_page();
        assert_eq!(view.page(), 3);
        assert!(!view.has_next());
        assert_eq!(view.visible().len(), 5);

        view.next_page();
        assert_eq!(view.page(), 3);

        view.go_to_page(0);
        assert_eq!(view.page(), 1);
        view.go_to_page(99);
        assert_eq!(view.page(), 3);
    }

    #[tokio::test]
    async fn test_search_resets_page_and_matches_key_only() {
        let api = FakeSettings::with_generated(30);
        api.insert("Feature_Flag", ValueType::Bool, "true");
        api.insert("timeout", ValueType::Int, "feature");
        let mut view = ListView::new();
        view.load(&api).await.unwrap();

        view.next_page();
        assert_eq!(view.page(), 2);

        view.search("FEATURE");
        assert_eq!(view.page(), 1);
        let keys: Vec<&str> = view.filtered().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["Feature_Flag"]);

        view.search("zzz");
        assert_eq!(view.filtered_len(), 0);
        assert_eq!(view.total_pages(), 1);
        assert!(view.render(Utc::now()).contains("No settings match 'zzz'"));
    }

    #[tokio::test]
    async fn test_empty_state() {
        let view = loaded(0).await;
        assert!(view.is_empty_state());
        let text = view.render(Utc::now());
        assert!(text.contains("create your first setting"));
        assert!(!text.contains("Search by key"));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_terminal() {
        let api = FakeSettings::with_generated(3);
        api.fail_with("Failed to fetch settings");
        let mut view = ListView::new();
        assert!(view.load(&api).await.is_err());
        assert_eq!(view.state(), &ListState::Failed("Failed to fetch settings".into()));
        assert!(view.visible().is_empty());
        assert!(view.render(Utc::now()).ends_with("Error: Failed to fetch settings"));
    }

    #[tokio::test]
    async fn test_long_values_truncated_in_table() {
        let api = FakeSettings::new();
        api.insert("long", ValueType::Str, &"v".repeat(80));
        let mut view = ListView::new();
        view.load(&api).await.unwrap();
        let text = view.render(Utc::now());
        assert!(text.contains(&format!("{}...", "v".repeat(50))));
        assert!(!text.contains(&"v".repeat(51)));
    }

    #[tokio::test]
    async fn test_route_for_row() {
        let view = loaded(3).await;
        assert_eq!(view.route_for_row(1), Some(Route::Detail(Some("key-002".into()))));
        assert_eq!(view.route_for_row(0), None);
        assert_eq!(view.route_for_row(4), None);
    }

    #[test]
    fn test_settings_without_timestamps_sort_last() {
        let mut view = ListView::new();
        let undated = Setting {
            key: "undated".into(),
            value_type: ValueType::Str,
            value: "x".into(),
            updated_at: None,
            created_at: None,
        };
        let dated = Setting {
            key: "dated".into(),
            updated_at: Some(Utc::now()),
            ..undated.clone()
        };
        view.set_settings(vec![undated, dated]);
        let keys: Vec<&str> = view.filtered().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["dated", "undated"]);
    }

    proptest! {
        #[test]
        fn prop_filter_is_case_insensitive_key_substring(
            keys in proptest::collection::hash_set("[a-zA-Z_]{1,8}", 0..40),
            query in "[a-zA-Z]{0,3}",
        ) {
            let settings: Vec<Setting> = keys
                .iter()
                .map(|k| Setting {
                    key: k.clone(),
                    value_type: ValueType::Str,
                    value: query.clone(),
                    updated_at: None,
                    created_at: None,
                })
                .collect();
            let mut view = ListView::new();
            view.set_settings(settings);
            view.go_to_page(2);
            view.search(&query);

            prop_assert_eq!(view.page(), 1);
            let expected = keys
                .iter()
                .filter(|k| k.to_lowercase().contains(&query.to_lowercase()))
                .count();
            prop_assert_eq!(view.filtered_len(), expected);
            for s in view.filtered() {
                prop_assert!(s.key.to_lowercase().contains(&query.to_lowercase()));
            }
        }
    }
}
