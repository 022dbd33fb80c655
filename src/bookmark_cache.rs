/// Session-scoped record of pages already sent to the service
use crate::tab_data::BookmarkEntry;
use std::collections::HashMap;

/// URLs submitted during the current session, keyed by URL.
///
/// Membership only grows. Nothing is persisted: a new popup starts with an
/// empty cache.
#[derive(Debug, Clone, Default)]
pub struct BookmarkCache {
    entries: HashMap<String, BookmarkEntry>,
}

impl BookmarkCache {
    pub fn new() -> Self {
        BookmarkCache {
            entries: HashMap::new(),
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    /// Insert `url`. Callers check `contains` first; recording the same URL
    /// again replaces the stored title.
    pub fn record(&mut self, url: &str, title: &str) {
        self.entries.insert(
            url.to_string(),
            BookmarkEntry {
                url: url.to_string(),
                title: title.to_string(),
            },
        );
    }

    pub fn get(&self, url: &str) -> Option<&BookmarkEntry> {
        self.entries.get(url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
