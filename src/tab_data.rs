/// Data structures for Hold My Page
use serde::{Deserialize, Serialize};

/// Information about a browser tab, as handed over by the JS bridge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub id: i32,
    #[serde(default)]
    pub window_id: i32,
    #[serde(default)]
    pub index: i32,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
}

impl TabInfo {
    pub fn new(id: i32, url: String, title: String) -> TabInfo {
        TabInfo {
            id,
            window_id: 0,
            index: 0,
            url,
            title,
        }
    }
}

/// A page submitted to the service during this session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkEntry {
    pub url: String,
    pub title: String,
}

impl From<&TabInfo> for BookmarkEntry {
    fn from(tab: &TabInfo) -> Self {
        BookmarkEntry {
            url: tab.url.clone(),
            title: tab.title.clone(),
        }
    }
}
