/// Batch string handling: the `;`-delimited URL lists exchanged with the service

use crate::tab_data::TabInfo;
use std::collections::HashSet;

pub const SEPARATOR: &str = ";";

/// Pick the tabs that still need holding, in window order.
///
/// Skips tabs for which `is_held` answers true and repeated URLs within the
/// window (first occurrence wins).
pub fn collect_batch<'a, F>(tabs: &'a [TabInfo], is_held: F) -> Vec<&'a TabInfo>
where
    F: Fn(&str) -> bool,
{
    let mut seen_urls = HashSet::new();

    tabs.iter()
        .filter(|tab| !is_held(&tab.url))
        .filter(|tab| seen_urls.insert(tab.url.clone()))
        .collect()
}

/// Join URLs into a batch string
pub fn encode_batch<S: AsRef<str>>(urls: &[S]) -> String {
    urls.iter()
        .map(|url| url.as_ref())
        .collect::<Vec<&str>>()
        .join(SEPARATOR)
}

/// Split a batch string, dropping empty tokens (the service ends its list with `;`)
pub fn parse_links(body: &str) -> Vec<String> {
    body.split(SEPARATOR)
        .filter(|url| !url.is_empty())
        .map(|url| url.to_string())
        .collect()
}
