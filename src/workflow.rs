/// The three popup actions: hold this tab, hold all tabs, reopen held tabs

use crate::bookmark_cache::BookmarkCache;
use crate::browser::Browser;
use crate::client::BookmarkService;
use crate::config::Config;
use crate::error::Result;
use crate::links::{collect_batch, encode_batch, parse_links};
use futures::future::join_all;
use log::{debug, info, warn};
use std::cell::RefCell;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Already submitted this session; nothing sent
    AlreadyHeld,
    /// An `add` for this URL has not answered yet; nothing sent
    Pending,
    Held,
    /// The service refused; the user was alerted
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Every tab was already held; nothing sent
    NothingToHold,
    Submitted(usize),
}

/// Badge feedback after a submission
#[derive(Debug, Clone, PartialEq)]
pub struct Indicator {
    pub text: String,
    pub duration_ms: u32,
}

impl From<&Config> for Indicator {
    fn from(config: &Config) -> Self {
        Indicator {
            text: config.badge_text.clone(),
            duration_ms: config.badge_duration_ms,
        }
    }
}

/// One per popup session. Owns the session's `BookmarkCache`.
///
/// Lives on the single UI thread; cache borrows never span an `.await`.
pub struct Workflow<S, B> {
    service: S,
    browser: B,
    indicator: Indicator,
    cache: RefCell<BookmarkCache>,
    pending: RefCell<HashSet<String>>,
}

impl<S: BookmarkService, B: Browser> Workflow<S, B> {
    pub fn new(service: S, browser: B, indicator: Indicator) -> Self {
        Workflow {
            service,
            browser,
            indicator,
            cache: RefCell::new(BookmarkCache::new()),
            pending: RefCell::new(HashSet::new()),
        }
    }

    pub fn is_held(&self, url: &str) -> bool {
        self.cache.borrow().contains(url)
    }

    pub fn held_count(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Submit the active tab. The cache is only updated once the service
    /// accepts the URL.
    pub async fn bookmark_current_tab(&self) -> Result<AddOutcome> {
        let tab = self.browser.active_tab().await?;

        if self.is_held(&tab.url) {
            debug!("Already held: {}", tab.url);
            return Ok(AddOutcome::AlreadyHeld);
        }

        if !self.pending.borrow_mut().insert(tab.url.clone()) {
            debug!("Add already in flight: {}", tab.url);
            return Ok(AddOutcome::Pending);
        }

        let result = self.service.add(&tab.url).await;
        self.pending.borrow_mut().remove(&tab.url);

        match result {
            Ok(_) => {
                self.cache.borrow_mut().record(&tab.url, &tab.title);
                info!("Held {}", tab.url);
                self.success_indication().await;
                Ok(AddOutcome::Held)
            }
            Err(e) => {
                warn!("Failed to hold {}: {}", tab.url, e);
                self.browser.alert(e.payload());
                Ok(AddOutcome::Failed)
            }
        }
    }

    /// Submit every tab of the current window not yet held, in one request.
    ///
    /// Tabs are recorded before the request is sent. The badge is shown
    /// alongside the request whatever its outcome, and a failure is only logged.
    pub async fn bookmark_all_tabs(&self) -> Result<BatchOutcome> {
        let tabs = self.browser.current_window_tabs().await?;

        let urls: Vec<String> = {
            let mut cache = self.cache.borrow_mut();
            let batch = collect_batch(&tabs, |url| cache.contains(url));
            for tab in &batch {
                cache.record(&tab.url, &tab.title);
            }
            batch.iter().map(|tab| tab.url.clone()).collect()
        };

        if urls.is_empty() {
            debug!("All {} tabs already held", tabs.len());
            return Ok(BatchOutcome::NothingToHold);
        }

        let batch = encode_batch(&urls);
        let (result, ()) = futures::join!(self.service.batch_add(&batch), self.success_indication());

        match result {
            Ok(_) => info!("Held {} tabs", urls.len()),
            Err(e) => debug!("Batch add of {} tabs failed: {}", urls.len(), e),
        }

        Ok(BatchOutcome::Submitted(urls.len()))
    }

    /// Reopen every saved link in a background tab, in the order the service
    /// lists them. A link that fails to open is logged and skipped. Returns
    /// how many were opened; a failed fetch opens none.
    pub async fn open_saved_tabs(&self) -> Result<usize> {
        let body = match self.service.get_links().await {
            Ok(body) => body,
            Err(e) => {
                debug!("Fetching saved links failed: {}", e);
                return Ok(0);
            }
        };

        let links = parse_links(&body);

        // Every open is issued before any is awaited
        let results = join_all(links.iter().map(|url| self.browser.open_tab(url))).await;

        let mut opened = 0;
        for (url, result) in links.iter().zip(results) {
            match result {
                Ok(()) => opened += 1,
                Err(e) => warn!("Failed to open {}: {}", url, e),
            }
        }

        info!("Opened {} of {} saved tabs", opened, links.len());
        Ok(opened)
    }

    async fn success_indication(&self) {
        if let Err(e) = self.browser.set_badge_text(&self.indicator.text).await {
            warn!("Failed to set badge: {}", e);
            return;
        }

        self.browser.delay(self.indicator.duration_ms).await;

        if let Err(e) = self.browser.set_badge_text("").await {
            warn!("Failed to clear badge: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HoldError;
    use crate::tab_data::TabInfo;
    use async_trait::async_trait;
    use futures::executor::block_on;
    use std::collections::VecDeque;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Add(String),
        BatchAdd(String),
        GetLinks,
    }

    /// Records calls and answers from a queue (default: success)
    #[derive(Default)]
    struct FakeService {
        calls: RefCell<Vec<Call>>,
        responses: RefCell<VecDeque<Result<String>>>,
    }

    impl FakeService {
        fn responding(responses: Vec<Result<String>>) -> Self {
            FakeService {
                calls: RefCell::new(Vec::new()),
                responses: RefCell::new(responses.into()),
            }
        }

        fn answer(&self, call: Call) -> Result<String> {
            self.calls.borrow_mut().push(call);
            self.responses.borrow_mut().pop_front().unwrap_or(Ok(String::new()))
        }
    }

    #[async_trait(?Send)]
    impl BookmarkService for FakeService {
        async fn add(&self, url: &str) -> Result<String> {
            self.answer(Call::Add(url.to_string()))
        }

        async fn batch_add(&self, urls: &str) -> Result<String> {
            self.answer(Call::BatchAdd(urls.to_string()))
        }

        async fn get_links(&self) -> Result<String> {
            self.answer(Call::GetLinks)
        }
    }

    #[derive(Default)]
    struct FakeBrowser {
        tabs: Vec<TabInfo>,
        active: usize,
        unopenable: Vec<String>,
        opened: RefCell<Vec<String>>,
        badges: RefCell<Vec<String>>,
        alerts: RefCell<Vec<String>>,
        delays: RefCell<Vec<u32>>,
    }

    impl FakeBrowser {
        fn with_tabs(urls: &[&str]) -> Self {
            FakeBrowser {
                tabs: urls
                    .iter()
                    .enumerate()
                    .map(|(i, url)| TabInfo::new(i as i32, url.to_string(), format!("Tab {}", i)))
                    .collect(),
                ..FakeBrowser::default()
            }
        }
    }

    #[async_trait(?Send)]
    impl Browser for FakeBrowser {
        async fn active_tab(&self) -> Result<TabInfo> {
            self.tabs
                .get(self.active)
                .cloned()
                .ok_or_else(|| HoldError::Browser("no active tab".to_string()))
        }

        async fn current_window_tabs(&self) -> Result<Vec<TabInfo>> {
            Ok(self.tabs.clone())
        }

        async fn open_tab(&self, url: &str) -> Result<()> {
            if self.unopenable.iter().any(|bad| bad == url) {
                return Err(HoldError::Browser("Invalid url".to_string()));
            }
            self.opened.borrow_mut().push(url.to_string());
            Ok(())
        }

        async fn set_badge_text(&self, text: &str) -> Result<()> {
            self.badges.borrow_mut().push(text.to_string());
            Ok(())
        }

        fn alert(&self, message: &str) {
            self.alerts.borrow_mut().push(message.to_string());
        }

        async fn delay(&self, ms: u32) {
            self.delays.borrow_mut().push(ms);
        }
    }

    fn workflow(service: FakeService, browser: FakeBrowser) -> Workflow<FakeService, FakeBrowser> {
        Workflow::new(service, browser, Indicator::from(&Config::default()))
    }

    #[test]
    fn test_bookmark_current_tab_once() {
        let wf = workflow(FakeService::default(), FakeBrowser::with_tabs(&["https://google.com"]));

        assert_eq!(block_on(wf.bookmark_current_tab()), Ok(AddOutcome::Held));
        assert_eq!(block_on(wf.bookmark_current_tab()), Ok(AddOutcome::AlreadyHeld));

        assert_eq!(
            *wf.service.calls.borrow(),
            vec![Call::Add("https://google.com".to_string())]
        );
        assert!(wf.is_held("https://google.com"));
    }

    #[test]
    fn test_success_indicator_sets_then_clears_badge() {
        let wf = workflow(FakeService::default(), FakeBrowser::with_tabs(&["https://google.com"]));

        block_on(wf.bookmark_current_tab()).unwrap();

        assert_eq!(*wf.browser.badges.borrow(), vec!["HELD", ""]);
        assert_eq!(*wf.browser.delays.borrow(), vec![1000]);
    }

    #[test]
    fn test_failed_add_alerts_and_does_not_record() {
        let service = FakeService::responding(vec![Err(HoldError::RequestFailed(
            "This URL already is being held for you.".to_string(),
        ))]);
        let wf = workflow(service, FakeBrowser::with_tabs(&["https://google.com"]));

        assert_eq!(block_on(wf.bookmark_current_tab()), Ok(AddOutcome::Failed));

        assert!(!wf.is_held("https://google.com"));
        assert_eq!(
            *wf.browser.alerts.borrow(),
            vec!["This URL already is being held for you."]
        );
        assert!(wf.browser.badges.borrow().is_empty());

        // Not cached, so a retry goes out again
        assert_eq!(block_on(wf.bookmark_current_tab()), Ok(AddOutcome::Held));
        assert_eq!(wf.service.calls.borrow().len(), 2);
    }

    #[test]
    fn test_add_skipped_while_pending() {
        let wf = workflow(FakeService::default(), FakeBrowser::with_tabs(&["https://google.com"]));
        wf.pending.borrow_mut().insert("https://google.com".to_string());

        assert_eq!(block_on(wf.bookmark_current_tab()), Ok(AddOutcome::Pending));
        assert!(wf.service.calls.borrow().is_empty());
    }

    #[test]
    fn test_active_tab_failure_propagates() {
        let wf = workflow(FakeService::default(), FakeBrowser::default());

        assert!(matches!(block_on(wf.bookmark_current_tab()), Err(HoldError::Browser(_))));
        assert!(wf.service.calls.borrow().is_empty());
    }

    #[test]
    fn test_bookmark_all_tabs_sends_only_unheld() {
        let browser = FakeBrowser::with_tabs(&[
            "https://google.com",
            "https://github.com",
            "https://microsoft.com",
        ]);
        let wf = workflow(FakeService::default(), browser);
        wf.cache.borrow_mut().record("https://github.com", "GitHub");

        assert_eq!(block_on(wf.bookmark_all_tabs()), Ok(BatchOutcome::Submitted(2)));

        assert_eq!(
            *wf.service.calls.borrow(),
            vec![Call::BatchAdd("https://google.com;https://microsoft.com".to_string())]
        );
        assert_eq!(wf.held_count(), 3);
    }

    #[test]
    fn test_bookmark_all_tabs_nothing_to_hold() {
        let wf = workflow(
            FakeService::default(),
            FakeBrowser::with_tabs(&["https://google.com", "https://github.com"]),
        );
        wf.cache.borrow_mut().record("https://google.com", "Google");
        wf.cache.borrow_mut().record("https://github.com", "GitHub");

        assert_eq!(block_on(wf.bookmark_all_tabs()), Ok(BatchOutcome::NothingToHold));

        assert!(wf.service.calls.borrow().is_empty());
        assert!(wf.browser.badges.borrow().is_empty());
    }

    #[test]
    fn test_bookmark_all_tabs_failure_is_silent() {
        let service = FakeService::responding(vec![Err(HoldError::RequestFailed("boom".to_string()))]);
        let wf = workflow(service, FakeBrowser::with_tabs(&["https://google.com"]));

        assert_eq!(block_on(wf.bookmark_all_tabs()), Ok(BatchOutcome::Submitted(1)));

        assert!(wf.browser.alerts.borrow().is_empty());
        assert_eq!(*wf.browser.badges.borrow(), vec!["HELD", ""]);
        // Recorded before the request went out
        assert!(wf.is_held("https://google.com"));
    }

    #[test]
    fn test_bookmark_all_then_current_sends_nothing() {
        let wf = workflow(FakeService::default(), FakeBrowser::with_tabs(&["https://google.com"]));

        block_on(wf.bookmark_all_tabs()).unwrap();
        assert_eq!(block_on(wf.bookmark_current_tab()), Ok(AddOutcome::AlreadyHeld));

        assert_eq!(wf.service.calls.borrow().len(), 1);
    }

    #[test]
    fn test_open_saved_tabs_in_order() {
        let service = FakeService::responding(vec![Ok("http://a.com;http://b.com;".to_string())]);
        let wf = workflow(service, FakeBrowser::default());

        assert_eq!(block_on(wf.open_saved_tabs()), Ok(2));

        assert_eq!(*wf.browser.opened.borrow(), vec!["http://a.com", "http://b.com"]);
        assert_eq!(*wf.service.calls.borrow(), vec![Call::GetLinks]);
    }

    #[test]
    fn test_open_saved_tabs_skips_tab_that_fails_to_open() {
        let service = FakeService::responding(vec![Ok("http://a.com;bad;http://b.com;".to_string())]);
        let browser = FakeBrowser {
            unopenable: vec!["bad".to_string()],
            ..FakeBrowser::default()
        };
        let wf = workflow(service, browser);

        assert_eq!(block_on(wf.open_saved_tabs()), Ok(2));

        assert_eq!(*wf.browser.opened.borrow(), vec!["http://a.com", "http://b.com"]);
        assert!(wf.browser.alerts.borrow().is_empty());
    }

    #[test]
    fn test_bookmark_all_tabs_includes_pending_add() {
        let wf = workflow(
            FakeService::default(),
            FakeBrowser::with_tabs(&["https://google.com", "https://github.com"]),
        );
        wf.pending.borrow_mut().insert("https://google.com".to_string());

        assert_eq!(block_on(wf.bookmark_all_tabs()), Ok(BatchOutcome::Submitted(2)));

        assert_eq!(
            *wf.service.calls.borrow(),
            vec![Call::BatchAdd("https://google.com;https://github.com".to_string())]
        );
        assert!(wf.is_held("https://google.com"));
    }

    #[test]
    fn test_open_saved_tabs_failure_is_silent() {
        let service = FakeService::responding(vec![Err(HoldError::RequestFailed("down".to_string()))]);
        let wf = workflow(service, FakeBrowser::default());

        assert_eq!(block_on(wf.open_saved_tabs()), Ok(0));

        assert!(wf.browser.opened.borrow().is_empty());
        assert!(wf.browser.alerts.borrow().is_empty());
    }

    #[test]
    fn test_custom_indicator() {
        let config = Config {
            badge_text: "OK".to_string(),
            badge_duration_ms: 250,
            ..Config::default()
        };
        let wf = Workflow::new(
            FakeService::default(),
            FakeBrowser::with_tabs(&["https://google.com"]),
            Indicator::from(&config),
        );

        block_on(wf.bookmark_current_tab()).unwrap();

        assert_eq!(*wf.browser.badges.borrow(), vec!["OK", ""]);
        assert_eq!(*wf.browser.delays.borrow(), vec![250]);
    }
}
