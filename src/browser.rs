/// Host browser APIs used by the popup

use crate::config::{CONFIG_STORAGE_KEY, Config};
use crate::error::{HoldError, Result};
use crate::tab_data::TabInfo;
use async_trait::async_trait;
use log::{trace, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

// Import JS bridge functions
#[wasm_bindgen(module = "/popup.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getActiveTab() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getCurrentWindowTabs() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn createTab(url: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn setBadgeText(text: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> Result<JsValue, JsValue>;

    fn onTabActivated(callback: &js_sys::Function);
}

/// What the workflow needs from the browser
#[async_trait(?Send)]
pub trait Browser {
    async fn active_tab(&self) -> Result<TabInfo>;

    /// All tabs of the focused window, in tab-strip order
    async fn current_window_tabs(&self) -> Result<Vec<TabInfo>>;

    async fn open_tab(&self, url: &str) -> Result<()>;

    /// Set the toolbar badge; an empty string clears it
    async fn set_badge_text(&self, text: &str) -> Result<()>;

    /// Blocking alert dialog
    fn alert(&self, message: &str);

    async fn delay(&self, ms: u32);
}

/// `Browser` backed by the chrome.* extension APIs
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromeBrowser;

#[async_trait(?Send)]
impl Browser for ChromeBrowser {
    async fn active_tab(&self) -> Result<TabInfo> {
        let tab_js = getActiveTab().await.map_err(HoldError::browser)?;

        serde_wasm_bindgen::from_value(tab_js)
            .map_err(|e| HoldError::Browser(format!("Failed to parse tab: {:?}", e)))
    }

    async fn current_window_tabs(&self) -> Result<Vec<TabInfo>> {
        let tabs_js = getCurrentWindowTabs().await.map_err(HoldError::browser)?;

        serde_wasm_bindgen::from_value(tabs_js)
            .map_err(|e| HoldError::Browser(format!("Failed to parse tabs: {:?}", e)))
    }

    async fn open_tab(&self, url: &str) -> Result<()> {
        createTab(url).await.map_err(HoldError::browser)
    }

    async fn set_badge_text(&self, text: &str) -> Result<()> {
        setBadgeText(text).await.map_err(HoldError::browser)
    }

    fn alert(&self, message: &str) {
        let shown = web_sys::window()
            .map(|window| window.alert_with_message(message).is_ok())
            .unwrap_or(false);

        if !shown {
            warn!("Could not show alert: {}", message);
        }
    }

    async fn delay(&self, ms: u32) {
        let timeout = timer_millis(ms);
        let promise = js_sys::Promise::new(&mut |resolve, reject| {
            let scheduled = web_sys::window().map(|window| {
                window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, timeout)
            });

            if !matches!(scheduled, Some(Ok(_))) {
                let _ = reject.call0(&JsValue::NULL);
            }
        });

        if JsFuture::from(promise).await.is_err() {
            warn!("Timer unavailable, skipped {}ms delay", ms);
        }
    }
}

/// setTimeout takes an i32; longer delays are capped rather than wrapped
fn timer_millis(ms: u32) -> i32 {
    i32::try_from(ms).unwrap_or(i32::MAX)
}

/// Read the stored config override, falling back to defaults
pub async fn load_config() -> Config {
    let stored = match getStorage(CONFIG_STORAGE_KEY).await {
        Ok(value) if value.is_null() || value.is_undefined() => return Config::default(),
        Ok(value) => value,
        Err(e) => {
            warn!("Failed to read {}: {:?}", CONFIG_STORAGE_KEY, e);
            return Config::default();
        }
    };

    let config: Config = match serde_wasm_bindgen::from_value(stored) {
        Ok(config) => config,
        Err(e) => {
            warn!("Ignoring malformed {}: {:?}", CONFIG_STORAGE_KEY, e);
            return Config::default();
        }
    };

    match config.validate() {
        Ok(()) => config,
        Err(e) => {
            warn!("Ignoring {}: {}", CONFIG_STORAGE_KEY, e);
            Config::default()
        }
    }
}

/// Hook tab activation events. Nothing reacts to them yet beyond a trace line.
pub fn register_tab_activation_listener() {
    let callback = Closure::wrap(Box::new(move |tab_id: i32, window_id: i32| {
        trace!("Tab {} activated in window {}", tab_id, window_id);
    }) as Box<dyn Fn(i32, i32)>);

    onTabActivated(callback.as_ref().unchecked_ref());

    // Lives as long as the popup
    callback.forget();
}
