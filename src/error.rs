/// Error type shared by the workflow and its collaborators
use wasm_bindgen::JsValue;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HoldError {
    /// The remote service did not accept the request. Carries the raw payload
    /// (response body, or the JS error text when there was no response).
    #[error("Remote request failed: {0}")]
    RequestFailed(String),

    /// A host browser API call failed
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl HoldError {
    /// The text shown to the user in an alert
    pub fn payload(&self) -> &str {
        match self {
            HoldError::RequestFailed(payload) => payload,
            HoldError::Browser(msg) | HoldError::Config(msg) => msg,
        }
    }

    pub fn request(err: JsValue) -> Self {
        HoldError::RequestFailed(js_error_text(&err))
    }

    pub fn browser(err: JsValue) -> Self {
        HoldError::Browser(js_error_text(&err))
    }
}

pub type Result<T, E = HoldError> = std::result::Result<T, E>;

/// Best-effort text for a rejected promise value
fn js_error_text(err: &JsValue) -> String {
    err.as_string()
        .or_else(|| {
            js_sys::Reflect::get(err, &JsValue::from_str("message"))
                .ok()
                .and_then(|msg| msg.as_string())
        })
        .unwrap_or_else(|| format!("{:?}", err))
}
