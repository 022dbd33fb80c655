/// HTTP client for the holdmypage service

use crate::config::Config;
use crate::error::{HoldError, Result};
use async_trait::async_trait;
use url::Url;
use url::form_urlencoded;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestCredentials, RequestInit, Response};

/// The remote bookmarking endpoint.
///
/// Every failure (network, non-2xx status, unreadable body) comes back as
/// `HoldError::RequestFailed` carrying the raw payload.
#[async_trait(?Send)]
pub trait BookmarkService {
    /// `POST /add` with `url=<url>`
    async fn add(&self, url: &str) -> Result<String>;

    /// `POST /batchadd` with `urls=<batch string>`
    async fn batch_add(&self, urls: &str) -> Result<String>;

    /// `GET /getlinks`, returning the batch string of saved URLs
    async fn get_links(&self) -> Result<String>;
}

/// `BookmarkService` over the browser fetch API.
///
/// Requests carry the user's cookies: the service knows who is asking only
/// through their Google account session.
pub struct HttpBookmarkService {
    add_url: Url,
    batch_add_url: Url,
    get_links_url: Url,
}

impl HttpBookmarkService {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        Ok(HttpBookmarkService {
            add_url: config.endpoint("add")?,
            batch_add_url: config.endpoint("batchadd")?,
            get_links_url: config.endpoint("getlinks")?,
        })
    }

    async fn post_form(&self, url: &Url, field: &str, value: &str) -> Result<String> {
        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair(field, value)
            .finish();

        send(build_request(url, "POST", Some(&body))?).await
    }

    async fn get(&self, url: &Url) -> Result<String> {
        send(build_request(url, "GET", None)?).await
    }
}

#[async_trait(?Send)]
impl BookmarkService for HttpBookmarkService {
    async fn add(&self, url: &str) -> Result<String> {
        self.post_form(&self.add_url, "url", url).await
    }

    async fn batch_add(&self, urls: &str) -> Result<String> {
        self.post_form(&self.batch_add_url, "urls", urls).await
    }

    async fn get_links(&self) -> Result<String> {
        self.get(&self.get_links_url).await
    }
}

/// A request carrying the user's cookies, with an optional form body
fn build_request(url: &Url, method: &str, form: Option<&str>) -> Result<Request> {
    let init = RequestInit::new();
    init.set_method(method);
    init.set_credentials(RequestCredentials::Include);
    if let Some(body) = form {
        init.set_body(&JsValue::from_str(body));
    }

    let request = Request::new_with_str_and_init(url.as_str(), &init).map_err(HoldError::request)?;
    if form.is_some() {
        request
            .headers()
            .set("Content-Type", "application/x-www-form-urlencoded")
            .map_err(HoldError::request)?;
    }

    Ok(request)
}

async fn send(request: Request) -> Result<String> {
    let window = web_sys::window().ok_or_else(|| HoldError::Browser("no window available".to_string()))?;

    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(HoldError::request)?
        .dyn_into()
        .map_err(HoldError::request)?;

    let body = JsFuture::from(response.text().map_err(HoldError::request)?)
        .await
        .map_err(HoldError::request)?
        .as_string()
        .unwrap_or_default();

    if response.ok() {
        Ok(body)
    } else if body.is_empty() {
        Err(HoldError::RequestFailed(format!("{} {}", response.status(), response.status_text())))
    } else {
        Err(HoldError::RequestFailed(body))
    }
}
