// src/fetch/http.rs
// =============================================================================
// The default Fetcher: plain HTTP GETs with reqwest.
//
// - One shared Client per process (connection pooling across all sites)
// - 10 second timeout per request, at most 10 redirects
// - Any non-2xx status is a fetch error
// - Only text/html bodies are read; other content types yield an empty page
//
// reqwest errors are sorted into the FetchError categories so the log line for
// a failed page says *why* it failed.
// =============================================================================

use super::{FetchError, Fetcher, Page};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_REDIRECTS: usize = 10;
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// reqwest-backed page fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(categorize_error)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<Page, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(categorize_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        // Relative links resolve against where we ended up, not where we started
        let final_url = response.url().clone();

        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(is_html_content_type)
            // No header at all: let the parser have a go
            .unwrap_or(true);

        if !is_html {
            return Ok(Page::new(final_url, String::new()));
        }

        let body = response.text().await.map_err(categorize_error)?;
        Ok(Page::new(final_url, body))
    }
}

fn is_html_content_type(value: &str) -> bool {
    let mime = value.split(';').next().unwrap_or("").trim();
    mime.eq_ignore_ascii_case("text/html") || mime.eq_ignore_ascii_case("application/xhtml+xml")
}

// Sorts reqwest errors into the categories we report
fn categorize_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_redirect() {
        FetchError::TooManyRedirects
    } else if error.is_connect() {
        FetchError::Connect(error.to_string())
    } else if let Some(status) = error.status() {
        FetchError::Status(status.as_u16())
    } else {
        FetchError::Other(error.to_string())
    }
}
