//! HTTP page fetching with user-agent rotation.

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use std::time::Duration;
use url::Url;

use crate::error::ScrapeError;

/// Turn user input into an absolute http(s) URL.
///
/// Bare domains ("acme.com") get an `https://` prefix.
pub fn normalize_url(input: &str) -> Result<Url, ScrapeError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ScrapeError::InvalidUrl(input.to_string()));
    }

    let lower = trimmed.to_lowercase();
    let candidate = if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&candidate).map_err(|_| ScrapeError::InvalidUrl(input.to_string()))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(ScrapeError::InvalidUrl(input.to_string())),
    }
}

/// A successfully fetched HTML page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL that was requested
    pub url: Url,
    pub html: String,
}

/// Fetches HTML pages, retrying with a different browser profile when blocked.
pub struct PageFetcher {
    client: reqwest::Client,
    user_agents: Vec<String>,
    timeout: Duration,
}

impl PageFetcher {
    pub fn new(client: reqwest::Client, user_agents: Vec<String>, timeout: Duration) -> Self {
        Self {
            client,
            user_agents,
            timeout,
        }
    }

    /// Fetch a page as HTML.
    ///
    /// Each user-agent profile gets one attempt. A 403, a timeout, or a
    /// connection failure moves on to the next profile; any other error
    /// status fails immediately. The last error is returned when every
    /// profile fails.
    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage, ScrapeError> {
        let mut last_error = ScrapeError::Request {
            url: url.to_string(),
            message: "no user-agent profiles configured".to_string(),
        };

        for (i, agent) in self.user_agents.iter().enumerate() {
            match self.fetch_once(url, agent, i == 0).await {
                Ok(page) => return Ok(page),
                Err(e @ (ScrapeError::Blocked { .. }
                | ScrapeError::Timeout { .. }
                | ScrapeError::Request { .. })) => {
                    tracing::debug!("Profile {} failed for {url}: {e}", i + 1);
                    last_error = e;
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error)
    }

    async fn fetch_once(
        &self,
        url: &Url,
        agent: &str,
        full_headers: bool,
    ) -> Result<FetchedPage, ScrapeError> {
        let mut request = self
            .client
            .get(url.clone())
            .header(USER_AGENT, agent)
            .timeout(self.timeout);
        if full_headers {
            request = request
                .header(
                    ACCEPT,
                    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
                )
                .header(ACCEPT_LANGUAGE, "en-US,en;q=0.5")
                .header("Upgrade-Insecure-Requests", "1");
        }

        let resp = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ScrapeError::Timeout {
                    url: url.to_string(),
                }
            } else {
                ScrapeError::Request {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        match resp.status() {
            s if s.is_success() => {}
            StatusCode::FORBIDDEN => {
                return Err(ScrapeError::Blocked {
                    url: url.to_string(),
                })
            }
            StatusCode::NOT_FOUND => {
                return Err(ScrapeError::NotFound {
                    url: url.to_string(),
                })
            }
            s => {
                return Err(ScrapeError::Http {
                    url: url.to_string(),
                    status: s.as_u16(),
                })
            }
        }

        if let Some(content_type) = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !content_type.to_lowercase().contains("html") {
                return Err(ScrapeError::NotHtml {
                    url: url.to_string(),
                    content_type: content_type.to_string(),
                });
            }
        }

        let html = resp.text().await.map_err(|e| ScrapeError::Request {
            url: url.to_string(),
            message: format!("failed to read body: {e}"),
        })?;

        Ok(FetchedPage {
            url: url.clone(),
            html,
        })
    }
}
