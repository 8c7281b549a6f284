//! Website analysis: fetch the main page plus its most relevant internal
//! pages and distill them into a `WebsiteAnalysis`.

use futures_util::{stream, StreamExt};
use scraper::Html;
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;

use super::cache::TtlCache;
use super::discover::discover_priority_pages;
use super::extract::{extract_meta, extract_page_content, merge_about_text, merge_services, PageContent, PageMeta};
use super::fetch::{normalize_url, FetchedPage, PageFetcher};
use super::images::extract_images;
use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::types::{WebsiteAnalysis, WebsiteImage};

/// Tone reported for every analysis. Tone detection is not attempted.
const DEFAULT_TONE: &str = "professional";

/// Everything taken from the main page in one parse.
struct MainPage {
    meta: PageMeta,
    priority_pages: Vec<Url>,
    content: PageContent,
    images: Vec<WebsiteImage>,
}

/// Analyzes company websites, memoizing results for the session.
///
/// Failures are remembered too, for `failure_ttl_secs`, so a blocked site is
/// not re-scraped once per image in a batch.
pub struct WebsiteAnalyzer {
    fetcher: PageFetcher,
    config: ScrapeConfig,
    cache: Mutex<TtlCache<WebsiteAnalysis>>,
    failures: Mutex<TtlCache<ScrapeError>>,
}

impl WebsiteAnalyzer {
    pub fn new(config: ScrapeConfig, client: reqwest::Client) -> Self {
        let fetcher = PageFetcher::new(
            client,
            config.user_agents.clone(),
            Duration::from_millis(config.timeout_ms),
        );
        let cache = TtlCache::new(
            Duration::from_secs(config.cache_ttl_secs),
            config.cache_max_entries,
        );
        let failures = TtlCache::new(
            Duration::from_secs(config.failure_ttl_secs),
            config.cache_max_entries,
        );
        Self {
            fetcher,
            config,
            cache: Mutex::new(cache),
            failures: Mutex::new(failures),
        }
    }

    /// Analyze a website, returning a cached result when one is still fresh.
    ///
    /// Only the main page is required; secondary pages that fail are skipped.
    pub async fn analyze(&self, input: &str) -> Result<WebsiteAnalysis, ScrapeError> {
        let url = normalize_url(input)?;
        let key = url.as_str().to_string();

        if let Some(cached) = self.cache.lock().await.get(&key) {
            tracing::debug!("Using cached analysis for {key}");
            return Ok(cached);
        }
        if let Some(failed) = self.failures.lock().await.get(&key) {
            tracing::debug!("Using cached failure for {key}: {failed}");
            return Err(failed);
        }

        tracing::info!("Analyzing website {url}");
        let main = match self.fetcher.fetch(&url).await {
            Ok(page) => page,
            Err(e) => {
                if self.config.failure_ttl_secs > 0 {
                    self.failures.lock().await.insert(key, e.clone());
                }
                return Err(e);
            }
        };
        let MainPage {
            meta,
            priority_pages,
            content,
            images,
        } = self.parse_main(&main);
        tracing::debug!("Found {} priority pages", priority_pages.len());

        let mut pages_analyzed = vec![url.to_string()];
        let mut about_texts: Vec<String> = content.about_text.into_iter().collect();
        let mut services = content.services;

        let fetched: Vec<(Url, Result<FetchedPage, ScrapeError>)> = stream::iter(priority_pages)
            .map(|page_url| async move {
                let result = self.fetcher.fetch(&page_url).await;
                (page_url, result)
            })
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        for (page_url, result) in fetched {
            match result {
                Ok(page) => {
                    let content = parse_content(&page.html);
                    about_texts.extend(content.about_text);
                    services.extend(content.services);
                    pages_analyzed.push(page_url.to_string());
                }
                Err(e) => tracing::debug!("Skipping {page_url}: {e}"),
            }
        }

        let analysis = WebsiteAnalysis {
            url: key.clone(),
            title: meta.title,
            description: meta.description,
            keywords: meta.keywords,
            about_text: merge_about_text(&about_texts),
            services: merge_services(&services),
            tone: DEFAULT_TONE.to_string(),
            pages_analyzed,
            images,
        };

        tracing::info!(
            "Analyzed {} pages: {} services, {} images",
            analysis.pages_analyzed.len(),
            analysis.services.len(),
            analysis.images.len()
        );

        self.cache.lock().await.insert(key, analysis.clone());
        Ok(analysis)
    }

    /// Forget every cached analysis and remembered failure.
    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
        self.failures.lock().await.clear();
    }

    /// Number of analyses currently cached.
    pub async fn cached_count(&self) -> usize {
        self.cache.lock().await.len()
    }

    fn parse_main(&self, page: &FetchedPage) -> MainPage {
        let doc = Html::parse_document(&page.html);
        MainPage {
            meta: extract_meta(&doc),
            priority_pages: discover_priority_pages(
                &page.url,
                &doc,
                self.config.max_links_scanned,
                self.config.max_pages,
            ),
            content: extract_page_content(&doc),
            images: extract_images(&page.url, &doc, self.config.max_images),
        }
    }
}

fn parse_content(html: &str) -> PageContent {
    extract_page_content(&Html::parse_document(html))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url_fails_before_network() {
        let analyzer = WebsiteAnalyzer::new(ScrapeConfig::default(), reqwest::Client::new());
        let err = analyzer.analyze("   ").await.unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidUrl(_)));
        assert_eq!(analyzer.cached_count().await, 0);
    }

    #[test]
    fn test_parse_main_collects_everything() {
        let analyzer = WebsiteAnalyzer::new(ScrapeConfig::default(), reqwest::Client::new());
        let page = FetchedPage {
            url: Url::parse("https://acme.com/").unwrap(),
            html: r#"<html><head><title>Acme | Roofing</title></head><body>
                <a href="/about">About Us</a>
                <img src="/hero.jpg" alt="Crew on a roof">
                </body></html>"#
                .to_string(),
        };
        let main = analyzer.parse_main(&page);
        assert_eq!(main.meta.title, "Acme | Roofing");
        assert_eq!(main.priority_pages.len(), 1);
        assert_eq!(main.images[0].description, "Crew on a roof");
    }
}
