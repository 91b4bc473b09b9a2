//! High-level pipeline: fetch → extract → normalize → convert → save → track.
//!
//! This module runs the scrape of a single documentation page end to end and
//! provides a sequential batch runner on top of it:
//!   - Fetches the page through a [`PageFetcher`]
//!   - Extracts the primary section and rewrites it for markdown conversion
//!   - Converts it to markdown and writes it to an [`ObjectStore`]
//!   - Hashes the primary section and records changes in a [`HashStore`]
//!
//! # Major Types
//! - [`PageReport`]: what was stored for one URL
//! - [`ScrapeReport`]: per-URL results of a batch run
//!
//! # Error Handling
//! [`scrape_page`] stops at the first failing step and returns a [`ScrapeError`]
//! naming it. [`scrape_all`] records the failure and moves on to the next URL.

use serde::Serialize;
use tracing::{error, info, info_span, Instrument};

use crate::config::ScrapeConfig;
use crate::contract::{ChangeStatus, HashStore, ObjectStore, Page, PageFetcher};
use crate::error::ScrapeError;
use crate::{convert, extract, hash, normalize, storage};

/// Result of scraping a single page.
#[derive(Debug, Clone, Serialize)]
pub struct PageReport {
    pub url: String,
    pub object_key: String,
    pub hash: String,
    pub status: ChangeStatus,
    pub markdown_bytes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageFailure {
    pub url: String,
    pub error: String,
}

/// Results of a batch run, in input order.
#[derive(Debug, Default, Serialize)]
pub struct ScrapeReport {
    pub pages: Vec<PageReport>,
    pub failures: Vec<PageFailure>,
}

impl ScrapeReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn count(&self, status: ChangeStatus) -> usize {
        self.pages.iter().filter(|p| p.status == status).count()
    }
}

/// Fetches, extracts and converts a page without touching any store.
pub async fn render_page<F>(
    config: &ScrapeConfig,
    fetcher: &F,
    url: &str,
) -> Result<Page, ScrapeError>
where
    F: PageFetcher + ?Sized,
{
    let raw_html = fetcher
        .fetch(url)
        .await
        .map_err(|source| ScrapeError::Fetch {
            url: url.to_string(),
            source,
        })?;

    let primary = extract::extract_primary_section(&raw_html, url, &config.extract)?;
    info!(url = %url, "Primary section content extracted");

    let normalized_html = normalize::normalize(&primary.html, url, &config.normalize);
    let markdown =
        convert::to_markdown(&normalized_html).map_err(|source| ScrapeError::Convert {
            url: url.to_string(),
            source,
        })?;
    info!(url = %url, bytes = markdown.len(), "Primary section content processed");

    Ok(Page {
        url: url.to_string(),
        raw_html,
        primary_html: primary.html,
        normalized_html,
        markdown,
    })
}

/// Scrapes one URL and stores its markdown and hash.
pub async fn scrape_page<F, O, H>(
    config: &ScrapeConfig,
    fetcher: &F,
    objects: &O,
    hashes: &H,
    url: &str,
) -> Result<PageReport, ScrapeError>
where
    F: PageFetcher + ?Sized,
    O: ObjectStore + ?Sized,
    H: HashStore + ?Sized,
{
    info!(url = %url, "Scraping URL");
    let page = render_page(config, fetcher, url).await?;

    let key = storage::object_key(&config.site, url);
    storage::write_markdown(objects, &key, &page.markdown)
        .await
        .map_err(|source| ScrapeError::Upload {
            key: key.clone(),
            source,
        })?;

    let digest = hash::content_hash(&page.primary_html);
    let status = hash::track(hashes, url, &digest)
        .await
        .map_err(|source| ScrapeError::Hash {
            url: url.to_string(),
            source,
        })?;

    info!(url = %url, key = %key, ?status, "Scraping completed");
    Ok(PageReport {
        url: page.url,
        object_key: key,
        hash: digest,
        status,
        markdown_bytes: page.markdown.len(),
    })
}

/// Scrapes each URL in turn; failures are recorded and do not stop the run.
pub async fn scrape_all<F, O, H>(
    config: &ScrapeConfig,
    fetcher: &F,
    objects: &O,
    hashes: &H,
    urls: &[String],
) -> ScrapeReport
where
    F: PageFetcher + ?Sized,
    O: ObjectStore + ?Sized,
    H: HashStore + ?Sized,
{
    info!(pages = urls.len(), "Starting scrape run");
    let mut report = ScrapeReport::default();

    for url in urls {
        let span = info_span!("page", url = %url);
        match scrape_page(config, fetcher, objects, hashes, url)
            .instrument(span)
            .await
        {
            Ok(page) => report.pages.push(page),
            Err(e) => {
                error!(url = %url, error = %e, "Scrape failed");
                report.failures.push(PageFailure {
                    url: url.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        scraped = report.pages.len(),
        failed = report.failures.len(),
        new = report.count(ChangeStatus::New),
        changed = report.count(ChangeStatus::Changed),
        unchanged = report.count(ChangeStatus::Unchanged),
        "Scrape run finished"
    );
    report
}
