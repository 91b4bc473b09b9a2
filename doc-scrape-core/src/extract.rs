//! Locates the primary documentation section of a page.
//!
//! Documentation pages wrap their content in site chrome (navigation, header,
//! footer, sidebars). The primary section is found in two steps: the first
//! element matching the container selector, then the first element inside it
//! matching the section selector.

use scraper::{Html, Selector};
use tracing::{debug, error};

use crate::config::ExtractConfig;
use crate::error::ScrapeError;

/// Outer HTML of the primary section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimarySection {
    pub html: String,
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|e| ScrapeError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

pub fn extract_primary_section(
    html: &str,
    url: &str,
    config: &ExtractConfig,
) -> Result<PrimarySection, ScrapeError> {
    let container_sel = parse_selector(&config.container_selector)?;
    let section_sel = parse_selector(&config.section_selector)?;

    let document = Html::parse_document(html);

    let Some(container) = document.select(&container_sel).next() else {
        error!(url = %url, selector = %config.container_selector, "No main content found");
        return Err(ScrapeError::MissingContainer {
            url: url.to_string(),
            selector: config.container_selector.clone(),
        });
    };

    let Some(section) = container.select(&section_sel).next() else {
        error!(url = %url, selector = %config.section_selector, "No section found in main content");
        return Err(ScrapeError::MissingSection {
            url: url.to_string(),
            selector: config.section_selector.clone(),
        });
    };

    let html = section.html();
    debug!(url = %url, bytes = html.len(), "Extracted primary section");
    Ok(PrimarySection { html })
}
