//! Single-URL invocation entry point with a status-code style response.
//!
//! Callers that trigger one scrape per event (a function runtime, a queue
//! consumer, the `invoke` CLI command) hand over an [`InvocationEvent`] and get
//! back an [`InvocationResponse`] they can serialize as-is.

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::ScrapeConfig;
use crate::contract::{HashStore, ObjectStore, PageFetcher};
use crate::error::{ScrapeError, Stage};
use crate::pipeline::scrape_page;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvocationEvent {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl InvocationResponse {
    fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

pub async fn handle_event<F, O, H>(
    config: &ScrapeConfig,
    fetcher: &F,
    objects: &O,
    hashes: &H,
    event: &InvocationEvent,
) -> InvocationResponse
where
    F: PageFetcher + ?Sized,
    O: ObjectStore + ?Sized,
    H: HashStore + ?Sized,
{
    info!("Scrape invocation received");
    let Some(url) = event.url.as_deref().map(str::trim).filter(|u| !u.is_empty()) else {
        warn!("Invocation event has no URL");
        return InvocationResponse::new(400, "URL is required");
    };

    match scrape_page(config, fetcher, objects, hashes, url).await {
        Ok(report) => {
            info!(url = %url, key = %report.object_key, "Invocation completed");
            InvocationResponse::new(200, "Scraping completed")
        }
        Err(e) => {
            error!(url = %url, error = %e, "Invocation failed");
            InvocationResponse::new(500, failure_message(&e))
        }
    }
}

fn failure_message(error: &ScrapeError) -> &'static str {
    match error.stage() {
        Stage::Fetch => "An error occurred while fetching primary section content",
        Stage::Process => "An error occurred while processing primary section content",
        Stage::Save => "An error occurred while saving markdown data",
        Stage::Hash => "An error occurred while generating and saving hash",
    }
}
