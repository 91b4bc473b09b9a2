use thiserror::Error;

use crate::contract::StoreError;

/// Pipeline step in which a scrape failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Fetching the page or locating its primary section.
    Fetch,
    /// Normalizing and converting the section to markdown.
    Process,
    /// Writing the markdown artifact.
    Save,
    /// Comparing and storing the content hash.
    Hash,
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: StoreError,
    },

    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    #[error("no main content matching `{selector}` found for {url}")]
    MissingContainer { url: String, selector: String },

    #[error("no `{selector}` found in main content for {url}")]
    MissingSection { url: String, selector: String },

    #[error("markdown conversion failed for {url}: {source}")]
    Convert {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to save markdown to {key}: {source}")]
    Upload {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to save hash for {url}: {source}")]
    Hash {
        url: String,
        #[source]
        source: StoreError,
    },
}

impl ScrapeError {
    pub fn stage(&self) -> Stage {
        match self {
            ScrapeError::Fetch { .. }
            | ScrapeError::Selector { .. }
            | ScrapeError::MissingContainer { .. }
            | ScrapeError::MissingSection { .. } => Stage::Fetch,
            ScrapeError::Convert { .. } => Stage::Process,
            ScrapeError::Upload { .. } => Stage::Save,
            ScrapeError::Hash { .. } => Stage::Hash,
        }
    }
}
