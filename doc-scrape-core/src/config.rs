use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Everything the pipeline needs to turn one URL into stored markdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    pub site: SiteConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub normalize: NormalizeOptions,
    #[serde(default)]
    pub fetch: FetchConfig,
}

impl ScrapeConfig {
    pub fn new(site: SiteConfig) -> Self {
        Self {
            site,
            extract: ExtractConfig::default(),
            normalize: NormalizeOptions::default(),
            fetch: FetchConfig::default(),
        }
    }

    pub fn trace_loaded(&self) {
        info!(
            base_url = %self.site.base_url,
            output_prefix = %self.site.output_prefix,
            container = %self.extract.container_selector,
            section = %self.extract.section_selector,
            "Loaded ScrapeConfig"
        );
        debug!(?self, "ScrapeConfig loaded (full debug)");
    }
}

/// The documentation site being scraped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Root of the documentation; page URLs are named relative to it.
    pub base_url: String,
    /// Folder in the object store that receives the markdown files.
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,
}

fn default_output_prefix() -> String {
    "scraped_docs".to_string()
}

/// Selectors for locating the primary section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub container_selector: String,
    pub section_selector: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            container_selector: "div.basis-full".to_string(),
            section_selector: "section".to_string(),
        }
    }
}

/// Rewriting rules applied before markdown conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    /// Fence language for code blocks without a `language-*` class.
    pub default_language: String,
    /// `data-testid` value marking inline `<code>`. When unset, every
    /// `<code>` outside a `<pre>` is inline.
    pub inline_code_marker: Option<String>,
    /// Elements dropped together with their content.
    pub strip_tags: Vec<String>,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            default_language: "bash".to_string(),
            inline_code_marker: Some("inline-code".to_string()),
            strip_tags: ["script", "style", "noscript", "template", "svg", "button"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("doc-scrape/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
