use tracing::{error, info};

use crate::config::SiteConfig;
use crate::contract::{ObjectStore, StoreError};

/// Derives the object key for a page: the URL relative to the site root,
/// with `/` replaced by `-`, as a `.md` file under the output prefix.
///
/// `https://fragment.dev/docs/api-reference/accounts` with base
/// `https://fragment.dev/docs` becomes `scraped_docs/api-reference-accounts.md`.
pub fn object_key(site: &SiteConfig, url: &str) -> String {
    let base = site.base_url.trim_end_matches('/');
    let page = url
        .split(['#', '?'])
        .next()
        .unwrap_or(url)
        .trim_end_matches('/');

    let relative = if page == base {
        ""
    } else if let Some(rest) = page.strip_prefix(base).and_then(|r| r.strip_prefix('/')) {
        rest
    } else {
        page.split_once("://").map(|(_, rest)| rest).unwrap_or(page)
    };

    let stem = if relative.is_empty() {
        "index".to_string()
    } else {
        relative.replace(['/', ':'], "-")
    };

    let prefix = site.output_prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("{stem}.md")
    } else {
        format!("{prefix}/{stem}.md")
    }
}

/// Uploads the markdown, overwriting any existing object under `key`.
pub async fn write_markdown<O>(store: &O, key: &str, markdown: &str) -> Result<(), StoreError>
where
    O: ObjectStore + ?Sized,
{
    info!(key = %key, bytes = markdown.len(), "Saving markdown data");
    match store.put_markdown(key, markdown).await {
        Ok(()) => {
            info!(key = %key, "Markdown uploaded");
            Ok(())
        }
        Err(e) => {
            error!(key = %key, error = %e, "Failed to upload markdown");
            Err(e)
        }
    }
}
