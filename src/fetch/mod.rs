// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::{
    header::{CACHE_CONTROL, PRAGMA},
    Client,
};
use tracing::{debug, info, warn};
use url::Url;

/// Accept only `http`/`https` links; blank or anything else counts as
/// "not configured".
pub fn source_url(raw: &str) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
        Ok(url) => {
            warn!(scheme = url.scheme(), "ignoring non-http csv source");
            None
        }
        Err(e) => {
            warn!(error = %e, "ignoring unparsable csv source");
            None
        }
    }
}

/// GET a published CSV export, bypassing caches. Body is returned trimmed.
#[tracing::instrument(level = "info", skip_all, fields(url = %url))]
pub async fn fetch_csv(client: &Client, url: &Url) -> Result<String> {
    debug!("fetching csv");
    let body = client
        .get(url.clone())
        .header(CACHE_CONTROL, "no-cache, no-store")
        .header(PRAGMA, "no-cache")
        .send()
        .await
        .with_context(|| format!("GET {} failed", url))?
        .error_for_status()
        .with_context(|| format!("Non-success status {}", url))?
        .text()
        .await
        .with_context(|| format!("Reading text from {}", url))?;

    let body = body.trim().to_string();
    info!(bytes = body.len(), "fetched csv");
    Ok(body)
}

/// Secondary sources are optional: absent or failing ones yield `None`.
pub async fn fetch_optional_csv(client: &Client, url: Option<&Url>) -> Option<String> {
    let url = url?;
    match fetch_csv(client, url).await {
        Ok(body) => Some(body),
        Err(e) => {
            warn!(%url, error = %format!("{:#}", e), "optional csv fetch failed");
            None
        }
    }
}
