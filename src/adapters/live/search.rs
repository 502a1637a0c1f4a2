//! Live adapter for the `SearchProvider` port over a web search engine.
//!
//! Fetches the engine's result page for a site-restricted query and takes
//! the first ranked result heading. Markup handling stays in this file.

use std::time::Duration;

use regex::Regex;
use reqwest::Client;

use crate::ports::{PortError, SearchFuture, SearchProvider, SearchQuery};
use crate::resolve::strategy::host_matches;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Marker of the organic results container on the result page.
const RESULTS_CONTAINER: &str = "id=\"b_results\"";

/// Search provider that scrapes a search engine result page.
pub struct LiveSearchProvider {
    client: Client,
    engine_url: String,
    first_result: Regex,
}

impl LiveSearchProvider {
    /// Builds the HTTP session.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed (for
    /// example no TLS backend is available).
    pub fn new(engine_url: &str, timeout: Duration) -> Result<Self, String> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to initialize search HTTP client: {e}"))?;
        let first_result = Regex::new(r#"(?s)<h2[^>]*>\s*<a[^>]*?href="([^"]+)""#)
            .map_err(|e| format!("Invalid result pattern: {e}"))?;
        Ok(Self { client, engine_url: engine_url.to_string(), first_result })
    }

    fn first_result_url(&self, page: &str) -> Result<Option<String>, PortError> {
        let Some(start) = page.find(RESULTS_CONTAINER) else {
            return Err("search page has no result container".into());
        };
        Ok(self
            .first_result
            .captures(&page[start..])
            .map(|caps| decode_entities(&caps[1])))
    }
}

/// Undoes the HTML escaping found inside attribute values.
fn decode_entities(raw: &str) -> String {
    raw.replace("&amp;", "&").replace("&quot;", "\"").replace("&#39;", "'")
}

/// First link in `page` whose host is `domain`.
fn link_on_domain(page: &str, domain: &str) -> Result<Option<String>, PortError> {
    let pattern = format!(r#"href="(https?://[^"]*{}[^"]*)""#, regex::escape(domain));
    let link = Regex::new(&pattern)
        .map_err(|e| -> PortError { format!("invalid link pattern: {e}").into() })?;
    let found = link
        .captures_iter(page)
        .map(|caps| decode_entities(&caps[1]))
        .find(|candidate| host_matches(candidate, domain));
    Ok(found)
}

impl SearchProvider for LiveSearchProvider {
    fn query(&self, query: &SearchQuery) -> SearchFuture<'_, Option<String>> {
        let text = query.query.clone();
        Box::pin(async move {
            let response = self
                .client
                .get(&self.engine_url)
                .query(&[("q", text.as_str()), ("setlang", "en-US")])
                .send()
                .await
                .map_err(|e| -> PortError { format!("search request failed: {e}").into() })?;
            let status = response.status();
            if !status.is_success() {
                return Err(format!("search engine returned HTTP {}", status.as_u16()).into());
            }
            let page = response
                .text()
                .await
                .map_err(|e| -> PortError { format!("failed to read result page: {e}").into() })?;
            let url = self.first_result_url(&page)?;
            tracing::debug!(query = %text, result = ?url, "search result");
            Ok(url)
        })
    }

    fn resolve_redirect(&self, url: &str, domain: &str) -> SearchFuture<'_, Option<String>> {
        let url = url.to_string();
        let domain = domain.to_string();
        Box::pin(async move {
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| -> PortError { format!("redirect navigation failed: {e}").into() })?;
            let landed = response.url().to_string();
            if host_matches(&landed, &domain) {
                return Ok(Some(landed));
            }
            let body = response
                .text()
                .await
                .map_err(|e| -> PortError { format!("failed to read redirect page: {e}").into() })?;
            link_on_domain(&body, &domain)
        })
    }
}

/// Stand-in used when the live provider could not be built.
///
/// Scanning still works; a resolution run fails up front via [`SearchProvider::ready`].
pub struct UnavailableSearchProvider {
    reason: String,
}

impl UnavailableSearchProvider {
    /// Wraps the initialization failure message.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl SearchProvider for UnavailableSearchProvider {
    fn ready(&self) -> Result<(), PortError> {
        Err(self.reason.clone().into())
    }

    fn query(&self, _query: &SearchQuery) -> SearchFuture<'_, Option<String>> {
        let reason = self.reason.clone();
        Box::pin(async move { Err(reason.into()) })
    }

    fn resolve_redirect(&self, _url: &str, _domain: &str) -> SearchFuture<'_, Option<String>> {
        let reason = self.reason.clone();
        Box::pin(async move { Err(reason.into()) })
    }
}
