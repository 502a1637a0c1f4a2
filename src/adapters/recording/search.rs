//! Recording adapter for the `SearchProvider` port.

use serde_json::json;

use super::record_result;
use crate::cassette::session::SharedRecorder;
use crate::ports::{PortError, SearchFuture, SearchProvider, SearchQuery};

/// Captures search round trips, including failures.
pub struct RecordingSearchProvider {
    inner: Box<dyn SearchProvider>,
    recorder: SharedRecorder,
}

impl RecordingSearchProvider {
    /// Wraps `inner`, recording into `recorder`.
    pub fn new(inner: Box<dyn SearchProvider>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

impl SearchProvider for RecordingSearchProvider {
    fn ready(&self) -> Result<(), PortError> {
        self.inner.ready()
    }

    fn query(&self, query: &SearchQuery) -> SearchFuture<'_, Option<String>> {
        let query = query.clone();
        Box::pin(async move {
            let result = self.inner.query(&query).await;
            record_result(&self.recorder, "search", "query", &query, &result);
            result
        })
    }

    fn resolve_redirect(&self, url: &str, domain: &str) -> SearchFuture<'_, Option<String>> {
        let url = url.to_string();
        let domain = domain.to_string();
        Box::pin(async move {
            let result = self.inner.resolve_redirect(&url, &domain).await;
            let input = json!({"url": url, "domain": domain});
            record_result(&self.recorder, "search", "resolve_redirect", &input, &result);
            result
        })
    }
}
