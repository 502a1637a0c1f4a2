//! Replaying adapter for the `SearchProvider` port.

use std::sync::Mutex;

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::{SearchFuture, SearchProvider, SearchQuery};

/// Serves recorded search results in call order.
pub struct ReplayingSearchProvider {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingSearchProvider {
    /// Creates the adapter from a replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl SearchProvider for ReplayingSearchProvider {
    fn query(&self, _query: &SearchQuery) -> SearchFuture<'_, Option<String>> {
        let output = next_output(&self.replayer, "search", "query");
        Box::pin(async move { replay_result(&output, "search::query") })
    }

    fn resolve_redirect(&self, _url: &str, _domain: &str) -> SearchFuture<'_, Option<String>> {
        let output = next_output(&self.replayer, "search", "resolve_redirect");
        Box::pin(async move { replay_result(&output, "search::resolve_redirect") })
    }
}
