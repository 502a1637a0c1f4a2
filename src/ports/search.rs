//! Search provider port: the external web-search collaborator.
//!
//! The finder never sees result markup. It asks for the first ranked URL of
//! a site-restricted query and, for redirector results, asks the provider to
//! follow the redirect once.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use super::PortError;

/// Boxed future returned by [`SearchProvider`] methods, keeping the trait dyn-compatible.
pub type SearchFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, PortError>> + Send + 'a>>;

/// A single site-restricted search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Domain the result is expected to land on (e.g. `huggingface.co`).
    pub domain: String,
    /// Full query text, e.g. `site:huggingface.co "clip_vision_h.safetensors"`.
    pub query: String,
    /// Node type(s) of the row being resolved, as stored in the ledger.
    pub node_type: Option<String>,
}

/// Looks up candidate links for missing assets.
///
/// Live implementations hold a single stateful session; callers must not
/// issue concurrent requests.
pub trait SearchProvider: Send + Sync {
    /// Checks that the provider can run at all.
    ///
    /// # Errors
    ///
    /// Returns an error when the provider cannot be initialized (no usable
    /// HTTP client or browser runtime). Resolution runs fail as a whole.
    fn ready(&self) -> Result<(), PortError> {
        Ok(())
    }

    /// Runs the query and returns the URL of the first ranked result.
    ///
    /// # Errors
    ///
    /// Returns an error when the round trip fails or the result page has an
    /// unrecognized shape (for example no result container).
    fn query(&self, query: &SearchQuery) -> SearchFuture<'_, Option<String>>;

    /// Follows a redirector result and returns the content URL on `domain`.
    ///
    /// # Errors
    ///
    /// Returns an error when navigation fails.
    fn resolve_redirect(&self, url: &str, domain: &str) -> SearchFuture<'_, Option<String>>;
}
