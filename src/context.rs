//! Service context bundling all port trait objects.

use std::path::Path;
use std::sync::Arc;

use crate::adapters::live::{
    LiveClock, LiveFileSystem, LiveIdGenerator, LiveSearchProvider, UnavailableSearchProvider,
};
use crate::adapters::recording::{
    RecordingClock, RecordingFileSystem, RecordingIdGenerator, RecordingSearchProvider,
};
use crate::adapters::replaying::{
    ReplayingClock, ReplayingFileSystem, ReplayingIdGenerator, ReplayingSearchProvider,
};
use crate::cassette::config::CassetteConfig;
use crate::cassette::replayer::CassetteReplayer;
use crate::cassette::session::RecordingSession;
use crate::config::SearchSettings;
use crate::ports::{Clock, FileSystem, IdGenerator, PortError, SearchFuture, SearchProvider, SearchQuery};

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. Constructors
/// wire up different adapter implementations (live, replaying, recording).
pub struct ServiceContext {
    /// Clock for dating output folders.
    pub clock: Box<dyn Clock>,
    /// Filesystem for descriptors, ledgers and aliases. Shared with
    /// validation workers.
    pub fs: Arc<dyn FileSystem>,
    /// ID generator for alias entries.
    pub id_gen: Box<dyn IdGenerator>,
    /// Web search collaborator used during resolution.
    pub search: Box<dyn SearchProvider>,
}

/// Builds the live search provider, degrading to an unavailable one.
fn live_search(settings: &SearchSettings) -> Box<dyn SearchProvider> {
    match LiveSearchProvider::new(&settings.engine_url, settings.request_timeout()) {
        Ok(provider) => Box::new(provider),
        Err(reason) => {
            tracing::warn!(%reason, "search provider unavailable");
            Box::new(UnavailableSearchProvider::new(reason))
        }
    }
}

impl ServiceContext {
    /// Creates a live context with real adapters for every port.
    ///
    /// A search provider that cannot start is replaced by one whose
    /// `ready` check fails, so only resolution runs are affected.
    #[must_use]
    pub fn live(search: &SearchSettings) -> Self {
        Self {
            clock: Box::new(LiveClock),
            fs: Arc::new(LiveFileSystem),
            id_gen: Box::new(LiveIdGenerator),
            search: live_search(search),
        }
    }

    /// Creates a live context whose port calls are recorded into `dir`.
    ///
    /// Drop the context, then call [`RecordingSession::finish`] to write the
    /// per-port cassettes.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette directory cannot be created.
    pub fn recording_at(
        dir: &Path,
        search: &SearchSettings,
    ) -> Result<(Self, RecordingSession), String> {
        let session = RecordingSession::new(dir)?;
        let ctx = Self {
            clock: Box::new(RecordingClock::new(Box::new(LiveClock), Arc::clone(&session.clock))),
            fs: Arc::new(RecordingFileSystem::new(
                Box::new(LiveFileSystem),
                Arc::clone(&session.fs),
            )),
            id_gen: Box::new(RecordingIdGenerator::new(
                Box::new(LiveIdGenerator),
                Arc::clone(&session.id_gen),
            )),
            search: Box::new(RecordingSearchProvider::new(
                live_search(search),
                Arc::clone(&session.search),
            )),
        };
        Ok((ctx, session))
    }

    /// Creates a replaying context from a monolithic cassette file.
    ///
    /// Each port gets its own replayer over the same cassette, so per-port
    /// cursors are independent.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, String> {
        let cassette = CassetteConfig::load_cassette(path)?;
        Ok(Self {
            clock: Box::new(ReplayingClock::new(CassetteReplayer::new(&cassette))),
            fs: Arc::new(ReplayingFileSystem::new(CassetteReplayer::new(&cassette))),
            id_gen: Box::new(ReplayingIdGenerator::new(CassetteReplayer::new(&cassette))),
            search: Box::new(ReplayingSearchProvider::new(CassetteReplayer::new(&cassette))),
        })
    }

    /// Creates a replaying context from per-port cassette files.
    ///
    /// Ports without a configured cassette use a panicking adapter that
    /// fails with a clear message when called.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured cassette file cannot be read or parsed.
    pub fn replaying_from(config: &CassetteConfig) -> Result<Self, String> {
        let replayers = config.load_all()?;

        Ok(Self {
            clock: match replayers.clock {
                Some(r) => Box::new(ReplayingClock::new(r)),
                None => Box::new(PanickingClock),
            },
            fs: match replayers.fs {
                Some(r) => Arc::new(ReplayingFileSystem::new(r)),
                None => Arc::new(PanickingFileSystem),
            },
            id_gen: match replayers.id_gen {
                Some(r) => Box::new(ReplayingIdGenerator::new(r)),
                None => Box::new(PanickingIdGenerator),
            },
            search: match replayers.search {
                Some(r) => Box::new(ReplayingSearchProvider::new(r)),
                None => Box::new(PanickingSearchProvider),
            },
        })
    }
}

// --- Panicking adapters for unspecified ports ---

struct PanickingClock;
impl Clock for PanickingClock {
    fn now(&self) -> chrono::DateTime<chrono::Utc> {
        panic!("Clock port not configured in CassetteConfig: no cassette loaded for clock");
    }
}

struct PanickingFileSystem;
impl FileSystem for PanickingFileSystem {
    fn read_to_string(&self, _path: &Path) -> Result<String, PortError> {
        panic!("FileSystem port not configured in CassetteConfig: no cassette loaded for fs");
    }
    fn write(&self, _path: &Path, _contents: &str) -> Result<(), PortError> {
        panic!("FileSystem port not configured in CassetteConfig: no cassette loaded for fs");
    }
    fn exists(&self, _path: &Path) -> bool {
        panic!("FileSystem port not configured in CassetteConfig: no cassette loaded for fs");
    }
    fn list_dir(&self, _path: &Path) -> Result<Vec<String>, PortError> {
        panic!("FileSystem port not configured in CassetteConfig: no cassette loaded for fs");
    }
}

struct PanickingIdGenerator;
impl IdGenerator for PanickingIdGenerator {
    fn generate_id(&self) -> String {
        panic!("IdGenerator port not configured in CassetteConfig: no cassette loaded for id_gen");
    }
}

struct PanickingSearchProvider;
impl SearchProvider for PanickingSearchProvider {
    fn query(&self, _query: &SearchQuery) -> SearchFuture<'_, Option<String>> {
        panic!("SearchProvider port not configured in CassetteConfig: no cassette loaded for search");
    }
    fn resolve_redirect(&self, _url: &str, _domain: &str) -> SearchFuture<'_, Option<String>> {
        panic!("SearchProvider port not configured in CassetteConfig: no cassette loaded for search");
    }
}
