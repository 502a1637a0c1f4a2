//! In-memory port fakes shared by unit tests.

use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};

use crate::context::ServiceContext;
use crate::ports::{
    Clock, FileSystem, IdGenerator, PortError, SearchFuture, SearchProvider, SearchQuery,
};

/// In-memory filesystem keyed by full path.
#[derive(Default)]
pub struct MemFs {
    files: Mutex<BTreeMap<PathBuf, String>>,
    writes: AtomicU64,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, contents: &str) {
        self.files.lock().unwrap().insert(path.into(), contents.to_string());
    }

    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files.lock().unwrap().get(path).cloned()
    }

    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }
}

impl FileSystem for MemFs {
    fn read_to_string(&self, path: &Path) -> Result<String, PortError> {
        self.contents(path).ok_or_else(|| format!("File not found: {}", path.display()).into())
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), PortError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.insert(path, contents);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        files.contains_key(path) || files.keys().any(|p| p.starts_with(path))
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>, PortError> {
        if !self.exists(path) {
            return Err(format!("Not a directory: {}", path.display()).into());
        }
        let files = self.files.lock().unwrap();
        let mut names: Vec<String> = files
            .keys()
            .filter(|p| p.parent() == Some(path))
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(String::from))
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }
}

/// Clock frozen at 2024-06-15T10:30:00Z.
pub struct FixedClock;

impl FixedClock {
    pub fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap()
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        Self::instant()
    }
}

/// Produces `id-1`, `id-2`, ...
#[derive(Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl IdGenerator for SequentialIds {
    fn generate_id(&self) -> String {
        format!("id-{}", self.next.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// Scripted outcome of one provider call.
pub type Scripted = Result<Option<String>, String>;

/// Search provider that replies from queues and logs every call.
#[derive(Default)]
pub struct ScriptedSearch {
    queries: Mutex<VecDeque<Scripted>>,
    redirects: Mutex<VecDeque<Scripted>>,
    seen: Arc<Mutex<Vec<SearchQuery>>>,
    not_ready: Option<String>,
}

impl ScriptedSearch {
    pub fn new(queries: Vec<Scripted>, redirects: Vec<Scripted>) -> Self {
        Self {
            queries: Mutex::new(queries.into()),
            redirects: Mutex::new(redirects.into()),
            ..Self::default()
        }
    }

    pub fn not_ready(reason: &str) -> Self {
        Self { not_ready: Some(reason.to_string()), ..Self::default() }
    }

    /// Handle to the queries received, usable after the provider is boxed.
    pub fn seen(&self) -> Arc<Mutex<Vec<SearchQuery>>> {
        Arc::clone(&self.seen)
    }

    fn pop(queue: &Mutex<VecDeque<Scripted>>) -> Result<Option<String>, PortError> {
        match queue.lock().unwrap().pop_front() {
            Some(Ok(url)) => Ok(url),
            Some(Err(message)) => Err(message.into()),
            None => panic!("ScriptedSearch ran out of scripted replies"),
        }
    }
}

impl SearchProvider for ScriptedSearch {
    fn ready(&self) -> Result<(), PortError> {
        match &self.not_ready {
            Some(reason) => Err(reason.clone().into()),
            None => Ok(()),
        }
    }

    fn query(&self, query: &SearchQuery) -> SearchFuture<'_, Option<String>> {
        self.seen.lock().unwrap().push(query.clone());
        let reply = Self::pop(&self.queries);
        Box::pin(async move { reply })
    }

    fn resolve_redirect(&self, _url: &str, _domain: &str) -> SearchFuture<'_, Option<String>> {
        let reply = Self::pop(&self.redirects);
        Box::pin(async move { reply })
    }
}

/// Context over an in-memory filesystem with fixed clock and ids.
pub fn context(fs: Arc<MemFs>, search: ScriptedSearch) -> ServiceContext {
    ServiceContext {
        clock: Box::new(FixedClock),
        fs,
        id_gen: Box::new(SequentialIds::default()),
        search: Box::new(search),
    }
}
