//! Resolution: turn pending ledger rows into download or page links.
//!
//! Rows are worked in ledger order, one search at a time. After each row
//! the whole ledger is rewritten, so an interrupted run loses at most the
//! row in flight. Rerunning skips rows that already hold a usable link.

pub mod strategy;

use std::path::Path;
use std::time::Duration;

use rand::Rng;

use crate::alias::AliasMap;
use crate::config::{FinderConfig, ResolveSettings};
use crate::context::ServiceContext;
use crate::ledger::{LedgerRow, LedgerStore, RowStatus};
use crate::ports::SearchQuery;
use crate::scan::normalize;
use strategy::{classify, download_link, host_matches, mirror_link, Classification, DomainKind, SearchPlan};

/// Counts from one resolution run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionSummary {
    /// Rows searched in this run.
    pub attempted: usize,
    /// Rows that ended `RESOLVED`.
    pub resolved: usize,
    /// Rows that ended `REDIRECT_ONLY`.
    pub redirect_only: usize,
    /// Rows that ended `NOT_FOUND`.
    pub not_found: usize,
    /// Rows whose search failed.
    pub errors: usize,
    /// Rows left alone because they were already resolved.
    pub skipped: usize,
}

impl ResolutionSummary {
    fn count(&mut self, status: RowStatus) {
        match status {
            RowStatus::Resolved => self.resolved += 1,
            RowStatus::RedirectOnly => self.redirect_only += 1,
            RowStatus::NotFound => self.not_found += 1,
            RowStatus::Error => self.errors += 1,
            RowStatus::Pending => {}
        }
    }
}

/// Random pause between searches, within the configured bounds.
fn jitter(settings: &ResolveSettings) -> Duration {
    let (low, high) = if settings.delay_min_ms <= settings.delay_max_ms {
        (settings.delay_min_ms, settings.delay_max_ms)
    } else {
        (settings.delay_max_ms, settings.delay_min_ms)
    };
    if high == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::rng().random_range(low..=high))
}

/// Drives the search provider over a ledger.
pub struct ResolutionEngine<'a> {
    ctx: &'a ServiceContext,
    config: &'a FinderConfig,
    aliases: &'a AliasMap,
}

impl<'a> ResolutionEngine<'a> {
    /// Creates an engine.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, config: &'a FinderConfig, aliases: &'a AliasMap) -> Self {
        Self { ctx, config, aliases }
    }

    /// Resolves every unsettled row of the ledger at `path`.
    ///
    /// Search failures only mark their row `ERROR`.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be read or written, or the
    /// search provider is not ready while there is work to do.
    pub async fn run(&self, path: &Path) -> Result<ResolutionSummary, String> {
        let store = LedgerStore::new(&*self.ctx.fs, &self.config.search);
        let mut rows = store.read_all(path)?;
        let mut summary = ResolutionSummary::default();

        let todo: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| !row.filename.trim().is_empty())
            .filter_map(|(index, row)| {
                if row.is_settled() {
                    summary.skipped += 1;
                    None
                } else {
                    Some(index)
                }
            })
            .collect();
        if todo.is_empty() {
            tracing::info!(path = %path.display(), skipped = summary.skipped, "nothing to resolve");
            return Ok(summary);
        }
        self.ctx
            .search
            .ready()
            .map_err(|e| format!("Search provider is not available: {e}"))?;

        let total = todo.len();
        for (position, &index) in todo.iter().enumerate() {
            if position > 0 {
                tokio::time::sleep(jitter(&self.config.resolve)).await;
            }
            tracing::info!(
                row = position + 1,
                total,
                filename = %rows[index].filename,
                "resolving"
            );
            self.resolve_row(&mut rows[index]).await;
            summary.attempted += 1;
            summary.count(rows[index].status);
            store.write_all(path, &rows)?;
        }

        tracing::info!(
            path = %path.display(),
            attempted = summary.attempted,
            resolved = summary.resolved,
            redirect_only = summary.redirect_only,
            not_found = summary.not_found,
            errors = summary.errors,
            skipped = summary.skipped,
            "resolution finished"
        );
        Ok(summary)
    }

    /// Searches for one row and records the outcome in it.
    async fn resolve_row(&self, row: &mut LedgerRow) {
        let settings = &self.config.search;
        let names = normalize(&row.filename, self.aliases);
        let plan =
            SearchPlan::for_names(names.decision_name(), &names.query_term, &row.node_types, settings);
        let query = SearchQuery {
            domain: plan.domain.clone(),
            query: plan.query.clone(),
            node_type: (!row.node_types.is_empty()).then(|| row.node_types.clone()),
        };

        let url = match self.ctx.search.query(&query).await {
            Ok(Some(url)) => url,
            Ok(None) => {
                tracing::info!(query = %plan.query, "no result");
                row.status = RowStatus::NotFound;
                return;
            }
            Err(e) => {
                tracing::warn!(query = %plan.query, error = %e, "search failed");
                row.status = RowStatus::Error;
                return;
            }
        };

        match (classify(&url, &plan), plan.kind) {
            (Classification::Miss, _) => {
                tracing::info!(%url, domain = %plan.domain, "first result is off target");
                row.status = RowStatus::NotFound;
            }
            (Classification::Direct, DomainKind::International) => {
                row.download_link = download_link(&url);
                row.mirror_link = mirror_link(&url, settings);
                row.search_link.clear();
                row.status = RowStatus::Resolved;
            }
            (Classification::Direct, DomainKind::Domestic) => {
                row.download_link.clear();
                row.mirror_link.clear();
                row.search_link = url;
                row.status = RowStatus::Resolved;
            }
            (Classification::Redirector, _) => {
                row.download_link.clear();
                row.mirror_link.clear();
                match self.ctx.search.resolve_redirect(&url, &plan.domain).await {
                    Ok(Some(page)) if host_matches(&page, &plan.domain) => {
                        row.search_link = page;
                        row.status = RowStatus::Resolved;
                    }
                    outcome => {
                        if let Err(e) = outcome {
                            tracing::warn!(%url, error = %e, "following redirect failed");
                        }
                        row.search_link = url;
                        row.status = RowStatus::RedirectOnly;
                    }
                }
            }
        }
        tracing::debug!(filename = %row.filename, status = %row.status, "row resolved");
    }
}
