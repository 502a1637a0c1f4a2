//! Search strategy: where to look for a missing file and how to read the
//! answer.

use reqwest::Url;

use crate::config::SearchSettings;
use crate::scan::contains_cjk;

/// Which of the two target domains a plan uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainKind {
    /// Model hub with direct file URLs (`huggingface.co`).
    International,
    /// Model community whose result links often go through redirectors
    /// (`liblib.art`).
    Domestic,
}

/// The search to run for one ledger row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPlan {
    /// Target domain kind.
    pub kind: DomainKind,
    /// Target domain.
    pub domain: String,
    /// Site-restricted query text.
    pub query: String,
}

impl SearchPlan {
    /// Chooses domain and query for a row.
    ///
    /// Names with CJK characters go to the domestic domain, everything else
    /// to the international one. `ip-adapter.bin` loaded by an InstantID
    /// node is ambiguous on its own, so it gets a fixed query.
    #[must_use]
    pub fn for_names(
        decision_name: &str,
        query_term: &str,
        node_types: &str,
        settings: &SearchSettings,
    ) -> Self {
        if decision_name == "ip-adapter.bin"
            && node_types.split(',').any(|t| t.trim() == "InstantIDModelLoader")
        {
            let domain = settings.international_domain.clone();
            return Self {
                kind: DomainKind::International,
                query: format!("site:{domain} \"ip-adapter.bin InstantID\""),
                domain,
            };
        }
        let (kind, domain) = if contains_cjk(decision_name) {
            (DomainKind::Domestic, settings.domestic_domain.clone())
        } else {
            (DomainKind::International, settings.international_domain.clone())
        };
        Self { kind, query: format!("site:{domain} \"{query_term}\""), domain }
    }

    /// Browser link that reruns this search by hand.
    #[must_use]
    pub fn search_link(&self, settings: &SearchSettings) -> String {
        let encoded = self.query.replace(' ', "+").replace('"', "%22");
        format!("{}?q={encoded}", settings.engine_url)
    }
}

/// Returns `true` if `url`'s host is `domain` or one of its subdomains.
#[must_use]
pub fn host_matches(url: &str, domain: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    let domain = domain.to_ascii_lowercase();
    host == domain || host.strip_suffix(&domain).is_some_and(|rest| rest.ends_with('.'))
}

/// How a search result relates to the target domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Content page on the target domain.
    Direct,
    /// Link that mentions the target domain but must be followed to reach it.
    Redirector,
    /// Unrelated result.
    Miss,
}

/// Classifies a first-ranked result for `plan`.
///
/// International results only count on the domain itself. Domestic results
/// also count when they merely mention the domain or point at a search
/// page; those are redirectors.
#[must_use]
pub fn classify(url: &str, plan: &SearchPlan) -> Classification {
    let on_domain = host_matches(url, &plan.domain);
    match plan.kind {
        DomainKind::International if on_domain => Classification::Direct,
        DomainKind::International => Classification::Miss,
        DomainKind::Domestic => {
            if !on_domain && !url.contains(&plan.domain) {
                Classification::Miss
            } else if !on_domain || is_search_path(url) {
                Classification::Redirector
            } else {
                Classification::Direct
            }
        }
    }
}

fn is_search_path(url: &str) -> bool {
    Url::parse(url).is_ok_and(|u| u.path().to_ascii_lowercase().contains("search"))
}

/// Direct-download form of a hub file URL.
#[must_use]
pub fn download_link(url: &str) -> String {
    url.replace("/blob/", "/resolve/")
}

/// Same file on the mirror host, or empty if `url` does not parse.
#[must_use]
pub fn mirror_link(url: &str, settings: &SearchSettings) -> String {
    match Url::parse(url) {
        Ok(parsed) => format!(
            "{}{}",
            settings.mirror_base.trim_end_matches('/'),
            parsed.path().replace("/blob/", "/resolve/")
        ),
        Err(_) => String::new(),
    }
}
