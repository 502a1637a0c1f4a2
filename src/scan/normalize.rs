//! Name normalization: raw reference -> decision name and query term.
//!
//! The decision name (alias applied, nothing stripped) picks the search
//! domain. The query term (alias applied, leading CJK label stripped) is
//! what gets searched for and probed on disk.

use crate::alias::AliasMap;

/// Longest suffix after the first `_` that keeps a name whole.
const SHORT_SUFFIX_MAX_CHARS: usize = 5;

/// A raw name and its derived forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    /// The name as given.
    pub original: String,
    /// After alias correction.
    pub mapped: String,
    /// After alias correction and prefix stripping. Never empty when
    /// `original` is non-empty.
    pub query_term: String,
}

impl Normalized {
    /// Name used for domain selection and special-case rules.
    #[must_use]
    pub fn decision_name(&self) -> &str {
        &self.mapped
    }
}

/// Returns `true` for characters in the CJK Unified Ideographs block.
#[must_use]
pub fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Returns `true` if `text` contains any CJK ideograph.
#[must_use]
pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(is_cjk)
}

fn starts_with_cjk(text: &str) -> bool {
    text.chars().next().is_some_and(is_cjk)
}

/// Named exception: `name_v2`, `model_fp16`, `foo_XL` style names are kept
/// whole because the part after the first `_` is a short variant tag, not
/// the real name.
fn has_short_variant_suffix(name: &str) -> bool {
    name.split_once('_').is_some_and(|(_, suffix)| {
        suffix.chars().count() <= SHORT_SUFFIX_MAX_CHARS && !contains_cjk(suffix)
    })
}

/// Removes a leading CJK label and the separators after it, repeatedly.
fn strip_cjk_prefix(name: &str) -> &str {
    let mut rest = name;
    while starts_with_cjk(rest) {
        rest = rest.trim_start_matches(is_cjk).trim();
        rest = rest.trim_start_matches(|c: char| matches!(c, '-' | '_' | '|') || c.is_whitespace());
        rest = rest.trim();
    }
    rest
}

/// Derives decision name and query term for `raw`. Never fails.
#[must_use]
pub fn normalize(raw: &str, aliases: &AliasMap) -> Normalized {
    let mapped = match aliases.lookup(raw) {
        Some(corrected) if !corrected.is_empty() => corrected.to_string(),
        _ => raw.to_string(),
    };

    let query_term = if has_short_variant_suffix(&mapped) || !starts_with_cjk(&mapped) {
        mapped.clone()
    } else {
        match strip_cjk_prefix(&mapped) {
            "" => mapped.clone(),
            stripped => stripped.to_string(),
        }
    };

    if query_term != mapped {
        tracing::trace!(raw, mapped = %mapped, query_term = %query_term, "stripped name prefix");
    }
    Normalized { original: raw.to_string(), mapped, query_term }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::AliasEntry;

    fn no_aliases() -> AliasMap {
        AliasMap::default()
    }

    #[test]
    fn plain_names_pass_through() {
        let n = normalize("sd_xl_base_1.0.safetensors", &no_aliases());
        assert_eq!(n.mapped, "sd_xl_base_1.0.safetensors");
        assert_eq!(n.query_term, "sd_xl_base_1.0.safetensors");
        assert_eq!(n.decision_name(), n.mapped);
    }

    #[test]
    fn leading_cjk_label_and_separators_are_stripped() {
        let n = normalize("写实风格-realisticVision.safetensors", &no_aliases());
        assert_eq!(n.query_term, "realisticVision.safetensors");
        assert_eq!(n.decision_name(), "写实风格-realisticVision.safetensors");

        let n = normalize("动漫 | anything_v5_pruned.safetensors", &no_aliases());
        assert_eq!(n.query_term, "anything_v5_pruned.safetensors");
    }

    #[test]
    fn stripping_repeats_over_stacked_labels() {
        let n = normalize("模型_写实_realisticVision.safetensors", &no_aliases());
        assert_eq!(n.query_term, "realisticVision.safetensors");
    }

    #[test]
    fn short_variant_suffix_keeps_name_whole() {
        let n = normalize("麦橘_v2.pt", &no_aliases());
        assert_eq!(n.query_term, "麦橘_v2.pt");
    }

    #[test]
    fn all_cjk_name_falls_back_to_mapped() {
        let n = normalize("写实模型", &no_aliases());
        assert_eq!(n.query_term, "写实模型");
    }

    #[test]
    fn alias_correction_drives_both_names() {
        let aliases = AliasMap::new(vec![AliasEntry {
            id: "1".into(),
            original_name: "万相clip_vision_h.safetensors".into(),
            corrected_name: "clip_vision_h.safetensors".into(),
            notes: String::new(),
        }]);
        let n = normalize("万相clip_vision_h.safetensors", &aliases);
        assert_eq!(n.query_term, "clip_vision_h.safetensors");
        assert!(!contains_cjk(n.decision_name()));
    }

    #[test]
    fn empty_correction_keeps_raw_name() {
        let aliases = AliasMap::new(vec![AliasEntry {
            id: "1".into(),
            original_name: "x.pt".into(),
            corrected_name: String::new(),
            notes: String::new(),
        }]);
        assert_eq!(normalize("x.pt", &aliases).mapped, "x.pt");
    }

    #[test]
    fn query_term_is_idempotent_and_non_empty() {
        for raw in ["写实-a.ckpt", "b.pt", "中文", "模型_长名字很长的后缀", "中-_| c"] {
            let once = normalize(raw, &no_aliases());
            assert!(!once.query_term.is_empty(), "{raw}");
            let twice = normalize(&once.query_term, &no_aliases());
            assert_eq!(twice.query_term, once.query_term, "{raw}");
        }
    }
}
