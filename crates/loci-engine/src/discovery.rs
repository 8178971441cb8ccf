//! Unsupervised labeling: semantic keys and confidence for discovered elements.

use loci_common::bundle::CandidateSelector;
use loci_common::snapshot::ElementSnapshot;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug pattern"));

/// Lowercase, collapse non-alphanumeric runs to `_`, trim underscores.
pub fn slugify(text: &str) -> String {
    NON_ALNUM
        .replace_all(&text.to_lowercase(), "_")
        .trim_matches('_')
        .to_string()
}

/// Human-readable label sources, most specific first.
fn label_candidates(el: &ElementSnapshot) -> Vec<&str> {
    el.labels
        .iter()
        .map(String::as_str)
        .chain(el.aria_label.as_deref())
        .chain(el.attrs.get("placeholder"))
        .chain([el.inner_text.as_str(), el.text_content.as_str()])
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect()
}

/// Collision-free key assignment for one discovery run.
///
/// The first use of a base slug gets the bare slug; later uses get
/// `{base}_{n}` with `n` counting occurrences from 2.
#[derive(Debug, Default)]
pub struct KeyAllocator {
    counters: HashMap<String, usize>,
}

impl KeyAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive the key for the element captured at 0-based `index`.
    pub fn assign(&mut self, el: &ElementSnapshot, index: usize) -> String {
        let base = Self::base_key(el, index);
        let count = self.counters.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            base
        } else {
            format!("{}_{}", base, count)
        }
    }

    fn base_key(el: &ElementSnapshot, index: usize) -> String {
        if let Some(slug) = label_candidates(el)
            .into_iter()
            .map(slugify)
            .find(|s| !s.is_empty())
        {
            return slug;
        }

        let input_type = el
            .input_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or("generic");
        let slug = slugify(&format!("{}_{}", el.tag, input_type));
        if !slug.is_empty() {
            return slug;
        }

        format!("node_{}", index + 1)
    }
}

/// Confidence implied by the strategy that produced the primary selector.
pub fn confidence_from_primary(primary: &CandidateSelector) -> f64 {
    let description = primary.description.to_lowercase();
    let selector = primary.selector.to_lowercase();

    if description.contains("id attribute") || selector.starts_with("css=#") {
        1.0
    } else if selector.contains("data-") {
        0.95
    } else if description.contains("name attribute") {
        0.9
    } else if selector.starts_with("role=") {
        0.85
    } else if description.contains("ancestor class") {
        0.7
    } else {
        0.6
    }
}
