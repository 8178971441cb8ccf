//! Feature extraction: turns captured element metadata into the text forms the
//! scorer compares against.

use loci_common::bundle::ElementSummary;
use loci_common::snapshot::ElementSnapshot;
use std::sync::OnceLock;

/// Attributes copied into the description, in this order.
const DESCRIPTION_ATTRS: &[&str] = &["id", "name", "class", "data-testid", "placeholder", "aria-label"];

/// Number of ancestors summarised in descriptions and element summaries.
const ANCESTOR_SUMMARY_DEPTH: usize = 2;

/// Lowercased, space-joined concatenation of every textual signal.
///
/// Consumers only test substring membership, but the ordering is fixed so the
/// blob is reproducible for a given snapshot.
pub fn build_text_blob(el: &ElementSnapshot) -> String {
    let mut parts: Vec<&str> = Vec::new();
    parts.extend(el.attrs.values());
    parts.extend(el.labels.iter().map(String::as_str));
    parts.push(&el.inner_text);
    parts.push(&el.text_content);
    parts.extend(el.sibling_texts.iter().map(|s| s.text.as_str()));
    for anc in &el.ancestors {
        parts.push(&anc.text);
        parts.extend(anc.classes.iter().map(String::as_str));
    }

    parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Ordered `key=value` summary fed to the similarity oracle.
///
/// Lossy on purpose: only the allow-listed attributes, labels, texts and a
/// two-ancestor summary are kept, in a fixed order.
pub fn build_description(el: &ElementSnapshot) -> String {
    let mut parts = vec![
        format!("tag={}", el.tag),
        format!("type={}", el.input_type.as_deref().unwrap_or("None")),
    ];

    for key in DESCRIPTION_ATTRS {
        if let Some(value) = el.attr(key) {
            parts.push(format!("{}={}", key, value));
        }
    }
    if !el.labels.is_empty() {
        parts.push(format!("labels={}", el.labels.join("|")));
    }
    if !el.inner_text.is_empty() {
        parts.push(format!("inner={}", el.inner_text));
    }
    if !el.text_content.is_empty() && el.text_content != el.inner_text {
        parts.push(format!("textContent={}", el.text_content));
    }

    let summary = el
        .ancestors
        .iter()
        .take(ANCESTOR_SUMMARY_DEPTH)
        .map(|a| a.text.as_str())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" | ");
    if !summary.is_empty() {
        parts.push(format!("ancestors={}", summary));
    }

    parts.join(" ; ")
}

/// Compact element view reported in resolution entries.
pub fn summarize(el: &ElementSnapshot) -> ElementSummary {
    let attrs = el
        .attrs
        .iter()
        .filter(|(k, v)| DESCRIPTION_ATTRS.contains(k) && !v.is_empty())
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let ancestor_texts = el
        .ancestors
        .iter()
        .filter(|a| !a.text.is_empty())
        .take(ANCESTOR_SUMMARY_DEPTH)
        .map(|a| a.text.clone())
        .collect();

    ElementSummary {
        tag: el.tag.clone(),
        input_type: el.input_type.clone(),
        attrs,
        ancestor_texts,
    }
}

/// A captured element paired with its lazily computed derived fields.
///
/// Each derived field is computed at most once per element.
#[derive(Debug)]
pub struct PreparedElement {
    index: usize,
    snapshot: ElementSnapshot,
    text_blob: OnceLock<String>,
    description: OnceLock<String>,
}

impl PreparedElement {
    pub fn new(index: usize, snapshot: ElementSnapshot) -> Self {
        Self {
            index,
            snapshot,
            text_blob: OnceLock::new(),
            description: OnceLock::new(),
        }
    }

    /// Wrap a capture in document order.
    pub fn prepare_all(snapshots: Vec<ElementSnapshot>) -> Vec<PreparedElement> {
        snapshots
            .into_iter()
            .enumerate()
            .map(|(i, s)| PreparedElement::new(i, s))
            .collect()
    }

    /// 0-based capture position.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn snapshot(&self) -> &ElementSnapshot {
        &self.snapshot
    }

    pub fn text_blob(&self) -> &str {
        self.text_blob.get_or_init(|| build_text_blob(&self.snapshot))
    }

    pub fn description(&self) -> &str {
        self.description
            .get_or_init(|| build_description(&self.snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loci_common::snapshot::SiblingPosition;

    fn login_input() -> ElementSnapshot {
        ElementSnapshot::new("input")
            .with_type("email")
            .with_attr("name", "Email")
            .with_attr("data-testid", "")
            .with_label("Account Name")
            .with_sibling(SiblingPosition::Next, "Forgot?")
            .with_ancestor("form", &["LoginForm", "dark"], "Sign In\nAccount Name")
    }

    #[test]
    fn text_blob_collects_all_signals_lowercased() {
        let blob = build_text_blob(&login_input());
        assert_eq!(
            blob,
            "email email account name forgot? sign in\naccount name loginform dark"
        );
    }

    #[test]
    fn description_follows_allow_list_order() {
        let el = ElementSnapshot::new("button")
            .with_attr("placeholder", "p")
            .with_attr("id", "go")
            .with_attr("class", "btn")
            .with_text("Go");
        assert_eq!(
            build_description(&el),
            "tag=button ; type=None ; id=go ; class=btn ; placeholder=p ; inner=Go"
        );
    }

    #[test]
    fn description_keeps_distinct_text_content_and_ancestors() {
        let mut el = ElementSnapshot::new("button")
            .with_ancestor("div", &[], "")
            .with_ancestor("section", &[], "Checkout")
            .with_ancestor("main", &[], "Ignored third");
        el.inner_text = "Pay".into();
        el.text_content = "Pay now".into();
        assert_eq!(
            build_description(&el),
            "tag=button ; type=None ; inner=Pay ; textContent=Pay now ; ancestors=Checkout"
        );
    }

    #[test]
    fn summary_filters_attributes_and_empty_ancestor_texts() {
        let el = ElementSnapshot::new("input")
            .with_type("text")
            .with_attr("name", "q")
            .with_attr("autocomplete", "off")
            .with_ancestor("div", &["a"], "")
            .with_ancestor("form", &[], "Search")
            .with_ancestor("main", &[], "Site")
            .with_ancestor("body", &[], "All");
        let summary = summarize(&el);
        assert_eq!(summary.attrs, vec![("name".to_string(), "q".to_string())]);
        assert_eq!(summary.ancestor_texts, vec!["Search", "Site"]);
    }

    #[test]
    fn prepared_element_caches_derived_fields() {
        let prepared = PreparedElement::new(3, login_input());
        let first = prepared.text_blob().as_ptr();
        let second = prepared.text_blob().as_ptr();
        assert_eq!(first, second);
        assert_eq!(prepared.index(), 3);
        assert!(prepared.description().starts_with("tag=input ; type=email"));
    }
}
