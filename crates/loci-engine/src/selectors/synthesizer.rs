//! Multi-strategy selector synthesis.
//!
//! Emission order is selector priority: attribute selectors, then
//! ancestor-context selectors, then role/text selectors. The primary selector
//! policy relies on this order as its tie-break.

use loci_common::bundle::{CandidateSelector, SelectorStrategy};
use loci_common::snapshot::{ElementSnapshot, MAX_ANCESTOR_DEPTH};
use std::collections::HashSet;

/// Attributes tried for attribute-anchored selectors, highest priority first.
pub const ATTR_PRIORITY: &[&str] = &[
    "data-testid",
    "data-test",
    "data-qa",
    "data-qa-id",
    "data-automation-id",
    "id",
    "name",
    "aria-label",
    "placeholder",
    "ng-model",
];

/// Ancestor classes used in a compact class-anchored selector.
const MAX_ANCESTOR_CLASSES: usize = 2;

/// Longest ancestor text usable as a `:has-text` anchor.
const MAX_ANCHOR_TEXT_CHARS: usize = 80;

/// Ancestor text quoted in candidate descriptions.
const DESCRIPTION_TEXT_CHARS: usize = 30;

/// Escape a value for a double-quoted attribute selector.
pub fn escape_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Escape quotes only, for text and accessible-name matchers.
fn escape_quotes(value: &str) -> String {
    value.replace('"', "\\\"")
}

fn attribute_selectors(el: &ElementSnapshot) -> Vec<CandidateSelector> {
    ATTR_PRIORITY
        .iter()
        .filter_map(|attr| el.attr(attr).map(|value| (*attr, value)))
        .map(|(attr, value)| {
            if attr == "id" {
                CandidateSelector::new(
                    format!("css=#{}", escape_value(value)),
                    SelectorStrategy::Css,
                    "id attribute",
                )
            } else {
                CandidateSelector::new(
                    format!("css={}[{}=\"{}\"]", el.tag, attr, escape_value(value)),
                    SelectorStrategy::Css,
                    format!("{} attribute", attr),
                )
            }
        })
        .collect()
}

fn ancestor_selectors(el: &ElementSnapshot) -> Vec<CandidateSelector> {
    let leaf = match el.input_type.as_deref() {
        Some(t) if !t.is_empty() => format!("{}[type=\"{}\"]", el.tag, escape_value(t)),
        _ => el.tag.clone(),
    };

    let mut selectors = Vec::new();
    let mut seen_texts = HashSet::new();

    for anc in el.ancestors.iter().take(MAX_ANCESTOR_DEPTH) {
        if let Some(first) = anc.classes.first() {
            let compact: String = std::iter::once(anc.tag.clone())
                .chain(
                    anc.classes
                        .iter()
                        .take(MAX_ANCESTOR_CLASSES)
                        .map(|c| format!(".{}", c)),
                )
                .collect();
            selectors.push(CandidateSelector::new(
                format!("css={} {}", compact, leaf),
                SelectorStrategy::Css,
                format!("ancestor class {}", first),
            ));
        }

        let text = anc.text.as_str();
        if !text.is_empty()
            && !text.contains('\n')
            && text.chars().count() <= MAX_ANCHOR_TEXT_CHARS
            && seen_texts.insert(text.to_lowercase())
        {
            let excerpt: String = text.chars().take(DESCRIPTION_TEXT_CHARS).collect();
            selectors.push(CandidateSelector::new(
                format!(
                    "css={}:has-text(\"{}\") >> css={}",
                    anc.tag,
                    escape_quotes(text),
                    leaf
                ),
                SelectorStrategy::Css,
                format!("ancestor text contains '{}'", excerpt),
            ));
        }
    }
    selectors
}

fn role_selectors(el: &ElementSnapshot) -> Vec<CandidateSelector> {
    let mut selectors = Vec::new();
    let inner = el.inner_text.as_str();
    if inner.is_empty() {
        return selectors;
    }

    if el.tag == "button" {
        selectors.push(CandidateSelector::new(
            format!("role=button[name=\"{}\"]", escape_quotes(inner)),
            SelectorStrategy::Role,
            "button accessible name",
        ));
        selectors.push(CandidateSelector::new(
            format!("text={}", inner),
            SelectorStrategy::Text,
            "text matcher",
        ));
    }
    if let Some(role) = el.role.as_deref().filter(|r| !r.is_empty()) {
        selectors.push(CandidateSelector::new(
            format!("role={}[name=\"{}\"]", role, escape_quotes(inner)),
            SelectorStrategy::Role,
            "ARIA role + name",
        ));
    }
    selectors
}

/// Ordered, de-duplicated selector candidates for an element.
///
/// An expression already emitted by an earlier strategy is dropped.
pub fn build_candidates(el: &ElementSnapshot) -> Vec<CandidateSelector> {
    let mut seen = HashSet::new();
    attribute_selectors(el)
        .into_iter()
        .chain(ancestor_selectors(el))
        .chain(role_selectors(el))
        .filter(|c| seen.insert(c.selector.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selectors(candidates: &[CandidateSelector]) -> Vec<&str> {
        candidates.iter().map(|c| c.selector.as_str()).collect()
    }

    #[test]
    fn attributes_follow_priority_order() {
        let el = ElementSnapshot::new("input")
            .with_attr("placeholder", "Email")
            .with_attr("name", "email")
            .with_attr("id", "login-email")
            .with_attr("data-qa", "email-field");
        let candidates = build_candidates(&el);
        assert_eq!(
            selectors(&candidates),
            vec![
                "css=input[data-qa=\"email-field\"]",
                "css=#login-email",
                "css=input[name=\"email\"]",
                "css=input[placeholder=\"Email\"]",
            ]
        );
        assert_eq!(candidates[1].description, "id attribute");
        assert_eq!(candidates[2].description, "name attribute");
    }

    #[test]
    fn attribute_values_are_escaped() {
        let el = ElementSnapshot::new("input").with_attr("aria-label", r#"Say "hi" \ bye"#);
        assert_eq!(
            selectors(&build_candidates(&el)),
            vec![r#"css=input[aria-label="Say \"hi\" \\ bye"]"#]
        );
    }

    #[test]
    fn ancestor_class_selector_uses_two_classes_and_type() {
        let el = ElementSnapshot::new("input")
            .with_type("password")
            .with_ancestor("div", &["field", "wide", "dark"], "");
        let candidates = build_candidates(&el);
        assert_eq!(
            selectors(&candidates),
            vec!["css=div.field.wide input[type=\"password\"]"]
        );
        assert_eq!(candidates[0].description, "ancestor class field");
    }

    #[test]
    fn ancestor_text_is_deduplicated_case_insensitively() {
        let el = ElementSnapshot::new("input")
            .with_ancestor("label", &[], "Email")
            .with_ancestor("div", &[], "EMAIL")
            .with_ancestor("form", &[], "Email\nPassword")
            .with_ancestor("section", &[], "x".repeat(81));
        let candidates = build_candidates(&el);
        assert_eq!(
            selectors(&candidates),
            vec![r#"css=label:has-text("Email") >> css=input"#]
        );
        assert_eq!(candidates[0].description, "ancestor text contains 'Email'");
    }

    #[test]
    fn ancestor_text_description_is_truncated() {
        let text = "Enter the email address you registered with";
        let el = ElementSnapshot::new("input").with_ancestor("p", &[], text);
        let candidates = build_candidates(&el);
        assert_eq!(
            candidates[0].description,
            "ancestor text contains 'Enter the email address you re'"
        );
    }

    #[test]
    fn button_text_yields_role_and_text_only() {
        let el = ElementSnapshot::new("button").with_text("Sign In");
        let candidates = build_candidates(&el);
        assert_eq!(
            selectors(&candidates),
            vec![r#"role=button[name="Sign In"]"#, "text=Sign In"]
        );
        assert!(
            candidates
                .iter()
                .all(|c| c.strategy != SelectorStrategy::Css)
        );
    }

    #[test]
    fn explicit_role_adds_role_name_selector() {
        let el = ElementSnapshot::new("input")
            .with_attr("role", "switch")
            .with_text("Dark \"mode\"");
        assert_eq!(
            selectors(&build_candidates(&el)),
            vec![r#"role=switch[name="Dark \"mode\""]"#]
        );
    }

    #[test]
    fn duplicate_expressions_keep_first_strategy() {
        // role="button" on a <button> produces the same role expression twice
        let el = ElementSnapshot::new("button")
            .with_attr("role", "button")
            .with_text("Go");
        let candidates = build_candidates(&el);
        assert_eq!(
            selectors(&candidates),
            vec![r#"role=button[name="Go"]"#, "text=Go"]
        );
        assert_eq!(candidates[0].description, "button accessible name");
    }

    #[test]
    fn id_equal_to_test_id_never_duplicates_expressions() {
        let el = ElementSnapshot::new("input")
            .with_attr("id", "email")
            .with_attr("data-testid", "email");
        let candidates = build_candidates(&el);
        let unique: HashSet<_> = candidates.iter().map(|c| &c.selector).collect();
        assert_eq!(unique.len(), candidates.len());
        assert_eq!(
            selectors(&candidates),
            vec![r#"css=input[data-testid="email"]"#, "css=#email"]
        );
    }

    #[test]
    fn bare_element_has_no_candidates() {
        assert!(build_candidates(&ElementSnapshot::new("select")).is_empty());
    }
}
