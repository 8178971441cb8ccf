//! The resolution bundle: the artifact handed to downstream tooling.

use crate::target::SemanticTarget;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Selector families emitted by the synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorStrategy {
    /// Structural/attribute CSS expression.
    Css,
    Role,
    Text,
}

/// One synthesized selector strategy and, once verified, its live match count.
///
/// Created unverified by the synthesizer, annotated exactly once by the
/// verifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSelector {
    pub selector: String,
    pub strategy: SelectorStrategy,
    pub description: String,
    pub count: Option<usize>,
    pub unique: Option<bool>,
    pub error: Option<String>,
}

impl CandidateSelector {
    pub fn new(
        selector: impl Into<String>,
        strategy: SelectorStrategy,
        description: impl Into<String>,
    ) -> Self {
        Self {
            selector: selector.into(),
            strategy,
            description: description.into(),
            count: None,
            unique: None,
            error: None,
        }
    }

    pub fn is_unique(&self) -> bool {
        self.unique == Some(true)
    }

    pub fn is_verified(&self) -> bool {
        self.unique.is_some()
    }

    pub fn record_count(&mut self, count: usize) {
        self.count = Some(count);
        self.unique = Some(count == 1);
        self.error = None;
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.count = None;
        self.unique = Some(false);
        self.error = Some(message.into());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    /// A unique primary selector exists.
    Resolved,
    /// Candidates exist but none matched exactly one element.
    NeedsReview,
    /// No element matched, or no candidates could be synthesized.
    Unresolved,
}

impl ResolutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionStatus::Resolved => "resolved",
            ResolutionStatus::NeedsReview => "needs_review",
            ResolutionStatus::Unresolved => "unresolved",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeuristicBreakdown {
    pub score: u32,
    pub max: u32,
    pub matched_hints: Vec<String>,
}

/// Compact view of the matched element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementSummary {
    pub tag: String,
    #[serde(rename = "type")]
    pub input_type: Option<String>,
    #[serde(serialize_with = "serialize_pairs")]
    pub attrs: Vec<(String, String)>,
    pub ancestor_texts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionEntry {
    pub status: ResolutionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<SemanticTarget>,
    pub confidence: f64,
    pub heuristic: Option<HeuristicBreakdown>,
    pub embedding_similarity: Option<f64>,
    pub node: Option<ElementSummary>,
    pub primary: Option<CandidateSelector>,
    pub candidates: Vec<CandidateSelector>,
    pub fallbacks: Vec<CandidateSelector>,
}

impl ResolutionEntry {
    /// Entry for a target that no captured element scored above zero against.
    pub fn unmatched(target: &SemanticTarget) -> Self {
        Self {
            status: ResolutionStatus::Unresolved,
            message: Some("No candidate matched semantic hints".to_string()),
            target: Some(target.clone()),
            confidence: 0.0,
            heuristic: None,
            embedding_similarity: None,
            node: None,
            primary: None,
            candidates: vec![],
            fallbacks: vec![],
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.status == ResolutionStatus::Resolved
    }
}

/// Per-key entries, serialized as a JSON object in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionMap(Vec<(String, ResolutionEntry)>);

impl ResolutionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry; an existing key keeps its position and is replaced.
    pub fn insert(&mut self, key: impl Into<String>, entry: ResolutionEntry) {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = entry,
            None => self.0.push((key, entry)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ResolutionEntry> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, e)| e)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolutionEntry)> {
        self.0.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for ResolutionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, entry) in &self.0 {
            map.serialize_entry(key, entry)?;
        }
        map.end()
    }
}

fn serialize_pairs<S: Serializer>(pairs: &[(String, String)], serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(pairs.len()))?;
    for (k, v) in pairs {
        map.serialize_entry(k, v)?;
    }
    map.end()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionBundle {
    pub url: String,
    pub semantic_targets: Vec<String>,
    pub resolution: ResolutionMap,
}

impl ResolutionBundle {
    pub fn resolved_count(&self) -> usize {
        self.resolution.iter().filter(|(_, e)| e.is_resolved()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifier_annotations_set_uniqueness() {
        let mut c = CandidateSelector::new("css=#a", SelectorStrategy::Css, "id attribute");
        assert!(!c.is_verified());
        c.record_count(1);
        assert!(c.is_unique());
        assert_eq!(c.count, Some(1));

        let mut d = CandidateSelector::new("css=[", SelectorStrategy::Css, "broken");
        d.record_error("Unexpected token");
        assert_eq!(d.unique, Some(false));
        assert_eq!(d.count, None);
        assert_eq!(d.error.as_deref(), Some("Unexpected token"));
    }

    #[test]
    fn resolution_map_serializes_in_insertion_order() {
        let target = SemanticTarget::new("zeta");
        let mut map = ResolutionMap::new();
        map.insert("zeta", ResolutionEntry::unmatched(&target));
        map.insert("alpha", ResolutionEntry::unmatched(&target));
        map.insert("zeta", ResolutionEntry::unmatched(&target));

        let json = serde_json::to_string(&map).unwrap();
        let zeta = json.find("\"zeta\"").unwrap();
        let alpha = json.find("\"alpha\"").unwrap();
        assert!(zeta < alpha);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn unmatched_entry_carries_message_and_target() {
        let target = SemanticTarget::new("login.submit").tag("button");
        let value = serde_json::to_value(ResolutionEntry::unmatched(&target)).unwrap();
        assert_eq!(value["status"], "unresolved");
        assert_eq!(value["message"], "No candidate matched semantic hints");
        assert_eq!(value["target"]["key"], "login.submit");
        assert!(value["primary"].is_null());
    }

    #[test]
    fn summary_attrs_serialize_as_object() {
        let summary = ElementSummary {
            tag: "input".into(),
            input_type: Some("email".into()),
            attrs: vec![("name".into(), "email".into()), ("id".into(), "e".into())],
            ancestor_texts: vec![],
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["attrs"]["name"], "email");
        assert_eq!(value["type"], "email");
    }
}
