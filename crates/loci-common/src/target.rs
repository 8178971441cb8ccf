use serde::{Deserialize, Serialize};

/// Declarative description of a page element that should stay addressable.
///
/// `required_hints` are hard gates: a candidate whose text blob lacks any of
/// them scores zero for this target no matter what else matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticTarget {
    #[serde(default)]
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub hints: Vec<String>,
    #[serde(default)]
    pub required_hints: Vec<String>,
}

impl SemanticTarget {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn types(mut self, types: &[&str]) -> Self {
        self.types = types.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn hints(mut self, hints: &[&str]) -> Self {
        self.hints = hints.iter().map(|h| h.to_string()).collect();
        self
    }

    pub fn required_hints(mut self, hints: &[&str]) -> Self {
        self.required_hints = hints.iter().map(|h| h.to_string()).collect();
        self
    }

    /// Declared tag, ignoring an empty string.
    pub fn expected_tag(&self) -> Option<&str> {
        self.tag.as_deref().filter(|t| !t.is_empty())
    }
}

/// Built-in login-form targets, in resolution order.
pub fn default_targets() -> Vec<SemanticTarget> {
    vec![
        SemanticTarget::new("login.username")
            .tag("input")
            .types(&["text", "email"])
            .hints(&["account name", "sign in", "username", "email"]),
        SemanticTarget::new("login.password")
            .tag("input")
            .types(&["password"])
            .hints(&["password", "sign in"])
            .required_hints(&["password"]),
        SemanticTarget::new("login.submit")
            .tag("button")
            .types(&["submit"])
            .hints(&["sign in", "log in", "login"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_login_form() {
        let keys: Vec<_> = default_targets().into_iter().map(|t| t.key).collect();
        assert_eq!(keys, vec!["login.username", "login.password", "login.submit"]);
    }

    #[test]
    fn empty_tag_counts_as_undeclared() {
        let target = SemanticTarget::new("x").tag("");
        assert_eq!(target.expected_tag(), None);
    }

    #[test]
    fn yaml_shape_deserializes_with_defaults() {
        let target: SemanticTarget = serde_json::from_str(r#"{"hints": ["search"]}"#).unwrap();
        assert!(target.key.is_empty());
        assert!(target.tag.is_none());
        assert!(target.required_hints.is_empty());
        assert_eq!(target.hints, vec!["search"]);
    }
}
