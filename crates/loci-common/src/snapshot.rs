//! Captured element metadata.
//!
//! An `ElementSnapshot` is produced once per resolution pass by the page
//! scanner and is read-only afterwards. Derived views (text blob, description)
//! live in the engine, not here.

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Maximum number of ancestor records the scanner reports per element.
pub const MAX_ANCESTOR_DEPTH: usize = 4;

/// Maximum number of adjacent sibling snippets per element.
pub const MAX_SIBLING_TEXTS: usize = 2;

/// One interactive DOM node as seen by the scanner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSnapshot {
    pub tag: String,
    #[serde(rename = "type", default)]
    pub input_type: Option<String>,
    #[serde(default)]
    pub attrs: Attributes,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub aria_label: Option<String>,
    #[serde(default)]
    pub aria_describedby: Option<String>,
    #[serde(default)]
    pub inner_text: String,
    #[serde(default)]
    pub text_content: String,
    /// Nearest ancestor first, at most `MAX_ANCESTOR_DEPTH` entries.
    #[serde(default)]
    pub ancestors: Vec<AncestorContext>,
    #[serde(default)]
    pub sibling_texts: Vec<SiblingText>,
    #[serde(default)]
    pub form: Option<FormContext>,
    /// 1-based position among same-tag siblings.
    #[serde(default = "default_position")]
    pub nth_of_type: u32,
    #[serde(default = "default_position")]
    pub same_tag_count: u32,
}

fn default_position() -> u32 {
    1
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AncestorContext {
    pub depth: u32,
    #[serde(default)]
    pub text: String,
    pub tag: String,
    #[serde(default)]
    pub classes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiblingPosition {
    Prev,
    Next,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiblingText {
    pub position: SiblingPosition,
    pub text: String,
}

/// Metadata of the `<form>` owning the element, if any.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormContext {
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
}

impl ElementSnapshot {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            nth_of_type: 1,
            same_tag_count: 1,
            ..Default::default()
        }
    }

    pub fn with_type(mut self, input_type: impl Into<String>) -> Self {
        let input_type = input_type.into();
        self.attrs.insert("type", input_type.clone());
        self.input_type = Some(input_type);
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match name.as_str() {
            "role" => self.role = Some(value.clone()),
            "aria-label" => self.aria_label = Some(value.clone()),
            "aria-describedby" => self.aria_describedby = Some(value.clone()),
            _ => {}
        }
        self.attrs.insert(name, value);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    /// Sets both `innerText` and `textContent`, as the scanner reports for
    /// leaf elements.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.text_content = text.clone();
        self.inner_text = text;
        self
    }

    pub fn with_ancestor(
        mut self,
        tag: impl Into<String>,
        classes: &[&str],
        text: impl Into<String>,
    ) -> Self {
        if self.ancestors.len() < MAX_ANCESTOR_DEPTH {
            self.ancestors.push(AncestorContext {
                depth: self.ancestors.len() as u32,
                text: text.into(),
                tag: tag.into(),
                classes: classes.iter().map(|c| c.to_string()).collect(),
            });
        }
        self
    }

    pub fn with_sibling(mut self, position: SiblingPosition, text: impl Into<String>) -> Self {
        if self.sibling_texts.len() < MAX_SIBLING_TEXTS {
            self.sibling_texts.push(SiblingText {
                position,
                text: text.into(),
            });
        }
        self
    }

    pub fn with_form(mut self, form: FormContext) -> Self {
        self.form = Some(form);
        self
    }

    /// Attribute value, treating empty strings as absent.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).filter(|v| !v.is_empty())
    }
}

/// Element attributes in document order.
///
/// Order matters: feature extraction concatenates values, so a stable order
/// keeps the text blob deterministic. Deserializes from either an ordered list
/// of `[name, value]` pairs (scanner wire format) or a JSON object; `null`
/// values are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Insert or replace, keeping the original position on replace.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Attributes::new();
        for (k, v) in iter {
            attrs.insert(k, v);
        }
        attrs
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for pair in &self.0 {
            seq.serialize_element(pair)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AttributesVisitor)
    }
}

struct AttributesVisitor;

impl<'de> Visitor<'de> for AttributesVisitor {
    type Value = Attributes;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a list of [name, value] pairs or an attribute map")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Attributes, A::Error> {
        let mut attrs = Attributes::new();
        while let Some((name, value)) = seq.next_element::<(String, Option<String>)>()? {
            if let Some(value) = value {
                attrs.insert(name, value);
            }
        }
        Ok(attrs)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Attributes, A::Error> {
        let mut attrs = Attributes::new();
        while let Some((name, value)) = map.next_entry::<String, Option<String>>()? {
            if let Some(value) = value {
                attrs.insert(name, value);
            }
        }
        Ok(attrs)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Attributes, E> {
        Ok(Attributes::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_keep_wire_order_and_drop_nulls() {
        let attrs: Attributes = serde_json::from_str(
            r#"[["type", "text"], ["name", "user"], ["disabled", null], ["id", "u1"]]"#,
        )
        .unwrap();
        let names: Vec<_> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["type", "name", "id"]);
    }

    #[test]
    fn attributes_accept_object_form() {
        let attrs: Attributes =
            serde_json::from_str(r#"{"placeholder": "Email", "id": null, "class": "x"}"#).unwrap();
        assert_eq!(attrs.get("placeholder"), Some("Email"));
        assert_eq!(attrs.get("id"), None);
        assert_eq!(attrs.len(), 2);
    }

    #[test]
    fn empty_attribute_is_treated_as_absent() {
        let el = ElementSnapshot::new("input").with_attr("name", "");
        assert_eq!(el.attrs.get("name"), Some(""));
        assert_eq!(el.attr("name"), None);
    }

    #[test]
    fn snapshot_defaults_structural_counters() {
        let el: ElementSnapshot = serde_json::from_str(r#"{"tag": "button"}"#).unwrap();
        assert_eq!(el.nth_of_type, 1);
        assert_eq!(el.same_tag_count, 1);
        assert!(el.input_type.is_none());
    }

    #[test]
    fn builder_caps_ancestor_depth() {
        let mut el = ElementSnapshot::new("input");
        for i in 0..6 {
            el = el.with_ancestor("div", &[], format!("level {}", i));
        }
        assert_eq!(el.ancestors.len(), MAX_ANCESTOR_DEPTH);
        assert_eq!(el.ancestors[3].depth, 3);
    }
}
