use crate::similarity::{DEFAULT_CACHE_CAPACITY, DEFAULT_MODEL};
use loci_common::target::{SemanticTarget, default_targets};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LociConfig {
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub targets: TargetsConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl LociConfig {
    /// Built-in targets with configured entries merged over them.
    pub fn semantic_targets(&self) -> Vec<SemanticTarget> {
        self.targets.merged_over(default_targets())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    #[serde(default = "default_embedding_enabled")]
    pub enabled: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            cache_capacity: default_cache_capacity(),
            enabled: default_embedding_enabled(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_embedding_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default)]
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_bundle_path")]
    pub bundle_path: PathBuf,
    #[serde(default = "default_playwright_ts")]
    pub playwright_ts: PathBuf,
    #[serde(default = "default_playwright_spec")]
    pub playwright_spec: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            bundle_path: default_bundle_path(),
            playwright_ts: default_playwright_ts(),
            playwright_spec: default_playwright_spec(),
        }
    }
}

fn default_bundle_path() -> PathBuf {
    PathBuf::from("artifacts/locator-bundle.json")
}

fn default_playwright_ts() -> PathBuf {
    PathBuf::from("playwright/locators.generated.ts")
}

fn default_playwright_spec() -> PathBuf {
    PathBuf::from("playwright/tests/login.generated.spec.ts")
}

/// Configured targets keyed by semantic key, in file order.
///
/// A target without an explicit `key` takes its map key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetsConfig(Vec<SemanticTarget>);

impl TargetsConfig {
    pub fn new(targets: Vec<SemanticTarget>) -> Self {
        Self(targets)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SemanticTarget> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overlay onto `base`: same keys are replaced in place, new keys appended.
    pub fn merged_over(&self, mut base: Vec<SemanticTarget>) -> Vec<SemanticTarget> {
        for target in &self.0 {
            match base.iter_mut().find(|t| t.key == target.key) {
                Some(slot) => *slot = target.clone(),
                None => base.push(target.clone()),
            }
        }
        base
    }
}

impl Serialize for TargetsConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for target in &self.0 {
            map.serialize_entry(&target.key, target)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TargetsConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TargetsVisitor;

        impl<'de> Visitor<'de> for TargetsVisitor {
            type Value = TargetsConfig;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of semantic key to target definition")
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(TargetsConfig::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut targets: Vec<SemanticTarget> = Vec::new();
                while let Some((key, target)) =
                    access.next_entry::<String, Option<SemanticTarget>>()?
                {
                    let mut target = target.unwrap_or_default();
                    if target.key.is_empty() {
                        target.key = key;
                    }
                    match targets.iter_mut().find(|t| t.key == target.key) {
                        Some(slot) => *slot = target,
                        None => targets.push(target),
                    }
                }
                Ok(TargetsConfig(targets))
            }
        }

        deserializer.deserialize_any(TargetsVisitor)
    }
}
