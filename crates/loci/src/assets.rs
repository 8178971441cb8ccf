//! Bundle and Playwright helper output.

use loci_engine::bundle::ResolutionBundle;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// JSON string literal, also valid in TypeScript.
fn literal(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

pub fn write_json_bundle(bundle: &ResolutionBundle, path: &Path) -> io::Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(bundle)?;
    fs::write(path, json)
}

/// Render the TypeScript helper exposing every entry that has a primary selector.
pub fn render_locators_ts(bundle: &ResolutionBundle) -> String {
    let mut keys = Vec::new();
    let mut entries = Vec::new();

    for (key, entry) in bundle.resolution.iter() {
        let Some(primary) = &entry.primary else {
            continue;
        };
        let fallbacks: Vec<String> = entry.fallbacks.iter().map(|c| literal(&c.selector)).collect();
        keys.push(literal(key));
        entries.push(format!(
            "  {}: {{\n    selector: {},\n    confidence: {},\n    fallbacks: [{}]\n  }}",
            literal(key),
            literal(&primary.selector),
            entry.confidence,
            fallbacks.join(", ")
        ));
    }

    let union = if keys.is_empty() {
        "never".to_string()
    } else {
        keys.join(" | ")
    };

    let mut ts = String::new();
    ts.push_str("// Auto-generated by loci. Do not edit manually.\n");
    ts.push_str("import type { Page } from '@playwright/test';\n\n");
    let _ = writeln!(ts, "export type SemanticKey = {};\n", union);
    ts.push_str("type LocatorEntry = {\n  selector: string;\n  confidence: number;\n  fallbacks: string[];\n};\n\n");
    ts.push_str("export const locatorBundle: Record<SemanticKey, LocatorEntry> = {\n");
    ts.push_str(&entries.join(",\n"));
    ts.push_str("\n};\n\n");
    ts.push_str(
        "export function getLocator(page: Page, key: SemanticKey) {\n  \
         const entry = locatorBundle[key];\n  \
         if (!entry) {\n    throw new Error('Unknown semantic key: ' + key);\n  }\n  \
         return page.locator(entry.selector);\n}\n",
    );
    ts
}

/// Render a sample spec asserting every generated locator is visible on `url`.
pub fn render_sample_spec(url: &str) -> String {
    format!(
        "// Auto-generated sample Playwright test using the loci bundle.\n\
         import {{ test, expect }} from '@playwright/test';\n\
         import {{ getLocator, locatorBundle, SemanticKey }} from '../locators.generated';\n\n\
         test('generated selectors resolve', async ({{ page }}) => {{\n  \
         await page.goto({});\n  \
         for (const key of Object.keys(locatorBundle) as SemanticKey[]) {{\n    \
         await expect(getLocator(page, key)).toBeVisible();\n  \
         }}\n\
         }});\n",
        literal(url)
    )
}

pub fn write_playwright_assets(
    bundle: &ResolutionBundle,
    ts_path: &Path,
    spec_path: &Path,
    url: &str,
) -> io::Result<()> {
    ensure_parent(ts_path)?;
    ensure_parent(spec_path)?;
    fs::write(ts_path, render_locators_ts(bundle))?;
    fs::write(spec_path, render_sample_spec(url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use loci_engine::bundle::{
        CandidateSelector, ResolutionEntry, ResolutionMap, ResolutionStatus, SelectorStrategy,
    };
    use loci_engine::target::SemanticTarget;

    fn unique(selector: &str, strategy: SelectorStrategy) -> CandidateSelector {
        let mut c = CandidateSelector::new(selector, strategy, "test");
        c.record_count(1);
        c
    }

    fn sample_bundle() -> ResolutionBundle {
        let primary = unique(r#"role=button[name="Sign In"]"#, SelectorStrategy::Role);
        let fallback = unique("text=Sign In", SelectorStrategy::Text);
        let mut resolution = ResolutionMap::new();
        resolution.insert(
            "login.submit",
            ResolutionEntry {
                status: ResolutionStatus::Resolved,
                message: None,
                target: None,
                confidence: 0.4,
                heuristic: None,
                embedding_similarity: None,
                node: None,
                primary: Some(primary.clone()),
                candidates: vec![primary, fallback.clone()],
                fallbacks: vec![fallback],
            },
        );
        resolution.insert(
            "login.password",
            ResolutionEntry::unmatched(&SemanticTarget::new("login.password")),
        );
        ResolutionBundle {
            url: "https://example.com/login".into(),
            semantic_targets: vec!["login.submit".into(), "login.password".into()],
            resolution,
        }
    }

    #[test]
    fn ts_helper_lists_only_entries_with_primary() {
        let ts = render_locators_ts(&sample_bundle());
        assert!(ts.contains("export type SemanticKey = \"login.submit\";"));
        assert!(ts.contains(r#"selector: "role=button[name=\"Sign In\"]","#));
        assert!(ts.contains("confidence: 0.4,"));
        assert!(ts.contains(r#"fallbacks: ["text=Sign In"]"#));
        assert!(!ts.contains("login.password"));
        assert!(ts.contains("export function getLocator(page: Page, key: SemanticKey)"));
    }

    #[test]
    fn empty_bundle_uses_never_key() {
        let bundle = ResolutionBundle {
            url: "https://example.com".into(),
            semantic_targets: vec![],
            resolution: ResolutionMap::new(),
        };
        assert!(render_locators_ts(&bundle).contains("export type SemanticKey = never;"));
    }

    #[test]
    fn sample_spec_navigates_to_url() {
        let spec = render_sample_spec("https://example.com/it's");
        assert!(spec.contains(r#"await page.goto("https://example.com/it's");"#));
        assert!(spec.contains("toBeVisible()"));
    }

    #[test]
    fn writes_files_creating_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = sample_bundle();

        let out = dir.path().join("artifacts").join("bundle.json");
        write_json_bundle(&bundle, &out).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(written["url"], "https://example.com/login");
        assert_eq!(written["resolution"]["login.submit"]["status"], "resolved");

        let ts = dir.path().join("playwright").join("locators.generated.ts");
        let spec = dir.path().join("playwright").join("tests").join("login.generated.spec.ts");
        write_playwright_assets(&bundle, &ts, &spec, &bundle.url).unwrap();
        assert!(fs::read_to_string(&ts).unwrap().contains("locatorBundle"));
        assert!(fs::read_to_string(&spec).unwrap().contains("getLocator"));
    }
}
