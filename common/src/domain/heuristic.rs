//! Best-effort recovery of file paths from unstructured text.
//!
//! When a user pastes source code or a plain listing instead of uploading
//! an archive, this scan guesses which files exist. The output carries no
//! completeness or correctness guarantee; an empty set is a valid result
//! and the scan itself never fails.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::paths;

// Substrings ending in a recognized source/markup/style/data/image/font
// extension count as path candidates.
static PATH_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"[A-Za-z0-9_@][A-Za-z0-9_\-./\\]*\.(?:tsx|ts|jsx|js|mjs|cjs|json|css|scss|less|html|htm|md|svg|png|jpg|jpeg|gif|ico|webp|woff|woff2|ttf|otf|yml|yaml|toml)\b",
    )
    .unwrap()
});

static IMPORT_SPECIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?:import|from)\s+["']([^"'\n]+)["']"#).unwrap());

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub wrapper_dirs: Vec<String>,
    /// Extension assumed for extensionless import specifiers.
    pub default_import_extension: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            wrapper_dirs: ["project", "app", "main", "source"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            default_import_extension: ".tsx".to_string(),
        }
    }
}

/// Scans arbitrary text for things that look like file paths.
pub fn scan_for_paths(text: &str, options: &ScanOptions) -> BTreeSet<String> {
    let mut found = BTreeSet::new();

    for line in text.lines() {
        for token in PATH_TOKEN.find_iter(line) {
            insert_candidate(&mut found, token.as_str(), options);
        }

        for capture in IMPORT_SPECIFIER.captures_iter(line) {
            if let Some(candidate) = import_candidate(&capture[1], options) {
                insert_candidate(&mut found, &candidate, options);
            }
        }
    }

    for (marker, seeded) in [
        ("\"dependencies\"", "package.json"),
        ("\"compilerOptions\"", "tsconfig.json"),
        ("<!DOCTYPE html", "index.html"),
    ] {
        if text.contains(marker) {
            found.insert(seeded.to_string());
        }
    }

    found
}

fn insert_candidate(found: &mut BTreeSet<String>, raw: &str, options: &ScanOptions) {
    if let Some(cleaned) = paths::clean_path(raw, &options.wrapper_dirs) {
        found.insert(cleaned);
    }
}

fn import_candidate(specifier: &str, options: &ScanOptions) -> Option<String> {
    // "@/" is the conventional src alias in Vite/Next projects.
    let specifier = if let Some(rest) = specifier.strip_prefix("@/") {
        format!("src/{rest}")
    } else {
        specifier.trim_start_matches("./").to_string()
    };

    // Bare specifiers name packages, not files.
    if !specifier.contains('/') && !specifier.contains('.') {
        return None;
    }

    let has_extension = specifier
        .rsplit('/')
        .next()
        .is_some_and(|last| last.contains('.'));
    if has_extension {
        Some(specifier)
    } else {
        Some(format!("{specifier}{}", options.default_import_extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_extension_suffixed_tokens() {
        let text = "src/components/Header.tsx\nsome prose\nstyles/globals.css";
        let found = scan_for_paths(text, &ScanOptions::default());
        assert!(found.contains("src/components/Header.tsx"));
        assert!(found.contains("styles/globals.css"));
        assert!(!found.contains("some prose"));
    }

    #[test]
    fn resolves_import_specifiers_with_the_default_extension() {
        let text = r#"
            import Header from "./components/Header"
            import { Button } from "@/components/ui/button"
            import React from "react"
        "#;
        let found = scan_for_paths(text, &ScanOptions::default());
        assert!(found.contains("components/Header.tsx"));
        assert!(found.contains("src/components/ui/button.tsx"));
        assert!(!found.iter().any(|p| p.contains("react")));
    }

    #[test]
    fn default_extension_is_configurable() {
        let options = ScanOptions {
            default_import_extension: ".vue".to_string(),
            ..ScanOptions::default()
        };
        let found = scan_for_paths(r#"import Nav from "./Nav/index""#, &options);
        assert!(found.contains("Nav/index.vue"));
    }

    #[test]
    fn seeds_well_known_files_from_content_markers() {
        let text = r#"{ "name": "demo", "dependencies": { "react": "^18" } }"#;
        let found = scan_for_paths(text, &ScanOptions::default());
        assert!(found.contains("package.json"));

        let html = "<!DOCTYPE html><html></html>";
        assert!(scan_for_paths(html, &ScanOptions::default()).contains("index.html"));
    }

    #[test]
    fn candidates_are_normalized_and_deduplicated() {
        let text = "src\\App.tsx\n./src/App.tsx\nsrc//App.tsx";
        let found = scan_for_paths(text, &ScanOptions::default());
        assert_eq!(found.len(), 1);
        assert!(found.contains("src/App.tsx"));
    }

    #[test]
    fn never_fails_on_hostile_input() {
        let options = ScanOptions::default();
        assert!(scan_for_paths("", &options).is_empty());
        assert!(scan_for_paths("\u{0}\u{fffd}\u{7f}", &options).is_empty());
        // Unbalanced quotes and stray import keywords.
        let _ = scan_for_paths("import \" from ' unterminated", &options);
        let garbage: String = (0u8..=255).map(|b| b as char).collect();
        let _ = scan_for_paths(&garbage, &options);
    }
}
