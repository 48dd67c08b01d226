//! Path alias handling (tsconfig `compilerOptions.paths`).
//!
//! `"@/*": ["js/*"]` maps `@/store` to `<base>/js/store`. Patterns hold at
//! most one `*`. An exact pattern beats any wildcard; among wildcards the
//! longest prefix wins.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use path_clean::PathClean;
use serde::Deserialize;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
struct AliasEntry {
    prefix: String,
    /// `None` for exact patterns.
    suffix: Option<String>,
    targets: Vec<String>,
}

impl AliasEntry {
    fn parse(pattern: &str, targets: Vec<String>) -> Self {
        match pattern.split_once('*') {
            Some((prefix, suffix)) => AliasEntry {
                prefix: prefix.to_string(),
                suffix: Some(suffix.to_string()),
                targets,
            },
            None => AliasEntry {
                prefix: pattern.to_string(),
                suffix: None,
                targets,
            },
        }
    }

    /// The text captured by `*`, or `""` for an exact match.
    fn capture<'a>(&self, request: &'a str) -> Option<&'a str> {
        match &self.suffix {
            None => (request == self.prefix).then_some(""),
            Some(suffix) => {
                let rest = request.strip_prefix(self.prefix.as_str())?;
                let captured = rest.strip_suffix(suffix.as_str())?;
                Some(captured)
            }
        }
    }
}

/// Compiled alias table.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    base: PathBuf,
    entries: Vec<AliasEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TsConfig {
    #[serde(default)]
    compiler_options: CompilerOptions,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompilerOptions {
    base_url: Option<String>,
    #[serde(default)]
    paths: IndexMap<String, Vec<String>>,
}

impl AliasTable {
    pub fn new(base: impl Into<PathBuf>, paths: impl IntoIterator<Item = (String, Vec<String>)>) -> Self {
        Self {
            base: base.into(),
            entries: paths
                .into_iter()
                .map(|(pattern, targets)| AliasEntry::parse(&pattern, targets))
                .collect(),
        }
    }

    /// Load from a tsconfig-style manifest.
    ///
    /// `base_override` wins over the manifest's own `baseUrl`, which is
    /// relative to the manifest's directory.
    pub fn from_manifest(path: &Path, source: &str, base_override: Option<&Path>) -> Result<Self> {
        let cleaned = strip_json_comments(source);
        let tsconfig: TsConfig = serde_json::from_str(&cleaned).map_err(|e| {
            Error::InvalidConfig(format!(
                "cannot parse path alias manifest {}: {}",
                path.display(),
                e
            ))
        })?;

        let manifest_dir = path.parent().unwrap_or(Path::new(""));
        let base = match (base_override, &tsconfig.compiler_options.base_url) {
            (Some(base), _) => base.to_path_buf(),
            (None, Some(base_url)) => manifest_dir.join(base_url).clean(),
            (None, None) => manifest_dir.to_path_buf(),
        };

        Ok(Self::new(base, tsconfig.compiler_options.paths))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Candidate paths for `request`, in target order. Empty when no alias matches.
    pub fn candidates(&self, request: &str) -> Vec<PathBuf> {
        let Some((entry, captured)) = self.best_match(request) else {
            return Vec::new();
        };
        entry
            .targets
            .iter()
            .map(|target| self.base.join(target.replacen('*', captured, 1)).clean())
            .collect()
    }

    fn best_match<'a, 'r>(&'a self, request: &'r str) -> Option<(&'a AliasEntry, &'r str)> {
        if let Some(entry) = self
            .entries
            .iter()
            .find(|e| e.suffix.is_none() && e.prefix == request)
        {
            return Some((entry, ""));
        }
        self.entries
            .iter()
            .filter(|e| e.suffix.is_some())
            .filter_map(|e| e.capture(request).map(|c| (e, c)))
            .max_by_key(|(e, _)| e.prefix.len())
    }
}

/// Removes `//` and `/* */` comments and trailing commas outside strings.
pub fn strip_json_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            ',' => {
                // drop trailing commas: next significant char closes the container
                let rest: String = chars.clone().collect();
                let next_significant = strip_leading_trivia(&rest);
                if !(next_significant.starts_with('}') || next_significant.starts_with(']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }

    out
}

fn strip_leading_trivia(mut s: &str) -> &str {
    loop {
        let trimmed = s.trim_start();
        if let Some(rest) = trimmed.strip_prefix("//") {
            s = rest.split_once('\n').map(|(_, r)| r).unwrap_or("");
        } else if let Some(rest) = trimmed.strip_prefix("/*") {
            s = rest.split_once("*/").map(|(_, r)| r).unwrap_or("");
        } else {
            return trimmed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> AliasTable {
        AliasTable::new(
            "/app/client",
            vec![
                ("@/*".to_string(), vec!["js/*".to_string()]),
                ("@/components/*".to_string(), vec!["components/*".to_string()]),
                ("config".to_string(), vec!["js/config.ts".to_string()]),
            ],
        )
    }

    #[test]
    fn wildcard_capture_is_substituted() {
        assert_eq!(
            table().candidates("@/store"),
            vec![PathBuf::from("/app/client/js/store")]
        );
    }

    #[test]
    fn longest_prefix_wins() {
        assert_eq!(
            table().candidates("@/components/Chat"),
            vec![PathBuf::from("/app/client/components/Chat")]
        );
    }

    #[test]
    fn exact_pattern_matches_whole_request_only() {
        assert_eq!(
            table().candidates("config"),
            vec![PathBuf::from("/app/client/js/config.ts")]
        );
        assert!(table().candidates("config/extra").is_empty());
    }

    #[test]
    fn unmatched_request_has_no_candidates() {
        assert!(table().candidates("vue").is_empty());
    }

    #[test]
    fn manifest_with_comments_and_trailing_commas() {
        let source = r#"{
            // editor hints
            "compilerOptions": {
                "baseUrl": ".", /* relative to this file */
                "paths": { "@/*": ["js/*",], },
            },
            "include": ["**/*.ts", "http://not-a-comment"],
        }"#;
        let table =
            AliasTable::from_manifest(Path::new("/app/client/tsconfig.json"), source, None)
                .unwrap();
        assert_eq!(table.base(), Path::new("/app/client"));
        assert_eq!(
            table.candidates("@/x"),
            vec![PathBuf::from("/app/client/js/x")]
        );
    }

    #[test]
    fn base_override_wins() {
        let source = r#"{"compilerOptions": {"baseUrl": "src", "paths": {"~/*": ["*"]}}}"#;
        let table = AliasTable::from_manifest(
            Path::new("/app/client/tsconfig.json"),
            source,
            Some(Path::new("/app/client")),
        )
        .unwrap();
        assert_eq!(table.candidates("~/a"), vec![PathBuf::from("/app/client/a")]);
    }

    #[test]
    fn invalid_manifest_is_a_configuration_error() {
        let err = AliasTable::from_manifest(Path::new("/t/tsconfig.json"), "{ nope", None)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
