//! Top-level configuration structure for kite.
//!
//! Defaults reproduce the reference client layout (see [`crate::defaults`]).
//! For file discovery and layered loading see the `discovery` and `loading`
//! modules.

use std::path::{Component, Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KiteConfig {
    /// Project root. Relative roots are resolved against the config file's directory.
    pub root: PathBuf,

    /// Output directory, relative to `root`.
    pub output_dir: PathBuf,

    pub entry: EntryConfig,

    pub resolve: ResolveConfig,

    /// Loader dispatch rules, evaluated in declaration order.
    pub rules: Vec<RuleConfig>,

    pub split: SplitConfig,

    pub styles: StylesConfig,

    /// Static asset copy tasks.
    pub copy: Vec<CopyConfig>,

    pub substitutions: Vec<SubstitutionConfig>,

    /// Bare specifiers mapped to a global expression instead of being bundled.
    pub externals: IndexMap<String, String>,

    /// Version identifier used for cache busting. Falls back to a hash of
    /// the `version` field in `package.json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Force source maps on or off. Unset means "development builds only".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_maps: Option<bool>,

    /// Write `manifest.json` next to the outputs.
    pub manifest: bool,

    /// Remove the output directory before writing.
    pub clean: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryConfig {
    /// Logical entry name, substituted for `[name]` in the entry chunk template.
    pub name: String,
    /// Source files seeding the module graph, relative to the root.
    pub sources: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Extensions tried, in order, when a request has no exact file match.
    pub extensions: Vec<String>,
    /// tsconfig-style manifest providing `compilerOptions.paths`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias_manifest: Option<PathBuf>,
    /// Base directory for bare requests and alias targets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<PathBuf>,
    /// Third-party module directories searched for bare requests.
    pub modules: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Regular expression matched against the module path.
    pub test: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<PathBuf>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<PathBuf>,

    /// Transform chain in declared order. It runs last-to-first.
    #[serde(rename = "use", default)]
    pub uses: Vec<UseConfig>,
}

/// One transform of a rule chain.
///
/// Accepts either a bare name (`"css"`) or a table with options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "UseRepr")]
pub struct UseConfig {
    pub transform: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UseRepr {
    Name(String),
    Full {
        transform: String,
        #[serde(default)]
        options: Option<Value>,
    },
}

impl From<UseRepr> for UseConfig {
    fn from(repr: UseRepr) -> Self {
        match repr {
            UseRepr::Name(transform) => UseConfig {
                transform,
                options: None,
            },
            UseRepr::Full { transform, options } => UseConfig { transform, options },
        }
    }
}

impl UseConfig {
    pub fn new(transform: impl Into<String>) -> Self {
        Self {
            transform: transform.into(),
            options: None,
        }
    }

    pub fn with_options(transform: impl Into<String>, options: Value) -> Self {
        Self {
            transform: transform.into(),
            options: Some(options),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Directory name identifying third-party modules.
    pub vendor_dir: String,
    /// Output name of the shared third-party chunk.
    pub vendor_chunk: String,
    /// Output name template of the entry chunk (`[name]`, `[contenthash]`).
    pub entry_chunk: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylesConfig {
    /// Output path of the consolidated stylesheet.
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyConfig {
    /// Glob relative to the root.
    pub from: String,
    /// Destination template (`[name]`, `[ext]`, `[path]`).
    pub to: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<CopyTransformConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CopyTransformConfig {
    /// Replace the first occurrence of `token` with the build's cache-bust value.
    ReplacePlaceholder { token: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionConfig {
    /// Regular expression matched against the raw request string.
    pub pattern: String,
    /// Stand-in module, relative to the root.
    pub replacement: PathBuf,
    /// Optional regular expression the requesting file's path must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
}

impl KiteConfig {
    /// Create from a JSON value (for programmatic config).
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }

    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }

    /// Anchors a relative `root` at `base`.
    pub fn anchor_root(&mut self, base: &Path) {
        if self.root.is_absolute() {
            return;
        }
        self.root = normalize(&base.join(&self.root));
    }

    /// Resolves a root-relative path.
    pub fn root_path(&self, rel: impl AsRef<Path>) -> PathBuf {
        let rel = rel.as_ref();
        if rel.is_absolute() {
            rel.to_path_buf()
        } else {
            normalize(&self.root.join(rel))
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.root_path(&self.output_dir)
    }

    /// Whether chunk source maps are written for `mode`.
    pub fn source_maps_for(&self, mode: crate::BuildMode) -> bool {
        self.source_maps.unwrap_or_else(|| mode.default_source_maps())
    }
}

/// Lexically removes `.` components and folds `..` where possible.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
