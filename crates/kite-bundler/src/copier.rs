//! Static asset copier.
//!
//! Each [`CopyTask`] names a glob relative to the source root. The glob's
//! literal leading directories are walked; files matching the glob and no
//! ignore pattern are copied to the destination template, optionally
//! rewritten by a [`ContentTransform`]. A glob whose base directory does not
//! exist matches nothing, which is not an error.
//!
//! All destinations are computed before anything is written, and two
//! matches mapping to one destination fail the whole copy.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ignore::overrides::{Override, OverrideBuilder};
use kite_config::{CopyConfig, CopyTransformConfig, is_glob};
use memchr::memmem;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use walkdir::WalkDir;

use crate::module::module_key;
use crate::output::{CopiedFile, write_file_atomic};
use crate::{Error, Result};

type RewriteFn = dyn Fn(&[u8]) -> Vec<u8> + Send + Sync;

/// Per-file content rewrite. Sees one file's bytes and nothing else.
#[derive(Clone)]
pub enum ContentTransform {
    /// Replace the first occurrence of `token`.
    ReplaceFirst { token: String, replacement: String },
    Custom(Arc<RewriteFn>),
}

impl ContentTransform {
    pub fn replace_first(token: impl Into<String>, replacement: impl Into<String>) -> Self {
        ContentTransform::ReplaceFirst {
            token: token.into(),
            replacement: replacement.into(),
        }
    }

    pub fn custom(f: impl Fn(&[u8]) -> Vec<u8> + Send + Sync + 'static) -> Self {
        ContentTransform::Custom(Arc::new(f))
    }

    pub fn apply(&self, content: &[u8]) -> Vec<u8> {
        match self {
            ContentTransform::ReplaceFirst { token, replacement } => {
                replace_first(content, token.as_bytes(), replacement.as_bytes())
            }
            ContentTransform::Custom(f) => f(content),
        }
    }
}

impl fmt::Debug for ContentTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentTransform::ReplaceFirst { token, replacement } => f
                .debug_struct("ReplaceFirst")
                .field("token", token)
                .field("replacement", replacement)
                .finish(),
            ContentTransform::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

fn replace_first(content: &[u8], token: &[u8], replacement: &[u8]) -> Vec<u8> {
    if token.is_empty() {
        return content.to_vec();
    }
    match memmem::find(content, token) {
        Some(at) => {
            let mut out = Vec::with_capacity(content.len() + replacement.len());
            out.extend_from_slice(&content[..at]);
            out.extend_from_slice(replacement);
            out.extend_from_slice(&content[at + token.len()..]);
            out
        }
        None => content.to_vec(),
    }
}

/// One copy pattern.
#[derive(Debug, Clone)]
pub struct CopyTask {
    /// Glob relative to the source root.
    pub from: String,
    /// Destination template: `[name]`, `[ext]` (with the dot), `[path]`.
    pub to: String,
    pub ignore: Vec<String>,
    pub transform: Option<ContentTransform>,
}

impl CopyTask {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            ignore: Vec::new(),
            transform: None,
        }
    }

    pub fn ignore(mut self, pattern: impl Into<String>) -> Self {
        self.ignore.push(pattern.into());
        self
    }

    pub fn with_transform(mut self, transform: ContentTransform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Build from configuration. `cache_bust` is the value placeholders are
    /// replaced with; a placeholder task without one is a configuration error.
    pub fn from_config(config: &CopyConfig, cache_bust: Option<&str>) -> Result<Self> {
        let transform = match &config.transform {
            None => None,
            Some(CopyTransformConfig::ReplacePlaceholder { token }) => {
                let replacement = cache_bust.ok_or_else(|| {
                    Error::InvalidConfig(format!(
                        "copy task '{}' replaces '{}' but the build has no version identifier",
                        config.from, token
                    ))
                })?;
                Some(ContentTransform::replace_first(token.clone(), replacement))
            }
        };

        Ok(Self {
            from: config.from.clone(),
            to: config.to.clone(),
            ignore: config.ignore.clone(),
            transform,
        })
    }
}

/// A file about to be copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCopy {
    pub task: usize,
    pub source: PathBuf,
    /// Output-relative, `/` separated.
    pub destination: String,
}

/// Copies matched files from a source root into an output directory.
#[derive(Debug, Clone)]
pub struct AssetCopier {
    source_root: PathBuf,
    dest_root: PathBuf,
}

impl AssetCopier {
    pub fn new(source_root: impl Into<PathBuf>, dest_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            dest_root: dest_root.into(),
        }
    }

    /// Matches and destinations for every task, in task then path order.
    pub fn plan(&self, tasks: &[CopyTask]) -> Result<Vec<PlannedCopy>> {
        let mut planned = Vec::new();
        let mut claimed: FxHashMap<String, PathBuf> = FxHashMap::default();

        for (index, task) in tasks.iter().enumerate() {
            let (base, pattern) = self.pattern_for(&task.from);
            let matches = self.matches(task, &base, &pattern)?;
            if matches.is_empty() {
                tracing::warn!(pattern = %task.from, "copy pattern matched no files");
            }

            let base = self.source_root.join(base);
            for source in matches {
                let destination = destination_for(&task.to, &base, &source);
                if let Some(previous) = claimed.get(&destination) {
                    return Err(Error::Copy {
                        path: PathBuf::from(&destination),
                        message: format!(
                            "destination is produced by both {} and {}",
                            previous.display(),
                            source.display()
                        ),
                    });
                }
                claimed.insert(destination.clone(), source.clone());
                planned.push(PlannedCopy {
                    task: index,
                    source,
                    destination,
                });
            }
        }

        Ok(planned)
    }

    /// Copies every match. Files are copied concurrently; the first
    /// failure in plan order is returned.
    pub fn copy(&self, tasks: &[CopyTask]) -> Result<Vec<CopiedFile>> {
        let planned = self.plan(tasks)?;

        planned
            .par_iter()
            .map(|copy| self.copy_one(copy, tasks[copy.task].transform.as_ref()))
            .collect::<Vec<_>>()
            .into_iter()
            .collect()
    }

    fn copy_one(&self, copy: &PlannedCopy, transform: Option<&ContentTransform>) -> Result<CopiedFile> {
        let bytes = fs::read(&copy.source).map_err(|e| Error::Copy {
            path: copy.source.clone(),
            message: format!("cannot read source: {e}"),
        })?;
        let content = match transform {
            Some(transform) => transform.apply(&bytes),
            None => bytes,
        };

        write_file_atomic(&self.dest_root, &copy.destination, &content).map_err(|e| {
            Error::Copy {
                path: self.dest_root.join(&copy.destination),
                message: e.to_string(),
            }
        })?;

        tracing::debug!(from = %copy.source.display(), to = %copy.destination, "copied");
        Ok(CopiedFile {
            source: module_key(&self.source_root, &copy.source),
            destination: copy.destination.clone(),
            size: content.len() as u64,
        })
    }

    /// Walk base and match pattern, both root-relative. A literal
    /// directory stands for everything below it.
    fn pattern_for(&self, from: &str) -> (PathBuf, String) {
        let from = from.trim_start_matches("./");
        if !is_glob(from) && self.source_root.join(from).is_dir() {
            let dir = from.trim_end_matches('/');
            return (PathBuf::from(dir), format!("{dir}/**"));
        }
        (glob_base(from), from.to_string())
    }

    fn matches(&self, task: &CopyTask, base: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
        let base = self.source_root.join(base);
        if !base.exists() {
            return Ok(Vec::new());
        }
        let matcher = self.matcher(pattern, &task.ignore)?;

        let mut found = Vec::new();
        for entry in WalkDir::new(&base).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::Copy {
                path: base.clone(),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(&self.source_root) else {
                continue;
            };
            if matcher.matched(rel, false).is_whitelist() {
                found.push(entry.path().to_path_buf());
            }
        }
        Ok(found)
    }

    fn matcher(&self, pattern: &str, ignore: &[String]) -> Result<Override> {
        let invalid = |pattern: &str, e: ignore::Error| {
            Error::InvalidConfig(format!("invalid copy pattern '{pattern}': {e}"))
        };

        let mut builder = OverrideBuilder::new(&self.source_root);
        builder.add(pattern).map_err(|e| invalid(pattern, e))?;
        for ignored in ignore {
            builder
                .add(&format!("!{ignored}"))
                .map_err(|e| invalid(ignored, e))?;
        }
        builder.build().map_err(|e| invalid(pattern, e))
    }
}

/// `copy(tasks, sourceRoot, destRoot)`
pub fn copy(tasks: &[CopyTask], source_root: &Path, dest_root: &Path) -> Result<Vec<CopiedFile>> {
    AssetCopier::new(source_root, dest_root).copy(tasks)
}

/// Leading directories of `pattern` without glob syntax. For a literal
/// path this is its parent directory.
pub fn glob_base(pattern: &str) -> PathBuf {
    let mut base = PathBuf::new();
    let components: Vec<&str> = pattern.split('/').filter(|c| !c.is_empty()).collect();
    let literal = !is_glob(pattern);

    for (i, component) in components.iter().enumerate() {
        if is_glob(component) || (literal && i + 1 == components.len()) {
            break;
        }
        base.push(component);
    }
    base
}

/// Fills the destination template for `source`, matched under `base`.
pub fn destination_for(template: &str, base: &Path, source: &Path) -> String {
    let name = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let dir = source
        .parent()
        .and_then(|parent| parent.strip_prefix(base).ok())
        .map(|rel| module_key(Path::new(""), rel))
        .filter(|rel| !rel.is_empty())
        .map(|rel| format!("{rel}/"))
        .unwrap_or_default();

    template
        .replace("[path]", &dir)
        .replace("[name]", &name)
        .replace("[ext]", &ext)
}
