//! Extension and directory resolution for module files.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::runtime::Runtime;

/// Package manifest fields consulted for a directory's entry file, in order.
const PACKAGE_ENTRY_FIELDS: &[&str] = &["browser", "module", "main"];

/// Appends `ext` to the full file name (`foo.service` + `.ts` = `foo.service.ts`).
pub fn with_appended_extension(base: &Path, ext: &str) -> PathBuf {
    let mut name: OsString = base.as_os_str().to_owned();
    name.push(ext);
    PathBuf::from(name)
}

/// Returns `base` itself if it is a file, otherwise the first `base + ext`
/// that is.
pub fn try_extensions(base: &Path, extensions: &[String], runtime: &dyn Runtime) -> Option<PathBuf> {
    if runtime.is_file(base) {
        return Some(base.to_path_buf());
    }
    extensions
        .iter()
        .map(|ext| with_appended_extension(base, ext))
        .find(|candidate| runtime.is_file(candidate))
}

/// Resolves a directory through its `package.json` entry field, then
/// `index` + extension.
pub fn try_directory(dir: &Path, extensions: &[String], runtime: &dyn Runtime) -> Option<PathBuf> {
    if !runtime.is_dir(dir) {
        return None;
    }

    if let Some(entry) = package_entry(dir, runtime) {
        let target = dir.join(entry);
        if let Some(found) = try_extensions(&target, extensions, runtime) {
            return Some(found);
        }
        if let Some(found) = try_index(&target, extensions, runtime) {
            return Some(found);
        }
    }

    try_index(dir, extensions, runtime)
}

fn try_index(dir: &Path, extensions: &[String], runtime: &dyn Runtime) -> Option<PathBuf> {
    extensions
        .iter()
        .map(|ext| dir.join(format!("index{ext}")))
        .find(|candidate| runtime.is_file(candidate))
}

fn package_entry(dir: &Path, runtime: &dyn Runtime) -> Option<String> {
    let manifest = dir.join("package.json");
    if !runtime.is_file(&manifest) {
        return None;
    }
    let content = runtime.read_to_string(&manifest).ok()?;
    let parsed: Value = serde_json::from_str(&content).ok()?;
    PACKAGE_ENTRY_FIELDS
        .iter()
        .find_map(|field| parsed.get(*field).and_then(Value::as_str))
        .map(str::to_string)
}

/// File, then directory resolution.
pub fn resolve_candidate(
    candidate: &Path,
    extensions: &[String],
    runtime: &dyn Runtime,
) -> Option<PathBuf> {
    try_extensions(candidate, extensions, runtime)
        .or_else(|| try_directory(candidate, extensions, runtime))
}
