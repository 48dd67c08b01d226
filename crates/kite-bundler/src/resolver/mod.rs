//! Module resolution.
//!
//! Order for a request made by an importing file:
//! 1. path aliases from the alias manifest
//! 2. relative or absolute requests against the importer's directory
//! 3. bare requests against `node_modules` directories above the importer,
//!    then the configured base directories
//!
//! Resolution-phase plugins (substitutions, externals) run before any of
//! this; see [`crate::plugins::PluginRegistry::resolve_id`].

mod aliases;
mod extensions;

pub use aliases::{AliasTable, strip_json_comments};
pub use extensions::{resolve_candidate, try_directory, try_extensions, with_appended_extension};

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use kite_config::KiteConfig;
use path_clean::PathClean;

use crate::runtime::Runtime;
use crate::{Error, Result};

/// Resolves module requests to files.
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    root: PathBuf,
    extensions: Vec<String>,
    aliases: AliasTable,
    /// Absolute directories searched for bare requests after the hierarchy.
    base_dirs: Vec<PathBuf>,
    /// Directory names searched up the importer's ancestors (`node_modules`).
    module_dir_names: Vec<OsString>,
    runtime: Arc<dyn Runtime>,
}

impl ModuleResolver {
    pub fn new(root: impl Into<PathBuf>, extensions: Vec<String>, runtime: Arc<dyn Runtime>) -> Self {
        Self {
            root: root.into(),
            extensions,
            aliases: AliasTable::default(),
            base_dirs: Vec::new(),
            module_dir_names: Vec::new(),
            runtime,
        }
    }

    /// Build from configuration, loading the alias manifest through `runtime`.
    pub fn from_config(config: &KiteConfig, runtime: Arc<dyn Runtime>) -> Result<Self> {
        let resolve = &config.resolve;
        let base_url = resolve.base_url.as_ref().map(|b| config.root_path(b));

        let aliases = match &resolve.alias_manifest {
            Some(manifest) => {
                let path = config.root_path(manifest);
                let source = runtime.read_to_string(&path).map_err(|e| {
                    Error::InvalidConfig(format!("cannot read path alias manifest: {e}"))
                })?;
                AliasTable::from_manifest(&path, &source, base_url.as_deref())?
            }
            None => AliasTable::default(),
        };

        let mut resolver = Self::new(config.root.clone(), resolve.extensions.clone(), runtime)
            .with_aliases(aliases);

        for module_dir in &resolve.modules {
            if module_dir.is_absolute() {
                resolver.base_dirs.push(module_dir.clone());
            } else if let Some(name) = module_dir.file_name().filter(|_| module_dir.components().count() == 1) {
                resolver.module_dir_names.push(name.to_os_string());
            } else {
                resolver.base_dirs.push(config.root_path(module_dir));
            }
        }
        if let Some(base) = base_url {
            resolver.base_dirs.push(base);
        }

        Ok(resolver)
    }

    pub fn with_aliases(mut self, aliases: AliasTable) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dirs.push(dir.into());
        self
    }

    pub fn with_module_dir_name(mut self, name: impl Into<OsString>) -> Self {
        self.module_dir_names.push(name.into());
        self
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Resolve `request` made from the file `importer`.
    pub fn resolve(&self, request: &str, importer: &Path) -> Result<PathBuf> {
        let from_dir = importer.parent().unwrap_or(&self.root);
        let runtime = self.runtime.as_ref();

        for candidate in self.aliases.candidates(request) {
            if let Some(found) = resolve_candidate(&candidate, &self.extensions, runtime) {
                tracing::trace!(request, resolved = %found.display(), "resolved via alias");
                return Ok(found);
            }
        }

        if is_path_request(request) {
            let candidate = from_dir.join(request).clean();
            return resolve_candidate(&candidate, &self.extensions, runtime)
                .ok_or_else(|| self.unresolved(request, importer));
        }

        for dir in self.hierarchy(from_dir) {
            if let Some(found) = resolve_candidate(&dir.join(request), &self.extensions, runtime) {
                return Ok(found);
            }
        }

        for base in &self.base_dirs {
            if let Some(found) = resolve_candidate(&base.join(request), &self.extensions, runtime) {
                return Ok(found);
            }
        }

        Err(self.unresolved(request, importer))
    }

    /// `node_modules` directories from `from_dir` up to the root.
    fn hierarchy(&self, from_dir: &Path) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        for ancestor in from_dir.ancestors() {
            for name in &self.module_dir_names {
                // skip `node_modules/node_modules`
                if ancestor.file_name() == Some(name.as_os_str()) {
                    continue;
                }
                let dir = ancestor.join(name);
                if self.runtime.is_dir(&dir) {
                    dirs.push(dir);
                }
            }
            if ancestor == self.root {
                break;
            }
        }
        dirs
    }

    fn unresolved(&self, request: &str, importer: &Path) -> Error {
        Error::Resolution {
            request: request.to_string(),
            importer: importer.to_path_buf(),
        }
    }
}

/// `./x`, `../x`, `/x` and `.`/`..` themselves.
fn is_path_request(request: &str) -> bool {
    request == "."
        || request == ".."
        || request.starts_with("./")
        || request.starts_with("../")
        || Path::new(request).is_absolute()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::BundlerRuntime;
    use std::fs;
    use tempfile::TempDir;

    fn exts() -> Vec<String> {
        [".js", ".vue", ".json", ".ts"].iter().map(|s| s.to_string()).collect()
    }

    fn write(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn resolver(root: &Path) -> ModuleResolver {
        ModuleResolver::new(root, exts(), Arc::new(BundlerRuntime::new()))
            .with_module_dir_name("node_modules")
            .with_base_dir(root.join("client"))
    }

    #[test]
    fn relative_request_with_extension_lookup() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "client/js/store.ts");
        let importer = dir.path().join("client/js/vue.ts");

        let found = resolver(dir.path()).resolve("./store", &importer).unwrap();
        assert_eq!(found, dir.path().join("client/js/store.ts"));
    }

    #[test]
    fn relative_request_does_not_fall_back_to_base_dirs() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "client/store.ts");
        let importer = dir.path().join("client/js/vue.ts");

        let err = resolver(dir.path()).resolve("./store", &importer).unwrap_err();
        assert!(matches!(err, Error::Resolution { request, .. } if request == "./store"));
    }

    #[test]
    fn bare_request_searches_node_modules_then_base() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "node_modules/vue/index.js");
        write(dir.path(), "client/js/socket.ts");
        let importer = dir.path().join("client/js/vue.ts");
        let r = resolver(dir.path());

        assert_eq!(
            r.resolve("vue", &importer).unwrap(),
            dir.path().join("node_modules/vue/index.js")
        );
        assert_eq!(
            r.resolve("js/socket", &importer).unwrap(),
            dir.path().join("client/js/socket.ts")
        );
    }

    #[test]
    fn alias_takes_precedence_over_relative_lookup() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "client/js/helpers/format.ts");
        write(dir.path(), "node_modules/@/helpers/format.js");
        let importer = dir.path().join("client/components/Deep/Nested.vue");

        let aliases = AliasTable::new(
            dir.path().join("client"),
            vec![("@/*".to_string(), vec!["js/*".to_string()])],
        );
        let r = resolver(dir.path()).with_aliases(aliases);
        assert_eq!(
            r.resolve("@/helpers/format", &importer).unwrap(),
            dir.path().join("client/js/helpers/format.ts")
        );
    }

    #[test]
    fn nested_node_modules_are_found_first() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "node_modules/ms/index.js");
        write(dir.path(), "node_modules/debug/node_modules/ms/index.js");
        let importer = dir.path().join("node_modules/debug/src/browser.js");

        assert_eq!(
            resolver(dir.path()).resolve("ms", &importer).unwrap(),
            dir.path().join("node_modules/debug/node_modules/ms/index.js")
        );
    }

    #[test]
    fn unresolvable_request_reports_importer() {
        let dir = TempDir::new().unwrap();
        let importer = dir.path().join("client/js/vue.ts");
        match resolver(dir.path()).resolve("left-pad", &importer).unwrap_err() {
            Error::Resolution { request, importer: from } => {
                assert_eq!(request, "left-pad");
                assert_eq!(from, importer);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
