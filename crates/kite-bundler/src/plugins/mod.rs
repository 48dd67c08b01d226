//! Plugin hook pipeline.
//!
//! Plugins implement any of four hooks, each fired at a fixed point of the
//! build:
//!
//! 1. `resolve_id` while the graph is walked, before a request is looked up
//! 2. `parse` when a module is loaded, before dispatch
//! 3. `emit` after chunks are rendered
//! 4. `finalize` after every emit hook, before files are written
//!
//! Within a hook, plugins run in [`Phase`] order and then in registration
//! order. Every hook receives the [`PipelineContext`] explicitly.

mod asset_copy;
mod chunk_naming;
mod externals;
mod manifest;
mod registry;
mod style_extraction;
mod substitution;

pub use asset_copy::AssetCopyPlugin;
pub use chunk_naming::ChunkNamingPlugin;
pub use externals::ExternalsPlugin;
pub use manifest::{MANIFEST_FILE, ManifestPlugin};
pub use registry::{Phase, PluginRegistry};
pub use style_extraction::StyleExtractionPlugin;
pub use substitution::{SubstitutionPlugin, SubstitutionRule};

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use kite_config::{BuildMode, DEV_MARKER};

use crate::Result;
use crate::module::{ModulePart, ParseInput, module_key};
use crate::output::OutputBundle;
use crate::runtime::Runtime;
use crate::transforms::StyleCollector;

/// Build-wide state handed to every hook. Immutable for the whole build.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub mode: BuildMode,
    pub root: PathBuf,
    pub output_dir: PathBuf,
    /// Version identifier; required in production when a copy task
    /// rewrites a placeholder.
    pub version: Option<String>,
    pub source_maps: bool,
    pub styles: Arc<StyleCollector>,
    pub runtime: Arc<dyn Runtime>,
}

impl PipelineContext {
    /// Value substituted for cache-bust placeholders: the version in
    /// production, `dev` otherwise.
    pub fn cache_bust(&self) -> Option<&str> {
        match self.mode {
            BuildMode::Development => Some(DEV_MARKER),
            BuildMode::Production => self.version.as_deref(),
        }
    }

    pub fn module_key(&self, path: &Path) -> String {
        module_key(&self.root, path)
    }
}

/// Outcome of a `resolve_id` hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Use this file; normal lookup is skipped.
    File(PathBuf),
    /// Use this stand-in module in place of the requested one.
    Substituted(PathBuf),
    /// Bind the request to a global expression.
    External { global: String },
}

/// An extension of the build pipeline.
///
/// All hooks default to doing nothing. Hooks run concurrently for
/// different modules, so implementations must be `Sync`.
pub trait Plugin: Send + Sync {
    fn name(&self) -> Cow<'static, str>;

    fn phase(&self) -> Phase {
        Phase::Emit
    }

    /// Claim a request before normal resolution. The first `Some` wins.
    fn resolve_id(
        &self,
        _request: &str,
        _importer: &Path,
        _ctx: &PipelineContext,
    ) -> Result<Option<Resolution>> {
        Ok(None)
    }

    /// Claim a module and split it into parts. The first `Some` wins.
    fn parse(&self, _input: &ParseInput<'_>, _ctx: &PipelineContext) -> Result<Option<Vec<ModulePart>>> {
        Ok(None)
    }

    /// Contribute to or inspect the rendered output.
    fn emit(&self, _bundle: &mut OutputBundle, _ctx: &PipelineContext) -> Result<()> {
        Ok(())
    }

    /// Last changes before writing (file names, manifests).
    fn finalize(&self, _bundle: &mut OutputBundle, _ctx: &PipelineContext) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::runtime::BundlerRuntime;

    pub fn context(root: &Path, mode: BuildMode) -> PipelineContext {
        PipelineContext {
            mode,
            root: root.to_path_buf(),
            output_dir: root.join("public"),
            version: Some("v7".to_string()),
            source_maps: !mode.is_production(),
            styles: Arc::new(StyleCollector::new()),
            runtime: Arc::new(BundlerRuntime::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_bust_follows_mode() {
        let root = Path::new("/app");
        let prod = test_support::context(root, BuildMode::Production);
        assert_eq!(prod.cache_bust(), Some("v7"));

        let dev = test_support::context(root, BuildMode::Development);
        assert_eq!(dev.cache_bust(), Some("dev"));

        let unversioned = PipelineContext {
            version: None,
            ..prod
        };
        assert_eq!(unversioned.cache_bust(), None);
    }
}
