//! Build orchestration.
//!
//! A build runs its stages strictly in order, each one waiting for the
//! previous one to finish:
//!
//! | stage | work |
//! |---|---|
//! | configuration | validate the config, resolve the version, compile rules and plugins |
//! | resolve | walk the module graph from the entry sources |
//! | transform | run each module through its rule's chain |
//! | split | assign modules to the entry and vendor chunks and render them |
//! | emit | style extraction, asset copies, user emit hooks |
//! | finalize | chunk names, source maps, manifest |
//! | write | atomically write chunks and emitted assets |
//!
//! The first failure stops the build and is returned as a [`BuildError`]
//! naming its stage. Nothing of the bundle is written unless every stage
//! before `write` succeeded.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use kite_config::{BuildMode, KiteConfig, resolve_version, validate_fs};

use crate::dispatch::DispatchTable;
use crate::error::{BuildError, Stage, StageExt};
use crate::graph::{GraphWalker, ModuleGraph};
use crate::output::{OutputBundle, OutputManifest, clean_dir, write_bundle};
use crate::plugins::{
    AssetCopyPlugin, ChunkNamingPlugin, ExternalsPlugin, ManifestPlugin, PipelineContext, Plugin,
    PluginRegistry, StyleExtractionPlugin, SubstitutionPlugin,
};
use crate::resolver::ModuleResolver;
use crate::runtime::{BundlerRuntime, Runtime};
use crate::split::{SplitPolicy, render_chunks};
use crate::transforms::{StyleCollector, Transform, TransformRegistry};

/// Configured build, ready to run.
///
/// # Example
///
/// ```no_run
/// use kite_bundler::{BuildMode, Bundler, KiteConfig};
///
/// let config = KiteConfig {
///     root: "/srv/my-app".into(),
///     ..KiteConfig::default()
/// };
/// let manifest = Bundler::new(config, BuildMode::from_env()).build()?;
/// for path in manifest.paths() {
///     println!("{path}");
/// }
/// # Ok::<(), kite_bundler::BuildError>(())
/// ```
pub struct Bundler {
    config: KiteConfig,
    mode: BuildMode,
    plugins: Vec<Arc<dyn Plugin>>,
    transforms: TransformRegistry,
    runtime: Arc<dyn Runtime>,
}

/// State produced by the configuration stage.
struct Prepared {
    ctx: PipelineContext,
    plugins: PluginRegistry,
    resolver: ModuleResolver,
    dispatch: DispatchTable,
    entries: Vec<PathBuf>,
}

impl Bundler {
    /// A relative `root` is anchored at the current directory.
    pub fn new(mut config: KiteConfig, mode: BuildMode) -> Self {
        if config.root.is_relative() {
            if let Ok(cwd) = std::env::current_dir() {
                config.anchor_root(&cwd);
            }
        }
        Self {
            config,
            mode,
            plugins: Vec::new(),
            transforms: TransformRegistry::with_builtins(),
            runtime: Arc::new(BundlerRuntime::new()),
        }
    }

    /// Register a plugin. User plugins run after the built-in resolution
    /// plugins and before the built-in emit and finalize plugins of the
    /// same phase.
    pub fn plugin<P: Plugin + 'static>(mut self, plugin: P) -> Self {
        self.plugins.push(Arc::new(plugin));
        self
    }

    pub fn plugin_shared(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Register a transform that rules can name in their `use` list.
    pub fn transform<T: Transform + 'static>(mut self, transform: T) -> Self {
        self.transforms.register(transform);
        self
    }

    /// Replace the file access layer used for module reads.
    pub fn runtime(mut self, runtime: Arc<dyn Runtime>) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn config(&self) -> &KiteConfig {
        &self.config
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    /// Run the build and return the manifest of every emitted file.
    pub fn build(self) -> Result<OutputManifest, BuildError> {
        let started = Instant::now();
        tracing::info!(
            mode = %self.mode,
            root = %self.config.root.display(),
            "build started"
        );

        let prepared = in_stage(Stage::Configuration, || {
            let prepared = self.prepare()?;
            if self.config.clean {
                tracing::debug!(dir = %prepared.ctx.output_dir.display(), "cleaning output directory");
                clean_dir(&prepared.ctx.output_dir).stage(Stage::Configuration)?;
            }
            Ok(prepared)
        })?;
        let Prepared {
            ctx,
            plugins,
            resolver,
            dispatch,
            entries,
        } = prepared;

        let mut graph = in_stage(Stage::Resolve, || {
            GraphWalker::new(&ctx, &plugins, &resolver, &dispatch).walk(&entries)
        })?;

        in_stage(Stage::Transform, || graph.transform(&dispatch, &ctx))?;

        let mut bundle = in_stage(Stage::Split, || Ok(self.split(&graph)))?;

        in_stage(Stage::Emit, || plugins.emit(&mut bundle, &ctx).stage(Stage::Emit))?;
        in_stage(Stage::Finalize, || {
            plugins.finalize(&mut bundle, &ctx).stage(Stage::Finalize)
        })?;
        in_stage(Stage::Write, || {
            write_bundle(&bundle, &ctx.output_dir).stage(Stage::Write)
        })?;

        let manifest = bundle.manifest();
        tracing::info!(
            files = manifest.len(),
            bytes = manifest.total_size(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "build finished"
        );
        Ok(manifest)
    }

    /// Run only the configuration stage: validation, version lookup and
    /// compilation of rules and plugins. Nothing is read or written.
    pub fn check(&self) -> Result<(), BuildError> {
        in_stage(Stage::Configuration, || self.prepare().map(|_| ()))
    }

    fn prepare(&self) -> Result<Prepared, BuildError> {
        let config = &self.config;
        validate_fs(config).stage(Stage::Configuration)?;
        let version = resolve_version(config).stage(Stage::Configuration)?;

        let ctx = PipelineContext {
            mode: self.mode,
            root: config.root.clone(),
            output_dir: config.output_path(),
            version,
            source_maps: config.source_maps_for(self.mode),
            styles: Arc::new(StyleCollector::new()),
            runtime: Arc::clone(&self.runtime),
        };

        let resolver = ModuleResolver::from_config(config, Arc::clone(&self.runtime))
            .stage(Stage::Configuration)?;
        let dispatch =
            DispatchTable::from_config(config, &self.transforms).stage(Stage::Configuration)?;
        let plugins = self.plugin_registry(&ctx).stage(Stage::Configuration)?;
        tracing::debug!(rules = dispatch.len(), plugins = ?plugins.names(), "pipeline ready");

        let entries = config
            .entry
            .sources
            .iter()
            .map(|source| config.root_path(source))
            .collect();

        Ok(Prepared {
            ctx,
            plugins,
            resolver,
            dispatch,
            entries,
        })
    }

    fn plugin_registry(&self, ctx: &PipelineContext) -> crate::Result<PluginRegistry> {
        let config = &self.config;
        let mut registry = PluginRegistry::new();

        // substitutions are consulted before externals
        registry.add(SubstitutionPlugin::from_config(config)?);
        registry.add(ExternalsPlugin::new(config.externals.clone()));
        for plugin in &self.plugins {
            registry.add_shared(Arc::clone(plugin));
        }
        registry.add(StyleExtractionPlugin::new(config.styles.filename.clone()));
        registry.add(AssetCopyPlugin::from_config(config, ctx.cache_bust())?);
        registry.add(ChunkNamingPlugin);
        if config.manifest {
            registry.add(ManifestPlugin);
        }
        Ok(registry)
    }

    fn split(&self, graph: &ModuleGraph) -> OutputBundle {
        let policy = SplitPolicy::from_config(&self.config.split);
        let plan = policy.partition(graph);
        tracing::debug!(
            entry = plan.entry.len(),
            vendor = plan.vendor.len(),
            "modules partitioned"
        );
        OutputBundle {
            chunks: render_chunks(graph, &plan, &self.config.entry.name, &self.config.split),
            ..OutputBundle::default()
        }
    }
}

/// Build `config` in `mode` with the built-in transforms and plugins.
pub fn build(config: KiteConfig, mode: BuildMode) -> Result<OutputManifest, BuildError> {
    Bundler::new(config, mode).build()
}

fn in_stage<T>(
    stage: Stage,
    run: impl FnOnce() -> Result<T, BuildError>,
) -> Result<T, BuildError> {
    let span = tracing::info_span!("stage", name = stage.as_str());
    let _guard = span.enter();
    let started = Instant::now();
    let result = run();
    match &result {
        Ok(_) => tracing::debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "stage complete"
        ),
        Err(err) => tracing::debug!(error = %err.error, "stage failed"),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn minimal_config(root: &Path) -> KiteConfig {
        KiteConfig {
            root: root.to_path_buf(),
            entry: kite_config::EntryConfig {
                name: "js/bundle.js".into(),
                sources: vec!["client/main.ts".into()],
            },
            resolve: kite_config::ResolveConfig {
                alias_manifest: None,
                ..Default::default()
            },
            copy: Vec::new(),
            substitutions: Vec::new(),
            version: Some("v1".into()),
            ..KiteConfig::default()
        }
    }

    #[test]
    fn missing_entry_is_a_configuration_error() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("client")).unwrap();

        let err = build(minimal_config(dir.path()), BuildMode::Development).unwrap_err();
        assert_eq!(err.stage, Stage::Configuration);
        assert!(matches!(err.error, Error::Configuration(_)));
        assert!(!dir.path().join("public").exists());
    }

    #[test]
    fn builtin_plugins_run_in_phase_order() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "client/main.ts", "export const a = 1;\n");
        let bundler = Bundler::new(minimal_config(dir.path()), BuildMode::Development);
        let prepared = bundler.prepare().unwrap();
        assert_eq!(
            prepared.plugins.names(),
            [
                "kite:substitution",
                "kite:externals",
                "kite:style-extraction",
                "kite:asset-copy",
                "kite:chunk-naming",
            ]
        );
    }

    #[test]
    fn transform_failure_stops_before_writing() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "client/main.ts", "export const = ;\n");

        let err = build(minimal_config(dir.path()), BuildMode::Development).unwrap_err();
        assert_eq!(err.stage, Stage::Transform);
        assert!(matches!(err.error, Error::Transform { ref transform, .. } if transform == "script"));
        assert!(!dir.path().join("public/js/bundle.js").exists());
    }

    #[test]
    fn check_leaves_the_output_alone() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "client/main.ts", "export const a = 1;\n");
        write(dir.path(), "public/stale.txt", "old");
        let mut config = minimal_config(dir.path());
        config.clean = true;

        Bundler::new(config, BuildMode::Production).check().unwrap();
        assert!(dir.path().join("public/stale.txt").exists());
    }

    #[test]
    fn relative_root_builds_with_root_relative_keys() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "client/main.ts", "import './util';
console.log(1);
");
        write(dir.path(), "client/util.js", "export const u = 2;
");

        // climb from the working directory to `/`, then down into the temp dir
        let cwd = std::env::current_dir().unwrap();
        let mut relative = PathBuf::from(".");
        for _ in cwd.components().skip(1) {
            relative.push("..");
        }
        for part in dir.path().components().skip(1) {
            relative.push(part);
        }

        let manifest = build(minimal_config(&relative), BuildMode::Development).unwrap();
        assert!(manifest.contains("js/bundle.js"));
        let bundle = fs::read_to_string(dir.path().join("public/js/bundle.js")).unwrap();
        assert!(bundle.contains("/* client/main.ts */"));
        assert!(bundle.contains("/* client/util.js */"));
    }
}
