
//! # kite-bundler
//!
//! Rule-driven client asset pipeline.
//!
//! Source files are discovered from the entry sources, dispatched through
//! ordered loader rules to chains of transforms, grouped into an entry and
//! a vendor chunk, and written next to the extracted stylesheet and the
//! copied static assets. Plugins hook into resolution, parsing, emission
//! and finalization.
//!
//! ## Quick Start
//!
//! ```no_run
//! use kite_bundler::{BuildMode, KiteConfig};
//!
//! let config = KiteConfig {
//!     root: "/srv/my-app".into(),
//!     version: Some("v7".into()),
//!     ..KiteConfig::default()
//! };
//! let manifest = kite_bundler::build(config, BuildMode::Production)?;
//! assert!(manifest.contains("js/bundle.js"));
//! # Ok::<(), kite_bundler::BuildError>(())
//! ```
//!
//! The default resolve extensions include `.vue`, but this crate does not
//! split single-file components. Register `kite_plugin_vue::VuePlugin` with
//! [`Bundler::plugin`] when the sources import `.vue` files; without it such
//! an import fails with [`Error::NoMatchingRule`].
//!
//! ## Custom plugins and transforms
//!
//! ```no_run
//! use std::borrow::Cow;
//! use kite_bundler::{BuildMode, Bundler, KiteConfig, OutputBundle, PipelineContext, Plugin};
//!
//! struct Banner;
//!
//! impl Plugin for Banner {
//!     fn name(&self) -> Cow<'static, str> {
//!         Cow::Borrowed("banner")
//!     }
//!
//!     fn emit(&self, bundle: &mut OutputBundle, _ctx: &PipelineContext) -> kite_bundler::Result<()> {
//!         for chunk in &mut bundle.chunks {
//!             chunk.code.insert_str(0, "/* built with kite */\n");
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let manifest = Bundler::new(KiteConfig::default(), BuildMode::Development)
//!     .plugin(Banner)
//!     .build()?;
//! # Ok::<(), kite_bundler::BuildError>(())
//! ```

pub mod bundler;
pub mod copier;
pub mod dispatch;
pub mod error;
pub mod graph;
pub mod module;
pub mod output;
pub mod plugins;
pub mod resolver;
pub mod runtime;
pub mod split;
pub mod transforms;

// Configuration types, so embedders need only one dependency
pub use kite_config;
pub use kite_config::{BuildMode, ConfigError, KiteConfig};

pub use bundler::{Bundler, build};
pub use copier::{AssetCopier, ContentTransform, CopyTask};
pub use dispatch::{DispatchTable, TransformChain};
pub use error::{BuildError, Error, ErrorKind, Result, Stage};
pub use graph::ModuleGraph;
pub use module::{Module, ModuleId, ModuleKind, ModulePart, ParseInput, PartKind};
pub use output::{
    ChunkKind, CopiedFile, EmittedAsset, FileKind, ManifestEntry, OutputBundle, OutputManifest,
    RenderedChunk,
};
pub use plugins::{Phase, PipelineContext, Plugin, PluginRegistry, Resolution};
pub use resolver::ModuleResolver;
pub use runtime::{BundlerRuntime, Runtime, RuntimeError};
pub use split::{ChunkPlan, SplitPolicy};
pub use transforms::{
    StyleCollector, Transform, TransformContext, TransformFailure, TransformRegistry,
    TransformResult,
};
