//! Configuration for the kite asset bundler.
//!
//! A [`KiteConfig`] describes the whole build: entry, resolver settings,
//! loader rules, chunk names, copy tasks, substitutions and externals. It is
//! plain data; the bundler compiles it into its runtime structures.
//!
//! [`BuildMode`] is not part of the file. It is resolved once per build
//! (from `NODE_ENV` or a CLI flag) and passed alongside the config.

pub mod config;
pub mod defaults;
pub mod discovery;
pub mod error;
pub mod loading;
pub mod mode;
pub mod validation;
pub mod version;

pub use config::*;
pub use defaults::*;
pub use error::*;
pub use mode::{BuildMode, DEV_MARKER};

pub use discovery::{ConfigDiscovery, ConfigSource};
pub use loading::{ConfigLoader, ConfigOverrides, ENV_PREFIX};
pub use validation::{
    ConfigValidator, FsValidator, SchemaValidator, is_glob, literal_copy_sources, validate_fs,
    validate_schema,
};
pub use version::{resolve_version, version_cache_bust};
