//! Per-file content transforms.
//!
//! A transform turns one file's text into new text. Rules in the dispatch
//! table name transforms; the [`TransformRegistry`] maps those names to
//! implementations. Built-ins:
//!
//! | name          | does                                                        |
//! |---------------|-------------------------------------------------------------|
//! | `script`      | parses JS/TS with oxc, strips types, minifies in production |
//! | `css`         | parses and reprints CSS with lightningcss                   |
//! | `postcss`     | minifies CSS in production, pretty-prints otherwise         |
//! | `extract-css` | hands CSS to the [`StyleCollector`], yields an empty module |
//! | `json`        | validates JSON and exports it                               |
//! | `template`    | exports markup as a string constant                         |

mod css;
mod extract;
mod json;
mod script;
mod template;

pub use css::{CssTransform, PostCssTransform};
pub use extract::{ExtractCssTransform, StyleCollector};
pub use json::JsonTransform;
pub use script::ScriptTransform;
pub(crate) use script::source_type_for;
pub use template::TemplateTransform;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use kite_config::BuildMode;
use rustc_hash::FxHashMap;
use serde_json::Value;

/// What a transform sees besides its input text.
#[derive(Clone, Copy)]
pub struct TransformContext<'a> {
    /// Absolute path of the module (virtual for component parts).
    pub path: &'a Path,
    /// Root-relative module key.
    pub module_key: &'a str,
    /// Discovery index of the module; orders extracted styles.
    pub order: usize,
    pub mode: BuildMode,
    /// Options given to this transform in the rule.
    pub options: &'a Value,
    pub styles: &'a StyleCollector,
}

impl TransformContext<'_> {
    /// Boolean option lookup with a default.
    pub fn bool_option(&self, key: &str, default: bool) -> bool {
        self.options
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(default)
    }
}

/// A transform's rejection of its input, carrying the tool's diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformFailure {
    pub diagnostic: String,
}

impl TransformFailure {
    pub fn new(diagnostic: impl fmt::Display) -> Self {
        Self {
            diagnostic: diagnostic.to_string(),
        }
    }
}

impl fmt::Display for TransformFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.diagnostic)
    }
}

pub type TransformResult = std::result::Result<String, TransformFailure>;

/// One content transformation.
///
/// Must be pure with respect to its input apart from registering styles
/// with the collector; transforms of different files run concurrently.
pub trait Transform: Send + Sync {
    fn name(&self) -> &str;

    fn transform(&self, input: &str, ctx: &TransformContext<'_>) -> TransformResult;
}

/// Name to implementation map.
#[derive(Clone, Default)]
pub struct TransformRegistry {
    transforms: FxHashMap<String, Arc<dyn Transform>>,
}

impl TransformRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in transforms.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(ScriptTransform);
        registry.register(CssTransform);
        registry.register(PostCssTransform);
        registry.register(ExtractCssTransform);
        registry.register(JsonTransform);
        registry.register(TemplateTransform);
        registry
    }

    /// Register (or replace) a transform under its own name.
    pub fn register<T: Transform + 'static>(&mut self, transform: T) {
        self.register_shared(Arc::new(transform));
    }

    pub fn register_shared(&mut self, transform: Arc<dyn Transform>) {
        self.transforms
            .insert(transform.name().to_string(), transform);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Transform>> {
        self.transforms.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.transforms.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.transforms.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformRegistry")
            .field("transforms", &self.names())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Run `transform` on `input` with throwaway context.
    pub fn run(
        transform: &dyn Transform,
        input: &str,
        mode: BuildMode,
        options: Value,
    ) -> (TransformResult, StyleCollector) {
        let styles = StyleCollector::new();
        let ctx = TransformContext {
            path: Path::new("/project/client/test.ts"),
            module_key: "client/test.ts",
            order: 0,
            mode,
            options: &options,
            styles: &styles,
        };
        let result = transform.transform(input, &ctx);
        (result, styles)
    }
}
