//! Modules of the build graph.

use std::fmt;
use std::path::{Path, PathBuf};

/// Index of a module in discovery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub u32);

impl ModuleId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a module's code is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleKind {
    /// Read through the runtime and run through its rule's transform chain.
    Source,
    /// Claimed by a parse hook and split into parts; contributes no code.
    Composite { plugin: String },
    /// Bound to a global expression; never read.
    External { global: String },
}

#[derive(Debug, Clone)]
pub struct Module {
    pub id: ModuleId,
    /// Absolute path. Externals use `external:<specifier>`.
    pub path: PathBuf,
    /// Root-relative path with `/` separators.
    pub key: String,
    pub kind: ModuleKind,
    /// Raw content as read (or as produced by the parse hook).
    pub source: String,
    /// Content after the transform chain; empty until the transform stage.
    pub code: String,
    /// Resolved imports in source order.
    pub dependencies: Vec<ModuleId>,
    pub importer: Option<ModuleId>,
}

impl Module {
    pub fn is_external(&self) -> bool {
        matches!(self.kind, ModuleKind::External { .. })
    }
}

/// Kind of a component sub-part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    Script,
    Style,
    Template,
}

impl PartKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PartKind::Script => "script",
            PartKind::Style => "style",
            PartKind::Template => "template",
        }
    }
}

/// A piece of a composite module, fed into the graph as a module of its own.
///
/// `path` is virtual; its extension picks the dispatch rule
/// (`App.vue.ts`, `App.vue.css`, `App.vue.html`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulePart {
    pub path: PathBuf,
    pub source: String,
    pub kind: PartKind,
}

impl ModulePart {
    pub fn new(path: impl Into<PathBuf>, source: impl Into<String>, kind: PartKind) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
            kind,
        }
    }
}

/// Input of a parse hook.
#[derive(Debug, Clone, Copy)]
pub struct ParseInput<'a> {
    pub path: &'a Path,
    pub source: &'a str,
}

/// Root-relative key with `/` separators; paths outside the root keep
/// their full form.
pub fn module_key(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let text = rel.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        text.into_owned()
    } else {
        text.replace(std::path::MAIN_SEPARATOR, "/")
    }
}
