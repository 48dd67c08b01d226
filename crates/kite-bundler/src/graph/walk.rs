//! Breadth-first module discovery.
//!
//! Each frontier is loaded in parallel (read, parse hooks, request scanning
//! and resolution), then its results are folded into the graph in frontier
//! order. Ids are handed out as modules are first seen, so discovery order,
//! ids and the first reported error do not depend on thread scheduling.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::dispatch::DispatchTable;
use crate::error::{BuildError, Stage, StageExt};
use crate::module::{Module, ModuleId, ModuleKind, ModulePart, ParseInput};
use crate::plugins::{PipelineContext, PluginRegistry, Resolution};
use crate::resolver::ModuleResolver;
use crate::runtime::RuntimeError;
use crate::{Error, Result};

use super::{ModuleGraph, is_script_path, scan_imports};

/// Where a queued module's content comes from.
#[derive(Debug, Clone)]
enum Origin {
    Runtime,
    Part(String),
    External { global: String },
}

#[derive(Debug, Clone)]
struct Pending {
    id: ModuleId,
    path: PathBuf,
    key: String,
    importer: Option<ModuleId>,
    origin: Origin,
}

/// A dependency discovered while loading a module.
#[derive(Debug)]
enum Target {
    File(PathBuf),
    Part(ModulePart),
    External { specifier: String, global: String },
}

struct Loaded {
    kind: ModuleKind,
    source: String,
    targets: Vec<Target>,
}

#[derive(Default)]
struct Queue {
    next_id: u32,
    seen: FxHashMap<String, ModuleId>,
    pending: Vec<Pending>,
}

impl Queue {
    /// Id of the module with `key`, queueing it if unseen.
    fn enqueue(&mut self, path: PathBuf, key: String, origin: Origin, importer: Option<ModuleId>) -> (ModuleId, bool) {
        if let Some(id) = self.seen.get(&key) {
            return (*id, false);
        }
        let id = ModuleId(self.next_id);
        self.next_id += 1;
        self.seen.insert(key.clone(), id);
        self.pending.push(Pending {
            id,
            path,
            key,
            importer,
            origin,
        });
        (id, true)
    }
}

/// Discovers the module graph from the entry sources.
pub struct GraphWalker<'a> {
    ctx: &'a PipelineContext,
    plugins: &'a PluginRegistry,
    resolver: &'a ModuleResolver,
    dispatch: &'a DispatchTable,
}

impl<'a> GraphWalker<'a> {
    pub fn new(
        ctx: &'a PipelineContext,
        plugins: &'a PluginRegistry,
        resolver: &'a ModuleResolver,
        dispatch: &'a DispatchTable,
    ) -> Self {
        Self {
            ctx,
            plugins,
            resolver,
            dispatch,
        }
    }

    /// Walks from `entries` (absolute paths) until no new module appears.
    pub fn walk(&self, entries: &[PathBuf]) -> std::result::Result<ModuleGraph, BuildError> {
        let mut graph = ModuleGraph::default();
        let mut queue = Queue::default();

        for entry in entries {
            let key = self.ctx.module_key(entry);
            let (id, fresh) = queue.enqueue(entry.clone(), key, Origin::Runtime, None);
            if fresh {
                graph.mark_entry(id);
            }
        }

        while !queue.pending.is_empty() {
            let frontier = std::mem::take(&mut queue.pending);
            tracing::debug!(modules = frontier.len(), "loading frontier");

            let loaded: Vec<std::result::Result<Loaded, BuildError>> =
                frontier.par_iter().map(|pending| self.load(pending)).collect();

            for (pending, result) in frontier.into_iter().zip(loaded) {
                let loaded = result?;
                let mut dependencies = Vec::with_capacity(loaded.targets.len());

                for target in loaded.targets {
                    let (id, _) = match target {
                        Target::File(path) => {
                            let key = self.ctx.module_key(&path);
                            queue.enqueue(path, key, Origin::Runtime, Some(pending.id))
                        }
                        Target::Part(part) => {
                            let key = self.ctx.module_key(&part.path);
                            queue.enqueue(part.path, key, Origin::Part(part.source), Some(pending.id))
                        }
                        Target::External { specifier, global } => queue.enqueue(
                            PathBuf::from(format!("external:{specifier}")),
                            format!("external:{specifier}"),
                            Origin::External { global },
                            Some(pending.id),
                        ),
                    };
                    if !dependencies.contains(&id) {
                        dependencies.push(id);
                    }
                }

                graph.push(Module {
                    id: pending.id,
                    path: pending.path,
                    key: pending.key,
                    kind: loaded.kind,
                    source: loaded.source,
                    code: String::new(),
                    dependencies,
                    importer: pending.importer,
                });
            }
        }

        tracing::info!(modules = graph.len(), "module graph complete");
        Ok(graph)
    }

    fn load(&self, pending: &Pending) -> std::result::Result<Loaded, BuildError> {
        let source = match &pending.origin {
            Origin::External { global } => {
                return Ok(Loaded {
                    kind: ModuleKind::External {
                        global: global.clone(),
                    },
                    source: format!("module.exports = {global};\n"),
                    targets: Vec::new(),
                });
            }
            Origin::Part(source) => source.clone(),
            Origin::Runtime => self
                .ctx
                .runtime
                .read_to_string(&pending.path)
                .map_err(|e| read_error(&pending.path, e))
                .stage(Stage::Resolve)?,
        };

        let input = ParseInput {
            path: &pending.path,
            source: &source,
        };
        if let Some((plugin, parts)) = self.plugins.parse(&input, self.ctx).stage(Stage::Parse)? {
            tracing::debug!(module = %pending.key, plugin = %plugin, parts = parts.len(), "module split into parts");
            return Ok(Loaded {
                kind: ModuleKind::Composite { plugin },
                source,
                targets: parts.into_iter().map(Target::Part).collect(),
            });
        }

        self.dispatch.dispatch(&pending.path).stage(Stage::Resolve)?;

        let targets = if is_script_path(&pending.path) {
            scan_imports(&source, &pending.path)
                .iter()
                .map(|request| self.resolve(request, &pending.path))
                .collect::<Result<Vec<_>>>()
                .stage(Stage::Resolve)?
        } else {
            Vec::new()
        };

        Ok(Loaded {
            kind: ModuleKind::Source,
            source,
            targets,
        })
    }

    fn resolve(&self, request: &str, importer: &Path) -> Result<Target> {
        if let Some((plugin, resolution)) = self.plugins.resolve_id(request, importer, self.ctx)? {
            tracing::debug!(request, plugin = %plugin, ?resolution, "request claimed by plugin");
            return Ok(match resolution {
                Resolution::File(path) | Resolution::Substituted(path) => Target::File(path),
                Resolution::External { global } => Target::External {
                    specifier: request.to_string(),
                    global,
                },
            });
        }
        self.resolver.resolve(request, importer).map(Target::File)
    }
}

fn read_error(path: &Path, error: RuntimeError) -> Error {
    let kind = match error {
        RuntimeError::FileNotFound(_) => std::io::ErrorKind::NotFound,
        RuntimeError::InvalidUtf8(_) => std::io::ErrorKind::InvalidData,
        RuntimeError::Io { .. } => std::io::ErrorKind::Other,
    };
    Error::io(path, std::io::Error::new(kind, error.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::test_support::context;
    use crate::plugins::{ExternalsPlugin, SubstitutionPlugin, SubstitutionRule};
    use crate::transforms::TransformRegistry;
    use kite_config::{BuildMode, default_rules};
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn walk(root: &Path, plugins: &PluginRegistry, entry: &str) -> std::result::Result<ModuleGraph, BuildError> {
        let ctx = context(root, BuildMode::Development);
        let resolver = ModuleResolver::new(
            root,
            vec![".js".into(), ".json".into(), ".ts".into()],
            Arc::clone(&ctx.runtime),
        )
        .with_module_dir_name("node_modules");
        let dispatch =
            DispatchTable::from_rules(&default_rules(), root, &TransformRegistry::with_builtins())
                .unwrap();
        GraphWalker::new(&ctx, plugins, &resolver, &dispatch).walk(&[root.join(entry)])
    }

    #[test]
    fn discovers_modules_breadth_first_without_duplicates() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "client/main.ts", "import './a';\nimport './b';\n");
        write(root, "client/a.ts", "import './shared';\n");
        write(root, "client/b.ts", "import './shared';\nimport './style.css';\n");
        write(root, "client/shared.ts", "export const x = 1;\n");
        write(root, "client/style.css", ".x{}");

        let graph = walk(root, &PluginRegistry::new(), "client/main.ts").unwrap();
        assert_eq!(
            graph.keys(),
            [
                "client/main.ts",
                "client/a.ts",
                "client/b.ts",
                "client/shared.ts",
                "client/style.css"
            ]
        );
        let b = graph.by_key("client/b.ts").unwrap();
        assert_eq!(b.dependencies, [ModuleId(3), ModuleId(4)]);
        assert_eq!(graph.entries(), [ModuleId(0)]);
    }

    #[test]
    fn unresolvable_import_fails_in_resolve_stage() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "client/main.ts", "import './missing';\n");

        let err = walk(dir.path(), &PluginRegistry::new(), "client/main.ts").unwrap_err();
        assert_eq!(err.stage, Stage::Resolve);
        assert!(matches!(err.error, Error::Resolution { ref request, .. } if request == "./missing"));
    }

    #[test]
    fn module_without_rule_fails_in_resolve_stage() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "client/main.ts", "import './logo.svg';\n");
        write(dir.path(), "client/logo.svg", "<svg/>");

        let err = walk(dir.path(), &PluginRegistry::new(), "client/main.ts").unwrap_err();
        assert_eq!(err.stage, Stage::Resolve);
        assert!(matches!(err.error, Error::NoMatchingRule { .. }));
    }

    #[test]
    fn substituted_request_never_reaches_the_original() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "client/main.ts", "import debug from 'debug';\n");
        write(root, "scripts/noop.js", "module.exports = function () {};\n");
        // no node_modules/debug: normal lookup would fail

        let mut plugins = PluginRegistry::new();
        plugins.add(SubstitutionPlugin::new(vec![
            SubstitutionRule::new("debug", root.join("scripts/noop.js"), None).unwrap(),
        ]));

        let graph = walk(root, &plugins, "client/main.ts").unwrap();
        assert_eq!(graph.keys(), ["client/main.ts", "scripts/noop.js"]);
    }

    #[test]
    fn externals_become_synthetic_modules() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "client/main.ts", "const JSON3 = require('json3');\n");

        let mut plugins = PluginRegistry::new();
        plugins.add(ExternalsPlugin::new([("json3".to_string(), "JSON".to_string())]));

        let graph = walk(dir.path(), &plugins, "client/main.ts").unwrap();
        let external = graph.by_key("external:json3").unwrap();
        assert!(external.is_external());
        assert_eq!(external.source, "module.exports = JSON;\n");
    }
}
