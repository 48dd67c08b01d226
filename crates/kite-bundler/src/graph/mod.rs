//! Module graph: discovery, storage and per-module transformation.

mod scan;
mod walk;

pub use scan::{is_script_path, scan_imports};
pub use walk::GraphWalker;

use std::path::Path;

use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::dispatch::DispatchTable;
use crate::error::{BuildError, Stage, StageExt};
use crate::module::{Module, ModuleId, ModuleKind};
use crate::plugins::PipelineContext;
use crate::transforms::TransformContext;

static NO_OPTIONS: serde_json::Value = serde_json::Value::Null;

/// Modules in discovery order, indexed by [`ModuleId`].
#[derive(Debug, Default, Clone)]
pub struct ModuleGraph {
    modules: Vec<Module>,
    by_key: FxHashMap<String, ModuleId>,
    entries: Vec<ModuleId>,
}

impl ModuleGraph {
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn get(&self, id: ModuleId) -> Option<&Module> {
        self.modules.get(id.index())
    }

    pub fn by_key(&self, key: &str) -> Option<&Module> {
        self.by_key.get(key).and_then(|id| self.get(*id))
    }

    pub fn contains_path(&self, root: &Path, path: &Path) -> bool {
        self.by_key
            .contains_key(&crate::module::module_key(root, path))
    }

    pub fn entries(&self) -> &[ModuleId] {
        &self.entries
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn iter(&self) -> impl Iterator<Item = &Module> {
        self.modules.iter()
    }

    /// Module keys in discovery order.
    pub fn keys(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.key.as_str()).collect()
    }

    pub(crate) fn push(&mut self, module: Module) {
        debug_assert_eq!(module.id.index(), self.modules.len());
        self.by_key.insert(module.key.clone(), module.id);
        self.modules.push(module);
    }

    pub(crate) fn mark_entry(&mut self, id: ModuleId) {
        self.entries.push(id);
    }

    /// Runs every source module through its rule's chain, concurrently.
    ///
    /// The first failure in module order is reported.
    pub fn transform(
        &mut self,
        dispatch: &DispatchTable,
        ctx: &PipelineContext,
    ) -> Result<(), BuildError> {
        let results: Vec<Result<Option<String>, BuildError>> = self
            .modules
            .par_iter()
            .map(|module| transform_module(module, dispatch, ctx))
            .collect();

        for (module, result) in self.modules.iter_mut().zip(results) {
            if let Some(code) = result? {
                module.code = code;
            }
        }
        Ok(())
    }
}

fn transform_module(
    module: &Module,
    dispatch: &DispatchTable,
    ctx: &PipelineContext,
) -> Result<Option<String>, BuildError> {
    match &module.kind {
        ModuleKind::Composite { .. } => Ok(None),
        ModuleKind::External { .. } => Ok(Some(module.source.clone())),
        ModuleKind::Source => {
            let chain = dispatch.dispatch(&module.path).stage(Stage::Transform)?;
            tracing::debug!(module = %module.key, chain = ?chain.names(), "transform");
            let transform_ctx = TransformContext {
                path: &module.path,
                module_key: &module.key,
                order: module.id.index(),
                mode: ctx.mode,
                options: &NO_OPTIONS,
                styles: &ctx.styles,
            };
            chain
                .run(module.source.clone(), transform_ctx)
                .map(Some)
                .stage(Stage::Transform)
        }
    }
}
