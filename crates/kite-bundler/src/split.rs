//! Code-splitting policy.
//!
//! A module whose path has a component equal to the vendor directory name
//! (`node_modules`) goes to the vendor chunk; every other module stays in
//! the entry chunk. Assignment looks at the path only.

use std::ffi::OsString;
use std::path::{Component, Path};

use kite_config::SplitConfig;

use crate::graph::ModuleGraph;
use crate::module::ModuleId;
use crate::output::{ChunkKind, RenderedChunk, render_chunk};

#[derive(Debug, Clone)]
pub struct SplitPolicy {
    vendor_dir: OsString,
}

impl SplitPolicy {
    pub fn new(vendor_dir: impl Into<OsString>) -> Self {
        Self {
            vendor_dir: vendor_dir.into(),
        }
    }

    pub fn from_config(config: &SplitConfig) -> Self {
        Self::new(&config.vendor_dir)
    }

    pub fn assign(&self, path: &Path) -> ChunkKind {
        let vendored = path
            .components()
            .any(|c| matches!(c, Component::Normal(name) if name == self.vendor_dir.as_os_str()));
        if vendored {
            ChunkKind::Vendor
        } else {
            ChunkKind::Entry
        }
    }

    /// Partitions the graph, keeping discovery order inside each chunk.
    pub fn partition(&self, graph: &ModuleGraph) -> ChunkPlan {
        let mut plan = ChunkPlan::default();
        for module in graph.iter() {
            match self.assign(&module.path) {
                ChunkKind::Entry => plan.entry.push(module.id),
                ChunkKind::Vendor => plan.vendor.push(module.id),
            }
        }
        plan
    }
}

/// Module membership of each chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkPlan {
    pub entry: Vec<ModuleId>,
    pub vendor: Vec<ModuleId>,
}

/// Renders the planned chunks. The vendor chunk is left out when no
/// vendor module contributes code.
pub fn render_chunks(
    graph: &ModuleGraph,
    plan: &ChunkPlan,
    entry_name: &str,
    config: &SplitConfig,
) -> Vec<RenderedChunk> {
    let members = |ids: &[ModuleId]| ids.iter().filter_map(|id| graph.get(*id)).collect::<Vec<_>>();

    let mut chunks = vec![render_chunk(
        ChunkKind::Entry,
        entry_name,
        &config.entry_chunk,
        &members(&plan.entry),
    )];

    let vendor = render_chunk(
        ChunkKind::Vendor,
        entry_name,
        &config.vendor_chunk,
        &members(&plan.vendor),
    );
    if !vendor.code.is_empty() {
        chunks.push(vendor);
    }
    chunks
}
