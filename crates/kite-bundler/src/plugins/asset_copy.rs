//! Runs the copy tasks once the module graph is done.

use std::borrow::Cow;

use kite_config::KiteConfig;

use super::{Phase, PipelineContext, Plugin};
use crate::Result;
use crate::copier::{AssetCopier, CopyTask};
use crate::output::OutputBundle;

/// Copies static assets straight into the output directory.
#[derive(Debug, Clone, Default)]
pub struct AssetCopyPlugin {
    tasks: Vec<CopyTask>,
}

impl AssetCopyPlugin {
    pub fn new(tasks: Vec<CopyTask>) -> Self {
        Self { tasks }
    }

    /// Tasks from configuration, with placeholders bound to `cache_bust`.
    pub fn from_config(config: &KiteConfig, cache_bust: Option<&str>) -> Result<Self> {
        config
            .copy
            .iter()
            .map(|task| CopyTask::from_config(task, cache_bust))
            .collect::<Result<Vec<_>>>()
            .map(Self::new)
    }

    pub fn tasks(&self) -> &[CopyTask] {
        &self.tasks
    }
}

impl Plugin for AssetCopyPlugin {
    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("kite:asset-copy")
    }

    fn phase(&self) -> Phase {
        Phase::Emit
    }

    fn emit(&self, bundle: &mut OutputBundle, ctx: &PipelineContext) -> Result<()> {
        let copied = AssetCopier::new(&ctx.root, &ctx.output_dir).copy(&self.tasks)?;
        tracing::info!(files = copied.len(), tasks = self.tasks.len(), "assets copied");
        bundle.copied.extend(copied);
        Ok(())
    }
}
