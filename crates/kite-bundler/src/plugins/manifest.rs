//! `manifest.json` output.

use std::borrow::Cow;

use super::{Phase, PipelineContext, Plugin};
use crate::output::{FileKind, OutputBundle};
use crate::{Error, Result};

pub const MANIFEST_FILE: &str = "manifest.json";

/// Writes the list of emitted files as JSON. Register after
/// [`super::ChunkNamingPlugin`] so final names are recorded.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestPlugin;

impl Plugin for ManifestPlugin {
    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("kite:manifest")
    }

    fn phase(&self) -> Phase {
        Phase::Finalize
    }

    fn finalize(&self, bundle: &mut OutputBundle, _ctx: &PipelineContext) -> Result<()> {
        let manifest = bundle.manifest();
        let json = serde_json::to_vec_pretty(&manifest).map_err(|e| Error::plugin(self.name(), e))?;
        bundle.emit_asset(MANIFEST_FILE, json, FileKind::Manifest);
        Ok(())
    }
}
