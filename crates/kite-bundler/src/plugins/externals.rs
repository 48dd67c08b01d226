//! Externals: requests bound to globals instead of bundled modules.

use std::borrow::Cow;
use std::path::Path;

use indexmap::IndexMap;

use super::{Phase, PipelineContext, Plugin, Resolution};
use crate::Result;

/// Maps exact request strings to global expressions (`json3` → `JSON`).
#[derive(Debug, Clone, Default)]
pub struct ExternalsPlugin {
    externals: IndexMap<String, String>,
}

impl ExternalsPlugin {
    pub fn new(externals: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            externals: externals.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.externals.is_empty()
    }
}

impl Plugin for ExternalsPlugin {
    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("kite:externals")
    }

    fn phase(&self) -> Phase {
        Phase::Resolve
    }

    fn resolve_id(
        &self,
        request: &str,
        _importer: &Path,
        _ctx: &PipelineContext,
    ) -> Result<Option<Resolution>> {
        Ok(self
            .externals
            .get(request)
            .map(|global| Resolution::External {
                global: global.clone(),
            }))
    }
}
