//! Plugin registry with execution phases.

use std::sync::Arc;

use crate::Result;
use crate::module::{ModulePart, ParseInput};
use crate::output::OutputBundle;

use super::{PipelineContext, Plugin, Resolution};

/// Plugin execution phases.
///
/// Within every hook, plugins of a lower phase run first. Registration
/// order is kept inside a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// Request interception (substitutions, externals).
    Resolve = 0,
    /// Module claiming (component splitting).
    Parse = 10,
    /// Output contribution (style extraction, asset copy).
    Emit = 20,
    /// Naming and bookkeeping of the final file set.
    Finalize = 30,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Resolve => "resolve",
            Phase::Parse => "parse",
            Phase::Emit => "emit",
            Phase::Finalize => "finalize",
        }
    }
}

/// Plugins kept in phase order.
#[derive(Default, Clone)]
pub struct PluginRegistry {
    plugins: Vec<(Phase, Arc<dyn Plugin>)>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plugin at its own phase.
    pub fn add<P: Plugin + 'static>(&mut self, plugin: P) {
        let phase = plugin.phase();
        self.add_with_phase(Arc::new(plugin), phase);
    }

    pub fn add_shared(&mut self, plugin: Arc<dyn Plugin>) {
        let phase = plugin.phase();
        self.add_with_phase(plugin, phase);
    }

    /// Add a plugin at an explicit phase, overriding its own.
    pub fn add_with_phase(&mut self, plugin: Arc<dyn Plugin>, phase: Phase) {
        // stable insertion keeps registration order within a phase
        let at = self.plugins.partition_point(|(p, _)| *p <= phase);
        self.plugins.insert(at, (phase, plugin));
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Plugin names in execution order.
    pub fn names(&self) -> Vec<String> {
        self.plugins
            .iter()
            .map(|(_, plugin)| plugin.name().into_owned())
            .collect()
    }

    pub fn resolve_id(
        &self,
        request: &str,
        importer: &std::path::Path,
        ctx: &PipelineContext,
    ) -> Result<Option<(String, Resolution)>> {
        for (_, plugin) in &self.plugins {
            if let Some(resolution) = plugin.resolve_id(request, importer, ctx)? {
                return Ok(Some((plugin.name().into_owned(), resolution)));
            }
        }
        Ok(None)
    }

    pub fn parse(
        &self,
        input: &ParseInput<'_>,
        ctx: &PipelineContext,
    ) -> Result<Option<(String, Vec<ModulePart>)>> {
        for (_, plugin) in &self.plugins {
            if let Some(parts) = plugin.parse(input, ctx)? {
                return Ok(Some((plugin.name().into_owned(), parts)));
            }
        }
        Ok(None)
    }

    pub fn emit(&self, bundle: &mut OutputBundle, ctx: &PipelineContext) -> Result<()> {
        for (_, plugin) in &self.plugins {
            tracing::debug!(plugin = %plugin.name(), "emit hook");
            plugin.emit(bundle, ctx)?;
        }
        Ok(())
    }

    pub fn finalize(&self, bundle: &mut OutputBundle, ctx: &PipelineContext) -> Result<()> {
        for (_, plugin) in &self.plugins {
            tracing::debug!(plugin = %plugin.name(), "finalize hook");
            plugin.finalize(bundle, ctx)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::test_support::context;
    use kite_config::BuildMode;
    use parking_lot::Mutex;
    use std::borrow::Cow;
    use std::path::{Path, PathBuf};

    struct Recorder {
        name: &'static str,
        phase: Phase,
        log: Arc<Mutex<Vec<String>>>,
        claims: bool,
    }

    impl Plugin for Recorder {
        fn name(&self) -> Cow<'static, str> {
            Cow::Borrowed(self.name)
        }

        fn phase(&self) -> Phase {
            self.phase
        }

        fn resolve_id(
            &self,
            request: &str,
            _importer: &Path,
            _ctx: &PipelineContext,
        ) -> Result<Option<Resolution>> {
            self.log.lock().push(format!("resolve:{}", self.name));
            Ok(self
                .claims
                .then(|| Resolution::File(PathBuf::from(format!("/{}/{request}", self.name)))))
        }

        fn emit(&self, _bundle: &mut OutputBundle, _ctx: &PipelineContext) -> Result<()> {
            self.log.lock().push(format!("emit:{}", self.name));
            Ok(())
        }
    }

    fn recorder(
        name: &'static str,
        phase: Phase,
        claims: bool,
        log: &Arc<Mutex<Vec<String>>>,
    ) -> Recorder {
        Recorder {
            name,
            phase,
            log: Arc::clone(log),
            claims,
        }
    }

    #[test]
    fn phases_order_plugins_and_registration_breaks_ties() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = PluginRegistry::new();
        registry.add(recorder("late", Phase::Finalize, false, &log));
        registry.add(recorder("first-emit", Phase::Emit, false, &log));
        registry.add(recorder("early", Phase::Resolve, false, &log));
        registry.add(recorder("second-emit", Phase::Emit, false, &log));

        assert_eq!(
            registry.names(),
            ["early", "first-emit", "second-emit", "late"]
        );

        let ctx = context(Path::new("/app"), BuildMode::Development);
        registry.emit(&mut OutputBundle::default(), &ctx).unwrap();
        assert_eq!(
            *log.lock(),
            ["emit:early", "emit:first-emit", "emit:second-emit", "emit:late"]
        );
    }

    #[test]
    fn first_claiming_resolver_wins() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = PluginRegistry::new();
        registry.add(recorder("pass", Phase::Resolve, false, &log));
        registry.add(recorder("claim", Phase::Resolve, true, &log));
        registry.add(recorder("never", Phase::Resolve, true, &log));

        let ctx = context(Path::new("/app"), BuildMode::Development);
        let (plugin, resolution) = registry
            .resolve_id("debug", Path::new("/app/a.js"), &ctx)
            .unwrap()
            .unwrap();
        assert_eq!(plugin, "claim");
        assert_eq!(resolution, Resolution::File(PathBuf::from("/claim/debug")));
        assert_eq!(*log.lock(), ["resolve:pass", "resolve:claim"]);
    }
}
