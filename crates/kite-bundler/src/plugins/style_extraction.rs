//! Consolidated stylesheet output.

use std::borrow::Cow;

use super::{Phase, PipelineContext, Plugin};
use crate::Result;
use crate::output::{FileKind, OutputBundle};

/// Writes every style registered with the collector to one file.
#[derive(Debug, Clone)]
pub struct StyleExtractionPlugin {
    filename: String,
}

impl StyleExtractionPlugin {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
        }
    }
}

impl Plugin for StyleExtractionPlugin {
    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("kite:style-extraction")
    }

    fn phase(&self) -> Phase {
        Phase::Emit
    }

    fn emit(&self, bundle: &mut OutputBundle, ctx: &PipelineContext) -> Result<()> {
        if ctx.styles.is_empty() {
            tracing::debug!("no styles to extract");
            return Ok(());
        }
        let css = ctx.styles.collect();
        tracing::debug!(modules = ctx.styles.len(), bytes = css.len(), file = %self.filename, "styles extracted");
        bundle.emit_asset(self.filename.clone(), css, FileKind::Stylesheet);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::test_support::context;
    use kite_config::BuildMode;
    use std::path::Path;

    #[test]
    fn emits_one_stylesheet_in_module_order() {
        let ctx = context(Path::new("/app"), BuildMode::Production);
        ctx.styles.register(3, "client/b.css", ".b{}");
        ctx.styles.register(1, "client/a.css", ".a{}");

        let mut bundle = OutputBundle::default();
        StyleExtractionPlugin::new("css/style.css")
            .emit(&mut bundle, &ctx)
            .unwrap();

        assert_eq!(bundle.assets.len(), 1);
        assert_eq!(bundle.assets[0].file_name, "css/style.css");
        assert_eq!(bundle.assets[0].source, b".a{}\n.b{}\n");
    }

    #[test]
    fn nothing_is_emitted_without_styles() {
        let ctx = context(Path::new("/app"), BuildMode::Production);
        let mut bundle = OutputBundle::default();
        StyleExtractionPlugin::new("css/style.css")
            .emit(&mut bundle, &ctx)
            .unwrap();
        assert!(bundle.assets.is_empty());
    }
}
