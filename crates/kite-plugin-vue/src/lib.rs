//! kite plugin for Vue Single File Components (SFC)
//!
//! A `.vue` file is not a module any rule can transform. In the parse
//! phase this plugin claims it and splits it into parts that enter the
//! module graph as ordinary modules next to the component:
//!
//! ```text
//! App.vue ──parse──▶ App.vue.ts    (script blocks, `lang` picks the extension)
//!                    App.vue.html  (template)
//!                    App.vue.css   (first style block)
//!                    App.vue.1.css (further style blocks)
//! ```
//!
//! Each part is then dispatched by its extension, so the configured script,
//! template and style rules apply unchanged.
//!
//! ## Multiple scripts
//!
//! A component may have one `<script>` and one `<script setup>`. Both go
//! into one script part with the setup script first.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use kite_bundler::{BuildMode, Bundler, KiteConfig};
//! use kite_plugin_vue::VuePlugin;
//!
//! let manifest = Bundler::new(KiteConfig::default(), BuildMode::Production)
//!     .plugin(VuePlugin::new())
//!     .build()?;
//! # Ok::<(), kite_bundler::BuildError>(())
//! ```

pub mod sfc;

pub use sfc::{BlockKind, SfcBlock, SfcDescriptor, SfcError, parse_sfc};

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use kite_bundler::resolver::with_appended_extension;
use kite_bundler::{
    Error, ModulePart, ParseInput, PartKind, Phase, PipelineContext, Plugin, Result,
};

/// Script of a component without any `<script>` block.
const EMPTY_COMPONENT: &str = "export default {};\n";

/// Parse-phase plugin that splits `.vue` files into parts.
#[derive(Debug, Clone, Copy, Default)]
pub struct VuePlugin;

impl VuePlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Plugin for VuePlugin {
    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("kite:vue")
    }

    fn phase(&self) -> Phase {
        Phase::Parse
    }

    fn parse(&self, input: &ParseInput<'_>, _ctx: &PipelineContext) -> Result<Option<Vec<ModulePart>>> {
        if input.path.extension().is_none_or(|ext| ext != "vue") {
            return Ok(None);
        }

        let sfc = parse_sfc(input.source)
            .map_err(|e| Error::plugin(self.name(), format!("{}: {e}", input.path.display())))?;
        if sfc.styles.iter().any(|s| s.scoped) {
            tracing::warn!(
                component = %input.path.display(),
                "scoped styles are emitted without scoping"
            );
        }
        Ok(Some(component_parts(input.path, &sfc)))
    }
}

/// Parts of the component at `path`: script, template, then styles.
pub fn component_parts(path: &Path, sfc: &SfcDescriptor<'_>) -> Vec<ModulePart> {
    let mut parts = Vec::with_capacity(2 + sfc.styles.len());

    let (code, lang) = combine_scripts(sfc);
    parts.push(ModulePart::new(
        part_path(path, None, lang),
        code,
        PartKind::Script,
    ));

    if let Some(template) = &sfc.template {
        parts.push(ModulePart::new(
            part_path(path, None, template.lang_or_default()),
            template.content,
            PartKind::Template,
        ));
    }

    for (index, style) in sfc.styles.iter().enumerate() {
        let slot = (index > 0).then_some(index);
        parts.push(ModulePart::new(
            part_path(path, slot, style.lang_or_default()),
            style.content,
            PartKind::Style,
        ));
    }

    parts
}

/// `<script setup>` first, then `<script>`; the result takes the stronger
/// of the two languages.
fn combine_scripts(sfc: &SfcDescriptor<'_>) -> (String, &'static str) {
    let blocks: Vec<&SfcBlock<'_>> = sfc.script_setup().into_iter().chain(sfc.script()).collect();
    if blocks.is_empty() {
        return (EMPTY_COMPONENT.to_string(), "js");
    }

    let mut combined = String::new();
    let mut lang = "js";
    for block in blocks {
        if !combined.is_empty() {
            combined.push_str("\n\n");
        }
        combined.push_str(block.content.trim_matches('\n'));
        lang = choose_stronger_lang(lang, normalize_lang(block.lang_or_default()));
    }
    combined.push('\n');
    (combined, lang)
}

fn normalize_lang(lang: &str) -> &'static str {
    match lang {
        "ts" | "typescript" => "ts",
        "tsx" => "tsx",
        "jsx" => "jsx",
        _ => "js",
    }
}

/// Hierarchy: tsx > jsx > ts > js
fn choose_stronger_lang(a: &'static str, b: &'static str) -> &'static str {
    let strength = |lang: &str| match lang {
        "tsx" => 4,
        "jsx" => 3,
        "ts" => 2,
        _ => 1,
    };
    if strength(a) >= strength(b) { a } else { b }
}

fn part_path(component: &Path, slot: Option<usize>, ext: &str) -> PathBuf {
    let suffix = match slot {
        Some(slot) => format!(".{slot}.{ext}"),
        None => format!(".{ext}"),
    };
    with_appended_extension(component, &suffix)
}
