//! Style extraction into a single stylesheet.

use parking_lot::Mutex;

use super::{Transform, TransformContext, TransformResult};

#[derive(Debug, Clone, PartialEq, Eq)]
struct CollectedStyle {
    order: usize,
    module_key: String,
    css: String,
}

/// Gathers extracted CSS from concurrently transformed modules.
///
/// Output order follows module discovery order, not completion order.
#[derive(Debug, Default)]
pub struct StyleCollector {
    entries: Mutex<Vec<CollectedStyle>>,
}

impl StyleCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `css` for the module discovered at `order`. A second
    /// registration for the same module replaces the first.
    pub fn register(&self, order: usize, module_key: &str, css: impl Into<String>) {
        let mut entries = self.entries.lock();
        entries.retain(|e| e.module_key != module_key);
        entries.push(CollectedStyle {
            order,
            module_key: module_key.to_string(),
            css: css.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Module keys in output order.
    pub fn module_keys(&self) -> Vec<String> {
        self.sorted().into_iter().map(|e| e.module_key).collect()
    }

    /// The joined stylesheet. Each module's CSS ends with a newline unless
    /// it is empty.
    pub fn collect(&self) -> String {
        let mut out = String::new();
        for entry in self.sorted() {
            if entry.css.is_empty() {
                continue;
            }
            out.push_str(&entry.css);
            if !entry.css.ends_with('\n') {
                out.push('\n');
            }
        }
        out
    }

    fn sorted(&self) -> Vec<CollectedStyle> {
        let mut entries = self.entries.lock().clone();
        entries.sort_by_key(|e| e.order);
        entries
    }
}

/// Hands the module's CSS to the [`StyleCollector`] and leaves an empty
/// module in the script graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractCssTransform;

impl Transform for ExtractCssTransform {
    fn name(&self) -> &str {
        "extract-css"
    }

    fn transform(&self, input: &str, ctx: &TransformContext<'_>) -> TransformResult {
        ctx.styles.register(ctx.order, ctx.module_key, input);
        Ok(String::new())
    }
}
