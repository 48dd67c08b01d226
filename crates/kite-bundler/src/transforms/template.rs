//! Markup modules.

use super::{Transform, TransformContext, TransformFailure, TransformResult};

/// Exports markup as a string constant named `template`.
///
/// In production, runs of whitespace between tags are collapsed unless the
/// `collapseWhitespace` option is `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateTransform;

impl Transform for TemplateTransform {
    fn name(&self) -> &str {
        "template"
    }

    fn transform(&self, input: &str, ctx: &TransformContext<'_>) -> TransformResult {
        let markup = if ctx.bool_option("collapseWhitespace", ctx.mode.minify()) {
            collapse_inter_tag_whitespace(input)
        } else {
            input.to_string()
        };
        let literal = serde_json::to_string(&markup).map_err(TransformFailure::new)?;
        Ok(format!("export const template = {literal};\nexport default template;\n"))
    }
}

/// Drops whitespace-only text between `>` and `<` and trims the ends.
fn collapse_inter_tag_whitespace(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut pending = String::new();
    let mut after_tag = true;

    for c in markup.chars() {
        if c.is_whitespace() {
            pending.push(c);
            continue;
        }
        if !(after_tag && c == '<') && !pending.is_empty() && !out.is_empty() {
            out.push(' ');
        }
        pending.clear();
        out.push(c);
        after_tag = c == '>';
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transforms::test_support::run;
    use kite_config::BuildMode;
    use serde_json::Value;

    #[test]
    fn exports_escaped_string() {
        let (out, _) = run(
            &TemplateTransform,
            "<div class=\"x\">\n  hi\n</div>",
            BuildMode::Development,
            Value::Null,
        );
        assert_eq!(
            out.unwrap(),
            "export const template = \"<div class=\\\"x\\\">\\n  hi\\n</div>\";\nexport default template;\n"
        );
    }

    #[test]
    fn production_collapses_whitespace_between_tags() {
        assert_eq!(
            collapse_inter_tag_whitespace("  <ul>\n    <li>a  b</li>\n  </ul>\n"),
            "<ul><li>a b</li></ul>"
        );
    }
}
