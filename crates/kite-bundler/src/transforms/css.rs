//! Stylesheet transforms backed by lightningcss.

use std::path::Path;

use lightningcss::printer::PrinterOptions;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, StyleSheet};

use super::{Transform, TransformContext, TransformFailure, TransformResult};

/// Parses and reprints a stylesheet. Rejects invalid CSS.
///
/// The `url`, `importLoaders` and `sourceMap` options are accepted and
/// ignored; `url()` references and `@import` rules are left as written.
#[derive(Debug, Clone, Copy, Default)]
pub struct CssTransform;

impl Transform for CssTransform {
    fn name(&self) -> &str {
        "css"
    }

    fn transform(&self, input: &str, ctx: &TransformContext<'_>) -> TransformResult {
        let minify = ctx.bool_option("minify", ctx.mode.minify());
        process_css(ctx.path, input, false, minify)
    }
}

/// Optimizing pass: merges rules and shorthands in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostCssTransform;

impl Transform for PostCssTransform {
    fn name(&self) -> &str {
        "postcss"
    }

    fn transform(&self, input: &str, ctx: &TransformContext<'_>) -> TransformResult {
        let minify = ctx.bool_option("minify", ctx.mode.minify());
        process_css(ctx.path, input, minify, minify)
    }
}

fn process_css(path: &Path, source: &str, optimize: bool, minify: bool) -> TransformResult {
    let mut stylesheet = StyleSheet::parse(
        source,
        ParserOptions {
            filename: path.to_string_lossy().to_string(),
            ..Default::default()
        },
    )
    .map_err(TransformFailure::new)?;

    if optimize {
        stylesheet
            .minify(MinifyOptions::default())
            .map_err(TransformFailure::new)?;
    }

    let result = stylesheet
        .to_css(PrinterOptions {
            minify,
            ..Default::default()
        })
        .map_err(TransformFailure::new)?;

    Ok(result.code)
}
