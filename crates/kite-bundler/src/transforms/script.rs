//! JavaScript / TypeScript compilation with oxc.

use std::path::Path;

use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_minifier::{CompressOptions, MangleOptions, Minifier, MinifierOptions};
use oxc_parser::{Parser, ParserReturn};
use oxc_semantic::SemanticBuilder;
use oxc_span::SourceType;
use oxc_transformer::{TransformOptions, Transformer};

use super::{Transform, TransformContext, TransformFailure, TransformResult};

/// Strips TypeScript syntax and, in production, minifies.
///
/// Options: `minify` (bool, defaults to the build mode).
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptTransform;

impl Transform for ScriptTransform {
    fn name(&self) -> &str {
        "script"
    }

    fn transform(&self, input: &str, ctx: &TransformContext<'_>) -> TransformResult {
        let source_type = source_type_for(ctx.path);
        let allocator = Allocator::default();

        let ParserReturn {
            mut program,
            errors,
            ..
        } = Parser::new(&allocator, input, source_type).parse();
        if let Some(first) = errors.first() {
            return Err(TransformFailure::new(first));
        }

        if source_type.is_typescript() {
            let scoping = SemanticBuilder::new()
                .build(&program)
                .semantic
                .into_scoping();
            let options = TransformOptions::default();
            let ret = Transformer::new(&allocator, ctx.path, &options)
                .build_with_scoping(scoping, &mut program);
            if let Some(first) = ret.errors.first() {
                return Err(TransformFailure::new(first));
            }
        }

        if !ctx.bool_option("minify", ctx.mode.minify()) {
            return Ok(Codegen::new().build(&program).code);
        }

        let options = MinifierOptions {
            mangle: Some(MangleOptions::default()),
            compress: Some(CompressOptions::smallest()),
        };
        let ret = Minifier::new(options).minify(&allocator, &mut program);
        Ok(Codegen::new()
            .with_options(CodegenOptions::minify())
            .with_scoping(ret.scoping)
            .build(&program)
            .code)
    }
}

/// Source type from the file extension; unknown extensions parse as ES modules.
pub(crate) fn source_type_for(path: &Path) -> SourceType {
    SourceType::from_path(path).unwrap_or_else(|_| SourceType::mjs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transforms::test_support::run;
    use kite_config::BuildMode;
    use serde_json::{Value, json};

    #[test]
    fn strips_type_annotations() {
        let (out, _) = run(
            &ScriptTransform,
            "const n: number = 1;\nexport function twice(x: number): number { return x * 2; }\n",
            BuildMode::Development,
            Value::Null,
        );
        let code = out.unwrap();
        assert!(code.contains("function twice(x)"));
        assert!(!code.contains(": number"));
    }

    #[test]
    fn keeps_import_statements() {
        let (out, _) = run(
            &ScriptTransform,
            "import \"./a.css\";\nimport { x } from \"./x\";\nconsole.log(x);\n",
            BuildMode::Development,
            Value::Null,
        );
        let code = out.unwrap();
        assert!(code.contains("./a.css"));
        assert!(code.contains("./x"));
    }

    #[test]
    fn syntax_errors_become_failures() {
        let (out, _) = run(
            &ScriptTransform,
            "export const = ;",
            BuildMode::Development,
            Value::Null,
        );
        assert!(!out.unwrap_err().diagnostic.is_empty());
    }

    #[test]
    fn production_output_is_smaller() {
        let source = "export function greet(name) {\n    const message = 'hello ' + name;\n    return message;\n}\n";
        let (dev, _) = run(&ScriptTransform, source, BuildMode::Development, Value::Null);
        let (prod, _) = run(&ScriptTransform, source, BuildMode::Production, Value::Null);
        assert!(prod.unwrap().len() < dev.unwrap().len());
    }

    #[test]
    fn minify_option_overrides_mode() {
        let source = "export const answer   =   42;\n";
        let (out, _) = run(
            &ScriptTransform,
            source,
            BuildMode::Production,
            json!({ "minify": false }),
        );
        assert!(out.unwrap().contains("export const answer = 42;"));
    }
}
