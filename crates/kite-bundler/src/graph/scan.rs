//! Import request extraction.
//!
//! Parses a script with oxc and collects its module requests: static
//! `import`/`export ... from`, side-effect `import "x"`, `require("x")`
//! and `import("x")` with a string literal. Type-only imports and exports
//! are skipped.

use std::path::Path;

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    Argument, CallExpression, ExportAllDeclaration, ExportNamedDeclaration, Expression,
    ImportDeclaration, ImportExpression,
};
use oxc_ast_visit::{Visit, walk};
use oxc_parser::Parser;
use oxc_span::SourceType;

use crate::transforms::source_type_for;

const SCRIPT_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "ts", "mts", "cts", "tsx", "jsx"];

/// Whether requests are scanned in files with this path.
pub fn is_script_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SCRIPT_EXTENSIONS.contains(&ext))
}

/// Requests of the script at `path`, in source order, each listed once.
///
/// Syntax errors are not reported here; the script transform reports them
/// when the module is compiled. Plain JavaScript that fails to parse as a
/// module is retried as a classic script.
pub fn scan_imports(source: &str, path: &Path) -> Vec<String> {
    let source_type = source_type_for(path);
    let mut requests = collect(source, source_type);
    if requests.is_none() && !source_type.is_typescript() {
        requests = collect(source, SourceType::cjs());
    }
    requests.unwrap_or_default()
}

/// `None` when the parse reported errors.
fn collect(source: &str, source_type: SourceType) -> Option<Vec<String>> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, source_type).parse();
    if !ret.errors.is_empty() {
        return None;
    }
    let mut collector = RequestCollector::default();
    collector.visit_program(&ret.program);
    Some(collector.requests)
}

#[derive(Default)]
struct RequestCollector {
    requests: Vec<String>,
}

impl RequestCollector {
    fn push(&mut self, request: &str) {
        if !self.requests.iter().any(|r| r == request) {
            self.requests.push(request.to_string());
        }
    }
}

impl<'a> Visit<'a> for RequestCollector {
    fn visit_import_declaration(&mut self, it: &ImportDeclaration<'a>) {
        if !it.import_kind.is_type() {
            self.push(it.source.value.as_str());
        }
    }

    fn visit_export_named_declaration(&mut self, it: &ExportNamedDeclaration<'a>) {
        if let Some(source) = it.source.as_ref().filter(|_| !it.export_kind.is_type()) {
            self.push(source.value.as_str());
        }
        walk::walk_export_named_declaration(self, it);
    }

    fn visit_export_all_declaration(&mut self, it: &ExportAllDeclaration<'a>) {
        if !it.export_kind.is_type() {
            self.push(it.source.value.as_str());
        }
    }

    fn visit_import_expression(&mut self, it: &ImportExpression<'a>) {
        if let Expression::StringLiteral(lit) = &it.source {
            self.push(lit.value.as_str());
        }
        walk::walk_import_expression(self, it);
    }

    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        if let (Expression::Identifier(callee), [Argument::StringLiteral(lit)]) =
            (&it.callee, it.arguments.as_slice())
        {
            if callee.name.as_str() == "require" {
                self.push(lit.value.as_str());
            }
        }
        walk::walk_call_expression(self, it);
    }
}
