//! JSON modules.

use serde_json::Value;

use super::{Transform, TransformContext, TransformFailure, TransformResult};

/// Validates JSON and re-exports it as the module's default export.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTransform;

impl Transform for JsonTransform {
    fn name(&self) -> &str {
        "json"
    }

    fn transform(&self, input: &str, _ctx: &TransformContext<'_>) -> TransformResult {
        let value: Value = serde_json::from_str(input).map_err(TransformFailure::new)?;
        let body = serde_json::to_string(&value).map_err(TransformFailure::new)?;
        Ok(format!("export default {body};\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transforms::test_support::run;
    use kite_config::BuildMode;

    #[test]
    fn exports_compact_json() {
        let (out, _) = run(
            &JsonTransform,
            "{\n  \"name\": \"thelounge\",\n  \"port\": 9000\n}",
            BuildMode::Development,
            Value::Null,
        );
        assert_eq!(
            out.unwrap(),
            "export default {\"name\":\"thelounge\",\"port\":9000};\n"
        );
    }

    #[test]
    fn invalid_json_fails_with_location() {
        let (out, _) = run(&JsonTransform, "{ \"a\": }", BuildMode::Development, Value::Null);
        assert!(out.unwrap_err().diagnostic.contains("line 1"));
    }
}
