//! Chunk rendering.
//!
//! A chunk is the concatenation of its modules' transformed code in
//! discovery order, each preceded by a `/* <module key> */` marker.
//! Modules whose code is empty (extracted styles, composite modules) are
//! left out of the code but kept in the source list.

use serde::Serialize;

use crate::module::Module;

use super::{ChunkKind, RenderedChunk};

/// Original content of one chunk member, for source maps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSource {
    pub key: String,
    pub content: String,
}

pub fn render_chunk(
    kind: ChunkKind,
    name: &str,
    file_name: &str,
    modules: &[&Module],
) -> RenderedChunk {
    let mut code = String::new();
    let mut sources = Vec::with_capacity(modules.len());

    for module in modules {
        sources.push(ChunkSource {
            key: module.key.clone(),
            content: module.source.clone(),
        });
        if module.code.trim().is_empty() {
            continue;
        }
        code.push_str("/* ");
        code.push_str(&module.key);
        code.push_str(" */\n");
        code.push_str(module.code.trim_end());
        code.push('\n');
    }

    RenderedChunk {
        kind,
        name: name.to_string(),
        file_name: file_name.to_string(),
        code,
        sources,
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SourceMapV3<'a> {
    version: u8,
    file: &'a str,
    sources: Vec<&'a str>,
    sources_content: Vec<&'a str>,
    names: [&'a str; 0],
    mappings: &'a str,
}

/// A version 3 source map listing the chunk's original sources.
///
/// Mappings are left empty: browsers show the sources but cannot map
/// positions.
pub fn source_map(file: &str, sources: &[ChunkSource]) -> String {
    let map = SourceMapV3 {
        version: 3,
        file,
        sources: sources.iter().map(|s| s.key.as_str()).collect(),
        sources_content: sources.iter().map(|s| s.content.as_str()).collect(),
        names: [],
        mappings: "",
    };
    serde_json::to_string(&map).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{ModuleId, ModuleKind};
    use std::path::PathBuf;

    fn module(id: u32, key: &str, source: &str, code: &str) -> Module {
        Module {
            id: ModuleId(id),
            path: PathBuf::from(format!("/app/{key}")),
            key: key.to_string(),
            kind: ModuleKind::Source,
            source: source.to_string(),
            code: code.to_string(),
            dependencies: Vec::new(),
            importer: None,
        }
    }

    #[test]
    fn concatenates_with_markers_and_skips_empty_code() {
        let a = module(0, "client/a.ts", "const a: number = 1;", "const a = 1;\n\n");
        let css = module(1, "client/a.css", ".a{}", "");
        let b = module(2, "client/b.ts", "export {}", "export {};");

        let chunk = render_chunk(ChunkKind::Entry, "js/bundle.js", "js/bundle.js", &[&a, &css, &b]);
        assert_eq!(
            chunk.code,
            "/* client/a.ts */\nconst a = 1;\n/* client/b.ts */\nexport {};\n"
        );
        assert_eq!(chunk.sources.len(), 3);
    }

    #[test]
    fn source_map_carries_sources_content() {
        let sources = vec![ChunkSource {
            key: "client/a.ts".into(),
            content: "let x = 1;".into(),
        }];
        let map: serde_json::Value = serde_json::from_str(&source_map("bundle.js", &sources)).unwrap();
        assert_eq!(map["version"], 3);
        assert_eq!(map["file"], "bundle.js");
        assert_eq!(map["sources"][0], "client/a.ts");
        assert_eq!(map["sourcesContent"][0], "let x = 1;");
        assert_eq!(map["mappings"], "");
    }
}
