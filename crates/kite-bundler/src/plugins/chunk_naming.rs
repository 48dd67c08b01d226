//! Final chunk file names and source maps.

use std::borrow::Cow;

use super::{Phase, PipelineContext, Plugin};
use crate::Result;
use crate::output::{FileKind, OutputBundle, RenderedChunk, source_map};

/// Hex characters of the content hash in `[contenthash]`.
const CONTENT_HASH_LEN: usize = 8;

/// Fills `[name]` and `[contenthash]` in chunk file names and, when source
/// maps are on, emits `<chunk>.map` next to each chunk.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChunkNamingPlugin;

impl Plugin for ChunkNamingPlugin {
    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("kite:chunk-naming")
    }

    fn phase(&self) -> Phase {
        Phase::Finalize
    }

    fn finalize(&self, bundle: &mut OutputBundle, ctx: &PipelineContext) -> Result<()> {
        let mut maps = Vec::new();
        for chunk in &mut bundle.chunks {
            chunk.file_name = file_name_for(chunk);
            if ctx.source_maps {
                maps.push(attach_source_map(chunk));
            }
        }
        for (file_name, map) in maps {
            bundle.emit_asset(file_name, map, FileKind::SourceMap);
        }
        Ok(())
    }
}

pub(crate) fn content_hash(code: &str) -> String {
    let hash = blake3::hash(code.as_bytes());
    hash.to_hex().as_str()[..CONTENT_HASH_LEN].to_string()
}

fn file_name_for(chunk: &RenderedChunk) -> String {
    let mut name = chunk.file_name.replace("[name]", &chunk.name);
    if name.contains("[contenthash]") {
        name = name.replace("[contenthash]", &content_hash(&chunk.code));
    }
    name
}

/// Appends the map reference and returns `(map file name, map)`.
fn attach_source_map(chunk: &mut RenderedChunk) -> (String, String) {
    let map_name = format!("{}.map", chunk.file_name);
    let base = |path: &str| path.rsplit('/').next().unwrap_or(path).to_string();

    let map = source_map(&base(&chunk.file_name), &chunk.sources);
    chunk
        .code
        .push_str(&format!("//# sourceMappingURL={}\n", base(&map_name)));
    (map_name, map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{ChunkKind, ChunkSource};
    use crate::plugins::test_support::context;
    use kite_config::BuildMode;
    use std::path::Path;

    fn chunk(template: &str) -> RenderedChunk {
        RenderedChunk {
            kind: ChunkKind::Entry,
            name: "js/bundle.js".into(),
            file_name: template.into(),
            code: "/* client/a.ts */\nlet a = 1;\n".into(),
            sources: vec![ChunkSource {
                key: "client/a.ts".into(),
                content: "let a: number = 1;".into(),
            }],
        }
    }

    #[test]
    fn fills_name_and_content_hash() {
        let ctx = context(Path::new("/app"), BuildMode::Production);
        let mut bundle = OutputBundle::default();
        bundle.chunks.push(chunk("[name]"));
        bundle.chunks.push(chunk("js/app.[contenthash].js"));

        ChunkNamingPlugin.finalize(&mut bundle, &ctx).unwrap();

        assert_eq!(bundle.chunks[0].file_name, "js/bundle.js");
        let hashed = &bundle.chunks[1].file_name;
        assert_eq!(hashed.len(), "js/app..js".len() + CONTENT_HASH_LEN);
        assert_eq!(hashed, &format!("js/app.{}.js", content_hash(&bundle.chunks[1].code)));
        assert!(bundle.assets.is_empty());
    }

    #[test]
    fn development_writes_maps() {
        let ctx = context(Path::new("/app"), BuildMode::Development);
        let mut bundle = OutputBundle::default();
        bundle.chunks.push(chunk("[name]"));

        ChunkNamingPlugin.finalize(&mut bundle, &ctx).unwrap();

        assert!(
            bundle.chunks[0]
                .code
                .ends_with("//# sourceMappingURL=bundle.js.map\n")
        );
        assert_eq!(bundle.assets[0].file_name, "js/bundle.js.map");
        assert_eq!(bundle.assets[0].kind, FileKind::SourceMap);
    }

    #[test]
    fn content_hash_depends_on_code_only() {
        assert_eq!(content_hash("a"), content_hash("a"));
        assert_ne!(content_hash("a"), content_hash("b"));
    }
}
