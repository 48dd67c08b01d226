//! Output bundle model and file writing.

pub mod render;
pub mod writer;

pub use render::{ChunkSource, render_chunk, source_map};
pub use writer::{clean_dir, write_bundle, write_file_atomic};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which chunk of the split a module lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkKind {
    Entry,
    Vendor,
}

/// Kind of an emitted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Chunk,
    Stylesheet,
    SourceMap,
    Copied,
    Manifest,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileKind::Chunk => "chunk",
            FileKind::Stylesheet => "stylesheet",
            FileKind::SourceMap => "sourcemap",
            FileKind::Copied => "copied",
            FileKind::Manifest => "manifest",
        })
    }
}

/// A rendered script chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedChunk {
    pub kind: ChunkKind,
    /// Logical name substituted for `[name]`.
    pub name: String,
    /// Output path; may hold `[name]` / `[contenthash]` until finalized.
    pub file_name: String,
    pub code: String,
    /// Member modules in render order.
    pub sources: Vec<ChunkSource>,
}

/// A non-chunk file to be written by the write stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedAsset {
    pub file_name: String,
    pub source: Vec<u8>,
    pub kind: FileKind,
}

/// A file the copier already wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopiedFile {
    /// Root-relative source path.
    pub source: String,
    /// Output-relative destination.
    pub destination: String,
    pub size: u64,
}

/// Everything the build produces, mutated by emit and finalize hooks.
#[derive(Debug, Clone, Default)]
pub struct OutputBundle {
    pub chunks: Vec<RenderedChunk>,
    pub assets: Vec<EmittedAsset>,
    pub copied: Vec<CopiedFile>,
}

impl OutputBundle {
    pub fn chunk(&self, kind: ChunkKind) -> Option<&RenderedChunk> {
        self.chunks.iter().find(|c| c.kind == kind)
    }

    pub fn emit_asset(&mut self, file_name: impl Into<String>, source: impl Into<Vec<u8>>, kind: FileKind) {
        self.assets.push(EmittedAsset {
            file_name: file_name.into(),
            source: source.into(),
            kind,
        });
    }

    /// Every file of the bundle, sorted by path.
    pub fn manifest(&self) -> OutputManifest {
        let mut files: Vec<ManifestEntry> = self
            .chunks
            .iter()
            .map(|c| ManifestEntry {
                path: c.file_name.clone(),
                size: c.code.len() as u64,
                kind: FileKind::Chunk,
            })
            .chain(self.assets.iter().map(|a| ManifestEntry {
                path: a.file_name.clone(),
                size: a.source.len() as u64,
                kind: a.kind,
            }))
            .chain(self.copied.iter().map(|c| ManifestEntry {
                path: c.destination.clone(),
                size: c.size,
                kind: FileKind::Copied,
            }))
            .collect();
        files.sort_by(|a, b| a.path.cmp(&b.path));
        OutputManifest { files }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Output-relative path with `/` separators.
    pub path: String,
    pub size: u64,
    pub kind: FileKind,
}

/// Result of a successful build: every emitted file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputManifest {
    pub files: Vec<ManifestEntry>,
}

impl OutputManifest {
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn get(&self, path: &str) -> Option<&ManifestEntry> {
        self.files.iter().find(|f| f.path == path)
    }

    pub fn paths(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.path.as_str()).collect()
    }

    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
