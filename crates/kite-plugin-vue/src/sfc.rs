//! Single File Component block splitter.
//!
//! Finds the top-level `<template>`, `<script>` and `<style>` blocks of a
//! `.vue` file without parsing their content. Other top-level blocks
//! (custom blocks such as `<i18n>`) and HTML comments are skipped.

use memchr::{memchr, memmem};

/// Maximum file size in bytes (10 MB)
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Maximum number of top-level blocks
pub const MAX_BLOCKS: usize = 100;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SfcError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Too many top-level blocks: {count} found (max: {max} allowed)")]
    TooManyBlocks { count: usize, max: usize },

    #[error("Unclosed <{tag}> block starting at byte position {position}")]
    UnclosedBlock { tag: String, position: usize },

    #[error("Duplicate {what} block at byte position {position}")]
    DuplicateBlock { what: &'static str, position: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Template,
    Script,
    Style,
}

/// One top-level block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SfcBlock<'a> {
    pub kind: BlockKind,
    /// Text between the opening and closing tag.
    pub content: &'a str,
    /// Byte offset of `content` in the file.
    pub offset: usize,
    /// `lang` attribute, if present.
    pub lang: Option<&'a str>,
    /// `<script setup>`
    pub setup: bool,
    /// `<style scoped>`
    pub scoped: bool,
}

impl SfcBlock<'_> {
    /// Language with the block kind's default.
    pub fn lang_or_default(&self) -> &str {
        self.lang.unwrap_or(match self.kind {
            BlockKind::Template => "html",
            BlockKind::Script => "js",
            BlockKind::Style => "css",
        })
    }
}

/// The blocks of one component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SfcDescriptor<'a> {
    pub template: Option<SfcBlock<'a>>,
    /// At most one regular and one `setup` script.
    pub scripts: Vec<SfcBlock<'a>>,
    pub styles: Vec<SfcBlock<'a>>,
}

impl<'a> SfcDescriptor<'a> {
    pub fn script(&self) -> Option<&SfcBlock<'a>> {
        self.scripts.iter().find(|s| !s.setup)
    }

    pub fn script_setup(&self) -> Option<&SfcBlock<'a>> {
        self.scripts.iter().find(|s| s.setup)
    }
}

pub fn parse_sfc(source: &str) -> Result<SfcDescriptor<'_>, SfcError> {
    if source.len() > MAX_FILE_SIZE {
        return Err(SfcError::FileTooLarge {
            size: source.len(),
            max: MAX_FILE_SIZE,
        });
    }

    let bytes = source.as_bytes();
    let mut descriptor = SfcDescriptor::default();
    let mut pointer = 0;
    let mut count = 0;

    while let Some(rel) = memchr(b'<', &bytes[pointer..]) {
        let start = pointer + rel;

        if bytes[start..].starts_with(b"<!--") {
            pointer = match memmem::find(&bytes[start..], b"-->") {
                Some(end) => start + end + 3,
                None => bytes.len(),
            };
            continue;
        }

        let name_start = start + 1;
        let name_len = bytes[name_start..]
            .iter()
            .take_while(|b| b.is_ascii_alphanumeric() || **b == b'-')
            .count();
        if name_len == 0 {
            // closing tag or stray `<` at the top level
            pointer = name_start;
            continue;
        }
        let name = &source[name_start..name_start + name_len];
        let attrs_start = name_start + name_len;

        let unclosed = || SfcError::UnclosedBlock {
            tag: name.to_string(),
            position: start,
        };
        let tag_end = find_closing_angle(bytes, attrs_start).ok_or_else(unclosed)?;
        let attrs = &source[attrs_start..tag_end];

        count += 1;
        if count > MAX_BLOCKS {
            return Err(SfcError::TooManyBlocks {
                count,
                max: MAX_BLOCKS,
            });
        }

        let (content_start, content_end, next) = if bytes[tag_end - 1] == b'/' {
            (tag_end + 1, tag_end + 1, tag_end + 1)
        } else {
            let content_start = tag_end + 1;
            let close = format!("</{name}");
            let end = if name == "template" {
                find_template_end(bytes, content_start)
            } else {
                memmem::find(&bytes[content_start..], close.as_bytes()).map(|p| content_start + p)
            }
            .ok_or_else(unclosed)?;
            let after = find_closing_angle(bytes, end).map_or(bytes.len(), |p| p + 1);
            (content_start, end, after)
        };
        pointer = next;

        let kind = match name {
            "template" => BlockKind::Template,
            "script" => BlockKind::Script,
            "style" => BlockKind::Style,
            other => {
                tracing::trace!(block = other, "skipping custom block");
                continue;
            }
        };

        let block = SfcBlock {
            kind,
            content: &source[content_start..content_end],
            offset: content_start,
            lang: attribute(attrs, "lang"),
            setup: kind == BlockKind::Script && has_flag(attrs, "setup"),
            scoped: kind == BlockKind::Style && has_flag(attrs, "scoped"),
        };
        descriptor.push(block, start)?;
    }

    Ok(descriptor)
}

impl<'a> SfcDescriptor<'a> {
    fn push(&mut self, block: SfcBlock<'a>, position: usize) -> Result<(), SfcError> {
        match block.kind {
            BlockKind::Template => {
                if self.template.is_some() {
                    return Err(SfcError::DuplicateBlock {
                        what: "<template>",
                        position,
                    });
                }
                self.template = Some(block);
            }
            BlockKind::Script => {
                if self.scripts.iter().any(|s| s.setup == block.setup) {
                    return Err(SfcError::DuplicateBlock {
                        what: if block.setup {
                            "<script setup>"
                        } else {
                            "<script>"
                        },
                        position,
                    });
                }
                self.scripts.push(block);
            }
            BlockKind::Style => self.styles.push(block),
        }
        Ok(())
    }
}

/// Finds the closing `>` of a tag, skipping quoted attribute values.
fn find_closing_angle(bytes: &[u8], start: usize) -> Option<usize> {
    let mut in_quote = false;
    let mut quote_char = 0u8;

    for (i, &byte) in bytes[start..].iter().enumerate() {
        match byte {
            b'"' | b'\'' => {
                if !in_quote {
                    in_quote = true;
                    quote_char = byte;
                } else if byte == quote_char {
                    in_quote = false;
                }
            }
            b'>' if !in_quote => return Some(start + i),
            _ => {}
        }
    }

    None
}

/// Position of the `</template` closing the block opened before `start`.
/// Nested `<template>` elements (`v-if`, slots) are balanced.
fn find_template_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut pointer = start;

    loop {
        let open = memmem::find(&bytes[pointer..], b"<template").map(|p| pointer + p);
        let close = memmem::find(&bytes[pointer..], b"</template").map(|p| pointer + p)?;

        match open {
            Some(open) if open < close && is_tag_boundary(bytes, open + 9) => {
                let end = find_closing_angle(bytes, open + 9)?;
                if bytes[end - 1] != b'/' {
                    depth += 1;
                }
                pointer = end + 1;
            }
            Some(open) if open < close => pointer = open + 9,
            _ if depth == 0 => return Some(close),
            _ => {
                depth -= 1;
                pointer = close + 10;
            }
        }
    }
}

fn is_tag_boundary(bytes: &[u8], at: usize) -> bool {
    matches!(
        bytes.get(at),
        Some(b' ' | b'\t' | b'\n' | b'\r' | b'>' | b'/')
    )
}

/// Value of `name="..."` (or single-quoted, or bare) in an attribute list.
fn attribute<'a>(attrs: &'a str, name: &str) -> Option<&'a str> {
    let mut search = attrs;
    while let Some(pos) = search.find(name) {
        let before_ok = pos == 0
            || search[..pos]
                .chars()
                .next_back()
                .is_some_and(char::is_whitespace);
        let rest = &search[pos + name.len()..];
        if before_ok {
            if let Some(value) = rest.trim_start().strip_prefix('=') {
                return attribute_value(value.trim_start());
            }
        }
        search = rest;
    }
    None
}

fn attribute_value(value: &str) -> Option<&str> {
    let quote = value.chars().next()?;
    if quote == '"' || quote == '\'' {
        let end = value[1..].find(quote)?;
        return Some(&value[1..=end]);
    }
    let end = value
        .find(|c: char| c.is_whitespace() || c == '/')
        .unwrap_or(value.len());
    Some(&value[..end])
}

/// Whether a bare boolean attribute is present.
fn has_flag(attrs: &str, name: &str) -> bool {
    attrs
        .split(|c: char| c.is_whitespace() || c == '/')
        .any(|token| token == name || token.starts_with(&format!("{name}=")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPONENT: &str = r#"<template>
  <div class="chat">
    <template v-if="ready"><span>{{ title }}</span></template>
  </div>
</template>

<!-- <script>commented out</script> -->
<script lang="ts">
export default { name: "Chat" };
</script>

<style scoped>
.chat { color: red; }
</style>
<style lang="css">
.b { margin: 0; }
</style>
"#;

    #[test]
    fn splits_the_three_block_kinds() {
        let sfc = parse_sfc(COMPONENT).unwrap();

        let template = sfc.template.as_ref().unwrap();
        assert!(template.content.contains(r#"<template v-if="ready">"#));
        assert!(template.content.trim_end().ends_with("</div>"));

        let script = sfc.script().unwrap();
        assert_eq!(script.lang, Some("ts"));
        assert_eq!(script.content.trim(), r#"export default { name: "Chat" };"#);
        assert_eq!(&COMPONENT[script.offset..script.offset + 1], "\n");

        assert_eq!(sfc.styles.len(), 2);
        assert!(sfc.styles[0].scoped);
        assert_eq!(sfc.styles[0].lang_or_default(), "css");
        assert!(sfc.styles[1].content.contains(".b"));
    }

    #[test]
    fn setup_and_regular_scripts_coexist() {
        let sfc = parse_sfc(
            "<script>\nexport default {}\n</script>\n<script setup lang=\"ts\">\nconst n: number = 1\n</script>\n",
        )
        .unwrap();
        assert_eq!(sfc.scripts.len(), 2);
        assert!(sfc.script_setup().unwrap().content.contains("const n"));
        assert_eq!(sfc.script_setup().unwrap().lang, Some("ts"));
        assert_eq!(sfc.script().unwrap().lang_or_default(), "js");
    }

    #[test]
    fn duplicate_template_is_rejected() {
        let err = parse_sfc("<template><a/></template><template><b/></template>").unwrap_err();
        assert!(matches!(err, SfcError::DuplicateBlock { what: "<template>", .. }));
    }

    #[test]
    fn unclosed_script_is_rejected() {
        let err = parse_sfc("<script>\nlet a = 1;\n").unwrap_err();
        assert_eq!(
            err,
            SfcError::UnclosedBlock {
                tag: "script".into(),
                position: 0
            }
        );
    }

    #[test]
    fn quoted_angle_in_attribute_does_not_end_the_tag() {
        let sfc = parse_sfc("<script data-x=\"a>b\" lang='ts'>let a = 1;</script>").unwrap();
        let script = sfc.script().unwrap();
        assert_eq!(script.content, "let a = 1;");
        assert_eq!(script.lang, Some("ts"));
    }

    #[test]
    fn custom_blocks_are_skipped() {
        let sfc = parse_sfc("<i18n>{ \"en\": {} }</i18n>\n<template><p/></template>").unwrap();
        assert_eq!(sfc.template.unwrap().content, "<p/>");
        assert!(sfc.scripts.is_empty());
    }

    #[test]
    fn oversized_file_is_rejected() {
        let large = "x".repeat(MAX_FILE_SIZE + 1);
        assert!(matches!(
            parse_sfc(&large),
            Err(SfcError::FileTooLarge { .. })
        ));
    }
}
