pub mod markdown;
pub mod plaintext;
pub mod portable_text;
pub mod rendered;

use crate::FlaggedMatch;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    PortableText,
    Markdown,
    PlainText,
}

impl FileType {
    /// Detect file type from extension
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "json" => FileType::PortableText,
            "md" | "mdx" | "markdown" => FileType::Markdown,
            _ => FileType::PlainText,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Block,
    Span,
    /// A text leaf of a rendered container
    Node,
}

/// Where a segment came from in the source structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Origin {
    Block { block: usize },
    /// `path` is the child index followed by any nested child indices
    Span { block: usize, path: Vec<usize> },
    /// Child indices from the container root down to the text leaf
    Node { path: Vec<usize> },
}

impl Origin {
    /// Identifier of the rendered element backing this origin
    pub fn element_id(&self) -> String {
        match self {
            Origin::Block { block } => format!("block-{}", block),
            Origin::Span { block, path } => format!("span-{}-{}", block, join_path(path)),
            Origin::Node { path } => format!("node-{}", join_path(path)),
        }
    }

    /// Attribute query to try when no element carries `element_id()`
    pub fn fallback_selector(&self) -> String {
        match self {
            Origin::Block { block } => format!("[data-block=\"{}\"]", block),
            Origin::Span { block, path } => {
                format!("[data-span=\"{}-{}\"]", block, join_path(path))
            }
            Origin::Node { path } => format!("[data-node=\"{}\"]", join_path(path)),
        }
    }
}

fn join_path(path: &[usize]) -> String {
    path.iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("-")
}

/// A range of the flat text mapped back to its structural origin.
///
/// `start`/`end` are half-open offsets counted in `char`s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub origin: Origin,
    /// Block style (`normal`, `h2`, ...) for block segments
    pub style: Option<String>,
    /// Inline marks for span segments
    pub marks: Vec<String>,
}

impl Segment {
    pub fn contains(&self, position: usize) -> bool {
        position >= self.start && position < self.end
    }
}

/// The whitespace-delimited token around a position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordAt {
    pub word: String,
    pub start: usize,
    pub end: usize,
}

/// Result of one extraction run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub text: String,
    pub segments: Vec<Segment>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Length of the flat text in chars
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// First segment whose range contains `position`
    pub fn segment_at(&self, position: usize) -> Option<&Segment> {
        self.segments.iter().find(|s| s.contains(position))
    }

    /// Segment a flagged match starts in
    pub fn locate(&self, flagged: &FlaggedMatch) -> Option<&Segment> {
        self.segment_at(flagged.start)
    }

    /// Slice of the flat text by char offsets
    pub fn slice(&self, start: usize, end: usize) -> &str {
        char_slice(&self.text, start, end)
    }
}

/// Locate the whitespace-delimited token of `segment` surrounding `position`.
///
/// Tokens never extend past the segment's own text.
pub fn word_at(segment: &Segment, position: usize) -> Option<WordAt> {
    if position < segment.start || position > segment.end {
        return None;
    }

    let chars: Vec<char> = segment.text.chars().collect();
    let local = (position - segment.start).min(chars.len());

    let word_start = chars[..local]
        .iter()
        .rposition(|c| c.is_whitespace())
        .map(|i| i + 1)
        .unwrap_or(0);
    let word_end = chars[local..]
        .iter()
        .position(|c| c.is_whitespace())
        .map(|i| local + i)
        .unwrap_or(chars.len());

    Some(WordAt {
        word: chars[word_start..word_end].iter().collect(),
        start: segment.start + word_start,
        end: segment.start + word_end,
    })
}

/// Slice a string by char offsets, clamping out-of-range bounds
pub fn char_slice(text: &str, start: usize, end: usize) -> &str {
    let byte_at = |n: usize| {
        text.char_indices()
            .nth(n)
            .map(|(i, _)| i)
            .unwrap_or(text.len())
    };
    let start = byte_at(start);
    let end = byte_at(end).max(start);
    &text[start..end]
}

/// Extract a file's checkable text according to its type
pub fn parse_file(path: &Path, content: &str) -> Extraction {
    match FileType::from_path(path) {
        FileType::PortableText => portable_text::extract_str(content),
        FileType::Markdown => rendered::extract(&markdown::render(content)),
        FileType::PlainText => portable_text::extract(&plaintext::to_document(content)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn span(text: &str, start: usize) -> Segment {
        Segment {
            kind: SegmentKind::Span,
            text: text.to_string(),
            start,
            end: start + text.chars().count(),
            origin: Origin::Span {
                block: 0,
                path: vec![0],
            },
            style: None,
            marks: Vec::new(),
        }
    }

    #[test]
    fn test_file_type_detection() {
        assert_eq!(
            FileType::from_path(&PathBuf::from("post.json")),
            FileType::PortableText
        );
        assert_eq!(
            FileType::from_path(&PathBuf::from("README.md")),
            FileType::Markdown
        );
        assert_eq!(
            FileType::from_path(&PathBuf::from("notes.txt")),
            FileType::PlainText
        );
    }

    #[test]
    fn test_word_at_finds_surrounding_token() {
        let segment = span("hello wrold today", 10);
        let found = word_at(&segment, 10 + 8).unwrap();
        assert_eq!(found.word, "wrold");
        assert_eq!(found.start, 16);
        assert_eq!(found.end, 21);
    }

    #[test]
    fn test_word_at_segment_edges() {
        let segment = span("hello wrold today", 0);
        assert_eq!(word_at(&segment, 0).unwrap().word, "hello");
        assert_eq!(word_at(&segment, 16).unwrap().word, "today");
        assert!(word_at(&segment, 40).is_none());
    }

    #[test]
    fn test_element_ids() {
        assert_eq!(Origin::Block { block: 3 }.element_id(), "block-3");
        let nested = Origin::Span {
            block: 1,
            path: vec![2, 0],
        };
        assert_eq!(nested.element_id(), "span-1-2-0");
        assert_eq!(nested.fallback_selector(), "[data-span=\"1-2-0\"]");
    }

    #[test]
    fn test_char_slice_multibyte() {
        assert_eq!(char_slice("café au lait", 3, 6), "é a");
        assert_eq!(char_slice("abc", 2, 10), "c");
        assert_eq!(char_slice("abc", 5, 10), "");
    }
}
