use crate::parser::{Extraction, Origin, Segment, SegmentKind};
use serde_json::Value;

/// Inserted between blocks that produced text
pub const BLOCK_SEPARATOR: &str = "\n\n";

/// Block types that never carry prose
pub const MEDIA_BLOCK_TYPES: &[&str] = &["image", "table", "carouselBlock", "videoBlock"];

/// Parse a portable text JSON document and extract it; bad JSON yields nothing
pub fn extract_str(content: &str) -> Extraction {
    match serde_json::from_str::<Value>(content) {
        Ok(document) => extract(&document),
        Err(_) => Extraction::default(),
    }
}

/// Flatten a portable text document (an array of blocks) into a single string.
///
/// Code and media blocks are skipped. Span segments are emitted before the
/// block segment that contains them, and blocks that produce only whitespace
/// leave no trace in the output.
pub fn extract(document: &Value) -> Extraction {
    let Some(blocks) = document.as_array() else {
        return Extraction::default();
    };

    let mut out = Extraction::default();
    let mut offset = 0;

    for (block_index, block) in blocks.iter().enumerate() {
        let separator = if out.text.is_empty() {
            0
        } else {
            BLOCK_SEPARATOR.chars().count()
        };

        let mut cursor = Cursor::at(offset + separator);
        if !visit_block(block, block_index, &mut cursor) {
            continue;
        }

        if separator > 0 {
            out.text.push_str(BLOCK_SEPARATOR);
        }
        out.text.push_str(&cursor.text);
        out.segments.append(&mut cursor.segments);
        offset = cursor.offset;
    }

    out
}

/// Text and segments accumulated while walking one block
struct Cursor {
    text: String,
    offset: usize,
    segments: Vec<Segment>,
}

impl Cursor {
    fn at(offset: usize) -> Self {
        Self {
            text: String::new(),
            offset,
            segments: Vec::new(),
        }
    }
}

/// Returns true when the block produced visible text into `cursor`
fn visit_block(block: &Value, block_index: usize, cursor: &mut Cursor) -> bool {
    if !block.is_object() || should_skip_block(block) {
        return false;
    }

    // Unknown block types still count as text when they carry children
    let Some(children) = block.get("children").and_then(Value::as_array) else {
        return false;
    };

    let block_start = cursor.offset;
    for (child_index, child) in children.iter().enumerate() {
        visit_child(child, block_index, vec![child_index], cursor);
    }

    if cursor.text.trim().is_empty() {
        return false;
    }

    let style = block
        .get("style")
        .and_then(Value::as_str)
        .unwrap_or("normal")
        .to_string();

    cursor.segments.push(Segment {
        kind: SegmentKind::Block,
        text: cursor.text.clone(),
        start: block_start,
        end: cursor.offset,
        origin: Origin::Block { block: block_index },
        style: Some(style),
        marks: Vec::new(),
    });

    true
}

fn visit_child(child: &Value, block_index: usize, path: Vec<usize>, cursor: &mut Cursor) {
    if !child.is_object() {
        return;
    }

    let child_type = child.get("_type").and_then(Value::as_str);
    let text = child.get("text").and_then(Value::as_str).unwrap_or("");

    if child_type == Some("span") && !text.is_empty() {
        let len = text.chars().count();
        cursor.segments.push(Segment {
            kind: SegmentKind::Span,
            text: text.to_string(),
            start: cursor.offset,
            end: cursor.offset + len,
            origin: Origin::Span {
                block: block_index,
                path,
            },
            style: None,
            marks: marks_of(child),
        });
        cursor.text.push_str(text);
        cursor.offset += len;
        return;
    }

    if let Some(nested) = child.get("children").and_then(Value::as_array) {
        for (nested_index, nested_child) in nested.iter().enumerate() {
            let mut nested_path = path.clone();
            nested_path.push(nested_index);
            visit_child(nested_child, block_index, nested_path, cursor);
        }
    }
}

fn marks_of(child: &Value) -> Vec<String> {
    child
        .get("marks")
        .and_then(Value::as_array)
        .map(|marks| {
            marks
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Code blocks, media blocks and blocks carrying a code mark definition
pub fn should_skip_block(block: &Value) -> bool {
    let block_type = block.get("_type").and_then(Value::as_str).unwrap_or("");
    let style = block.get("style").and_then(Value::as_str).unwrap_or("");

    if style == "code" || block_type == "code" {
        return true;
    }

    if MEDIA_BLOCK_TYPES.contains(&block_type) {
        return true;
    }

    block
        .get("markDefs")
        .and_then(Value::as_array)
        .is_some_and(|defs| {
            defs.iter()
                .any(|def| def.get("_type").and_then(Value::as_str) == Some("code"))
        })
}
