use serde_json::{json, Value};

/// Turn plain text into a portable text document, one block per paragraph.
///
/// Paragraphs are separated by blank lines; lines inside a paragraph are
/// joined with a single space.
pub fn to_document(content: &str) -> Value {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            flush(&mut current, &mut blocks);
        } else {
            current.push(line);
        }
    }
    flush(&mut current, &mut blocks);

    Value::Array(blocks)
}

fn flush(lines: &mut Vec<&str>, blocks: &mut Vec<Value>) {
    if lines.is_empty() {
        return;
    }

    let text = lines.join(" ");
    lines.clear();

    blocks.push(json!({
        "_type": "block",
        "style": "normal",
        "markDefs": [],
        "children": [{"_type": "span", "text": text, "marks": []}]
    }));
}
