use crate::parser::{Extraction, Origin, Segment, SegmentKind};
use serde::{Deserialize, Serialize};

/// Tags whose whole subtree is never checked
pub const SKIPPED_TAGS: &[&str] = &["code", "pre", "script", "style"];

/// Class fragments that mark a subtree as code
pub const SKIPPED_CLASS_FRAGMENTS: &[&str] = &["code", "highlight"];

/// Visible content of an already rendered document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RenderedNode {
    Text {
        text: String,
    },
    Element {
        tag: String,
        #[serde(default)]
        class: String,
        #[serde(default)]
        children: Vec<RenderedNode>,
    },
}

impl RenderedNode {
    pub fn text(text: impl Into<String>) -> Self {
        RenderedNode::Text { text: text.into() }
    }

    pub fn element(tag: impl Into<String>, children: Vec<RenderedNode>) -> Self {
        RenderedNode::Element {
            tag: tag.into(),
            class: String::new(),
            children,
        }
    }

    pub fn with_class(self, class: impl Into<String>) -> Self {
        match self {
            RenderedNode::Element { tag, children, .. } => RenderedNode::Element {
                tag,
                class: class.into(),
                children,
            },
            text => text,
        }
    }
}

/// Walk a rendered container depth-first and record every text leaf.
///
/// No separators are synthesised: offsets are the cumulative text length,
/// the same string the container's own text concatenation would give.
pub fn extract(root: &RenderedNode) -> Extraction {
    let mut out = Extraction::default();
    let mut offset = 0;

    match root {
        RenderedNode::Element { children, .. } => {
            walk(children, &mut Vec::new(), &mut offset, &mut out);
        }
        leaf @ RenderedNode::Text { .. } => {
            walk(std::slice::from_ref(leaf), &mut Vec::new(), &mut offset, &mut out);
        }
    }

    out
}

fn walk(nodes: &[RenderedNode], path: &mut Vec<usize>, offset: &mut usize, out: &mut Extraction) {
    for (index, node) in nodes.iter().enumerate() {
        path.push(index);
        match node {
            RenderedNode::Text { text } => {
                let len = text.chars().count();
                out.segments.push(Segment {
                    kind: SegmentKind::Node,
                    text: text.clone(),
                    start: *offset,
                    end: *offset + len,
                    origin: Origin::Node { path: path.clone() },
                    style: None,
                    marks: Vec::new(),
                });
                out.text.push_str(text);
                *offset += len;
            }
            RenderedNode::Element {
                tag,
                class,
                children,
            } => {
                if !should_skip_element(tag, class) {
                    walk(children, path, offset, out);
                }
            }
        }
        path.pop();
    }
}

pub fn should_skip_element(tag: &str, class: &str) -> bool {
    let tag = tag.to_lowercase();
    SKIPPED_TAGS.contains(&tag.as_str())
        || SKIPPED_CLASS_FRAGMENTS
            .iter()
            .any(|fragment| class.contains(fragment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_are_cumulative() {
        let root = RenderedNode::element(
            "article",
            vec![
                RenderedNode::element("p", vec![RenderedNode::text("Hello ")]),
                RenderedNode::element(
                    "p",
                    vec![
                        RenderedNode::element("em", vec![RenderedNode::text("wrold")]),
                        RenderedNode::text("!"),
                    ],
                ),
            ],
        );

        let out = extract(&root);
        assert_eq!(out.text, "Hello wrold!");
        assert_eq!(out.segments.len(), 3);
        assert_eq!((out.segments[1].start, out.segments[1].end), (6, 11));
        assert_eq!(out.segments[1].origin, Origin::Node { path: vec![1, 0, 0] });
    }

    #[test]
    fn test_code_subtrees_are_skipped() {
        let root = RenderedNode::element(
            "div",
            vec![
                RenderedNode::text("Run "),
                RenderedNode::element("code", vec![RenderedNode::text("cargo tset")]),
                RenderedNode::element("div", vec![RenderedNode::text("fn x()")])
                    .with_class("syntax-highlight"),
                RenderedNode::element("PRE", vec![RenderedNode::text("raw")]),
                RenderedNode::text("now."),
            ],
        );

        let out = extract(&root);
        assert_eq!(out.text, "Run now.");
        assert_eq!(out.segments.len(), 2);
        assert_eq!(out.segments[1].start, 4);
    }

    #[test]
    fn test_deserialize_tree() {
        let json = r#"{"type":"element","tag":"p","children":[{"type":"text","text":"Hi"}]}"#;
        let root: RenderedNode = serde_json::from_str(json).unwrap();
        assert_eq!(extract(&root).text, "Hi");
    }
}
