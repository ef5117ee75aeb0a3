use crate::parser::rendered::RenderedNode;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag};

struct Frame {
    tag: &'static str,
    class: &'static str,
    children: Vec<RenderedNode>,
}

impl Frame {
    fn new(tag: &'static str) -> Self {
        Self {
            tag,
            class: "",
            children: Vec::new(),
        }
    }

    fn into_node(mut self) -> RenderedNode {
        // Alt text is an attribute of <img>, not rendered content
        if self.tag == "img" {
            self.children.clear();
        }
        RenderedNode::element(self.tag, self.children).with_class(self.class)
    }
}

/// Render markdown into the element tree a browser would show.
///
/// Block elements are followed by a newline text node, as in serialized
/// HTML, so adjacent paragraphs don't run together in the flat text.
pub fn render(content: &str) -> RenderedNode {
    let options = Options::ENABLE_YAML_STYLE_METADATA_BLOCKS
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TABLES;
    let parser = Parser::new_ext(content, options);

    let mut stack = vec![Frame::new("article")];

    for event in parser {
        match event {
            Event::Start(tag) => stack.push(frame_for(&tag)),
            Event::End(_) => {
                if stack.len() < 2 {
                    continue;
                }
                if let Some(frame) = stack.pop() {
                    let is_block = is_block_tag(frame.tag);
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(frame.into_node());
                        if is_block {
                            parent.children.push(RenderedNode::text("\n"));
                        }
                    }
                }
            }
            Event::Text(text) => push(&mut stack, RenderedNode::text(text.to_string())),
            Event::Code(code) => push(
                &mut stack,
                RenderedNode::element("code", vec![RenderedNode::text(code.to_string())]),
            ),
            Event::SoftBreak => push(&mut stack, RenderedNode::text("\n")),
            Event::HardBreak => {
                push(&mut stack, RenderedNode::element("br", Vec::new()));
                push(&mut stack, RenderedNode::text("\n"));
            }
            // Raw HTML and footnote markers are not prose
            _ => {}
        }
    }

    while stack.len() > 1 {
        if let Some(frame) = stack.pop() {
            push(&mut stack, frame.into_node());
        }
    }

    stack
        .pop()
        .map(Frame::into_node)
        .unwrap_or_else(|| RenderedNode::element("article", Vec::new()))
}

fn push(stack: &mut [Frame], node: RenderedNode) {
    if let Some(frame) = stack.last_mut() {
        frame.children.push(node);
    }
}

fn frame_for(tag: &Tag) -> Frame {
    match tag {
        Tag::Paragraph => Frame::new("p"),
        Tag::Heading { level, .. } => Frame::new(heading_tag(*level)),
        Tag::CodeBlock(_) => Frame::new("pre"),
        Tag::List(Some(_)) => Frame::new("ol"),
        Tag::List(None) => Frame::new("ul"),
        Tag::Item => Frame::new("li"),
        Tag::Emphasis => Frame::new("em"),
        Tag::Strong => Frame::new("strong"),
        Tag::Strikethrough => Frame::new("del"),
        Tag::Link { .. } => Frame::new("a"),
        Tag::Image { .. } => Frame::new("img"),
        Tag::MetadataBlock(_) => Frame {
            class: "frontmatter",
            ..Frame::new("pre")
        },
        _ => Frame::new("div"),
    }
}

fn heading_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}

fn is_block_tag(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "pre" | "ol" | "ul" | "li" | "div"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::rendered;

    #[test]
    fn test_markdown_skips_code() {
        let content = r#"
# Title

This is a test paragraph with some words.

```rust
fn main() {
    println!("This should be ignored");
}
```

More text with `inline_code` here.
"#;

        let out = rendered::extract(&render(content));
        assert!(out.text.contains("This is a test paragraph"));
        assert!(out.text.contains("More text with  here."));
        assert!(!out.text.contains("println"));
        assert!(!out.text.contains("inline_code"));
    }

    #[test]
    fn test_paragraphs_are_separated() {
        let out = rendered::extract(&render("First para.\n\nSecond para."));
        assert_eq!(out.text, "First para.\nSecond para.\n");
    }

    #[test]
    fn test_image_alt_text_is_not_content() {
        let out = rendered::extract(&render("See ![Helo wrold](a.png) here.\n"));
        assert_eq!(out.text, "See  here.\n");
        assert!(out.segments.iter().all(|s| !s.text.contains("Helo")));
    }

    #[test]
    fn test_front_matter_is_skipped() {
        let content = "---\ntitle: Helo\n---\n\nBody text.\n";
        let out = rendered::extract(&render(content));
        assert!(!out.text.contains("Helo"));
        assert!(out.text.contains("Body text."));
    }
}
