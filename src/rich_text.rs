//! Rich-text documents and their HTML rendering.
//!
//! The content backend stores formatted text as a flat list of blocks. Each
//! text block holds spans, and each span carries a list of marks: either a
//! decorator (`strong`, `em`, ...) or the key of an annotation declared in
//! the block's `markDefs` (links).
//!
//! ```json
//! [
//!   {
//!     "_type": "block",
//!     "style": "normal",
//!     "markDefs": [{ "_key": "l1", "_type": "link", "href": "https://example.com" }],
//!     "children": [
//!       { "_type": "span", "text": "Hello ", "marks": [] },
//!       { "_type": "span", "text": "world", "marks": ["strong", "l1"] }
//!     ]
//!   }
//! ]
//! ```
//!
//! Blocks of any other `_type` (images, embeds) are kept as [`Block::Unknown`]
//! and render to nothing.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};

/// A rich-text document: an ordered sequence of blocks.
pub type RichText = Vec<Block>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type")]
pub enum Block {
    #[serde(rename = "block")]
    Text(TextBlock),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextBlock {
    /// `normal`, `h1`..`h6` or `blockquote`. Anything else renders as a paragraph.
    pub style: String,
    pub children: Vec<Span>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mark_defs: Vec<MarkDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_item: Option<ListKind>,
}

impl Default for TextBlock {
    fn default() -> Self {
        Self {
            style: "normal".to_string(),
            children: Vec::new(),
            mark_defs: Vec::new(),
            list_item: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Span {
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<String>,
}

/// An annotation referenced from span marks by `_key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkDef {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Bullet,
    Number,
}

/// Build a document holding one plain paragraph.
pub fn paragraph(text: &str) -> RichText {
    vec![Block::Text(TextBlock {
        children: vec![Span {
            text: text.to_string(),
            marks: Vec::new(),
        }],
        ..TextBlock::default()
    })]
}

/// Flatten a document to plain text, one paragraph per text block.
pub fn plain_text(blocks: &[Block]) -> String {
    blocks
        .iter()
        .filter_map(|block| match block {
            Block::Text(text) => Some(
                text.children
                    .iter()
                    .map(|span| span.text.as_str())
                    .collect::<String>(),
            ),
            Block::Unknown => None,
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Consecutive list items are grouped so they share one `ul`/`ol`.
enum Group<'a> {
    Single(&'a TextBlock),
    List(ListKind, Vec<&'a TextBlock>),
}

fn group_blocks(blocks: &[Block]) -> Vec<Group<'_>> {
    let mut groups: Vec<Group<'_>> = Vec::new();
    for block in blocks {
        let Block::Text(text) = block else { continue };
        let Some(kind) = text.list_item else {
            groups.push(Group::Single(text));
            continue;
        };
        if let Some(Group::List(current, items)) = groups.last_mut() {
            if *current == kind {
                items.push(text);
                continue;
            }
        }
        groups.push(Group::List(kind, vec![text]));
    }
    groups
}

/// Render a document to HTML. All text is escaped.
pub fn render(blocks: &[Block]) -> Markup {
    html! {
        @for group in group_blocks(blocks) {
            @match group {
                Group::Single(block) => { (render_block(block)) },
                Group::List(ListKind::Bullet, items) => ul {
                    @for item in items { li { (render_spans(item)) } }
                },
                Group::List(ListKind::Number, items) => ol {
                    @for item in items { li { (render_spans(item)) } }
                },
            }
        }
    }
}

fn render_block(block: &TextBlock) -> Markup {
    let inner = render_spans(block);
    match block.style.as_str() {
        "h1" => html! { h1 { (inner) } },
        "h2" => html! { h2 { (inner) } },
        "h3" => html! { h3 { (inner) } },
        "h4" => html! { h4 { (inner) } },
        "h5" => html! { h5 { (inner) } },
        "h6" => html! { h6 { (inner) } },
        "blockquote" => html! { blockquote { (inner) } },
        _ => html! { p { (inner) } },
    }
}

fn render_spans(block: &TextBlock) -> Markup {
    html! {
        @for span in &block.children {
            (render_marked(&span.text, &span.marks, &block.mark_defs))
        }
    }
}

/// Wrap `text` in each mark, outermost first.
fn render_marked(text: &str, marks: &[String], defs: &[MarkDef]) -> Markup {
    let Some((mark, rest)) = marks.split_first() else {
        return render_text(text);
    };
    let inner = render_marked(text, rest, defs);
    match mark.as_str() {
        "strong" => html! { strong { (inner) } },
        "em" => html! { em { (inner) } },
        "code" => html! { code { (inner) } },
        "underline" => html! { span style="text-decoration: underline" { (inner) } },
        "strike-through" => html! { del { (inner) } },
        key => match defs.iter().find(|d| d.key == key && d.kind == "link") {
            Some(MarkDef {
                href: Some(href), ..
            }) => html! { a href=(href) { (inner) } },
            // Unknown decorators and dangling keys keep the text unwrapped.
            _ => inner,
        },
    }
}

/// Line breaks inside a span become `<br>`.
fn render_text(text: &str) -> Markup {
    html! {
        @for (i, line) in text.split('\n').enumerate() {
            @if i > 0 { br; }
            (line)
        }
    }
}
