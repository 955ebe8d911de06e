//! Pluggable block and inline handlers (spec.md §6.1), plus the two built-in
//! extensions that exercise the trait end to end.
//!
//! A single trait serves both block and inline extensions, the way `core`
//! treats `gfm_admonitions.rs` (block-shaped) and
//! `marco_emoji_shortcode_parser.rs` (inline-shaped) as peers of the same
//! "post-parse transform" idea rather than splitting them into unrelated
//! traits.

use crate::error::RenderError;
use crate::node::{prop, Node, NodeType, PropertyValue};
use crate::render::Renderer;

/// A named extension. [`crate::context::Context`] dispatches to one of these
/// whenever the parser recognizes `::name:` (block) or `:name:` (inline)
/// syntax (spec.md §4.3, §4.4.6).
pub trait Extension {
    /// Names this extension answers to exactly (spec.md `extension_names`).
    /// An extension registered as the context's default additionally
    /// receives every name no other extension claims.
    fn names(&self) -> &[&str] {
        &[]
    }

    /// Whether this extension owns parsing of its block's raw lines itself
    /// (`true`), via `parse_line`/`parsing_finished` and content_model
    /// `:special`, or leaves its body to be parsed as ordinary nested blocks
    /// (`false`, the default), content_model `:block` (spec.md §4.3, §6.1
    /// `parse_content?`).
    fn parses_content(&self) -> bool {
        false
    }

    /// Called once when a block extension opens, to let the extension seed
    /// attributes/properties on the new `extension_block` node (e.g. which
    /// of several names it was invoked under).
    fn on_block_open(&self, name: &str, node: &mut Node) {
        let _ = (name, node);
    }

    /// Called once per raw line while `parses_content()` is `true` and the
    /// block's indent still matches (spec.md §4.3 "consume subsequent
    /// lines"). `line` includes its trailing `\n`. Never called otherwise.
    fn parse_line(&self, node: &mut Node, line: &str) {
        let _ = (node, line);
    }

    /// Called once the indent match fails and the block closes (spec.md
    /// §4.3 `parsing_finished`), letting the extension turn whatever it
    /// accumulated via `parse_line` into its final children/content.
    fn parsing_finished(&self, node: &mut Node) {
        let _ = node;
    }

    /// Called for the bare inline form `:name:` with no following
    /// bracket/paren/brace (spec.md §4.4.6). Returning `Some` produces an
    /// `inline_extension` node; returning `None` leaves the text as the
    /// literal `:name:` the caller already has on hand.
    fn parse_inline(&self, name: &str) -> Option<Node>;

    /// Render a node this extension produced. Implementors only need to
    /// handle `extension_block` / `inline_extension` nodes whose `name`
    /// property is one of theirs.
    fn render(&self, node: &Node, renderer: &mut dyn Renderer) -> Result<(), RenderError>;
}

/// `::note:` / `::tip:` / `::warning:` — a block extension grounded on
/// `gfm_admonitions.rs`'s blockquote-to-admonition rewrite: same idea (wrap a
/// block of ordinary content in a labeled container), expressed here as a
/// first-class `extension_block` instead of a post-hoc blockquote rewrite.
///
/// It owns its own line consumption (`parses_content() == true`) rather than
/// delegating to ordinary nested block parsing: each raw line becomes a
/// `text` child of the block, joined by `soft_break`, the same shape a
/// one-paragraph body would have had, but built by hand since nothing here
/// re-enters the block parser.
pub struct NoteExtension;

impl Extension for NoteExtension {
    fn names(&self) -> &[&str] {
        &["note", "tip", "warning"]
    }

    fn parses_content(&self) -> bool {
        true
    }

    fn on_block_open(&self, name: &str, node: &mut Node) {
        node.set_prop(prop::NAME, PropertyValue::Text(name.to_string()));
    }

    fn parse_line(&self, node: &mut Node, line: &str) {
        let text = line.trim_end_matches(['\n', '\r']);
        if !node.children.is_empty() {
            node.children.push(Node::new(NodeType::SoftBreak));
        }
        let mut child = Node::new(NodeType::Text);
        child.content = Some(text.to_string());
        node.children.push(child);
    }

    fn parse_inline(&self, _name: &str) -> Option<Node> {
        None
    }

    fn render(&self, node: &Node, renderer: &mut dyn Renderer) -> Result<(), RenderError> {
        let kind = node.prop_str(prop::NAME).unwrap_or("note");
        renderer.write_admonition_open(kind)?;
        for child in &node.children {
            renderer.render_node(child)?;
        }
        renderer.write_admonition_close(kind)
    }
}

/// `:shortcode:` — an inline extension grounded on
/// `marco_emoji_shortcode_parser.rs`: looks the shortcode up via the
/// `emojis` crate and, when recognized, stores the glyph as a property
/// rather than resolving it into a plain text node, so a renderer can still
/// tell "this was an emoji" from "this was literal text that happened to
/// look like one".
pub struct EmojiExtension;

impl Extension for EmojiExtension {
    fn names(&self) -> &[&str] {
        &[]
    }

    fn parse_inline(&self, name: &str) -> Option<Node> {
        let emoji = emojis::get_by_shortcode(name)?;
        let mut node = Node::new(NodeType::InlineExtension);
        node.set_prop(prop::NAME, PropertyValue::Text("emoji".to_string()));
        node.set_prop(prop::GLYPH, PropertyValue::Text(emoji.as_str().to_string()));
        Some(node)
    }

    fn render(&self, node: &Node, renderer: &mut dyn Renderer) -> Result<(), RenderError> {
        let glyph = node.prop_str(prop::GLYPH).unwrap_or("");
        renderer.write_text(glyph)
    }
}
