//! Abstract renderer (spec.md §4.6): a visitor over the AST that concrete
//! backends (HTML, PDF, ...) implement outside this crate. `AstDumpRenderer`
//! is the one concrete implementation shipped here, standing in for the
//! `--output ast` debug dump a CLI around this crate would expose.

use std::fmt::Write as _;

use crate::error::RenderError;
use crate::node::{Node, NodeType};

/// Visits an AST, one node type per method, each with a sensible default so
/// a renderer only needs to override the node types it actually cares about.
pub trait Renderer {
    fn render_node(&mut self, node: &Node) -> Result<(), RenderError> {
        match node.node_type {
            NodeType::Root
            | NodeType::Blockquote
            | NodeType::List
            | NodeType::ListItem
            | NodeType::Paragraph
            | NodeType::Header
            | NodeType::Strong
            | NodeType::Emphasis
            | NodeType::Subscript
            | NodeType::Superscript
            | NodeType::Link
            | NodeType::Span => self.render_children(node),
            NodeType::Blank => Ok(()),
            NodeType::ExtensionBlock => self.render_extension_block(node),
            NodeType::InlineExtension => self.render_inline_extension(node),
            NodeType::Text => self.write_text(node.content.as_deref().unwrap_or("")),
            NodeType::SoftBreak => self.write_soft_break(),
            NodeType::HardBreak => self.write_hard_break(),
            NodeType::Verbatim => self.write_text(node.content.as_deref().unwrap_or("")),
            NodeType::SpanData | NodeType::AttributeList => {
                Err(RenderError::UnsupportedNode(node.node_type))
            }
        }
    }

    fn render_children(&mut self, node: &Node) -> Result<(), RenderError> {
        for child in &node.children {
            self.render_node(child)?;
        }
        Ok(())
    }

    /// Overridden by callers that register extensions and want to dispatch
    /// to `Extension::render`; the default just descends into children.
    fn render_extension_block(&mut self, node: &Node) -> Result<(), RenderError> {
        self.render_children(node)
    }

    fn render_inline_extension(&mut self, node: &Node) -> Result<(), RenderError> {
        let _ = node;
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> Result<(), RenderError>;

    fn write_soft_break(&mut self) -> Result<(), RenderError> {
        self.write_text("\n")
    }

    fn write_hard_break(&mut self) -> Result<(), RenderError> {
        self.write_text("\n")
    }

    fn write_admonition_open(&mut self, kind: &str) -> Result<(), RenderError> {
        self.write_text(&format!("[{kind}]\n"))
    }

    fn write_admonition_close(&mut self, kind: &str) -> Result<(), RenderError> {
        let _ = kind;
        Ok(())
    }
}

/// Indented textual AST dump, the in-scope stand-in for the `--output ast`
/// flag's backend (spec.md §6.2 names HTML/PDF as out-of-scope collaborators;
/// this is the one renderer the crate ships itself).
#[derive(Default)]
pub struct AstDumpRenderer {
    out: String,
    depth: usize,
}

impl AstDumpRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dump(&mut self, root: &Node) -> Result<&str, RenderError> {
        self.out.clear();
        self.depth = 0;
        self.render_node(root)?;
        Ok(&self.out)
    }

    fn write_line(&mut self, node: &Node) {
        let indent = "  ".repeat(self.depth);
        let _ = write!(self.out, "{indent}{:?}", node.node_type);
        if let Some(content) = &node.content {
            let _ = write!(self.out, " {content:?}");
        }
        for (key, value) in &node.properties {
            let _ = write!(self.out, " {key}={value:?}");
        }
        for (key, value) in &node.attributes {
            let _ = write!(self.out, " {key}={value}");
        }
        self.out.push('\n');
    }
}

impl Renderer for AstDumpRenderer {
    fn render_node(&mut self, node: &Node) -> Result<(), RenderError> {
        self.write_line(node);
        self.depth += 1;
        for child in &node.children {
            self.render_node(child)?;
        }
        self.depth -= 1;
        Ok(())
    }

    fn write_text(&mut self, _text: &str) -> Result<(), RenderError> {
        Ok(())
    }
}
