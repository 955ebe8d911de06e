//! A line-oriented, single-pass block-and-inline parser for a lightweight
//! markup language, plus the AST data model pluggable renderers walk.
//!
//! The pipeline is: bytes/text → [`Parser`] (driving a per-line
//! [`scanner::Scanner`] over a [`stack::Stack`] of open containers) →
//! a finished [`Node`] tree → a [`render::Renderer`] implementation.
//! [`Context`] carries the extension registry and the reference-link table
//! across repeated `parse` calls.

pub mod attrs;
pub mod context;
pub mod error;
pub mod extension;
pub mod logic;
pub mod node;
pub mod parser;
pub mod render;
pub mod scanner;
pub mod stack;

pub use context::{Context, ContextBuilder};
pub use error::{CoreError, RenderError};
pub use extension::{EmojiExtension, Extension, NoteExtension};
pub use node::{AttrValue, Attributes, Category, ContentModel, ListMarker, Node, NodeType, Properties, PropertyValue};
pub use parser::Parser;
pub use render::{AstDumpRenderer, Renderer};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_to_end_document_through_finish_and_dump() {
        let mut ctx = Context::builder().with_default_extensions().build();
        let mut parser = Parser::new(&mut ctx);
        parser.parse("# Title\n\nSome *text* with a [link](https://example.com).\n");
        let root = parser.finish();
        assert_eq!(root.node_type, NodeType::Root);

        let mut renderer = AstDumpRenderer::new();
        let dump = renderer.dump(&root).unwrap();
        assert!(dump.contains("Header"));
        assert!(dump.contains("Link"));
    }
}
