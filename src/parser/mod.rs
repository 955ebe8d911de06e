//! Drives the [`Scanner`](crate::scanner::Scanner)/[`Stack`](crate::stack::Stack)
//! pair one line at a time (spec.md §4.3).

mod blocks;
mod inlines;

use crate::context::Context;
use crate::logic::input;
use crate::node::{Attributes, Node};
use crate::stack::Stack;

/// A single parsing pass over a document. Borrows a [`Context`] for its
/// whole lifetime so reference-link definitions it records are visible to
/// every `Parser` built against that `Context` afterwards (spec.md §9).
pub struct Parser<'ctx> {
    pub(crate) context: &'ctx mut Context,
    pub(crate) stack: Stack,
    pub(crate) pending_attrs: Option<Attributes>,
    pub(crate) pending_ref_name: Option<String>,
    pub(crate) pending_hard_break: bool,
    pub(crate) line_no: usize,
}

impl<'ctx> Parser<'ctx> {
    pub fn new(context: &'ctx mut Context) -> Self {
        Parser {
            context,
            stack: Stack::new(),
            pending_attrs: None,
            pending_ref_name: None,
            pending_hard_break: false,
            line_no: 0,
        }
    }

    /// Parse a chunk of already-decoded text. Can be called more than once
    /// on the same `Parser` to feed a document incrementally; block and
    /// inline containers left open at the end of one call stay open for the
    /// next (spec.md §4.3 "incremental parsing").
    pub fn parse(&mut self, input: &str) {
        for line in input::split_lines(input) {
            self.parse_line(line);
        }
    }

    /// Parse raw bytes, sanitizing them first (spec.md §9 "byte input").
    pub fn parse_bytes(&mut self, bytes: &[u8]) {
        let text = input::sanitize(bytes);
        self.parse(&text);
    }

    fn parse_line(&mut self, raw: &str) {
        self.line_no += 1;
        self.stack.reset_level();
        log::debug!(target: "marqueur::parser", "line {}: {:?}", self.line_no, raw);
        blocks::dispatch_line(self, raw);
    }

    /// Close every remaining open container and return the completed
    /// document (spec.md §4.3 `finish`).
    pub fn finish(mut self) -> Node {
        blocks::finish_pending_extension_block(&mut self);
        self.stack.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeType;

    #[test]
    fn empty_input_produces_bare_root() {
        let mut ctx = Context::builder().build();
        let parser = Parser::new(&mut ctx);
        let root = parser.finish();
        assert_eq!(root.node_type, NodeType::Root);
        assert!(root.children.is_empty());
    }

    #[test]
    fn single_paragraph_round_trips() {
        let mut ctx = Context::builder().build();
        let mut parser = Parser::new(&mut ctx);
        parser.parse("hello world\n");
        let root = parser.finish();
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].node_type, NodeType::Paragraph);
    }
}
