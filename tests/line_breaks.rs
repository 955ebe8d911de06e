//! Soft vs. hard line breaks within a continuing paragraph (spec.md §4.4
//! "trailing hard break": two or more trailing spaces, or a trailing
//! backslash, promote the next line's join to a `hard_break`).

use marqueur::{Context, NodeType, Parser};

fn parse(input: &str) -> marqueur::Node {
    let mut ctx = Context::builder().build();
    let mut parser = Parser::new(&mut ctx);
    parser.parse(input);
    parser.finish()
}

#[test]
fn plain_continuation_is_a_soft_break() {
    let root = parse("one\ntwo\n");
    let para = &root.children[0];
    let kinds: Vec<NodeType> = para.children.iter().map(|n| n.node_type).collect();
    assert_eq!(kinds, vec![NodeType::Text, NodeType::SoftBreak, NodeType::Text]);
}

#[test]
fn two_trailing_spaces_force_a_hard_break() {
    let root = parse("one  \ntwo\n");
    let para = &root.children[0];
    let kinds: Vec<NodeType> = para.children.iter().map(|n| n.node_type).collect();
    assert_eq!(kinds, vec![NodeType::Text, NodeType::HardBreak, NodeType::Text]);
    assert_eq!(para.children[0].content.as_deref(), Some("one"));
}

#[test]
fn trailing_backslash_forces_a_hard_break() {
    let root = parse("one\\\ntwo\n");
    let para = &root.children[0];
    let kinds: Vec<NodeType> = para.children.iter().map(|n| n.node_type).collect();
    assert_eq!(kinds, vec![NodeType::Text, NodeType::HardBreak, NodeType::Text]);
}

#[test]
fn escaped_trailing_backslash_is_not_a_break_marker() {
    let root = parse("one\\\\\ntwo\n");
    let para = &root.children[0];
    let kinds: Vec<NodeType> = para.children.iter().map(|n| n.node_type).collect();
    assert_eq!(kinds, vec![NodeType::Text, NodeType::SoftBreak, NodeType::Text]);
    assert_eq!(para.children[0].content.as_deref(), Some("one\\"));
}

#[test]
fn last_line_of_the_document_needs_no_break_after_it() {
    let root = parse("one  \n");
    let para = &root.children[0];
    assert_eq!(para.children.len(), 1);
    assert_eq!(para.children[0].node_type, NodeType::Text);
    assert_eq!(para.children[0].content.as_deref(), Some("one"));
}
