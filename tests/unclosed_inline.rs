//! "An inline node that never finds its closing marker becomes literal
//! text" (spec.md §9) — exercised at the various points that force a
//! close: end of line, end of document, and a sibling closing marker
//! that would otherwise cross an open one.

use marqueur::{Context, NodeType, Parser};

fn parse(input: &str) -> marqueur::Node {
    let mut ctx = Context::builder().build();
    let mut parser = Parser::new(&mut ctx);
    parser.parse(input);
    parser.finish()
}

fn flat_text(node: &marqueur::Node) -> String {
    node.children.iter().filter_map(|n| n.content.clone()).collect()
}

#[test]
fn unclosed_emphasis_at_end_of_document_is_literal() {
    let root = parse("a *b c\n");
    let para = &root.children[0];
    assert!(para.children.iter().all(|n| n.node_type != NodeType::Emphasis));
    assert_eq!(flat_text(para), "a *b c");
}

#[test]
fn unclosed_strong_spanning_a_blank_line_is_literal_up_to_the_blank() {
    let root = parse("a *b\n\nc\n");
    assert_eq!(root.children.len(), 3);
    let first = &root.children[0];
    assert_eq!(first.node_type, NodeType::Paragraph);
    assert!(first.children.iter().all(|n| n.node_type != NodeType::Strong));
    assert_eq!(flat_text(first), "a *b");
    assert_eq!(root.children[1].node_type, NodeType::Blank);
    assert_eq!(root.children[2].node_type, NodeType::Paragraph);
    assert_eq!(flat_text(&root.children[2]), "c");
}

#[test]
fn stray_closing_bracket_with_no_opener_is_literal() {
    let root = parse("b] a\n");
    let para = &root.children[0];
    assert_eq!(flat_text(para), "b] a");
}

#[test]
fn unmatched_bracket_without_trailing_form_keeps_its_inner_markup() {
    let root = parse("a [*b*] c\n");
    let para = &root.children[0];
    assert!(para.children.iter().any(|n| n.node_type == NodeType::Strong));
    assert!(para.children.iter().all(|n| n.node_type != NodeType::Link && n.node_type != NodeType::Span));
}

#[test]
fn closest_opening_marker_wins_over_an_outer_one() {
    let root = parse("*a _b* c_\n");
    let para = &root.children[0];
    assert!(para.children.iter().any(|n| n.node_type == NodeType::Strong));
    let strong = para.children.iter().find(|n| n.node_type == NodeType::Strong).unwrap();
    assert_eq!(flat_text(strong), "a _b");
}

#[test]
fn unclosed_nested_emphasis_inside_a_closed_span_is_rewritten_to_text() {
    let root = parse("[a *b]{.x} c\n");
    let para = &root.children[0];
    let span = para.children.iter().find(|n| n.node_type == NodeType::Span).unwrap();
    assert!(span.children.iter().all(|n| n.node_type != NodeType::Emphasis));
    assert_eq!(flat_text(span), "a *b");
}
