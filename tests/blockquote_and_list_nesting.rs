//! Cross-line block nesting: blockquotes, lists, and the paragraph
//! continuation rules that stitch their inline content together
//! (spec.md §4.3 "Blockquote", "List item", §8 scenarios 2 and 6).

use marqueur::{Context, NodeType, Parser};

fn parse(input: &str) -> marqueur::Node {
    let mut ctx = Context::builder().build();
    let mut parser = Parser::new(&mut ctx);
    parser.parse(input);
    parser.finish()
}

#[test]
fn blockquote_continuation_joins_lines_with_soft_break() {
    let root = parse("> a\n> b\n");
    assert_eq!(root.children.len(), 1);
    let bq = &root.children[0];
    assert_eq!(bq.node_type, NodeType::Blockquote);

    let para = &bq.children[0];
    assert_eq!(para.node_type, NodeType::Paragraph);
    let kinds: Vec<NodeType> = para.children.iter().map(|n| n.node_type).collect();
    assert_eq!(kinds, vec![NodeType::Text, NodeType::SoftBreak, NodeType::Text]);
    assert_eq!(para.children[0].content.as_deref(), Some("a"));
    assert_eq!(para.children[2].content.as_deref(), Some("b"));
}

#[test]
fn blank_blockquote_line_does_not_leave_the_quote() {
    let root = parse("> a\n>\n> b\n");
    assert_eq!(root.children.len(), 1);
    let bq = &root.children[0];
    assert_eq!(bq.node_type, NodeType::Blockquote);
    // a blank line inside the quote ends the first paragraph but stays nested.
    assert_eq!(bq.children[0].node_type, NodeType::Paragraph);
    assert_eq!(bq.children[1].node_type, NodeType::Blank);
    assert_eq!(bq.children[2].node_type, NodeType::Paragraph);
}

#[test]
fn ordered_list_items_share_one_list_with_recorded_start() {
    let root = parse("1. one\n2. two\n");
    assert_eq!(root.children.len(), 1);
    let list = &root.children[0];
    assert_eq!(list.node_type, NodeType::List);
    assert_eq!(list.prop_usize("start"), Some(1));
    assert_eq!(list.children.len(), 2);
    for item in &list.children {
        assert_eq!(item.node_type, NodeType::ListItem);
    }
    let first_para = &list.children[0].children[0];
    assert_eq!(first_para.children[0].content.as_deref(), Some("one"));
}

#[test]
fn changing_marker_starts_a_new_list() {
    let root = parse("- a\n* b\n");
    assert_eq!(root.children.len(), 2);
    assert_eq!(root.children[0].node_type, NodeType::List);
    assert_eq!(root.children[1].node_type, NodeType::List);
}

#[test]
fn list_nested_inside_blockquote() {
    let root = parse("> - a\n> - b\n");
    let bq = &root.children[0];
    assert_eq!(bq.node_type, NodeType::Blockquote);
    let list = &bq.children[0];
    assert_eq!(list.node_type, NodeType::List);
    assert_eq!(list.children.len(), 2);
}
