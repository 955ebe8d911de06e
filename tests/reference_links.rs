//! Reference-style links: destination-form links, `[name]: url` definitions,
//! and the "definitions persist across the Context's lifetime" decision
//! recorded in DESIGN.md (spec.md §9 open question).

use marqueur::{Context, NodeType, Parser};

#[test]
fn destination_link_round_trips() {
    let mut ctx = Context::builder().build();
    let mut parser = Parser::new(&mut ctx);
    parser.parse("[x](y)\n");
    let root = parser.finish();
    let para = &root.children[0];
    let link = para.children.iter().find(|n| n.node_type == NodeType::Link).unwrap();
    assert_eq!(link.prop_str("destination"), Some("y"));
    assert!(link.prop_str("reference").is_none());
}

#[test]
fn definition_is_recorded_and_does_not_produce_a_paragraph() {
    let mut ctx = Context::builder().build();
    let mut parser = Parser::new(&mut ctx);
    parser.parse("[home]: https://example.com\n");
    let root = parser.finish();
    assert!(root.children.is_empty());
    assert_eq!(ctx.link_destinations.get("home").map(String::as_str), Some("https://example.com"));
}

#[test]
fn reference_link_records_the_name_not_a_resolved_url() {
    let mut ctx = Context::builder().build();
    let mut parser = Parser::new(&mut ctx);
    parser.parse("[home]: https://example.com\n\nsee [here][home]\n");
    let root = parser.finish();
    let para = root.children.iter().find(|n| n.node_type == NodeType::Paragraph).unwrap();
    let link = para.children.iter().find(|n| n.node_type == NodeType::Link).unwrap();
    assert_eq!(link.prop_str("reference"), Some("home"));
    assert!(link.prop_str("destination").is_none());
}

#[test]
fn definitions_persist_across_separate_parser_instances_on_one_context() {
    let mut ctx = Context::builder().build();
    {
        let mut first_pass = Parser::new(&mut ctx);
        first_pass.parse("[home]: https://example.com\n");
        first_pass.finish();
    }
    {
        let mut second_pass = Parser::new(&mut ctx);
        second_pass.parse("see [here][home]\n");
        let root = second_pass.finish();
        let link = root.children[0]
            .children
            .iter()
            .find(|n| n.node_type == NodeType::Link)
            .unwrap();
        assert_eq!(link.prop_str("reference"), Some("home"));
    }
    assert_eq!(ctx.link_destinations.get("home").map(String::as_str), Some("https://example.com"));
}
