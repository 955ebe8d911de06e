//! Inline event loop (spec.md §4.4): runs over a single line's content,
//! dispatching on whichever special character the cursor sits on.
//!
//! Brackets use the stack itself as working memory instead of a separate
//! bracket table: `[` opens a transient `span_data` frame, nested markup
//! inside it parses normally, and at the matching `]` the frame is
//! reclassified in place — into `link` or `span`, or rewritten back to
//! literal text if no trailing `(...)`/`[...]`/`{...}` form follows — before
//! it is ever pushed into the tree (spec.md §9 "closest opening marker
//! wins").

use std::sync::OnceLock;

use regex::bytes::Regex;

use super::Parser;
use crate::node::{prop, AttrValue, Attributes, ContentModel, Node, NodeType, Properties, PropertyValue};
use crate::scanner::Scanner;
use crate::stack::{push_or_merge_text, Frame};

pub(super) fn process_line(p: &mut Parser, content: &str, continuation: bool) {
    if continuation {
        p.stack.enter_to_bottom();
        let break_type = if p.pending_hard_break {
            NodeType::HardBreak
        } else {
            NodeType::SoftBreak
        };
        p.stack.append_leaf(Node::new(break_type));
    }
    p.pending_hard_break = false;

    let mut line = content;
    if line.ends_with("  ") {
        line = line.trim_end_matches(' ');
        p.pending_hard_break = true;
    } else if line.ends_with('\\') && !line.ends_with("\\\\") {
        line = &line[..line.len() - 1];
        p.pending_hard_break = true;
    }

    let mut scanner = Scanner::new(line.as_bytes());
    while !scanner.at_end() {
        let ch = scanner.peek().unwrap();
        match ch {
            b'\\' => handle_backslash(p, &mut scanner),
            b'`' => handle_backtick(p, &mut scanner),
            b'*' | b'_' | b'~' | b'^' => {
                if handle_marker(p, &mut scanner, ch) {
                    apply_trailing_attrs(p, &mut scanner);
                }
            }
            b'[' => handle_open_bracket(&mut scanner, p),
            b']' => {
                if handle_close_bracket(p, &mut scanner) {
                    apply_trailing_attrs(p, &mut scanner);
                }
            }
            b':' => {
                if !try_inline_extension(p, &mut scanner) {
                    scanner.advance(1);
                    push_text(p, ":");
                }
            }
            _ => handle_plain_run(p, &mut scanner),
        }
    }
}

fn handle_plain_run(p: &mut Parser, scanner: &mut Scanner) {
    let start = scanner.pos();
    while let Some(b) = scanner.peek() {
        if is_special(b) {
            break;
        }
        scanner.advance(utf8_char_width(scanner.remaining()));
    }
    let text = String::from_utf8_lossy(scanner.slice(start, scanner.pos())).into_owned();
    push_text(p, &text);
}

fn is_special(b: u8) -> bool {
    matches!(b, b'\\' | b'`' | b'*' | b'_' | b'~' | b'^' | b'[' | b']' | b':')
}

fn utf8_char_width(bytes: &[u8]) -> usize {
    match bytes.first() {
        None => 0,
        Some(&b) if b < 0x80 => 1,
        Some(&b) if b >> 5 == 0b110 => 2,
        Some(&b) if b >> 4 == 0b1110 => 3,
        Some(&b) if b >> 3 == 0b1_1110 => 4,
        Some(_) => 1,
    }
}

/// Backslash followed by the escape set `* _ ~ ^ \ [ ] ( ) { } :`, by a
/// space (→ U+00A0), or by nothing escapable at all (→ literal `\`)
/// (spec.md §4.4.2). The CR/LF case is handled by the caller's trailing
/// hard-break check before the line ever reaches here.
fn handle_backslash(p: &mut Parser, scanner: &mut Scanner) {
    scanner.advance(1);
    match scanner.peek() {
        Some(b' ') => {
            scanner.advance(1);
            push_text(p, "\u{a0}");
        }
        Some(b) if is_escapable(b) => {
            scanner.advance(1);
            push_text(p, &(b as char).to_string());
        }
        _ => push_text(p, "\\"),
    }
}

fn is_escapable(b: u8) -> bool {
    matches!(b, b'*' | b'_' | b'~' | b'^' | b'\\' | b'[' | b']' | b'(' | b')' | b'{' | b'}' | b':')
}

fn backtick_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("`+").unwrap())
}

/// `` `code` `` (spec.md §4.4.3): the verbatim span's length is fixed by the
/// opening run, so a shorter or longer run of backticks inside it is just
/// data, not a closer.
fn handle_backtick(p: &mut Parser, scanner: &mut Scanner) {
    let open_start = scanner.pos();
    while scanner.peek() == Some(b'`') {
        scanner.advance(1);
    }
    let run_len = scanner.pos() - open_start;
    let content_start = scanner.pos();

    let closer = backtick_run_re()
        .find_iter(scanner.remaining())
        .find(|m| m.end() - m.start() == run_len);

    match closer {
        Some(m) => {
            let content = scanner.slice(content_start, content_start + m.start());
            let mut node = Node::new(NodeType::Verbatim);
            node.content = Some(String::from_utf8_lossy(content).into_owned());
            p.stack.append_leaf(node);
            scanner.advance(m.end());
        }
        None => {
            scanner.set_pos(open_start);
            scanner.advance(run_len);
            push_text(p, &"`".repeat(run_len));
        }
    }
}

/// `*` (strong), `_` (emphasis), `~` (subscript), `^` (superscript) — spec.md
/// §3, §4.4.1. Each is a single-character marker; there is no CommonMark-style
/// doubling. Returns whether this occurrence closed an already-open node (so
/// the caller can check for a trailing `{...}`).
fn handle_marker(p: &mut Parser, scanner: &mut Scanner, ch: u8) -> bool {
    let (node_type, marker, consume) = classify_marker(ch);

    let prev_is_space = scanner.peek_prev().map_or(true, |b| b.is_ascii_whitespace());
    let next_is_space = scanner.peek_at(consume).map_or(true, |b| b.is_ascii_whitespace());
    let closing_eligible = !prev_is_space;
    let opening_eligible = !next_is_space;

    if closing_eligible {
        if let Some(level) = find_open_marker(p, node_type, marker) {
            scanner.advance(consume);
            p.stack.close_node(level, false);
            return true;
        }
    }

    if opening_eligible {
        scanner.advance(consume);
        p.stack.open_container(Frame::new(node_type).with_marker(marker));
        return false;
    }

    scanner.advance(consume);
    push_text(p, marker);
    false
}

fn classify_marker(ch: u8) -> (NodeType, &'static str, usize) {
    match ch {
        b'*' => (NodeType::Strong, "*", 1),
        b'_' => (NodeType::Emphasis, "_", 1),
        b'~' => (NodeType::Subscript, "~", 1),
        _ => (NodeType::Superscript, "^", 1),
    }
}

fn find_open_marker(p: &Parser, node_type: NodeType, marker: &str) -> Option<usize> {
    for idx in (0..p.stack.depth()).rev() {
        let frame = p.stack.frame_at(idx);
        if frame.node_type == node_type && frame.marker.as_deref() == Some(marker) {
            return Some(idx);
        }
        if frame.content_model == ContentModel::Verbatim {
            return None;
        }
    }
    None
}

fn handle_open_bracket(scanner: &mut Scanner, p: &mut Parser) {
    scanner.advance(1);
    p.stack
        .open_container(Frame::new(NodeType::SpanData).with_marker("["));
}

/// `]` (spec.md §4.4.4): reclassify the innermost open `span_data` in place
/// based on what immediately follows, or give up and splice the brackets
/// back in as literal text around whatever inline content they held.
fn handle_close_bracket(p: &mut Parser, scanner: &mut Scanner) -> bool {
    let Some(level) = p.stack.node_level(NodeType::SpanData) else {
        scanner.advance(1);
        push_text(p, "]");
        return false;
    };
    scanner.advance(1);

    // `:name:[content]` (spec.md §4.4.6): the content form carries its
    // inline markup as already-parsed children, so `]` retypes and closes
    // the span directly instead of looking for a trailing form.
    if p.stack.frame_at(level).marker.as_deref().is_some_and(|m| m.starts_with(':') && m.ends_with('[')) {
        let name = p
            .stack
            .frame_at(level)
            .properties
            .get(prop::NAME)
            .and_then(PropertyValue::as_str)
            .unwrap_or_default()
            .to_string();
        let frame = p.stack.frame_at_mut(level);
        frame.node_type = NodeType::InlineExtension;
        frame.properties.insert(prop::NAME.to_string(), PropertyValue::Text(name));
        p.stack.close_node(level, false);
        return true;
    }

    if scanner.peek() == Some(b'(') {
        if let Some(dest) = scan_delimited(scanner, b'(', b')') {
            let frame = p.stack.frame_at_mut(level);
            frame.node_type = NodeType::Link;
            frame
                .properties
                .insert(prop::DESTINATION.to_string(), PropertyValue::Text(dest));
            p.stack.close_node(level, false);
            return true;
        }
    } else if scanner.peek() == Some(b'[') {
        if let Some(reference) = scan_delimited(scanner, b'[', b']') {
            let frame = p.stack.frame_at_mut(level);
            frame.node_type = NodeType::Link;
            frame
                .properties
                .insert(prop::REFERENCE.to_string(), PropertyValue::Text(reference));
            p.stack.close_node(level, false);
            return true;
        }
    } else if scanner.peek() == Some(b'{') {
        if let Some(raw_attrs) = scan_delimited(scanner, b'{', b'}') {
            let mut attrs = crate::attrs::parse_attribute_list(&raw_attrs);
            let frame = p.stack.frame_at_mut(level);
            frame.node_type = NodeType::Span;
            extract_refs(&mut attrs, &mut frame.properties);
            frame.attributes = attrs;
            p.stack.close_node(level, false);
            return true;
        }
    }

    log::debug!(target: "marqueur::parser", "unmatched span at line {}, falling back to literal brackets", p.line_no);
    // `span_data` is transient (spec.md §3), so the generic close_node rewrite
    // path leaves it alone rather than splicing it back in as text — it was
    // never meant to survive as a node of its own. Tear it down by hand
    // instead: force-close anything still dangling above it as usual, then
    // pull the bare frame off the stack and re-home its already-resolved
    // children (clean nested markup stays intact) between literal brackets.
    p.stack.close_node(level + 1, true);
    let frame = p.stack.remove_top();
    push_text(p, "[");
    p.stack.container_mut().children.extend(frame.children);
    push_text(p, "]");
    false
}

/// `:name:` and its three carrying forms `:name:[content]`, `:name:(dest)`,
/// `:name:{attrs}` (spec.md §4.4.6). The bare form defers entirely to
/// [`crate::extension::Extension::parse_inline`]; the carrying forms build
/// an `inline_extension` node here since they don't need the extension's
/// input at all, only its name.
fn try_inline_extension(p: &mut Parser, scanner: &mut Scanner) -> bool {
    let start = scanner.pos();
    scanner.advance(1);
    let name_start = scanner.pos();
    while matches!(scanner.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'_' || b == b'-') {
        scanner.advance(1);
    }
    let name_end = scanner.pos();
    if name_end == name_start || scanner.peek() != Some(b':') {
        scanner.set_pos(start);
        return false;
    }
    let name = String::from_utf8_lossy(scanner.slice(name_start, name_end)).into_owned();
    scanner.advance(1);

    match scanner.peek() {
        Some(b'[') => {
            scanner.advance(1);
            let mut frame = Frame::new(NodeType::SpanData).with_marker(format!(":{name}:["));
            frame.properties.insert(prop::NAME.to_string(), PropertyValue::Text(name));
            p.stack.open_container(frame);
            true
        }
        Some(b'(') => match scan_delimited(scanner, b'(', b')') {
            Some(dest) => {
                let mut node = Node::new(NodeType::InlineExtension);
                node.set_prop(prop::NAME, PropertyValue::Text(name));
                node.set_prop(prop::DESTINATION, PropertyValue::Text(dest));
                p.stack.append_leaf(node);
                true
            }
            None => {
                scanner.set_pos(start);
                false
            }
        },
        Some(b'{') => match scan_delimited(scanner, b'{', b'}') {
            Some(raw_attrs) => {
                let mut attrs = crate::attrs::parse_attribute_list(&raw_attrs);
                let mut node = Node::new(NodeType::InlineExtension);
                node.set_prop(prop::NAME, PropertyValue::Text(name));
                extract_refs(&mut attrs, &mut node.properties);
                node.attributes = attrs;
                p.stack.append_leaf(node);
                true
            }
            None => {
                scanner.set_pos(start);
                false
            }
        },
        _ => {
            if let Some(ext) = p.context.try_extension(&name) {
                if let Some(node) = ext.parse_inline(&name) {
                    p.stack.append_leaf(node);
                    return true;
                }
            }
            scanner.set_pos(start);
            false
        }
    }
}

/// `{...}` immediately after a node that just closed (spec.md §4.4.5).
fn apply_trailing_attrs(p: &mut Parser, scanner: &mut Scanner) {
    if scanner.peek() != Some(b'{') {
        return;
    }
    if let Some(raw) = scan_delimited(scanner, b'{', b'}') {
        let mut attrs = crate::attrs::parse_attribute_list(&raw);
        if let Some(node) = p.stack.container_mut().children.last_mut() {
            extract_refs(&mut attrs, &mut node.properties);
            node.attributes.extend(attrs);
        }
    }
}

/// Move a `refs` key out of an attribute map into `properties` as
/// `PropertyValue::Refs` (spec.md §4.4.5).
fn extract_refs(attrs: &mut Attributes, properties: &mut Properties) {
    if let Some(AttrValue::List(refs)) = attrs.remove(prop::REFS) {
        properties.insert(prop::REFS.to_string(), PropertyValue::Refs(refs));
    }
}

/// Scan a balanced `open`...`close` run starting at the cursor, returning
/// its inner content and leaving the cursor just past `close`. Leaves the
/// cursor untouched and returns `None` if the line ends first.
fn scan_delimited(scanner: &mut Scanner, open: u8, close: u8) -> Option<String> {
    if scanner.peek() != Some(open) {
        return None;
    }
    let start = scanner.pos();
    scanner.advance(1);
    let content_start = scanner.pos();
    let mut depth = 1u32;
    loop {
        match scanner.peek() {
            None => {
                scanner.set_pos(start);
                return None;
            }
            Some(b) if b == close => {
                depth -= 1;
                if depth == 0 {
                    let content = scanner.slice(content_start, scanner.pos());
                    let text = String::from_utf8_lossy(content).into_owned();
                    scanner.advance(1);
                    return Some(text);
                }
                scanner.advance(1);
            }
            Some(b) if b == open && open != close => {
                depth += 1;
                scanner.advance(1);
            }
            Some(_) => {
                scanner.advance(1);
            }
        }
    }
}

fn push_text(p: &mut Parser, text: &str) {
    push_or_merge_text(&mut p.stack.container_mut().children, text.to_string());
}
