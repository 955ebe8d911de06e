//! Block-level dispatch (spec.md §4.3): one call per source line, deciding
//! which container it continues or opens.

use super::inlines;
use super::Parser;
use crate::attrs::parse_attribute_list;
use crate::node::{prop, Attributes, ContentModel, ListMarker, Node, NodeType, PropertyValue};
use crate::stack::Frame;

pub(super) fn dispatch_line(p: &mut Parser, raw: &str) {
    if feed_owned_extension_block(p, raw) {
        return;
    }

    let (_, mut rest) = split_indent(raw);

    loop {
        let (bq_indent, after_indent) = split_indent(rest);
        if bq_indent > 3 {
            break;
        }
        match after_indent.strip_prefix('>') {
            Some(after_marker) => {
                let after_marker = after_marker.strip_prefix(' ').unwrap_or(after_marker);
                enter_or_open_blockquote(p);
                rest = after_marker;
            }
            None => break,
        }
    }

    let (indent, rest) = split_indent(rest);
    p.stack.enter_indented(indent);

    if p.pending_ref_name.is_some() && try_reference_continuation(p, rest) {
        return;
    }

    if rest.is_empty() {
        handle_blank(p);
        return;
    }

    if let Some(inner) = try_block_attrs(rest) {
        log::debug!(target: "marqueur::parser", "line {}: block attribute list {:?}", p.line_no, inner);
        p.pending_attrs = Some(parse_attribute_list(inner));
        return;
    }

    // Headers run their own three-way boundary check (spec.md §4.3 "Header")
    // rather than being gated by `block_boundary()` outright: a `#` line can
    // open a new header, continue an already-open header of the same level,
    // or (neither applying) fall through as literal text into whatever is
    // already open — so it has to be checked ahead of, and independently of,
    // the boundary-gated block below.
    if let Some((level, text)) = try_header(rest) {
        if p.stack.block_boundary() {
            log::debug!(target: "marqueur::parser", "line {}: header level {level}", p.line_no);
            open_header(p, level);
            inlines::process_line(p, text, false);
            return;
        }
        if header_continues(p, level) {
            p.stack.enter_to_bottom();
            inlines::process_line(p, text, true);
            return;
        }
    }

    if p.stack.block_boundary() {
        if let Some((name, dest)) = try_reference_definition(rest) {
            let name = name.trim();
            if !name.is_empty() {
                if dest.is_empty() {
                    p.pending_ref_name = Some(name.to_string());
                } else {
                    log::debug!(target: "marqueur::parser", "reference definition {name:?} -> {dest:?}");
                    p.context
                        .link_destinations
                        .insert(name.to_string(), dest.trim().to_string());
                }
                return;
            }
        }

        if let Some((name, content)) = try_extension_marker(rest) {
            match open_extension_block(p, name, indent) {
                Some(true) => {
                    log::debug!(target: "marqueur::parser", "line {}: extension block {name:?} (owns parsing)", p.line_no);
                    if !content.is_empty() {
                        feed_extension_line(p, name, content);
                    }
                    return;
                }
                Some(false) => {
                    log::debug!(target: "marqueur::parser", "line {}: extension block {name:?}", p.line_no);
                    if !content.is_empty() {
                        inlines::process_line(p, content, false);
                    }
                    return;
                }
                None => {
                    log::warn!(target: "marqueur::parser", "unknown extension {name:?}, falling back to paragraph");
                }
            }
        }
    }

    if let Some((marker, consumed, start, content)) = try_list_marker(rest) {
        open_list_item(p, indent, marker, start, consumed);
        if !content.is_empty() {
            inlines::process_line(p, content, false);
        }
        return;
    }

    handle_paragraph(p, rest);
}

fn handle_blank(p: &mut Parser) {
    let mut node = Node::new(NodeType::Blank);
    node.attributes = take_pending_attrs(p);
    p.stack.append_leaf(node);
}

fn handle_paragraph(p: &mut Parser, rest: &str) {
    if p.stack.block_boundary() {
        let mut frame = Frame::new(NodeType::Paragraph);
        frame.attributes = take_pending_attrs(p);
        p.stack.open_container(frame);
        inlines::process_line(p, rest, false);
    } else {
        p.stack.enter_to_bottom();
        inlines::process_line(p, rest, true);
    }
}

/// Whether the bottommost open frame is a header of the same `level` — the
/// still-open header stays a `Frame` (not yet a `Node`) exactly like an open
/// paragraph, so "continuation" here means descending back into it rather
/// than mutating an already-finished sibling node (spec.md §3 Lifecycle: a
/// node's identity is stable once created).
fn header_continues(p: &Parser, level: usize) -> bool {
    let top = p.stack.top();
    top.node_type == NodeType::Header && top.properties.get(prop::LEVEL) == Some(&PropertyValue::UInt(level))
}

fn open_header(p: &mut Parser, level: usize) {
    let mut frame = Frame::new(NodeType::Header);
    frame.attributes = take_pending_attrs(p);
    frame
        .properties
        .insert(prop::LEVEL.to_string(), PropertyValue::UInt(level));
    p.stack.open_container(frame);
}

/// Open `::name:` (spec.md §4.3). Returns `None` for an unregistered name
/// (caller falls back to a paragraph), otherwise `Some(owns_parsing)`: when
/// the extension owns parsing, subsequent lines are fed to it verbatim by
/// [`feed_owned_extension_block`] instead of running ordinary block dispatch.
fn open_extension_block(p: &mut Parser, name: &str, indent: usize) -> Option<bool> {
    let ext = p.context.try_extension(name)?;
    let mut tmp = Node::new(NodeType::ExtensionBlock);
    ext.on_block_open(name, &mut tmp);

    let owns_parsing = ext.parses_content();
    let mut container_indent = indent + 1;
    if !owns_parsing {
        if let Some(attr_indent) = take_indent_attr(p) {
            container_indent = container_indent.max(attr_indent);
        }
    }

    let mut frame = Frame::new(NodeType::ExtensionBlock).with_indent(container_indent);
    frame.content_model = if owns_parsing {
        ContentModel::Special
    } else {
        ContentModel::Block
    };
    frame.attributes = take_pending_attrs(p);
    frame.properties = tmp.properties;
    frame
        .properties
        .entry(prop::NAME.to_string())
        .or_insert_with(|| PropertyValue::Text(name.to_string()));
    p.stack.open_container(frame);
    Some(owns_parsing)
}

/// Pull an `indent` key out of the pending block attribute list and parse it
/// as a column count (spec.md §4.3: "if the extension does NOT parse content
/// itself, also raise [indent] to at least the `indent` attribute if
/// present, removing it from the attributes map").
fn take_indent_attr(p: &mut Parser) -> Option<usize> {
    let attrs = p.pending_attrs.as_mut()?;
    attrs.remove(prop::INDENT)?.as_text()?.parse().ok()
}

/// While the bottommost open frame is an extension block that owns its own
/// parsing, feed it this raw line instead of running ordinary block dispatch
/// (spec.md §4.3 "consume subsequent lines"). Returns `true` once the line
/// is consumed; `false` means either this isn't applicable, or the indent
/// match just failed and the block finished — `raw` should fall through to
/// ordinary dispatch either way.
fn feed_owned_extension_block(p: &mut Parser, raw: &str) -> bool {
    let top = p.stack.top();
    if top.node_type != NodeType::ExtensionBlock || top.content_model != ContentModel::Special {
        return false;
    }
    let indent = top.indent.unwrap_or(0);
    let name = top
        .properties
        .get(prop::NAME)
        .and_then(PropertyValue::as_str)
        .unwrap_or_default()
        .to_string();

    let leading = raw.chars().take_while(|&c| c == ' ' || c == '\t').count();
    if leading >= indent {
        feed_extension_line(p, &name, &raw[indent..]);
        return true;
    }
    if raw[leading..].is_empty() {
        feed_extension_line(p, &name, "");
        return true;
    }

    finish_extension_block(p, &name);
    false
}

/// Run the extension's `parse_line` over one raw body line, round-tripping
/// the frame's state through a scratch `Node` the way [`open_extension_block`]
/// already does for `on_block_open`.
fn feed_extension_line(p: &mut Parser, name: &str, body: &str) {
    let Some(ext) = p.context.try_extension(name) else {
        return;
    };
    let level = p.stack.depth() - 1;
    let line = format!("{body}\n");
    let mut node = frame_to_scratch_node(p, level);
    ext.parse_line(&mut node, &line);
    scratch_node_into_frame(p, level, node);
}

/// Call `parsing_finished` on a still-open owns-parsing extension block when
/// the whole document ends, rather than a mismatched line (spec.md §8
/// scenario 8: `parsing_finished!` fires even when the input simply stops
/// right after the block's last content line).
pub(super) fn finish_pending_extension_block(p: &mut Parser) {
    let top = p.stack.top();
    if top.node_type != NodeType::ExtensionBlock || top.content_model != ContentModel::Special {
        return;
    }
    let name = top
        .properties
        .get(prop::NAME)
        .and_then(PropertyValue::as_str)
        .unwrap_or_default()
        .to_string();
    if let Some(ext) = p.context.try_extension(&name) {
        let level = p.stack.depth() - 1;
        let mut node = frame_to_scratch_node(p, level);
        ext.parsing_finished(&mut node);
        scratch_node_into_frame(p, level, node);
    }
}

fn finish_extension_block(p: &mut Parser, name: &str) {
    if let Some(ext) = p.context.try_extension(name) {
        let level = p.stack.depth() - 1;
        let mut node = frame_to_scratch_node(p, level);
        ext.parsing_finished(&mut node);
        scratch_node_into_frame(p, level, node);
    }
    let level = p.stack.depth() - 1;
    p.stack.close_node(level, false);
}

fn frame_to_scratch_node(p: &mut Parser, level: usize) -> Node {
    let frame = p.stack.frame_at_mut(level);
    let mut node = Node::new(NodeType::ExtensionBlock);
    node.content = frame.content.take();
    node.attributes = std::mem::take(&mut frame.attributes);
    node.properties = std::mem::take(&mut frame.properties);
    node.children = std::mem::take(&mut frame.children);
    node
}

fn scratch_node_into_frame(p: &mut Parser, level: usize, node: Node) {
    let frame = p.stack.frame_at_mut(level);
    frame.content = node.content;
    frame.attributes = node.attributes;
    frame.properties = node.properties;
    frame.children = node.children;
}

fn open_list_item(p: &mut Parser, indent: usize, marker: ListMarker, start: Option<usize>, consumed: usize) {
    let continues_open_list = matches!(
        p.stack.peek_next(),
        Some(f) if f.node_type == NodeType::List
            && f.properties.get(prop::MARKER) == Some(&PropertyValue::Marker(marker))
    );
    if continues_open_list {
        p.stack.enter();
    } else {
        let mut list_frame = Frame::new(NodeType::List);
        list_frame
            .properties
            .insert(prop::MARKER.to_string(), PropertyValue::Marker(marker));
        if let Some(start) = start {
            list_frame
                .properties
                .insert(prop::START.to_string(), PropertyValue::UInt(start));
        }
        p.stack.open_container(list_frame);
    }

    let mut item_frame = Frame::new(NodeType::ListItem).with_indent(indent + consumed);
    item_frame.attributes = take_pending_attrs(p);
    p.stack.open_container(item_frame);
}

fn enter_or_open_blockquote(p: &mut Parser) {
    let continues_open = matches!(p.stack.peek_next(), Some(f) if f.node_type == NodeType::Blockquote);
    if continues_open {
        p.stack.enter();
    } else {
        p.stack.open_container(Frame::new(NodeType::Blockquote));
    }
}

fn try_reference_continuation(p: &mut Parser, rest: &str) -> bool {
    let Some(name) = p.pending_ref_name.take() else {
        return false;
    };
    if rest.trim().is_empty() {
        false
    } else {
        p.context
            .link_destinations
            .insert(name, rest.trim().to_string());
        true
    }
}

fn take_pending_attrs(p: &mut Parser) -> Attributes {
    p.pending_attrs.take().unwrap_or_default()
}

/// Leading run of spaces/tabs, each counted as one column (spec.md §8
/// "indentation is measured in characters, not rendered width").
fn split_indent(s: &str) -> (usize, &str) {
    let mut indent = 0;
    let mut idx = 0;
    for c in s.chars() {
        if c == ' ' || c == '\t' {
            indent += 1;
            idx += c.len_utf8();
        } else {
            break;
        }
    }
    (indent, &s[idx..])
}

fn try_header(rest: &str) -> Option<(usize, &str)> {
    let hashes = rest.chars().take_while(|&c| c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let after = &rest[hashes..];
    if after.is_empty() {
        return Some((hashes, ""));
    }
    if !after.starts_with([' ', '\t']) {
        return None;
    }
    let text = after.trim_start_matches([' ', '\t']);
    let text = text.trim_end();
    let text = text.trim_end_matches('#').trim_end();
    Some((hashes, text))
}

fn try_extension_marker(rest: &str) -> Option<(&str, &str)> {
    let rest = rest.strip_prefix("::")?;
    let name_len = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .count();
    if name_len == 0 {
        return None;
    }
    let name = &rest[..name_len];
    let after = rest[name_len..].strip_prefix(':')?;
    Some((name, after.trim_start_matches([' ', '\t'])))
}

fn try_block_attrs(rest: &str) -> Option<&str> {
    let trimmed = rest.trim_end();
    if trimmed.len() >= 2 && trimmed.starts_with('{') && trimmed.ends_with('}') {
        Some(&trimmed[1..trimmed.len() - 1])
    } else {
        None
    }
}

fn try_reference_definition(rest: &str) -> Option<(&str, &str)> {
    let rest = rest.strip_prefix('[')?;
    let end = rest.find(']')?;
    let name = &rest[..end];
    let after = rest[end + 1..].strip_prefix(':')?;
    Some((name, after.trim()))
}

fn try_list_marker(rest: &str) -> Option<(ListMarker, usize, Option<usize>, &str)> {
    let bytes = rest.as_bytes();
    let first = *bytes.first()?;
    match first {
        b'*' | b'+' | b'-' => {
            let marker = ListMarker::from_byte(first)?;
            let after = &rest[1..];
            if after.is_empty() {
                return Some((marker, 1, None, ""));
            }
            if !after.starts_with([' ', '\t']) {
                return None;
            }
            let content = after.trim_start_matches([' ', '\t']);
            let consumed = rest.len() - content.len();
            Some((marker, consumed, None, content))
        }
        b'0'..=b'9' => {
            let digit_len = rest.bytes().take_while(u8::is_ascii_digit).count();
            if digit_len == 0 || digit_len > 9 {
                return None;
            }
            let after_digits = &rest[digit_len..];
            if !after_digits.starts_with(['.', ')']) {
                return None;
            }
            let start_num: usize = rest[..digit_len].parse().ok()?;
            let after_punct = &after_digits[1..];
            if after_punct.is_empty() {
                return Some((ListMarker::Decimal, digit_len + 1, Some(start_num), ""));
            }
            if !after_punct.starts_with([' ', '\t']) {
                return None;
            }
            let content = after_punct.trim_start_matches([' ', '\t']);
            let consumed = rest.len() - content.len();
            Some((ListMarker::Decimal, consumed, Some(start_num), content))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_indent_counts_leading_whitespace() {
        assert_eq!(split_indent("   abc"), (3, "abc"));
        assert_eq!(split_indent("abc"), (0, "abc"));
    }

    #[test]
    fn try_header_requires_space_after_hashes() {
        assert_eq!(try_header("## Title"), Some((2, "Title")));
        assert_eq!(try_header("##Title"), None);
        assert_eq!(try_header("####### too many"), None);
    }

    #[test]
    fn try_list_marker_parses_bullet_and_ordered() {
        let (m, consumed, start, content) = try_list_marker("- item").unwrap();
        assert_eq!(m, ListMarker::Minus);
        assert_eq!(consumed, 2);
        assert_eq!(start, None);
        assert_eq!(content, "item");

        let (m, _, start, content) = try_list_marker("12) item").unwrap();
        assert_eq!(m, ListMarker::Decimal);
        assert_eq!(start, Some(12));
        assert_eq!(content, "item");
    }

    #[test]
    fn try_extension_marker_splits_name_and_trailing_content() {
        assert_eq!(try_extension_marker("::note: hello"), Some(("note", "hello")));
        assert_eq!(try_extension_marker("::note:"), Some(("note", "")));
        assert_eq!(try_extension_marker("not an extension"), None);
    }

    #[test]
    fn try_reference_definition_allows_missing_destination() {
        assert_eq!(try_reference_definition("[foo]: https://example.com"), Some(("foo", "https://example.com")));
        assert_eq!(try_reference_definition("[foo]:"), Some(("foo", "")));
    }
}
