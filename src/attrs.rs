//! Attribute-list grammar (spec.md §4.5): the payload of a block
//! `{...}` line or an inline `{...}` immediately after a span/link.
//!
//! Works over a `Vec<char>` rather than the raw `&str`/byte scanner the rest
//! of the parser uses — attribute lists are short and this keeps the
//! quoted-value escape handling simple and UTF-8 correct without juggling
//! byte offsets into multi-byte characters.

use crate::node::{AttrValue, Attributes};

/// Parse the payload between `{` and `}` into attributes. `#id`, `.class`
/// (repeatable, space-joined), `key=value` (bare or double-quoted with
/// backslash escapes), and bare tokens (collected under the reserved `refs`
/// key) may appear in any order, separated by whitespace.
pub fn parse_attribute_list(content: &str) -> Attributes {
    let chars: Vec<char> = content.chars().collect();
    let mut attrs = Attributes::new();
    let mut refs: Vec<String> = Vec::new();
    let mut i = 0;
    let len = chars.len();

    while i < len {
        while i < len && chars[i].is_whitespace() {
            i += 1;
        }
        if i >= len {
            break;
        }
        match chars[i] {
            '#' => {
                let (tok, next) = read_bare_token(&chars, i + 1);
                if !tok.is_empty() {
                    attrs.insert("id".to_string(), AttrValue::Text(tok));
                }
                i = next;
            }
            '.' => {
                let (tok, next) = read_bare_token(&chars, i + 1);
                if !tok.is_empty() {
                    merge_class(&mut attrs, &tok);
                }
                i = next;
            }
            _ => {
                let key_start = i;
                let key_end = read_key_end(&chars, i);
                if key_end < len && chars[key_end] == '=' {
                    let key: String = chars[key_start..key_end].iter().collect();
                    let (value, next) = read_value(&chars, key_end + 1);
                    if key == "class" {
                        merge_class(&mut attrs, &value);
                    } else if !key.is_empty() {
                        attrs.insert(key, AttrValue::Text(value));
                    }
                    i = next;
                } else {
                    let tok: String = chars[key_start..key_end].iter().collect();
                    if !tok.is_empty() {
                        refs.push(tok);
                    }
                    i = key_end;
                }
            }
        }
    }

    if !refs.is_empty() {
        attrs.insert("refs".to_string(), AttrValue::List(refs));
    }
    attrs
}

fn merge_class(attrs: &mut Attributes, class: &str) {
    match attrs.get_mut("class") {
        Some(AttrValue::Text(existing)) => {
            existing.push(' ');
            existing.push_str(class);
        }
        _ => {
            attrs.insert("class".to_string(), AttrValue::Text(class.to_string()));
        }
    }
}

fn read_bare_token(chars: &[char], start: usize) -> (String, usize) {
    let mut i = start;
    while i < chars.len() && !chars[i].is_whitespace() {
        i += 1;
    }
    (chars[start..i].iter().collect(), i)
}

/// End of a would-be key: stops at whitespace or `=`, whichever is first.
fn read_key_end(chars: &[char], start: usize) -> usize {
    let mut i = start;
    while i < chars.len() && !chars[i].is_whitespace() && chars[i] != '=' {
        i += 1;
    }
    i
}

fn read_value(chars: &[char], start: usize) -> (String, usize) {
    match chars.get(start) {
        Some(&quote @ ('"' | '\'')) => {
            let mut out = String::new();
            let mut i = start + 1;
            while i < chars.len() {
                match chars[i] {
                    '\\' if i + 1 < chars.len() => {
                        out.push(chars[i + 1]);
                        i += 2;
                    }
                    c if c == quote => {
                        i += 1;
                        break;
                    }
                    c => {
                        out.push(c);
                        i += 1;
                    }
                }
            }
            (out, i)
        }
        _ => read_bare_token(chars, start),
    }
}
