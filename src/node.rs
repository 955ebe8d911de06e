//! AST node definitions: the single data type every parser stage builds and
//! every renderer walks. See spec.md §3 for the data model this mirrors.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The tagged variant of an AST element (spec.md §3, §4.2 block/inline table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Root,
    Blank,
    Paragraph,
    Header,
    Blockquote,
    List,
    ListItem,
    ExtensionBlock,

    Text,
    SoftBreak,
    HardBreak,
    Verbatim,
    Strong,
    Emphasis,
    Subscript,
    Superscript,
    Link,
    Span,
    InlineExtension,

    /// Transient: holds verbatim text between `[`/`:name:...` and its closing
    /// bracket/paren while the span it belongs to is still open. Never
    /// survives `Parser::finish` (spec.md §3 invariant 6).
    SpanData,
    /// Transient: holds the raw `{...}` payload of an inline attribute list
    /// while it is still open. Never survives `Parser::finish`.
    AttributeList,
}

impl NodeType {
    /// The category fixed per type (spec.md §3). `Span`/`SpanData`/`AttributeList`
    /// are transient inline helpers and report `Inline` like the nodes they
    /// eventually resolve into.
    pub fn category(self) -> Category {
        use NodeType::*;
        match self {
            Root | Blank | Paragraph | Header | Blockquote | List | ListItem
            | ExtensionBlock => Category::Block,
            Text | SoftBreak | HardBreak | Verbatim | Strong | Emphasis | Subscript
            | Superscript | Link | Span | InlineExtension | SpanData | AttributeList => {
                Category::Inline
            }
        }
    }

    /// The content model fixed per type. `ExtensionBlock`'s model is decided
    /// at parse time (block vs. the extension's own `:special`) and is stored
    /// as an override property rather than derived here.
    pub fn default_content_model(self) -> ContentModel {
        use NodeType::*;
        match self {
            Root | Blockquote | List => ContentModel::Block,
            ListItem | ExtensionBlock => ContentModel::Block,
            Blank => ContentModel::None,
            Paragraph | Header => ContentModel::Inline,
            Text => ContentModel::Text,
            SoftBreak | HardBreak => ContentModel::None,
            Verbatim | SpanData | AttributeList => ContentModel::Verbatim,
            Strong | Emphasis | Subscript | Superscript | Link | Span | InlineExtension => {
                ContentModel::Inline
            }
        }
    }

    pub fn is_transient(self) -> bool {
        matches!(self, NodeType::SpanData | NodeType::AttributeList)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Block,
    Inline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentModel {
    Block,
    Inline,
    Text,
    Verbatim,
    /// An extension owns raw-line consumption for this block itself
    /// (spec.md §4.3, §6.1 `parse_content?`); no nested block dispatch runs
    /// over it.
    Special,
    None,
}

/// List marker kind (spec.md §3, §4.3 "List item").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListMarker {
    Asterisk,
    Plus,
    Minus,
    Decimal,
}

impl ListMarker {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            b'*' => Some(ListMarker::Asterisk),
            b'+' => Some(ListMarker::Plus),
            b'-' => Some(ListMarker::Minus),
            b'0'..=b'9' => Some(ListMarker::Decimal),
            _ => None,
        }
    }
}

/// An attribute value: plain HTML-style attributes are single strings, but
/// the reserved `refs` key (spec.md §3, §4.5) holds an ordered list of bare
/// reference tokens instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Text(String),
    List(Vec<String>),
}

impl AttrValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            AttrValue::List(_) => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Text(s) => write!(f, "{s}"),
            AttrValue::List(items) => write!(f, "{}", items.join(" ")),
        }
    }
}

/// Attributes map: HTML-style `id`/`class`/arbitrary keys (spec.md §3).
pub type Attributes = BTreeMap<String, AttrValue>;

/// Arbitrary parser/renderer state attached to a node (spec.md §3): header
/// level, list marker, indentation, extension name, link destination, the
/// marker character an inline node opened with, the byte position a
/// verbatim-content node is still copying from, and so on. Keys are the
/// `prop::*` constants below so both the parser and any extension can share
/// them by name without a closed enum of "the" property set.
pub type Properties = BTreeMap<String, PropertyValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Int(i64),
    UInt(usize),
    Text(String),
    Char(char),
    Bool(bool),
    Marker(ListMarker),
    ContentModel(ContentModel),
    Refs(Vec<String>),
}

impl PropertyValue {
    pub fn as_usize(&self) -> Option<usize> {
        match self {
            PropertyValue::UInt(n) => Some(*n),
            PropertyValue::Int(n) if *n >= 0 => Some(*n as usize),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            PropertyValue::Char(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_marker(&self) -> Option<ListMarker> {
        match self {
            PropertyValue::Marker(m) => Some(*m),
            _ => None,
        }
    }

    pub fn as_content_model(&self) -> Option<ContentModel> {
        match self {
            PropertyValue::ContentModel(cm) => Some(*cm),
            _ => None,
        }
    }
}

/// Property key constants (spec.md §3 "key properties", §9).
pub mod prop {
    pub const LEVEL: &str = "level";
    pub const MARKER: &str = "marker";
    pub const START: &str = "start";
    pub const INDENT: &str = "indent";
    pub const NAME: &str = "name";
    pub const CONTENT_MODEL: &str = "content_model";
    pub const DESTINATION: &str = "destination";
    pub const REFERENCE: &str = "reference";
    pub const DATA: &str = "data";
    pub const POS: &str = "pos";
    pub const REFS: &str = "refs";
    pub const DATA_TYPE: &str = "data_type";
    pub const GLYPH: &str = "glyph";
}

/// The AST element (spec.md §3). A node owns its `children`, `content`,
/// `attributes` and `properties`; the tree has no cycles and no shared
/// sub-trees (spec.md §5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub node_type: NodeType,
    pub content_model: ContentModel,
    pub content: Option<String>,
    pub attributes: Attributes,
    pub properties: Properties,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(node_type: NodeType) -> Self {
        Node {
            content_model: node_type.default_content_model(),
            node_type,
            content: None,
            attributes: Attributes::new(),
            properties: Properties::new(),
            children: Vec::new(),
        }
    }

    pub fn category(&self) -> Category {
        self.node_type.category()
    }

    pub fn is_blank(&self) -> bool {
        self.node_type == NodeType::Blank
    }

    pub fn prop_usize(&self, key: &str) -> Option<usize> {
        self.properties.get(key).and_then(PropertyValue::as_usize)
    }

    pub fn prop_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(PropertyValue::as_str)
    }

    pub fn set_prop(&mut self, key: &str, value: PropertyValue) {
        self.properties.insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_type_category_matches_spec_table() {
        assert_eq!(NodeType::List.category(), Category::Block);
        assert_eq!(NodeType::ListItem.category(), Category::Block);
        assert_eq!(NodeType::Verbatim.category(), Category::Inline);
        assert_eq!(NodeType::Verbatim.default_content_model(), ContentModel::Verbatim);
    }

    #[test]
    fn transient_types_are_flagged() {
        assert!(NodeType::SpanData.is_transient());
        assert!(NodeType::AttributeList.is_transient());
        assert!(!NodeType::Span.is_transient());
    }

    #[test]
    fn attr_value_display_joins_lists_with_space() {
        let v = AttrValue::List(vec!["a".into(), "b".into()]);
        assert_eq!(v.to_string(), "a b");
    }
}
