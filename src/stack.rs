//! The active parsing context: an ordered path from the root to the
//! currently open container, with a movable cursor level re-walked for every
//! source line (spec.md §4.2).
//!
//! Nodes are *not* spliced into the tree at open time and spliced back out on
//! a forced close — in safe Rust that would need an arena or
//! `Rc<RefCell<_>>` tree with no offsetting benefit here. Instead each open
//! container is a [`Frame`] that owns its own pending `children: Vec<Node>`;
//! `close_node` pops a frame, turns it into a finished [`Node`], and pushes
//! that node into the new top frame's children (or, for an inline frame
//! that's being force-closed rather than deliberately matched, splices its
//! marker and children back in as literal text — spec.md §9 "unclosed inline
//! becomes literal"). The observable tree is identical either way; only the
//! mechanism differs from a pointer-stack over a pre-built tree.

use crate::node::{Attributes, Category, ContentModel, Node, NodeType, Properties};

/// An open container: everything a finished [`Node`] needs, plus the
/// bookkeeping the stack itself uses while it's still accepting children.
#[derive(Debug)]
pub struct Frame {
    pub node_type: NodeType,
    pub content_model: ContentModel,
    pub content: Option<String>,
    pub attributes: Attributes,
    pub properties: Properties,
    pub children: Vec<Node>,
    /// Set for list_item / extension_block (spec.md §4.2 `enter_indented`).
    pub indent: Option<usize>,
    /// The literal marker character(s) this frame opened with, used to
    /// rebuild the original text if the frame is force-closed unclosed
    /// (spec.md §9).
    pub marker: Option<String>,
}

impl Frame {
    pub fn new(node_type: NodeType) -> Self {
        Frame {
            content_model: node_type.default_content_model(),
            node_type,
            content: None,
            attributes: Attributes::new(),
            properties: Properties::new(),
            children: Vec::new(),
            indent: None,
            marker: None,
        }
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = Some(indent);
        self
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    fn into_node(self) -> Node {
        let mut properties = self.properties;
        if let Some(marker) = self.marker {
            properties
                .entry(crate::node::prop::MARKER.to_string())
                .or_insert(crate::node::PropertyValue::Text(marker));
        }
        Node {
            node_type: self.node_type,
            content_model: self.content_model,
            content: self.content,
            attributes: self.attributes,
            properties,
            children: self.children,
        }
    }
}

pub struct Stack {
    frames: Vec<Frame>,
    level: usize,
}

impl Stack {
    pub fn new() -> Self {
        Stack {
            frames: vec![Frame::new(NodeType::Root)],
            level: 0,
        }
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn reset_level(&mut self) {
        self.level = 0;
    }

    pub fn container(&self) -> &Frame {
        &self.frames[self.level]
    }

    pub fn container_mut(&mut self) -> &mut Frame {
        &mut self.frames[self.level]
    }

    pub fn top(&self) -> &Frame {
        self.frames.last().expect("root frame always present")
    }

    pub fn top_mut(&mut self) -> &mut Frame {
        self.frames.last_mut().expect("root frame always present")
    }

    pub fn last_child(&self) -> Option<&Node> {
        self.container().children.last()
    }

    /// The frame directly below the current container on the stack, if any
    /// — used to decide whether a new list-item marker continues the
    /// currently open list or must start a new one.
    pub fn peek_next(&self) -> Option<&Frame> {
        self.frames.get(self.level + 1)
    }

    pub fn frame_at(&self, level: usize) -> &Frame {
        &self.frames[level]
    }

    pub fn frame_at_mut(&mut self, level: usize) -> &mut Frame {
        &mut self.frames[level]
    }

    /// Spec.md §4.2: true iff the cursor has already reached the bottom of
    /// the stack (nothing is open beneath it), or the bottom frame's last
    /// child is blank. Deliberately checks the *bottom* frame (`top()`), not
    /// the cursor's own container: with frames deferring their children
    /// until they're popped, a still-open paragraph or emphasis run below
    /// the cursor never shows up in the cursor's own `children` — checking
    /// the cursor's container directly would report every continuation line
    /// of an open paragraph as a fresh boundary.
    pub fn block_boundary(&self) -> bool {
        if self.level + 1 == self.frames.len() {
            return true;
        }
        match self.top().children.last() {
            None => true,
            Some(n) => n.is_blank(),
        }
    }

    pub fn enter(&mut self) {
        if self.level + 1 < self.frames.len() {
            self.level += 1;
        }
    }

    /// Move the cursor to whatever is currently the innermost open frame —
    /// used when a line continues a paragraph/header whose inline nodes may
    /// still be open from a previous line, since `enter_indented` only walks
    /// through block containers that carry an `indent` property.
    pub fn enter_to_bottom(&mut self) {
        self.level = self.frames.len() - 1;
    }

    /// Descend through already-open indented containers (list_item,
    /// extension_block) whose `indent` is `<= indent` (spec.md §4.2).
    pub fn enter_indented(&mut self, indent: usize) {
        loop {
            let next = self.level + 1;
            if next >= self.frames.len() {
                break;
            }
            match self.frames[next].indent {
                Some(cand) if cand <= indent => self.level = next,
                _ => break,
            }
        }
    }

    /// Innermost stack index holding `node_type`, searching top-down; stops
    /// at (and does not cross) any open verbatim-content inline node unless
    /// that node is itself the target (spec.md §4.2).
    pub fn node_level(&self, node_type: NodeType) -> Option<usize> {
        for idx in (0..self.frames.len()).rev() {
            let f = &self.frames[idx];
            if f.node_type == node_type {
                return Some(idx);
            }
            if f.content_model == ContentModel::Verbatim {
                return None;
            }
        }
        None
    }

    /// Append a leaf (non-container) node to the current container, closing
    /// whatever was open above the cursor first.
    pub fn append_leaf(&mut self, node: Node) {
        self.close_node(self.level + 1, true);
        self.frames[self.level].children.push(node);
    }

    /// Open a new container as a child of the current container and move the
    /// cursor into it.
    pub fn open_container(&mut self, frame: Frame) {
        self.close_node(self.level + 1, true);
        self.frames.push(frame);
        self.level = self.frames.len() - 1;
    }

    /// Truncate the stack so `depth() == level`, finishing every popped
    /// frame into a `Node` and pushing it into the new top frame's children.
    ///
    /// `rewrite_top` controls whether the *last* frame popped (the one that
    /// originally sat at index `level`) is rewritten as unclosed literal text
    /// like every frame popped above it, or kept as itself. Callers that are
    /// deliberately closing a matched node (closing marker, verbatim toggle,
    /// bracket resolution, attribute list close) pass `false` so the node
    /// they matched survives as itself; callers force-closing everything
    /// still open at a block boundary pass `true`.
    pub fn close_node(&mut self, level: usize, rewrite_top: bool) {
        while self.frames.len() > level {
            let idx = self.frames.len() - 1;
            let frame = self.frames.pop().unwrap();
            let is_target = idx == level;
            let node = frame.into_node();
            let should_rewrite = node.category() == Category::Inline
                && !node.node_type.is_transient()
                && (!is_target || rewrite_top);
            let parent = self.frames.last_mut().expect("root frame never popped");
            if should_rewrite {
                rewrite_unclosed_inline(node, &mut parent.children);
            } else {
                parent.children.push(node);
            }
        }
        self.level = self.frames.len() - 1;
    }

    /// Detach exactly the top frame without finalizing it into the tree at
    /// all — used for transient `span_data` / `attribute_list` nodes once
    /// their content has been read out (spec.md §4.2 `remove_node`).
    pub fn remove_top(&mut self) -> Frame {
        assert!(self.frames.len() > 1, "cannot remove the root frame");
        let frame = self.frames.pop().unwrap();
        self.level = self.level.min(self.frames.len() - 1);
        frame
    }

    /// Open inline nodes with a verbatim content model, innermost first
    /// (spec.md §4.2 `each_inline_verbatim`).
    pub fn each_inline_verbatim_mut(&mut self) -> impl Iterator<Item = &mut Frame> {
        self.frames
            .iter_mut()
            .rev()
            .filter(|f| f.content_model == ContentModel::Verbatim)
    }

    /// Finalize the whole document (spec.md §4.3 `finish`): close everything
    /// down to the root and return it.
    pub fn finish(mut self) -> Node {
        self.close_node(1, true);
        self.frames.pop().unwrap().into_node()
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

/// Splice a force-closed inline node's marker and content back in as literal
/// text (spec.md §9). The node's first child, if it is `text`, is folded
/// into the synthesized marker text; any remaining children are re-appended
/// as siblings after it.
fn rewrite_unclosed_inline(node: Node, parent_children: &mut Vec<Node>) {
    let mut literal = node.properties.get(crate::node::prop::MARKER).map_or_else(
        || node.content.clone().unwrap_or_default(),
        |m| match m {
            crate::node::PropertyValue::Char(c) => c.to_string(),
            crate::node::PropertyValue::Text(s) => s.clone(),
            _ => String::new(),
        },
    );
    if node.properties.get(crate::node::prop::MARKER).is_none() {
        if let Some(content) = &node.content {
            literal = content.clone();
        }
    }

    let mut children = node.children;
    let mut merged_first = false;
    if let Some(first) = children.first() {
        if first.node_type == NodeType::Text {
            if let Some(text) = &first.content {
                literal.push_str(text);
            }
            merged_first = true;
        }
    }
    if merged_first {
        children.remove(0);
    }

    push_or_merge_text(parent_children, literal);
    parent_children.extend(children);
}

/// Append `text` as a `text` node, merging into a trailing `text` node if one
/// is already last (spec.md §4.4 "merging into the previous text node").
pub fn push_or_merge_text(children: &mut Vec<Node>, text: String) {
    if text.is_empty() {
        return;
    }
    if let Some(last) = children.last_mut() {
        if last.node_type == NodeType::Text {
            last.content.get_or_insert_with(String::new).push_str(&text);
            return;
        }
    }
    let mut node = Node::new(NodeType::Text);
    node.content = Some(text);
    children.push(node);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::prop;
    use crate::node::PropertyValue;

    #[test]
    fn append_leaf_goes_into_current_container() {
        let mut s = Stack::new();
        let mut n = Node::new(NodeType::Blank);
        n.content = None;
        s.append_leaf(n);
        assert_eq!(s.container().children.len(), 1);
    }

    #[test]
    fn open_and_close_container_round_trips() {
        let mut s = Stack::new();
        s.open_container(Frame::new(NodeType::Paragraph));
        assert_eq!(s.level(), 1);
        s.append_leaf(Node::new(NodeType::Text));
        s.close_node(1, true);
        assert_eq!(s.level(), 0);
        let root = s.finish();
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].node_type, NodeType::Paragraph);
        assert_eq!(root.children[0].children.len(), 1);
    }

    #[test]
    fn force_close_rewrites_unclosed_marker_to_text() {
        let mut s = Stack::new();
        s.open_container(Frame::new(NodeType::Paragraph));
        let mut frame = Frame::new(NodeType::Emphasis).with_marker("_");
        frame.properties.insert(prop::MARKER.to_string(), PropertyValue::Char('_'));
        s.open_container(frame);
        s.append_leaf({
            let mut t = Node::new(NodeType::Text);
            t.content = Some("hi".into());
            t
        });
        // Force-close everything back to root: the unclosed emphasis must
        // degrade to literal "_hi", not an emphasis node.
        s.close_node(1, true);
        let root = s.finish();
        let para = &root.children[0];
        assert_eq!(para.children.len(), 1);
        assert_eq!(para.children[0].node_type, NodeType::Text);
        assert_eq!(para.children[0].content.as_deref(), Some("_hi"));
    }

    #[test]
    fn deliberate_close_keeps_the_matched_node() {
        let mut s = Stack::new();
        s.open_container(Frame::new(NodeType::Paragraph));
        let mut frame = Frame::new(NodeType::Emphasis).with_marker("_");
        frame.properties.insert(prop::MARKER.to_string(), PropertyValue::Char('_'));
        let emphasis_level = {
            s.open_container(frame);
            s.level()
        };
        s.append_leaf({
            let mut t = Node::new(NodeType::Text);
            t.content = Some("hi".into());
            t
        });
        s.close_node(emphasis_level, false);
        let root = s.finish();
        let para = &root.children[0];
        assert_eq!(para.children[0].node_type, NodeType::Emphasis);
    }

    #[test]
    fn node_level_stops_at_verbatim_boundary() {
        let mut s = Stack::new();
        s.open_container(Frame::new(NodeType::Paragraph));
        s.open_container(Frame::new(NodeType::Strong));
        let mut verbatim = Frame::new(NodeType::Verbatim);
        verbatim.content_model = ContentModel::Verbatim;
        s.open_container(verbatim);
        assert_eq!(s.node_level(NodeType::Strong), None);
        assert!(s.node_level(NodeType::Verbatim).is_some());
    }
}
