//! The crate's public error taxonomy (spec.md §7).
//!
//! Parsing itself never fails — malformed markup degrades to literal text
//! per spec.md §9 — so the only fallible seams are configuration lookups and
//! rendering. Both get a small `thiserror` enum rather than a hand-rolled
//! `Display` impl, the way a `thiserror` consumer elsewhere in this workspace
//! does it.

use crate::node::NodeType;

/// A configuration-time error: the caller asked for something that isn't
/// wired up (spec.md §7 "ConfigurationError").
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("no extension registered for {0:?} and no default extension is configured")]
    UnknownExtension(String),
}

/// An internal error surfaced by a [`crate::render::Renderer`] implementation
/// (spec.md §7 "InternalError").
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("renderer has no case for node type {0:?}")]
    UnsupportedNode(NodeType),
}
