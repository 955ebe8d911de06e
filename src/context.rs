//! Shared configuration and cross-call state for a parsing session
//! (spec.md §6, §9 "Reference-link table").

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::CoreError;
use crate::extension::{EmojiExtension, Extension, NoteExtension};

/// Registered extensions plus the reference-link destination table.
///
/// A `Context` is reusable across repeated `Parser::parse` calls (spec.md §9
/// resolves the open question of reference-definition scope this way:
/// definitions persist for the life of the `Context`, not just one `parse`
/// call), so it owns `link_destinations` rather than the `Parser` owning it.
pub struct Context {
    by_name: HashMap<String, Rc<dyn Extension>>,
    default: Option<Rc<dyn Extension>>,
    pub link_destinations: HashMap<String, String>,
}

impl Context {
    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }

    /// Look up the extension registered for `name`, falling back to the
    /// context's default extension (spec.md §7 ConfigurationError).
    pub fn extension(&self, name: &str) -> Result<Rc<dyn Extension>, CoreError> {
        if let Some(ext) = self.by_name.get(name) {
            return Ok(Rc::clone(ext));
        }
        self.default
            .clone()
            .ok_or_else(|| CoreError::UnknownExtension(name.to_string()))
    }

    /// Same lookup as [`Context::extension`], but `Ok(None)` instead of an
    /// error when nothing is registered and there is no default — used by
    /// inline dispatch, where an unmatched `:name:` should just fall back to
    /// literal text rather than abort parsing (spec.md §9, parsing never
    /// fails).
    pub fn try_extension(&self, name: &str) -> Option<Rc<dyn Extension>> {
        self.by_name
            .get(name)
            .cloned()
            .or_else(|| self.default.clone())
    }
}

pub struct ContextBuilder {
    by_name: HashMap<String, Rc<dyn Extension>>,
    default: Option<Rc<dyn Extension>>,
    link_destinations: HashMap<String, String>,
}

impl ContextBuilder {
    pub fn new() -> Self {
        ContextBuilder {
            by_name: HashMap::new(),
            default: None,
            link_destinations: HashMap::new(),
        }
    }

    pub fn with_extension(mut self, extension: impl Extension + 'static) -> Self {
        let ext: Rc<dyn Extension> = Rc::new(extension);
        for name in ext.names() {
            self.by_name.insert((*name).to_string(), Rc::clone(&ext));
        }
        self
    }

    pub fn with_default_extension(mut self, extension: impl Extension + 'static) -> Self {
        self.default = Some(Rc::new(extension));
        self
    }

    /// Registers the two extensions this crate ships (spec.md §9 supplement):
    /// `note` (and its `tip`/`warning` aliases) by name, `emoji` as the
    /// catch-all default for bare `:shortcode:` inline text.
    pub fn with_default_extensions(self) -> Self {
        self.with_extension(NoteExtension)
            .with_default_extension(EmojiExtension)
    }

    pub fn with_link_destination(mut self, name: impl Into<String>, destination: impl Into<String>) -> Self {
        self.link_destinations.insert(name.into(), destination.into());
        self
    }

    pub fn build(self) -> Context {
        Context {
            by_name: self.by_name,
            default: self.default,
            link_destinations: self.link_destinations,
        }
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
