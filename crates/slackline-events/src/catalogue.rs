//! Discriminator → decode function registry.
//!
//! The catalogue is assembled once through [`CatalogueBuilder`] and is
//! immutable afterwards, so lookups need no synchronization. The process-wide
//! instance behind [`catalogue()`] is built lazily on first use.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde_json::Value;

use crate::kinds::{EventKind, TypedEvent};

/// Decodes a whole document into the typed record for one kind.
pub type DecodeFn = fn(&Value) -> Result<TypedEvent, serde_json::Error>;

/// Rewrites a document into its canonical shape before decoding.
pub type NormalizeFn = fn(Value) -> Value;

/// One catalogue row.
#[derive(Clone, Copy, Debug)]
pub struct CatalogueEntry {
    /// Kind produced by [`Self::decode`].
    pub kind: EventKind,
    /// Shape decoder.
    pub decode: DecodeFn,
    /// Optional pre-decode rewrite.
    pub normalize: Option<NormalizeFn>,
}

/// Mutable staging area for a [`Catalogue`].
#[derive(Debug, Default)]
pub struct CatalogueBuilder {
    entries: HashMap<&'static str, CatalogueEntry>,
}

impl CatalogueBuilder {
    /// Empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pre-populated with every built-in kind.
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut builder = Self::new();
        crate::kinds::register_all(&mut builder);
        builder
    }

    /// Add an entry.
    ///
    /// # Panics
    ///
    /// Panics when `discriminator` is already registered. Discriminators are
    /// unique, and a duplicate is a programming error caught at warm-up.
    #[allow(clippy::panic)]
    pub fn register(&mut self, discriminator: &'static str, entry: CatalogueEntry) -> &mut Self {
        if self.entries.insert(discriminator, entry).is_some() {
            panic!("duplicate catalogue discriminator: {discriminator}");
        }
        self
    }

    /// Freeze into a read-only catalogue.
    #[must_use]
    pub fn build(self) -> Catalogue {
        tracing::debug!(entries = self.entries.len(), "event catalogue built");
        Catalogue {
            entries: self.entries,
        }
    }
}

/// Read-only discriminator registry.
#[derive(Debug)]
pub struct Catalogue {
    entries: HashMap<&'static str, CatalogueEntry>,
}

impl Catalogue {
    /// Entry for `discriminator`, if registered.
    #[must_use]
    pub fn lookup(&self, discriminator: &str) -> Option<&CatalogueEntry> {
        self.entries.get(discriminator)
    }

    /// Number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered discriminators, sorted.
    #[must_use]
    pub fn discriminators(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.entries.keys().copied().collect();
        keys.sort_unstable();
        keys
    }
}

static CATALOGUE: OnceLock<Catalogue> = OnceLock::new();

/// Process-wide catalogue of built-in kinds.
pub fn catalogue() -> &'static Catalogue {
    CATALOGUE.get_or_init(|| CatalogueBuilder::with_builtin().build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::ALL_EVENT_KINDS;
    use serde_json::json;

    #[test]
    fn builtin_covers_every_kind() {
        let cat = catalogue();
        assert_eq!(cat.len(), ALL_EVENT_KINDS.len());
        for kind in ALL_EVENT_KINDS {
            let entry = cat.lookup(kind.as_str()).unwrap();
            assert_eq!(entry.kind, kind);
        }
    }

    #[test]
    fn lookup_unknown_is_none() {
        assert!(catalogue().lookup("workflow_step_execute").is_none());
        assert!(catalogue().lookup("").is_none());
    }

    #[test]
    fn discriminators_sorted() {
        let keys = catalogue().discriminators();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);
        assert_eq!(keys.first(), Some(&"app_deleted"));
    }

    #[test]
    fn entry_decodes() {
        let entry = catalogue().lookup("channel_rename").unwrap();
        let doc = json!({"type": "channel_rename", "channel": {"id": "C1", "name": "new"}});
        let event = (entry.decode)(&doc).unwrap();
        assert_eq!(event.kind(), Some(EventKind::ChannelRename));
    }

    #[test]
    fn custom_catalogue() {
        let mut builder = CatalogueBuilder::new();
        let _ = builder.register(
            "hello",
            CatalogueEntry {
                kind: EventKind::Hello,
                decode: |_| Ok(TypedEvent::Hello(crate::payloads::connection::HelloEvent::default())),
                normalize: None,
            },
        );
        let cat = builder.build();
        assert_eq!(cat.len(), 1);
        assert!(cat.lookup("message").is_none());
    }

    #[test]
    #[should_panic(expected = "duplicate catalogue discriminator: hello")]
    fn duplicate_registration_panics() {
        let mut builder = CatalogueBuilder::with_builtin();
        let entry = *catalogue().lookup("hello").unwrap();
        let _ = builder.register("hello", entry);
    }

    #[test]
    fn empty_builder() {
        let cat = CatalogueBuilder::new().build();
        assert!(cat.is_empty());
    }
}
