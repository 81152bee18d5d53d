//! Interned tags.
//!
//! A [`Tag`] is a small id into a [`TagRegistry`]. Equal tag strings always
//! intern to the same id within one registry, so comparing tags never touches
//! the strings.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

/// Prefix shared by the YAML 1.1 standard tags.
pub const YAML_TAG_PREFIX: &str = "tag:yaml.org,2002:";

/// An interned tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "facet", derive(facet::Facet))]
pub struct Tag(u32);

impl Tag {
    /// The empty tag: no resolution was possible.
    pub const UNRESOLVED: Tag = Tag(0);
    /// `tag:yaml.org,2002:null`
    pub const NULL: Tag = Tag(1);
    /// `tag:yaml.org,2002:bool`
    pub const BOOL: Tag = Tag(2);
    /// `tag:yaml.org,2002:int`
    pub const INT: Tag = Tag(3);
    /// `tag:yaml.org,2002:float`
    pub const FLOAT: Tag = Tag(4);
    /// `tag:yaml.org,2002:str`
    pub const STR: Tag = Tag(5);
    /// `tag:yaml.org,2002:seq`
    pub const SEQ: Tag = Tag(6);
    /// `tag:yaml.org,2002:map`
    pub const MAP: Tag = Tag(7);
    /// `tag:yaml.org,2002:binary`
    pub const BINARY: Tag = Tag(8);
    /// `tag:yaml.org,2002:timestamp`
    pub const TIMESTAMP: Tag = Tag(9);
    /// `tag:yaml.org,2002:merge`
    pub const MERGE: Tag = Tag(10);
    /// `tag:yaml.org,2002:value`
    pub const VALUE: Tag = Tag(11);
    /// `tag:yaml.org,2002:omap`
    pub const OMAP: Tag = Tag(12);
    /// `tag:yaml.org,2002:pairs`
    pub const PAIRS: Tag = Tag(13);
    /// `tag:yaml.org,2002:set`
    pub const SET: Tag = Tag(14);

    /// The raw id.
    pub fn id(self) -> u32 {
        self.0
    }

    /// Whether this is anything but [`Tag::UNRESOLVED`].
    pub fn is_resolved(self) -> bool {
        self != Tag::UNRESOLVED
    }
}

const STANDARD: [(Tag, &str); 14] = [
    (Tag::NULL, "null"),
    (Tag::BOOL, "bool"),
    (Tag::INT, "int"),
    (Tag::FLOAT, "float"),
    (Tag::STR, "str"),
    (Tag::SEQ, "seq"),
    (Tag::MAP, "map"),
    (Tag::BINARY, "binary"),
    (Tag::TIMESTAMP, "timestamp"),
    (Tag::MERGE, "merge"),
    (Tag::VALUE, "value"),
    (Tag::OMAP, "omap"),
    (Tag::PAIRS, "pairs"),
    (Tag::SET, "set"),
];

#[derive(Debug)]
struct Interner {
    ids: HashMap<Arc<str>, Tag>,
    /// Indexed by tag id. Slot 0 belongs to [`Tag::UNRESOLVED`] and is empty.
    names: Vec<Arc<str>>,
}

impl Interner {
    fn insert(&mut self, name: Arc<str>) -> Tag {
        let tag = Tag(self.names.len() as u32);
        self.names.push(name.clone());
        self.ids.insert(name, tag);
        tag
    }
}

/// Thread-safe interning arena for tag strings.
///
/// Lookups take a read lock. Inserts re-check under the write lock, so two
/// threads interning the same new name get the same id.
#[derive(Debug)]
pub struct TagRegistry {
    inner: RwLock<Interner>,
}

impl TagRegistry {
    /// A registry holding only the standard tags.
    pub fn new() -> Self {
        let mut interner = Interner {
            ids: HashMap::new(),
            names: vec![Arc::from("")],
        };
        for (tag, suffix) in STANDARD {
            let interned = interner.insert(Arc::from(format!("{YAML_TAG_PREFIX}{suffix}")));
            debug_assert_eq!(interned, tag);
        }
        Self {
            inner: RwLock::new(interner),
        }
    }

    /// The process-wide registry.
    pub fn global() -> Arc<TagRegistry> {
        static GLOBAL: OnceLock<Arc<TagRegistry>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(TagRegistry::new())).clone()
    }

    /// Intern `name`. The empty string is [`Tag::UNRESOLVED`].
    pub fn intern(&self, name: &str) -> Tag {
        if name.is_empty() {
            return Tag::UNRESOLVED;
        }
        if let Some(tag) = self.lookup(name) {
            return tag;
        }

        let mut inner = self.inner.write();
        if let Some(&tag) = inner.ids.get(name) {
            return tag;
        }
        let tag = inner.insert(Arc::from(name));
        tracing::trace!(tag = tag.0, tag_name = name, "interned tag");
        tag
    }

    /// The id of `name`, if it was interned already.
    pub fn lookup(&self, name: &str) -> Option<Tag> {
        let inner = self.inner.read();
        inner.ids.get(name).copied()
    }

    /// The string behind `tag`. `None` for [`Tag::UNRESOLVED`] and for ids
    /// from another registry.
    pub fn name(&self, tag: Tag) -> Option<Arc<str>> {
        if tag == Tag::UNRESOLVED {
            return None;
        }
        let inner = self.inner.read();
        inner.names.get(tag.0 as usize).cloned()
    }

    /// Number of interned tags, standard tags included.
    pub fn len(&self) -> usize {
        let inner = self.inner.read();
        inner.names.len() - 1
    }

    /// Always false: the standard tags are present from the start.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    #[test]
    fn standard_tags_have_fixed_ids() {
        let registry = TagRegistry::new();
        assert_eq!(registry.lookup("tag:yaml.org,2002:null"), Some(Tag::NULL));
        assert_eq!(registry.lookup("tag:yaml.org,2002:str"), Some(Tag::STR));
        assert_eq!(registry.lookup("tag:yaml.org,2002:set"), Some(Tag::SET));
        assert_eq!(registry.len(), 14);
        assert_eq!(
            registry.name(Tag::TIMESTAMP).as_deref(),
            Some("tag:yaml.org,2002:timestamp")
        );
    }

    #[test]
    fn interning_is_idempotent() {
        let registry = TagRegistry::new();
        let point = registry.intern("!point");
        assert_eq!(registry.intern("!point"), point);
        assert_ne!(registry.intern("!vector"), point);
        assert_eq!(registry.intern("tag:yaml.org,2002:int"), Tag::INT);
        assert_eq!(registry.name(point).as_deref(), Some("!point"));
        assert_eq!(registry.len(), 16);
    }

    #[test]
    fn empty_name_is_unresolved() {
        let registry = TagRegistry::new();
        assert_eq!(registry.intern(""), Tag::UNRESOLVED);
        assert_eq!(registry.lookup(""), None);
        assert_eq!(registry.name(Tag::UNRESOLVED), None);
        assert!(!Tag::UNRESOLVED.is_resolved());
        assert_eq!(registry.len(), 14);
    }

    #[test]
    fn foreign_ids_have_no_name() {
        let ours = TagRegistry::new();
        let theirs = TagRegistry::new();
        for i in 0..10 {
            theirs.intern(&format!("!t{i}"));
        }
        let tag = theirs.intern("!last");
        assert_eq!(ours.name(tag), None);
    }

    #[test]
    fn global_registry_is_shared() {
        let a = TagRegistry::global();
        let b = TagRegistry::global();
        assert!(Arc::ptr_eq(&a, &b));
        let tag = a.intern("!global-test");
        assert_eq!(b.lookup("!global-test"), Some(tag));
    }
}
