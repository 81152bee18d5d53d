//! Composed nodes.

use std::fmt;
use std::ops::{Deref, Range};
use std::sync::Arc;

use yamlet_parse::{CollectionStyle, Mark, ScalarStyle};

use crate::Tag;

/// A node in a composed document.
///
/// Cloning is cheap: an alias yields a clone of the handle of the node it
/// refers to, and [`Node::ptr_eq`] tells the two apart from equal copies.
#[derive(Debug, Clone)]
pub struct Node(Arc<NodeData>);

/// The contents of a [`Node`].
#[derive(Debug)]
pub struct NodeData {
    /// Scalar, sequence or mapping payload.
    pub kind: NodeKind,
    /// Resolved or explicit tag.
    pub tag: Tag,
    /// Where the node starts.
    pub mark: Mark,
    /// Anchor name, if the node defined one.
    pub anchor: Option<String>,
}

/// Node payloads.
#[derive(Debug)]
pub enum NodeKind {
    /// A leaf value.
    Scalar {
        /// Content after escapes and folding.
        value: ScalarText,
        /// How it was written.
        style: ScalarStyle,
    },
    /// An ordered list.
    Sequence {
        /// The entries.
        items: Vec<Node>,
        /// Block or flow.
        style: CollectionStyle,
    },
    /// Key/value pairs in source order.
    Mapping {
        /// The pairs.
        entries: Vec<(Node, Node)>,
        /// Block or flow.
        style: CollectionStyle,
    },
}

/// Scalar content.
///
/// A range of a shared buffer. Text copied verbatim from the stream points
/// into the decoded source, so composing it allocates nothing; text built
/// by escapes or folding has a buffer of its own.
#[derive(Clone)]
pub struct ScalarText {
    buffer: Arc<str>,
    range: Range<usize>,
}

impl ScalarText {
    /// `buffer[range]`, or `None` if `range` is out of bounds or splits a
    /// character.
    pub fn slice(buffer: Arc<str>, range: Range<usize>) -> Option<Self> {
        buffer.get(range.clone())?;
        Some(Self { buffer, range })
    }

    /// The text.
    pub fn as_str(&self) -> &str {
        &self.buffer[self.range.clone()]
    }

    /// Whether the text is a view into `buffer`.
    pub fn shares_buffer(&self, buffer: &Arc<str>) -> bool {
        Arc::ptr_eq(&self.buffer, buffer)
    }
}

impl From<String> for ScalarText {
    fn from(text: String) -> Self {
        let range = 0..text.len();
        Self {
            buffer: Arc::from(text),
            range,
        }
    }
}

impl From<&str> for ScalarText {
    fn from(text: &str) -> Self {
        Self {
            buffer: Arc::from(text),
            range: 0..text.len(),
        }
    }
}

impl Deref for ScalarText {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for ScalarText {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq for ScalarText {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for ScalarText {}

impl PartialEq<str> for ScalarText {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for ScalarText {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Debug for ScalarText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for ScalarText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Node {
    /// Wrap node contents in a new handle.
    pub fn new(kind: NodeKind, tag: Tag, mark: Mark, anchor: Option<String>) -> Self {
        Self(Arc::new(NodeData {
            kind,
            tag,
            mark,
            anchor,
        }))
    }

    /// The node contents.
    pub fn data(&self) -> &NodeData {
        &self.0
    }

    /// Scalar, sequence or mapping payload.
    pub fn kind(&self) -> &NodeKind {
        &self.0.kind
    }

    /// Resolved or explicit tag.
    pub fn tag(&self) -> Tag {
        self.0.tag
    }

    /// Where the node starts: its anchor or tag if it has one.
    pub fn mark(&self) -> Mark {
        self.0.mark
    }

    /// Anchor name, if the node defined one.
    pub fn anchor(&self) -> Option<&str> {
        self.0.anchor.as_deref()
    }

    /// Whether both handles point at the same node.
    pub fn ptr_eq(a: &Node, b: &Node) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Whether another handle to this node exists, e.g. through an alias.
    pub(crate) fn is_shared(&self) -> bool {
        Arc::strong_count(&self.0) > 1
    }

    /// Identity of the node, stable while any handle is alive.
    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    /// Whether this is a scalar.
    pub fn is_scalar(&self) -> bool {
        matches!(self.kind(), NodeKind::Scalar { .. })
    }

    /// Whether this is a sequence.
    pub fn is_sequence(&self) -> bool {
        matches!(self.kind(), NodeKind::Sequence { .. })
    }

    /// Whether this is a mapping.
    pub fn is_mapping(&self) -> bool {
        matches!(self.kind(), NodeKind::Mapping { .. })
    }

    /// Scalar content, if this is a scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self.kind() {
            NodeKind::Scalar { value, .. } => Some(value.as_str()),
            _ => None,
        }
    }

    /// Sequence entries, if this is a sequence.
    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self.kind() {
            NodeKind::Sequence { items, .. } => Some(items),
            _ => None,
        }
    }

    /// Mapping pairs, if this is a mapping.
    pub fn as_mapping(&self) -> Option<&[(Node, Node)]> {
        match self.kind() {
            NodeKind::Mapping { entries, .. } => Some(entries),
            _ => None,
        }
    }

    /// Scalar style, or `None` for collections.
    pub fn scalar_style(&self) -> Option<ScalarStyle> {
        match self.kind() {
            NodeKind::Scalar { style, .. } => Some(*style),
            _ => None,
        }
    }

    /// Collection style, or `None` for scalars.
    pub fn collection_style(&self) -> Option<CollectionStyle> {
        match self.kind() {
            NodeKind::Scalar { .. } => None,
            NodeKind::Sequence { style, .. } | NodeKind::Mapping { style, .. } => Some(*style),
        }
    }

    /// The value of the first pair whose key is a scalar equal to `key`.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_mapping()?
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)
    }

    /// Sequence entry at `index`.
    pub fn index(&self, index: usize) -> Option<&Node> {
        self.as_sequence()?.get(index)
    }

    /// Number of entries or pairs; 0 for scalars.
    pub fn len(&self) -> usize {
        match self.kind() {
            NodeKind::Scalar { .. } => 0,
            NodeKind::Sequence { items, .. } => items.len(),
            NodeKind::Mapping { entries, .. } => entries.len(),
        }
    }

    /// Whether [`Node::len`] is 0.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
