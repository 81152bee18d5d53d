//! Events in, node graphs out.
//!
//! Collections are composed on an explicit stack of open frames, so nesting
//! depth is bounded by memory rather than by the call stack.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use yamlet_parse::{CollectionStyle, Event, EventKind, Mark, Parser, ScalarStyle, Source};

use crate::{
    ComposeError, ComposeErrorKind, LoadError, Node, NodeKind, Resolver, ScalarText, Tag,
    TagRegistry,
};

#[derive(Debug)]
enum AnchorSlot {
    /// The anchored collection is still open.
    Pending(Mark),
    Complete(Node),
}

impl AnchorSlot {
    fn mark(&self) -> Mark {
        match self {
            AnchorSlot::Pending(mark) => *mark,
            AnchorSlot::Complete(node) => node.mark(),
        }
    }
}

/// An open collection.
struct Frame<'a> {
    anchor: Option<&'a str>,
    tag: Tag,
    mark: Mark,
    style: CollectionStyle,
    body: FrameBody,
}

enum FrameBody {
    Sequence(Vec<Node>),
    Mapping {
        entries: Vec<(Node, Node)>,
        key: Option<Node>,
    },
}

impl Frame<'_> {
    fn push(&mut self, node: Node) {
        match &mut self.body {
            FrameBody::Sequence(items) => items.push(node),
            FrameBody::Mapping { entries, key } => match key.take() {
                Some(key) => entries.push((key, node)),
                None => *key = Some(node),
            },
        }
    }

    fn finish(self) -> Node {
        let kind = match self.body {
            FrameBody::Sequence(items) => NodeKind::Sequence {
                items,
                style: self.style,
            },
            FrameBody::Mapping { entries, .. } => NodeKind::Mapping {
                entries,
                style: self.style,
            },
        };
        Node::new(kind, self.tag, self.mark, self.anchor.map(str::to_owned))
    }
}

/// Composes one document at a time from a [`Parser`].
pub struct Composer<'a, R> {
    parser: Parser<'a>,
    /// The buffer the parser reads; borrowed scalars become ranges of it.
    buffer: Arc<str>,
    resolver: &'a R,
    registry: &'a TagRegistry,
    anchors: HashMap<&'a str, AnchorSlot>,
    /// End of the last event, for errors past it.
    last_mark: Mark,
    started: bool,
    finished: bool,
}

impl<'a, R: Resolver> Composer<'a, R> {
    /// Create a composer over `source`.
    pub fn new(source: &'a Source, resolver: &'a R, registry: &'a TagRegistry) -> Self {
        Self {
            parser: Parser::from_scanner(source.scanner()),
            buffer: source.shared_text(),
            resolver,
            registry,
            anchors: HashMap::new(),
            last_mark: Mark::START,
            started: false,
            finished: false,
        }
    }

    /// Compose the next document. `None` once the stream has ended.
    pub fn compose_document(&mut self) -> Result<Option<Node>, LoadError> {
        if self.finished {
            return Ok(None);
        }
        if !self.started {
            let event = self.next_event()?;
            if !matches!(event.kind, EventKind::StreamStart { .. }) {
                return Err(unexpected(&event).into());
            }
            self.started = true;
        }

        let event = self.next_event()?;
        match event.kind {
            EventKind::StreamEnd => {
                self.finished = true;
                Ok(None)
            }
            EventKind::DocumentStart { .. } => {
                tracing::debug!(line = event.span.start.line, "composing document");
                self.anchors.clear();
                let root = self.compose_root()?;

                let end = self.next_event()?;
                if !matches!(end.kind, EventKind::DocumentEnd { .. }) {
                    return Err(unexpected(&end).into());
                }
                tracing::debug!(
                    line = end.span.end.line,
                    anchors = self.anchors.len(),
                    "document complete"
                );
                self.anchors.clear();
                Ok(Some(root))
            }
            _ => Err(unexpected(&event).into()),
        }
    }

    fn next_event(&mut self) -> Result<Event<'a>, LoadError> {
        match self.parser.next_event()? {
            Some(event) => {
                self.last_mark = event.span.end;
                Ok(event)
            }
            None => Err(ComposeError::new(ComposeErrorKind::UnexpectedEnd, self.last_mark).into()),
        }
    }

    fn compose_root(&mut self) -> Result<Node, LoadError> {
        let mut stack: Vec<Frame<'a>> = Vec::new();
        loop {
            let event = self.next_event()?;
            let mark = event.span.start;
            let node = match event.kind {
                EventKind::Alias { anchor } => self.resolve_alias(anchor, mark)?,
                EventKind::Scalar {
                    anchor,
                    tag,
                    value,
                    style,
                    ..
                } => {
                    self.reserve_anchor(anchor, mark)?;
                    let tag = self.scalar_tag(tag.as_deref(), &value, style);
                    let node = Node::new(
                        NodeKind::Scalar {
                            value: self.scalar_text(value),
                            style,
                        },
                        tag,
                        mark,
                        anchor.map(str::to_owned),
                    );
                    self.complete_anchor(anchor, &node);
                    node
                }
                EventKind::SequenceStart {
                    anchor, tag, style, ..
                } => {
                    self.reserve_anchor(anchor, mark)?;
                    let tag = self.collection_tag(tag.as_deref(), self.resolver.resolve_sequence());
                    stack.push(Frame {
                        anchor,
                        tag,
                        mark,
                        style,
                        body: FrameBody::Sequence(Vec::new()),
                    });
                    continue;
                }
                EventKind::MappingStart {
                    anchor, tag, style, ..
                } => {
                    self.reserve_anchor(anchor, mark)?;
                    let tag = self.collection_tag(tag.as_deref(), self.resolver.resolve_mapping());
                    stack.push(Frame {
                        anchor,
                        tag,
                        mark,
                        style,
                        body: FrameBody::Mapping {
                            entries: Vec::new(),
                            key: None,
                        },
                    });
                    continue;
                }
                EventKind::SequenceEnd | EventKind::MappingEnd => {
                    let closes_sequence = matches!(event.kind, EventKind::SequenceEnd);
                    let frame = match stack.pop() {
                        Some(frame)
                            if closes_sequence
                                == matches!(frame.body, FrameBody::Sequence(_)) =>
                        {
                            frame
                        }
                        _ => return Err(unexpected(&event).into()),
                    };
                    let anchor = frame.anchor;
                    let node = frame.finish();
                    self.complete_anchor(anchor, &node);
                    node
                }
                _ => return Err(unexpected(&event).into()),
            };

            match stack.last_mut() {
                Some(parent) => parent.push(node),
                None => return Ok(node),
            }
        }
    }

    fn resolve_alias(&self, name: &str, mark: Mark) -> Result<Node, ComposeError> {
        match self.anchors.get(name) {
            Some(AnchorSlot::Complete(node)) => {
                tracing::trace!(anchor = name, %mark, "alias");
                Ok(node.clone())
            }
            Some(AnchorSlot::Pending(_)) => Err(ComposeError::new(
                ComposeErrorKind::RecursiveAlias(name.to_string()),
                mark,
            )),
            None => Err(ComposeError::new(
                ComposeErrorKind::UndefinedAlias(name.to_string()),
                mark,
            )),
        }
    }

    fn reserve_anchor(&mut self, anchor: Option<&'a str>, mark: Mark) -> Result<(), ComposeError> {
        let Some(name) = anchor else {
            return Ok(());
        };
        if let Some(slot) = self.anchors.get(name) {
            return Err(ComposeError::new(
                ComposeErrorKind::DuplicateAnchor {
                    name: name.to_string(),
                    first: slot.mark(),
                },
                mark,
            ));
        }
        self.anchors.insert(name, AnchorSlot::Pending(mark));
        Ok(())
    }

    fn complete_anchor(&mut self, anchor: Option<&'a str>, node: &Node) {
        if let Some(name) = anchor {
            self.anchors.insert(name, AnchorSlot::Complete(node.clone()));
        }
    }

    /// Keep borrowed text as a view into the source buffer.
    fn scalar_text(&self, value: Cow<'a, str>) -> ScalarText {
        match value {
            Cow::Borrowed(text) => {
                let base = self.buffer.as_ptr() as usize;
                (text.as_ptr() as usize)
                    .checked_sub(base)
                    .and_then(|start| {
                        let range = start..start.checked_add(text.len())?;
                        ScalarText::slice(Arc::clone(&self.buffer), range)
                    })
                    .unwrap_or_else(|| ScalarText::from(text))
            }
            Cow::Owned(text) => ScalarText::from(text),
        }
    }

    fn scalar_tag(&self, tag: Option<&str>, value: &str, style: ScalarStyle) -> Tag {
        match tag {
            Some("!") => Tag::STR,
            Some(name) if !name.is_empty() => self.registry.intern(name),
            _ => self.resolver.resolve_scalar(value, style),
        }
    }

    fn collection_tag(&self, tag: Option<&str>, implicit: Tag) -> Tag {
        match tag {
            Some(name) if name != "!" && !name.is_empty() => self.registry.intern(name),
            _ => implicit,
        }
    }
}

fn unexpected(event: &Event<'_>) -> ComposeError {
    ComposeError::new(
        ComposeErrorKind::UnexpectedEvent {
            found: event.kind.name(),
        },
        event.span.start,
    )
}
