#![doc = include_str!("../README.md")]
//! Composition of YAML event streams into node graphs.
//!
//! [`Loader`] drives the whole pipeline: decoding, scanning, parsing and
//! composing. Untagged nodes get their tag from a [`Resolver`], tag strings
//! are interned in a [`TagRegistry`].

mod tag;
pub use tag::{Tag, TagRegistry, YAML_TAG_PREFIX};

mod node;
pub use node::{Node, NodeData, NodeKind, ScalarText};

mod resolver;
pub use resolver::{Resolver, Yaml11Resolver};

mod error;
pub use error::{ComposeError, ComposeErrorKind, LoadError};

mod diagnostic;

mod composer;
pub use composer::Composer;

mod loader;
pub use loader::{Documents, Loader, load, load_all};

pub mod construct;
pub use construct::{Value, construct};

pub use yamlet_parse::{
    CollectionStyle, Encoding, EncodingError, Mark, ParseError, ParseErrorKind, ScalarStyle,
    ScanError, ScanErrorKind, Source, Span,
};
