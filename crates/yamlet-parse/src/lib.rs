#![doc = include_str!("../README.md")]

mod tracing_macros;

pub use yamlet_tokenizer::{
    Encoding, EncodingError, Mark, ScalarStyle, ScanError, ScanErrorKind, Scanner, Source, Span,
    Token, TokenKind,
};

mod event;
pub use event::{CollectionStyle, Event, EventKind, ParseError, ParseErrorKind, TagDirective};

mod parser;
pub use parser::Parser;
