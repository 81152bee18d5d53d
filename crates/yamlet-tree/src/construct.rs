//! Typed values from composed nodes.
//!
//! Construction runs after loading and knows the YAML 1.1 standard tags.
//! Nodes with any other tag become [`Value::Tagged`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use yamlet_parse::Mark;

use crate::{Node, NodeKind, Tag, TagRegistry};

/// A native value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Value>),
    /// Pairs in source order; merge keys already applied.
    Mapping(Vec<(Value, Value)>),
    /// A node whose tag has no standard constructor.
    Tagged(Arc<str>, Box<Value>),
}

impl Value {
    /// The pair value for a string key, if this is a mapping.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Mapping(entries) => entries
                .iter()
                .find(|(k, _)| matches!(k, Value::String(s) if s == key))
                .map(|(_, v)| v),
            _ => None,
        }
    }
}

/// A node that cannot be turned into a value of its tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructError {
    /// What went wrong.
    pub kind: ConstructErrorKind,
    /// The offending node.
    pub mark: Mark,
}

/// Construction error kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructErrorKind {
    /// Scalar text does not match its tag.
    InvalidScalar {
        /// The tag's short name, e.g. `int`.
        expected: &'static str,
        /// The text.
        value: String,
    },
    /// An integer outside the `i64` range.
    IntegerOverflow(String),
    /// A standard tag on the wrong node kind.
    WrongKind {
        /// The tag's short name.
        tag: &'static str,
        /// `scalar`, `sequence` or `mapping`.
        found: &'static str,
    },
    /// `<<` applied to something other than a mapping or list of mappings.
    InvalidMerge,
    /// An `omap` or `pairs` entry that is not a single-pair mapping.
    InvalidPair,
    /// Aliases repeat more values than [`MAX_ALIAS_EXPANSION`].
    AliasExpansion,
}

impl fmt::Display for ConstructErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructErrorKind::InvalidScalar { expected, value } => {
                write!(f, "cannot construct {expected} from {value:?}")
            }
            ConstructErrorKind::IntegerOverflow(value) => {
                write!(f, "integer {value} does not fit in 64 bits")
            }
            ConstructErrorKind::WrongKind { tag, found } => {
                write!(f, "expected a node fitting !!{tag}, found a {found}")
            }
            ConstructErrorKind::InvalidMerge => write!(
                f,
                "expected a mapping or list of mappings for merging"
            ),
            ConstructErrorKind::InvalidPair => {
                write!(f, "expected a single-pair mapping as ordered entry")
            }
            ConstructErrorKind::AliasExpansion => write!(
                f,
                "aliases expand to more than {MAX_ALIAS_EXPANSION} values"
            ),
        }
    }
}

impl fmt::Display for ConstructError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.mark, self.kind)
    }
}

impl std::error::Error for ConstructError {}

/// Most values aliases may copy into one constructed tree.
pub const MAX_ALIAS_EXPANSION: usize = 1_000_000;

/// Construct the value of `node`. Tag names are looked up in `registry`,
/// which must be the one the node was loaded with.
///
/// A node reached through several aliases is constructed once and cloned.
pub fn construct(node: &Node, registry: &TagRegistry) -> Result<Value, ConstructError> {
    Constructor {
        registry,
        shared: HashMap::new(),
        expanded: 0,
    }
    .value(node)
}

struct Constructor<'r> {
    registry: &'r TagRegistry,
    /// Values of shared nodes by node address, with their size.
    shared: HashMap<usize, (Value, usize)>,
    /// Values copied out of `shared` so far.
    expanded: usize,
}

/// Number of values in `value`, itself included.
fn size(value: &Value) -> usize {
    match value {
        Value::Sequence(items) => 1 + items.iter().map(size).sum::<usize>(),
        Value::Mapping(entries) => {
            1 + entries
                .iter()
                .map(|(k, v)| size(k) + size(v))
                .sum::<usize>()
        }
        Value::Tagged(_, inner) => 1 + size(inner),
        _ => 1,
    }
}

fn kind_name(node: &Node) -> &'static str {
    match node.kind() {
        NodeKind::Scalar { .. } => "scalar",
        NodeKind::Sequence { .. } => "sequence",
        NodeKind::Mapping { .. } => "mapping",
    }
}

fn wrong_kind(node: &Node, tag: &'static str) -> ConstructError {
    ConstructError {
        kind: ConstructErrorKind::WrongKind {
            tag,
            found: kind_name(node),
        },
        mark: node.mark(),
    }
}

fn invalid(node: &Node, expected: &'static str, value: &str) -> ConstructError {
    ConstructError {
        kind: ConstructErrorKind::InvalidScalar {
            expected,
            value: value.to_string(),
        },
        mark: node.mark(),
    }
}

impl Constructor<'_> {
    fn value(&mut self, node: &Node) -> Result<Value, ConstructError> {
        if !node.is_shared() {
            return self.build(node);
        }
        let key = node.addr();
        if let Some((value, count)) = self.shared.get(&key) {
            self.expanded += *count;
            if self.expanded > MAX_ALIAS_EXPANSION {
                return Err(ConstructError {
                    kind: ConstructErrorKind::AliasExpansion,
                    mark: node.mark(),
                });
            }
            return Ok(value.clone());
        }
        let value = self.build(node)?;
        self.shared.insert(key, (value.clone(), size(&value)));
        Ok(value)
    }

    fn build(&mut self, node: &Node) -> Result<Value, ConstructError> {
        let tag = node.tag();
        match node.kind() {
            NodeKind::Scalar { value, .. } => match tag {
                Tag::NULL => self.null(node, value),
                Tag::BOOL => parse_bool(value)
                    .map(Value::Bool)
                    .ok_or_else(|| invalid(node, "bool", value)),
                Tag::INT => self.int(node, value),
                Tag::FLOAT => parse_float(value)
                    .map(Value::Float)
                    .ok_or_else(|| invalid(node, "float", value)),
                Tag::STR | Tag::VALUE | Tag::MERGE | Tag::UNRESOLVED => {
                    Ok(Value::String(value.to_string()))
                }
                Tag::SEQ | Tag::OMAP | Tag::PAIRS => Err(wrong_kind(node, "seq")),
                Tag::MAP | Tag::SET => Err(wrong_kind(node, "map")),
                _ => Ok(self.tagged(tag, Value::String(value.to_string()))),
            },
            NodeKind::Sequence { items, .. } => match tag {
                Tag::SEQ | Tag::UNRESOLVED => self.sequence(items).map(Value::Sequence),
                Tag::OMAP | Tag::PAIRS => {
                    let pairs = self.pairs(items)?;
                    let entries = pairs
                        .into_iter()
                        .map(|(k, v)| Value::Mapping(vec![(k, v)]))
                        .collect();
                    Ok(Value::Sequence(entries))
                }
                Tag::MAP | Tag::SET => Err(wrong_kind(node, "map")),
                tag if is_scalar_tag(tag) => Err(wrong_kind(node, scalar_tag_name(tag))),
                _ => {
                    let inner = self.sequence(items).map(Value::Sequence)?;
                    Ok(self.tagged(tag, inner))
                }
            },
            NodeKind::Mapping { entries, .. } => match tag {
                Tag::MAP | Tag::UNRESOLVED => self.mapping(entries).map(Value::Mapping),
                Tag::SET => {
                    let keys = self
                        .mapping(entries)?
                        .into_iter()
                        .map(|(k, _)| (k, Value::Null))
                        .collect();
                    Ok(Value::Mapping(keys))
                }
                Tag::SEQ | Tag::OMAP | Tag::PAIRS => Err(wrong_kind(node, "seq")),
                tag if is_scalar_tag(tag) => Err(wrong_kind(node, scalar_tag_name(tag))),
                _ => {
                    let inner = self.mapping(entries).map(Value::Mapping)?;
                    Ok(self.tagged(tag, inner))
                }
            },
        }
    }

    fn tagged(&self, tag: Tag, inner: Value) -> Value {
        match self.registry.name(tag) {
            Some(name) => Value::Tagged(name, Box::new(inner)),
            None => inner,
        }
    }

    fn null(&self, node: &Node, value: &str) -> Result<Value, ConstructError> {
        if matches!(value, "" | "~" | "null" | "Null" | "NULL") {
            Ok(Value::Null)
        } else {
            Err(invalid(node, "null", value))
        }
    }

    fn int(&self, node: &Node, value: &str) -> Result<Value, ConstructError> {
        match parse_int(value) {
            Some(Ok(n)) => Ok(Value::Int(n)),
            Some(Err(Overflow)) => Err(ConstructError {
                kind: ConstructErrorKind::IntegerOverflow(value.to_string()),
                mark: node.mark(),
            }),
            None => Err(invalid(node, "int", value)),
        }
    }

    fn sequence(&mut self, items: &[Node]) -> Result<Vec<Value>, ConstructError> {
        items.iter().map(|item| self.value(item)).collect()
    }

    fn pairs(&mut self, items: &[Node]) -> Result<Vec<(Value, Value)>, ConstructError> {
        items
            .iter()
            .map(|item| match item.as_mapping() {
                Some([(key, value)]) => Ok((self.value(key)?, self.value(value)?)),
                _ => Err(ConstructError {
                    kind: ConstructErrorKind::InvalidPair,
                    mark: item.mark(),
                }),
            })
            .collect()
    }

    /// Own pairs first, then merged pairs whose keys are not present yet.
    fn mapping(&mut self, entries: &[(Node, Node)]) -> Result<Vec<(Value, Value)>, ConstructError> {
        let mut own = Vec::with_capacity(entries.len());
        let mut merged = Vec::new();
        for (key, value) in entries {
            if key.tag() == Tag::MERGE {
                merged.extend(self.merge_source(value)?);
            } else {
                own.push((self.value(key)?, self.value(value)?));
            }
        }
        for (key, value) in merged {
            if !own.iter().any(|(k, _)| *k == key) {
                own.push((key, value));
            }
        }
        Ok(own)
    }

    fn merge_source(&mut self, node: &Node) -> Result<Vec<(Value, Value)>, ConstructError> {
        let invalid_merge = || ConstructError {
            kind: ConstructErrorKind::InvalidMerge,
            mark: node.mark(),
        };
        match node.kind() {
            NodeKind::Mapping { entries, .. } => self.mapping(entries),
            NodeKind::Sequence { items, .. } => {
                let mut pairs = Vec::new();
                for item in items {
                    let NodeKind::Mapping { entries, .. } = item.kind() else {
                        return Err(invalid_merge());
                    };
                    pairs.extend(self.mapping(entries)?);
                }
                Ok(pairs)
            }
            NodeKind::Scalar { .. } => Err(invalid_merge()),
        }
    }
}

fn is_scalar_tag(tag: Tag) -> bool {
    matches!(
        tag,
        Tag::NULL | Tag::BOOL | Tag::INT | Tag::FLOAT | Tag::STR | Tag::BINARY | Tag::TIMESTAMP
    )
}

fn scalar_tag_name(tag: Tag) -> &'static str {
    match tag {
        Tag::NULL => "null",
        Tag::BOOL => "bool",
        Tag::INT => "int",
        Tag::FLOAT => "float",
        Tag::BINARY => "binary",
        Tag::TIMESTAMP => "timestamp",
        _ => "str",
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "y" | "Y" | "yes" | "Yes" | "YES" | "true" | "True" | "TRUE" | "on" | "On" | "ON" => {
            Some(true)
        }
        "n" | "N" | "no" | "No" | "NO" | "false" | "False" | "FALSE" | "off" | "Off" | "OFF" => {
            Some(false)
        }
        _ => None,
    }
}

struct Overflow;

/// `None` when the text is not an integer at all.
fn parse_int(value: &str) -> Option<Result<i64, Overflow>> {
    let cleaned: String = value.chars().filter(|&c| c != '_').collect();
    let (negative, digits) = match cleaned.as_bytes().first() {
        Some(b'-') => (true, &cleaned[1..]),
        Some(b'+') => (false, &cleaned[1..]),
        _ => (false, cleaned.as_str()),
    };
    if digits.is_empty() {
        return None;
    }

    let magnitude: Option<Option<i128>> = if let Some(bin) = digits.strip_prefix("0b") {
        radix(bin, 2)
    } else if let Some(hex) = digits.strip_prefix("0x") {
        radix(hex, 16)
    } else if digits.contains(':') {
        let mut total: Option<i128> = Some(0);
        for part in digits.split(':') {
            let part = radix(part, 10)?;
            total = total.zip(part).and_then(|(t, p)| t.checked_mul(60)?.checked_add(p));
        }
        Some(total)
    } else if digits.len() > 1 && digits.starts_with('0') {
        radix(&digits[1..], 8)
    } else {
        radix(digits, 10)
    };

    let magnitude = magnitude?;
    let signed = magnitude.map(|m| if negative { -m } else { m });
    Some(signed.and_then(|n| i64::try_from(n).ok()).ok_or(Overflow))
}

/// `None` for bad digits, `Some(None)` for overflow.
fn radix(digits: &str, radix: u32) -> Option<Option<i128>> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    Some(i128::from_str_radix(digits, radix).ok())
}

fn parse_float(value: &str) -> Option<f64> {
    let cleaned: String = value.chars().filter(|&c| c != '_').collect();
    let (negative, unsigned) = match cleaned.as_bytes().first() {
        Some(b'-') => (true, &cleaned[1..]),
        Some(b'+') => (false, &cleaned[1..]),
        _ => (false, cleaned.as_str()),
    };
    let sign = if negative { -1.0 } else { 1.0 };

    match unsigned {
        ".inf" | ".Inf" | ".INF" => return Some(sign * f64::INFINITY),
        ".nan" | ".NaN" | ".NAN" => return Some(f64::NAN),
        _ => {}
    }

    if unsigned.contains(':') {
        let mut total = 0.0;
        for part in unsigned.split(':') {
            total = total * 60.0 + part.parse::<f64>().ok()?;
        }
        return Some(sign * total);
    }

    if !unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }
    unsigned.parse::<f64>().ok().map(|f| sign * f)
}
