//! Implicit tag resolution.

use yamlet_parse::ScalarStyle;

use crate::Tag;

/// Picks tags for nodes written without one.
///
/// Returning [`Tag::UNRESOLVED`] is allowed; the node keeps it.
pub trait Resolver {
    /// Tag for an untagged scalar.
    fn resolve_scalar(&self, value: &str, style: ScalarStyle) -> Tag;

    /// Tag for an untagged sequence.
    fn resolve_sequence(&self) -> Tag {
        Tag::SEQ
    }

    /// Tag for an untagged mapping.
    fn resolve_mapping(&self) -> Tag {
        Tag::MAP
    }
}

impl<F> Resolver for F
where
    F: Fn(&str, ScalarStyle) -> Tag,
{
    fn resolve_scalar(&self, value: &str, style: ScalarStyle) -> Tag {
        self(value, style)
    }
}

/// The YAML 1.1 implicit typing rules.
///
/// Only plain scalars are classified; quoted and block scalars are strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Yaml11Resolver;

impl Yaml11Resolver {
    /// Classify the text of a plain scalar.
    pub fn classify(value: &str) -> Tag {
        if is_null(value) {
            Tag::NULL
        } else if is_bool(value) {
            Tag::BOOL
        } else if is_int(value) {
            Tag::INT
        } else if is_float(value) {
            Tag::FLOAT
        } else if is_timestamp(value) {
            Tag::TIMESTAMP
        } else if value == "<<" {
            Tag::MERGE
        } else if value == "=" {
            Tag::VALUE
        } else {
            Tag::STR
        }
    }
}

impl Resolver for Yaml11Resolver {
    fn resolve_scalar(&self, value: &str, style: ScalarStyle) -> Tag {
        if style.is_plain() {
            Self::classify(value)
        } else {
            Tag::STR
        }
    }
}

fn is_null(value: &str) -> bool {
    matches!(value, "" | "~" | "null" | "Null" | "NULL")
}

fn is_bool(value: &str) -> bool {
    matches!(
        value,
        "y" | "Y"
            | "yes"
            | "Yes"
            | "YES"
            | "n"
            | "N"
            | "no"
            | "No"
            | "NO"
            | "true"
            | "True"
            | "TRUE"
            | "false"
            | "False"
            | "FALSE"
            | "on"
            | "On"
            | "ON"
            | "off"
            | "Off"
            | "OFF"
    )
}

fn strip_sign(value: &str) -> &str {
    value.strip_prefix(['-', '+']).unwrap_or(value)
}

/// Non-empty and every byte passes `pred`.
fn all_bytes(s: &str, pred: impl Fn(u8) -> bool) -> bool {
    !s.is_empty() && s.bytes().all(pred)
}

fn is_digit_or_underscore(b: u8) -> bool {
    b.is_ascii_digit() || b == b'_'
}

/// `[first][0-9_]*` where `first` is checked by `head`.
fn is_digit_run(s: &str, head: impl Fn(u8) -> bool) -> bool {
    match s.as_bytes().split_first() {
        Some((&first, rest)) => head(first) && rest.iter().all(|&b| is_digit_or_underscore(b)),
        None => false,
    }
}

/// `(:[0-5]?[0-9])+` after the leading group.
fn is_base60_tail<'a>(parts: impl Iterator<Item = &'a str>) -> bool {
    let mut seen = false;
    for part in parts {
        let ok = match part.as_bytes() {
            [d] => d.is_ascii_digit(),
            [h, d] => matches!(h, b'0'..=b'5') && d.is_ascii_digit(),
            _ => false,
        };
        if !ok {
            return false;
        }
        seen = true;
    }
    seen
}

fn is_int(value: &str) -> bool {
    let digits = strip_sign(value);
    if let Some(rest) = digits.strip_prefix("0b") {
        return all_bytes(rest, |b| matches!(b, b'0' | b'1' | b'_'));
    }
    if let Some(rest) = digits.strip_prefix("0x") {
        return all_bytes(rest, |b| b.is_ascii_hexdigit() || b == b'_');
    }
    if digits == "0" {
        return true;
    }
    if let Some(rest) = digits.strip_prefix('0') {
        return all_bytes(rest, |b| matches!(b, b'0'..=b'7' | b'_'));
    }
    if digits.contains(':') {
        let mut parts = digits.split(':');
        let head = parts.next().unwrap_or_default();
        return is_digit_run(head, |b| matches!(b, b'1'..=b'9')) && is_base60_tail(parts);
    }
    is_digit_run(digits, |b| matches!(b, b'1'..=b'9'))
}

fn is_float(value: &str) -> bool {
    let unsigned = strip_sign(value);
    if matches!(unsigned, ".inf" | ".Inf" | ".INF") || matches!(value, ".nan" | ".NaN" | ".NAN") {
        return true;
    }

    if let Some((whole, fraction)) = unsigned.split_once('.')
        && whole.contains(':')
    {
        let mut parts = whole.split(':');
        let head = parts.next().unwrap_or_default();
        return is_digit_run(head, |b| b.is_ascii_digit())
            && is_base60_tail(parts)
            && fraction.bytes().all(is_digit_or_underscore);
    }

    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(at) => (&unsigned[..at], Some(&unsigned[at + 1..])),
        None => (unsigned, None),
    };
    if let Some(exponent) = exponent {
        let Some(digits) = exponent.strip_prefix(['-', '+']) else {
            return false;
        };
        if !all_bytes(digits, |b| b.is_ascii_digit()) {
            return false;
        }
    }

    let Some((whole, fraction)) = mantissa.split_once('.') else {
        return false;
    };
    if whole.is_empty() {
        // `.5` takes no sign.
        unsigned.len() == value.len() && is_digit_run(fraction, |b| b.is_ascii_digit())
    } else {
        is_digit_run(whole, |b| b.is_ascii_digit())
            && fraction.bytes().all(is_digit_or_underscore)
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Cursor<'_> {
    fn eat(&mut self, b: u8) -> bool {
        if self.bytes.get(self.pos) == Some(&b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume between `min` and `max` digits.
    fn digits(&mut self, min: usize, max: usize) -> bool {
        let start = self.pos;
        while self.pos - start < max && self.bytes.get(self.pos).is_some_and(u8::is_ascii_digit) {
            self.pos += 1;
        }
        self.pos - start >= min
    }

    fn blanks(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.bytes.get(self.pos), Some(b' ' | b'\t')) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn done(&self) -> bool {
        self.pos == self.bytes.len()
    }
}

fn is_timestamp(value: &str) -> bool {
    let mut c = Cursor {
        bytes: value.as_bytes(),
        pos: 0,
    };
    if !(c.digits(4, 4) && c.eat(b'-') && c.digits(1, 2) && c.eat(b'-') && c.digits(1, 2)) {
        return false;
    }
    if c.done() {
        // A bare date needs two-digit month and day.
        return value.len() == 10;
    }

    if !(c.eat(b'T') || c.eat(b't') || c.blanks() > 0) {
        return false;
    }
    if !(c.digits(1, 2) && c.eat(b':') && c.digits(2, 2) && c.eat(b':') && c.digits(2, 2)) {
        return false;
    }
    if c.eat(b'.') {
        c.digits(0, usize::MAX);
    }
    if c.done() {
        return true;
    }

    c.blanks();
    if c.eat(b'Z') {
        return c.done();
    }
    if !(c.eat(b'-') || c.eat(b'+')) || !c.digits(1, 2) {
        return false;
    }
    if c.eat(b':') && !c.digits(2, 2) {
        return false;
    }
    c.done()
}
