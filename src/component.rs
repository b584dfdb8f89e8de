// Percent-encoding of URI components (RFC 3986, section 2)

use std::borrow::Cow;
use std::fmt::Write;

use crate::error::Result;

/// The URI component a value is destined for. Each kind has its own set of characters
/// that may appear unencoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Scheme,
    Authority,
    UserInfo,
    Host,
    Port,
    Path,
    PathSegment,
    MatrixParam,
    Query,
    QueryParam,
    Fragment,
    /// Anything legal somewhere in a URI. Used for literal text of generic templates.
    Uri,
}

fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~')
}

fn is_sub_delim(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'='
    )
}

fn is_gen_delim(b: u8) -> bool {
    matches!(b, b':' | b'/' | b'?' | b'#' | b'[' | b']' | b'@')
}

fn is_pchar(b: u8) -> bool {
    is_unreserved(b) || is_sub_delim(b) || b == b':' || b == b'@'
}

impl ComponentType {
    /// Whether `b` may appear in this component without being percent-encoded.
    pub fn allows(self, b: u8) -> bool {
        match self {
            ComponentType::Scheme => b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.'),
            ComponentType::UserInfo => is_unreserved(b) || is_sub_delim(b) || b == b':',
            ComponentType::Host => {
                is_unreserved(b) || is_sub_delim(b) || matches!(b, b'[' | b']' | b':')
            }
            ComponentType::Port => b.is_ascii_digit(),
            ComponentType::Authority => {
                is_unreserved(b) || is_sub_delim(b) || matches!(b, b':' | b'@' | b'[' | b']')
            }
            ComponentType::PathSegment => is_pchar(b),
            ComponentType::Path => is_pchar(b) || b == b'/',
            ComponentType::MatrixParam => is_pchar(b) && !matches!(b, b';' | b'='),
            ComponentType::Query | ComponentType::Fragment => {
                is_pchar(b) || b == b'/' || b == b'?'
            }
            ComponentType::QueryParam => {
                (is_pchar(b) || b == b'/' || b == b'?') && !matches!(b, b'=' | b'&' | b'+')
            }
            ComponentType::Uri => is_unreserved(b) || is_sub_delim(b) || is_gen_delim(b),
        }
    }
}

/// Returns true for `0-9`, `a-f` and `A-F`.
pub fn is_hex(c: char) -> bool {
    c.is_ascii_hexdigit()
}

/// Percent-encodes every character not allowed in `component`, including `%`.
pub fn encode(value: &str, component: ComponentType) -> Cow<'_, str> {
    encode_with(value, component, false)
}

/// Percent-encodes every character not allowed in `component`, leaving existing
/// `%XX` triplets untouched. A `%` that does not start a triplet is encoded.
pub fn contextual_encode(value: &str, component: ComponentType) -> Cow<'_, str> {
    encode_with(value, component, true)
}

/// Decodes all `%XX` triplets in `value`.
pub fn decode(value: &str) -> Result<Cow<'_, str>> {
    Ok(urlencoding::decode(value)?)
}

fn encode_with(value: &str, component: ComponentType, keep_triplets: bool) -> Cow<'_, str> {
    let bytes = value.as_bytes();
    let first = (0..bytes.len()).find(|&i| needs_encoding(bytes, i, component, keep_triplets));

    let Some(first) = first else {
        return Cow::Borrowed(value);
    };

    let mut out = String::with_capacity(value.len() + 8);
    out.push_str(&value[..first]);
    for i in first..bytes.len() {
        let b = bytes[i];
        if needs_encoding(bytes, i, component, keep_triplets) {
            // writing into a String never fails
            let _ = write!(out, "%{:02X}", b);
        } else {
            out.push(b as char);
        }
    }
    Cow::Owned(out)
}

fn needs_encoding(bytes: &[u8], i: usize, component: ComponentType, keep_triplets: bool) -> bool {
    let b = bytes[i];
    if b == b'%' {
        return !(keep_triplets && is_triplet(bytes, i));
    }
    !(b.is_ascii() && component.allows(b))
}

fn is_triplet(bytes: &[u8], i: usize) -> bool {
    bytes.len() > i + 2 && bytes[i + 1].is_ascii_hexdigit() && bytes[i + 2].is_ascii_hexdigit()
}
