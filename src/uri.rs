// URI reference algebra: parse, resolve, normalize and relativize (RFC 3986, section 5)

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static URI_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    // RFC 3986, appendix B
    Regex::new(r"^(([^:/?#]+):)?(//([^/?#]*))?([^?#]*)(\?([^#]*))?(#(.*))?")
        .expect("URI reference pattern is valid")
});

/// The five components of a URI reference. Absent and empty components are kept
/// apart: `http://a/b?` has an empty query, `http://a/b` has none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UriRef {
    pub scheme: Option<String>,
    pub authority: Option<String>,
    pub path: String,
    pub query: Option<String>,
    pub fragment: Option<String>,
}

impl UriRef {
    pub fn parse(uri: &str) -> Self {
        let Some(caps) = URI_REFERENCE.captures(uri) else {
            return Self {
                path: uri.to_string(),
                ..Self::default()
            };
        };
        let part = |i: usize| caps.get(i).map(|m| m.as_str().to_string());

        Self {
            scheme: part(2),
            authority: part(4),
            path: part(5).unwrap_or_default(),
            query: part(7),
            fragment: part(9),
        }
    }

    pub fn is_absolute(&self) -> bool {
        self.scheme.is_some()
    }

    /// An absolute URI whose scheme-specific part does not start with `/`, like
    /// `mailto:a@b`.
    pub fn is_opaque(&self) -> bool {
        self.scheme.is_some() && self.authority.is_none() && !self.path.starts_with('/')
    }

    fn has_dot_segment(&self) -> bool {
        self.path.split('/').any(|s| s == "." || s == "..")
    }
}

impl fmt::Display for UriRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scheme) = &self.scheme {
            write!(f, "{}:", scheme)?;
        }
        if let Some(authority) = &self.authority {
            write!(f, "//{}", authority)?;
        }
        f.write_str(&self.path)?;
        if let Some(query) = &self.query {
            write!(f, "?{}", query)?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{}", fragment)?;
        }
        Ok(())
    }
}

/// Removes `.` and `..` segments from `path` (RFC 3986, section 5.2.4).
/// A `..` with nothing left to remove is dropped.
pub fn remove_dot_segments(path: &str) -> String {
    let mut input = path;
    let mut output = String::with_capacity(path.len());

    while !input.is_empty() {
        if let Some(rest) = input.strip_prefix("../") {
            input = rest;
        } else if let Some(rest) = input.strip_prefix("./") {
            input = rest;
        } else if input.starts_with("/./") {
            input = &input[2..];
        } else if input == "/." {
            input = "/";
        } else if input.starts_with("/../") {
            input = &input[3..];
            pop_segment(&mut output);
        } else if input == "/.." {
            input = "/";
            pop_segment(&mut output);
        } else if input == "." || input == ".." {
            input = "";
        } else {
            let start = usize::from(input.starts_with('/'));
            let end = input[start..]
                .find('/')
                .map(|i| i + start)
                .unwrap_or(input.len());
            output.push_str(&input[..end]);
            input = &input[end..];
        }
    }

    output
}

fn pop_segment(output: &mut String) {
    match output.rfind('/') {
        Some(i) => output.truncate(i),
        None => output.clear(),
    }
}

fn merge(base: &UriRef, reference_path: &str) -> String {
    if base.authority.is_some() && base.path.is_empty() {
        return format!("/{}", reference_path);
    }
    match base.path.rfind('/') {
        Some(i) => format!("{}{}", &base.path[..=i], reference_path),
        None => reference_path.to_string(),
    }
}

/// Resolves `reference` against `base` (RFC 3986, section 5.2.2, strict) and
/// normalizes the result.
///
/// An empty reference yields the base without its fragment. A reference that is only
/// a query replaces the query of the base and drops its fragment.
pub fn resolve(base: &str, reference: &str) -> String {
    let base = UriRef::parse(base);

    if reference.is_empty() {
        tracing::trace!(base = %base, "empty reference resolves to the base");
        return UriRef {
            fragment: None,
            ..base
        }
        .to_string();
    }

    if let Some(query) = reference.strip_prefix('?') {
        tracing::trace!(base = %base, query, "query-only reference replaces the base query");
        return UriRef {
            query: Some(query.to_string()),
            fragment: None,
            ..base
        }
        .to_string();
    }

    let r = UriRef::parse(reference);
    let target = if r.scheme.is_some() {
        UriRef {
            path: remove_dot_segments(&r.path),
            ..r
        }
    } else if r.authority.is_some() {
        UriRef {
            scheme: base.scheme,
            path: remove_dot_segments(&r.path),
            ..r
        }
    } else if r.path.is_empty() {
        UriRef {
            scheme: base.scheme,
            authority: base.authority,
            path: base.path,
            query: r.query.or(base.query),
            fragment: r.fragment,
        }
    } else {
        let path = if r.path.starts_with('/') {
            remove_dot_segments(&r.path)
        } else {
            remove_dot_segments(&merge(&base, &r.path))
        };
        UriRef {
            scheme: base.scheme,
            authority: base.authority,
            path,
            query: r.query,
            fragment: r.fragment,
        }
    };

    normalize_ref(target).to_string()
}

/// Removes dot segments from the path of `uri`. A URI whose path has no `.` or `..`
/// segment is returned unchanged.
pub fn normalize(uri: &str) -> String {
    normalize_ref(UriRef::parse(uri)).to_string()
}

fn normalize_ref(uri: UriRef) -> UriRef {
    if !uri.has_dot_segment() {
        return uri;
    }
    UriRef {
        path: remove_dot_segments(&uri.path),
        ..uri
    }
}

/// Expresses `reference` relative to `base`, then normalizes it.
///
/// Only references below the base path are relativized; anything else (another
/// scheme or authority, a sibling path, an opaque URI) is returned normalized but
/// otherwise as given.
pub fn relativize(base: &str, reference: &str) -> String {
    let base = UriRef::parse(base);
    let child = UriRef::parse(reference);

    normalize_ref(relativize_ref(&base, child)).to_string()
}

fn relativize_ref(base: &UriRef, child: UriRef) -> UriRef {
    if base.is_opaque() || child.is_opaque() {
        return child;
    }

    let same_scheme = match (&base.scheme, &child.scheme) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        (None, None) => true,
        _ => false,
    };
    if !same_scheme || base.authority != child.authority {
        return child;
    }

    let base_path = normalize_ref(UriRef {
        path: base.path.clone(),
        ..UriRef::default()
    })
    .path;
    let child_path = normalize_ref(UriRef {
        path: child.path.clone(),
        ..UriRef::default()
    })
    .path;

    let remainder = if base_path == child_path {
        String::new()
    } else {
        let prefix = if base_path.ends_with('/') {
            base_path
        } else {
            format!("{}/", base_path)
        };
        match child_path.strip_prefix(prefix.as_str()) {
            Some(rest) => rest.to_string(),
            None => {
                tracing::trace!(
                    base = %prefix,
                    child = %child_path,
                    "reference is not below the base path"
                );
                return child;
            }
        }
    };

    UriRef {
        scheme: None,
        authority: None,
        path: remainder,
        query: child.query,
        fragment: child.fragment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let uri = UriRef::parse("http://a/b/c/d;p?q#f");
        assert_eq!(uri.scheme.as_deref(), Some("http"));
        assert_eq!(uri.authority.as_deref(), Some("a"));
        assert_eq!(uri.path, "/b/c/d;p");
        assert_eq!(uri.query.as_deref(), Some("q"));
        assert_eq!(uri.fragment.as_deref(), Some("f"));
        assert_eq!(uri.to_string(), "http://a/b/c/d;p?q#f");

        let uri = UriRef::parse("../g?");
        assert!(!uri.is_absolute());
        assert_eq!(uri.query.as_deref(), Some(""));
        assert_eq!(uri.to_string(), "../g?");
    }

    #[test]
    fn test_remove_dot_segments() {
        assert_eq!(remove_dot_segments("/a/b/c/./../../g"), "/a/g");
        assert_eq!(remove_dot_segments("mid/content=5/../6"), "mid/6");
        assert_eq!(remove_dot_segments("/../g"), "/g");
        assert_eq!(remove_dot_segments("/a//b"), "/a//b");
        assert_eq!(remove_dot_segments(".."), "");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("/some-path"), "/some-path");
        assert_eq!(
            normalize("http://example.com/some/../path"),
            "http://example.com/path"
        );
        assert_eq!(normalize("http://example.com/../path"), "http://example.com/path");
        assert_eq!(normalize("http://example.com//path"), "http://example.com//path");
        assert_eq!(normalize("/a/.b/c"), "/a/.b/c");
    }

    #[test]
    fn test_resolve_shortcuts() {
        let base = "http://a/b/c/d;p?q";
        assert_eq!(resolve(base, ""), base);
        assert_eq!(resolve("http://a/b?q#f", ""), "http://a/b?q");
        assert_eq!(resolve(base, "?y"), "http://a/b/c/d;p?y");
        assert_eq!(resolve(base, "#s"), "http://a/b/c/d;p?q#s");
    }

    #[test]
    fn test_relativize() {
        assert_eq!(relativize("http://a/b/c/d", "http://a/b/c/d/e"), "e");
        assert_eq!(relativize("http://a/b/c/d", "http://a/b/c/e"), "http://a/b/c/e");
        assert_eq!(relativize("http://a/b/c/d", "https://a/b/c/d/e"), "https://a/b/c/d/e");
        assert_eq!(relativize("http://a/b/c/d", "http://x/b/c/d/e"), "http://x/b/c/d/e");
        assert_eq!(relativize("HTTP://a/b/", "http://a/b/c?x#y"), "c?x#y");
        assert_eq!(relativize("mailto:a@b", "mailto:a@b"), "mailto:a@b");
    }
}
