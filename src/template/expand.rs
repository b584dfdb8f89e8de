// URI generation: substituting values into normalized templates

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::convert::Infallible;

use super::parser::TemplateParser;
use super::pattern::CompositeStyle;
use crate::component::{contextual_encode, encode, ComponentType};
use crate::error::{Result, TemplateError};

// Normalized templates encode literal braces, so any brace pair is a placeholder
// the parser already accepted.
static TEMPLATE_NAMES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}]+)\}").expect("template name pattern is valid"));

/// Where substituted values come from.
#[derive(Debug)]
pub enum ValueSource<'v> {
    /// Values looked up by variable name.
    Named(&'v HashMap<String, String>),
    /// Values taken in order, one per distinct variable name. Names seen once keep
    /// their value for later occurrences.
    Positional {
        values: Vec<&'v str>,
        cursor: usize,
        bound: HashMap<String, String>,
    },
}

impl<'v> ValueSource<'v> {
    pub fn named(values: &'v HashMap<String, String>) -> Self {
        ValueSource::Named(values)
    }

    pub fn positional<S: AsRef<str>>(values: &'v [S]) -> Self {
        Self::positional_with(values, HashMap::new())
    }

    /// Positional source whose `bound` names are resolved before any slot is consumed.
    pub fn positional_with<S: AsRef<str>>(values: &'v [S], bound: HashMap<String, String>) -> Self {
        ValueSource::Positional {
            values: values.iter().map(AsRef::as_ref).collect(),
            cursor: 0,
            bound,
        }
    }

    /// Returns the value for `name`, consuming a positional slot if the name is new.
    pub fn value_for(&mut self, name: &str) -> Option<String> {
        match self {
            ValueSource::Named(values) => values.get(name).cloned(),
            ValueSource::Positional {
                values,
                cursor,
                bound,
            } => {
                if let Some(value) = bound.get(name) {
                    return Some(value.clone());
                }
                let value = values.get(*cursor)?.to_string();
                *cursor += 1;
                bound.insert(name.to_string(), value.clone());
                Some(value)
            }
        }
    }
}

/// What to do with a placeholder that has no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Missing {
    Error,
    /// Leave the placeholder in place.
    Keep,
}

/// How substituted values are encoded. `None` inserts values verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Encoding {
    pub component: ComponentType,
    pub full: bool,
}

impl Encoding {
    fn apply(self, value: &str) -> String {
        if self.full {
            encode(value, self.component).into_owned()
        } else {
            contextual_encode(value, self.component).into_owned()
        }
    }
}

/// Substitutes named values into `normalized`. Unbound plain variables become empty and
/// unbound composite entries are left out.
pub(crate) fn expand_named(normalized: &str, values: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(normalized.len());
    let expanded = walk(
        normalized,
        &mut ValueSource::named(values),
        None,
        &mut out,
        |_, _, _| Ok::<(), Infallible>(()),
    );
    match expanded {
        Ok(()) => out,
        Err(never) => match never {},
    }
}

/// Walks `normalized` and replaces every placeholder with values from `source`.
pub(crate) fn apply_template(
    normalized: &str,
    source: &mut ValueSource<'_>,
    missing: Missing,
    encoding: Option<Encoding>,
    out: &mut String,
) -> Result<()> {
    walk(normalized, source, encoding, out, |name, placeholder, out| {
        match (missing, name) {
            (Missing::Error, Some(name)) => Err(TemplateError::MissingValue {
                name: name.to_string(),
            }),
            (Missing::Error, None) => Ok(()),
            (Missing::Keep, _) => {
                out.push_str(placeholder);
                Ok(())
            }
        }
    })
}

/// Core substitution loop. `unbound` receives the variable name (`None` for a composite
/// with no bound entry) and the raw placeholder text.
fn walk<E>(
    normalized: &str,
    source: &mut ValueSource<'_>,
    encoding: Option<Encoding>,
    out: &mut String,
    mut unbound: impl FnMut(Option<&str>, &str, &mut String) -> std::result::Result<(), E>,
) -> std::result::Result<(), E> {
    let encode_value = |value: String| match encoding {
        Some(encoding) => encoding.apply(&value),
        None => value,
    };

    let mut last = 0;
    for caps in TEMPLATE_NAMES.captures_iter(normalized) {
        let (Some(whole), Some(variable)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&normalized[last..whole.start()]);
        last = whole.end();

        let variable = variable.as_str();
        let style = variable.chars().next().and_then(CompositeStyle::from_marker);

        let Some(style) = style else {
            match source.value_for(variable) {
                Some(value) => out.push_str(&encode_value(value)),
                None => unbound(Some(variable), whole.as_str(), out)?,
            }
            continue;
        };

        let mut pairs = Vec::new();
        for name in variable[1..].split(',') {
            let Some(value) = source.value_for(name) else {
                continue;
            };
            match (style, value.is_empty()) {
                (CompositeStyle::Matrix, true) => pairs.push(name.to_string()),
                _ => pairs.push(format!("{}={}", name, encode_value(value))),
            }
        }

        if pairs.is_empty() {
            unbound(None, whole.as_str(), out)?;
            continue;
        }
        out.push(style.prefix());
        out.push_str(&pairs.join(style.separator().to_string().as_str()));
    }
    out.push_str(&normalized[last..]);
    Ok(())
}

/// Individual templated parts of a URI. Empty and absent parts are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UriComponents {
    pub scheme: Option<String>,
    pub authority: Option<String>,
    pub user_info: Option<String>,
    pub host: Option<String>,
    pub port: Option<String>,
    pub path: Option<String>,
    pub query: Option<String>,
    pub fragment: Option<String>,
}

fn present(part: &Option<String>) -> Option<&str> {
    part.as_deref().filter(|s| !s.is_empty())
}

fn push_component(
    out: &mut String,
    template: &str,
    component: ComponentType,
    encode: bool,
    source: &mut ValueSource<'_>,
) -> Result<()> {
    if !template.contains('{') {
        out.push_str(template);
        return Ok(());
    }

    let normalized = TemplateParser::parse(template)?.normalized_template;
    apply_template(
        &normalized,
        source,
        Missing::Error,
        Some(Encoding {
            component,
            full: encode,
        }),
        out,
    )
}

/// Builds a URI from templated components.
///
/// Each variable is looked up in `named` first and otherwise takes the next entry of
/// `values`; the cursor is shared across all components and a value once found is reused
/// for every later occurrence of the name. A variable with no value is an error.
///
/// With `encode` set, values are fully percent-encoded for their component; otherwise
/// existing `%XX` triplets are kept. Path values are encoded as single segments when
/// `encode_slash_in_path` is set. Scheme and port values are never fully encoded.
pub fn create_uri_from_components<S: AsRef<str>>(
    components: &UriComponents,
    values: &[S],
    named: &HashMap<String, String>,
    encode: bool,
    encode_slash_in_path: bool,
) -> Result<String> {
    let mut source = ValueSource::positional_with(values, named.clone());
    let mut out = String::new();

    if let Some(scheme) = components.scheme.as_deref() {
        push_component(&mut out, scheme, ComponentType::Scheme, false, &mut source)?;
        out.push(':');
    }

    let user_info = present(&components.user_info);
    let host = present(&components.host);
    let port = present(&components.port);

    if user_info.is_some() || host.is_some() || port.is_some() {
        out.push_str("//");
        if let Some(user_info) = user_info {
            push_component(&mut out, user_info, ComponentType::UserInfo, encode, &mut source)?;
            out.push('@');
        }
        if let Some(host) = host {
            push_component(&mut out, host, ComponentType::Host, encode, &mut source)?;
        }
        if let Some(port) = port {
            out.push(':');
            push_component(&mut out, port, ComponentType::Port, false, &mut source)?;
        }
    } else if let Some(authority) = present(&components.authority) {
        out.push_str("//");
        push_component(&mut out, authority, ComponentType::Authority, encode, &mut source)?;
    }

    let path = present(&components.path);
    let query = present(&components.query);
    let fragment = present(&components.fragment);

    if path.is_some() || query.is_some() || fragment.is_some() {
        if !out.is_empty() && !path.is_some_and(|p| p.starts_with('/')) {
            out.push('/');
        }
        if let Some(path) = path {
            let component = if encode_slash_in_path {
                ComponentType::PathSegment
            } else {
                ComponentType::Path
            };
            push_component(&mut out, path, component, encode, &mut source)?;
        }
        if let Some(query) = query {
            out.push('?');
            push_component(&mut out, query, ComponentType::QueryParam, encode, &mut source)?;
        }
        if let Some(fragment) = fragment {
            out.push('#');
            push_component(&mut out, fragment, ComponentType::Fragment, encode, &mut source)?;
        }
    }

    Ok(out)
}

/// Substitutes the variables of `template` that have a value in `values`, encoded for
/// `component`, and leaves every other placeholder untouched.
///
/// A name mapped to `None` is rejected with [`TemplateError::NullValue`].
pub fn resolve_template_values(
    component: ComponentType,
    template: &str,
    encode: bool,
    values: &HashMap<String, Option<String>>,
) -> Result<String> {
    if !template.contains('{') {
        return Ok(template.to_string());
    }

    let parsed = TemplateParser::parse(template)?;
    if let Some(name) = parsed
        .names
        .iter()
        .find(|name| matches!(values.get(name.as_str()), Some(None)))
    {
        return Err(TemplateError::NullValue { name: name.clone() });
    }

    let known: HashMap<String, String> = values
        .iter()
        .filter_map(|(name, value)| value.as_ref().map(|v| (name.clone(), v.clone())))
        .collect();

    let mut out = String::with_capacity(parsed.normalized_template.len());
    apply_template(
        &parsed.normalized_template,
        &mut ValueSource::named(&known),
        Missing::Keep,
        Some(Encoding {
            component,
            full: encode,
        }),
        &mut out,
    )?;
    Ok(out)
}
