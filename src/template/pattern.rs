// Compiled template patterns that expose only the template-variable groups

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;

use crate::error::{Result, TemplateError};

/// Style of a composite `{?a,b}` / `{;a,b}` placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeStyle {
    Query,
    Matrix,
}

impl CompositeStyle {
    pub fn from_marker(marker: char) -> Option<Self> {
        match marker {
            '?' => Some(CompositeStyle::Query),
            ';' => Some(CompositeStyle::Matrix),
            _ => None,
        }
    }

    /// Character emitted once before the first expanded pair.
    pub fn prefix(self) -> char {
        match self {
            CompositeStyle::Query => '?',
            CompositeStyle::Matrix => ';',
        }
    }

    /// Character placed between expanded pairs.
    pub fn separator(self) -> char {
        match self {
            CompositeStyle::Query => '&',
            CompositeStyle::Matrix => ';',
        }
    }

    /// Regex fragment for the whole section. Contains exactly one capturing group.
    pub fn regex(self) -> &'static str {
        match self {
            CompositeStyle::Query => r"(\?[^#]*)?",
            CompositeStyle::Matrix => r"(;[^/?#]*)?",
        }
    }

    /// Finds the value of `name` inside a captured section such as `?a=1&b=2`.
    /// The returned range is relative to `section`. A bare `name` yields an empty range.
    fn find(self, section: &str, name: &str) -> Option<Range<usize>> {
        let body = section.strip_prefix(self.prefix())?;
        let mut offset = self.prefix().len_utf8();
        for entry in body.split(self.separator()) {
            let (key, value_start) = match entry.find('=') {
                Some(eq) => (&entry[..eq], offset + eq + 1),
                None => (entry, offset + entry.len()),
            };
            if key == name {
                return Some(value_start..offset + entry.len());
            }
            offset += entry.len() + self.separator().len_utf8();
        }
        None
    }
}

/// Where the value of one logical group comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicalGroup {
    /// A plain capturing group of the compiled expression.
    Capture(usize),
    /// One named entry inside a composite section captured by group `capture`.
    Parameter {
        capture: usize,
        name: String,
        style: CompositeStyle,
    },
}

impl LogicalGroup {
    pub fn capture(&self) -> usize {
        match self {
            LogicalGroup::Capture(capture) => *capture,
            LogicalGroup::Parameter { capture, .. } => *capture,
        }
    }

    fn resolve(&self, caps: &Captures<'_>) -> Option<Range<usize>> {
        match self {
            LogicalGroup::Capture(capture) => caps.get(*capture).map(|m| m.range()),
            LogicalGroup::Parameter {
                capture,
                name,
                style,
            } => {
                let section = caps.get(*capture)?;
                style
                    .find(section.as_str(), name)
                    .map(|r| section.start() + r.start..section.start() + r.end)
            }
        }
    }
}

/// Mapping from logical group position to the capturing groups of a compiled expression.
///
/// Every entry is checked against the number of capturing groups when the mapping is
/// built, so resolving a logical group can never address a missing group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupIndex {
    groups: Vec<LogicalGroup>,
}

impl GroupIndex {
    pub fn new(groups: Vec<LogicalGroup>, capture_groups: usize) -> Result<Self> {
        if let Some(bad) = groups
            .iter()
            .find(|g| g.capture() == 0 || g.capture() > capture_groups)
        {
            return Err(TemplateError::GroupIndex {
                index: bad.capture(),
                groups: capture_groups,
            });
        }
        Ok(Self { groups })
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogicalGroup> {
        self.groups.iter()
    }
}

/// Result of a successful full match.
///
/// Group 0 is the whole input; groups `1..=group_count()` are the logical groups.
/// A logical group that did not take part in the match has no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMatch<'t> {
    text: &'t str,
    groups: Vec<Option<Range<usize>>>,
}

impl<'t> TemplateMatch<'t> {
    fn empty() -> Self {
        Self {
            text: "",
            groups: Vec::new(),
        }
    }

    fn from_captures(text: &'t str, caps: &Captures<'t>, index: &GroupIndex) -> Self {
        let groups = if index.is_empty() {
            (1..caps.len()).map(|i| caps.get(i).map(|m| m.range())).collect()
        } else {
            index.iter().map(|g| g.resolve(caps)).collect()
        };
        Self { text, groups }
    }

    pub fn start(&self) -> usize {
        0
    }

    pub fn end(&self) -> usize {
        self.text.len()
    }

    pub fn as_str(&self) -> &'t str {
        self.text
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Value of a logical group.
    ///
    /// # Panics
    ///
    /// Panics if `group > group_count()`.
    pub fn group(&self, group: usize) -> Option<&'t str> {
        self.range(group).map(|r| &self.text[r])
    }

    /// Byte range of a logical group within the matched text.
    ///
    /// # Panics
    ///
    /// Panics if `group > group_count()`.
    pub fn range(&self, group: usize) -> Option<Range<usize>> {
        match self.try_range(group) {
            Ok(range) => range,
            Err(err) => panic!("{}", err),
        }
    }

    /// Like [`TemplateMatch::group`] but reports an out-of-range group as an error.
    pub fn try_group(&self, group: usize) -> Result<Option<&'t str>> {
        Ok(self.try_range(group)?.map(|r| &self.text[r]))
    }

    fn try_range(&self, group: usize) -> Result<Option<Range<usize>>> {
        match group {
            0 => Ok(Some(0..self.text.len())),
            g if g <= self.groups.len() => Ok(self.groups[g - 1].clone()),
            g => Err(TemplateError::GroupIndex {
                index: g,
                groups: self.groups.len(),
            }),
        }
    }

    /// Values of the logical groups, in order.
    pub fn iter(&self) -> impl Iterator<Item = Option<&'t str>> + '_ {
        self.groups
            .iter()
            .map(move |r| r.clone().map(|r| &self.text[r]))
    }
}

/// A compiled regular expression together with the mapping that hides every capturing
/// group not introduced by a template variable.
///
/// Equality and hashing only look at the regex source text.
#[derive(Debug, Clone)]
pub struct GroupedPattern {
    regex: String,
    compiled: Option<Regex>,
    group_index: GroupIndex,
}

impl GroupedPattern {
    /// The empty pattern. Matches only the empty string and has no groups.
    pub fn empty() -> Self {
        Self {
            regex: String::new(),
            compiled: None,
            group_index: GroupIndex::default(),
        }
    }

    /// Compiles `regex` without a group mapping: every capturing group is exposed.
    pub fn new(regex: &str) -> Result<Self> {
        Self::with_groups(regex, Vec::new())
    }

    /// Compiles `regex` and exposes only the listed logical groups.
    pub fn with_groups(regex: &str, groups: Vec<LogicalGroup>) -> Result<Self> {
        if regex.is_empty() {
            let group_index = GroupIndex::new(groups, 0)?;
            return Ok(Self {
                group_index,
                ..Self::empty()
            });
        }

        let compiled =
            Regex::new(&format!("^(?:{})$", regex)).map_err(|source| TemplateError::Pattern {
                pattern: regex.to_string(),
                source,
            })?;
        let group_index = GroupIndex::new(groups, compiled.captures_len() - 1)?;

        Ok(Self {
            regex: regex.to_string(),
            compiled: Some(compiled),
            group_index,
        })
    }

    pub fn regex(&self) -> &str {
        &self.regex
    }

    pub fn group_index(&self) -> &GroupIndex {
        &self.group_index
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_none()
    }

    /// Number of capturing groups in the compiled expression, nested ones included.
    pub fn capture_groups(&self) -> usize {
        self.compiled
            .as_ref()
            .map(|re| re.captures_len() - 1)
            .unwrap_or(0)
    }

    /// Matches the whole of `text`.
    pub fn match_result<'t>(&self, text: &'t str) -> Option<TemplateMatch<'t>> {
        let Some(compiled) = &self.compiled else {
            return text.is_empty().then(TemplateMatch::empty);
        };
        let caps = compiled.captures(text)?;
        Some(TemplateMatch::from_captures(text, &caps, &self.group_index))
    }

    /// Matches the whole of `text` and returns one value per logical group.
    /// Groups that did not participate yield an empty string.
    pub fn match_values(&self, text: &str) -> Option<Vec<String>> {
        let m = self.match_result(text)?;
        Some(
            m.iter()
                .map(|v| v.unwrap_or_default().to_string())
                .collect(),
        )
    }

    /// Matches the whole of `text` and binds logical groups to `names`, position by
    /// position. A name that occurs more than once must bind the same value every time,
    /// otherwise the match fails.
    pub fn match_named<S: AsRef<str>>(
        &self,
        text: &str,
        names: &[S],
    ) -> Option<HashMap<String, String>> {
        let m = self.match_result(text)?;
        let mut bindings = HashMap::with_capacity(names.len());

        for (name, value) in names.iter().zip(m.iter()) {
            let name: &str = name.as_ref();
            let Some(value) = value else {
                continue;
            };
            match bindings.get(name) {
                Some(previous) if previous != value => {
                    tracing::trace!(
                        name,
                        previous = %previous,
                        current = value,
                        "conflicting values for repeated template variable"
                    );
                    return None;
                }
                Some(_) => {}
                None => {
                    bindings.insert(name.to_string(), value.to_string());
                }
            }
        }

        Some(bindings)
    }
}

impl Default for GroupedPattern {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for GroupedPattern {
    fn eq(&self, other: &Self) -> bool {
        self.regex == other.regex
    }
}

impl Eq for GroupedPattern {}

impl Hash for GroupedPattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.regex.hash(state);
    }
}

impl fmt::Display for GroupedPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.regex)
    }
}
