// URI template: matching, URI generation and specificity ordering

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::expand::{apply_template, expand_named, Missing, ValueSource};
use super::parser::{ParsedTemplate, TemplateParser};
use super::pattern::{GroupedPattern, TemplateMatch};
use crate::error::Result;
use crate::uri;

/// A compiled URI template such as `/users/{id}/posts/{slug:[a-z-]+}{?page}`.
///
/// Templates are immutable once built. Equality, hashing and `Display` use the compiled
/// regex text, so two templates that differ only in whitespace inside placeholders are
/// equal.
#[derive(Debug, Clone)]
pub struct UriTemplate {
    template: String,
    normalized_template: String,
    pattern: GroupedPattern,
    ends_with_slash: bool,
    variables: Vec<String>,
    explicit_regexes: usize,
    regex_groups: usize,
    literal_characters: usize,
}

impl UriTemplate {
    pub fn new(template: &str) -> Result<Self> {
        let parsed = TemplateParser::parse(template)?;
        let pattern = GroupedPattern::with_groups(&parsed.regex, parsed.groups.clone())?;
        Ok(Self::from_parsed(parsed, pattern))
    }

    /// Template that matches only the empty string and sorts after every other template.
    pub fn empty() -> Self {
        Self {
            template: String::new(),
            normalized_template: String::new(),
            pattern: GroupedPattern::empty(),
            ends_with_slash: false,
            variables: Vec::new(),
            explicit_regexes: 0,
            regex_groups: 0,
            literal_characters: 0,
        }
    }

    pub(crate) fn from_parsed(parsed: ParsedTemplate, pattern: GroupedPattern) -> Self {
        Self {
            ends_with_slash: parsed.template.ends_with('/'),
            template: parsed.template,
            normalized_template: parsed.normalized_template,
            pattern,
            variables: parsed.names,
            explicit_regexes: parsed.explicit_regexes,
            regex_groups: parsed.regex_groups,
            literal_characters: parsed.literal_characters,
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn normalized_template(&self) -> &str {
        &self.normalized_template
    }

    pub fn pattern(&self) -> &GroupedPattern {
        &self.pattern
    }

    pub fn is_empty(&self) -> bool {
        self.template.is_empty()
    }

    pub fn ends_with_slash(&self) -> bool {
        self.ends_with_slash
    }

    /// Variable names in order of appearance. Repeated names appear once per occurrence.
    pub fn template_variables(&self) -> &[String] {
        &self.variables
    }

    pub fn is_template_variable_present(&self, name: &str) -> bool {
        self.variables.iter().any(|v| v == name)
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Number of variables declared with an explicit, non-empty sub-pattern.
    pub fn explicit_regexes(&self) -> usize {
        self.explicit_regexes
    }

    pub fn regex_groups(&self) -> usize {
        self.regex_groups
    }

    /// Number of literal characters in the raw template, counted before encoding.
    pub fn literal_characters(&self) -> usize {
        self.literal_characters
    }

    pub fn match_result<'t>(&self, candidate: &'t str) -> Option<TemplateMatch<'t>> {
        self.pattern.match_result(candidate)
    }

    /// Matches `candidate` and binds every variable that took part in the match.
    /// Returns `None` if the candidate does not match or a repeated variable would be
    /// bound to two different values.
    pub fn match_bindings(&self, candidate: &str) -> Option<HashMap<String, String>> {
        self.pattern.match_named(candidate, &self.variables)
    }

    /// Matches `candidate` and returns one value per variable occurrence, in order.
    pub fn match_values(&self, candidate: &str) -> Option<Vec<String>> {
        self.pattern.match_values(candidate)
    }

    /// Substitutes values by name. Unbound plain variables become empty; unbound
    /// composite entries are left out.
    pub fn create_uri(&self, values: &HashMap<String, String>) -> String {
        expand_named(&self.normalized_template, values)
    }

    /// Substitutes values in order of first occurrence of each distinct variable.
    /// Extra values are ignored; running out of values for a plain variable is an error.
    pub fn create_uri_from_values<S: AsRef<str>>(&self, values: &[S]) -> Result<String> {
        let mut out = String::with_capacity(self.normalized_template.len());
        apply_template(
            &self.normalized_template,
            &mut ValueSource::positional(values),
            Missing::Error,
            None,
            &mut out,
        )?;
        Ok(out)
    }

    /// Orders templates from most to least specific: more literal characters first,
    /// then more variables, then more explicit sub-patterns, then by regex text.
    /// The empty template sorts last.
    pub fn compare(a: &UriTemplate, b: &UriTemplate) -> Ordering {
        match (a.is_empty(), b.is_empty()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            (false, false) => {}
        }

        b.literal_characters
            .cmp(&a.literal_characters)
            .then_with(|| b.variables.len().cmp(&a.variables.len()))
            .then_with(|| b.explicit_regexes.cmp(&a.explicit_regexes))
            .then_with(|| b.pattern.regex().cmp(a.pattern.regex()))
    }

    /// Resolves `reference` against `base` (RFC 3986, section 5.2).
    pub fn resolve(base: &str, reference: &str) -> String {
        uri::resolve(base, reference)
    }

    /// Removes dot segments from the path of `uri`, if it has any.
    pub fn normalize(uri: &str) -> String {
        uri::normalize(uri)
    }

    /// Expresses `reference` relative to `base` when `base` is a prefix of it.
    pub fn relativize(base: &str, reference: &str) -> String {
        uri::relativize(base, reference)
    }
}

impl Default for UriTemplate {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for UriTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for UriTemplate {}

impl Hash for UriTemplate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pattern.hash(state);
    }
}

impl fmt::Display for UriTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.pattern, f)
    }
}
