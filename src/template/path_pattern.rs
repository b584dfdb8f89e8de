// Path patterns: URI templates anchored at `/` with a right-hand path suffix

use once_cell::sync::Lazy;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use super::parser::TemplateParser;
use super::pattern::{GroupedPattern, LogicalGroup, TemplateMatch};
use super::uri_template::UriTemplate;
use crate::component::ComponentType;
use crate::error::Result;

/// What a path pattern accepts after the templated part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RightHandPath {
    /// Any further path, captured as the last group. Used for prefix matching.
    #[default]
    Open,
    /// At most one trailing `/`.
    Closed,
}

impl RightHandPath {
    pub fn regex(self) -> &'static str {
        match self {
            RightHandPath::Open => "(/.*)?",
            RightHandPath::Closed => "(/)?",
        }
    }
}

static OPEN_SUFFIX: Lazy<GroupedPattern> = Lazy::new(|| {
    GroupedPattern::new(RightHandPath::Open.regex()).expect("open suffix pattern is valid")
});

static CLOSED_SUFFIX: Lazy<GroupedPattern> = Lazy::new(|| {
    GroupedPattern::new(RightHandPath::Closed.regex()).expect("closed suffix pattern is valid")
});

/// A path template compiled for hierarchical matching.
///
/// The template always starts with `/`; a trailing `/` is folded into the right-hand
/// suffix so `/a` and `/a/` compile to the same pattern. The suffix is the last group of
/// every match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathPattern {
    template: UriTemplate,
    pattern: GroupedPattern,
    /// The same template with a closed suffix.
    closed: GroupedPattern,
    right_hand_path: RightHandPath,
}

impl PathPattern {
    /// Compiles `template` with an open suffix.
    pub fn new(template: &str) -> Result<Self> {
        Self::with_right_hand_path(template, RightHandPath::Open)
    }

    /// Compiles `template` with a closed suffix.
    pub fn new_closed(template: &str) -> Result<Self> {
        Self::with_right_hand_path(template, RightHandPath::Closed)
    }

    pub fn with_right_hand_path(template: &str, right_hand_path: RightHandPath) -> Result<Self> {
        let template = if template.starts_with('/') {
            template.to_string()
        } else {
            format!("/{}", template)
        };

        let parsed = TemplateParser::parse_as(&template, ComponentType::Path)?;

        let base = parsed.regex.strip_suffix('/').unwrap_or(&parsed.regex);
        let mut groups = parsed.groups.clone();
        if !groups.is_empty() {
            groups.push(LogicalGroup::Capture(parsed.regex_groups + 1));
        }
        let suffixed = |suffix: RightHandPath| {
            GroupedPattern::with_groups(&format!("{}{}", base, suffix.regex()), groups.clone())
        };
        let closed = suffixed(RightHandPath::Closed)?;
        let pattern = match right_hand_path {
            RightHandPath::Open => suffixed(RightHandPath::Open)?,
            RightHandPath::Closed => closed.clone(),
        };

        let template_pattern = GroupedPattern::with_groups(&parsed.regex, parsed.groups.clone())?;
        Ok(Self {
            template: UriTemplate::from_parsed(parsed, template_pattern),
            pattern,
            closed,
            right_hand_path,
        })
    }

    /// The same template with a closed suffix, for confirming an exact terminal match.
    pub fn as_closed(&self) -> PathPattern {
        Self {
            template: self.template.clone(),
            pattern: self.closed.clone(),
            closed: self.closed.clone(),
            right_hand_path: RightHandPath::Closed,
        }
    }

    /// Matches the empty path or a single `/`.
    pub fn end_of_path() -> Self {
        Self::wrap_empty(RightHandPath::Closed)
    }

    /// Matches every path.
    pub fn open_root() -> Self {
        Self::wrap_empty(RightHandPath::Open)
    }

    fn wrap_empty(right_hand_path: RightHandPath) -> Self {
        let pattern = match right_hand_path {
            RightHandPath::Open => OPEN_SUFFIX.clone(),
            RightHandPath::Closed => CLOSED_SUFFIX.clone(),
        };
        Self {
            template: UriTemplate::empty(),
            pattern,
            closed: CLOSED_SUFFIX.clone(),
            right_hand_path,
        }
    }

    pub fn template(&self) -> &UriTemplate {
        &self.template
    }

    pub fn pattern(&self) -> &GroupedPattern {
        &self.pattern
    }

    pub fn right_hand_path(&self) -> RightHandPath {
        self.right_hand_path
    }

    pub fn match_result<'t>(&self, path: &'t str) -> Option<TemplateMatch<'t>> {
        self.pattern.match_result(path)
    }

    /// Binds template variables. The right-hand suffix is not part of the bindings.
    pub fn match_bindings(&self, path: &str) -> Option<HashMap<String, String>> {
        self.pattern
            .match_named(path, self.template.template_variables())
    }

    /// One value per template variable followed by the right-hand suffix.
    pub fn match_values(&self, path: &str) -> Option<Vec<String>> {
        self.pattern.match_values(path)
    }

    /// The part of the path matched by the right-hand suffix, or `""` if there was none.
    pub fn remainder<'t>(&self, m: &TemplateMatch<'t>) -> &'t str {
        match m.group_count() {
            0 => "",
            last => m.group(last).unwrap_or(""),
        }
    }

    /// Orders path patterns by their templates, most specific first.
    pub fn compare(a: &PathPattern, b: &PathPattern) -> Ordering {
        UriTemplate::compare(&a.template, &b.template)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.pattern, f)
    }
}
