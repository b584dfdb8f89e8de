// Template parser: turns `{name}` / `{name:regex}` / `{?a,b}` templates into regex source

use regex::Regex;
use std::collections::HashMap;

use super::pattern::{CompositeStyle, LogicalGroup};
use crate::component::{contextual_encode, ComponentType};
use crate::error::{Result, TemplateError};

/// Pattern used for a template variable without an explicit sub-pattern.
///
/// A default variable placed before a composite also excludes that composite's marker
/// (`[^/?]+` before `{?q}`), so the optional section can still bind.
pub const TEMPLATE_VALUE_PATTERN: &str = "[^/]+";

/// Everything the parser learns about a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTemplate {
    /// Raw template text.
    pub template: String,
    /// Template with sub-patterns removed and literal text encoded.
    pub normalized_template: String,
    /// Regex source, not anchored.
    pub regex: String,
    /// Variable names in order of appearance, duplicates kept.
    pub names: Vec<String>,
    /// One logical group per entry in `names`.
    pub groups: Vec<LogicalGroup>,
    pub explicit_regexes: usize,
    /// Capturing groups contributed by template variables, nested ones included.
    pub regex_groups: usize,
    pub literal_characters: usize,
}

pub struct TemplateParser<'a> {
    input: &'a str,
    pos: usize,
    component: ComponentType,
    literal_buf: String,
    parsed: ParsedTemplate,
    name_patterns: HashMap<String, String>,
    /// Regex offsets of default value patterns, in order.
    default_values: Vec<usize>,
    /// First entry of `default_values` in the current path segment.
    segment_defaults: usize,
}

impl<'a> TemplateParser<'a> {
    /// Parses a generic URI template. Literal text keeps every character legal in a URI.
    pub fn parse(template: &'a str) -> Result<ParsedTemplate> {
        Self::parse_as(template, ComponentType::Uri)
    }

    /// Parses a template whose literal text is encoded for `component`.
    pub fn parse_as(template: &'a str, component: ComponentType) -> Result<ParsedTemplate> {
        if template.is_empty() {
            return Err(TemplateError::EmptyTemplate);
        }

        let mut parser = Self {
            input: template,
            pos: 0,
            component,
            literal_buf: String::new(),
            parsed: ParsedTemplate {
                template: template.to_string(),
                normalized_template: String::new(),
                regex: String::new(),
                names: Vec::new(),
                groups: Vec::new(),
                explicit_regexes: 0,
                regex_groups: 0,
                literal_characters: 0,
            },
            name_patterns: HashMap::new(),
            default_values: Vec::new(),
            segment_defaults: 0,
        };
        parser.parse_template()?;

        tracing::debug!(
            template,
            regex = %parser.parsed.regex,
            variables = ?parser.parsed.names,
            "compiled template"
        );
        Ok(parser.parsed)
    }

    fn parse_template(&mut self) -> Result<()> {
        while let Some(ch) = self.peek_char() {
            if ch == '{' {
                self.flush_literal();
                self.consume_char()?;
                self.parse_placeholder()?;
            } else {
                let ch = self.consume_char()?;
                self.literal_buf.push(ch);
            }
        }
        self.flush_literal();
        Ok(())
    }

    fn flush_literal(&mut self) {
        if self.literal_buf.is_empty() {
            return;
        }

        self.parsed.literal_characters += self.literal_buf.chars().count();
        let encoded = contextual_encode(&self.literal_buf, self.component);
        push_literal_regex(&mut self.parsed.regex, &encoded);
        self.parsed.normalized_template.push_str(&encoded);
        if self.literal_buf.contains('/') {
            self.segment_defaults = self.default_values.len();
        }
        self.literal_buf.clear();
    }

    fn parse_placeholder(&mut self) -> Result<()> {
        self.skip_whitespace();

        let style = match self.peek_char() {
            Some(marker) => CompositeStyle::from_marker(marker),
            None => return Err(self.unterminated()),
        };
        if style.is_some() {
            self.consume_char()?;
        }

        let mut name = String::new();
        let first = self.consume_char()?;
        if !is_name_start(first) {
            return Err(self.syntax_error(first));
        }
        name.push(first);

        let mut sub_pattern = None;
        loop {
            let ch = self.consume_char()?;
            match ch {
                c if is_name_char(c) => name.push(c),
                ',' if style.is_some() => {
                    // every list entry must start like a name
                    match self.peek_char() {
                        Some(c) if is_name_start(c) => name.push(','),
                        Some(c) => {
                            self.pos += c.len_utf8();
                            return Err(self.syntax_error(c));
                        }
                        None => return Err(self.unterminated()),
                    }
                }
                ':' if style.is_none() => {
                    sub_pattern = Some(self.parse_sub_pattern()?);
                    break;
                }
                '}' => break,
                ' ' if style.is_none() => {
                    self.skip_whitespace();
                    match self.consume_char()? {
                        ':' => {
                            sub_pattern = Some(self.parse_sub_pattern()?);
                            break;
                        }
                        '}' => break,
                        other => return Err(self.syntax_error(other)),
                    }
                }
                other => return Err(self.syntax_error(other)),
            }
        }

        match style {
            Some(style) => self.push_composite(style, &name),
            None => self.push_variable(name, sub_pattern.unwrap_or_default()),
        }
    }

    fn parse_sub_pattern(&mut self) -> Result<String> {
        let mut pattern = String::new();
        let mut depth = 1;

        loop {
            let ch = self.consume_char()?;
            match ch {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            pattern.push(ch);
        }

        Ok(pattern.trim().to_string())
    }

    fn push_variable(&mut self, name: String, sub_pattern: String) -> Result<()> {
        let pattern = if sub_pattern.is_empty() {
            self.default_values.push(self.parsed.regex.len() + 1);
            TEMPLATE_VALUE_PATTERN.to_string()
        } else {
            self.parsed.explicit_regexes += 1;
            sub_pattern
        };

        match self.name_patterns.get(&name) {
            Some(existing) if *existing != pattern => {
                return Err(TemplateError::ConflictingPattern {
                    name,
                    template: self.input.to_string(),
                });
            }
            Some(_) => {}
            None => {
                self.name_patterns.insert(name.clone(), pattern.clone());
            }
        }

        let inner_groups = Regex::new(&pattern)
            .map_err(|source| TemplateError::InvalidPattern {
                name: name.clone(),
                pattern: pattern.clone(),
                template: self.input.to_string(),
                source,
            })?
            .captures_len()
            - 1;

        let capture = self.parsed.regex_groups + 1;
        self.parsed.regex_groups += 1 + inner_groups;
        self.parsed.groups.push(LogicalGroup::Capture(capture));

        self.parsed.regex.push('(');
        self.parsed.regex.push_str(&pattern);
        self.parsed.regex.push(')');

        self.parsed.normalized_template.push('{');
        self.parsed.normalized_template.push_str(&name);
        self.parsed.normalized_template.push('}');

        self.parsed.names.push(name);
        Ok(())
    }

    fn push_composite(&mut self, style: CompositeStyle, list: &str) -> Result<()> {
        // a query ends every segment, a matrix section only the current one
        let from = match style {
            CompositeStyle::Query => 0,
            CompositeStyle::Matrix => self.segment_defaults,
        };
        self.exclude_from_defaults(from, style.prefix());

        self.parsed.regex_groups += 1;
        let capture = self.parsed.regex_groups;

        for name in list.split(',') {
            self.parsed.names.push(name.to_string());
            self.parsed.groups.push(LogicalGroup::Parameter {
                capture,
                name: name.to_string(),
                style,
            });
        }

        self.parsed.regex.push_str(style.regex());

        self.parsed.normalized_template.push('{');
        self.parsed.normalized_template.push(style.prefix());
        self.parsed.normalized_template.push_str(list);
        self.parsed.normalized_template.push('}');
        Ok(())
    }

    /// Adds `marker` to the negated class of every default value pattern from `from` on.
    fn exclude_from_defaults(&mut self, from: usize, marker: char) {
        let class_end = "[^/".len();
        for i in from..self.default_values.len() {
            let offset = self.default_values[i];
            let class = &self.parsed.regex[offset..];
            let Some(close) = class.find(']') else {
                continue;
            };
            if class[class_end..close].contains(marker) {
                continue;
            }
            self.parsed.regex.insert(offset + class_end, marker);
            for later in &mut self.default_values[i + 1..] {
                *later += marker.len_utf8();
            }
        }
    }

    fn syntax_error(&self, found: char) -> TemplateError {
        TemplateError::Syntax {
            template: self.input.to_string(),
            position: self.pos - found.len_utf8(),
            found,
        }
    }

    fn unterminated(&self) -> TemplateError {
        TemplateError::Unterminated {
            template: self.input.to_string(),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn consume_char(&mut self) -> Result<char> {
        let ch = self.peek_char().ok_or_else(|| self.unterminated())?;
        self.pos += ch.len_utf8();
        Ok(ch)
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_name_char(c: char) -> bool {
    is_name_start(c) || c == '-' || c == '.'
}

/// Appends the regex for already-encoded literal text. Hex digits of `%XX` triplets
/// match in either case.
fn push_literal_regex(regex: &mut String, literal: &str) {
    let mut chars = literal.chars();
    while let Some(ch) = chars.next() {
        if ch == '%' {
            let mut rest = chars.clone();
            if let (Some(h1), Some(h2)) = (rest.next(), rest.next()) {
                if h1.is_ascii_hexdigit() && h2.is_ascii_hexdigit() {
                    regex.push('%');
                    push_hex_class(regex, h1);
                    push_hex_class(regex, h2);
                    chars = rest;
                    continue;
                }
            }
        }
        let mut buf = [0u8; 4];
        regex.push_str(&regex::escape(ch.encode_utf8(&mut buf)));
    }
}

fn push_hex_class(regex: &mut String, digit: char) {
    if digit.is_ascii_digit() {
        regex.push(digit);
    } else {
        regex.push('[');
        regex.push(digit.to_ascii_lowercase());
        regex.push(digit.to_ascii_uppercase());
        regex.push(']');
    }
}
