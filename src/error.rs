// Error handling for uri-pattern

use std::string::FromUtf8Error;
use thiserror::Error;

/// Errors raised while compiling a template or generating a URI from one.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The template string was empty. Use `UriTemplate::empty()` instead.
    #[error("Template is null or has zero length")]
    EmptyTemplate,

    /// A placeholder contains a character that is not allowed at that position.
    #[error("Illegal character '{found}' at position {position} in template '{template}'")]
    Syntax {
        template: String,
        position: usize,
        found: char,
    },

    /// A `{` was opened but never closed.
    #[error("Template '{template}' ends inside a template variable")]
    Unterminated { template: String },

    /// An explicit sub-pattern failed to compile.
    #[error("Invalid syntax '{pattern}' for template variable '{name}' in template '{template}'")]
    InvalidPattern {
        name: String,
        pattern: String,
        template: String,
        #[source]
        source: regex::Error,
    },

    /// A complete pattern failed to compile.
    #[error("Invalid regular expression '{pattern}'")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The same variable name was declared twice with different sub-patterns.
    #[error("Template variable '{name}' is declared more than once with different patterns in '{template}'")]
    ConflictingPattern { name: String, template: String },

    /// No value could be found for a template variable during URI generation.
    #[error("The template variable '{name}' has no value")]
    MissingValue { name: String },

    /// A value map carried an explicit null for a template variable.
    #[error("The value associated with template variable '{name}' is null")]
    NullValue { name: String },

    /// A logical group points past the groups of the compiled expression.
    #[error("Group index {index} is out of range for a pattern with {groups} capturing groups")]
    GroupIndex { index: usize, groups: usize },

    /// Percent-decoding produced bytes that are not valid UTF-8.
    #[error("Decoded value is not valid UTF-8: {0}")]
    Decode(#[from] FromUtf8Error),
}

pub type Result<T, E = TemplateError> = std::result::Result<T, E>;
