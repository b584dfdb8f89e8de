// URI template module

pub mod expand;
pub mod parser;
pub mod path_pattern;
pub mod pattern;
pub mod uri_template;

pub use expand::{create_uri_from_components, resolve_template_values, UriComponents, ValueSource};
pub use parser::{ParsedTemplate, TemplateParser, TEMPLATE_VALUE_PATTERN};
pub use path_pattern::{PathPattern, RightHandPath};
pub use pattern::{CompositeStyle, GroupIndex, GroupedPattern, LogicalGroup, TemplateMatch};
pub use uri_template::UriTemplate;
