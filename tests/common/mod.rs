// Common test utilities shared across test files

use std::collections::HashMap;
use uri_pattern::UriTemplate;

/// Build a value map from name/value pairs
#[allow(dead_code)]
pub fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

/// Compile a template, failing the test on error
#[allow(dead_code)]
pub fn template(text: &str) -> UriTemplate {
    UriTemplate::new(text).unwrap_or_else(|e| panic!("template '{}' failed to compile: {}", text, e))
}

/// Assert that `template` matches `uri` and yields `expected` in every access style:
/// named bindings, ordered values and the raw match result.
#[allow(dead_code)]
pub fn assert_matches(template_text: &str, uri: &str, expected: &[&str]) {
    let t = template(template_text);
    assert_eq!(t.variable_count(), expected.len(), "variables of {}", template_text);

    let bindings = t
        .match_bindings(uri)
        .unwrap_or_else(|| panic!("'{}' should match '{}'", template_text, uri));
    for (name, value) in t.template_variables().iter().zip(expected) {
        assert_eq!(bindings.get(name).map(String::as_str), Some(*value), "binding {}", name);
    }

    let list = t.match_values(uri).unwrap();
    assert_eq!(list, expected);

    let m = t.match_result(uri).unwrap();
    assert_eq!(m.group_count(), expected.len());
    assert_eq!(m.group(0), Some(uri));
    assert_eq!(m.start(), 0);
    assert_eq!(m.end(), uri.len());
    for (i, value) in expected.iter().enumerate() {
        assert_eq!(m.group(i + 1), Some(*value));
        let range = m.range(i + 1).unwrap();
        assert_eq!(&uri[range], *value);
    }
}
