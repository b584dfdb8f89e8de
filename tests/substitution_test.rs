// Integration tests for URI generation from templates

mod common;

use common::{template, values};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::HashMap;
use uri_pattern::{
    create_uri_from_components, resolve_template_values, ComponentType, TemplateError,
    UriComponents,
};

#[test]
fn test_substitution_array() {
    let cases: &[(&str, &str, &[&str])] = &[
        (
            "http://example.org/{a}/{b}/",
            "http://example.org/fred/barney/",
            &["fred", "barney"],
        ),
        (
            "http://example.org/page1#{a}",
            "http://example.org/page1#fred",
            &["fred"],
        ),
        (
            "{scheme}://{20}.example.org?date={wilma}&option={a}",
            "https://this-is-spinal-tap.example.org?date=&option=fred",
            &["https", "this-is-spinal-tap", "", "fred"],
        ),
        (
            "http://example.org/{a-b}",
            "http://example.org/none%20of%20the%20above",
            &["none%20of%20the%20above"],
        ),
        (
            "http://example.com/order/{c}/{c}/{c}/",
            "http://example.com/order/cheeseburger/cheeseburger/cheeseburger/",
            &["cheeseburger"],
        ),
        ("http://example.com/{e}/", "http://example.com//", &[""]),
        (
            "http://example.com/{a}/{b}/{a}",
            "http://example.com/fred/barney/fred",
            &["fred", "barney", "joe"],
        ),
    ];

    for (text, uri, args) in cases {
        assert_eq!(template(text).create_uri_from_values(args).unwrap(), *uri);
    }
}

#[test]
fn test_substitution_array_missing_value() {
    let err = template("/{a}/{b}").create_uri_from_values(&["x"]).unwrap_err();
    assert_eq!(err.to_string(), "The template variable 'b' has no value");
}

#[test]
fn test_substitution_map() {
    let t = template("{scheme}://{20}.example.org?date={wilma}&option={a}");
    let uri = t.create_uri(&values(&[
        ("scheme", "https"),
        ("20", "this-is-spinal-tap"),
        ("wilma", ""),
        ("a", "fred"),
    ]));
    assert_eq!(uri, "https://this-is-spinal-tap.example.org?date=&option=fred");

    let t = template("http://example.com/order/{c}/{c}/{c}/");
    assert_eq!(
        t.create_uri(&values(&[("c", "cheeseburger")])),
        "http://example.com/order/cheeseburger/cheeseburger/cheeseburger/"
    );

    let t = template("http://example.com/{e}/{f}");
    assert_eq!(t.create_uri(&values(&[("e", "")])), "http://example.com//");
}

#[test]
fn test_setting_query_parameters() {
    let t = template("/test{?query}");
    assert_eq!(t.create_uri(&values(&[("query", "example")])), "/test?query=example");
    assert_eq!(t.create_uri(&HashMap::new()), "/test");

    let t = template("/test{?query,other}");
    assert_eq!(
        t.create_uri(&values(&[("query", "example"), ("other", "otherExample")])),
        "/test?query=example&other=otherExample"
    );
    assert_eq!(
        t.create_uri(&values(&[("other", "otherExample")])),
        "/test?other=otherExample"
    );
    assert_eq!(t.create_uri(&values(&[("query", "")])), "/test?query=");
}

#[test]
fn test_bare_query_composite() {
    let t = template("{?x,y}");
    assert_eq!(t.create_uri(&values(&[("x", "1")])), "?x=1");
    assert_eq!(t.create_uri(&HashMap::new()), "");
}

#[test]
fn test_unicode_variable_names() {
    let t = template("/{x²}/{név}");
    assert_eq!(t.template_variables(), ["x²", "név"]);
    assert_eq!(
        t.create_uri(&values(&[("x²", "v"), ("név", "w")])),
        "/v/w"
    );
    assert_eq!(t.create_uri_from_values(&["1", "2"]).unwrap(), "/1/2");
}

#[test]
fn test_setting_matrix_parameters() {
    let t = template("/test{;matrix}/other");
    assert_eq!(
        t.create_uri(&values(&[("matrix", "example")])),
        "/test;matrix=example/other"
    );
    assert_eq!(t.create_uri(&HashMap::new()), "/test/other");

    let t = template("/test{;matrix,other}/other");
    assert_eq!(
        t.create_uri(&values(&[("matrix", "example"), ("other", "otherExample")])),
        "/test;matrix=example;other=otherExample/other"
    );

    let t = template("/test{;matrix}/other{;other}");
    assert_eq!(
        t.create_uri(&values(&[("matrix", "example"), ("other", "otherExample")])),
        "/test;matrix=example/other;other=otherExample"
    );

    let t = template("/test{;flag}");
    assert_eq!(t.create_uri(&values(&[("flag", "")])), "/test;flag");
}

#[test]
fn test_composite_positional() {
    let t = template("/p/{a}{?x,y}");
    assert_eq!(t.create_uri_from_values(&["1", "2"]).unwrap(), "/p/1?x=2");
    assert_eq!(t.create_uri_from_values(&["1"]).unwrap(), "/p/1");
    assert_eq!(t.create_uri_from_values(&["1", "2", "3"]).unwrap(), "/p/1?x=2&y=3");
}

#[test]
fn test_literal_text_is_encoded() {
    let t = template("/a b/{c}");
    assert_eq!(t.normalized_template(), "/a%20b/{c}");
    assert_eq!(t.create_uri(&values(&[("c", "d")])), "/a%20b/d");
}

#[test]
fn test_components_full_uri() {
    let components = UriComponents {
        scheme: Some("https".to_string()),
        user_info: Some("{user}".to_string()),
        host: Some("{host}".to_string()),
        port: Some("{port}".to_string()),
        path: Some("/files/{name}".to_string()),
        query: Some("v={version}".to_string()),
        fragment: Some("{section}".to_string()),
        ..Default::default()
    };
    let named = values(&[("host", "example.com"), ("port", "8443")]);
    let uri = create_uri_from_components(
        &components,
        &["bob", "my file.txt", "1 & 2", "intro"],
        &named,
        true,
        false,
    )
    .unwrap();
    assert_eq!(
        uri,
        "https://bob@example.com:8443/files/my%20file.txt?v=1%20%26%202#intro"
    );
}

#[test]
fn test_components_repeated_variable() {
    let components = UriComponents {
        path: Some("/{id}/children/{id}".to_string()),
        query: Some("parent={id}".to_string()),
        ..Default::default()
    };
    let uri =
        create_uri_from_components(&components, &["7"], &HashMap::new(), true, false).unwrap();
    assert_eq!(uri, "/7/children/7?parent=7");
}

#[test]
fn test_components_missing_value() {
    let components = UriComponents {
        host: Some("{host}".to_string()),
        ..Default::default()
    };
    let err = create_uri_from_components::<&str>(&components, &[], &HashMap::new(), true, false)
        .unwrap_err();
    assert!(matches!(err, TemplateError::MissingValue { name } if name == "host"));
}

#[test]
fn test_resolve_template_values_keeps_unknown() {
    let mut map = HashMap::new();
    map.insert("q".to_string(), Some("a b".to_string()));
    let out = resolve_template_values(ComponentType::QueryParam, "q={q}&p={p}", true, &map).unwrap();
    assert_eq!(out, "q=a%20b&p={p}");

    let out =
        resolve_template_values(ComponentType::QueryParam, "q={q}", false, &map).unwrap();
    assert_eq!(out, "q=a%20b");
}

fn segment() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,8}"
}

proptest! {
    #[test]
    fn test_round_trip(prefix in segment(), a in segment(), b in segment(), c in segment()) {
        let t = template(&format!("/{}/{{a}}/{{b}}/x/{{c}}", prefix));
        let bound = values(&[("a", a.as_str()), ("b", b.as_str()), ("c", c.as_str())]);
        let uri = t.create_uri(&bound);
        prop_assert_eq!(t.match_bindings(&uri), Some(bound));
    }

    #[test]
    fn test_positional_round_trip(a in segment(), b in segment()) {
        let t = template("/{a}/{b}/{a}");
        let uri = t.create_uri_from_values(&[a.clone(), b.clone()]).unwrap();
        prop_assert_eq!(t.match_values(&uri), Some(vec![a.clone(), b, a]));
    }
}
