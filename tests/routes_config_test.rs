// Integration tests for the YAML route table

use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use uri_pattern::config::{RouteMatch, RouteTable};

fn bundled() -> RouteTable {
    RouteTable::load(Some(concat!(env!("CARGO_MANIFEST_DIR"), "/routes.yml"))).unwrap()
}

fn bindings(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_bundled_routes_load() {
    let table = bundled();
    let names: Vec<_> = table.routes().iter().map(|r| r.name()).collect();
    assert!(names.contains(&"user"));
    assert_eq!(names.first(), Some(&"orders"));
    assert_eq!(names.last(), Some(&"root"));
}

#[test]
fn test_bundled_routes_match() {
    let table = bundled();

    assert_eq!(
        table.find("/users/42"),
        Some(RouteMatch {
            route: "user".to_string(),
            template: "/users/{id:\\d+}".to_string(),
            bindings: bindings(&[("id", "42")]),
            remainder: String::new(),
        })
    );

    let found = table.find("/users/42/posts?page=2").unwrap();
    assert_eq!(found.route, "user-posts");
    assert_eq!(found.bindings, bindings(&[("id", "42"), ("page", "2")]));

    let found = table.find("/users/42/posts/hello-world").unwrap();
    assert_eq!(found.route, "post");
    assert_eq!(found.bindings["slug"], "hello-world");

    let found = table.find("/search?q=rust").unwrap();
    assert_eq!(found.route, "search");
    assert_eq!(found.bindings, bindings(&[("q", "rust")]));

    let found = table.find("/static/css/site.css").unwrap();
    assert_eq!(found.route, "static");
    assert_eq!(found.remainder, "/css/site.css");

    let found = table.find("/about/team").unwrap();
    assert_eq!(found.route, "fallback");
    assert_eq!(found.bindings["section"], "about");
    assert_eq!(found.remainder, "/team");

    assert_eq!(table.find("/").map(|m| m.route), Some("root".to_string()));
}

#[test]
fn test_user_route_rejects_non_numeric_id() {
    let table = bundled();
    let found = table.find("/users/bob").unwrap();
    assert_eq!(found.route, "fallback");
    assert_eq!(found.remainder, "/bob");
}

#[test]
fn test_match_serializes_to_json() {
    let table = RouteTable::from_yaml(
        "- name: item\n  template: /items/{id}\n  closed: true\n",
    )
    .unwrap();
    let found = table.find("/items/7").unwrap();
    let json = serde_json::to_value(&found).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "route": "item",
            "template": "/items/{id}",
            "bindings": { "id": "7" }
        })
    );
}

#[test]
fn test_invalid_yaml_rejected() {
    let err = RouteTable::from_yaml("- name: a\n").unwrap_err();
    assert!(err.to_string().contains("Invalid yaml configuration"));
}

#[test]
fn test_missing_file_names_path() {
    let err = RouteTable::load(Some("does-not-exist.yml")).unwrap_err();
    assert!(err.to_string().contains("does-not-exist.yml"));
}
