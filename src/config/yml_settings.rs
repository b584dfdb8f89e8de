use serde::{Deserialize, Serialize};

/// One entry of the route table file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RouteSettings {
    pub name: String,
    pub template: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde() {
        let settings = RouteSettings {
            name: "user".to_string(),
            template: "/users/{id}".to_string(),
            closed: Some(true),
            description: None,
        };

        let yml = serde_yaml::to_string(&settings).unwrap();
        let deserde: RouteSettings = serde_yaml::from_str(&yml).unwrap();
        assert_eq!(settings, deserde);
    }

    #[test]
    fn test_skip_none_fields_in_yaml() {
        let settings = RouteSettings {
            name: "root".to_string(),
            template: "/".to_string(),
            closed: None,
            description: None,
        };

        let yml = serde_yaml::to_string(&settings).unwrap();

        assert!(!yml.contains("closed:"));
        assert!(!yml.contains("description:"));

        assert!(yml.contains("name:"));
        assert!(yml.contains("template:"));
    }

    #[test]
    fn test_include_some_fields_in_json() {
        let settings = RouteSettings {
            name: "search".to_string(),
            template: "/search{?q,page}".to_string(),
            closed: Some(false),
            description: Some("Full text search".to_string()),
        };

        let json = serde_json::to_string(&settings).unwrap();

        assert!(json.contains("\"closed\":false"));
        assert!(json.contains("\"description\""));
    }

    #[test]
    fn test_missing_optional_fields_deserialize() {
        let settings: RouteSettings =
            serde_yaml::from_str("name: a\ntemplate: /a/{b}\n").unwrap();
        assert_eq!(settings.closed, None);
        assert_eq!(settings.description, None);
    }
}
