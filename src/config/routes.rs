use crate::{
    component,
    config::yml_settings::RouteSettings,
    template::{PathPattern, RightHandPath},
};
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

const DEFAULT_CONFIG_FILE: &str = "routes.yml";

/// A named path pattern loaded from the route table.
#[derive(Debug, Clone)]
pub struct Route {
    name: String,
    description: Option<String>,
    pattern: PathPattern,
}

impl TryFrom<RouteSettings> for Route {
    type Error = anyhow::Error;

    fn try_from(value: RouteSettings) -> Result<Self> {
        let right_hand_path = match value.closed {
            Some(true) => RightHandPath::Closed,
            _ => RightHandPath::Open,
        };
        let pattern = PathPattern::with_right_hand_path(&value.template, right_hand_path)
            .with_context(|| format!("Invalid template for route '{}'", value.name))?;

        Ok(Self {
            name: value.name,
            description: value.description,
            pattern,
        })
    }
}

impl Route {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }
}

/// The winning route for a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMatch {
    pub route: String,
    pub template: String,
    pub bindings: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub remainder: String,
}

impl RouteMatch {
    /// Percent-decodes every bound value.
    pub fn decoded(mut self) -> Result<Self> {
        for value in self.bindings.values_mut() {
            let decoded = component::decode(value)
                .with_context(|| format!("Could not decode '{}'", value))?
                .into_owned();
            *value = decoded;
        }
        Ok(self)
    }
}

/// Routes sorted from most to least specific.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn from_settings(settings: Vec<RouteSettings>) -> Result<Self> {
        let mut seen = HashSet::new();
        for s in &settings {
            if !seen.insert(s.name.as_str()) {
                bail!("Duplicate route name: {}", s.name);
            }
        }

        let mut routes = settings
            .into_iter()
            .map(Route::try_from)
            .collect::<Result<Vec<_>>>()?;
        routes.sort_by(|a, b| PathPattern::compare(&a.pattern, &b.pattern));

        tracing::debug!(routes = routes.len(), "route table compiled");
        Ok(Self { routes })
    }

    pub fn from_yaml(yml: &str) -> Result<Self> {
        let settings: Vec<RouteSettings> =
            serde_yaml::from_str(yml).context("Invalid yaml configuration")?;
        Self::from_settings(settings)
    }

    /// Loads the route table from `maybe_yml`, or from `routes.yml` when no path is given.
    pub fn load(maybe_yml: Option<&str>) -> Result<Self> {
        let path = maybe_yml.unwrap_or(DEFAULT_CONFIG_FILE);
        let yml = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read route table '{}'", path))?;
        Self::from_yaml(&yml).with_context(|| format!("Could not load route table '{}'", path))
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Returns the most specific route matching `path`.
    pub fn find(&self, path: &str) -> Option<RouteMatch> {
        self.routes.iter().find_map(|route| {
            let m = route.pattern.match_result(path)?;
            let bindings = route.pattern.match_bindings(path)?;
            tracing::trace!(route = %route.name, path, "route matched");
            Some(RouteMatch {
                route: route.name.clone(),
                template: route.pattern.template().template().to_string(),
                bindings: bindings.into_iter().collect(),
                remainder: route.pattern.remainder(&m).to_string(),
            })
        })
    }
}
