//! Canvas schema: panels placed on the Frontend and Backend views.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::catalog::Catalog;
use crate::legacy::deserialize_technology;
use crate::tech::{Category, Technology};

/// One of the two canvas views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Frontend,
    Backend,
}

impl View {
    pub const ALL: [Self; 2] = [Self::Frontend, Self::Backend];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Frontend => "frontend",
            Self::Backend => "backend",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Frontend => "Frontend",
            Self::Backend => "Backend",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A placed technology with its canvas position and outgoing links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub id: String,
    #[serde(deserialize_with = "deserialize_technology")]
    pub technology: Technology,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub connections: Vec<String>,
}

impl Panel {
    #[must_use]
    pub fn new(id: impl Into<String>, technology: Technology) -> Self {
        Self {
            id: id.into(),
            technology,
            x: 0.0,
            y: 0.0,
            connections: Vec::new(),
        }
    }
}

/// Errors raised while importing a schema dump.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImportError {
    #[error("schema is not valid JSON: {0}")]
    Malformed(String),
    #[error("schema must be a JSON object")]
    NotAnObject,
    #[error("schema is missing the '{0}' panel list")]
    MissingView(&'static str),
    #[error("schema field '{0}' must be an array of panels")]
    ViewNotArray(&'static str),
    #[error("schema panels are invalid: {0}")]
    InvalidPanels(String),
}

/// The full canvas. Frontend panels precede backend panels when flattened.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AppSchema {
    #[serde(default)]
    pub frontend: Vec<Panel>,
    #[serde(default)]
    pub backend: Vec<Panel>,
}

impl AppSchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a schema whose panels carry generated ids and no links.
    #[must_use]
    pub fn from_technologies(
        frontend: impl IntoIterator<Item = Technology>,
        backend: impl IntoIterator<Item = Technology>,
    ) -> Self {
        let mut schema = Self::new();
        for (view, techs) in [
            (View::Frontend, frontend.into_iter().collect::<Vec<_>>()),
            (View::Backend, backend.into_iter().collect()),
        ] {
            for tech in techs {
                let id = schema.next_panel_id(view);
                schema.panels_mut(view).push(Panel::new(id, tech));
            }
        }
        schema
    }

    #[must_use]
    pub fn panels(&self, view: View) -> &[Panel] {
        match view {
            View::Frontend => &self.frontend,
            View::Backend => &self.backend,
        }
    }

    pub fn panels_mut(&mut self, view: View) -> &mut Vec<Panel> {
        match view {
            View::Frontend => &mut self.frontend,
            View::Backend => &mut self.backend,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frontend.is_empty() && self.backend.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frontend.len() + self.backend.len()
    }

    /// Flattened technology list: frontend first, then backend.
    #[must_use]
    pub fn technologies(&self) -> Vec<&Technology> {
        self.frontend
            .iter()
            .chain(&self.backend)
            .map(|panel| &panel.technology)
            .collect()
    }

    /// Ids of every placed technology, duplicates included.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.frontend
            .iter()
            .chain(&self.backend)
            .map(|panel| panel.technology.id.as_str())
    }

    #[must_use]
    pub fn contains_tech(&self, id: &str) -> bool {
        self.ids().any(|placed| placed == id)
    }

    /// Panel in `view` already holding a technology of `category`.
    #[must_use]
    pub fn panel_with_category(&self, view: View, category: Category) -> Option<&Panel> {
        self.panels(view)
            .iter()
            .find(|panel| panel.technology.category == category)
    }

    /// Locate a panel by id across both views.
    #[must_use]
    pub fn find_panel(&self, panel_id: &str) -> Option<(View, &Panel)> {
        View::ALL.into_iter().find_map(|view| {
            self.panels(view)
                .iter()
                .find(|panel| panel.id == panel_id)
                .map(|panel| (view, panel))
        })
    }

    /// Smallest unused `"{view}-{n}"` id, starting at 1.
    #[must_use]
    pub fn next_panel_id(&self, view: View) -> String {
        let taken = |candidate: &str| {
            self.frontend
                .iter()
                .chain(&self.backend)
                .any(|panel| panel.id == candidate)
        };
        let mut n = 1_usize;
        loop {
            let candidate = format!("{}-{n}", view.key());
            if !taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Replace embedded technology copies with the catalog's current entries.
    ///
    /// Panels whose id is not in the catalog keep their stored copy.
    /// Returns how many panels were refreshed.
    pub fn refresh_from(&mut self, catalog: &Catalog) -> usize {
        let mut refreshed = 0;
        for panel in self.frontend.iter_mut().chain(self.backend.iter_mut()) {
            if let Some(current) = catalog.get_by_id(&panel.technology.id) {
                panel.technology = current.clone();
                refreshed += 1;
            }
        }
        refreshed
    }

    /// Parse a `{frontend: [...], backend: [...]}` dump.
    ///
    /// Both keys must be present and hold arrays. Panels in the legacy
    /// technology shape are migrated.
    ///
    /// # Errors
    ///
    /// Returns an [`ImportError`] if the dump is malformed or either view is missing.
    pub fn from_json(json: &str) -> Result<Self, ImportError> {
        let value: Value =
            serde_json::from_str(json).map_err(|err| ImportError::Malformed(err.to_string()))?;
        let Value::Object(map) = &value else {
            log::warn!("rejected schema import: top level is not an object");
            return Err(ImportError::NotAnObject);
        };
        for view in View::ALL {
            match map.get(view.key()) {
                Some(Value::Array(_)) => {}
                Some(_) => {
                    log::warn!("rejected schema import: '{}' is not an array", view.key());
                    return Err(ImportError::ViewNotArray(view.key()));
                }
                None => {
                    log::warn!("rejected schema import: '{}' is missing", view.key());
                    return Err(ImportError::MissingView(view.key()));
                }
            }
        }
        serde_json::from_value(value).map_err(|err| {
            log::warn!("rejected schema import: {err}");
            ImportError::InvalidPanels(err.to_string())
        })
    }

    /// Serialize to the camelCase dump format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tech(id: &str, category: Category) -> Technology {
        Technology::uniform(id, category, 50.0)
    }

    #[test]
    fn technologies_flatten_frontend_first() {
        let schema = AppSchema::from_technologies(
            [tech("react", Category::Framework)],
            [tech("go", Category::Language), tech("redis", Category::Database)],
        );
        let ids: Vec<_> = schema.ids().collect();
        assert_eq!(ids, vec!["react", "go", "redis"]);
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.frontend[0].id, "frontend-1");
        assert_eq!(schema.backend[1].id, "backend-2");
    }

    #[test]
    fn next_panel_id_reuses_gaps() {
        let mut schema = AppSchema::new();
        schema
            .backend
            .push(Panel::new("backend-2", tech("go", Category::Language)));
        assert_eq!(schema.next_panel_id(View::Backend), "backend-1");
        schema
            .backend
            .push(Panel::new("backend-1", tech("redis", Category::Database)));
        assert_eq!(schema.next_panel_id(View::Backend), "backend-3");
    }

    #[test]
    fn import_requires_both_views() {
        let err = AppSchema::from_json(r#"{"frontend": []}"#).unwrap_err();
        assert_eq!(err, ImportError::MissingView("backend"));

        let err = AppSchema::from_json(r#"{"frontend": [], "backend": {}}"#).unwrap_err();
        assert_eq!(err, ImportError::ViewNotArray("backend"));

        let err = AppSchema::from_json("[]").unwrap_err();
        assert_eq!(err, ImportError::NotAnObject);

        assert!(matches!(
            AppSchema::from_json("{not json").unwrap_err(),
            ImportError::Malformed(_)
        ));
    }

    #[test]
    fn export_then_import_preserves_panels() {
        let schema = AppSchema::from_technologies(
            [tech("vue", Category::Framework)],
            [tech("python", Category::Language)],
        );
        let json = schema.to_json().unwrap();
        assert!(json.contains("userFriendliness"));
        let loaded = AppSchema::from_json(&json).unwrap();
        assert_eq!(loaded, schema);
    }

    #[test]
    fn import_migrates_legacy_panels() {
        let json = r#"{
            "frontend": [{
                "id": "1",
                "technology": {
                    "id": "react", "name": "React", "category": "framework",
                    "description": "", "pros": [], "cons": [],
                    "performance": 80, "stability": 75, "usability": 85,
                    "price": 10, "complexity": 45
                },
                "x": 10, "y": 20, "connections": []
            }],
            "backend": []
        }"#;
        let schema = AppSchema::from_json(json).unwrap();
        let migrated = &schema.frontend[0].technology;
        assert!((migrated.development_speed - 85.0).abs() < f64::EPSILON);
        assert!((migrated.maintainability - 75.0).abs() < f64::EPSILON);
        assert!((schema.frontend[0].x - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn refresh_replaces_known_technologies() {
        let mut stale = tech("go", Category::Language);
        stale.performance = 1.0;
        let mut schema =
            AppSchema::from_technologies([tech("custom", Category::Library)], [stale]);
        let catalog = Catalog::new(vec![Technology::uniform("go", Category::Language, 70.0)]);
        assert_eq!(schema.refresh_from(&catalog), 1);
        assert!((schema.backend[0].technology.performance - 70.0).abs() < f64::EPSILON);
        assert_eq!(schema.frontend[0].technology.id, "custom");
    }

    #[test]
    fn finds_panels_and_categories() {
        let schema = AppSchema::from_technologies(
            [tech("react", Category::Framework)],
            [tech("docker", Category::Service)],
        );
        let (view, panel) = schema.find_panel("backend-1").unwrap();
        assert_eq!(view, View::Backend);
        assert_eq!(panel.technology.id, "docker");
        assert!(
            schema
                .panel_with_category(View::Frontend, Category::Framework)
                .is_some()
        );
        assert!(
            schema
                .panel_with_category(View::Backend, Category::Framework)
                .is_none()
        );
        assert!(schema.contains_tech("docker"));
    }
}
