//! Migration of the superseded five-attribute technology shape.
//!
//! Older saves stored `usability` and `price` instead of the seven
//! attribute layout. They are upgraded on load and never written back.

use serde::{Deserialize, Deserializer};

use crate::tech::{Category, Compatibility, Technology};

/// Technology record as persisted by older saves.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LegacyTechnology {
    pub id: String,
    pub name: String,
    pub category: Category,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    pub performance: f64,
    pub stability: f64,
    pub usability: f64,
    pub price: f64,
    #[serde(default)]
    pub complexity: f64,
    #[serde(default)]
    pub compatibility: Option<Compatibility>,
}

impl From<LegacyTechnology> for Technology {
    fn from(old: LegacyTechnology) -> Self {
        Self {
            id: old.id,
            name: old.name,
            category: old.category,
            description: old.description,
            detailed_description: None,
            pros: old.pros,
            cons: old.cons,
            performance: old.performance,
            stability: old.stability,
            user_friendliness: old.usability,
            development_speed: old.usability,
            maintainability: old.stability,
            complexity: old.complexity,
            cost: old.price,
            compatibility: old.compatibility,
            modifiers: Vec::new(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredTechnology {
    Current(Technology),
    Legacy(LegacyTechnology),
}

impl From<StoredTechnology> for Technology {
    fn from(stored: StoredTechnology) -> Self {
        match stored {
            StoredTechnology::Current(tech) => tech,
            StoredTechnology::Legacy(old) => {
                log::debug!("migrated legacy technology record '{}'", old.id);
                old.into()
            }
        }
    }
}

/// Deserialize a technology in either the current or the legacy shape.
///
/// # Errors
///
/// Returns an error if the value matches neither shape.
pub fn deserialize_technology<'de, D>(deserializer: D) -> Result<Technology, D::Error>
where
    D: Deserializer<'de>,
{
    StoredTechnology::deserialize(deserializer).map(Technology::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_fields_map_onto_current_shape() {
        let json = r#"{
            "id": "react",
            "name": "React",
            "category": "framework",
            "description": "UI library",
            "pros": [],
            "cons": [],
            "performance": 80,
            "stability": 70,
            "usability": 90,
            "price": 15,
            "complexity": 40
        }"#;
        let stored: StoredTechnology = serde_json::from_str(json).unwrap();
        let tech = Technology::from(stored);

        assert!((tech.user_friendliness - 90.0).abs() < f64::EPSILON);
        assert!((tech.development_speed - 90.0).abs() < f64::EPSILON);
        assert!((tech.maintainability - 70.0).abs() < f64::EPSILON);
        assert!((tech.cost - 15.0).abs() < f64::EPSILON);
        assert!((tech.complexity - 40.0).abs() < f64::EPSILON);
        assert!(tech.modifiers.is_empty());
    }

    #[test]
    fn current_shape_passes_through() {
        let tech = Technology::uniform("go", Category::Language, 60.0);
        let json = serde_json::to_string(&tech).unwrap();
        let stored: StoredTechnology = serde_json::from_str(&json).unwrap();
        assert!(matches!(stored, StoredTechnology::Current(_)));
        assert_eq!(Technology::from(stored), tech);
    }

    #[test]
    fn unknown_shape_is_rejected() {
        let result: Result<StoredTechnology, _> =
            serde_json::from_str(r#"{"id":"x","name":"x","category":"language"}"#);
        assert!(result.is_err());
    }
}
