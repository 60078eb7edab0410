//! Technology records, hidden compatibility lists and modifier deltas.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog category of a technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Language,
    Framework,
    Pattern,
    Library,
    Database,
    Service,
}

impl Category {
    pub const ALL: [Self; 6] = [
        Self::Language,
        Self::Framework,
        Self::Pattern,
        Self::Library,
        Self::Database,
        Self::Service,
    ];

    /// Stable identifier used in JSON.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Language => "language",
            Self::Framework => "framework",
            Self::Pattern => "pattern",
            Self::Library => "library",
            Self::Database => "database",
            Self::Service => "service",
        }
    }

    /// Human readable singular noun.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Language => "Language",
            Self::Framework => "Framework",
            Self::Pattern => "Pattern",
            Self::Library => "Library",
            Self::Database => "Database",
            Self::Service => "Service",
        }
    }

    /// Whether a view may hold more than one technology of this category.
    #[must_use]
    pub const fn allows_multiple(self) -> bool {
        matches!(self, Self::Service)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Directed compatibility lists pointing at other catalog ids.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Compatibility {
    #[serde(default)]
    pub preferred: Vec<String>,
    #[serde(default)]
    pub compatible: Vec<String>,
    #[serde(default)]
    pub incompatible: Vec<String>,
}

impl Compatibility {
    #[must_use]
    pub fn prefers(&self, id: &str) -> bool {
        self.preferred.iter().any(|p| p == id)
    }

    #[must_use]
    pub fn accepts(&self, id: &str) -> bool {
        self.compatible.iter().any(|c| c == id)
    }

    #[must_use]
    pub fn rejects(&self, id: &str) -> bool {
        self.incompatible.iter().any(|i| i == id)
    }

    /// Iterate every referenced id together with the bucket it lives in.
    pub fn edges(&self) -> impl Iterator<Item = (Relation, &str)> {
        let preferred = self
            .preferred
            .iter()
            .map(|id| (Relation::Preferred, id.as_str()));
        let compatible = self
            .compatible
            .iter()
            .map(|id| (Relation::Compatible, id.as_str()));
        let incompatible = self
            .incompatible
            .iter()
            .map(|id| (Relation::Incompatible, id.as_str()));
        preferred.chain(compatible).chain(incompatible)
    }
}

/// Bucket of a compatibility edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Preferred,
    Compatible,
    Incompatible,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preferred => f.write_str("preferred"),
            Self::Compatible => f.write_str("compatible"),
            Self::Incompatible => f.write_str("incompatible"),
        }
    }
}

/// User-experience deltas. Absent fields read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UxDelta {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub performance: i32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub stability: i32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub user_friendliness: i32,
}

impl UxDelta {
    #[must_use]
    pub const fn new(performance: i32, stability: i32, user_friendliness: i32) -> Self {
        Self {
            performance,
            stability,
            user_friendliness,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.performance == 0 && self.stability == 0 && self.user_friendliness == 0
    }

    /// Sum of the three fields; every field counts as a gain.
    #[must_use]
    pub const fn net(&self) -> i32 {
        self.performance
            .saturating_add(self.stability)
            .saturating_add(self.user_friendliness)
    }
}

/// Developer-experience deltas. Absent fields read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevDelta {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub development_speed: i32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub maintainability: i32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub complexity: i32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub cost: i32,
}

impl DevDelta {
    #[must_use]
    pub const fn new(
        development_speed: i32,
        maintainability: i32,
        complexity: i32,
        cost: i32,
    ) -> Self {
        Self {
            development_speed,
            maintainability,
            complexity,
            cost,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.development_speed == 0
            && self.maintainability == 0
            && self.complexity == 0
            && self.cost == 0
    }

    /// Speed and maintainability count as gains, complexity and cost as losses.
    #[must_use]
    pub const fn net(&self) -> i32 {
        self.development_speed
            .saturating_add(self.maintainability)
            .saturating_sub(self.complexity)
            .saturating_sub(self.cost)
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &i32) -> bool {
    *value == 0
}

/// Hidden pairwise effect applied when `target_tech_id` is in the same schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnologyModifier {
    pub target_tech_id: String,
    #[serde(default, skip_serializing_if = "UxDelta::is_empty")]
    pub ux: UxDelta,
    #[serde(default, skip_serializing_if = "DevDelta::is_empty")]
    pub dev: DevDelta,
}

impl TechnologyModifier {
    #[must_use]
    pub fn new(target: impl Into<String>, ux: UxDelta, dev: DevDelta) -> Self {
        Self {
            target_tech_id: target.into(),
            ux,
            dev,
        }
    }

    /// True when at least one delta is non-zero.
    #[must_use]
    pub const fn has_effect(&self) -> bool {
        !self.ux.is_empty() || !self.dev.is_empty()
    }
}

/// A catalog entry. Attribute values live in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Technology {
    pub id: String,
    pub name: String,
    pub category: Category,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_description: Option<String>,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,

    pub performance: f64,
    pub stability: f64,
    pub user_friendliness: f64,

    pub development_speed: f64,
    pub maintainability: f64,
    /// Learning difficulty; higher is harder.
    pub complexity: f64,
    /// Development cost; higher is more expensive.
    pub cost: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatibility: Option<Compatibility>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<TechnologyModifier>,
}

impl Technology {
    /// Build a technology with every attribute set to `value` and no relations.
    #[must_use]
    pub fn uniform(id: impl Into<String>, category: Category, value: f64) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            category,
            description: String::new(),
            detailed_description: None,
            pros: Vec::new(),
            cons: Vec::new(),
            performance: value,
            stability: value,
            user_friendliness: value,
            development_speed: value,
            maintainability: value,
            complexity: value,
            cost: value,
            compatibility: None,
            modifiers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_compatibility(mut self, compatibility: Compatibility) -> Self {
        self.compatibility = Some(compatibility);
        self
    }

    #[must_use]
    pub fn with_modifier(mut self, modifier: TechnologyModifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    #[must_use]
    pub fn prefers(&self, id: &str) -> bool {
        self.compatibility.as_ref().is_some_and(|c| c.prefers(id))
    }

    #[must_use]
    pub fn accepts(&self, id: &str) -> bool {
        self.compatibility.as_ref().is_some_and(|c| c.accepts(id))
    }

    #[must_use]
    pub fn rejects(&self, id: &str) -> bool {
        self.compatibility.as_ref().is_some_and(|c| c.rejects(id))
    }

    /// Modifiers of this technology that point at `target`.
    pub fn modifiers_targeting<'a>(
        &'a self,
        target: &'a str,
    ) -> impl Iterator<Item = &'a TechnologyModifier> + 'a {
        self.modifiers
            .iter()
            .filter(move |m| m.target_tech_id == target)
    }

    /// The seven visible attributes, in declaration order, with their JSON names.
    #[must_use]
    pub fn attributes(&self) -> [(&'static str, f64); 7] {
        [
            ("performance", self.performance),
            ("stability", self.stability),
            ("userFriendliness", self.user_friendliness),
            ("developmentSpeed", self.development_speed),
            ("maintainability", self.maintainability),
            ("complexity", self.complexity),
            ("cost", self.cost),
        ]
    }
}
