//! Layered scoring of a schema into UX and developer-experience metrics.
//!
//! The final value of every field is the sum of five layers, clamped to
//! `[0, 100]`:
//!
//! 1. base averages over the placed technologies
//! 2. directed compatibility deltas between distinct ids
//! 3. hidden pairwise modifiers
//! 4. combination rules
//! 5. size and missing-framework penalties

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::ops::{Add, AddAssign};

use crate::constants::{
    BACKEND_FRAMEWORKS, BASE_COMPLEXITY, COMPATIBLE_DELTA, COMPLEXITY_PER_TECH,
    EXCESS_TECH_DELTA, FRONTEND_FRAMEWORKS, INCOMPATIBLE_DELTA, MAX_TECHS_BEFORE_PENALTY,
    METRIC_MAX, MISSING_FRAMEWORK_DELTA, PREFERRED_DELTA,
};
use crate::numbers::{clamp_metric, count_to_f64, count_to_i32, i32_to_f64, mean};
use crate::rules::{IdSet, fired_rules};
use crate::schema::AppSchema;
use crate::tech::{Technology, TechnologyModifier};

/// User-facing quality of the assembled application.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UxMetrics {
    pub performance: f64,
    pub stability: f64,
    pub user_friendliness: f64,
}

/// Developer-facing cost of building and keeping the application.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevMetrics {
    pub development_speed: f64,
    pub maintainability: f64,
    /// Lower is better.
    pub complexity: f64,
    /// Lower is better.
    pub cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AppMetrics {
    pub ux: UxMetrics,
    pub dev: DevMetrics,
}

impl AppMetrics {
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// Add an integer delta to every field.
    pub fn apply(&mut self, delta: &MetricDelta) {
        self.ux.performance += i32_to_f64(delta.performance);
        self.ux.stability += i32_to_f64(delta.stability);
        self.ux.user_friendliness += i32_to_f64(delta.user_friendliness);
        self.dev.development_speed += i32_to_f64(delta.development_speed);
        self.dev.maintainability += i32_to_f64(delta.maintainability);
        self.dev.complexity += i32_to_f64(delta.complexity);
        self.dev.cost += i32_to_f64(delta.cost);
    }

    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            ux: UxMetrics {
                performance: clamp_metric(self.ux.performance),
                stability: clamp_metric(self.ux.stability),
                user_friendliness: clamp_metric(self.ux.user_friendliness),
            },
            dev: DevMetrics {
                development_speed: clamp_metric(self.dev.development_speed),
                maintainability: clamp_metric(self.dev.maintainability),
                complexity: clamp_metric(self.dev.complexity),
                cost: clamp_metric(self.dev.cost),
            },
        }
    }

    /// All seven fields with their JSON names, UX first.
    #[must_use]
    pub fn fields(&self) -> [(&'static str, f64); 7] {
        [
            ("performance", self.ux.performance),
            ("stability", self.ux.stability),
            ("userFriendliness", self.ux.user_friendliness),
            ("developmentSpeed", self.dev.development_speed),
            ("maintainability", self.dev.maintainability),
            ("complexity", self.dev.complexity),
            ("cost", self.dev.cost),
        ]
    }
}

/// Integer contribution of a single scoring layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDelta {
    pub performance: i32,
    pub stability: i32,
    pub user_friendliness: i32,
    pub development_speed: i32,
    pub maintainability: i32,
    pub complexity: i32,
    pub cost: i32,
}

impl MetricDelta {
    pub const ZERO: Self = Self {
        performance: 0,
        stability: 0,
        user_friendliness: 0,
        development_speed: 0,
        maintainability: 0,
        complexity: 0,
        cost: 0,
    };

    #[must_use]
    pub fn from_modifier(modifier: &TechnologyModifier) -> Self {
        Self {
            performance: modifier.ux.performance,
            stability: modifier.ux.stability,
            user_friendliness: modifier.ux.user_friendliness,
            development_speed: modifier.dev.development_speed,
            maintainability: modifier.dev.maintainability,
            complexity: modifier.dev.complexity,
            cost: modifier.dev.cost,
        }
    }

    /// Multiply every field, saturating on overflow.
    #[must_use]
    pub const fn scaled(self, factor: i32) -> Self {
        Self {
            performance: self.performance.saturating_mul(factor),
            stability: self.stability.saturating_mul(factor),
            user_friendliness: self.user_friendliness.saturating_mul(factor),
            development_speed: self.development_speed.saturating_mul(factor),
            maintainability: self.maintainability.saturating_mul(factor),
            complexity: self.complexity.saturating_mul(factor),
            cost: self.cost.saturating_mul(factor),
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl Add for MetricDelta {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl AddAssign for MetricDelta {
    fn add_assign(&mut self, rhs: Self) {
        self.performance = self.performance.saturating_add(rhs.performance);
        self.stability = self.stability.saturating_add(rhs.stability);
        self.user_friendliness = self.user_friendliness.saturating_add(rhs.user_friendliness);
        self.development_speed = self.development_speed.saturating_add(rhs.development_speed);
        self.maintainability = self.maintainability.saturating_add(rhs.maintainability);
        self.complexity = self.complexity.saturating_add(rhs.complexity);
        self.cost = self.cost.saturating_add(rhs.cost);
    }
}

/// Per-layer contributions behind a metrics result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsBreakdown {
    pub technology_count: usize,
    pub base: AppMetrics,
    pub compatibility: MetricDelta,
    pub hidden_modifiers: MetricDelta,
    pub rules: MetricDelta,
    pub penalties: MetricDelta,
    pub fired_rules: SmallVec<[&'static str; 8]>,
    pub missing_framework: bool,
}

impl MetricsBreakdown {
    /// Sum of every layer before clamping.
    #[must_use]
    pub fn unclamped(&self) -> AppMetrics {
        let mut total = self.base;
        total.apply(&(self.compatibility + self.hidden_modifiers + self.rules + self.penalties));
        total
    }

    /// Final clamped metrics.
    #[must_use]
    pub fn total(&self) -> AppMetrics {
        self.unclamped().clamped()
    }
}

/// Score a schema. Returns all zeros when both views are empty.
#[must_use]
pub fn compute_metrics(schema: &AppSchema) -> AppMetrics {
    explain_metrics(schema).map_or_else(AppMetrics::zero, |breakdown| breakdown.total())
}

/// Score a schema and keep the individual layers. `None` for an empty schema.
#[must_use]
pub fn explain_metrics(schema: &AppSchema) -> Option<MetricsBreakdown> {
    explain_technologies(&schema.technologies())
}

/// Score an arbitrary multiset of technologies.
#[must_use]
pub fn metrics_for_technologies(techs: &[&Technology]) -> AppMetrics {
    explain_technologies(techs).map_or_else(AppMetrics::zero, |breakdown| breakdown.total())
}

#[must_use]
pub fn explain_technologies(techs: &[&Technology]) -> Option<MetricsBreakdown> {
    if techs.is_empty() {
        return None;
    }
    let ids = IdSet::new(techs.iter().map(|tech| tech.id.as_str()));

    let mut rules = MetricDelta::ZERO;
    let mut fired = SmallVec::new();
    for rule in fired_rules(&ids) {
        rules += rule.delta;
        fired.push(rule.name);
    }

    let missing_framework = missing_framework(&ids);
    let breakdown = MetricsBreakdown {
        technology_count: techs.len(),
        base: base_metrics(techs),
        compatibility: compatibility_delta(techs),
        hidden_modifiers: hidden_modifier_delta(techs, &ids),
        rules,
        penalties: penalty_delta(techs.len(), missing_framework),
        fired_rules: fired,
        missing_framework,
    };
    log::debug!(
        "scored {} technologies, rules fired: {:?}",
        breakdown.technology_count,
        breakdown.fired_rules
    );
    Some(breakdown)
}

fn base_metrics(techs: &[&Technology]) -> AppMetrics {
    let user_friendliness = mean(techs.iter().map(|t| t.user_friendliness));
    let stability = mean(techs.iter().map(|t| t.stability));
    AppMetrics {
        ux: UxMetrics {
            performance: mean(techs.iter().map(|t| t.performance)),
            stability,
            user_friendliness,
        },
        dev: DevMetrics {
            development_speed: user_friendliness,
            maintainability: stability,
            complexity: (BASE_COMPLEXITY + COMPLEXITY_PER_TECH * count_to_f64(techs.len()))
                .min(METRIC_MAX),
            cost: mean(techs.iter().map(|t| t.cost)),
        },
    }
}

/// Ordered pairs with distinct ids; each bucket is checked on its own.
fn compatibility_delta(techs: &[&Technology]) -> MetricDelta {
    let mut total = MetricDelta::ZERO;
    for source in techs {
        let Some(compat) = &source.compatibility else {
            continue;
        };
        for other in techs {
            if source.id == other.id {
                continue;
            }
            if compat.prefers(&other.id) {
                total += PREFERRED_DELTA;
            }
            if compat.accepts(&other.id) {
                total += COMPATIBLE_DELTA;
            }
            if compat.rejects(&other.id) {
                total += INCOMPATIBLE_DELTA;
            }
        }
    }
    total
}

fn hidden_modifier_delta(techs: &[&Technology], ids: &IdSet<'_>) -> MetricDelta {
    techs
        .iter()
        .flat_map(|tech| &tech.modifiers)
        .filter(|modifier| ids.has(&modifier.target_tech_id))
        .fold(MetricDelta::ZERO, |acc, modifier| {
            acc + MetricDelta::from_modifier(modifier)
        })
}

fn missing_framework(ids: &IdSet<'_>) -> bool {
    !ids.has_any(&FRONTEND_FRAMEWORKS) || !ids.has_any(&BACKEND_FRAMEWORKS)
}

fn penalty_delta(count: usize, missing_framework: bool) -> MetricDelta {
    let mut total = MetricDelta::ZERO;
    let excess = count.saturating_sub(MAX_TECHS_BEFORE_PENALTY);
    if excess > 0 {
        total += EXCESS_TECH_DELTA.scaled(count_to_i32(excess));
    }
    if missing_framework {
        total += MISSING_FRAMEWORK_DELTA;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::AppSchema;
    use crate::tech::{Category, Compatibility, DevDelta, TechnologyModifier, UxDelta};

    fn tech(id: &str, category: Category, value: f64) -> Technology {
        Technology::uniform(id, category, value)
    }

    fn approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn empty_schema_scores_zero() {
        assert_eq!(compute_metrics(&AppSchema::new()), AppMetrics::zero());
        assert!(explain_metrics(&AppSchema::new()).is_none());
    }

    #[test]
    fn single_plain_technology_pays_missing_framework_penalty() {
        let schema = AppSchema::from_technologies([], [tech("plain", Category::Library, 60.0)]);
        let metrics = compute_metrics(&schema);
        approx(metrics.ux.performance, 60.0);
        approx(metrics.ux.stability, 60.0);
        approx(metrics.ux.user_friendliness, 40.0);
        approx(metrics.dev.development_speed, 45.0);
        approx(metrics.dev.maintainability, 60.0);
        approx(metrics.dev.complexity, 38.0);
        approx(metrics.dev.cost, 60.0);
    }

    #[test]
    fn compatibility_is_directional_and_skips_same_id() {
        let a = tech("a", Category::Library, 50.0).with_compatibility(Compatibility {
            preferred: vec!["b".into(), "a".into()],
            ..Compatibility::default()
        });
        let b = tech("b", Category::Library, 50.0);
        let breakdown = explain_technologies(&[&a, &b, &a]).unwrap();
        // two occurrences of `a` each prefer `b`; `a -> a` never counts
        assert_eq!(breakdown.compatibility, PREFERRED_DELTA.scaled(2));
    }

    #[test]
    fn duplicate_source_applies_its_modifier_per_occurrence() {
        let modifier = TechnologyModifier::new(
            "b",
            UxDelta::new(3, -1, 0),
            DevDelta::new(0, 2, 1, -4),
        );
        let a = tech("a", Category::Library, 50.0).with_modifier(modifier.clone());
        let b = tech("b", Category::Library, 50.0);
        let breakdown = explain_technologies(&[&a, &a, &b]).unwrap();
        assert_eq!(
            breakdown.hidden_modifiers,
            MetricDelta::from_modifier(&modifier).scaled(2)
        );
        let once = explain_technologies(&[&a, &b]).unwrap();
        assert_eq!(once.hidden_modifiers, MetricDelta::from_modifier(&modifier));
    }

    #[test]
    fn buckets_accumulate_independently() {
        let a = tech("a", Category::Library, 50.0).with_compatibility(Compatibility {
            preferred: vec!["b".into()],
            compatible: vec!["b".into()],
            incompatible: vec!["b".into()],
        });
        let b = tech("b", Category::Library, 50.0);
        let breakdown = explain_technologies(&[&a, &b]).unwrap();
        assert_eq!(
            breakdown.compatibility,
            PREFERRED_DELTA + COMPATIBLE_DELTA + INCOMPATIBLE_DELTA
        );
    }

    #[test]
    fn hidden_modifiers_require_target_presence() {
        let boost = TechnologyModifier::new("b", UxDelta::new(4, 0, 0), DevDelta::new(0, 0, 2, 0));
        let a = tech("a", Category::Library, 50.0).with_modifier(boost);
        let b = tech("b", Category::Library, 50.0);

        let alone = explain_technologies(&[&a]).unwrap();
        assert!(alone.hidden_modifiers.is_zero());

        let paired = explain_technologies(&[&a, &b]).unwrap();
        assert_eq!(paired.hidden_modifiers.performance, 4);
        assert_eq!(paired.hidden_modifiers.complexity, 2);
    }

    #[test]
    fn excess_technologies_are_penalized_per_item() {
        let techs: Vec<_> = (0..10)
            .map(|i| tech(&format!("t{i}"), Category::Library, 50.0))
            .collect();
        let refs: Vec<_> = techs.iter().collect();
        let breakdown = explain_technologies(&refs).unwrap();
        assert_eq!(
            breakdown.penalties,
            EXCESS_TECH_DELTA.scaled(2) + MISSING_FRAMEWORK_DELTA
        );
        approx(breakdown.base.dev.complexity, 100.0);
    }

    #[test]
    fn framework_pair_lifts_missing_framework_penalty() {
        let react = tech("react", Category::Framework, 50.0);
        let node = tech("node", Category::Framework, 50.0);
        let breakdown = explain_technologies(&[&react, &node]).unwrap();
        assert!(!breakdown.missing_framework);
        assert!(breakdown.penalties.is_zero());

        let only_front = explain_technologies(&[&react]).unwrap();
        assert!(only_front.missing_framework);
    }

    #[test]
    fn rules_fire_once_regardless_of_duplicates() {
        let go = tech("go", Category::Language, 50.0);
        let once = explain_technologies(&[&go]).unwrap();
        let twice = explain_technologies(&[&go, &go]).unwrap();
        assert_eq!(once.rules, twice.rules);
        assert_eq!(twice.fired_rules.as_slice(), ["go"]);
    }

    #[test]
    fn totals_are_clamped() {
        let rust = tech("rust", Category::Language, 100.0);
        let metrics = metrics_for_technologies(&[&rust]);
        for (name, value) in metrics.fields() {
            assert!((0.0..=100.0).contains(&value), "{name} out of range: {value}");
        }
        approx(metrics.ux.performance, 100.0);
    }
}
