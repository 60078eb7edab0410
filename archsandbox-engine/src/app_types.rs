//! Project types with minimum metric requirements.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    COMPLEXITY_EXCEEDED_BONUS, EXCEEDED_COMPLEXITY, MISSED_DEVELOPMENT_SPEED,
    MISSED_MAINTAINABILITY, MISSED_PERFORMANCE, MISSED_STABILITY, MISSED_USER_FRIENDLINESS,
    REQUIREMENT_SCORE_START, REQUIREMENTS_MET_BONUS,
};
use crate::metrics::{AppMetrics, MetricDelta};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirements {
    pub performance: f64,
    pub stability: f64,
    pub user_friendliness: f64,
    pub development_speed: f64,
    pub maintainability: f64,
    pub max_complexity: f64,
    /// Budget ceiling in dollars.
    pub max_cost: f64,
}

impl Requirements {
    #[must_use]
    pub fn fits_budget(&self, total_cost: f64) -> bool {
        total_cost <= self.max_cost
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppType {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub requirements: Requirements,
    #[serde(default)]
    pub recommended_technologies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppTypes {
    pub app_types: Vec<AppType>,
}

impl AppTypes {
    /// Parse the `{"appTypes": [...]}` document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn get_by_id(&self, id: &str) -> Option<&AppType> {
        self.app_types.iter().find(|app| app.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AppType> {
        self.app_types.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.app_types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.app_types.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Shortfall {
    Below,
    Above,
}

/// A single requirement the metrics fail to meet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequirementIssue {
    pub metric: &'static str,
    pub actual: f64,
    pub required: f64,
    pub shortfall: Shortfall,
    pub deduction: i32,
}

impl fmt::Display for RequirementIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shortfall {
            Shortfall::Below => write!(
                f,
                "{} ({:.1}) is below the required {}",
                self.metric, self.actual, self.required
            ),
            Shortfall::Above => write!(
                f,
                "{} ({:.1}) exceeds the allowed {}",
                self.metric, self.actual, self.required
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequirementReport {
    pub met: bool,
    /// 100 minus deductions, floored at 0.
    pub score: i32,
    pub issues: Vec<RequirementIssue>,
}

/// Compare metrics against an app type's minimums and complexity ceiling.
#[must_use]
pub fn check_requirements(metrics: &AppMetrics, app_type: &AppType) -> RequirementReport {
    let req = &app_type.requirements;
    let minimums = [
        ("performance", metrics.ux.performance, req.performance, MISSED_PERFORMANCE),
        ("stability", metrics.ux.stability, req.stability, MISSED_STABILITY),
        (
            "userFriendliness",
            metrics.ux.user_friendliness,
            req.user_friendliness,
            MISSED_USER_FRIENDLINESS,
        ),
        (
            "developmentSpeed",
            metrics.dev.development_speed,
            req.development_speed,
            MISSED_DEVELOPMENT_SPEED,
        ),
        (
            "maintainability",
            metrics.dev.maintainability,
            req.maintainability,
            MISSED_MAINTAINABILITY,
        ),
    ];

    let mut issues: Vec<RequirementIssue> = minimums
        .into_iter()
        .filter(|&(_, actual, required, _)| actual < required)
        .map(|(metric, actual, required, deduction)| RequirementIssue {
            metric,
            actual,
            required,
            shortfall: Shortfall::Below,
            deduction,
        })
        .collect();

    if metrics.dev.complexity > req.max_complexity {
        issues.push(RequirementIssue {
            metric: "complexity",
            actual: metrics.dev.complexity,
            required: req.max_complexity,
            shortfall: Shortfall::Above,
            deduction: EXCEEDED_COMPLEXITY,
        });
    }

    let deducted: i32 = issues.iter().map(|issue| issue.deduction).sum();
    RequirementReport {
        met: issues.is_empty(),
        score: (REQUIREMENT_SCORE_START - deducted).max(0),
        issues,
    }
}

/// Bonus for meeting every requirement plus the extra complexity adjustment.
#[must_use]
pub fn app_type_bonus(metrics: &AppMetrics, app_type: &AppType) -> MetricDelta {
    let mut bonus = MetricDelta::ZERO;
    if metrics.dev.complexity > app_type.requirements.max_complexity {
        bonus += COMPLEXITY_EXCEEDED_BONUS;
    }
    if check_requirements(metrics, app_type).met {
        bonus += REQUIREMENTS_MET_BONUS;
    }
    bonus
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{DevMetrics, UxMetrics};

    fn app_type(min: f64, max_complexity: f64) -> AppType {
        AppType {
            id: "test".into(),
            name: "Test".into(),
            description: String::new(),
            requirements: Requirements {
                performance: min,
                stability: min,
                user_friendliness: min,
                development_speed: min,
                maintainability: min,
                max_complexity,
                max_cost: 5000.0,
            },
            recommended_technologies: Vec::new(),
        }
    }

    fn metrics(value: f64, complexity: f64) -> AppMetrics {
        AppMetrics {
            ux: UxMetrics {
                performance: value,
                stability: value,
                user_friendliness: value,
            },
            dev: DevMetrics {
                development_speed: value,
                maintainability: value,
                complexity,
                cost: value,
            },
        }
    }

    #[test]
    fn all_requirements_met() {
        let report = check_requirements(&metrics(80.0, 40.0), &app_type(70.0, 60.0));
        assert!(report.met);
        assert_eq!(report.score, 100);
        assert!(report.issues.is_empty());
        assert_eq!(
            app_type_bonus(&metrics(80.0, 40.0), &app_type(70.0, 60.0)),
            REQUIREMENTS_MET_BONUS
        );
    }

    #[test]
    fn every_miss_deducts_from_score() {
        let report = check_requirements(&metrics(10.0, 90.0), &app_type(70.0, 60.0));
        assert!(!report.met);
        assert_eq!(report.issues.len(), 6);
        assert_eq!(report.score, 40);
        assert_eq!(report.issues[5].shortfall, Shortfall::Above);
        assert_eq!(
            report.issues[0].to_string(),
            "performance (10.0) is below the required 70"
        );
    }

    #[test]
    fn excess_complexity_only_adjusts_complexity() {
        let bonus = app_type_bonus(&metrics(80.0, 90.0), &app_type(70.0, 60.0));
        assert_eq!(bonus, COMPLEXITY_EXCEEDED_BONUS);
    }

    #[test]
    fn budget_ceiling_is_inclusive() {
        let req = app_type(0.0, 100.0).requirements;
        assert!(req.fits_budget(5000.0));
        assert!(!req.fits_budget(5000.5));
    }
}
