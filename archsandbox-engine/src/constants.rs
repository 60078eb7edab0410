//! Centralized scoring and tuning constants for the sandbox engine.
//!
//! Scoring can only be adjusted through code changes reviewed in version
//! control. Catalog data lives in the embedded JSON assets.

use crate::metrics::MetricDelta;

// Metric bounds ------------------------------------------------------------
pub const METRIC_MIN: f64 = 0.0;
pub const METRIC_MAX: f64 = 100.0;

// Base pass ----------------------------------------------------------------
pub(crate) const BASE_COMPLEXITY: f64 = 30.0;
pub(crate) const COMPLEXITY_PER_TECH: f64 = 8.0;

// Compatibility pass -------------------------------------------------------
pub(crate) const PREFERRED_DELTA: MetricDelta = MetricDelta {
    performance: 3,
    stability: 2,
    development_speed: 3,
    maintainability: 3,
    complexity: -2,
    ..MetricDelta::ZERO
};
pub(crate) const COMPATIBLE_DELTA: MetricDelta = MetricDelta {
    performance: 1,
    development_speed: 1,
    complexity: 1,
    ..MetricDelta::ZERO
};
pub(crate) const INCOMPATIBLE_DELTA: MetricDelta = MetricDelta {
    performance: -10,
    stability: -8,
    development_speed: -15,
    complexity: 20,
    cost: 15,
    ..MetricDelta::ZERO
};

// Penalty pass -------------------------------------------------------------
pub const MAX_TECHS_BEFORE_PENALTY: usize = 8;
pub(crate) const EXCESS_TECH_DELTA: MetricDelta = MetricDelta {
    complexity: 5,
    maintainability: -3,
    cost: 5,
    ..MetricDelta::ZERO
};
pub(crate) const MISSING_FRAMEWORK_DELTA: MetricDelta = MetricDelta {
    user_friendliness: -20,
    development_speed: -15,
    ..MetricDelta::ZERO
};
pub const FRONTEND_FRAMEWORKS: [&str; 4] = ["react", "vue", "angular", "svelte"];
pub const BACKEND_FRAMEWORKS: [&str; 6] = ["node", "nestjs", "express", "django", "fastapi", "spring"];

// Ranking ------------------------------------------------------------------
pub(crate) const PREFERRED_SCORE: i64 = 100;
pub(crate) const COMPATIBLE_SCORE: i64 = 50;
pub(crate) const INCOMPATIBLE_SCORE: i64 = -1000;
pub(crate) const MODIFIER_PRESENCE_SCORE: i64 = 30;
pub(crate) const INCOMPATIBLE_LABEL_BELOW: i64 = -500;
pub(crate) const RECOMMENDED_LABEL_ABOVE: i64 = 150;
pub(crate) const COMPATIBLE_LABEL_ABOVE: i64 = 50;
pub(crate) const SIMPLE_BELOW: f64 = 35.0;
pub(crate) const MEDIUM_BELOW: f64 = 55.0;
pub(crate) const HARD_BELOW: f64 = 75.0;

// Budget -------------------------------------------------------------------
pub const DEFAULT_BUDGET: f64 = 10_000.0;
pub(crate) const DOLLARS_PER_COST_POINT: f64 = 100.0;
pub(crate) const FREE_FRAMEWORK_COST_BELOW: f64 = 30.0;
pub(crate) const PREMIUM_DATABASE_COST_ABOVE: f64 = 40.0;
pub(crate) const PREMIUM_DATABASE_FACTOR: f64 = 2.0;
pub(crate) const HEAVY_SERVICE_FACTOR: f64 = 1.5;
pub(crate) const HEAVY_SERVICES: [&str; 3] = ["kubernetes", "kafka", "elasticsearch-service"];

// App types ----------------------------------------------------------------
pub(crate) const REQUIREMENT_SCORE_START: i32 = 100;
pub(crate) const MISSED_PERFORMANCE: i32 = 10;
pub(crate) const MISSED_STABILITY: i32 = 15;
pub(crate) const MISSED_USER_FRIENDLINESS: i32 = 5;
pub(crate) const MISSED_DEVELOPMENT_SPEED: i32 = 5;
pub(crate) const MISSED_MAINTAINABILITY: i32 = 10;
pub(crate) const EXCEEDED_COMPLEXITY: i32 = 15;
pub(crate) const REQUIREMENTS_MET_BONUS: MetricDelta = MetricDelta {
    performance: 3,
    stability: 3,
    maintainability: 3,
    ..MetricDelta::ZERO
};
pub(crate) const COMPLEXITY_EXCEEDED_BONUS: MetricDelta = MetricDelta {
    complexity: -5,
    ..MetricDelta::ZERO
};

// History ------------------------------------------------------------------
pub const DEFAULT_HISTORY_DEPTH: usize = 50;
