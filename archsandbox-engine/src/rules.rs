//! Combination rules keyed on technology id membership.
//!
//! Each rule fires at most once per evaluation no matter how many
//! matching technologies are placed.

use std::collections::HashSet;

use crate::metrics::MetricDelta;

/// Set of technology ids present in a schema.
#[derive(Debug, Clone, Default)]
pub struct IdSet<'a> {
    ids: HashSet<&'a str>,
}

impl<'a> IdSet<'a> {
    pub fn new(ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn has(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn has_any(&self, ids: &[&str]) -> bool {
        ids.iter().any(|id| self.has(id))
    }
}

/// A named membership predicate with the delta it contributes.
#[derive(Debug, Clone, Copy)]
pub struct CombinationRule {
    pub name: &'static str,
    pub applies: fn(&IdSet<'_>) -> bool,
    pub delta: MetricDelta,
}

const fn delta(
    performance: i32,
    stability: i32,
    user_friendliness: i32,
    development_speed: i32,
    maintainability: i32,
    complexity: i32,
    cost: i32,
) -> MetricDelta {
    MetricDelta {
        performance,
        stability,
        user_friendliness,
        development_speed,
        maintainability,
        complexity,
        cost,
    }
}

const SQL_OR_DOCUMENT_STORES: [&str; 3] = ["postgresql", "mongodb", "mysql"];
const BROKERS: [&str; 2] = ["kafka", "rabbitmq"];
const PROXIED_BACKENDS: [&str; 5] = ["node", "nestjs", "express", "django", "fastapi"];

/// Every combination rule, in evaluation order.
pub static RULES: [CombinationRule; 17] = [
    CombinationRule {
        name: "go",
        applies: |ids| ids.has("go"),
        delta: delta(10, 0, 0, -8, 0, 5, 0),
    },
    CombinationRule {
        name: "typescript",
        applies: |ids| ids.has("ts"),
        delta: delta(0, 8, 0, -3, 10, 5, 0),
    },
    CombinationRule {
        name: "javascript-without-typescript",
        applies: |ids| ids.has("js") && !ids.has("ts"),
        delta: delta(0, -5, 0, 10, -5, 0, 0),
    },
    CombinationRule {
        name: "nestjs-with-typescript",
        applies: |ids| ids.has("nestjs") && ids.has("ts"),
        delta: delta(0, 10, 0, 0, 12, 8, 0),
    },
    CombinationRule {
        name: "nestjs-without-typescript",
        applies: |ids| ids.has("nestjs") && !ids.has("ts"),
        delta: delta(0, -15, 0, 0, 0, 25, 0),
    },
    CombinationRule {
        name: "microservices-without-broker",
        applies: |ids| ids.has("microservices") && !ids.has_any(&BROKERS),
        delta: delta(0, -12, 0, 0, -10, 15, 0),
    },
    CombinationRule {
        name: "microservices-with-broker",
        applies: |ids| ids.has("microservices") && ids.has_any(&BROKERS),
        delta: delta(8, 6, 0, 0, 0, 10, 0),
    },
    CombinationRule {
        name: "redis-cache",
        applies: |ids| ids.has("redis") && ids.has_any(&SQL_OR_DOCUMENT_STORES),
        delta: delta(15, 0, 5, 0, 0, 5, 0),
    },
    CombinationRule {
        name: "docker-kubernetes",
        applies: |ids| ids.has("docker") && ids.has("kubernetes"),
        delta: delta(0, 10, 0, 0, 8, 20, 15),
    },
    CombinationRule {
        name: "kubernetes-without-docker",
        applies: |ids| ids.has("kubernetes") && !ids.has("docker"),
        delta: delta(0, -20, 0, -20, 0, 30, 0),
    },
    CombinationRule {
        name: "mongodb-graphql",
        applies: |ids| ids.has("mongodb") && ids.has("graphql"),
        delta: delta(7, 0, 0, 8, 0, 0, 0),
    },
    CombinationRule {
        name: "postgresql-rest",
        applies: |ids| ids.has("postgresql") && ids.has("rest"),
        delta: delta(0, 6, 0, 0, 7, 0, 0),
    },
    CombinationRule {
        name: "python",
        applies: |ids| ids.has("python"),
        delta: delta(-10, 0, 0, 12, 0, -5, 0),
    },
    CombinationRule {
        name: "rust",
        applies: |ids| ids.has("rust"),
        delta: delta(15, 12, 0, -20, 0, 25, 0),
    },
    CombinationRule {
        name: "nginx-proxy",
        applies: |ids| ids.has("nginx") && ids.has_any(&PROXIED_BACKENDS),
        delta: delta(8, 5, 0, 0, 0, 0, 0),
    },
    CombinationRule {
        name: "auth",
        applies: |ids| ids.has_any(&["jwt", "oauth"]),
        delta: delta(0, 5, 0, 0, 0, 6, 0),
    },
    CombinationRule {
        name: "javascript-on-node",
        applies: |ids| ids.has_any(&["js", "ts"]) && ids.has("node"),
        delta: delta(0, 0, 0, 10, 8, -5, 0),
    },
];

/// Rules whose predicate holds for `ids`, in table order.
pub fn fired_rules<'r>(ids: &'r IdSet<'_>) -> impl Iterator<Item = &'static CombinationRule> + 'r {
    RULES.iter().filter(move |rule| (rule.applies)(ids))
}
