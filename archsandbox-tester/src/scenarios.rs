//! Named logic scenarios run against the engine and a loaded catalog.
use anyhow::{Context, Result};
use archsandbox_engine::{
    AppMetrics, AppSchema, AppTypes, Catalog, Category, Compatibility, DevDelta,
    RecommendationLabel, SandboxSession, SessionError, Severity, Technology, TechnologyModifier,
    UxDelta, View, compute_metrics, explain_metrics, lint_catalog, rank_technologies,
    recommendation_label, tech_cost,
};
use colored::Colorize;
use serde::Serialize;
use std::time::Instant;

/// What a scenario can see while it runs.
pub struct ScenarioCtx<'a> {
    pub catalog: &'a Catalog,
    pub app_types: &'a AppTypes,
    pub budget: f64,
}

type ScenarioFn = fn(&ScenarioCtx<'_>) -> Result<()>;

pub struct Scenario {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    run: ScenarioFn,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub key: String,
    pub passed: bool,
    pub failures: Vec<String>,
    pub elapsed_us: u64,
}

impl ScenarioResult {
    pub fn unknown(key: &str) -> Self {
        Self {
            scenario_name: key.to_string(),
            key: key.to_string(),
            passed: false,
            failures: vec![format!("unknown scenario '{key}'")],
            elapsed_us: 0,
        }
    }
}

const SCENARIOS: &[Scenario] = &[
    Scenario {
        key: "smoke",
        name: "Smoke",
        description: "Build a small stack from the catalog and score it",
        run: smoke,
    },
    Scenario {
        key: "empty-schema",
        name: "Empty Schema",
        description: "An empty schema scores all zeros",
        run: empty_schema,
    },
    Scenario {
        key: "metric-bounds",
        name: "Metric Bounds",
        description: "Hostile pairs and the whole catalog stay inside [0, 100]",
        run: metric_bounds,
    },
    Scenario {
        key: "modifier-gating",
        name: "Modifier Gating",
        description: "Hidden modifiers apply only while their target is placed",
        run: modifier_gating,
    },
    Scenario {
        key: "rule-sum",
        name: "Combination Rules Sum",
        description: "ts + nestjs + node sum their rule deltas",
        run: rule_sum,
    },
    Scenario {
        key: "ranking-order",
        name: "Ranking Order",
        description: "Empty selection ranks by ascending complexity",
        run: ranking_order,
    },
    Scenario {
        key: "label-thresholds",
        name: "Label Thresholds",
        description: "Mutual preference is Recommended, mutual conflict Incompatible",
        run: label_thresholds,
    },
    Scenario {
        key: "view-averages",
        name: "View Averages",
        description: "Base metrics average across frontend and backend",
        run: view_averages,
    },
    Scenario {
        key: "complexity-growth",
        name: "Complexity Growth",
        description: "Five unrelated technologies push complexity past 30",
        run: complexity_growth,
    },
    Scenario {
        key: "incompatible-pair",
        name: "Incompatible Pair",
        description: "A declared conflict drags metrics below a neutral baseline",
        run: incompatible_pair,
    },
    Scenario {
        key: "kubernetes-without-docker",
        name: "Kubernetes Without Docker",
        description: "Orchestration without containers costs stability",
        run: kubernetes_without_docker,
    },
    Scenario {
        key: "catalog-lint",
        name: "Catalog Lint",
        description: "The loaded catalog has no lint errors",
        run: catalog_lint,
    },
    Scenario {
        key: "session-guards",
        name: "Session Guards",
        description: "Rejected placements leave the schema untouched and undo restores it",
        run: session_guards,
    },
    Scenario {
        key: "legacy-import",
        name: "Legacy Import",
        description: "Saves in the old technology shape load with migrated attributes",
        run: legacy_import,
    },
    Scenario {
        key: "app-type-fit",
        name: "App Type Fit",
        description: "Requirement scores stay within 0..=100 for every app type",
        run: app_type_fit,
    },
];

pub fn get_scenario(name: &str) -> Option<&'static Scenario> {
    SCENARIOS
        .iter()
        .find(|scenario| scenario.key == name || scenario.name.eq_ignore_ascii_case(name))
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    SCENARIOS
        .iter()
        .map(|scenario| (scenario.key, scenario.description))
        .collect()
}

pub fn scenario_keys() -> impl Iterator<Item = &'static str> {
    SCENARIOS.iter().map(|scenario| scenario.key)
}

pub fn run_scenario(scenario: &Scenario, ctx: &ScenarioCtx<'_>, verbose: bool) -> ScenarioResult {
    if verbose {
        println!("🧪 Testing scenario: {}", scenario.name.bright_white());
    }
    let start = Instant::now();
    let outcome = (scenario.run)(ctx);
    let elapsed_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);

    let failures = match outcome {
        Ok(()) => Vec::new(),
        Err(err) => {
            log::warn!("scenario '{}' failed: {err:#}", scenario.key);
            vec![format!("{err:#}")]
        }
    };
    ScenarioResult {
        scenario_name: scenario.name.to_string(),
        key: scenario.key.to_string(),
        passed: failures.is_empty(),
        failures,
        elapsed_us,
    }
}

fn neutral(id: &str) -> Technology {
    Technology::uniform(id, Category::Library, 50.0)
}

fn backend_only(techs: Vec<Technology>) -> AppSchema {
    AppSchema::from_technologies([], techs)
}

fn lookup<'a>(catalog: &'a Catalog, id: &str) -> Result<&'a Technology> {
    catalog
        .get_by_id(id)
        .with_context(|| format!("catalog has no '{id}'"))
}

fn ensure_close(actual: f64, expected: f64, field: &str) -> Result<()> {
    anyhow::ensure!(
        (actual - expected).abs() < 1e-9,
        "{field}: expected {expected}, got {actual}"
    );
    Ok(())
}

fn ensure_in_range(metrics: &AppMetrics) -> Result<()> {
    for (name, value) in metrics.fields() {
        anyhow::ensure!(
            (0.0..=100.0).contains(&value),
            "{name} escaped [0, 100]: {value}"
        );
    }
    Ok(())
}

fn smoke(ctx: &ScenarioCtx<'_>) -> Result<()> {
    let mut session = SandboxSession::new(ctx.budget);
    let mut placed = 0;
    for (view, id) in [
        (View::Frontend, "react"),
        (View::Backend, "node"),
        (View::Backend, "postgresql"),
    ] {
        let Some(tech) = ctx.catalog.get_by_id(id) else {
            continue;
        };
        if session.add_technology(view, tech.clone()).is_ok() {
            placed += 1;
        }
    }
    anyhow::ensure!(placed > 0, "could not place any smoke technology");
    ensure_in_range(&session.metrics())?;
    anyhow::ensure!(
        !session.ranked(ctx.catalog).is_empty(),
        "ranking returned nothing"
    );
    Ok(())
}

fn empty_schema(_ctx: &ScenarioCtx<'_>) -> Result<()> {
    let metrics = compute_metrics(&AppSchema::new());
    anyhow::ensure!(
        metrics == AppMetrics::zero(),
        "empty schema scored {metrics:?}"
    );
    anyhow::ensure!(explain_metrics(&AppSchema::new()).is_none());
    Ok(())
}

fn metric_bounds(ctx: &ScenarioCtx<'_>) -> Result<()> {
    let hostile = |id: &str, other: &str| {
        let mut tech = Technology::uniform(id, Category::Framework, 0.0);
        tech.complexity = 100.0;
        tech.cost = 100.0;
        tech.with_compatibility(Compatibility {
            incompatible: vec![other.to_string()],
            ..Compatibility::default()
        })
    };
    ensure_in_range(&compute_metrics(&backend_only(vec![
        hostile("a", "b"),
        hostile("b", "a"),
    ])))?;

    let everything = backend_only(ctx.catalog.technologies().to_vec());
    ensure_in_range(&compute_metrics(&everything))?;
    for tech in ctx.catalog {
        ensure_in_range(&compute_metrics(&backend_only(vec![tech.clone()])))
            .with_context(|| format!("scoring '{}' alone", tech.id))?;
    }
    Ok(())
}

fn modifier_gating(_ctx: &ScenarioCtx<'_>) -> Result<()> {
    let source = neutral("a").with_modifier(TechnologyModifier::new(
        "b",
        UxDelta::new(7, 0, 0),
        DevDelta::new(0, 4, 0, 0),
    ));
    let without = compute_metrics(&backend_only(vec![source.clone(), neutral("c")]));
    let with = compute_metrics(&backend_only(vec![source, neutral("b")]));
    ensure_close(with.ux.performance - without.ux.performance, 7.0, "performance")?;
    ensure_close(
        with.dev.maintainability - without.dev.maintainability,
        4.0,
        "maintainability",
    )
}

fn rule_sum(_ctx: &ScenarioCtx<'_>) -> Result<()> {
    let schema = backend_only(vec![neutral("ts"), neutral("nestjs"), neutral("node")]);
    let breakdown = explain_metrics(&schema).context("schema is not empty")?;
    anyhow::ensure!(
        breakdown.fired_rules.as_slice()
            == ["typescript", "nestjs-with-typescript", "javascript-on-node"],
        "unexpected rules fired: {:?}",
        breakdown.fired_rules
    );
    let metrics = breakdown.total();
    ensure_close(metrics.ux.performance, 50.0, "performance")?;
    ensure_close(metrics.ux.stability, 68.0, "stability")?;
    ensure_close(metrics.ux.user_friendliness, 30.0, "userFriendliness")?;
    ensure_close(metrics.dev.development_speed, 42.0, "developmentSpeed")?;
    ensure_close(metrics.dev.maintainability, 80.0, "maintainability")?;
    ensure_close(metrics.dev.complexity, 62.0, "complexity")?;
    ensure_close(metrics.dev.cost, 50.0, "cost")
}

fn ranking_order(ctx: &ScenarioCtx<'_>) -> Result<()> {
    let ranked = rank_technologies(ctx.catalog.technologies(), &AppSchema::new());
    anyhow::ensure!(ranked.len() == ctx.catalog.len(), "ranking dropped entries");
    for pair in ranked.windows(2) {
        anyhow::ensure!(
            pair[0].complexity <= pair[1].complexity,
            "'{}' ({}) ranked before '{}' ({})",
            pair[0].id,
            pair[0].complexity,
            pair[1].id,
            pair[1].complexity
        );
    }

    let mut easy = neutral("easy");
    easy.complexity = 20.0;
    let mut hard = neutral("hard");
    hard.complexity = 80.0;
    let ranked = rank_technologies(&[hard, easy], &AppSchema::new());
    anyhow::ensure!(ranked[0].id == "easy", "complexity 20 must sort first");
    Ok(())
}

fn preferring(id: &str, other: &str) -> Technology {
    neutral(id).with_compatibility(Compatibility {
        preferred: vec![other.to_string()],
        ..Compatibility::default()
    })
}

fn rejecting(id: &str, other: &str) -> Technology {
    neutral(id).with_compatibility(Compatibility {
        incompatible: vec![other.to_string()],
        ..Compatibility::default()
    })
}

fn label_thresholds(_ctx: &ScenarioCtx<'_>) -> Result<()> {
    let (a, b) = (preferring("a", "b"), preferring("b", "a"));
    let label = recommendation_label(&a, &[&b]);
    anyhow::ensure!(
        label == Some(RecommendationLabel::Recommended),
        "mutual preference labelled {label:?}"
    );

    let (x, y) = (rejecting("x", "y"), rejecting("y", "x"));
    let label = recommendation_label(&x, &[&y]);
    anyhow::ensure!(
        label == Some(RecommendationLabel::Incompatible),
        "mutual conflict labelled {label:?}"
    );
    Ok(())
}

fn view_averages(_ctx: &ScenarioCtx<'_>) -> Result<()> {
    let mut first = neutral("tech1");
    first.performance = 80.0;
    first.stability = 70.0;
    first.user_friendliness = 60.0;
    let mut second = neutral("tech2");
    second.performance = 60.0;
    second.stability = 80.0;
    second.user_friendliness = 70.0;

    let breakdown = explain_metrics(&AppSchema::from_technologies([first], [second]))
        .context("schema is not empty")?;
    ensure_close(breakdown.base.ux.performance, 70.0, "performance")?;
    ensure_close(breakdown.base.ux.stability, 75.0, "stability")?;
    ensure_close(breakdown.base.ux.user_friendliness, 65.0, "userFriendliness")
}

fn complexity_growth(_ctx: &ScenarioCtx<'_>) -> Result<()> {
    let schema = backend_only((0..5).map(|i| neutral(&format!("t{i}"))).collect());
    let complexity = compute_metrics(&schema).dev.complexity;
    anyhow::ensure!(complexity > 30.0, "complexity stayed at {complexity}");
    Ok(())
}

fn incompatible_pair(_ctx: &ScenarioCtx<'_>) -> Result<()> {
    let a = rejecting("a", "b");
    let metrics = compute_metrics(&backend_only(vec![a, neutral("b")]));
    anyhow::ensure!(metrics.ux.performance < 50.0, "performance {}", metrics.ux.performance);
    anyhow::ensure!(metrics.ux.stability < 50.0, "stability {}", metrics.ux.stability);
    anyhow::ensure!(metrics.dev.complexity > 50.0, "complexity {}", metrics.dev.complexity);
    Ok(())
}

fn kubernetes_without_docker(_ctx: &ScenarioCtx<'_>) -> Result<()> {
    let baseline = compute_metrics(&backend_only(vec![neutral("other")]));
    let kube = compute_metrics(&backend_only(vec![neutral("kubernetes")]));
    anyhow::ensure!(
        kube.ux.stability < baseline.ux.stability,
        "stability did not drop"
    );
    anyhow::ensure!(
        kube.dev.complexity > baseline.dev.complexity,
        "complexity did not rise"
    );
    Ok(())
}

fn catalog_lint(ctx: &ScenarioCtx<'_>) -> Result<()> {
    let report = lint_catalog(ctx.catalog);
    anyhow::ensure!(report.checked == ctx.catalog.len());
    if let Some(issue) = report.at_least(Severity::Error).next() {
        anyhow::bail!("catalog lint error: {issue}");
    }
    Ok(())
}

fn session_guards(ctx: &ScenarioCtx<'_>) -> Result<()> {
    let priced = ctx
        .catalog
        .iter()
        .find(|tech| tech_cost(tech) > 0.0)
        .context("catalog has no priced technology")?;

    let mut broke = SandboxSession::new(0.0);
    match broke.add_technology(View::Backend, priced.clone()) {
        Err(SessionError::Unaffordable { .. }) => {}
        other => anyhow::bail!("expected an unaffordable error, got {other:?}"),
    }
    anyhow::ensure!(broke.schema().is_empty(), "rejected placement changed the schema");

    let mut session = SandboxSession::new(f64::from(u32::MAX));
    session.add_technology(View::Backend, priced.clone())?;
    let before = session.schema().clone();
    let duplicate = session
        .add_technology(View::Backend, priced.clone())
        .map(|_| ());
    if priced.category.allows_multiple() {
        anyhow::ensure!(duplicate.is_ok(), "services may repeat");
    } else {
        anyhow::ensure!(
            matches!(duplicate, Err(SessionError::CategoryOccupied { .. })),
            "second {} was accepted",
            priced.category
        );
        anyhow::ensure!(session.schema() == &before, "rejected placement changed the schema");
    }

    session.clear_view(View::Backend);
    anyhow::ensure!(session.undo(), "nothing to undo");
    anyhow::ensure!(session.schema() == &before || priced.category.allows_multiple());
    anyhow::ensure!(session.redo(), "nothing to redo");
    anyhow::ensure!(session.schema().panels(View::Backend).is_empty());
    Ok(())
}

fn legacy_import(_ctx: &ScenarioCtx<'_>) -> Result<()> {
    let dump = r#"{
        "frontend": [],
        "backend": [{
            "id": "backend-1",
            "technology": {
                "id": "old",
                "name": "Old",
                "category": "database",
                "description": "",
                "pros": [],
                "cons": [],
                "performance": 60,
                "stability": 70,
                "usability": 40,
                "complexity": 30,
                "price": 20
            },
            "x": 0,
            "y": 0,
            "connections": []
        }]
    }"#;
    let schema = AppSchema::from_json(dump)?;
    let tech = &schema.panels(View::Backend)[0].technology;
    ensure_close(tech.user_friendliness, 40.0, "userFriendliness")?;
    ensure_close(tech.development_speed, 40.0, "developmentSpeed")?;
    ensure_close(tech.maintainability, 70.0, "maintainability")?;
    ensure_close(tech.cost, 20.0, "cost")
}

fn app_type_fit(ctx: &ScenarioCtx<'_>) -> Result<()> {
    anyhow::ensure!(!ctx.app_types.is_empty(), "no app types loaded");
    for app_type in ctx.app_types.iter() {
        let stack: Vec<Technology> = app_type
            .recommended_technologies
            .iter()
            .filter_map(|id| ctx.catalog.get_by_id(id).cloned())
            .collect();
        let session = SandboxSession::from_schema(backend_only(stack), ctx.budget);
        let report = session.check_app_type(app_type);
        anyhow::ensure!(
            (0..=100).contains(&report.score),
            "{} scored {}",
            app_type.id,
            report.score
        );
        anyhow::ensure!(report.met == report.issues.is_empty());
        for id in &app_type.recommended_technologies {
            lookup(ctx.catalog, id)
                .with_context(|| format!("app type '{}' recommends it", app_type.id))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use archsandbox_engine::{CatalogLoader, EmbeddedCatalogLoader, builtin_catalog};

    fn with_builtin<T>(f: impl FnOnce(&ScenarioCtx<'_>) -> T) -> T {
        let catalog = builtin_catalog().unwrap();
        let app_types = EmbeddedCatalogLoader.load_app_types().unwrap();
        f(&ScenarioCtx {
            catalog,
            app_types: &app_types,
            budget: 10_000.0,
        })
    }

    #[test]
    fn keys_are_unique_and_listed() {
        let mut keys: Vec<_> = scenario_keys().collect();
        let total = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), total);
        assert_eq!(list_scenarios().len(), total);
    }

    #[test]
    fn lookup_by_key_or_name() {
        assert_eq!(get_scenario("rule-sum").unwrap().key, "rule-sum");
        assert_eq!(get_scenario("metric bounds").unwrap().key, "metric-bounds");
        assert!(get_scenario("nope").is_none());
    }

    #[test]
    fn every_scenario_passes_on_builtin_catalog() {
        with_builtin(|ctx| {
            for scenario in SCENARIOS {
                let result = run_scenario(scenario, ctx, false);
                assert!(result.passed, "{}: {:?}", result.key, result.failures);
            }
        });
    }

    #[test]
    fn failing_scenario_records_error_chain() {
        fn always_fails(_ctx: &ScenarioCtx<'_>) -> Result<()> {
            Err(anyhow::anyhow!("inner")).context("outer")
        }
        let scenario = Scenario {
            key: "broken",
            name: "Broken",
            description: "",
            run: always_fails,
        };
        let result = with_builtin(|ctx| run_scenario(&scenario, ctx, false));
        assert!(!result.passed);
        assert_eq!(result.failures, vec!["outer: inner".to_string()]);
    }

    #[test]
    fn unknown_result_fails() {
        let result = ScenarioResult::unknown("ghost");
        assert!(!result.passed);
        assert!(result.failures[0].contains("ghost"));
    }
}
