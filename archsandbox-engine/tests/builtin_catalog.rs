use archsandbox_engine::{
    AppSchema, CatalogLoader, Category, EmbeddedCatalogLoader, RecommendationLabel,
    SandboxSession, Severity, View, builtin_catalog, check_requirements, compute_metrics,
    interactions_for, lint_catalog, rank_technologies, recommendation_label,
};

#[test]
fn builtin_catalog_lints_without_errors() {
    let catalog = builtin_catalog().unwrap();
    let report = lint_catalog(catalog);
    assert_eq!(report.checked, 40);
    let errors: Vec<String> = report
        .at_least(Severity::Error)
        .map(ToString::to_string)
        .collect();
    assert!(errors.is_empty(), "{errors:#?}");
}

#[test]
fn every_attribute_is_in_range() {
    for tech in builtin_catalog().unwrap() {
        for (name, value) in tech.attributes() {
            assert!(
                (0.0..=100.0).contains(&value),
                "{}.{name} = {value}",
                tech.id
            );
        }
    }
}

#[test]
fn empty_ranking_is_non_decreasing_in_complexity() {
    let catalog = builtin_catalog().unwrap();
    let ranked = rank_technologies(catalog.technologies(), &AppSchema::new());
    assert_eq!(ranked.len(), catalog.len());
    for pair in ranked.windows(2) {
        assert!(
            pair[0].complexity <= pair[1].complexity,
            "{} ({}) before {} ({})",
            pair[0].id,
            pair[0].complexity,
            pair[1].id,
            pair[1].complexity
        );
    }
}

#[test]
fn typescript_rejects_django() {
    let catalog = builtin_catalog().unwrap();
    let ts = catalog.get_by_id("ts").unwrap();
    let django = catalog.get_by_id("django").unwrap();
    assert_eq!(
        recommendation_label(django, &[ts]),
        Some(RecommendationLabel::Incompatible)
    );
    let react = catalog.get_by_id("react").unwrap();
    assert_eq!(
        recommendation_label(react, &[ts]),
        Some(RecommendationLabel::Recommended)
    );
}

#[test]
fn full_stack_session_scores_in_range() {
    let catalog = builtin_catalog().unwrap();
    let mut session = SandboxSession::default();
    for (view, id) in [
        (View::Frontend, "ts"),
        (View::Frontend, "react"),
        (View::Backend, "node"),
        (View::Backend, "postgresql"),
        (View::Backend, "docker"),
    ] {
        let tech = catalog.get_by_id(id).unwrap().clone();
        session.add_technology(view, tech).unwrap();
    }
    let metrics = session.metrics();
    assert_eq!(metrics, compute_metrics(session.schema()));
    for (name, value) in metrics.fields() {
        assert!((0.0..=100.0).contains(&value), "{name} = {value}");
    }
    let breakdown = session.explain().unwrap();
    assert!(!breakdown.missing_framework);
    assert!(breakdown.fired_rules.contains(&"javascript-on-node"));

    let ranked = session.ranked(catalog);
    let top = &ranked[0];
    assert_ne!(
        recommendation_label(top, &session.schema().technologies()),
        Some(RecommendationLabel::Incompatible)
    );
}

#[test]
fn builtin_app_types_check_metrics() {
    let types = EmbeddedCatalogLoader.load_app_types().unwrap();
    assert_eq!(types.len(), 7);
    let ecommerce = types.get_by_id("ecommerce").unwrap();
    let report = check_requirements(&compute_metrics(&AppSchema::new()), ecommerce);
    assert!(!report.met);
    assert_eq!(report.score, 55);
}

#[test]
fn react_shows_interactions_with_typescript() {
    let catalog = builtin_catalog().unwrap();
    let react = catalog.get_by_id("react").unwrap();
    let selected: Vec<_> = catalog
        .by_category(Category::Language)
        .filter(|tech| tech.id == "ts" || tech.id == "js")
        .collect();
    let infos = interactions_for(react, &selected);
    let ts = infos.iter().find(|info| info.tech_id == "ts").unwrap();
    assert_eq!(ts.ux_lines(), vec!["+8% Stability"]);
    assert!(
        infos
            .iter()
            .all(|info| !info.ux_lines().is_empty() || !info.dev_lines().is_empty())
    );
}
