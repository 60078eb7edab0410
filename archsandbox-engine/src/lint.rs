//! Offline consistency checks for catalog data.
//!
//! The lint never changes scoring. Dangling references stay inert at
//! runtime; they are only reported here.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::catalog::Catalog;
use crate::constants::{METRIC_MAX, METRIC_MIN};
use crate::tech::{Relation, Technology};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => f.write_str("info"),
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// Where a reference to another id was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceSource {
    Compatibility(Relation),
    Modifier,
}

impl fmt::Display for ReferenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compatibility(relation) => write!(f, "{relation} list"),
            Self::Modifier => f.write_str("modifier"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LintKind {
    DuplicateId,
    AttributeOutOfRange { attribute: &'static str, value: f64 },
    ConflictingBuckets { target: String },
    SelfReference { source: ReferenceSource },
    DanglingTarget { target: String, source: ReferenceSource },
    MissingReciprocal { target: String, relation: Relation },
}

impl LintKind {
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::DuplicateId | Self::AttributeOutOfRange { .. } | Self::ConflictingBuckets { .. } => {
                Severity::Error
            }
            Self::SelfReference { .. } | Self::DanglingTarget { .. } => Severity::Warning,
            Self::MissingReciprocal { .. } => Severity::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LintIssue {
    pub tech_id: String,
    pub severity: Severity,
    #[serde(flatten)]
    pub kind: LintKind,
}

impl LintIssue {
    fn new(tech_id: &str, kind: LintKind) -> Self {
        Self {
            tech_id: tech_id.to_string(),
            severity: kind.severity(),
            kind,
        }
    }
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: ", self.severity, self.tech_id)?;
        match &self.kind {
            LintKind::DuplicateId => f.write_str("id is declared more than once"),
            LintKind::AttributeOutOfRange { attribute, value } => {
                write!(f, "{attribute} = {value} is outside [0, 100]")
            }
            LintKind::ConflictingBuckets { target } => {
                write!(f, "'{target}' appears in more than one compatibility list")
            }
            LintKind::SelfReference { source } => write!(f, "{source} references itself"),
            LintKind::DanglingTarget { target, source } => {
                write!(f, "{source} references unknown id '{target}'")
            }
            LintKind::MissingReciprocal { target, relation } => write!(
                f,
                "lists '{target}' as {relation} but '{target}' does not list it back"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LintReport {
    pub checked: usize,
    pub issues: Vec<LintIssue>,
}

impl LintReport {
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == severity)
            .count()
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    pub fn at_least(&self, severity: Severity) -> impl Iterator<Item = &LintIssue> {
        self.issues
            .iter()
            .filter(move |issue| issue.severity >= severity)
    }
}

/// Run every check over `catalog`.
#[must_use]
pub fn lint_catalog(catalog: &Catalog) -> LintReport {
    lint_technologies(catalog.technologies())
}

#[must_use]
pub fn lint_technologies(techs: &[Technology]) -> LintReport {
    let by_id: HashMap<&str, &Technology> = techs
        .iter()
        .rev()
        .map(|tech| (tech.id.as_str(), tech))
        .collect();
    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for tech in techs {
        if !seen.insert(tech.id.as_str()) {
            issues.push(LintIssue::new(&tech.id, LintKind::DuplicateId));
        }
        for (attribute, value) in tech.attributes() {
            if !(METRIC_MIN..=METRIC_MAX).contains(&value) {
                issues.push(LintIssue::new(
                    &tech.id,
                    LintKind::AttributeOutOfRange { attribute, value },
                ));
            }
        }
        check_compatibility(tech, &by_id, &mut issues);
        check_modifiers(tech, &by_id, &mut issues);
    }

    for issue in issues.iter().filter(|issue| issue.severity >= Severity::Warning) {
        log::warn!("catalog lint: {issue}");
    }
    LintReport {
        checked: techs.len(),
        issues,
    }
}

fn check_compatibility(
    tech: &Technology,
    by_id: &HashMap<&str, &Technology>,
    issues: &mut Vec<LintIssue>,
) {
    let Some(compat) = &tech.compatibility else {
        return;
    };
    let mut buckets: HashMap<&str, Relation> = HashMap::new();
    let mut conflicted = HashSet::new();
    for (relation, target) in compat.edges() {
        if let Some(previous) = buckets.insert(target, relation)
            && previous != relation
            && conflicted.insert(target)
        {
            issues.push(LintIssue::new(
                &tech.id,
                LintKind::ConflictingBuckets {
                    target: target.to_string(),
                },
            ));
        }
        let source = ReferenceSource::Compatibility(relation);
        if target == tech.id {
            issues.push(LintIssue::new(&tech.id, LintKind::SelfReference { source }));
            continue;
        }
        let Some(other) = by_id.get(target) else {
            issues.push(LintIssue::new(
                &tech.id,
                LintKind::DanglingTarget {
                    target: target.to_string(),
                    source,
                },
            ));
            continue;
        };
        let reciprocal = other.compatibility.as_ref().is_some_and(|back| {
            back.edges()
                .any(|(back_relation, back_target)| {
                    back_relation == relation && back_target == tech.id
                })
        });
        if !reciprocal {
            issues.push(LintIssue::new(
                &tech.id,
                LintKind::MissingReciprocal {
                    target: target.to_string(),
                    relation,
                },
            ));
        }
    }
}

fn check_modifiers(
    tech: &Technology,
    by_id: &HashMap<&str, &Technology>,
    issues: &mut Vec<LintIssue>,
) {
    for modifier in &tech.modifiers {
        let target = modifier.target_tech_id.as_str();
        if target == tech.id {
            issues.push(LintIssue::new(
                &tech.id,
                LintKind::SelfReference {
                    source: ReferenceSource::Modifier,
                },
            ));
        } else if !by_id.contains_key(target) {
            issues.push(LintIssue::new(
                &tech.id,
                LintKind::DanglingTarget {
                    target: target.to_string(),
                    source: ReferenceSource::Modifier,
                },
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tech::{Category, Compatibility, DevDelta, TechnologyModifier, UxDelta};

    fn tech(id: &str) -> Technology {
        Technology::uniform(id, Category::Library, 50.0)
    }

    fn kinds(report: &LintReport) -> Vec<&LintKind> {
        report.issues.iter().map(|issue| &issue.kind).collect()
    }

    #[test]
    fn clean_mutual_catalog_has_no_issues() {
        let a = tech("a").with_compatibility(Compatibility {
            preferred: vec!["b".into()],
            ..Compatibility::default()
        });
        let b = tech("b").with_compatibility(Compatibility {
            preferred: vec!["a".into()],
            ..Compatibility::default()
        });
        let report = lint_technologies(&[a, b]);
        assert!(report.issues.is_empty(), "{:?}", report.issues);
        assert_eq!(report.checked, 2);
    }

    #[test]
    fn duplicates_and_ranges_are_errors() {
        let mut broken = tech("a");
        broken.cost = 120.0;
        let report = lint_technologies(&[tech("a"), broken]);
        assert_eq!(
            kinds(&report),
            vec![
                &LintKind::DuplicateId,
                &LintKind::AttributeOutOfRange {
                    attribute: "cost",
                    value: 120.0
                },
            ]
        );
        assert!(report.has_errors());
    }

    #[test]
    fn conflicting_buckets_reported_once() {
        let a = tech("a").with_compatibility(Compatibility {
            preferred: vec!["b".into()],
            compatible: vec!["b".into()],
            incompatible: vec!["b".into()],
        });
        let b = tech("b").with_compatibility(Compatibility {
            preferred: vec!["a".into()],
            compatible: vec!["a".into()],
            incompatible: vec!["a".into()],
        });
        let report = lint_technologies(&[a, b]);
        let conflicts = report
            .issues
            .iter()
            .filter(|issue| matches!(issue.kind, LintKind::ConflictingBuckets { .. }))
            .count();
        assert_eq!(conflicts, 2);
        assert_eq!(report.count(Severity::Info), 0);
    }

    #[test]
    fn dangling_and_self_references_warn() {
        let a = tech("a")
            .with_compatibility(Compatibility {
                compatible: vec!["a".into(), "ghost".into()],
                ..Compatibility::default()
            })
            .with_modifier(TechnologyModifier::new(
                "webpack",
                UxDelta::new(1, 0, 0),
                DevDelta::default(),
            ));
        let report = lint_technologies(&[a]);
        assert_eq!(report.count(Severity::Warning), 3);
        assert!(!report.has_errors());
        let rendered: Vec<String> = report.issues.iter().map(ToString::to_string).collect();
        assert!(rendered[2].contains("modifier references unknown id 'webpack'"));
    }

    #[test]
    fn one_way_edges_are_informational() {
        let a = tech("a").with_compatibility(Compatibility {
            incompatible: vec!["b".into()],
            ..Compatibility::default()
        });
        let report = lint_technologies(&[a, tech("b")]);
        assert_eq!(
            kinds(&report),
            vec![&LintKind::MissingReciprocal {
                target: "b".into(),
                relation: Relation::Incompatible,
            }]
        );
        assert_eq!(report.at_least(Severity::Warning).count(), 0);
    }
}
