//! Ordering and labelling of catalog entries against the current selection.
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

use crate::constants::{
    COMPATIBLE_LABEL_ABOVE, COMPATIBLE_SCORE, HARD_BELOW, INCOMPATIBLE_LABEL_BELOW,
    INCOMPATIBLE_SCORE, MEDIUM_BELOW, MODIFIER_PRESENCE_SCORE, PREFERRED_SCORE,
    RECOMMENDED_LABEL_ABOVE, SIMPLE_BELOW,
};
use crate::schema::AppSchema;
use crate::tech::{Technology, TechnologyModifier};

/// Annotation shown next to a candidate technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RecommendationLabel {
    Incompatible,
    Recommended,
    Compatible,
    Simple,
    Medium,
    Hard,
    VeryHard,
}

impl RecommendationLabel {
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Incompatible => "Incompatible",
            Self::Recommended => "Recommended",
            Self::Compatible => "Compatible",
            Self::Simple => "Simple",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
            Self::VeryHard => "Very Hard",
        }
    }
}

impl fmt::Display for RecommendationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

fn modifier_score(modifier: &TechnologyModifier) -> i64 {
    MODIFIER_PRESENCE_SCORE
        + i64::from(modifier.ux.net().max(0))
        + i64::from(modifier.dev.net().max(0))
}

/// Score of `tech` against one selected technology, both directions included.
///
/// Mutual relations count twice. Net-negative modifiers floor at zero here
/// even though they subtract in the metrics.
#[must_use]
pub fn pairwise_score(tech: &Technology, selected: &Technology) -> i64 {
    let mut score = 0;
    for (from, to) in [(selected, tech), (tech, selected)] {
        if from.prefers(&to.id) {
            score += PREFERRED_SCORE;
        }
        if from.accepts(&to.id) {
            score += COMPATIBLE_SCORE;
        }
        if from.rejects(&to.id) {
            score += INCOMPATIBLE_SCORE;
        }
    }
    score += tech
        .modifiers_targeting(&selected.id)
        .chain(selected.modifiers_targeting(&tech.id))
        .map(modifier_score)
        .sum::<i64>();
    score
}

/// Sum of [`pairwise_score`] over every selected technology.
#[must_use]
pub fn recommendation_score(tech: &Technology, selected: &[&Technology]) -> i64 {
    selected.iter().map(|s| pairwise_score(tech, s)).sum()
}

// Raw complexity; zero is a real value, not replaced by a default.
fn by_complexity(a: &Technology, b: &Technology) -> Ordering {
    a.complexity.total_cmp(&b.complexity)
}

/// Order `candidates` for the picker given the `selected` technologies.
///
/// All sorts are stable, so remaining ties keep input order.
#[must_use]
pub fn rank_candidates<'a>(
    candidates: &'a [Technology],
    selected: &[&Technology],
) -> Vec<&'a Technology> {
    let mut ranked: Vec<&Technology> = candidates.iter().collect();
    match selected {
        [] => ranked.sort_by(|a, b| by_complexity(a, b)),
        [only] => {
            let mut scored: Vec<_> = ranked
                .into_iter()
                .map(|tech| (pairwise_score(tech, only), tech))
                .collect();
            scored.sort_by(|(sa, _), (sb, _)| sb.cmp(sa));
            ranked = scored.into_iter().map(|(_, tech)| tech).collect();
        }
        many => {
            let mut scored: Vec<_> = ranked
                .into_iter()
                .map(|tech| (recommendation_score(tech, many), tech))
                .collect();
            scored.sort_by(|(sa, a), (sb, b)| sb.cmp(sa).then_with(|| by_complexity(a, b)));
            ranked = scored.into_iter().map(|(_, tech)| tech).collect();
        }
    }
    ranked
}

/// Rank the whole catalog against the technologies placed in `schema`.
#[must_use]
pub fn rank_technologies(catalog: &[Technology], schema: &AppSchema) -> Vec<Technology> {
    rank_candidates(catalog, &schema.technologies())
        .into_iter()
        .cloned()
        .collect()
}

/// Label for `tech`: compatibility with the selection, or difficulty when empty.
#[must_use]
pub fn recommendation_label(
    tech: &Technology,
    selected: &[&Technology],
) -> Option<RecommendationLabel> {
    if selected.is_empty() {
        // zero complexity labels as Simple
        return Some(difficulty_label(tech.complexity));
    }
    let score = recommendation_score(tech, selected);
    if score < INCOMPATIBLE_LABEL_BELOW {
        Some(RecommendationLabel::Incompatible)
    } else if score > RECOMMENDED_LABEL_ABOVE {
        Some(RecommendationLabel::Recommended)
    } else if score > COMPATIBLE_LABEL_ABOVE {
        Some(RecommendationLabel::Compatible)
    } else {
        None
    }
}

#[must_use]
pub fn difficulty_label(complexity: f64) -> RecommendationLabel {
    if complexity < SIMPLE_BELOW {
        RecommendationLabel::Simple
    } else if complexity < MEDIUM_BELOW {
        RecommendationLabel::Medium
    } else if complexity < HARD_BELOW {
        RecommendationLabel::Hard
    } else {
        RecommendationLabel::VeryHard
    }
}

/// A ranked candidate with its score and label, for reports.
#[derive(Debug, Clone, Serialize)]
pub struct RankedEntry<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub score: i64,
    pub complexity: f64,
    pub label: Option<RecommendationLabel>,
}

/// [`rank_candidates`] with scores and labels attached.
#[must_use]
pub fn ranked_entries<'a>(
    candidates: &'a [Technology],
    selected: &[&Technology],
) -> Vec<RankedEntry<'a>> {
    rank_candidates(candidates, selected)
        .into_iter()
        .map(|tech| RankedEntry {
            id: &tech.id,
            name: &tech.name,
            score: recommendation_score(tech, selected),
            complexity: tech.complexity,
            label: recommendation_label(tech, selected),
        })
        .collect()
}
