//! Human readable view of the hidden modifiers between a candidate and the selection.
use serde::Serialize;

use crate::tech::{DevDelta, Technology, TechnologyModifier, UxDelta};

/// Combined modifier deltas between a candidate and one selected technology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifierInfo {
    pub tech_id: String,
    pub tech_name: String,
    pub ux: UxDelta,
    pub dev: DevDelta,
}

impl ModifierInfo {
    fn new(partner: &Technology, modifier: &TechnologyModifier) -> Self {
        Self {
            tech_id: partner.id.clone(),
            tech_name: partner.name.clone(),
            ux: modifier.ux,
            dev: modifier.dev,
        }
    }

    fn merge(&mut self, modifier: &TechnologyModifier) {
        let (ux, dev) = (&mut self.ux, &mut self.dev);
        ux.performance = ux.performance.saturating_add(modifier.ux.performance);
        ux.stability = ux.stability.saturating_add(modifier.ux.stability);
        ux.user_friendliness = ux
            .user_friendliness
            .saturating_add(modifier.ux.user_friendliness);
        dev.development_speed = dev
            .development_speed
            .saturating_add(modifier.dev.development_speed);
        dev.maintainability = dev
            .maintainability
            .saturating_add(modifier.dev.maintainability);
        dev.complexity = dev.complexity.saturating_add(modifier.dev.complexity);
        dev.cost = dev.cost.saturating_add(modifier.dev.cost);
    }

    /// Formatted non-zero UX deltas.
    #[must_use]
    pub fn ux_lines(&self) -> Vec<String> {
        format_nonzero(&[
            (self.ux.performance, "Performance"),
            (self.ux.stability, "Stability"),
            (self.ux.user_friendliness, "User friendliness"),
        ])
    }

    /// Formatted non-zero developer deltas.
    #[must_use]
    pub fn dev_lines(&self) -> Vec<String> {
        format_nonzero(&[
            (self.dev.development_speed, "Development speed"),
            (self.dev.maintainability, "Maintainability"),
            (self.dev.complexity, "Complexity"),
            (self.dev.cost, "Cost"),
        ])
    }
}

fn format_nonzero(values: &[(i32, &str)]) -> Vec<String> {
    values
        .iter()
        .filter(|(value, _)| *value != 0)
        .map(|&(value, label)| format_modifier(value, label))
        .collect()
}

/// `+5% Performance`, `-3% Cost`.
#[must_use]
pub fn format_modifier(value: i32, label: &str) -> String {
    if value > 0 {
        format!("+{value}% {label}")
    } else {
        format!("{value}% {label}")
    }
}

fn first_effective<'a>(source: &'a Technology, target: &'a str) -> Option<&'a TechnologyModifier> {
    source
        .modifiers_targeting(target)
        .next()
        .filter(|modifier| modifier.has_effect())
}

/// Modifier deltas between `tech` and each selected technology, both directions.
///
/// Only the first modifier per direction is considered. Deltas flowing
/// back from a selected technology merge into the entry for that partner.
#[must_use]
pub fn interactions_for(tech: &Technology, selected: &[&Technology]) -> Vec<ModifierInfo> {
    let mut infos: Vec<ModifierInfo> = Vec::new();
    for partner in selected {
        if let Some(modifier) = first_effective(tech, &partner.id) {
            infos.push(ModifierInfo::new(partner, modifier));
        }
        if let Some(modifier) = first_effective(partner, &tech.id) {
            match infos.iter_mut().find(|info| info.tech_id == partner.id) {
                Some(existing) => existing.merge(modifier),
                None => infos.push(ModifierInfo::new(partner, modifier)),
            }
        }
    }
    infos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tech::Category;

    fn tech(id: &str) -> Technology {
        Technology::uniform(id, Category::Library, 50.0)
    }

    #[test]
    fn both_directions_merge_per_partner() {
        let candidate = tech("ts").with_modifier(TechnologyModifier::new(
            "react",
            UxDelta::new(0, 10, 0),
            DevDelta::new(0, 5, 0, 0),
        ));
        let react = tech("react").with_modifier(TechnologyModifier::new(
            "ts",
            UxDelta::new(0, 2, 0),
            DevDelta::new(3, 0, 0, 0),
        ));
        let infos = interactions_for(&candidate, &[&react]);
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].tech_id, "react");
        assert_eq!(infos[0].ux.stability, 12);
        assert_eq!(infos[0].dev, DevDelta::new(3, 5, 0, 0));
        assert_eq!(infos[0].ux_lines(), vec!["+12% Stability"]);
        assert_eq!(
            infos[0].dev_lines(),
            vec!["+3% Development speed", "+5% Maintainability"]
        );
    }

    #[test]
    fn first_modifier_wins_and_empty_ones_are_skipped() {
        let candidate = tech("a")
            .with_modifier(TechnologyModifier::new(
                "b",
                UxDelta::default(),
                DevDelta::default(),
            ))
            .with_modifier(TechnologyModifier::new(
                "b",
                UxDelta::new(9, 0, 0),
                DevDelta::default(),
            ));
        let infos = interactions_for(&candidate, &[&tech("b")]);
        assert!(infos.is_empty());
    }

    #[test]
    fn reverse_only_modifier_creates_entry() {
        let partner = tech("redis").with_modifier(TechnologyModifier::new(
            "node",
            UxDelta::new(8, 0, 0),
            DevDelta::new(0, 0, 2, 0),
        ));
        let infos = interactions_for(&tech("node"), &[&partner]);
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].dev_lines(), vec!["+2% Complexity"]);
    }

    #[test]
    fn formats_signs() {
        assert_eq!(format_modifier(5, "Performance"), "+5% Performance");
        assert_eq!(format_modifier(-3, "Cost"), "-3% Cost");
        assert_eq!(format_modifier(0, "Cost"), "0% Cost");
    }
}
