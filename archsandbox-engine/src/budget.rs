//! Project budget in dollars derived from technology cost ratings.
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BUDGET, DOLLARS_PER_COST_POINT, FREE_FRAMEWORK_COST_BELOW, HEAVY_SERVICE_FACTOR,
    HEAVY_SERVICES, PREMIUM_DATABASE_COST_ABOVE, PREMIUM_DATABASE_FACTOR,
};
use crate::schema::AppSchema;
use crate::tech::{Category, Technology};

/// Dollar price of adding `tech` to a project.
#[must_use]
pub fn tech_cost(tech: &Technology) -> f64 {
    let base = tech.cost * DOLLARS_PER_COST_POINT;
    match tech.category {
        Category::Language => 0.0,
        Category::Framework if tech.cost < FREE_FRAMEWORK_COST_BELOW => 0.0,
        Category::Database if tech.cost > PREMIUM_DATABASE_COST_ABOVE => {
            base * PREMIUM_DATABASE_FACTOR
        }
        Category::Service if HEAVY_SERVICES.contains(&tech.id.as_str()) => {
            base * HEAVY_SERVICE_FACTOR
        }
        _ => base,
    }
}

#[must_use]
pub fn total_cost<'a>(techs: impl IntoIterator<Item = &'a Technology>) -> f64 {
    techs.into_iter().map(tech_cost).sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub total: f64,
    pub spent: f64,
    pub remaining: f64,
}

impl Default for Budget {
    fn default() -> Self {
        Self::new(DEFAULT_BUDGET)
    }
}

impl Budget {
    #[must_use]
    pub const fn new(total: f64) -> Self {
        Self {
            total,
            spent: 0.0,
            remaining: total,
        }
    }

    /// Budget with `spent` taken from what `schema` currently holds.
    #[must_use]
    pub fn for_schema(total: f64, schema: &AppSchema) -> Self {
        let spent = total_cost(schema.technologies());
        Self {
            total,
            spent,
            remaining: total - spent,
        }
    }

    #[must_use]
    pub fn can_afford(&self, tech: &Technology) -> bool {
        self.remaining >= tech_cost(tech)
    }

    /// Charge `amount`, or `None` if it exceeds what remains.
    #[must_use]
    pub fn charge(&self, amount: f64) -> Option<Self> {
        if self.remaining < amount {
            return None;
        }
        Some(Self {
            total: self.total,
            spent: self.spent + amount,
            remaining: self.remaining - amount,
        })
    }

    /// Share of the total already spent, in percent. Zero when the total is zero.
    #[must_use]
    pub fn usage_percent(&self) -> f64 {
        if self.total == 0.0 {
            return 0.0;
        }
        self.spent / self.total * 100.0
    }
}
