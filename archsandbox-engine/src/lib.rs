//! Architecture Sandbox Engine
//!
//! Platform-agnostic scoring and recommendation logic for the architecture
//! sandbox game. Users place technologies on a Frontend/Backend canvas and
//! this crate scores the resulting stack. No UI or I/O lives here.

pub mod app_types;
pub mod budget;
pub mod catalog;
pub mod constants;
pub mod history;
pub mod interactions;
pub mod legacy;
pub mod lint;
pub mod metrics;
pub mod numbers;
pub mod ranking;
pub mod rules;
pub mod schema;
pub mod session;
pub mod tech;

use serde::Serialize;

// Re-export commonly used types
pub use app_types::{
    AppType, AppTypes, RequirementIssue, RequirementReport, Requirements, Shortfall,
    app_type_bonus, check_requirements,
};
pub use budget::{Budget, tech_cost, total_cost};
pub use catalog::{Catalog, CatalogError, EmbeddedCatalogLoader, builtin_catalog};
pub use history::SchemaHistory;
pub use interactions::{ModifierInfo, format_modifier, interactions_for};
pub use legacy::LegacyTechnology;
pub use lint::{LintIssue, LintKind, LintReport, Severity, lint_catalog};
pub use metrics::{
    AppMetrics, DevMetrics, MetricDelta, MetricsBreakdown, UxMetrics, compute_metrics,
    explain_metrics, metrics_for_technologies,
};
pub use ranking::{
    RankedEntry, RecommendationLabel, pairwise_score, rank_candidates, rank_technologies,
    ranked_entries, recommendation_label, recommendation_score,
};
pub use schema::{AppSchema, ImportError, Panel, View};
pub use session::{SandboxSession, SessionError};
pub use tech::{
    Category, Compatibility, DevDelta, Relation, Technology, TechnologyModifier, UxDelta,
};

/// Trait for abstracting catalog loading
/// Platform-specific implementations should provide this
pub trait CatalogLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the technology catalog with modifiers merged in
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or parsed.
    fn load_catalog(&self) -> Result<Catalog, Self::Error>;

    /// Load the project type definitions
    ///
    /// # Errors
    ///
    /// Returns an error if the app types cannot be loaded or parsed.
    fn load_app_types(&self) -> Result<AppTypes, Self::Error>;
}

/// Trait for abstracting save/load of schemas
/// Platform-specific implementations should provide this
pub trait SchemaStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save a schema under `slot`
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be saved.
    fn save_schema(&self, slot: &str, schema: &AppSchema) -> Result<(), Self::Error>;

    /// Load the schema stored under `slot`
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be loaded.
    fn load_schema(&self, slot: &str) -> Result<Option<AppSchema>, Self::Error>;

    /// Delete the schema stored under `slot`
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be deleted.
    fn delete_schema(&self, slot: &str) -> Result<(), Self::Error>;
}

/// Metrics, layer breakdown and spending for one schema.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaEvaluation {
    pub metrics: AppMetrics,
    pub breakdown: Option<MetricsBreakdown>,
    pub budget: Budget,
    /// Up to five catalog ids ranked best for the current selection.
    pub suggestions: Vec<String>,
}

/// Main engine wiring a catalog source to schema storage
pub struct SandboxEngine<L, S>
where
    L: CatalogLoader,
    S: SchemaStorage,
{
    loader: L,
    storage: S,
}

impl<L, S> SandboxEngine<L, S>
where
    L: CatalogLoader,
    S: SchemaStorage,
{
    /// Create a new engine with the provided catalog loader and storage
    pub const fn new(loader: L, storage: S) -> Self {
        Self { loader, storage }
    }

    /// Load the catalog from the configured source
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    pub fn catalog(&self) -> Result<Catalog, L::Error> {
        self.loader.load_catalog()
    }

    /// Load the app types from the configured source
    ///
    /// # Errors
    ///
    /// Returns an error if the app types cannot be loaded.
    pub fn app_types(&self) -> Result<AppTypes, L::Error> {
        self.loader.load_app_types()
    }

    /// Score a schema and suggest what to add next
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    pub fn evaluate(
        &self,
        schema: &AppSchema,
        budget_total: f64,
    ) -> Result<SchemaEvaluation, L::Error> {
        let catalog = self.loader.load_catalog()?;
        let suggestions = rank_technologies(catalog.technologies(), schema)
            .into_iter()
            .filter(|tech| !schema.contains_tech(&tech.id))
            .take(5)
            .map(|tech| tech.id)
            .collect();
        Ok(SchemaEvaluation {
            metrics: compute_metrics(schema),
            breakdown: explain_metrics(schema),
            budget: Budget::for_schema(budget_total, schema),
            suggestions,
        })
    }

    /// Save a schema
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be saved.
    pub fn save_schema(&self, slot: &str, schema: &AppSchema) -> Result<(), S::Error> {
        self.storage.save_schema(slot, schema)
    }

    /// Load a schema and refresh its technologies from the catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be loaded or the catalog is unavailable.
    pub fn load_schema(&self, slot: &str) -> Result<Option<AppSchema>, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
        S::Error: Into<anyhow::Error>,
    {
        if let Some(mut schema) = self.storage.load_schema(slot).map_err(Into::into)? {
            // Rehydrate with fresh catalog data
            let catalog = self.loader.load_catalog().map_err(Into::into)?;
            let refreshed = schema.refresh_from(&catalog);
            log::debug!("loaded schema '{slot}', refreshed {refreshed} panels");
            Ok(Some(schema))
        } else {
            Ok(None)
        }
    }

    /// Delete a saved schema
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be deleted.
    pub fn delete_schema(&self, slot: &str) -> Result<(), S::Error> {
        self.storage.delete_schema(slot)
    }
}
