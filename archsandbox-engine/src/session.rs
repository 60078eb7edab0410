//! Sandbox session: a schema plus the pre-condition checks around editing it.
use thiserror::Error;

use crate::app_types::{AppType, RequirementReport, check_requirements};
use crate::budget::{Budget, tech_cost};
use crate::catalog::Catalog;
use crate::constants::{DEFAULT_BUDGET, DEFAULT_HISTORY_DEPTH};
use crate::history::SchemaHistory;
use crate::metrics::{AppMetrics, MetricsBreakdown, compute_metrics, explain_metrics};
use crate::ranking::rank_technologies;
use crate::schema::{AppSchema, ImportError, Panel, View};
use crate::tech::{Category, Technology};

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("cannot afford {tech_id}: costs ${cost:.0}, ${remaining:.0} remaining")]
    Unaffordable {
        tech_id: String,
        cost: f64,
        remaining: f64,
    },
    #[error("{view} already has a {} ({existing}); remove it first", .category.display_name())]
    CategoryOccupied {
        view: View,
        category: Category,
        existing: String,
    },
    #[error("no panel with id '{0}'")]
    UnknownPanel(String),
    #[error(transparent)]
    Import(#[from] ImportError),
}

/// Editable sandbox state. Every mutation is checked before it is applied
/// and can be undone.
#[derive(Debug, Clone)]
pub struct SandboxSession {
    schema: AppSchema,
    budget_total: f64,
    history: SchemaHistory,
}

impl Default for SandboxSession {
    fn default() -> Self {
        Self::new(DEFAULT_BUDGET)
    }
}

impl SandboxSession {
    #[must_use]
    pub fn new(budget_total: f64) -> Self {
        Self::with_history_depth(budget_total, DEFAULT_HISTORY_DEPTH)
    }

    #[must_use]
    pub fn with_history_depth(budget_total: f64, depth: usize) -> Self {
        Self {
            schema: AppSchema::new(),
            budget_total,
            history: SchemaHistory::new(depth),
        }
    }

    /// Session starting from an existing schema, with empty history.
    #[must_use]
    pub fn from_schema(schema: AppSchema, budget_total: f64) -> Self {
        Self {
            schema,
            ..Self::new(budget_total)
        }
    }

    #[must_use]
    pub const fn schema(&self) -> &AppSchema {
        &self.schema
    }

    #[must_use]
    pub fn into_schema(self) -> AppSchema {
        self.schema
    }

    /// Budget with spending derived from the panels currently placed.
    #[must_use]
    pub fn budget(&self) -> Budget {
        Budget::for_schema(self.budget_total, &self.schema)
    }

    /// Place `tech` in `view`, linked to the last panel already there.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::CategoryOccupied`] if the view already holds a
    /// single-instance category, or [`SessionError::Unaffordable`] if the
    /// remaining budget is too small. The schema is untouched on error.
    pub fn add_technology(&mut self, view: View, tech: Technology) -> Result<&Panel, SessionError> {
        if !tech.category.allows_multiple()
            && let Some(existing) = self.schema.panel_with_category(view, tech.category)
        {
            return Err(SessionError::CategoryOccupied {
                view,
                category: tech.category,
                existing: existing.technology.name.clone(),
            });
        }
        let budget = self.budget();
        if !budget.can_afford(&tech) {
            return Err(SessionError::Unaffordable {
                cost: tech_cost(&tech),
                remaining: budget.remaining,
                tech_id: tech.id,
            });
        }

        self.history.record(self.schema.clone());
        let id = self.schema.next_panel_id(view);
        let mut panel = Panel::new(id, tech);
        if let Some(last) = self.schema.panels(view).last() {
            panel.connections.push(last.id.clone());
        }
        log::debug!("placed {} on {view} as {}", panel.technology.id, panel.id);
        let panels = self.schema.panels_mut(view);
        panels.push(panel);
        Ok(&panels[panels.len() - 1])
    }

    /// Remove a panel from whichever view holds it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownPanel`] if no panel has that id.
    pub fn remove_panel(&mut self, panel_id: &str) -> Result<Panel, SessionError> {
        let Some((view, _)) = self.schema.find_panel(panel_id) else {
            return Err(SessionError::UnknownPanel(panel_id.to_string()));
        };
        self.history.record(self.schema.clone());
        let panels = self.schema.panels_mut(view);
        let position = panels
            .iter()
            .position(|panel| panel.id == panel_id)
            .ok_or_else(|| SessionError::UnknownPanel(panel_id.to_string()))?;
        Ok(panels.remove(position))
    }

    /// Update a panel's canvas position. Not recorded in history.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownPanel`] if no panel has that id.
    pub fn move_panel(&mut self, panel_id: &str, x: f64, y: f64) -> Result<(), SessionError> {
        let panel = self
            .schema
            .frontend
            .iter_mut()
            .chain(self.schema.backend.iter_mut())
            .find(|panel| panel.id == panel_id);
        match panel {
            Some(panel) => {
                panel.x = x;
                panel.y = y;
                Ok(())
            }
            None => Err(SessionError::UnknownPanel(panel_id.to_string())),
        }
    }

    /// Remove every panel from `view`, returning how many were removed.
    pub fn clear_view(&mut self, view: View) -> usize {
        let removed = self.schema.panels(view).len();
        if removed > 0 {
            self.history.record(self.schema.clone());
            self.schema.panels_mut(view).clear();
        }
        removed
    }

    /// Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.undo(self.schema.clone()) {
            Some(previous) => {
                self.schema = previous;
                true
            }
            None => false,
        }
    }

    /// Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.history.redo(self.schema.clone()) {
            Some(next) => {
                self.schema = next;
                true
            }
            None => false,
        }
    }

    /// Replace the schema with a JSON dump. Nothing changes if the dump is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Import`] if the dump is malformed.
    pub fn import_json(&mut self, json: &str) -> Result<(), SessionError> {
        let imported = AppSchema::from_json(json)?;
        self.history.record(std::mem::replace(&mut self.schema, imported));
        Ok(())
    }

    /// Serialize the current schema.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        self.schema.to_json()
    }

    #[must_use]
    pub fn metrics(&self) -> AppMetrics {
        compute_metrics(&self.schema)
    }

    #[must_use]
    pub fn explain(&self) -> Option<MetricsBreakdown> {
        explain_metrics(&self.schema)
    }

    /// Catalog ordered for the picker against the current selection.
    #[must_use]
    pub fn ranked(&self, catalog: &Catalog) -> Vec<Technology> {
        rank_technologies(catalog.technologies(), &self.schema)
    }

    #[must_use]
    pub fn check_app_type(&self, app_type: &AppType) -> RequirementReport {
        check_requirements(&self.metrics(), app_type)
    }
}
