use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use tracing::info;
use uuid::Uuid;

use super::store::ScenarioStore;
use super::templates::{builtin_templates, find_template};
use crate::enhancements::calculate_enhanced;
use crate::error::WaterfallError;
use crate::types::*;
use crate::waterfall::*;
use crate::EngineResult;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Narrowing for `fetch_scenarios`. The default matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScenarioFilter {
    pub model: Option<WaterfallModel>,
    pub favorites_only: bool,
    pub templates_only: bool,
    /// Case-insensitive match on name, description or tags
    pub search: Option<String>,
}

impl ScenarioFilter {
    pub fn matches(&self, scenario: &WaterfallScenario) -> bool {
        if self.model.is_some_and(|m| m != scenario.model) {
            return false;
        }
        if self.favorites_only && !scenario.is_favorite {
            return false;
        }
        if self.templates_only && !scenario.is_template {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                scenario.name.to_lowercase().contains(&term)
                    || scenario
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&term))
                    || scenario.tags.iter().any(|t| t.to_lowercase().contains(&term))
            }
        }
    }
}

/// Merge patch for `update_scenario`: only the fields present are applied.
/// Identity, version and audit fields are not patchable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScenarioUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub model: Option<WaterfallModel>,
    pub exit_value: Option<Money>,
    pub total_invested: Option<Money>,
    pub management_fees: Option<Money>,
    pub investor_classes: Option<Vec<InvestorClass>>,
    pub tiers: Option<Vec<WaterfallTier>>,
    pub clawback_provision: Option<ClawbackProvision>,
    pub lookback_provision: Option<LookbackProvision>,
    pub blended_config: Option<BlendedConfig>,
    pub is_favorite: Option<bool>,
    pub is_template: Option<bool>,
    pub tags: Option<Vec<String>>,
}

impl ScenarioUpdate {
    fn apply(self, scenario: &mut WaterfallScenario) {
        if let Some(v) = self.name {
            scenario.name = v;
        }
        if let Some(v) = self.description {
            scenario.description = Some(v);
        }
        if let Some(v) = self.model {
            scenario.model = v;
        }
        if let Some(v) = self.exit_value {
            scenario.exit_value = v;
        }
        if let Some(v) = self.total_invested {
            scenario.total_invested = v;
        }
        if let Some(v) = self.management_fees {
            scenario.management_fees = v;
        }
        if let Some(v) = self.investor_classes {
            scenario.investor_classes = v;
        }
        if let Some(v) = self.tiers {
            scenario.tiers = v;
        }
        if let Some(v) = self.clawback_provision {
            scenario.clawback_provision = Some(v);
        }
        if let Some(v) = self.lookback_provision {
            scenario.lookback_provision = Some(v);
        }
        if let Some(v) = self.blended_config {
            scenario.blended_config = Some(v);
        }
        if let Some(v) = self.is_favorite {
            scenario.is_favorite = v;
        }
        if let Some(v) = self.is_template {
            scenario.is_template = v;
        }
        if let Some(v) = self.tags {
            scenario.tags = v;
        }
    }
}

/// What `perform_waterfall_calculation` should run.
#[derive(Debug, Clone, Copy)]
pub enum CalculationTarget<'a> {
    /// An unsaved or already-loaded scenario
    Scenario(&'a WaterfallScenario),
    /// A stored scenario id
    Id(&'a str),
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Scenario lifecycle plus the calculation entry point, over an injected
/// store. Mutations are serialised by the service so each read-modify-write
/// sees the previous one.
pub struct ScenarioService<S: ScenarioStore> {
    store: S,
    writer: Mutex<()>,
}

impl<S: ScenarioStore> ScenarioService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            writer: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn lock(&self) -> EngineResult<MutexGuard<'_, ()>> {
        self.writer
            .lock()
            .map_err(|_| WaterfallError::Storage("scenario service writer lock poisoned".into()))
    }

    /// Matching scenarios, most recently updated first.
    pub fn fetch_scenarios(&self, filter: &ScenarioFilter) -> EngineResult<Vec<WaterfallScenario>> {
        let mut scenarios: Vec<WaterfallScenario> = self
            .store
            .list()?
            .into_iter()
            .filter(|s| filter.matches(s))
            .collect();
        scenarios.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(scenarios)
    }

    pub fn get_scenario(&self, id: &str) -> EngineResult<WaterfallScenario> {
        self.store
            .get(id)?
            .ok_or_else(|| WaterfallError::ScenarioNotFound(id.to_string()))
    }

    /// Store a new scenario under a fresh id at version 1. Any id, version
    /// or timestamps on `draft` are replaced.
    pub fn create_scenario(&self, mut draft: WaterfallScenario) -> EngineResult<WaterfallScenario> {
        let _guard = self.lock()?;
        let now = Utc::now();
        draft.id = new_id();
        draft.version = 1;
        draft.created_at = now;
        draft.updated_at = now;

        self.store.put(draft.clone())?;
        info!(
            store = self.store.name(),
            id = %draft.id,
            name = %draft.name,
            model = %draft.model,
            "scenario created"
        );
        Ok(draft)
    }

    /// New scenario seeded from a built-in template.
    pub fn create_from_template(
        &self,
        template_id: &str,
        name: &str,
        created_by: &str,
    ) -> EngineResult<WaterfallScenario> {
        let mut draft = find_template(template_id)
            .ok_or_else(|| WaterfallError::ScenarioNotFound(template_id.to_string()))?;
        draft.name = name.to_string();
        draft.created_by = created_by.to_string();
        draft.is_template = false;
        draft.tags.retain(|t| t != "template");
        self.create_scenario(draft)
    }

    /// Store the built-in templates that are not already present.
    pub fn seed_templates(&self) -> EngineResult<usize> {
        let _guard = self.lock()?;
        let mut seeded = 0;
        for mut template in builtin_templates() {
            if self.store.get(&template.id)?.is_none() {
                let now = Utc::now();
                template.created_at = now;
                template.updated_at = now;
                self.store.put(template)?;
                seeded += 1;
            }
        }
        if seeded > 0 {
            info!(store = self.store.name(), seeded, "scenario templates seeded");
        }
        Ok(seeded)
    }

    /// Apply a merge patch. Bumps `version` by one and refreshes `updatedAt`.
    pub fn update_scenario(&self, id: &str, patch: ScenarioUpdate) -> EngineResult<WaterfallScenario> {
        let _guard = self.lock()?;
        let mut scenario = self.get_scenario(id)?;
        patch.apply(&mut scenario);
        self.commit(&mut scenario)?;
        info!(store = self.store.name(), id, version = scenario.version, "scenario updated");
        Ok(scenario)
    }

    /// Copy under a new id: version 1, name suffixed " (Copy)", not a
    /// favorite and not a template.
    pub fn duplicate_scenario(&self, id: &str) -> EngineResult<WaterfallScenario> {
        let _guard = self.lock()?;
        let mut copy = self.get_scenario(id)?;
        let now = Utc::now();
        copy.id = new_id();
        copy.name = format!("{} (Copy)", copy.name);
        copy.version = 1;
        copy.is_favorite = false;
        copy.is_template = false;
        copy.created_at = now;
        copy.updated_at = now;

        self.store.put(copy.clone())?;
        info!(store = self.store.name(), source = id, id = %copy.id, "scenario duplicated");
        Ok(copy)
    }

    pub fn delete_scenario(&self, id: &str) -> EngineResult<()> {
        let _guard = self.lock()?;
        if !self.store.delete(id)? {
            return Err(WaterfallError::ScenarioNotFound(id.to_string()));
        }
        info!(store = self.store.name(), id, "scenario deleted");
        Ok(())
    }

    /// Flip `isFavorite`. Counts as a mutation, so the version moves too.
    pub fn toggle_favorite(&self, id: &str) -> EngineResult<WaterfallScenario> {
        let _guard = self.lock()?;
        let mut scenario = self.get_scenario(id)?;
        scenario.is_favorite = !scenario.is_favorite;
        self.commit(&mut scenario)?;
        info!(
            store = self.store.name(),
            id,
            favorite = scenario.is_favorite,
            "scenario favorite toggled"
        );
        Ok(scenario)
    }

    /// Route by model, attach enabled clawback/lookback analyses and return
    /// the composed results.
    pub fn perform_waterfall_calculation(
        &self,
        target: CalculationTarget<'_>,
        options: &CalculationOptions,
    ) -> EngineResult<WaterfallResults> {
        match target {
            CalculationTarget::Scenario(scenario) => run(scenario, options),
            CalculationTarget::Id(id) => run(&self.get_scenario(id)?, options),
        }
    }

    fn commit(&self, scenario: &mut WaterfallScenario) -> EngineResult<()> {
        scenario.version += 1;
        scenario.updated_at = later_than(scenario.updated_at);
        self.store.put(scenario.clone())
    }
}

fn run(scenario: &WaterfallScenario, options: &CalculationOptions) -> EngineResult<WaterfallResults> {
    info!(id = %scenario.id, model = %scenario.model, exit_value = %scenario.exit_value, "calculating waterfall");
    calculate_enhanced(scenario, options)
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current time, never earlier than `previous`.
fn later_than(previous: DateTime<Utc>) -> DateTime<Utc> {
    Utc::now().max(previous)
}
