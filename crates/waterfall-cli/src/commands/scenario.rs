use clap::{Args, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

use waterfall_core::scenario::{
    builtin_templates, CalculationTarget, JsonFileScenarioStore, ScenarioFilter, ScenarioService,
    ScenarioUpdate,
};
use waterfall_core::waterfall::{CalculationOptions, WaterfallModel, WaterfallScenario};

use super::calculate::calculation_envelope;
use super::{read_document, BasisArg};
use crate::config::CliConfig;

/// Arguments for scenario management
#[derive(Args)]
pub struct ScenarioArgs {
    /// Scenario store file (defaults to the configured path, then scenarios.json)
    #[arg(long)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub action: ScenarioAction,
}

#[derive(Subcommand)]
pub enum ScenarioAction {
    /// List stored scenarios, most recently updated first
    List {
        /// Only scenarios of this model (european, american, blended)
        #[arg(long)]
        model: Option<WaterfallModel>,
        #[arg(long)]
        favorites: bool,
        #[arg(long)]
        templates: bool,
        /// Case-insensitive text match on name, description or tags
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one scenario
    Show { id: String },
    /// Store a new scenario from a JSON document
    Create {
        #[arg(long)]
        input: Option<String>,
    },
    /// Create a scenario from a built-in template
    FromTemplate {
        template: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        created_by: String,
    },
    /// Merge a JSON patch into a scenario
    Update {
        id: String,
        #[arg(long)]
        input: Option<String>,
    },
    /// Copy a scenario under a new id
    Duplicate { id: String },
    /// Remove a scenario
    Delete { id: String },
    /// Flip a scenario's favorite flag
    Favorite { id: String },
    /// Store any built-in templates that are missing
    Seed,
    /// Run the waterfall for a stored scenario
    Calculate {
        id: String,
        #[arg(long, value_enum, default_value_t = BasisArg::Commitment)]
        basis: BasisArg,
    },
}

pub fn run_scenario(
    args: ScenarioArgs,
    config: &CliConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let path = args.store.unwrap_or_else(|| config.store_path());
    let service = ScenarioService::new(JsonFileScenarioStore::open(&path)?);

    let value = match args.action {
        ScenarioAction::List {
            model,
            favorites,
            templates,
            search,
        } => {
            let filter = ScenarioFilter {
                model,
                favorites_only: favorites,
                templates_only: templates,
                search,
            };
            let rows: Vec<Value> = service
                .fetch_scenarios(&filter)?
                .iter()
                .map(summary)
                .collect();
            Value::Array(rows)
        }
        ScenarioAction::Show { id } => serde_json::to_value(service.get_scenario(&id)?)?,
        ScenarioAction::Create { input } => {
            let draft: WaterfallScenario = read_document(input.as_deref(), "scenario create")?;
            serde_json::to_value(service.create_scenario(draft)?)?
        }
        ScenarioAction::FromTemplate {
            template,
            name,
            created_by,
        } => serde_json::to_value(service.create_from_template(&template, &name, &created_by)?)?,
        ScenarioAction::Update { id, input } => {
            let patch: ScenarioUpdate = read_document(input.as_deref(), "scenario update")?;
            serde_json::to_value(service.update_scenario(&id, patch)?)?
        }
        ScenarioAction::Duplicate { id } => serde_json::to_value(service.duplicate_scenario(&id)?)?,
        ScenarioAction::Delete { id } => {
            service.delete_scenario(&id)?;
            serde_json::json!({ "deleted": id })
        }
        ScenarioAction::Favorite { id } => serde_json::to_value(service.toggle_favorite(&id)?)?,
        ScenarioAction::Seed => serde_json::json!({
            "seeded": service.seed_templates()?,
            "store": service.store().path(),
        }),
        ScenarioAction::Calculate { id, basis } => {
            let scenario = service.get_scenario(&id)?;
            let options: CalculationOptions = basis.into();
            calculation_envelope(&scenario, &options, || {
                service.perform_waterfall_calculation(CalculationTarget::Id(&id), &options)
            })?
        }
    };
    Ok(value)
}

pub fn run_templates() -> Result<Value, Box<dyn std::error::Error>> {
    Ok(Value::Array(builtin_templates().iter().map(summary).collect()))
}

fn summary(s: &WaterfallScenario) -> Value {
    serde_json::json!({
        "id": s.id,
        "name": s.name,
        "model": s.model,
        "exitValue": s.exit_value,
        "totalInvested": s.total_invested,
        "version": s.version,
        "isFavorite": s.is_favorite,
        "isTemplate": s.is_template,
        "updatedAt": s.updated_at,
    })
}
