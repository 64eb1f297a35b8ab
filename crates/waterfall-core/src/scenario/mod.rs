//! Scenario persistence and the calculation entry point over stored
//! scenarios.

pub mod service;
pub mod store;
pub mod templates;

pub use service::{CalculationTarget, ScenarioFilter, ScenarioService, ScenarioUpdate};
pub use store::{JsonFileScenarioStore, MemoryScenarioStore, ScenarioStore};
pub use templates::{builtin_templates, find_template};
