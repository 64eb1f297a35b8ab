use thiserror::Error;

#[derive(Debug, Error)]
pub enum WaterfallError {
    #[error("Unsupported waterfall model: {0}")]
    UnsupportedModel(String),

    #[error("Invalid tier configuration: {tier_id} — {reason}")]
    InvalidTierConfiguration { tier_id: String, reason: String },

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl WaterfallError {
    pub(crate) fn tier(tier_id: &str, reason: impl Into<String>) -> Self {
        WaterfallError::InvalidTierConfiguration {
            tier_id: tier_id.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn overflow(context: &str) -> Self {
        WaterfallError::Overflow {
            context: context.to_string(),
        }
    }
}

impl From<serde_json::Error> for WaterfallError {
    fn from(e: serde_json::Error) -> Self {
        WaterfallError::SerializationError(e.to_string())
    }
}
