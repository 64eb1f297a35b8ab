pub mod allocation;
pub mod enhancements;
pub mod error;
pub mod types;
pub mod waterfall;

#[cfg(feature = "sensitivity")]
pub mod sensitivity;

#[cfg(feature = "scenario_service")]
pub mod scenario;

pub use error::WaterfallError;

/// Standard result type for all engine operations
pub type EngineResult<T> = Result<T, WaterfallError>;
