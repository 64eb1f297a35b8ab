pub mod allocation;
pub mod calculate;
pub mod scenario;
pub mod sensitivity;

use clap::ValueEnum;
use serde::de::DeserializeOwned;

use waterfall_core::waterfall::{CalculationOptions, InvestedBasis};

use crate::input;

/// Read a typed document from `--input`, falling back to piped stdin.
pub(crate) fn read_document<T: DeserializeOwned>(
    path: Option<&str>,
    what: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        input::read_json(path)
    } else if let Some(data) = input::read_stdin()? {
        Ok(serde_json::from_value(data)?)
    } else {
        Err(format!("--input <file.json> or stdin required for {what}").into())
    }
}

/// How LP pro-rata shares are measured
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum BasisArg {
    #[default]
    Commitment,
    CapitalCalled,
}

impl From<BasisArg> for CalculationOptions {
    fn from(basis: BasisArg) -> Self {
        CalculationOptions {
            invested_basis: match basis {
                BasisArg::Commitment => InvestedBasis::Commitment,
                BasisArg::CapitalCalled => InvestedBasis::CapitalCalled,
            },
        }
    }
}
