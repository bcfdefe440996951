use thiserror::Error;

use crate::roll_spec::Total;

/// Everything that can go wrong between reading a notation string and
/// computing statistics for it.
#[derive(Debug, Error, PartialEq)]
pub enum RollError {
    /// the input does not match `[name:][count]d<sides>[p[n]h|l][modifier][^|_]`
    #[error("malformed dice notation {input:?}: {reason}")]
    MalformedNotation { input: String, reason: String },

    /// the outcome space is bigger than the configured threshold and sampling is switched off
    #[error("cannot enumerate {combinations} combinations exactly (threshold is {threshold})")]
    EnumerationTooLarge { combinations: u128, threshold: u64 },

    /// the total was never produced by the enumeration
    #[error("total {0} does not occur in the distribution")]
    ValueNotInDistribution(Total),

    /// sampled distributions only support the expected value
    #[error("percentile is not supported for a sampled distribution")]
    PercentileUnsupported,
}

impl RollError {
    pub(crate) fn malformed(input: &str, reason: impl Into<String>) -> Self {
        RollError::MalformedNotation {
            input: input.to_owned(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RollError>;
