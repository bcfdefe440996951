use rand::Rng;

use crate::distribution::{Distribution, EnumerationConfig};
use crate::error::Result;
use crate::roll_spec::{RollOutcome, RollSpec};

/// one rolled spec, with its distribution if statistics were asked for
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub outcome: RollOutcome,
    pub distribution: Option<Distribution>,
}

impl ReportEntry {
    /// how typical the rolled total was, if the distribution is exact
    pub fn p_value(&self) -> Option<f64> {
        self.distribution
            .as_ref()
            .and_then(|d| d.percentile(&self.outcome.total).ok())
    }
}

/// The rolled outcomes of a batch of specs, in input order, handed to the table renderer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RollReport {
    entries: Vec<ReportEntry>,
}

impl RollReport {
    /// rolls each spec once
    pub fn roll<R: Rng + ?Sized>(specs: &[RollSpec], rng: &mut R) -> RollReport {
        let entries = specs
            .iter()
            .map(|spec| ReportEntry {
                outcome: spec.roll_with(rng),
                distribution: None,
            })
            .collect();
        RollReport { entries }
    }

    /// rolls each spec once and computes its distribution
    pub fn roll_with_statistics<R: Rng + ?Sized>(
        specs: &[RollSpec],
        config: &EnumerationConfig,
        rng: &mut R,
    ) -> Result<RollReport> {
        let mut entries = Vec::with_capacity(specs.len());
        for spec in specs {
            let outcome = spec.roll_with(rng);
            let distribution = spec.enumerate_with(config, rng)?;
            entries.push(ReportEntry {
                outcome,
                distribution: Some(distribution),
            });
        }
        Ok(RollReport { entries })
    }

    pub fn from_outcomes(outcomes: Vec<RollOutcome>) -> RollReport {
        let entries = outcomes
            .into_iter()
            .map(|outcome| ReportEntry {
                outcome,
                distribution: None,
            })
            .collect();
        RollReport { entries }
    }

    pub fn from_entries(entries: Vec<ReportEntry>) -> RollReport {
        RollReport { entries }
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &RollOutcome> {
        self.entries.iter().map(|e| &e.outcome)
    }

    /// true if every entry carries a distribution
    pub fn has_statistics(&self) -> bool {
        !self.entries.is_empty() && self.entries.iter().all(|e| e.distribution.is_some())
    }
}
