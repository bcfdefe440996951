//! Outcome distributions of a [`RollSpec`] and the statistics derived from them.
//!
//! Small outcome spaces are enumerated exactly: every multiset of die values is visited once
//! (the engine sorts before it keeps, modifies and rounds, so order never matters).
//! When the space is too big, a large number of simulated rolls stands in for it.

use std::cmp::Ordering;

use fraction::ToPrimitive;
use rand::Rng;

use crate::error::{Result, RollError};
use crate::roll_spec::{RollSpec, Total};

/// exact type for aggregated values like the expected value
pub type AggrValue = fraction::BigFraction;

/// How often each enumerated combination of dice counts towards the distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Weighting {
    /// each combination counts as often as there are orderings of it, so the population is
    /// `sides^count` and the statistics are true probabilities
    #[default]
    Multinomial,
    /// each combination with replacement counts once, regardless of how likely it is
    PerCombination,
}

/// Configuration of [`RollSpec::enumerate_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumerationConfig {
    /// largest number of combinations that is still enumerated exactly
    pub exhaustive_threshold: u64,

    /// number of simulated rolls when sampling
    pub sample_size: usize,

    /// whether to sample when the threshold is exceeded, instead of failing
    pub allow_sampling: bool,

    pub weighting: Weighting,
}

impl Default for EnumerationConfig {
    fn default() -> Self {
        Self {
            exhaustive_threshold: 1_000_000,
            sample_size: 100_000,
            allow_sampling: true,
            weighting: Weighting::Multinomial,
        }
    }
}

impl EnumerationConfig {
    /// never samples; too large outcome spaces are an error
    pub fn exact_only() -> Self {
        Self {
            allow_sampling: false,
            ..Default::default()
        }
    }

    /// small threshold and sample, for interactive use
    pub fn quick() -> Self {
        Self {
            exhaustive_threshold: 50_000,
            sample_size: 10_000,
            ..Default::default()
        }
    }

    pub fn with_threshold(mut self, exhaustive_threshold: u64) -> Self {
        self.exhaustive_threshold = exhaustive_threshold;
        self
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    pub fn with_weighting(mut self, weighting: Weighting) -> Self {
        self.weighting = weighting;
        self
    }
}

/// A multiset of totals, stored as `(total, weight)` pairs in ascending order of total.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tally {
    entries: Vec<(Total, u64)>,
    population: u64,
}

impl Tally {
    fn from_weighted(mut entries: Vec<(Total, u64)>) -> Tally {
        entries.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        let mut merged: Vec<(Total, u64)> = Vec::with_capacity(entries.len());
        for (total, weight) in entries {
            match merged.last_mut() {
                Some(last) if last.0 == total => last.1 += weight,
                _ => merged.push((total, weight)),
            }
        }
        let population = merged.iter().map(|e| e.1).sum();
        Tally {
            entries: merged,
            population,
        }
    }

    /// every distinct total with its weight, ascending
    pub fn entries(&self) -> &[(Total, u64)] {
        &self.entries
    }

    /// size of the multiset, that is the sum of all weights
    pub fn population(&self) -> u64 {
        self.population
    }

    pub fn min(&self) -> Option<&Total> {
        self.entries.first().map(|e| &e.0)
    }

    pub fn max(&self) -> Option<&Total> {
        self.entries.last().map(|e| &e.0)
    }

    pub fn mean(&self) -> AggrValue {
        if self.population == 0 {
            return AggrValue::from(0);
        }
        let mut sum = AggrValue::from(0);
        for (total, weight) in self.entries.iter() {
            sum += total.clone() * AggrValue::from(*weight);
        }
        sum / AggrValue::from(self.population)
    }

    /// population standard deviation
    pub fn std_dev(&self) -> f64 {
        if self.population == 0 {
            return 0.0;
        }
        let mean = self.mean();
        let mut sum_of_squares = AggrValue::from(0);
        for (total, weight) in self.entries.iter() {
            let deviation = total.clone() - mean.clone();
            sum_of_squares += deviation.clone() * deviation * AggrValue::from(*weight);
        }
        let variance = sum_of_squares / AggrValue::from(self.population);
        variance.to_f64().unwrap_or(f64::NAN).sqrt()
    }

    /// Two-tailed rank statistic of `actual`.
    ///
    /// Counts the members `>= actual` and the members `<= actual`, and divides the smaller count by the population.
    /// Both tails include `actual` itself, so the extremes of `1d6` score `1/6` and the middle scores highest.
    pub fn percentile(&self, actual: &Total) -> Result<f64> {
        let lower = self.entries.partition_point(|(total, _)| total < actual);
        let at = match self.entries.get(lower) {
            Some((total, weight)) if total == actual => *weight,
            _ => return Err(RollError::ValueNotInDistribution(actual.clone())),
        };
        let below: u64 = self.entries[..lower].iter().map(|e| e.1).sum();
        let at_or_above = self.population - below;
        let at_or_below = below + at;
        Ok(at_or_above.min(at_or_below) as f64 / self.population as f64)
    }
}

/// The outcome distribution of a [`RollSpec`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Distribution {
    /// every combination of dice was enumerated
    Exact(Tally),
    /// simulated rolls, used when the outcome space was too large
    Sampled(Tally),
}

impl Distribution {
    pub fn tally(&self) -> &Tally {
        match self {
            Distribution::Exact(tally) | Distribution::Sampled(tally) => tally,
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Distribution::Exact(_))
    }

    /// arithmetic mean of the collected totals
    pub fn expected(&self) -> AggrValue {
        self.tally().mean()
    }

    pub fn expected_f64(&self) -> f64 {
        self.expected().to_f64().unwrap_or(f64::NAN)
    }

    pub fn std_dev(&self) -> f64 {
        self.tally().std_dev()
    }

    pub fn population(&self) -> u64 {
        self.tally().population()
    }

    /// see [`Tally::percentile`]; only exact distributions support it
    pub fn percentile(&self, actual: &Total) -> Result<f64> {
        match self {
            Distribution::Exact(tally) => tally.percentile(actual),
            Distribution::Sampled(_) => Err(RollError::PercentileUnsupported),
        }
    }
}

/// number of multisets of `count` values drawn from `1..=sides`, saturating at [`u128::MAX`]
pub fn combinations_with_replacement(sides: u32, count: u32) -> u128 {
    let n = sides as u128 + count as u128 - 1;
    // C(n, count) == C(n, sides - 1), take the shorter product
    let k = (sides as u128 - 1).min(count as u128);
    let mut c: u128 = 1;
    for i in 1..=k {
        c = match c.checked_mul(n - k + i) {
            Some(v) => v / i,
            None => return u128::MAX,
        };
    }
    c
}

/// calls `visit` with every non-decreasing sequence of `count` values in `1..=sides`, in lexicographic order
fn for_each_combination(sides: u32, count: u32, mut visit: impl FnMut(&[u32])) {
    let mut dice = vec![1u32; count as usize];
    loop {
        visit(&dice);
        let Some(i) = dice.iter().rposition(|&v| v < sides) else {
            return;
        };
        let next = dice[i] + 1;
        dice[i..].iter_mut().for_each(|d| *d = next);
    }
}

fn binomial(n: u64, k: u64) -> u128 {
    let k = k.min(n - k);
    let mut c: u128 = 1;
    for i in 1..=k as u128 {
        c = c * (n as u128 - k as u128 + i) / i;
    }
    c
}

/// number of distinct orderings of a sorted sequence
fn orderings(sorted: &[u32]) -> u64 {
    let mut remaining = sorted.len() as u64;
    let mut weight: u128 = 1;
    for run in sorted.chunk_by(|a, b| a == b) {
        let run = run.len() as u64;
        weight *= binomial(remaining, run);
        remaining -= run;
    }
    weight as u64
}

impl RollSpec {
    /// enumerates with the default [`EnumerationConfig`], sampling with the thread-local generator if needed
    pub fn enumerate(&self) -> Result<Distribution> {
        self.enumerate_with(&EnumerationConfig::default(), &mut rand::thread_rng())
    }

    /// Computes the distribution of totals.
    ///
    /// If the number of combinations exceeds `config.exhaustive_threshold` (or, with [`Weighting::Multinomial`],
    /// `sides^count` does not fit in a [`u64`]), `config.sample_size` rolls drawn from `rng` are collected
    /// instead, or [`RollError::EnumerationTooLarge`] is returned when sampling is not allowed.
    pub fn enumerate_with<R: Rng + ?Sized>(
        &self,
        config: &EnumerationConfig,
        rng: &mut R,
    ) -> Result<Distribution> {
        let combinations = combinations_with_replacement(self.sides(), self.count());
        let population_fits = match config.weighting {
            Weighting::Multinomial => (self.sides() as u64).checked_pow(self.count()).is_some(),
            Weighting::PerCombination => true,
        };
        let exact = combinations <= config.exhaustive_threshold as u128 && population_fits;
        log::trace!(
            "{} has {} combinations (threshold {})",
            self.canonical_text(),
            combinations,
            config.exhaustive_threshold
        );

        if exact {
            return Ok(Distribution::Exact(self.enumerate_exact(config.weighting)));
        }
        if !config.allow_sampling {
            return Err(RollError::EnumerationTooLarge {
                combinations,
                threshold: config.exhaustive_threshold,
            });
        }
        log::debug!(
            "{} is too large to enumerate, sampling {} rolls",
            self.canonical_text(),
            config.sample_size
        );
        let totals = (0..config.sample_size)
            .map(|_| (self.roll_with(rng).total, 1))
            .collect();
        Ok(Distribution::Sampled(Tally::from_weighted(totals)))
    }

    fn enumerate_exact(&self, weighting: Weighting) -> Tally {
        let mut totals: Vec<(Total, u64)> = vec![];
        for_each_combination(self.sides(), self.count(), |dice| {
            let (_, total) = self.resolve(dice);
            let weight = match weighting {
                Weighting::Multinomial => orderings(dice),
                Weighting::PerCombination => 1,
            };
            totals.push((total, weight));
        });
        Tally::from_weighted(totals)
    }
}
