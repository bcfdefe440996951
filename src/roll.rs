use rand::Rng;

use crate::roll_spec::{RollOutcome, RollSpec};

impl RollSpec {
    /// Rolls this spec once with the thread-local random generator.
    ///
    /// # Examples
    /// ```
    /// use rolltable::NotationParser;
    /// let spec = NotationParser::new().parse("attack:2d20+4").unwrap();
    /// let outcome = spec.roll();
    /// assert_eq!(outcome.raw_results.len(), 2);
    /// ```
    pub fn roll(&self) -> RollOutcome {
        self.roll_with(&mut rand::thread_rng())
    }

    /// Rolls this spec once, drawing every die from `rng`.
    ///
    /// Each die is uniform over `1..=sides`. The draws are sorted ascending before the keep rule
    /// picks its prefix or suffix, and the outcome keeps them in that sorted order.
    pub fn roll_with<R: Rng + ?Sized>(&self, rng: &mut R) -> RollOutcome {
        let results: Vec<u32> = (0..self.count())
            .map(|_| rng.gen_range(1..=self.sides()))
            .collect();
        let outcome = self.outcome_from(results);
        log::trace!(
            "rolled {} -> {:?} = {}",
            self.canonical_text(),
            outcome.raw_results,
            outcome.total
        );
        outcome
    }

    /// rolls the spec `n` times
    pub fn roll_multiple<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<RollOutcome> {
        (0..n).map(|_| self.roll_with(rng)).collect()
    }
}

/// rolls every spec once, in order
pub fn roll_all<R: Rng + ?Sized>(specs: &[RollSpec], rng: &mut R) -> Vec<RollOutcome> {
    specs.iter().map(|spec| spec.roll_with(rng)).collect()
}
