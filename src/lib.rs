//! Roll dice from a terse notation, tabulate the results and gauge how typical they were.
//!
//! ```
//! use rolltable::{NotationParser, ResultTable, RollReport};
//!
//! let mut parser = NotationParser::new();
//! let specs = parser.parse_all(["attack:2d20p1h+4", "damage:2d6+3", "d6"]).unwrap();
//! let report = RollReport::roll(&specs, &mut rand::thread_rng());
//! println!("{}", ResultTable::from_report(&report));
//! ```

mod distribution;
mod error;
mod modifier;
mod notation_parser;
mod report;
mod roll;
mod roll_spec;
mod table;

pub use distribution::{
    combinations_with_replacement, AggrValue, Distribution, EnumerationConfig, Tally, Weighting,
};
pub use error::{Result, RollError};
pub use modifier::{Modifier, ModifierStep, ModifierSyntaxError, Operator};
pub use notation_parser::NotationParser;
pub use report::{ReportEntry, RollReport};
pub use roll::roll_all;
pub use roll_spec::{
    format_total, KeepRule, RollOutcome, RollSpec, RollSpecBuilder, Rounding, Total, DEFAULT_SIDES,
};
pub use table::{ResultTable, HEADERS, STATISTICS_HEADERS};

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn attack_scenario() {
        let spec = NotationParser::new().parse("attack:2d20+4").unwrap();
        let outcome = spec.roll_with(&mut StdRng::seed_from_u64(1));
        let sum: u64 = outcome.raw_results.iter().map(|&v| v as u64).sum();
        assert!(outcome.raw_results.iter().all(|&v| (1..=20).contains(&v)));
        assert_eq!(outcome.total, Total::from(sum + 4));
    }

    #[test]
    fn divide_round_up_scenario() {
        let spec = NotationParser::new().parse("2d12/3^").unwrap();
        let outcome = spec.outcome_from(vec![5, 8]);
        assert_eq!(outcome.kept_subtotal, 13);
        assert_eq!(outcome.total, Total::from(5u64));
    }

    #[test]
    fn explicit_pick_scenario() {
        let mut parser = NotationParser::new();
        let spec = parser
            .build(
                RollSpec::builder()
                    .count(4)
                    .sides(6)
                    .keep(KeepRule::KeepHighest(2)),
            )
            .unwrap();
        let outcome = spec.outcome_from(vec![3, 6, 1, 4]);
        assert_eq!(outcome.raw_results, vec![1, 3, 4, 6]);
        assert_eq!(outcome.kept_subtotal, 10);
        assert_eq!(spec.canonical_text(), "4d6p2h");
    }

    #[test]
    fn roll_then_gauge() {
        let mut rng = StdRng::seed_from_u64(12);
        let spec = NotationParser::new().parse("3d6").unwrap();
        let distribution = spec
            .enumerate_with(&EnumerationConfig::default(), &mut rng)
            .unwrap();
        for _ in 0..20 {
            let outcome = spec.roll_with(&mut rng);
            let p = distribution.percentile(&outcome.total).unwrap();
            assert!(p >= 1.0 / 216.0 && p <= 1.0);
        }
        assert_eq!(distribution.expected(), AggrValue::new(21u64, 2u64));
    }

    #[test]
    fn negative_totals_scenario() {
        // the die minus 2.5, rounded up: -1, 0, 1, 2, 3 or 4
        let spec = NotationParser::new().parse("below:d6-10/4^").unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let distribution = spec
            .enumerate_with(&EnumerationConfig::exact_only(), &mut rng)
            .unwrap();
        assert_eq!(distribution.tally().min(), Some(&Total::new_neg(1u64, 1u64)));
        assert_eq!(distribution.tally().max(), Some(&Total::from(4u64)));

        for _ in 0..20 {
            let outcome = spec.roll_with(&mut rng);
            assert_eq!(outcome.total, outcome.total.trunc());
            assert!(distribution.percentile(&outcome.total).is_ok());
        }
        let lowest = spec.outcome_from(vec![1]);
        assert_eq!(distribution.percentile(&lowest.total).unwrap(), 1.0 / 6.0);

        let outcomes = vec![lowest, spec.outcome_from(vec![2])];
        let table = ResultTable::from_outcomes(&outcomes).render();
        let totals: Vec<&str> = table
            .lines()
            .skip(2)
            .map(|line| line.rsplit('|').next().unwrap().trim())
            .collect();
        assert_eq!(totals, vec!["-1", "0"]);
        assert!(!table.contains("-0"));
    }

    #[test]
    fn seeded_report_renders_the_same_table_twice() {
        let render = || {
            let specs = NotationParser::new()
                .parse_all(["d3", "d4", "d6", "d8", "d12", "d20"])
                .unwrap();
            let report = RollReport::roll(&specs, &mut StdRng::seed_from_u64(2020));
            ResultTable::from_report(&report).render()
        };
        let table = render();
        assert_eq!(table, render());
        assert_eq!(table.lines().count(), 8);
    }
}
