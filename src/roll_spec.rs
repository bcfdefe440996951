use std::fmt;

use fraction::ToPrimitive;

use crate::error::{Result, RollError};
use crate::modifier::Modifier;

/// faces per die when nothing else is asked for
pub const DEFAULT_SIDES: u32 = 10;

/// The value of a roll after the modifier and rounding, an exact rational.
///
/// Dividing in a modifier (like `2d12/3`) gives fractional totals unless a rounding mode is set.
/// Using [`BigFraction`](fraction::BigFraction) from the [`fraction`](fraction) crate keeps those exact,
/// so a total of `13/3` compares equal to every other `13/3` in a distribution.
/// Its numerator and denominator are unbounded, so modifiers like `*9999999999999999999` cannot overflow.
pub type Total = fraction::BigFraction;

/// selects which of the sorted die values are summed
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KeepRule {
    #[default]
    KeepAll,
    KeepHighest(u32),
    KeepLowest(u32),
}

impl KeepRule {
    /// the kept sub-slice of `sorted`, which must be in ascending order
    pub fn select<'a>(&self, sorted: &'a [u32]) -> &'a [u32] {
        match *self {
            KeepRule::KeepAll => sorted,
            KeepRule::KeepHighest(n) => {
                let n = (n as usize).min(sorted.len());
                &sorted[sorted.len() - n..]
            }
            KeepRule::KeepLowest(n) => {
                let n = (n as usize).min(sorted.len());
                &sorted[..n]
            }
        }
    }

    fn capped(self, count: u32) -> KeepRule {
        match self {
            KeepRule::KeepAll => KeepRule::KeepAll,
            KeepRule::KeepHighest(n) => KeepRule::KeepHighest(n.min(count)),
            KeepRule::KeepLowest(n) => KeepRule::KeepLowest(n.min(count)),
        }
    }
}

impl fmt::Display for KeepRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeepRule::KeepAll => Ok(()),
            KeepRule::KeepHighest(n) => write!(f, "p{n}h"),
            KeepRule::KeepLowest(n) => write!(f, "p{n}l"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rounding {
    #[default]
    None,
    Up,
    Down,
}

impl Rounding {
    /// rounds towards positive (`Up`) or negative (`Down`) infinity
    pub fn apply(&self, value: Total) -> Total {
        // trunc goes towards zero, which is up for negative values and down for positive ones
        let toward_zero = value.trunc();
        let rounded = match self {
            Rounding::None => value,
            _ if toward_zero == value => value,
            Rounding::Up if value.is_sign_negative() => toward_zero,
            Rounding::Up => toward_zero + Total::from(1u64),
            Rounding::Down if value.is_sign_negative() => toward_zero - Total::from(1u64),
            Rounding::Down => toward_zero,
        };
        without_negative_zero(rounded)
    }

    fn suffix(&self) -> &'static str {
        match self {
            Rounding::None => "",
            Rounding::Up => "^",
            Rounding::Down => "_",
        }
    }
}

/// `0` and `-0` are the same total, only `0` is kept
fn without_negative_zero(value: Total) -> Total {
    let is_zero = value.numer().is_some_and(|numer| numer.bits() == 0);
    if is_zero {
        Total::from(0u64)
    } else {
        value
    }
}

/// A fully specified roll like `attack:2d20p1h+4^`.
///
/// A [`RollSpec`] is created once, either by [`NotationParser::parse`](crate::NotationParser::parse)
/// or from a [`RollSpecBuilder`] via [`NotationParser::build`](crate::NotationParser::build),
/// and can then be rolled or enumerated as often as needed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollSpec {
    name: String,
    sides: u32,
    count: u32,
    keep_rule: KeepRule,
    modifier: Modifier,
    rounding: Rounding,
    canonical_text: String,
}

impl RollSpec {
    pub fn builder() -> RollSpecBuilder {
        RollSpecBuilder::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sides(&self) -> u32 {
        self.sides
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn keep_rule(&self) -> KeepRule {
        self.keep_rule
    }

    pub fn modifier(&self) -> &Modifier {
        &self.modifier
    }

    pub fn rounding(&self) -> Rounding {
        self.rounding
    }

    /// a normalized notation string that parses back into an equivalent spec (without the name)
    pub fn canonical_text(&self) -> &str {
        &self.canonical_text
    }

    /// true if both specs roll the same way, regardless of their names
    pub fn is_equivalent(&self, other: &RollSpec) -> bool {
        self.sides == other.sides
            && self.count == other.count
            && self.keep_rule == other.keep_rule
            && self.modifier == other.modifier
            && self.rounding == other.rounding
    }

    /// sum of kept dice in `sorted`, then modifier, then rounding
    ///
    /// `sorted` has to be in ascending order.
    pub(crate) fn resolve(&self, sorted: &[u32]) -> (u64, Total) {
        let subtotal: u64 = self
            .keep_rule
            .select(sorted)
            .iter()
            .map(|&v| v as u64)
            .sum();
        let total = self.rounding.apply(self.modifier.apply(Total::from(subtotal)));
        let total = without_negative_zero(total);
        (subtotal, total)
    }

    /// builds the outcome for the given die values as if they had just been rolled
    pub fn outcome_from(&self, mut results: Vec<u32>) -> RollOutcome {
        results.sort_unstable();
        let (kept_subtotal, total) = self.resolve(&results);
        RollOutcome {
            name: self.name.clone(),
            canonical_text: self.canonical_text.clone(),
            raw_results: results,
            kept_subtotal,
            total,
        }
    }
}

impl fmt::Display for RollSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.canonical_text)
    }
}

/// Collects the parts of a [`RollSpec`] before it gets its label.
///
/// # Examples
/// ```
/// use rolltable::{KeepRule, NotationParser, RollSpec};
/// let mut parser = NotationParser::new();
/// let spec = parser
///     .build(RollSpec::builder().count(4).sides(6).keep(KeepRule::KeepHighest(3)))
///     .unwrap();
/// assert_eq!(spec.canonical_text(), "4d6p3h");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollSpecBuilder {
    name: Option<String>,
    sides: u32,
    count: u32,
    keep_rule: KeepRule,
    modifier: Modifier,
    rounding: Rounding,
}

impl Default for RollSpecBuilder {
    fn default() -> Self {
        RollSpecBuilder {
            name: None,
            sides: DEFAULT_SIDES,
            count: 1,
            keep_rule: KeepRule::KeepAll,
            modifier: Modifier::identity(),
            rounding: Rounding::None,
        }
    }
}

impl RollSpecBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn sides(mut self, sides: u32) -> Self {
        self.sides = sides;
        self
    }

    pub fn count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn keep(mut self, keep_rule: KeepRule) -> Self {
        self.keep_rule = keep_rule;
        self
    }

    pub fn modifier(mut self, modifier: Modifier) -> Self {
        self.modifier = modifier;
        self
    }

    pub fn rounding(mut self, rounding: Rounding) -> Self {
        self.rounding = rounding;
        self
    }

    fn canonical_text(&self) -> String {
        let count = match self.count {
            1 => String::new(),
            n => n.to_string(),
        };
        format!(
            "{count}d{}{}{}{}",
            self.sides,
            self.keep_rule,
            self.modifier,
            self.rounding.suffix()
        )
    }

    /// validates the parts; unnamed specs are labelled with `fallback_label`
    pub(crate) fn finish(self, fallback_label: usize) -> Result<RollSpec> {
        if self.sides == 0 {
            return Err(RollError::malformed(&self.canonical_text(), "a die needs at least one side"));
        }
        if self.count == 0 {
            return Err(RollError::malformed(&self.canonical_text(), "at least one die must be rolled"));
        }
        if let KeepRule::KeepHighest(0) | KeepRule::KeepLowest(0) = self.keep_rule {
            return Err(RollError::malformed(&self.canonical_text(), "a pick rule must keep at least one die"));
        }
        if self.modifier.divides_by_zero() {
            return Err(RollError::malformed(&self.canonical_text(), "division by zero in modifier"));
        }
        let keep_rule = self.keep_rule.capped(self.count);
        let builder = RollSpecBuilder { keep_rule, ..self };
        let canonical_text = builder.canonical_text();
        let name = match builder.name {
            Some(name) if !name.is_empty() => name,
            _ => fallback_label.to_string(),
        };
        Ok(RollSpec {
            name,
            sides: builder.sides,
            count: builder.count,
            keep_rule: builder.keep_rule,
            modifier: builder.modifier,
            rounding: builder.rounding,
            canonical_text,
        })
    }
}

/// One realized roll of a [`RollSpec`]: every field the result table shows.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollOutcome {
    pub name: String,
    pub canonical_text: String,
    /// all die values in ascending order
    pub raw_results: Vec<u32>,
    /// sum of the dice the keep rule selected
    pub kept_subtotal: u64,
    pub total: Total,
}

/// renders integral totals as integers and everything else with three decimals
pub fn format_total(total: &Total) -> String {
    if *total == total.trunc() {
        format!("{total}")
    } else {
        format!("{:.3}", total.to_f64().unwrap_or(f64::NAN))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn spec(builder: RollSpecBuilder) -> RollSpec {
        builder.finish(1).unwrap()
    }

    #[test]
    fn keep_rule_selects_prefix_or_suffix() {
        let sorted = [1, 3, 4, 6];
        assert_eq!(KeepRule::KeepAll.select(&sorted), &[1, 3, 4, 6]);
        assert_eq!(KeepRule::KeepHighest(2).select(&sorted), &[4, 6]);
        assert_eq!(KeepRule::KeepLowest(1).select(&sorted), &[1]);
        assert_eq!(KeepRule::KeepHighest(9).select(&sorted), &[1, 3, 4, 6]);
    }

    #[test]
    fn keep_highest_two_of_four_d6() {
        let s = spec(RollSpec::builder().count(4).sides(6).keep(KeepRule::KeepHighest(2)));
        let outcome = s.outcome_from(vec![6, 1, 4, 3]);
        assert_eq!(outcome.raw_results, vec![1, 3, 4, 6]);
        assert_eq!(outcome.kept_subtotal, 10);
        assert_eq!(outcome.total, Total::from(10u64));
    }

    #[test]
    fn divide_and_round_up() {
        let s = spec(
            RollSpec::builder()
                .count(2)
                .sides(12)
                .modifier(Modifier::identity().divided_by(3))
                .rounding(Rounding::Up),
        );
        let outcome = s.outcome_from(vec![5, 8]);
        assert_eq!(outcome.kept_subtotal, 13);
        assert_eq!(outcome.total, Total::from(5u64));
        assert_eq!(s.canonical_text(), "2d12/3^");
    }

    #[test]
    fn without_rounding_the_total_stays_fractional() {
        let s = spec(RollSpec::builder().count(2).sides(12).modifier(Modifier::identity().divided_by(3)));
        let outcome = s.outcome_from(vec![5, 8]);
        assert_eq!(outcome.total, Total::new(13u64, 3u64));
        assert_eq!(format_total(&outcome.total), "4.333");
    }

    #[test]
    fn rounding_is_idempotent() {
        let value = Total::new(13u64, 3u64);
        for rounding in [Rounding::Up, Rounding::Down, Rounding::None] {
            let once = rounding.apply(value.clone());
            assert_eq!(rounding.apply(once.clone()), once);
        }
        assert_eq!(Rounding::Down.apply(value.clone()), Total::from(4u64));
        assert_eq!(Rounding::Up.apply(Total::new_neg(1u64, 2u64)), Total::from(0u64));
        let negative = Total::new_neg(3u64, 2u64);
        for rounding in [Rounding::Up, Rounding::Down] {
            let once = rounding.apply(negative.clone());
            assert_eq!(rounding.apply(once.clone()), once);
        }
    }

    #[test]
    fn negative_totals_round_towards_their_infinity() {
        assert_eq!(Rounding::Up.apply(Total::new_neg(3u64, 2u64)), Total::new_neg(1u64, 1u64));
        assert_eq!(Rounding::Down.apply(Total::new_neg(3u64, 2u64)), Total::new_neg(2u64, 1u64));
        assert_eq!(Rounding::Down.apply(Total::new_neg(1u64, 2u64)), Total::new_neg(1u64, 1u64));
        assert_eq!(Rounding::Up.apply(Total::new_neg(4u64, 1u64)), Total::new_neg(4u64, 1u64));
        assert_eq!(format_total(&Rounding::Up.apply(Total::new_neg(1u64, 2u64))), "0");
    }

    #[test]
    fn subtract_divide_round_up_below_zero() {
        // d6-10/4^ is the die minus 2.5, rounded up
        let s = spec(
            RollSpec::builder()
                .sides(6)
                .modifier(Modifier::identity().minus(10).divided_by(4))
                .rounding(Rounding::Up),
        );
        let totals: Vec<String> = (1..=6)
            .map(|v| format_total(&s.outcome_from(vec![v]).total))
            .collect();
        assert_eq!(totals, vec!["-1", "0", "1", "2", "3", "4"]);
    }

    #[test]
    fn subtract_divide_round_down_below_zero() {
        // d2-3/2_ is the die minus 1.5, rounded down
        let s = spec(
            RollSpec::builder()
                .sides(2)
                .modifier(Modifier::identity().minus(3).divided_by(2))
                .rounding(Rounding::Down),
        );
        assert_eq!(s.outcome_from(vec![1]).total, Total::new_neg(1u64, 1u64));
        assert_eq!(s.outcome_from(vec![2]).total, Total::from(0u64));
        assert_eq!(format_total(&s.outcome_from(vec![2]).total), "0");
    }

    #[test]
    fn huge_modifier_operands_stay_exact() {
        let s = spec(RollSpec::builder().sides(6).modifier(Modifier::identity().plus(u64::MAX)));
        let expected = Total::from(u64::MAX) + Total::from(6u64);
        assert_eq!(s.outcome_from(vec![6]).total, expected);

        let s = spec(
            RollSpec::builder()
                .count(2)
                .sides(6)
                .modifier(Modifier::identity().times(9_999_999_999_999_999_999)),
        );
        let expected = Total::from(9_999_999_999_999_999_999u64) * Total::from(12u64);
        assert_eq!(s.outcome_from(vec![6, 6]).total, expected);
    }

    #[test]
    fn division_by_zero_is_rejected_by_the_builder() {
        let err = RollSpec::builder()
            .modifier(Modifier::identity().plus(3).divided_by(0))
            .finish(1)
            .unwrap_err();
        assert!(matches!(err, RollError::MalformedNotation { .. }));
    }

    #[test]
    fn keep_count_is_capped_to_dice_count() {
        let s = spec(RollSpec::builder().count(2).sides(6).keep(KeepRule::KeepLowest(5)));
        assert_eq!(s.keep_rule(), KeepRule::KeepLowest(2));
        assert_eq!(s.canonical_text(), "2d6p2l");
    }

    #[test]
    fn builder_defaults_to_one_d10() {
        let s = spec(RollSpec::builder());
        assert_eq!(s.sides(), 10);
        assert_eq!(s.count(), 1);
        assert_eq!(s.canonical_text(), "d10");
        assert_eq!(s.name(), "1");
    }

    #[test]
    fn zero_sides_count_or_pick_are_rejected() {
        assert!(RollSpec::builder().sides(0).finish(1).is_err());
        assert!(RollSpec::builder().count(0).finish(1).is_err());
        assert!(RollSpec::builder().keep(KeepRule::KeepHighest(0)).finish(1).is_err());
    }

    #[test]
    fn format_total_prints_integers_plainly() {
        assert_eq!(format_total(&Total::from(7u64)), "7");
        assert_eq!(format_total(&Total::new_neg(6u64, 1u64)), "-6");
    }
}
