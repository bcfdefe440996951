use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::error::{Result, RollError};
use crate::modifier::Modifier;
use crate::roll_spec::{KeepRule, Rounding, RollSpec, RollSpecBuilder};

const NOTATION_PATTERN: &str = r"^(?:(?P<name>.*):)?(?P<count>\d*)d(?P<sides>\d*)(?:p(?P<pick>\d*)(?P<direction>[hl]))?(?P<modifier>[0-9+\-*/]*)(?P<rounding>[\^_]?)$";

fn notation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(NOTATION_PATTERN).expect("notation pattern is a valid regex"))
}

/// Turns notation strings like `attack:2d20p1h+4^` into [`RollSpec`]s.
///
/// The parser is also the session that hands out labels: every spec it constructs, labelled or not,
/// advances a 1-based counter, and unlabelled specs are named after the counter value they got.
/// Failed parses leave the counter alone.
///
/// # Syntax
/// ```text
/// [name:][count]d<sides>[p[n](h|l)][modifier][^|_]
/// ```
/// - `name:` everything up to the last colon
/// - `count` number of dice, default 1
/// - `sides` faces per die, required
/// - `p2h` / `p2l` keep the 2 highest / lowest dice, the count defaults to 1
/// - `modifier` a chain like `+4`, `/3` or `-1*2` applied to the kept sum
/// - `^` rounds the result up, `_` rounds it down
///
/// # Examples
/// ```
/// use rolltable::NotationParser;
/// let mut parser = NotationParser::new();
/// let spec = parser.parse("attack:2d20+4").unwrap();
/// assert_eq!(spec.name(), "attack");
/// assert_eq!(spec.sides(), 20);
/// let spec = parser.parse("d6").unwrap();
/// assert_eq!(spec.name(), "2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotationParser {
    next_label: usize,
}

impl Default for NotationParser {
    fn default() -> Self {
        NotationParser { next_label: 1 }
    }
}

impl NotationParser {
    pub fn new() -> Self {
        NotationParser::default()
    }

    /// the label the next unnamed spec will get
    pub fn next_label(&self) -> usize {
        self.next_label
    }

    pub fn parse(&mut self, input: &str) -> Result<RollSpec> {
        let builder = notation_to_builder(input.trim())?;
        self.build(builder)
    }

    /// parses every input in order, stopping at the first malformed one
    pub fn parse_all<I, S>(&mut self, inputs: I) -> Result<Vec<RollSpec>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        inputs
            .into_iter()
            .map(|input| self.parse(input.as_ref()))
            .collect()
    }

    /// validates a directly assembled spec and labels it like a parsed one
    pub fn build(&mut self, builder: RollSpecBuilder) -> Result<RollSpec> {
        let spec = builder.finish(self.next_label)?;
        self.next_label += 1;
        log::debug!("constructed roll spec {spec}");
        Ok(spec)
    }
}

fn notation_to_builder(input: &str) -> Result<RollSpecBuilder> {
    let captures = notation_regex().captures(input).ok_or_else(|| {
        RollError::malformed(
            input,
            "expected [name:][count]d<sides>[p[n](h|l)][modifier][^|_]",
        )
    })?;

    let sides = match capture_str(&captures, "sides") {
        "" => return Err(RollError::malformed(input, "missing number of sides after 'd'")),
        digits => parse_number(input, digits, "sides")?,
    };
    let count = match capture_str(&captures, "count") {
        "" => 1,
        digits => parse_number(input, digits, "count")?,
    };

    let keep_rule = match captures.name("direction").map(|m| m.as_str()) {
        None => KeepRule::KeepAll,
        Some(direction) => {
            let pick_count = match capture_str(&captures, "pick") {
                "" => 1,
                digits => parse_number(input, digits, "pick count")?,
            };
            match direction {
                "h" => KeepRule::KeepHighest(pick_count),
                _ => KeepRule::KeepLowest(pick_count),
            }
        }
    };

    let modifier = Modifier::from_suffix(capture_str(&captures, "modifier"))
        .map_err(|e| RollError::malformed(input, e.to_string()))?;

    let rounding = match capture_str(&captures, "rounding") {
        "^" => Rounding::Up,
        "_" => Rounding::Down,
        _ => Rounding::None,
    };

    let mut builder = RollSpec::builder()
        .sides(sides)
        .count(count)
        .keep(keep_rule)
        .modifier(modifier)
        .rounding(rounding);
    if let Some(name) = captures.name("name") {
        builder = builder.name(name.as_str());
    }
    Ok(builder)
}

fn capture_str<'a>(captures: &Captures<'a>, group: &str) -> &'a str {
    captures.name(group).map_or("", |m| m.as_str())
}

fn parse_number(input: &str, digits: &str, what: &str) -> Result<u32> {
    digits
        .parse()
        .map_err(|_| RollError::malformed(input, format!("{what} {digits} is too large")))
}
