use std::fmt;

use crate::roll_spec::Total;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    fn from_char(c: char) -> Option<Operator> {
        match c {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Subtract),
            '*' => Some(Operator::Multiply),
            '/' => Some(Operator::Divide),
            _ => None,
        }
    }

    fn symbol(&self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
            Operator::Divide => '/',
        }
    }
}

/// one `op literal` pair of a modifier, like the `/3` in `2d12/3`
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModifierStep {
    pub operator: Operator,
    pub operand: u64,
}

/// A fixed arithmetic adjustment applied to the kept subtotal.
///
/// The subtotal is the leftmost operand of the expression, so `+4*2` turns a subtotal of `s` into `s + 8`:
/// multiplication and division bind tighter than addition and subtraction.
/// An empty [`Modifier`] is the identity.
///
/// # Examples
/// ```
/// use rolltable::Modifier;
/// let m = Modifier::from_suffix("+4*2").unwrap();
/// assert_eq!(m.to_string(), "+4*2");
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Modifier {
    steps: Vec<ModifierStep>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ModifierSyntaxError {
    MissingOperator(char),
    MissingOperand(Operator),
    DivisionByZero,
    OperandTooLarge(String),
}

impl fmt::Display for ModifierSyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModifierSyntaxError::MissingOperator(c) => {
                write!(f, "expected one of + - * / in modifier, found {c:?}")
            }
            ModifierSyntaxError::MissingOperand(op) => {
                write!(f, "operator {} in modifier has no number after it", op.symbol())
            }
            ModifierSyntaxError::DivisionByZero => write!(f, "division by zero in modifier"),
            ModifierSyntaxError::OperandTooLarge(s) => write!(f, "modifier operand {s} is too large"),
        }
    }
}

impl Modifier {
    pub fn identity() -> Self {
        Modifier::default()
    }

    /// parses a suffix like `+4`, `/3` or `-1*2` into a list of steps
    pub fn from_suffix(suffix: &str) -> Result<Modifier, ModifierSyntaxError> {
        let mut steps: Vec<ModifierStep> = vec![];
        let mut chars = suffix.chars().peekable();
        while let Some(c) = chars.next() {
            let operator = Operator::from_char(c).ok_or(ModifierSyntaxError::MissingOperator(c))?;
            let mut digits = String::new();
            while let Some(d) = chars.next_if(char::is_ascii_digit) {
                digits.push(d);
            }
            if digits.is_empty() {
                return Err(ModifierSyntaxError::MissingOperand(operator));
            }
            let operand: u64 = digits
                .parse()
                .map_err(|_| ModifierSyntaxError::OperandTooLarge(digits.clone()))?;
            if operator == Operator::Divide && operand == 0 {
                return Err(ModifierSyntaxError::DivisionByZero);
            }
            steps.push(ModifierStep { operator, operand });
        }
        Ok(Modifier { steps })
    }

    pub fn steps(&self) -> &[ModifierStep] {
        &self.steps
    }

    pub fn is_identity(&self) -> bool {
        self.steps.is_empty()
    }

    fn push(mut self, operator: Operator, operand: u64) -> Self {
        self.steps.push(ModifierStep { operator, operand });
        self
    }

    pub fn plus(self, operand: u64) -> Self {
        self.push(Operator::Add, operand)
    }

    pub fn minus(self, operand: u64) -> Self {
        self.push(Operator::Subtract, operand)
    }

    pub fn times(self, operand: u64) -> Self {
        self.push(Operator::Multiply, operand)
    }

    /// a zero `operand` is accepted here and rejected when the spec is built
    pub fn divided_by(self, operand: u64) -> Self {
        self.push(Operator::Divide, operand)
    }

    pub fn divides_by_zero(&self) -> bool {
        self.steps
            .iter()
            .any(|step| step.operator == Operator::Divide && step.operand == 0)
    }

    /// evaluates `subtotal <steps>` with the usual precedence of `*` and `/` over `+` and `-`
    pub fn apply(&self, subtotal: Total) -> Total {
        let mut sum = Total::from(0u64);
        let mut term = subtotal;
        for step in self.steps.iter() {
            let operand = Total::from(step.operand);
            match step.operator {
                Operator::Multiply => term = term * operand,
                Operator::Divide => term = term / operand,
                Operator::Add => {
                    sum = sum + term;
                    term = operand;
                }
                Operator::Subtract => {
                    sum = sum + term;
                    term = -operand;
                }
            }
        }
        sum + term
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in self.steps.iter() {
            write!(f, "{}{}", step.operator.symbol(), step.operand)?;
        }
        Ok(())
    }
}
