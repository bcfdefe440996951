use std::fmt;

use crate::report::RollReport;
use crate::roll_spec::{format_total, RollOutcome};

pub const HEADERS: [&str; 5] = ["", "Dice", "Roll(s)", "Raw sum", "TOTAL"];
pub const STATISTICS_HEADERS: [&str; 2] = ["Expected", "p-value"];

const CELL_SEPARATOR: &str = " | ";
const RULE_SEPARATOR: &str = "=+=";
const RULE_FILL: char = '=';

/// A right-justified text grid of roll results.
///
/// ```text
///        |   Dice | Roll(s) | Raw sum | TOTAL
/// =======+========+=========+=========+======
/// attack | 2d20+4 |    5, 8 |      13 |    17
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

fn outcome_cells(outcome: &RollOutcome) -> Vec<String> {
    let results = outcome
        .raw_results
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<String>>()
        .join(", ");
    vec![
        outcome.name.clone(),
        outcome.canonical_text.clone(),
        results,
        outcome.kept_subtotal.to_string(),
        format_total(&outcome.total),
    ]
}

impl ResultTable {
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a RollOutcome>) -> ResultTable {
        ResultTable {
            headers: HEADERS.iter().map(|h| h.to_string()).collect(),
            rows: outcomes.into_iter().map(outcome_cells).collect(),
        }
    }

    /// one row per entry; adds expected value and p-value columns when every entry has a distribution
    pub fn from_report(report: &RollReport) -> ResultTable {
        if !report.has_statistics() {
            return ResultTable::from_outcomes(report.outcomes());
        }
        let headers = HEADERS
            .iter()
            .chain(STATISTICS_HEADERS.iter())
            .map(|h| h.to_string())
            .collect();
        let rows = report
            .entries()
            .iter()
            .map(|entry| {
                let mut cells = outcome_cells(&entry.outcome);
                let expected = entry
                    .distribution
                    .as_ref()
                    .map(|d| format!("{:.2}", d.expected_f64()))
                    .unwrap_or_default();
                let p_value = match entry.p_value() {
                    Some(p) => format!("{p:.3}"),
                    None => "-".to_owned(),
                };
                cells.push(expected);
                cells.push(p_value);
                cells
            })
            .collect();
        ResultTable { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// the widest cell of each column, headers included
    pub fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in self.rows.iter() {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }
        widths
    }

    fn justified_row(cells: &[String], widths: &[usize]) -> String {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, &width)| format!("{cell:>width$}"))
            .collect::<Vec<String>>()
            .join(CELL_SEPARATOR)
    }

    fn rule(widths: &[usize]) -> String {
        widths
            .iter()
            .map(|&width| RULE_FILL.to_string().repeat(width))
            .collect::<Vec<String>>()
            .join(RULE_SEPARATOR)
    }

    pub fn render(&self) -> String {
        let widths = self.column_widths();
        let mut lines = vec![
            Self::justified_row(&self.headers, &widths),
            Self::rule(&widths),
        ];
        lines.extend(self.rows.iter().map(|row| Self::justified_row(row, &widths)));
        lines.join("\n")
    }
}

impl fmt::Display for ResultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
