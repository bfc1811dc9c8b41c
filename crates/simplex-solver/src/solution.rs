use std::fmt;

use crate::format::Formatter;
use crate::tableau::Tableau;

/// The result of solving an LP problem
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone)]
pub struct Solution {
    /// Optimal objective value, in the caller's direction
    pub objective_value: f64,
    /// Value of every decision variable, in index order
    pub values: Vec<VariableValue>,
    /// Pivots performed across both phases
    pub iterations: usize,
    /// Final tableau
    #[cfg_attr(feature = "serde", serde(skip))]
    pub tableau: Tableau,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct VariableValue {
    /// Variable name, or its alias when one is set
    pub name: String,
    /// Value in the optimal basic feasible solution (0 when non-basic)
    pub value: f64,
}

impl Solution {
    pub(crate) fn from_tableau(tableau: Tableau, iterations: usize) -> Self {
        let values = tableau
            .variables()
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.kind().is_synthesized())
            .map(|(column, v)| VariableValue {
                name: v.label().to_string(),
                value: positive_zero(tableau.value_of(column)),
            })
            .collect();

        Self {
            objective_value: positive_zero(tableau.objective_value()),
            values,
            iterations,
            tableau,
        }
    }

    /// Value of a decision variable by name (or alias), ignoring ASCII case
    pub fn value(&self, name: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|v| v.name.eq_ignore_ascii_case(name))
            .map(|v| v.value)
    }

    pub fn tableau_text(&self) -> String {
        Formatter::default().tableau(&self.tableau)
    }
}

/// `-0.0` becomes `0.0`; everything else is unchanged
fn positive_zero(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Formatter::default().solution(self))
    }
}
