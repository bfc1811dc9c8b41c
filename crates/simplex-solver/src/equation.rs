use std::collections::BTreeMap;

use crate::variable::{Variable, VariableRegistry};

/// Coefficients of a linear expression, keyed by variable index.
///
/// A missing key means the variable was never given a coefficient. Parsed
/// equations carry an explicit entry (possibly zero) for every variable of
/// the registry they were parsed against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Equation {
    coefficients: BTreeMap<usize, f64>,
}

impl Equation {
    pub fn new() -> Self {
        Self::default()
    }

    /// An equation with a zero entry for every registry variable
    pub fn zeros(registry: &VariableRegistry) -> Self {
        Self {
            coefficients: registry.iter().map(|v| (v.index(), 0.0)).collect(),
        }
    }

    /// Add to the variable's coefficient, starting from zero if absent
    pub fn add(&mut self, variable: &Variable, coefficient: f64) {
        *self.coefficients.entry(variable.index()).or_insert(0.0) += coefficient;
    }

    pub fn coefficient(&self, variable: &Variable) -> Option<f64> {
        self.get(variable.index())
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.coefficients.get(&index).copied()
    }

    pub fn contains(&self, variable: &Variable) -> bool {
        self.coefficients.contains_key(&variable.index())
    }

    /// `(index, coefficient)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.coefficients.iter().map(|(&index, &coef)| (index, coef))
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    pub fn negate(&mut self) {
        for coef in self.coefficients.values_mut() {
            *coef = -*coef;
        }
    }

    /// Value of the expression given a value for each variable index
    pub fn evaluate(&self, value_of: impl Fn(usize) -> f64) -> f64 {
        self.iter().map(|(index, coef)| coef * value_of(index)).sum()
    }

    /// Canonical text such as `3X1 - X2 + 4X3`.
    ///
    /// Zero terms are left out; an all-zero equation renders as `0` times the
    /// first variable so the text stays a valid equation.
    pub fn to_text(&self, registry: &VariableRegistry) -> String {
        let mut text = String::new();
        for variable in registry {
            let Some(coef) = self.coefficient(variable) else {
                continue;
            };
            if coef == 0.0 {
                continue;
            }
            let magnitude = coef.abs();
            if text.is_empty() {
                if coef < 0.0 {
                    text.push('-');
                }
            } else {
                text.push_str(if coef < 0.0 { " - " } else { " + " });
            }
            if magnitude != 1.0 {
                text.push_str(&magnitude.to_string());
            }
            text.push_str(variable.name());
        }
        if text.is_empty() {
            if let Some(first) = registry.iter().next() {
                text = format!("0{}", first.name());
            }
        }
        text
    }
}

impl FromIterator<(usize, f64)> for Equation {
    fn from_iter<T: IntoIterator<Item = (usize, f64)>>(iter: T) -> Self {
        Self {
            coefficients: iter.into_iter().collect(),
        }
    }
}
