use std::fmt;

use crate::equation::Equation;
use crate::error::SolveError;
use crate::format::Formatter;
use crate::problem::{LinearProgram, Relation};
use crate::variable::{VariableKind, VariableRegistry};

/// Whether phase 1 has to run before the real objective can be optimized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    SinglePhase,
    RequiresTwoPhase,
}

/// Simplex tableau.
///
/// Row 0 holds the objective (reduced costs), rows `1..` the constraints.
/// The last column is the right-hand side. `basic[i]` is the column that is
/// basic in constraint row `i` (matrix row `i + 1`).
#[derive(Debug, Clone, PartialEq)]
pub struct Tableau {
    matrix: Vec<Vec<f64>>,
    variables: VariableRegistry,
    basic: Vec<usize>,
    phase: Phase,
    was_minimize: bool,
    objective: Equation,
    objective_label: char,
}

/// Synthesized entries of one constraint row
struct RowLayout {
    entries: Vec<(usize, f64)>,
    basic: usize,
}

impl Tableau {
    /// Build the initial tableau: normalize to maximize, add slack, surplus
    /// and artificial columns, and seed the basis.
    ///
    /// A row with a negative right-hand side is multiplied by -1 first, which
    /// turns `<=` into `>=` and back, so every basic variable starts at a
    /// non-negative value.
    pub fn build(program: &LinearProgram) -> Self {
        let mut objective = program.objective().clone();
        let was_minimize = !objective.is_maximize();
        if was_minimize {
            objective.convert_to_maximize();
        }

        let mut variables = VariableRegistry::new();
        for variable in program.registry() {
            if objective.equation().contains(variable) {
                variables.insert(variable.clone());
            }
        }
        let structural = variables.len();

        // Slack/surplus and artificial numbering are independent counters
        let mut slack = 0;
        let mut artificial = 0;
        let mut layouts = Vec::with_capacity(program.num_constraints());
        for constraint in program.constraints() {
            let layout = match normalized_relation(constraint.relation(), constraint.rhs()) {
                Relation::LessOrEqual => {
                    slack += 1;
                    variables.push(format!("S{}", slack), VariableKind::Slack);
                    let s = variables.len() - 1;
                    RowLayout { entries: vec![(s, 1.0)], basic: s }
                }
                Relation::GreaterOrEqual => {
                    slack += 1;
                    variables.push(format!("S{}", slack), VariableKind::Surplus);
                    artificial += 1;
                    variables.push(format!("A{}", artificial), VariableKind::Artificial);
                    let a = variables.len() - 1;
                    RowLayout { entries: vec![(a - 1, -1.0), (a, 1.0)], basic: a }
                }
                Relation::Equal => {
                    artificial += 1;
                    variables.push(format!("A{}", artificial), VariableKind::Artificial);
                    let a = variables.len() - 1;
                    RowLayout { entries: vec![(a, 1.0)], basic: a }
                }
            };
            layouts.push(layout);
        }

        let phase = if artificial > 0 {
            Phase::RequiresTwoPhase
        } else {
            Phase::SinglePhase
        };

        let width = variables.len() + 1;
        let rhs = width - 1;
        let mut matrix = vec![vec![0.0; width]; 1 + program.num_constraints()];
        let mut basic = Vec::with_capacity(program.num_constraints());

        for (i, (constraint, layout)) in program.constraints().iter().zip(&layouts).enumerate() {
            let sign = if constraint.rhs() < 0.0 { -1.0 } else { 1.0 };
            let row = &mut matrix[i + 1];
            for (column, variable) in variables.iter().take(structural).enumerate() {
                let coef = constraint.equation().coefficient(variable).unwrap_or_else(|| {
                    panic!(
                        "constraint {} has no coefficient for {}; parsed equations cover every variable",
                        i + 1,
                        variable.name()
                    )
                });
                row[column] = sign * coef;
            }
            for &(column, value) in &layout.entries {
                row[column] = value;
            }
            row[rhs] = sign * constraint.rhs();
            basic.push(layout.basic);
        }

        let mut tableau = Self {
            matrix,
            variables,
            basic,
            phase,
            was_minimize,
            objective: objective.equation().clone(),
            objective_label: 'Z',
        };

        match phase {
            Phase::SinglePhase => tableau.matrix[0] = tableau.objective_row(),
            Phase::RequiresTwoPhase => tableau.load_phase_one_objective(),
        }

        tableau
    }

    /// Row 0 for phase 1: minimize the sum of artificials, with every
    /// artificial already priced out through the row it starts basic in.
    fn load_phase_one_objective(&mut self) {
        self.objective_label = 'W';
        let width = self.width();
        for column in 0..width - 1 {
            if self.is_artificial(column) {
                self.matrix[0][column] = -1.0;
            }
        }
        for i in 0..self.basic.len() {
            if !self.is_artificial(self.basic[i]) {
                continue;
            }
            for j in 0..width {
                self.matrix[0][j] += self.matrix[i + 1][j];
            }
        }
    }

    /// Negated objective coefficients; zero for synthesized columns and RHS
    fn objective_row(&self) -> Vec<f64> {
        let mut row = vec![0.0; self.width()];
        for (column, variable) in self.variables.iter().enumerate() {
            if variable.kind().is_synthesized() {
                continue;
            }
            if let Some(coef) = self.objective.coefficient(variable) {
                row[column] = -coef;
            }
        }
        row
    }

    /// Put the real objective back into row 0 and price out every basic
    /// column so its reduced cost is zero.
    pub(crate) fn restore_objective(&mut self) {
        self.objective_label = 'Z';
        self.matrix[0] = self.objective_row();
        let (head, rows) = self.matrix.split_at_mut(1);
        let objective = &mut head[0];
        for (row, &column) in rows.iter().zip(&self.basic) {
            let coef = objective[column];
            if coef == 0.0 {
                continue;
            }
            for (target, value) in objective.iter_mut().zip(row) {
                *target -= coef * value;
            }
        }
    }

    /// Rebuild the tableau without its artificial columns.
    ///
    /// Basic columns are renumbered through an explicit old-to-new map.
    pub(crate) fn drop_artificial_columns(&mut self) -> Result<(), SolveError> {
        let width = self.width();
        let mut remap = vec![None; width];
        let mut keep = Vec::with_capacity(width);
        for (column, slot) in remap.iter_mut().enumerate() {
            if column == width - 1 || !self.is_artificial(column) {
                *slot = Some(keep.len());
                keep.push(column);
            }
        }

        let basic = self
            .basic
            .iter()
            .map(|&column| {
                remap[column].ok_or_else(|| SolveError::ArtificialInBasis {
                    variable: self.variables.at(column).map(|v| v.name().to_string()).unwrap_or_default(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.matrix = self
            .matrix
            .iter()
            .map(|row| keep.iter().map(|&j| row[j]).collect())
            .collect();
        self.variables.retain(|v| v.kind() != VariableKind::Artificial);
        self.basic = basic;
        Ok(())
    }

    /// Pivot on constraint row `row` (0-based) and `column`
    pub(crate) fn pivot(&mut self, row: usize, column: usize) {
        let pivot_row = row + 1;
        let pivot = self.matrix[pivot_row][column];
        for value in self.matrix[pivot_row].iter_mut() {
            *value /= pivot;
        }

        let normalized = self.matrix[pivot_row].clone();
        for (i, target) in self.matrix.iter_mut().enumerate() {
            if i == pivot_row {
                continue;
            }
            let factor = target[column];
            if factor == 0.0 {
                continue;
            }
            for (value, p) in target.iter_mut().zip(&normalized) {
                *value -= factor * p;
            }
        }

        self.basic[row] = column;
    }

    pub(crate) fn negate_objective_row(&mut self) {
        for value in self.matrix[0].iter_mut() {
            *value = -*value;
        }
    }

    /// Report the optimum in the caller's direction
    pub(crate) fn finalize(&mut self) {
        if self.was_minimize {
            let rhs = self.rhs_column();
            self.matrix[0][rhs] = -self.matrix[0][rhs];
        }
    }

    fn is_artificial(&self, column: usize) -> bool {
        self.variables
            .at(column)
            .is_some_and(|v| v.kind() == VariableKind::Artificial)
    }

    pub fn matrix(&self) -> &[Vec<f64>] {
        &self.matrix
    }

    /// Column order of the matrix
    pub fn variables(&self) -> &VariableRegistry {
        &self.variables
    }

    pub fn basic_variables(&self) -> &[usize] {
        &self.basic
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn was_minimize(&self) -> bool {
        self.was_minimize
    }

    /// `Z` for the real objective, `W` while row 0 is the phase-1 objective
    pub fn objective_label(&self) -> char {
        self.objective_label
    }

    pub fn constraint_count(&self) -> usize {
        self.matrix.len() - 1
    }

    pub fn width(&self) -> usize {
        self.matrix[0].len()
    }

    pub fn rhs_column(&self) -> usize {
        self.width() - 1
    }

    pub fn objective_value(&self) -> f64 {
        self.matrix[0][self.rhs_column()]
    }

    /// Current value of the variable in `column`: its row's RHS when basic, 0 otherwise
    pub fn value_of(&self, column: usize) -> f64 {
        let rhs = self.rhs_column();
        self.basic
            .iter()
            .position(|&b| b == column)
            .map_or(0.0, |row| self.matrix[row + 1][rhs])
    }
}

/// Relation of the row as it enters the tableau, after flipping a negative RHS
fn normalized_relation(relation: Relation, rhs: f64) -> Relation {
    if rhs >= 0.0 {
        return relation;
    }
    match relation {
        Relation::LessOrEqual => Relation::GreaterOrEqual,
        Relation::GreaterOrEqual => Relation::LessOrEqual,
        Relation::Equal => Relation::Equal,
    }
}

impl fmt::Display for Tableau {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Formatter::default().tableau(self))
    }
}
