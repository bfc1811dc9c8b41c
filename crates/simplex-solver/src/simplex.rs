use tracing::{debug, trace};

use crate::error::{SolveError, Stage};
use crate::problem::LinearProgram;
use crate::solution::Solution;
use crate::tableau::{Phase, Tableau};

/// Two-phase tableau simplex solver.
///
/// Pivoting uses the most negative reduced cost (lowest column on ties) and
/// the minimum-ratio test (first row on ties). No anti-cycling rule is
/// applied; `max_iterations` bounds a degenerate cycle instead.
pub struct Solver {
    /// Maximum pivots across both phases before giving up
    max_iterations: usize,
    /// Reduced costs above `-tolerance` count as optimal; pivot entries
    /// within `tolerance` of zero count as zero
    tolerance: f64,
    /// Largest phase-1 artificial sum still treated as feasible
    feasibility_tolerance: f64,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: 10000,
            tolerance: 1e-10,
            feasibility_tolerance: 1e-9,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_feasibility_tolerance(mut self, tol: f64) -> Self {
        self.feasibility_tolerance = tol;
        self
    }

    /// Solve the LP problem using the two-phase simplex method
    pub fn solve(&self, problem: &LinearProgram) -> Result<Solution, SolveError> {
        let mut tableau = Tableau::build(problem);
        debug!(
            variables = tableau.variables().len(),
            constraints = tableau.constraint_count(),
            phase = ?tableau.phase(),
            "built initial tableau"
        );
        trace!("initial tableau\n{}", tableau);

        let mut iterations = 0;
        if tableau.phase() == Phase::RequiresTwoPhase {
            iterations += self.phase1(&mut tableau)?;
        }
        iterations += self.run(&mut tableau, Stage::Two, iterations)?;

        tableau.finalize();
        debug!(
            iterations,
            objective = tableau.objective_value(),
            "reached optimal tableau"
        );
        Ok(Solution::from_tableau(tableau, iterations))
    }

    /// Drive the artificial variables out, then hand phase 2 a tableau with
    /// the real objective and no artificial columns.
    fn phase1(&self, tableau: &mut Tableau) -> Result<usize, SolveError> {
        // Row 0 minimizes the artificial sum; maximize its negation instead
        tableau.negate_objective_row();
        let pivots = self.run(tableau, Stage::One, 0)?;

        let residual = -tableau.objective_value();
        if residual.abs() > self.feasibility_tolerance {
            debug!(residual, "phase 1 optimum is nonzero");
            return Err(SolveError::Infeasible { residual });
        }

        tableau.restore_objective();
        trace!("restored objective\n{}", tableau);
        tableau.drop_artificial_columns()?;
        trace!("removed artificial variables\n{}", tableau);
        Ok(pivots)
    }

    /// Pivot until optimal or unbounded; returns the number of pivots made
    fn run(&self, tableau: &mut Tableau, stage: Stage, spent: usize) -> Result<usize, SolveError> {
        let mut pivots = 0;
        loop {
            let Some(column) = self.entering_column(tableau) else {
                debug!(%stage, pivots, "optimal");
                return Ok(pivots);
            };
            let Some(row) = self.leaving_row(tableau, column) else {
                debug!(%stage, column, "no finite ratio; unbounded");
                return Err(SolveError::Unbounded { stage });
            };
            if spent + pivots >= self.max_iterations {
                return Err(SolveError::IterationLimit {
                    limit: self.max_iterations,
                });
            }

            let variables = tableau.variables();
            let pivot_row = &tableau.matrix()[row + 1];
            trace!(
                %stage,
                entering = variables.at(column).map(|v| v.name()),
                leaving = variables.at(tableau.basic_variables()[row]).map(|v| v.name()),
                row = row + 1,
                ratio = pivot_row[tableau.rhs_column()] / pivot_row[column],
                "pivot"
            );
            tableau.pivot(row, column);
            pivots += 1;
            trace!("\n{}", tableau);
        }
    }

    /// Column with the most negative reduced cost, or `None` when optimal
    pub fn entering_column(&self, tableau: &Tableau) -> Option<usize> {
        let rhs = tableau.rhs_column();
        let mut best: Option<(usize, f64)> = None;
        for (j, &value) in tableau.matrix()[0][..rhs].iter().enumerate() {
            if best.is_none_or(|(_, min)| value < min) {
                best = Some((j, value));
            }
        }
        best.filter(|&(_, value)| value < -self.tolerance)
            .map(|(j, _)| j)
    }

    /// Constraint row (0-based) passing the minimum-ratio test, or `None`
    /// when every ratio is infinite.
    ///
    /// A zero RHS gives ratio 0 only against a positive entry; against a
    /// negative one the ratio counts as negative and the row is skipped.
    pub fn leaving_row(&self, tableau: &Tableau, column: usize) -> Option<usize> {
        let rhs = tableau.rhs_column();
        let mut best: Option<(usize, f64)> = None;
        for (i, row) in tableau.matrix()[1..].iter().enumerate() {
            let entry = row[column];
            if entry.abs() <= self.tolerance {
                continue;
            }
            let ratio = row[rhs] / entry;
            let admissible = ratio > 0.0 || (ratio == 0.0 && entry > 0.0);
            if !admissible {
                continue;
            }
            if best.is_none_or(|(_, min)| ratio < min) {
                best = Some((i, ratio));
            }
        }
        best.map(|(i, _)| i)
    }
}
