use std::fmt;

use simplex_solver::{
    Direction, LinearProgram, ObjectiveFunction, Relation, Solution, SolveError, Solver, VariableRegistry,
};
use thiserror::Error;
use tracing::debug;

use crate::parser::{parse_equation, ParseError};

/// A problem as entered by a user: variable count, equation texts and constants
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemInput {
    pub variables: usize,
    pub objective: String,
    pub direction: Direction,
    #[cfg_attr(feature = "serde", serde(default))]
    pub constraints: Vec<ConstraintInput>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintInput {
    pub lhs: String,
    pub relation: Relation,
    pub rhs: f64,
}

impl ConstraintInput {
    pub fn new(lhs: impl Into<String>, relation: Relation, rhs: f64) -> Self {
        Self {
            lhs: lhs.into(),
            relation,
            rhs,
        }
    }
}

/// Which equation of a problem an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Objective,
    /// 1-based constraint number
    Constraint(usize),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Objective => write!(f, "objective function"),
            Location::Constraint(n) => write!(f, "constraint {}", n),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Problem must have at least one variable")]
    NoVariables,
    #[error("Objective function is empty")]
    EmptyObjective,
    #[error("Constraint {index} is empty")]
    EmptyConstraint { index: usize },
    #[error("Constraint {index} has a non-finite right-hand side")]
    NonFiniteRhs { index: usize },
    #[error("Error in {location}: {source}")]
    Parse {
        location: Location,
        #[source]
        source: ParseError,
    },
}

impl CompileError {
    pub fn location(&self) -> Option<Location> {
        match self {
            CompileError::NoVariables => None,
            CompileError::EmptyObjective => Some(Location::Objective),
            CompileError::EmptyConstraint { index } | CompileError::NonFiniteRhs { index } => {
                Some(Location::Constraint(*index))
            }
            CompileError::Parse { location, .. } => Some(*location),
        }
    }
}

/// Turns a [`ProblemInput`] into a [`LinearProgram`]
#[derive(Debug, Clone)]
pub struct Compiler {
    prefix: String,
}

impl Default for Compiler {
    fn default() -> Self {
        Self {
            prefix: "X".to_string(),
        }
    }
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name decision variables `{prefix}1..{prefix}n` instead of `X1..Xn`
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn compile(&self, input: &ProblemInput) -> Result<LinearProgram, CompileError> {
        self.validate(input)?;

        let registry = VariableRegistry::with_prefix(&self.prefix, input.variables);

        let objective = parse_equation(&input.objective, &registry).map_err(|source| CompileError::Parse {
            location: Location::Objective,
            source,
        })?;

        let mut constraints = Vec::with_capacity(input.constraints.len());
        for (i, constraint) in input.constraints.iter().enumerate() {
            let equation = parse_equation(&constraint.lhs, &registry).map_err(|source| CompileError::Parse {
                location: Location::Constraint(i + 1),
                source,
            })?;
            constraints.push((equation, constraint.relation, constraint.rhs));
        }

        let mut problem = LinearProgram::new(registry, ObjectiveFunction::new(objective, input.direction));
        for (equation, relation, rhs) in constraints {
            problem.add_constraint(equation, relation, rhs);
        }

        debug!(
            variables = problem.num_variables(),
            constraints = problem.num_constraints(),
            direction = ?input.direction,
            "compiled problem"
        );
        Ok(problem)
    }

    fn validate(&self, input: &ProblemInput) -> Result<(), CompileError> {
        if input.variables == 0 {
            return Err(CompileError::NoVariables);
        }
        if input.objective.trim().is_empty() {
            return Err(CompileError::EmptyObjective);
        }
        for (i, constraint) in input.constraints.iter().enumerate() {
            if constraint.lhs.trim().is_empty() {
                return Err(CompileError::EmptyConstraint { index: i + 1 });
            }
            if !constraint.rhs.is_finite() {
                return Err(CompileError::NonFiniteRhs { index: i + 1 });
            }
        }
        Ok(())
    }
}

/// Anything that can go wrong between equation text and a solution
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Solve(#[from] SolveError),
}

/// Compile and solve with default settings
pub fn solve(input: &ProblemInput) -> Result<Solution, Error> {
    solve_with(input, &Solver::new())
}

pub fn solve_with(input: &ProblemInput, solver: &Solver) -> Result<Solution, Error> {
    let problem = Compiler::new().compile(input)?;
    Ok(solver.solve(&problem)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use simplex_solver::Stage;

    fn problem(variables: usize, objective: &str, direction: Direction, constraints: &[(&str, Relation, f64)]) -> ProblemInput {
        ProblemInput {
            variables,
            objective: objective.to_string(),
            direction,
            constraints: constraints
                .iter()
                .map(|(lhs, relation, rhs)| ConstraintInput::new(*lhs, *relation, *rhs))
                .collect(),
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-6, "expected {}, got {}", expected, actual);
    }

    /// Every constraint holds at the reported point, re-evaluated from the text
    fn assert_feasible(input: &ProblemInput, solution: &Solution) {
        let lp = Compiler::new().compile(input).unwrap();
        let values: Vec<f64> = solution.values.iter().map(|v| v.value).collect();
        assert!(values.iter().all(|&v| v >= -1e-6), "negative value in {:?}", values);
        for (i, c) in lp.constraints().iter().enumerate() {
            let lhs = c.equation().evaluate(|index| values[index - 1]);
            let ok = match c.relation() {
                Relation::LessOrEqual => lhs <= c.rhs() + 1e-6,
                Relation::GreaterOrEqual => lhs >= c.rhs() - 1e-6,
                Relation::Equal => (lhs - c.rhs()).abs() < 1e-6,
            };
            assert!(ok, "constraint {} violated: {} {} {}", i + 1, lhs, c.relation(), c.rhs());
        }
    }

    #[test]
    fn test_compile_registry_and_constraints() {
        let input = problem(
            3,
            "X1 + 2X3",
            Direction::Maximize,
            &[("X1 + X2", Relation::LessOrEqual, 4.0), ("x3", Relation::GreaterOrEqual, 1.0)],
        );
        let lp = Compiler::new().compile(&input).unwrap();
        assert_eq!(lp.num_variables(), 3);
        assert_eq!(lp.num_constraints(), 2);
        let names: Vec<_> = lp.registry().iter().map(|v| v.name()).collect();
        assert_eq!(names, vec!["X1", "X2", "X3"]);
        assert_eq!(lp.objective().equation().get(2), Some(0.0));
        assert_eq!(lp.objective().equation().get(3), Some(2.0));
        assert_eq!(lp.constraints()[1].relation(), Relation::GreaterOrEqual);
        assert_eq!(lp.constraints()[1].rhs(), 1.0);
    }

    #[test]
    fn test_custom_prefix() {
        let input = problem(2, "Y1 + Y2", Direction::Maximize, &[("Y1 + Y2", Relation::LessOrEqual, 1.0)]);
        let lp = Compiler::new().with_prefix("Y").compile(&input).unwrap();
        assert!(lp.registry().find("y2").is_some());
        assert!(Compiler::new().compile(&input).is_err());
    }

    #[test]
    fn test_validation() {
        let input = problem(0, "X1", Direction::Maximize, &[]);
        assert_eq!(Compiler::new().compile(&input), Err(CompileError::NoVariables));

        let input = problem(2, "   ", Direction::Maximize, &[]);
        assert_eq!(Compiler::new().compile(&input), Err(CompileError::EmptyObjective));

        let input = problem(
            2,
            "X1",
            Direction::Maximize,
            &[("X1", Relation::LessOrEqual, 1.0), ("", Relation::LessOrEqual, 1.0)],
        );
        assert_eq!(Compiler::new().compile(&input), Err(CompileError::EmptyConstraint { index: 2 }));

        let input = problem(2, "X1", Direction::Maximize, &[("X1", Relation::LessOrEqual, f64::NAN)]);
        assert_eq!(Compiler::new().compile(&input), Err(CompileError::NonFiniteRhs { index: 1 }));
    }

    #[test]
    fn test_first_parse_error_wins() {
        let input = problem(
            2,
            "X1 + X2",
            Direction::Maximize,
            &[
                ("X1 + X2", Relation::LessOrEqual, 4.0),
                ("X1 +", Relation::LessOrEqual, 1.0),
                ("X7", Relation::LessOrEqual, 1.0),
            ],
        );
        let err = Compiler::new().compile(&input).unwrap_err();
        assert_eq!(err.location(), Some(Location::Constraint(2)));
        assert!(matches!(
            err,
            CompileError::Parse {
                source: ParseError::Incomplete { .. },
                ..
            }
        ));
        assert_eq!(err.to_string(), "Error in constraint 2: Your equation is incomplete: X1 +");
    }

    #[test]
    fn test_objective_is_parsed_first() {
        let input = problem(1, "X2", Direction::Maximize, &[("X1 +*", Relation::LessOrEqual, 1.0)]);
        let err = Compiler::new().compile(&input).unwrap_err();
        assert_eq!(err.location(), Some(Location::Objective));
        assert!(matches!(
            err,
            CompileError::Parse {
                source: ParseError::UndeclaredVariable { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_solve_three_variable_maximization() {
        let input = problem(
            3,
            "3X1 + 2X2 + X3",
            Direction::Maximize,
            &[
                ("X1 + X2 + X3", Relation::LessOrEqual, 40.0),
                ("2X1 + X2 - X3", Relation::GreaterOrEqual, 10.0),
                ("-X2 + X3", Relation::GreaterOrEqual, -10.0),
            ],
        );
        let solution = solve(&input).unwrap();
        assert_close(solution.objective_value, 120.0);
        assert_close(solution.value("X1").unwrap(), 40.0);
        assert_close(solution.value("X2").unwrap(), 0.0);
        assert_close(solution.value("X3").unwrap(), 0.0);
        assert_feasible(&input, &solution);
    }

    #[test]
    fn test_solve_negative_right_hand_sides() {
        let input = problem(
            2,
            "X1 + X2",
            Direction::Maximize,
            &[("-X1 - X2", Relation::GreaterOrEqual, -4.0)],
        );
        let solution = solve(&input).unwrap();
        assert_close(solution.objective_value, 4.0);
        assert_feasible(&input, &solution);

        let input = problem(
            1,
            "X1",
            Direction::Minimize,
            &[("X1", Relation::LessOrEqual, 5.0), ("-X1", Relation::LessOrEqual, -2.0)],
        );
        let solution = solve(&input).unwrap();
        assert_close(solution.objective_value, 2.0);
        assert_feasible(&input, &solution);

        let input = problem(1, "X1", Direction::Maximize, &[("X1", Relation::LessOrEqual, -1.0)]);
        assert!(matches!(
            solve(&input),
            Err(Error::Solve(SolveError::Infeasible { .. }))
        ));
    }

    #[test]
    fn test_solve_two_phase_minimization() {
        let input = problem(
            2,
            "15X1 + 20X2",
            Direction::Minimize,
            &[
                ("X1 + 2X2", Relation::GreaterOrEqual, 10.0),
                ("2X1 - 3X2", Relation::LessOrEqual, 6.0),
                ("X1 + X2", Relation::GreaterOrEqual, 6.0),
            ],
        );
        let solution = solve(&input).unwrap();
        assert_close(solution.objective_value, 110.0);
        assert_close(solution.value("x1").unwrap(), 2.0);
        assert_close(solution.value("x2").unwrap(), 4.0);
        assert_eq!(solution.values.len(), 2);
        assert_feasible(&input, &solution);
    }

    #[test]
    fn test_solve_unbounded() {
        let input = problem(
            2,
            "X1 + X2",
            Direction::Maximize,
            &[("X1 - X2", Relation::LessOrEqual, 2.0)],
        );
        assert_eq!(solve(&input).unwrap_err(), Error::Solve(SolveError::Unbounded { stage: Stage::Two }));
    }

    #[test]
    fn test_solve_infeasible() {
        let input = problem(
            1,
            "X1",
            Direction::Maximize,
            &[("X1", Relation::GreaterOrEqual, 5.0), ("X1", Relation::LessOrEqual, 3.0)],
        );
        assert!(matches!(
            solve(&input),
            Err(Error::Solve(SolveError::Infeasible { .. }))
        ));
    }

    #[test]
    fn test_solve_reports_compile_errors() {
        let input = problem(3, "X5", Direction::Maximize, &[]);
        let err = solve(&input).unwrap_err();
        match err {
            Error::Compile(CompileError::Parse { source, .. }) => assert_eq!(source.variable(), Some("X5")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_iteration_limit_is_respected() {
        let input = problem(
            2,
            "3X1 + 2X2",
            Direction::Maximize,
            &[("X1 + X2", Relation::LessOrEqual, 4.0), ("X1 + 3X2", Relation::LessOrEqual, 6.0)],
        );
        let err = solve_with(&input, &Solver::new().with_max_iterations(0)).unwrap_err();
        assert_eq!(err, Error::Solve(SolveError::IterationLimit { limit: 0 }));
    }
}
