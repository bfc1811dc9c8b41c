mod equation;
mod error;
mod format;
mod problem;
mod simplex;
mod solution;
mod tableau;
mod variable;

pub use equation::Equation;
pub use error::{SolveError, Stage};
pub use format::Formatter;
pub use problem::{Constraint, Direction, LinearProgram, ObjectiveFunction, Relation};
pub use simplex::Solver;
pub use solution::{Solution, VariableValue};
pub use tableau::{Phase, Tableau};
pub use variable::{Variable, VariableKind, VariableRegistry};
