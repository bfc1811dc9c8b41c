use std::fmt;

use crate::equation::Equation;
use crate::variable::VariableRegistry;

/// Whether the objective is maximized or minimized
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    #[cfg_attr(feature = "serde", serde(alias = "max"))]
    Maximize,
    #[cfg_attr(feature = "serde", serde(alias = "min"))]
    Minimize,
}

/// Comparison between a constraint's left-hand side and its constant
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Equal (=)
    #[cfg_attr(feature = "serde", serde(rename = "=", alias = "eq"))]
    Equal,
    /// Less than or equal (<=)
    #[cfg_attr(feature = "serde", serde(rename = "<=", alias = "le"))]
    LessOrEqual,
    /// Greater than or equal (>=)
    #[cfg_attr(feature = "serde", serde(rename = ">=", alias = "ge"))]
    GreaterOrEqual,
}

impl Relation {
    pub fn symbol(self) -> &'static str {
        match self {
            Relation::Equal => "=",
            Relation::LessOrEqual => "<=",
            Relation::GreaterOrEqual => ">=",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveFunction {
    equation: Equation,
    direction: Direction,
}

impl ObjectiveFunction {
    pub fn new(equation: Equation, direction: Direction) -> Self {
        Self { equation, direction }
    }

    pub fn equation(&self) -> &Equation {
        &self.equation
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_maximize(&self) -> bool {
        self.direction == Direction::Maximize
    }

    /// Turn `min f` into `max -f`.
    ///
    /// Panics when the objective already maximizes; callers convert once.
    pub fn convert_to_maximize(&mut self) {
        assert!(
            !self.is_maximize(),
            "objective function is already a maximization"
        );
        self.equation.negate();
        self.direction = Direction::Maximize;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    equation: Equation,
    relation: Relation,
    rhs: f64,
}

impl Constraint {
    pub fn new(equation: Equation, relation: Relation, rhs: f64) -> Self {
        Self { equation, relation, rhs }
    }

    pub fn equation(&self) -> &Equation {
        &self.equation
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }

    pub fn rhs(&self) -> f64 {
        self.rhs
    }
}

/// A linear program: decision variables, one objective, any number of constraints
#[derive(Debug, Clone, PartialEq)]
pub struct LinearProgram {
    registry: VariableRegistry,
    objective: ObjectiveFunction,
    constraints: Vec<Constraint>,
}

impl LinearProgram {
    pub fn new(registry: VariableRegistry, objective: ObjectiveFunction) -> Self {
        Self {
            registry,
            objective,
            constraints: Vec::new(),
        }
    }

    pub fn add_constraint(&mut self, equation: Equation, relation: Relation, rhs: f64) {
        self.constraints.push(Constraint::new(equation, relation, rhs));
    }

    pub fn registry(&self) -> &VariableRegistry {
        &self.registry
    }

    pub fn objective(&self) -> &ObjectiveFunction {
        &self.objective
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn num_variables(&self) -> usize {
        self.registry.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }
}
