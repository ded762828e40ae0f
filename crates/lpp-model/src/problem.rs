use std::collections::BTreeMap;

use thiserror::Error;

use crate::expression::{LinearExpression, Variable};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Variable index 0 in {0}: variables are numbered from 1")]
    ZeroIndex(String),
    #[error("Malformed dense form: {0}")]
    DenseShape(String),
    #[error("Invalid {field} code {code}")]
    DenseCode { field: &'static str, code: i64 },
}

/// Represents a linear programming problem.
///
/// A `Problem` is immutable once built: every variable `1..=num_variables`
/// carries exactly one sign restriction, and constraint order is fixed since
/// it determines the numbering of the dual variables. Only restrictions other
/// than the non-negative default are stored, so large indices stay cheap.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "ProblemRepr", into = "ProblemRepr")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    objective: Objective,
    constraints: Vec<Constraint>,
    restrictions: BTreeMap<Variable, SignRestriction>,
    num_variables: usize,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    /// Whether to minimize or maximize
    pub direction: Direction,
    /// Objective function
    pub expression: LinearExpression,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Left-hand side, holding every variable term
    pub expression: LinearExpression,
    /// Comparison operator
    pub relation: Relation,
    /// Right-hand side value
    pub rhs: f64,
}

#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Min,
    Max,
}

#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SignRestriction {
    /// Unrestricted
    Free,
    /// x >= 0
    #[default]
    NonNegative,
    /// x <= 0
    NonPositive,
}

impl Direction {
    pub fn flip(self) -> Self {
        match self {
            Direction::Min => Direction::Max,
            Direction::Max => Direction::Min,
        }
    }
}

impl Relation {
    pub fn symbol(self) -> &'static str {
        match self {
            Relation::Le => "<=",
            Relation::Ge => ">=",
            Relation::Eq => "=",
        }
    }
}

impl Objective {
    pub fn new(direction: Direction, expression: LinearExpression) -> Self {
        Self { direction, expression }
    }
}

impl Constraint {
    pub fn new(expression: LinearExpression, relation: Relation, rhs: f64) -> Self {
        Self { expression, relation, rhs }
    }
}

impl Problem {
    /// Build a problem, numbering variables up to the highest index referenced
    /// by the objective, the constraints, or `restrictions`. Variables missing
    /// from `restrictions` default to non-negative.
    pub fn new(
        objective: Objective,
        constraints: Vec<Constraint>,
        restrictions: BTreeMap<Variable, SignRestriction>,
    ) -> Result<Self, ModelError> {
        if objective.expression.variables().any(|v| v == 0) {
            return Err(ModelError::ZeroIndex("objective".to_string()));
        }
        for (i, constraint) in constraints.iter().enumerate() {
            if constraint.expression.variables().any(|v| v == 0) {
                return Err(ModelError::ZeroIndex(format!("constraint {}", i + 1)));
            }
        }
        if restrictions.contains_key(&0) {
            return Err(ModelError::ZeroIndex("sign restrictions".to_string()));
        }

        let num_variables = objective
            .expression
            .max_variable()
            .into_iter()
            .chain(constraints.iter().filter_map(|c| c.expression.max_variable()))
            .chain(restrictions.keys().next_back().copied())
            .max()
            .unwrap_or(0);

        Ok(Self::from_parts(objective, constraints, restrictions, num_variables))
    }

    /// Callers guarantee every index is in `1..=num_variables`.
    pub(crate) fn from_parts(
        objective: Objective,
        constraints: Vec<Constraint>,
        mut restrictions: BTreeMap<Variable, SignRestriction>,
        num_variables: usize,
    ) -> Self {
        restrictions.retain(|_, r| *r != SignRestriction::default());
        Self {
            objective,
            constraints,
            restrictions,
            num_variables,
        }
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn direction(&self) -> Direction {
        self.objective.direction
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Restriction of every variable `1..=num_variables`, defaults included
    pub fn restrictions(&self) -> impl Iterator<Item = (Variable, SignRestriction)> + '_ {
        (1..=self.num_variables).map(|v| (v, self.restriction(v)))
    }

    /// Restrictions other than the non-negative default
    pub fn explicit_restrictions(&self) -> &BTreeMap<Variable, SignRestriction> {
        &self.restrictions
    }

    /// Highest index used by the objective, a constraint or an explicit
    /// restriction; `num_variables` may be larger
    pub fn max_referenced_variable(&self) -> usize {
        self.objective
            .expression
            .max_variable()
            .into_iter()
            .chain(self.constraints.iter().filter_map(|c| c.expression.max_variable()))
            .chain(self.restrictions.keys().next_back().copied())
            .max()
            .unwrap_or(0)
    }

    pub fn restriction(&self, variable: Variable) -> SignRestriction {
        self.restrictions.get(&variable).copied().unwrap_or_default()
    }

    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }
}

/// Serialized layout of a [`Problem`]; loading goes back through
/// [`Problem::new`] so saved models obey the same invariants.
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct ProblemRepr {
    objective: Objective,
    constraints: Vec<Constraint>,
    #[serde(default)]
    restrictions: BTreeMap<Variable, SignRestriction>,
    #[serde(default)]
    num_variables: usize,
}

#[cfg(feature = "serde")]
impl TryFrom<ProblemRepr> for Problem {
    type Error = ModelError;

    fn try_from(repr: ProblemRepr) -> Result<Self, Self::Error> {
        let mut problem = Problem::new(repr.objective, repr.constraints, repr.restrictions)?;
        problem.num_variables = problem.num_variables.max(repr.num_variables);
        Ok(problem)
    }
}

#[cfg(feature = "serde")]
impl From<Problem> for ProblemRepr {
    fn from(problem: Problem) -> Self {
        Self {
            objective: problem.objective,
            constraints: problem.constraints,
            restrictions: problem.restrictions,
            num_variables: problem.num_variables,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::Term;

    fn expr(terms: &[(f64, Variable)]) -> LinearExpression {
        terms.iter().map(|&(c, v)| Term::new(c, v)).collect()
    }

    #[test]
    fn test_num_variables_and_default_restrictions() {
        let problem = Problem::new(
            Objective::new(Direction::Max, expr(&[(1.0, 1)])),
            vec![Constraint::new(expr(&[(1.0, 4)]), Relation::Le, 1.0)],
            BTreeMap::new(),
        )
        .unwrap();

        assert_eq!(problem.num_variables(), 4);
        assert_eq!(problem.restrictions().count(), 4);
        assert!(problem
            .restrictions()
            .all(|(_, r)| r == SignRestriction::NonNegative));
        assert!(problem.explicit_restrictions().is_empty());
    }

    #[test]
    fn test_large_index_stores_no_defaults() {
        let mut restrictions = BTreeMap::new();
        restrictions.insert(3, SignRestriction::NonNegative);
        restrictions.insert(7, SignRestriction::Free);
        let problem = Problem::new(
            Objective::new(Direction::Max, expr(&[(1.0, 1_000_000_000)])),
            vec![Constraint::new(expr(&[(1.0, 1_000_000_000)]), Relation::Le, 1.0)],
            restrictions,
        )
        .unwrap();

        assert_eq!(problem.num_variables(), 1_000_000_000);
        assert_eq!(problem.explicit_restrictions().len(), 1);
        assert_eq!(problem.restriction(7), SignRestriction::Free);
        assert_eq!(problem.restriction(999_999_999), SignRestriction::NonNegative);
        assert_eq!(
            problem.restrictions().nth(6),
            Some((7, SignRestriction::Free))
        );
    }

    #[test]
    fn test_default_restriction_declared_explicitly() {
        let mut restrictions = BTreeMap::new();
        restrictions.insert(2, SignRestriction::NonNegative);
        let declared = Problem::new(
            Objective::new(Direction::Min, expr(&[(1.0, 1), (1.0, 2)])),
            vec![Constraint::new(expr(&[(1.0, 1)]), Relation::Ge, 1.0)],
            restrictions,
        )
        .unwrap();
        let implicit = Problem::new(
            Objective::new(Direction::Min, expr(&[(1.0, 1), (1.0, 2)])),
            vec![Constraint::new(expr(&[(1.0, 1)]), Relation::Ge, 1.0)],
            BTreeMap::new(),
        )
        .unwrap();
        assert_eq!(declared, implicit);
    }

    #[test]
    fn test_declared_restriction_extends_variable_count() {
        let mut restrictions = BTreeMap::new();
        restrictions.insert(6, SignRestriction::Free);
        let problem = Problem::new(
            Objective::new(Direction::Min, expr(&[(2.0, 1)])),
            vec![Constraint::new(expr(&[(1.0, 1)]), Relation::Ge, 1.0)],
            restrictions,
        )
        .unwrap();

        assert_eq!(problem.num_variables(), 6);
        assert_eq!(problem.restriction(6), SignRestriction::Free);
        assert_eq!(problem.restriction(3), SignRestriction::NonNegative);
    }

    #[test]
    fn test_zero_index_rejected() {
        let result = Problem::new(
            Objective::new(Direction::Min, expr(&[(1.0, 0)])),
            vec![],
            BTreeMap::new(),
        );
        assert!(matches!(result, Err(ModelError::ZeroIndex(_))));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_round_trip() {
        let mut restrictions = BTreeMap::new();
        restrictions.insert(2, SignRestriction::NonPositive);
        let problem = Problem::new(
            Objective::new(Direction::Max, expr(&[(3.0, 1), (5.0, 2)])),
            vec![
                Constraint::new(expr(&[(1.0, 1), (2.0, 2)]), Relation::Le, 4.0),
                Constraint::new(expr(&[(3.0, 1), (-2.5, 2)]), Relation::Eq, -6.0),
            ],
            restrictions,
        )
        .unwrap();

        let json = serde_json::to_string(&problem).unwrap();
        assert!(json.contains("\"direction\":\"max\""));
        assert!(json.contains("\"relation\":\"le\""));
        assert!(json.contains("\"2\":\"nonpositive\""));

        let loaded: Problem = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, problem);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_keeps_unreferenced_variables() {
        let mut restrictions = BTreeMap::new();
        restrictions.insert(5, SignRestriction::NonNegative);
        let problem = Problem::new(
            Objective::new(Direction::Max, expr(&[(1.0, 1)])),
            vec![Constraint::new(expr(&[(1.0, 1)]), Relation::Le, 1.0)],
            restrictions,
        )
        .unwrap();
        assert_eq!(problem.num_variables(), 5);

        let json = serde_json::to_string(&problem).unwrap();
        let loaded: Problem = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.num_variables(), 5);
        assert_eq!(loaded, problem);
    }
}
