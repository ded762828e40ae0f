mod dense;
mod display;
mod dual;
mod expression;
mod problem;

pub use dense::DenseForm;
pub use dual::{dual, dual_relation, dual_restriction};
pub use expression::{LinearExpression, Term, Variable};
pub use problem::{Constraint, Direction, ModelError, Objective, Problem, Relation, SignRestriction};
