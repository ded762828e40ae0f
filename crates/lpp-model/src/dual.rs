use std::collections::BTreeMap;

use tracing::debug;

use crate::expression::{LinearExpression, Term};
use crate::problem::{Constraint, Direction, Objective, Problem, Relation, SignRestriction};

/// Sign restriction of the dual variable that belongs to a primal constraint
/// with `relation`, in a primal problem optimized in `direction`.
pub fn dual_restriction(direction: Direction, relation: Relation) -> SignRestriction {
    match (direction, relation) {
        (_, Relation::Eq) => SignRestriction::Free,
        (Direction::Max, Relation::Le) | (Direction::Min, Relation::Ge) => {
            SignRestriction::NonNegative
        }
        (Direction::Max, Relation::Ge) | (Direction::Min, Relation::Le) => {
            SignRestriction::NonPositive
        }
    }
}

/// Relation of the dual constraint that belongs to a primal variable with
/// `restriction`, in a primal problem optimized in `direction`.
pub fn dual_relation(direction: Direction, restriction: SignRestriction) -> Relation {
    match (direction, restriction) {
        (_, SignRestriction::Free) => Relation::Eq,
        (Direction::Max, SignRestriction::NonNegative)
        | (Direction::Min, SignRestriction::NonPositive) => Relation::Ge,
        (Direction::Max, SignRestriction::NonPositive)
        | (Direction::Min, SignRestriction::NonNegative) => Relation::Le,
    }
}

/// Build the dual of `problem`
pub fn dual(problem: &Problem) -> Problem {
    problem.dual()
}

impl Problem {
    /// Build the dual problem.
    ///
    /// Dual variable `i` belongs to primal constraint `i`, dual constraint `j`
    /// to primal variable `j`. The constraint matrix is transposed, objective
    /// coefficients and right-hand sides swap places, and relations and sign
    /// restrictions follow [`dual_restriction`] and [`dual_relation`].
    /// Coefficients are copied, never recomputed, so `p.dual().dual() == p`.
    pub fn dual(&self) -> Problem {
        let direction = self.direction();
        let num_dual_variables = self.num_constraints();

        let objective: LinearExpression = self
            .constraints()
            .iter()
            .enumerate()
            .map(|(i, c)| Term::new(c.rhs, i + 1))
            .collect();

        let mut columns = vec![LinearExpression::new(); self.num_variables()];
        for (i, constraint) in self.constraints().iter().enumerate() {
            for term in constraint.expression.terms() {
                columns[term.variable - 1].add_term(i + 1, term.coefficient);
            }
        }

        let constraints: Vec<Constraint> = columns
            .into_iter()
            .enumerate()
            .map(|(j, column)| {
                let variable = j + 1;
                Constraint::new(
                    column,
                    dual_relation(direction, self.restriction(variable)),
                    self.objective().expression.coefficient(variable),
                )
            })
            .collect();

        let restrictions: BTreeMap<_, _> = self
            .constraints()
            .iter()
            .enumerate()
            .map(|(i, c)| (i + 1, dual_restriction(direction, c.relation)))
            .collect();

        debug!(
            primal_variables = self.num_variables(),
            primal_constraints = self.num_constraints(),
            "built dual problem"
        );

        Problem::from_parts(
            Objective::new(direction.flip(), objective),
            constraints,
            restrictions,
            num_dual_variables,
        )
    }
}
