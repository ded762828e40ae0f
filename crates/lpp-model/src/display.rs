use std::fmt;

use crate::expression::LinearExpression;
use crate::problem::{Constraint, Direction, Problem, Relation, SignRestriction};

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Min => write!(f, "min"),
            Direction::Max => write!(f, "max"),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl fmt::Display for SignRestriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignRestriction::Free => write!(f, "free"),
            SignRestriction::NonNegative => write!(f, ">= 0"),
            SignRestriction::NonPositive => write!(f, "<= 0"),
        }
    }
}

/// Renders as `3x1 - x2 + 0.5x4`, or `0` when empty
impl fmt::Display for LinearExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "0");
        }
        for (i, term) in self.terms().enumerate() {
            let magnitude = term.coefficient.abs();
            match (i, term.coefficient < 0.0) {
                (0, true) => write!(f, "-")?,
                (0, false) => {}
                (_, true) => write!(f, " - ")?,
                (_, false) => write!(f, " + ")?,
            }
            if magnitude != 1.0 {
                write!(f, "{}", magnitude)?;
            }
            write!(f, "x{}", term.variable)?;
        }
        Ok(())
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.expression, self.relation, self.rhs)
    }
}

impl Problem {
    /// Whether the text rendering parses back. An empty objective or a
    /// constraint without variables (both possible in a dual) renders as `0`,
    /// which the parser rejects.
    pub fn has_text_form(&self) -> bool {
        !self.objective().expression.is_empty()
            && !self.constraints().is_empty()
            && self.constraints().iter().all(|c| !c.expression.is_empty())
    }
}

/// Renders the problem in the same free-form grammar the parser reads.
///
/// Only restrictions other than `>= 0` are listed, plus `xN >= 0` when the
/// last variable is otherwise unused so the variable count survives. See
/// [`Problem::has_text_form`] for problems that do not parse back.
impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.direction(), self.objective().expression)?;
        writeln!(f, "s.t.")?;
        for constraint in self.constraints() {
            writeln!(f, "  {}", constraint)?;
        }

        let explicit = self.explicit_restrictions();
        let trailing = self.num_variables() > self.max_referenced_variable();
        if !explicit.is_empty() || trailing {
            writeln!(f, "with")?;
            for (variable, restriction) in explicit {
                writeln!(f, "  x{} {}", variable, restriction)?;
            }
            if trailing {
                writeln!(f, "  x{} {}", self.num_variables(), SignRestriction::NonNegative)?;
            }
        }
        writeln!(f, "end")
    }
}
