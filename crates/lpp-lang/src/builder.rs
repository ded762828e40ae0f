use std::collections::BTreeMap;

use lpp_model::{Objective, Problem};
use tracing::debug;

use crate::ast::{ObjectiveSection, Sections};
use crate::constraint::classify;
use crate::expression::parse_expression;
use crate::parser::{ParseError, ParseOptions};
use crate::restriction::resolve;

/// Assembles scanned sections into a [`Problem`]
pub struct ModelBuilder<'a> {
    options: &'a ParseOptions,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(options: &'a ParseOptions) -> Self {
        Self { options }
    }

    pub fn build(&self, sections: &Sections) -> Result<Problem, ParseError> {
        let objective = self.objective(&sections.objective)?;

        if sections.constraints.is_empty() {
            return Err(ParseError::EmptyProblem(
                "no constraints after `s.t.`".to_string(),
            ));
        }
        let constraints = sections
            .constraints
            .iter()
            .map(|statement| classify(statement, self.options))
            .collect::<Result<Vec<_>, _>>()?;

        let restrictions = match &sections.restrictions {
            Some(statement) => resolve(statement)?,
            None => BTreeMap::new(),
        };

        let problem = Problem::new(objective, constraints, restrictions)?;
        debug!(
            direction = %problem.direction(),
            variables = problem.num_variables(),
            constraints = problem.num_constraints(),
            "built problem"
        );
        Ok(problem)
    }

    fn objective(&self, section: &ObjectiveSection) -> Result<Objective, ParseError> {
        let parsed = parse_expression(&section.body.tokens)?;

        if parsed.constant != 0.0 {
            return Err(ParseError::Syntax {
                message: "constant term in the objective".to_string(),
                found: section.body.text(),
                span: section.body.span,
            });
        }
        if parsed.expression.is_empty() {
            return Err(ParseError::EmptyProblem(
                "objective has no variable terms".to_string(),
            ));
        }

        Ok(Objective::new(section.direction, parsed.expression))
    }
}
