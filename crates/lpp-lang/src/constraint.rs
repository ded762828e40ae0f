use lpp_model::{Constraint, Relation};
use tracing::trace;

use crate::ast::Statement;
use crate::expression::{out_of_range, parse_expression};
use crate::lexer::TokenKind;
use crate::parser::{ParseError, ParseOptions};

/// Turns one statement into `terms relation constant`, moving variable terms
/// to the left and constants to the right.
pub fn classify(statement: &Statement, options: &ParseOptions) -> Result<Constraint, ParseError> {
    let mut relations = statement
        .tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| t.kind.is_relation());

    let Some((index, token)) = relations.next() else {
        return Err(ParseError::RelationNotFound {
            statement: statement.text(),
            span: statement.span,
        });
    };
    if let Some((_, second)) = relations.next() {
        return Err(ParseError::Syntax {
            message: "more than one relation in a constraint".to_string(),
            found: second.text.clone(),
            span: second.span,
        });
    }

    let relation = match token.kind {
        TokenKind::Le => Relation::Le,
        TokenKind::Ge => Relation::Ge,
        TokenKind::Eq => Relation::Eq,
        TokenKind::Lt if options.allow_strict_inequalities => Relation::Le,
        TokenKind::Gt if options.allow_strict_inequalities => Relation::Ge,
        _ => {
            return Err(ParseError::Syntax {
                message: "strict inequalities are not supported, use `<=` or `>=`".to_string(),
                found: token.text.clone(),
                span: token.span,
            });
        }
    };

    let right = &statement.tokens[index + 1..];
    if right.iter().all(|t| t.kind == TokenKind::Newline) {
        return Err(ParseError::Syntax {
            message: "missing right-hand side".to_string(),
            found: token.text.clone(),
            span: token.span,
        });
    }

    let lhs = parse_expression(&statement.tokens[..index])?;
    let rhs = parse_expression(right)?;

    let mut expression = lhs.expression;
    expression.add_scaled(&rhs.expression, -1.0);
    let rhs_value = rhs.constant - lhs.constant;
    if !rhs_value.is_finite() || expression.terms().any(|t| !t.coefficient.is_finite()) {
        return Err(out_of_range(&statement.tokens, statement.span));
    }
    if expression.is_empty() {
        return Err(ParseError::Syntax {
            message: "constraint has no variable terms".to_string(),
            found: statement.text(),
            span: statement.span,
        });
    }

    let constraint = Constraint::new(expression, relation, rhs_value);
    trace!(statement = %statement.text(), constraint = %constraint, "classified constraint");
    Ok(constraint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn classify_str(source: &str, options: &ParseOptions) -> Result<Constraint, ParseError> {
        let tokens = Lexer::tokenize(source)
            .into_iter()
            .filter(|t| t.kind != TokenKind::Eof)
            .collect();
        classify(&Statement::new(tokens), options)
    }

    fn classify_default(source: &str) -> Result<Constraint, ParseError> {
        classify_str(source, &ParseOptions::default())
    }

    #[test]
    fn test_terms_move_left() {
        let constraint = classify_default("x1 <= 5 - x2").unwrap();
        assert_eq!(constraint.expression.coefficient(1), 1.0);
        assert_eq!(constraint.expression.coefficient(2), 1.0);
        assert_eq!(constraint.relation, Relation::Le);
        assert_eq!(constraint.rhs, 5.0);
    }

    #[test]
    fn test_constants_move_right() {
        let constraint = classify_default("2x1 + 3 >= 1 + x3 - 4").unwrap();
        assert_eq!(constraint.expression.coefficient(1), 2.0);
        assert_eq!(constraint.expression.coefficient(3), -1.0);
        assert_eq!(constraint.rhs, -6.0);
    }

    #[test]
    fn test_relation_spellings() {
        assert_eq!(classify_default("x1 =< 1").unwrap().relation, Relation::Le);
        assert_eq!(classify_default("x1 => 1").unwrap().relation, Relation::Ge);
        assert_eq!(classify_default("x1 ≤ 1").unwrap().relation, Relation::Le);
        assert_eq!(classify_default("x1 ≥ 1").unwrap().relation, Relation::Ge);
        assert_eq!(classify_default("x1 = 1").unwrap().relation, Relation::Eq);
        assert_eq!(classify_default("x1 == 1").unwrap().relation, Relation::Eq);
    }

    #[test]
    fn test_relation_not_found() {
        assert!(matches!(
            classify_default("x1 + x2"),
            Err(ParseError::RelationNotFound { .. })
        ));
    }

    #[test]
    fn test_two_relations() {
        assert!(matches!(classify_default("x1 <= 4 <= 5"), Err(ParseError::Syntax { .. })));
    }

    #[test]
    fn test_strict_inequalities() {
        assert!(matches!(classify_default("x1 > 1"), Err(ParseError::Syntax { .. })));

        let options = ParseOptions {
            allow_strict_inequalities: true,
        };
        assert_eq!(classify_str("x1 > 1", &options).unwrap().relation, Relation::Ge);
        assert_eq!(classify_str("x1 < 1", &options).unwrap().relation, Relation::Le);
    }

    #[test]
    fn test_empty_sides() {
        assert!(matches!(classify_default("x1 <="), Err(ParseError::Syntax { .. })));
        assert!(matches!(classify_default("3 <= 4"), Err(ParseError::Syntax { .. })));
        assert!(matches!(classify_default("x1 <= x1 + 2"), Err(ParseError::Syntax { .. })));

        let constraint = classify_default("<= x1").unwrap();
        assert_eq!(constraint.expression.coefficient(1), -1.0);
        assert_eq!(constraint.rhs, 0.0);
    }

    #[test]
    fn test_moved_terms_overflow() {
        let error = classify_default("1e308x1 <= -1e308x1").unwrap_err();
        assert_eq!(
            error,
            ParseError::Syntax {
                message: "number out of range after summing terms".to_string(),
                found: "1e308 x1 <= - 1e308 x1".to_string(),
                span: crate::lexer::Span::new(0, 19),
            }
        );
        assert!(matches!(
            classify_default("x1 + 1e308 <= -1e308"),
            Err(ParseError::Syntax { .. })
        ));

        let constraint = classify_default("1e308x1 <= 1e308x1 + x2").unwrap();
        assert_eq!(constraint.expression.variables().collect::<Vec<_>>(), vec![2]);
    }
}
