use std::collections::BTreeMap;

use lpp_model::{SignRestriction, Variable};

use crate::ast::Statement;
use crate::expression::{parse_number, variable_index};
use crate::lexer::{Span, Token, TokenKind};
use crate::parser::ParseError;

/// Reads the `with` section: one or more variables followed by `free`,
/// `>= 0` or `<= 0`.
pub fn resolve(statement: &Statement) -> Result<BTreeMap<Variable, SignRestriction>, ParseError> {
    let tokens: Vec<&Token> = statement.significant().collect();
    let mut restrictions = BTreeMap::new();
    let mut pending: Vec<&Token> = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i];
        match token.kind {
            TokenKind::Variable => {
                pending.push(token);
                i += 1;
            }
            TokenKind::Free | TokenKind::Ge | TokenKind::Le => {
                if pending.is_empty() {
                    return Err(ParseError::Syntax {
                        message: "sign restriction without a variable".to_string(),
                        found: token.text.clone(),
                        span: token.span,
                    });
                }
                let (restriction, marker, next) = read_marker(&tokens, i)?;
                for variable in pending.drain(..) {
                    let index = variable_index(variable)?;
                    insert(&mut restrictions, index, restriction, variable.span.merge(marker))?;
                }
                i = next;
            }
            _ => {
                return Err(ParseError::Syntax {
                    message: "expected a variable, `free`, `>= 0` or `<= 0`".to_string(),
                    found: token.text.clone(),
                    span: token.span,
                });
            }
        }
    }

    if let Some(token) = pending.first() {
        return Err(ParseError::Syntax {
            message: "variable without a sign restriction".to_string(),
            found: token.text.clone(),
            span: token.span,
        });
    }

    Ok(restrictions)
}

/// Returns the restriction starting at `tokens[i]`, its span and the index
/// after it.
fn read_marker(tokens: &[&Token], i: usize) -> Result<(SignRestriction, Span, usize), ParseError> {
    let token = tokens[i];
    let restriction = match token.kind {
        TokenKind::Free => return Ok((SignRestriction::Free, token.span, i + 1)),
        TokenKind::Ge => SignRestriction::NonNegative,
        _ => SignRestriction::NonPositive,
    };

    let mut next = i + 1;
    while tokens
        .get(next)
        .is_some_and(|t| matches!(t.kind, TokenKind::Plus | TokenKind::Minus))
    {
        next += 1;
    }

    match tokens.get(next) {
        Some(bound) if bound.kind == TokenKind::Number => {
            if parse_number(bound)? != 0.0 {
                return Err(ParseError::Syntax {
                    message: "sign restriction bound must be 0".to_string(),
                    found: bound.text.clone(),
                    span: bound.span,
                });
            }
            Ok((restriction, token.span.merge(bound.span), next + 1))
        }
        other => {
            let found = other.copied().unwrap_or(token);
            Err(ParseError::Syntax {
                message: format!("expected 0 after `{}`", token.text),
                found: found.text.clone(),
                span: found.span,
            })
        }
    }
}

fn insert(
    restrictions: &mut BTreeMap<Variable, SignRestriction>,
    variable: Variable,
    restriction: SignRestriction,
    span: Span,
) -> Result<(), ParseError> {
    match restrictions.get(&variable) {
        Some(&first) if first != restriction => Err(ParseError::ConflictingRestriction {
            variable,
            first,
            second: restriction,
            span,
        }),
        _ => {
            restrictions.insert(variable, restriction);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn resolve_str(source: &str) -> Result<BTreeMap<Variable, SignRestriction>, ParseError> {
        let tokens = Lexer::tokenize(source)
            .into_iter()
            .filter(|t| t.kind != TokenKind::Eof && !t.kind.is_noise())
            .collect();
        resolve(&Statement::new(tokens))
    }

    #[test]
    fn test_restrictions() {
        let restrictions = resolve_str("x1 >= 0\nx2 free\nx3 <= 0").unwrap();
        assert_eq!(restrictions[&1], SignRestriction::NonNegative);
        assert_eq!(restrictions[&2], SignRestriction::Free);
        assert_eq!(restrictions[&3], SignRestriction::NonPositive);
    }

    #[test]
    fn test_variable_lists() {
        let restrictions = resolve_str("x1, x2 free x3 x4 => 0").unwrap();
        assert_eq!(restrictions.len(), 4);
        assert_eq!(restrictions[&1], SignRestriction::Free);
        assert_eq!(restrictions[&2], SignRestriction::Free);
        assert_eq!(restrictions[&4], SignRestriction::NonNegative);
    }

    #[test]
    fn test_repeated_restriction() {
        let restrictions = resolve_str("x1 free x1 free").unwrap();
        assert_eq!(restrictions[&1], SignRestriction::Free);
    }

    #[test]
    fn test_conflicting_restriction() {
        let error = resolve_str("x2 >= 0 x2 <= 0").unwrap_err();
        assert!(matches!(
            error,
            ParseError::ConflictingRestriction {
                variable: 2,
                first: SignRestriction::NonNegative,
                second: SignRestriction::NonPositive,
                ..
            }
        ));
    }

    #[test]
    fn test_nonzero_bound() {
        assert!(matches!(resolve_str("x1 >= 1"), Err(ParseError::Syntax { .. })));
        assert!(resolve_str("x1 >= 0.0").is_ok());
    }

    #[test]
    fn test_malformed_restrictions() {
        assert!(matches!(resolve_str(">= 0"), Err(ParseError::Syntax { .. })));
        assert!(matches!(resolve_str("x1"), Err(ParseError::Syntax { .. })));
        assert!(matches!(resolve_str("x1 >="), Err(ParseError::Syntax { .. })));
        assert!(matches!(resolve_str("x1 = 0"), Err(ParseError::Syntax { .. })));
        assert!(matches!(resolve_str("x1 >= x2"), Err(ParseError::Syntax { .. })));
        assert!(matches!(resolve_str("x0 free"), Err(ParseError::UnknownVariable { .. })));
    }
}
