use lpp_model::{LinearExpression, Variable};

use crate::lexer::{Span, Token, TokenKind};
use crate::parser::ParseError;

/// A parsed sum of terms: the variable part and whatever constant terms were
/// left over.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedExpression {
    pub expression: LinearExpression,
    pub constant: f64,
}

/// Parse a sum of signed terms.
///
/// A term is `number`, `variable`, or `number ['*'] variable`; a coefficient
/// may be followed by its variable after spaces but not after a line break.
/// Runs of `+`/`-` fold into one sign, and repeated variables are summed.
pub fn parse_expression(tokens: &[Token]) -> Result<ParsedExpression, ParseError> {
    let mut parsed = ParsedExpression::default();
    let mut sign = 1.0;
    let mut sign_token: Option<&Token> = None;
    let mut terms = 0;
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];
        match token.kind {
            TokenKind::Newline => i += 1,
            TokenKind::Plus => {
                sign_token = Some(token);
                i += 1;
            }
            TokenKind::Minus => {
                sign = -sign;
                sign_token = Some(token);
                i += 1;
            }
            TokenKind::Number | TokenKind::Variable => {
                if terms > 0 && sign_token.is_none() {
                    return Err(ParseError::Syntax {
                        message: "missing `+` or `-` between terms".to_string(),
                        found: token.text.clone(),
                        span: token.span,
                    });
                }
                let (coefficient, variable, next) = read_term(tokens, i)?;
                let merged = match variable {
                    Some(variable) => {
                        parsed.expression.add_term(variable, sign * coefficient);
                        parsed.expression.coefficient(variable)
                    }
                    None => {
                        parsed.constant += sign * coefficient;
                        parsed.constant
                    }
                };
                if !merged.is_finite() {
                    let end = tokens[next - 1].span.end;
                    return Err(out_of_range(&tokens[i..next], Span::new(token.span.start, end)));
                }
                terms += 1;
                sign = 1.0;
                sign_token = None;
                i = next;
            }
            _ => {
                return Err(ParseError::Syntax {
                    message: "expected a number or a variable".to_string(),
                    found: token.text.clone(),
                    span: token.span,
                });
            }
        }
    }

    if let Some(token) = sign_token {
        return Err(ParseError::Syntax {
            message: "sign is not followed by a term".to_string(),
            found: token.text.clone(),
            span: token.span,
        });
    }

    Ok(parsed)
}

/// Reads the term starting at `tokens[i]`, returning its coefficient, its
/// variable (`None` for a constant) and the index after it.
fn read_term(tokens: &[Token], i: usize) -> Result<(f64, Option<Variable>, usize), ParseError> {
    let token = &tokens[i];
    if token.kind == TokenKind::Variable {
        return Ok((1.0, Some(variable_index(token)?), i + 1));
    }

    let value = parse_number(token)?;
    let mut next = i + 1;

    if let Some(star) = tokens.get(next).filter(|t| t.kind == TokenKind::Star) {
        next += 1;
        while tokens.get(next).is_some_and(|t| t.kind == TokenKind::Newline) {
            next += 1;
        }
        return match tokens.get(next) {
            Some(t) if t.kind == TokenKind::Variable => Ok((value, Some(variable_index(t)?), next + 1)),
            _ => Err(ParseError::Syntax {
                message: "expected a variable after `*`".to_string(),
                found: star.text.clone(),
                span: star.span,
            }),
        };
    }

    match tokens.get(next) {
        Some(t) if t.kind == TokenKind::Variable => Ok((value, Some(variable_index(t)?), next + 1)),
        _ => Ok((value, None, next)),
    }
}

/// Error for a sum whose value no longer fits in an `f64`
pub fn out_of_range(tokens: &[Token], span: Span) -> ParseError {
    let found: Vec<&str> = tokens
        .iter()
        .filter(|t| t.kind != TokenKind::Newline)
        .map(|t| t.text.as_str())
        .collect();
    ParseError::Syntax {
        message: "number out of range after summing terms".to_string(),
        found: found.join(" "),
        span,
    }
}

pub fn parse_number(token: &Token) -> Result<f64, ParseError> {
    match token.text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ParseError::Syntax {
            message: "invalid number".to_string(),
            found: token.text.clone(),
            span: token.span,
        }),
    }
}

/// Index of an `x<digits>` token; `x`, `x0` and overflowing indices are
/// rejected.
pub fn variable_index(token: &Token) -> Result<Variable, ParseError> {
    let unknown = || ParseError::UnknownVariable {
        text: token.text.clone(),
        span: token.span,
    };
    let digits = token.text.get(1..).ok_or_else(unknown)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(unknown());
    }
    match digits.parse::<Variable>() {
        Ok(index) if index > 0 => Ok(index),
        _ => Err(unknown()),
    }
}
