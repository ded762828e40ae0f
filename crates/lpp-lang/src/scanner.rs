use lpp_model::Direction;
use tracing::{debug, trace};

use crate::ast::{ObjectiveSection, Sections, Statement};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::parser::ParseError;

/// Splits a problem description into its sections.
///
/// Everything before the first `min`/`max` and after `end` is ignored, and
/// noise tokens inside the sections are dropped.
pub fn scan(source: &str) -> Result<Sections, ParseError> {
    scan_tokens(Lexer::tokenize(source))
}

pub fn scan_tokens(tokens: Vec<Token>) -> Result<Sections, ParseError> {
    let find = |kind: TokenKind, from: usize, to: usize| {
        tokens[from..to]
            .iter()
            .position(|t| t.kind == kind)
            .map(|i| i + from)
    };

    let start = tokens
        .iter()
        .position(|t| matches!(t.kind, TokenKind::Min | TokenKind::Max));
    let end = find(TokenKind::End, start.unwrap_or(0), tokens.len()).ok_or(ParseError::MissingEnd)?;
    let Some(start) = start else {
        return Err(ParseError::EmptyProblem(
            "no objective: expected `min` or `max` before `end`".to_string(),
        ));
    };
    let subject_to = find(TokenKind::SubjectTo, start + 1, end).ok_or_else(|| {
        ParseError::EmptyProblem(
            "no constraints: expected `s.t.` or `subject to` after the objective".to_string(),
        )
    })?;
    let with = find(TokenKind::With, subject_to + 1, end);

    if start > 0 {
        trace!(tokens = start, "skipping text before the objective");
    }

    let direction = match tokens[start].kind {
        TokenKind::Max => Direction::Max,
        _ => Direction::Min,
    };
    let keyword = tokens[start].span;

    let objective = strip_noise(&tokens[start + 1..subject_to]);
    reject_keywords(&objective, "the objective", &[])?;

    let constraints = strip_noise(&tokens[subject_to + 1..with.unwrap_or(end)]);
    reject_keywords(&constraints, "the constraints", &[])?;

    let restrictions = match with {
        Some(with) => {
            let section = strip_noise(&tokens[with + 1..end]);
            reject_keywords(&section, "the `with` section", &[TokenKind::Free])?;
            Some(Statement::new(section))
        }
        None => None,
    };

    let constraints = split_statements(constraints);
    debug!(
        constraints = constraints.len(),
        has_with = restrictions.is_some(),
        "scanned problem sections"
    );

    Ok(Sections {
        objective: ObjectiveSection {
            direction,
            keyword,
            body: Statement::new(objective),
        },
        constraints,
        restrictions,
    })
}

fn strip_noise(tokens: &[Token]) -> Vec<Token> {
    tokens
        .iter()
        .filter(|t| {
            if t.kind.is_noise() {
                trace!(text = %t.text, span = %t.span, "skipping unrecognized text");
                false
            } else {
                true
            }
        })
        .cloned()
        .collect()
}

fn reject_keywords(tokens: &[Token], section: &str, allowed: &[TokenKind]) -> Result<(), ParseError> {
    match tokens
        .iter()
        .find(|t| t.kind.is_keyword() && !allowed.contains(&t.kind))
    {
        Some(token) => Err(ParseError::Syntax {
            message: format!("unexpected keyword in {}", section),
            found: token.text.clone(),
            span: token.span,
        }),
        None => Ok(()),
    }
}

/// Where a statement may be cut: in front of a signed right-hand-side term,
/// or between a right-hand-side number and a variable glued to it
struct SplitPoint {
    index: usize,
    after_line_break: bool,
    before_variable: bool,
}

/// Cuts the constraint section into statements without relying on line
/// breaks.
///
/// Once a statement has a relation and a right-hand-side term, an unsigned
/// term starts the next statement. When a second relation turns up, the
/// statement is cut at the last split point that starts a line, or else at
/// the first one. Without any candidate both relations stay in one statement
/// for the classifier to reject.
fn split_statements(tokens: Vec<Token>) -> Vec<Statement> {
    let mut statements = Vec::new();
    let mut current: Vec<Token> = Vec::new();
    let mut has_relation = false;
    let mut rhs_terms = 0;
    let mut sign_start: Option<SplitPoint> = None;
    let mut line_break = false;
    let mut split_points: Vec<SplitPoint> = Vec::new();
    // The last number may end its statement before a variable glued to it
    let mut open_number = false;

    for token in tokens {
        match token.kind {
            TokenKind::Newline => line_break = true,
            TokenKind::Plus | TokenKind::Minus => {
                if sign_start.is_none() {
                    sign_start = Some(SplitPoint {
                        index: current.len(),
                        after_line_break: line_break,
                        before_variable: false,
                    });
                }
            }
            TokenKind::Number | TokenKind::Variable => {
                let last = current.last().map(|t| t.kind);
                let continues_term = token.kind == TokenKind::Variable
                    && matches!(last, Some(TokenKind::Number | TokenKind::Star));
                if continues_term {
                    if open_number && last == Some(TokenKind::Number) {
                        split_points.push(SplitPoint {
                            index: current.len(),
                            after_line_break: false,
                            before_variable: true,
                        });
                    }
                } else {
                    let mut signed_split = false;
                    if has_relation && rhs_terms > 0 {
                        match sign_start.take() {
                            Some(point) => {
                                split_points.push(point);
                                signed_split = true;
                            }
                            None => {
                                // `x1 <= 1 x2 x3 ...` leaves `x2` with the next statement
                                let glued = split_points
                                    .iter()
                                    .rev()
                                    .find(|p| p.before_variable)
                                    .filter(|_| !line_break)
                                    .map(|p| p.index);
                                let tail = match glued {
                                    Some(index) => current.split_off(index),
                                    None => Vec::new(),
                                };
                                flush(&mut statements, &mut current);
                                current = tail;
                                has_relation = false;
                                split_points.clear();
                            }
                        }
                    }
                    if has_relation {
                        rhs_terms += 1;
                    }
                    open_number = token.kind == TokenKind::Number && has_relation && !signed_split;
                    sign_start = None;
                    line_break = false;
                }
            }
            kind if kind.is_relation() => {
                if has_relation {
                    let point = split_points
                        .iter()
                        .rev()
                        .find(|p| p.after_line_break)
                        .or(split_points.first());
                    if let Some(point) = point {
                        let tail = current.split_off(point.index);
                        flush(&mut statements, &mut current);
                        current = tail;
                    }
                }
                has_relation = true;
                rhs_terms = 0;
                split_points.clear();
                sign_start = None;
                line_break = false;
                open_number = false;
            }
            _ => {}
        }
        current.push(token);
    }
    flush(&mut statements, &mut current);

    statements
}

fn flush(statements: &mut Vec<Statement>, current: &mut Vec<Token>) {
    let statement = Statement::new(std::mem::take(current));
    if !statement.is_empty() {
        statements.push(statement);
    }
}
