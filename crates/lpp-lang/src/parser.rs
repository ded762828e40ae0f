use lpp_model::{ModelError, Problem, SignRestriction, Variable};
use thiserror::Error;
use tracing::debug;

use crate::builder::ModelBuilder;
use crate::lexer::Span;
use crate::scanner::scan;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Syntax error at {span}: {message}, found `{found}`")]
    Syntax {
        message: String,
        found: String,
        span: Span,
    },
    #[error("No relation (<=, >= or =) in constraint `{statement}` at {span}")]
    RelationNotFound { statement: String, span: Span },
    #[error("Missing `end` after the problem")]
    MissingEnd,
    #[error("Conflicting sign restrictions for x{variable} at {span}: `{first}` and `{second}`")]
    ConflictingRestriction {
        variable: Variable,
        first: SignRestriction,
        second: SignRestriction,
        span: Span,
    },
    #[error("Empty problem: {0}")]
    EmptyProblem(String),
    #[error("Unknown variable `{text}` at {span}: variables are x1, x2, ...")]
    UnknownVariable { text: String, span: Span },
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl ParseError {
    /// Source location of the error, when it has one
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::Syntax { span, .. }
            | ParseError::RelationNotFound { span, .. }
            | ParseError::ConflictingRestriction { span, .. }
            | ParseError::UnknownVariable { span, .. } => Some(*span),
            ParseError::MissingEnd | ParseError::EmptyProblem(_) | ParseError::Model(_) => None,
        }
    }
}

/// Knobs for the parser
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParseOptions {
    /// Read `<` and `>` as `<=` and `>=` instead of rejecting them
    pub allow_strict_inequalities: bool,
}

/// Turns problem text into a [`Problem`].
///
/// ```
/// use lpp_lang::Parser;
///
/// let problem = Parser::default()
///     .parse("max 3x1 + 5x2 s.t. x1 + 2x2 <= 4 3x1 + 2x2 <= 6 end")
///     .unwrap();
/// assert_eq!(problem.num_variables(), 2);
/// assert_eq!(problem.num_constraints(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Parser {
    options: ParseOptions,
}

impl Parser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn parse(&self, source: &str) -> Result<Problem, ParseError> {
        debug!(bytes = source.len(), "parsing problem");
        let sections = scan(source)?;
        ModelBuilder::new(&self.options).build(&sections)
    }
}
