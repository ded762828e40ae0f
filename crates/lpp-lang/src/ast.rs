use lpp_model::Direction;

use crate::lexer::{Span, Token, TokenKind};

/// A problem description split into its sections, noise removed
#[derive(Debug, Clone, PartialEq)]
pub struct Sections {
    pub objective: ObjectiveSection,
    pub constraints: Vec<Statement>,
    /// Contents of the `with` block, if there is one
    pub restrictions: Option<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveSection {
    pub direction: Direction,
    /// Span of the `min`/`max` keyword
    pub keyword: Span,
    pub body: Statement,
}

/// A run of grammar tokens. Line breaks are kept as `Newline` tokens since
/// they separate a coefficient from a following variable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statement {
    pub span: Span,
    pub tokens: Vec<Token>,
}

impl Statement {
    pub fn new(tokens: Vec<Token>) -> Self {
        let span = tokens
            .iter()
            .filter(|t| t.kind != TokenKind::Newline)
            .map(|t| t.span)
            .reduce(Span::merge)
            .unwrap_or_default();
        Self { span, tokens }
    }

    /// Tokens other than line breaks
    pub fn significant(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|t| t.kind != TokenKind::Newline)
    }

    pub fn is_empty(&self) -> bool {
        self.significant().next().is_none()
    }

    /// Source text covered by the statement, whitespace collapsed
    pub fn text(&self) -> String {
        self.significant()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
