//! Parser for free-form linear programming problem text.
//!
//! ```
//! let problem = lpp_lang::parse("min x1 + x2 s.t. x1 + 2x2 >= 3 end").unwrap();
//! let dual = problem.dual();
//! assert_eq!(dual.num_variables(), 1);
//! ```

pub mod ast;
pub mod builder;
pub mod constraint;
pub mod expression;
pub mod lexer;
pub mod parser;
pub mod restriction;
pub mod scanner;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use ast::{ObjectiveSection, Sections, Statement};
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use lpp_model::Problem;
pub use parser::{ParseError, ParseOptions, Parser};

/// Parse problem text with default options
pub fn parse(source: &str) -> Result<Problem, ParseError> {
    Parser::default().parse(source)
}
