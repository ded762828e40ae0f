//! WASM bindings for LPP
//!
//! JavaScript-friendly entry points for editors and web tooling.

use wasm_bindgen::prelude::*;

use crate::lexer::{Lexer, TokenKind};
use crate::parser::Parser;

fn js_error(e: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&e.to_string()).into()
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(js_error)
}

/// Parse a problem and return it as JSON
#[wasm_bindgen]
pub fn parse(source: &str) -> Result<JsValue, JsValue> {
    let problem = Parser::default().parse(source).map_err(js_error)?;
    to_js(&problem)
}

/// Parse a problem and return its dual as JSON
#[wasm_bindgen]
pub fn dual(source: &str) -> Result<JsValue, JsValue> {
    let problem = Parser::default().parse(source).map_err(js_error)?;
    to_js(&problem.dual())
}

/// Parse a problem and render its dual as problem text.
///
/// A dual with an empty objective or an empty constraint renders those parts
/// as `0` and does not parse back; `dual` returns the same problem as JSON.
#[wasm_bindgen]
pub fn dual_text(source: &str) -> Result<String, JsValue> {
    let problem = Parser::default().parse(source).map_err(js_error)?;
    Ok(problem.dual().to_string())
}

/// Tokenize source code and return tokens as JSON
#[wasm_bindgen]
pub fn tokenize(source: &str) -> Result<JsValue, JsValue> {
    let tokens: Vec<TokenInfo> = Lexer::tokenize(source)
        .into_iter()
        .map(|t| TokenInfo {
            kind: format!("{:?}", t.kind),
            token_type: token_type(t.kind).to_string(),
            text: t.text,
            start: t.span.start,
            end: t.span.end,
        })
        .collect();
    to_js(&tokens)
}

#[derive(serde::Serialize)]
struct TokenInfo {
    kind: String,
    token_type: String,
    text: String,
    start: usize,
    end: usize,
}

fn token_type(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Min
        | TokenKind::Max
        | TokenKind::SubjectTo
        | TokenKind::With
        | TokenKind::Free
        | TokenKind::End => "keyword",
        TokenKind::Variable => "variable",
        TokenKind::Number => "number",
        TokenKind::Comment => "comment",
        TokenKind::Plus | TokenKind::Minus | TokenKind::Star => "operator",
        TokenKind::Le | TokenKind::Ge | TokenKind::Eq | TokenKind::Lt | TokenKind::Gt => "operator",
        TokenKind::Word | TokenKind::Unknown => "text",
        TokenKind::Newline => "whitespace",
        TokenKind::Eof => "eof",
    }
}

/// Validate source code and return diagnostics as JSON
#[wasm_bindgen]
pub fn validate(source: &str) -> JsValue {
    let diagnostics = get_diagnostics(source);
    serde_wasm_bindgen::to_value(&diagnostics).unwrap_or(JsValue::NULL)
}

#[derive(serde::Serialize)]
struct Diagnostic {
    start: usize,
    end: usize,
    severity: String,
    message: String,
}

fn get_diagnostics(source: &str) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    if let Err(e) = Parser::default().parse(source) {
        let span = e.span();
        diagnostics.push(Diagnostic {
            start: span.map_or(0, |s| s.start),
            end: span.map_or(source.len(), |s| s.end),
            severity: "error".to_string(),
            message: e.to_string(),
        });
    }

    // Text inside the problem that the parser skips
    let tokens = Lexer::tokenize(source);
    let start = tokens
        .iter()
        .position(|t| matches!(t.kind, TokenKind::Min | TokenKind::Max));
    if let Some(start) = start {
        for token in tokens[start..]
            .iter()
            .take_while(|t| t.kind != TokenKind::End)
            .filter(|t| matches!(t.kind, TokenKind::Word | TokenKind::Unknown))
        {
            diagnostics.push(Diagnostic {
                start: token.span.start,
                end: token.span.end,
                severity: "hint".to_string(),
                message: format!("'{}' is ignored", token.text),
            });
        }
    }

    diagnostics
}
