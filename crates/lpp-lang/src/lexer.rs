use std::fmt;
use std::str::Chars;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    Min,
    Max,
    SubjectTo,
    With,
    Free,
    End,

    // Literals
    Number,
    Variable,

    // Operators
    Plus,
    Minus,
    Star,

    // Relations
    Le,
    Ge,
    Eq,
    Lt,
    Gt,

    // Noise
    Word,
    Comment,
    Unknown,

    // Special
    Newline,
    Eof,
}

impl TokenKind {
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Min
                | TokenKind::Max
                | TokenKind::SubjectTo
                | TokenKind::With
                | TokenKind::Free
                | TokenKind::End
        )
    }

    pub fn is_relation(self) -> bool {
        matches!(
            self,
            TokenKind::Le | TokenKind::Ge | TokenKind::Eq | TokenKind::Lt | TokenKind::Gt
        )
    }

    /// Text the grammar has no production for
    pub fn is_noise(self) -> bool {
        matches!(self, TokenKind::Word | TokenKind::Comment | TokenKind::Unknown)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
        }
    }
}

pub struct Lexer<'a> {
    source: &'a str,
    chars: Chars<'a>,
    pos: usize,
    current: Option<char>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut chars = source.chars();
        let current = chars.next();
        Self {
            source,
            chars,
            pos: 0,
            current,
        }
    }

    pub fn tokenize(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current?;
        self.current = self.chars.next();
        self.pos += c.len_utf8();
        Some(c)
    }

    fn peek(&self) -> Option<char> {
        self.current
    }

    /// The character after the current one
    fn peek_next(&self) -> Option<char> {
        self.chars.clone().next()
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn advance_by(&mut self, bytes: usize) {
        let target = self.pos + bytes;
        while self.pos < target && self.advance().is_some() {}
    }

    fn token_from(&self, kind: TokenKind, start: usize) -> Token {
        Token::new(kind, Span::new(start, self.pos), &self.source[start..self.pos])
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c != '\n' && c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_line_comment(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
        self.token_from(TokenKind::Comment, start)
    }

    fn read_digits(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self) -> Token {
        let start = self.pos;

        // Integer part
        self.read_digits();

        // Decimal part, only when a digit follows the dot
        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            self.read_digits();
        }

        // Exponent, only when digits follow
        if matches!(self.peek(), Some('e' | 'E')) {
            let tail = &self.rest()[1..];
            let unsigned = tail.strip_prefix(['+', '-']).unwrap_or(tail);
            if unsigned.starts_with(|c: char| c.is_ascii_digit()) {
                self.advance_by(self.rest().len() - unsigned.len());
                self.read_digits();
            }
        }

        self.token_from(TokenKind::Number, start)
    }

    fn read_variable(&mut self) -> Token {
        let start = self.pos;
        self.advance(); // x
        self.read_digits();
        self.token_from(TokenKind::Variable, start)
    }

    /// Reads a word. Keywords stop at the first non-letter and in front of an
    /// `x` that starts a variable, so `max3x1` and `maxx1` both split; any
    /// other word runs on through digits and underscores (`c1`, `row_2`).
    fn read_word(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            let starts_variable = matches!(c, 'x' | 'X')
                && self.peek_next().is_some_and(|n| n.is_ascii_digit())
                && keyword(&self.source[start..self.pos].to_lowercase()).is_some();
            if c.is_alphabetic() && !starts_variable {
                self.advance();
            } else {
                break;
            }
        }

        let word = self.source[start..self.pos].to_lowercase();
        let kind = match word.as_str() {
            "x" => TokenKind::Variable,
            "s" => match dotted_st_suffix(self.rest()) {
                Some(len) => {
                    self.advance_by(len);
                    TokenKind::SubjectTo
                }
                None => TokenKind::Word,
            },
            "subject" => match to_suffix(self.rest()) {
                Some(len) => {
                    self.advance_by(len);
                    TokenKind::SubjectTo
                }
                None => TokenKind::Word,
            },
            other => keyword(other).unwrap_or(TokenKind::Word),
        };

        if kind == TokenKind::Word {
            while let Some(c) = self.peek() {
                if c.is_alphanumeric() || c == '_' {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.token_from(kind, start)
    }

    /// `<=`, `=<`, `>=`, `=>`, `=`, `==`, `<`, `>`
    fn read_relation(&mut self) -> Token {
        let start = self.pos;
        let first = self.advance();
        let second = self.peek();
        let kind = match (first, second) {
            (Some('<'), Some('=')) | (Some('='), Some('<')) => {
                self.advance();
                TokenKind::Le
            }
            (Some('>'), Some('=')) | (Some('='), Some('>')) => {
                self.advance();
                TokenKind::Ge
            }
            (Some('='), Some('=')) => {
                self.advance();
                TokenKind::Eq
            }
            (Some('<'), _) => TokenKind::Lt,
            (Some('>'), _) => TokenKind::Gt,
            _ => TokenKind::Eq,
        };
        self.token_from(kind, start)
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let start = self.pos;
        self.advance();
        self.token_from(kind, start)
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.pos;

        let Some(c) = self.peek() else {
            return Token::new(TokenKind::Eof, Span::new(start, start), "");
        };

        match c {
            '\n' => self.single(TokenKind::Newline),
            '/' if self.peek_next() == Some('/') => self.skip_line_comment(),
            '#' => self.skip_line_comment(),
            '+' => self.single(TokenKind::Plus),
            '-' => self.single(TokenKind::Minus),
            '*' => self.single(TokenKind::Star),
            '≤' => self.single(TokenKind::Le),
            '≥' => self.single(TokenKind::Ge),
            '<' | '>' | '=' => self.read_relation(),
            '.' if self.peek_next().is_some_and(|n| n.is_ascii_digit()) => self.read_number(),
            c if c.is_ascii_digit() => self.read_number(),
            'x' | 'X' if self.peek_next().is_some_and(|n| n.is_ascii_digit()) => {
                self.read_variable()
            }
            c if c.is_alphabetic() => self.read_word(),
            _ => self.single(TokenKind::Unknown),
        }
    }
}

/// Length of the `.t` / `.t.` / `. t.` tail of `s.t.`, if `rest` starts with one
fn dotted_st_suffix(rest: &str) -> Option<usize> {
    let after_dot = rest.strip_prefix('.')?;
    let trimmed = after_dot.trim_start_matches([' ', '\t']);
    let after_t = trimmed.strip_prefix(['t', 'T'])?;
    if after_t.starts_with(|c: char| c.is_alphanumeric()) {
        return None;
    }
    let mut len = rest.len() - after_t.len();
    if after_t.starts_with('.') {
        len += 1;
    }
    Some(len)
}

/// Length of the whitespace and `to` that complete `subject to`
fn to_suffix(rest: &str) -> Option<usize> {
    let trimmed = rest.trim_start();
    let to = trimmed.get(..2)?;
    if !to.eq_ignore_ascii_case("to") {
        return None;
    }
    let after_to = &trimmed[2..];
    if after_to.starts_with(|c: char| c.is_alphanumeric()) {
        return None;
    }
    Some(rest.len() - after_to.len())
}

/// Keywords that are complete words on their own
fn keyword(word: &str) -> Option<TokenKind> {
    let kind = match word {
        "min" | "minimize" | "minimise" | "minimum" => TokenKind::Min,
        "max" | "maximize" | "maximise" | "maximum" => TokenKind::Max,
        "st" | "subjectto" => TokenKind::SubjectTo,
        "with" => TokenKind::With,
        "free" => TokenKind::Free,
        "end" => TokenKind::End,
        _ => return None,
    };
    Some(kind)
}
