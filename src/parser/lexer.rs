//! Lexer (tokenizer) for C-subset source code
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! Comments and whitespace are dropped here. Preprocessor directives are kept
//! whole as a single [`TokenKind::Preprocessor`] token so the parser can
//! carry them through to the generated output.

use super::ast::SourceLocation;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Reserved words. Identifiers spelled like one of these are retagged to the
/// matching keyword kind and can never be renamed.
pub const KEYWORDS: [&str; 12] = [
    "int", "float", "void", "char", "double", "if", "else", "while", "for",
    "return", "include", "define",
];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// Numeric literal payload; a literal containing `.` is floating-point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum NumberValue {
    Int(i64),
    Float(f64),
}

/// All token kinds produced by the lexer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TokenKind {
    // Keywords
    Int,
    Float,
    Void,
    Char,
    Double,
    If,
    Else,
    While,
    For,
    Return,
    Include,
    Define,

    Ident,
    Number(NumberValue),
    Str,
    Op,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    Semicolon,
    Comma,

    Preprocessor,
    Eof,
}

impl TokenKind {
    /// Type keywords that may start a declaration or function.
    pub fn is_type_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Int
                | TokenKind::Float
                | TokenKind::Void
                | TokenKind::Char
                | TokenKind::Double
        )
    }

    fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "int" => TokenKind::Int,
            "float" => TokenKind::Float,
            "void" => TokenKind::Void,
            "char" => TokenKind::Char,
            "double" => TokenKind::Double,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "for" => TokenKind::For,
            "return" => TokenKind::Return,
            "include" => TokenKind::Include,
            "define" => TokenKind::Define,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Int => write!(f, "'int'"),
            TokenKind::Float => write!(f, "'float'"),
            TokenKind::Void => write!(f, "'void'"),
            TokenKind::Char => write!(f, "'char'"),
            TokenKind::Double => write!(f, "'double'"),
            TokenKind::If => write!(f, "'if'"),
            TokenKind::Else => write!(f, "'else'"),
            TokenKind::While => write!(f, "'while'"),
            TokenKind::For => write!(f, "'for'"),
            TokenKind::Return => write!(f, "'return'"),
            TokenKind::Include => write!(f, "'include'"),
            TokenKind::Define => write!(f, "'define'"),
            TokenKind::Ident => write!(f, "identifier"),
            TokenKind::Number(_) => write!(f, "number"),
            TokenKind::Str => write!(f, "string literal"),
            TokenKind::Op => write!(f, "operator"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::LBrace => write!(f, "'{{'"),
            TokenKind::RBrace => write!(f, "'}}'"),
            TokenKind::Semicolon => write!(f, "';'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Preprocessor => write!(f, "preprocessor directive"),
            TokenKind::Eof => write!(f, "end of file"),
        }
    }
}

/// A classified lexical unit. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            location,
        }
    }

    pub fn is_op(&self, op: &str) -> bool {
        self.kind == TokenKind::Op && self.lexeme == op
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Ident => write!(f, "identifier '{}'", self.lexeme),
            TokenKind::Number(_) => write!(f, "number {}", self.lexeme),
            TokenKind::Str => write!(f, "string literal \"{}\"", self.lexeme),
            TokenKind::Op => write!(f, "'{}'", self.lexeme),
            _ => write!(f, "{}", self.kind),
        }
    }
}

/// Lexer error type
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Lexer error at line {}, column {}: {message}", .location.line, .location.column)]
pub struct LexError {
    /// The character no rule could consume.
    pub character: char,
    pub message: String,
    pub location: SourceLocation,
}

/// Tokenize `source` in one call.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).tokenize()
}

/// Lexer for C-subset source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments()?;

            let loc = self.current_location();
            match self.peek() {
                None => {
                    tokens.push(Token::new(TokenKind::Eof, "", loc));
                    break;
                }
                Some('#') => tokens.push(self.preprocessor_directive()),
                Some(ch) => {
                    self.advance();
                    tokens.push(self.next_token(ch, loc)?);
                }
            }
        }

        log::debug!("lexed {} tokens", tokens.len());
        Ok(tokens)
    }

    /// Finish the token that starts with `ch`, already consumed at `loc`.
    fn next_token(&mut self, ch: char, loc: SourceLocation) -> Result<Token, LexError> {
        let punct = |kind: TokenKind| -> Result<Token, LexError> {
            Ok(Token::new(kind, ch.to_string(), loc))
        };

        match ch {
            '"' => self.string_literal(loc),
            '0'..='9' => self.number_literal(ch, loc),
            'a'..='z' | 'A'..='Z' | '_' => Ok(self.identifier_or_keyword(ch, loc)),

            '(' => punct(TokenKind::LParen),
            ')' => punct(TokenKind::RParen),
            '{' => punct(TokenKind::LBrace),
            '}' => punct(TokenKind::RBrace),
            ';' => punct(TokenKind::Semicolon),
            ',' => punct(TokenKind::Comma),

            // Two-character operators first, then their single-character prefixes.
            '|' | '&' => {
                if self.peek() == Some(ch) {
                    self.advance();
                    Ok(Token::new(TokenKind::Op, format!("{ch}{ch}"), loc))
                } else {
                    Err(LexError {
                        character: ch,
                        message: format!("Unexpected character: '{}'", ch),
                        location: loc,
                    })
                }
            }
            '=' | '!' | '<' | '>' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Ok(Token::new(TokenKind::Op, format!("{ch}="), loc))
                } else {
                    Ok(Token::new(TokenKind::Op, ch.to_string(), loc))
                }
            }
            '+' | '-' | '*' | '/' | '%' => Ok(Token::new(TokenKind::Op, ch.to_string(), loc)),

            _ => Err(LexError {
                character: ch,
                message: format!("Unexpected character: '{}'", ch),
                location: loc,
            }),
        }
    }

    /// Parse string literal. No escape processing; the lexeme excludes the quotes.
    fn string_literal(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let mut string = String::new();

        while let Some(ch) = self.peek() {
            if ch == '"' {
                self.advance();
                return Ok(Token::new(TokenKind::Str, string, loc));
            }
            if ch == '\n' {
                break;
            }
            string.push(ch);
            self.advance();
        }

        Err(LexError {
            character: '"',
            message: "Unterminated string literal".to_string(),
            location: loc,
        })
    }

    /// Parse numeric literal: digits with an optional fractional part.
    fn number_literal(&mut self, first_digit: char, loc: SourceLocation) -> Result<Token, LexError> {
        let mut num_str = String::new();
        num_str.push(first_digit);
        self.take_digits(&mut num_str);

        let is_float = self.peek() == Some('.');
        if is_float {
            num_str.push('.');
            self.advance();
            self.take_digits(&mut num_str);
        }

        let value = if is_float {
            num_str.parse::<f64>().map(NumberValue::Float).ok()
        } else {
            num_str.parse::<i64>().map(NumberValue::Int).ok()
        };

        let value = value.ok_or_else(|| LexError {
            character: first_digit,
            message: format!("Invalid numeric literal: {}", num_str),
            location: loc,
        })?;

        Ok(Token::new(TokenKind::Number(value), num_str, loc))
    }

    fn take_digits(&mut self, buf: &mut String) {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                buf.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, first_char: char, loc: SourceLocation) -> Token {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let kind = TokenKind::keyword(&ident).unwrap_or(TokenKind::Ident);
        Token::new(kind, ident, loc)
    }

    /// Read a whole directive line (`#include <x>`, `#define N 10`, ...).
    fn preprocessor_directive(&mut self) -> Token {
        let loc = self.current_location();
        let mut text = String::new();

        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            text.push(ch);
            self.advance();
        }

        Token::new(TokenKind::Preprocessor, text.trim_end(), loc)
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        self.skip_line_comment();
                    } else if self.peek_ahead(1) == Some('*') {
                        self.skip_block_comment()?;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip single-line comment (// ...)
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    /// Skip multi-line comment (/* ... */)
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start_loc = self.current_location();
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                return Ok(());
            }
            self.advance();
        }

        Err(LexError {
            character: '/',
            message: "Unterminated block comment".to_string(),
            location: start_loc,
        })
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}
