// src/frontend/lexer.rs

use crate::errors::LexerError;
use crate::frontend::{Span, Token, TokenType};

#[derive(Clone)]
pub struct Lexer<'src> {
    source: &'src str,
    chars: std::iter::Peekable<std::str::CharIndices<'src>>,
    start: usize,
    current: usize,
    line: u32,
    column: u32,
    start_column: u32,
    start_line: u32,
    // Error collection
    errors: Vec<LexerError>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            start: 0,
            current: 0,
            line: 1,
            column: 1,
            start_column: 1,
            start_line: 1,
            errors: Vec::new(),
        }
    }

    /// Take all collected errors, leaving the internal list empty.
    pub fn take_errors(&mut self) -> Vec<LexerError> {
        std::mem::take(&mut self.errors)
    }

    /// Get the next token from the source
    pub fn next_token(&mut self) -> Token {
        if let Some(error) = self.skip_whitespace_and_comments() {
            return error;
        }

        self.start = self.current;
        self.start_column = self.column;
        self.start_line = self.line;

        let Some(c) = self.advance() else {
            return self.make_token(TokenType::Eof);
        };

        match c {
            '(' => self.make_token(TokenType::LParen),
            ')' => self.make_token(TokenType::RParen),
            '{' => self.make_token(TokenType::LBrace),
            '}' => self.make_token(TokenType::RBrace),
            '[' => self.make_token(TokenType::LBracket),
            ']' => self.make_token(TokenType::RBracket),
            ',' => self.make_token(TokenType::Comma),
            ';' => self.make_token(TokenType::Semicolon),
            '.' => self.make_token(TokenType::Dot),
            '*' => self.make_token(TokenType::Star),
            '/' => self.make_token(TokenType::Slash),
            '%' => self.make_token(TokenType::Percent),
            '+' => {
                if self.match_char('+') {
                    self.make_token(TokenType::PlusPlus)
                } else {
                    self.make_token(TokenType::Plus)
                }
            }
            '-' => {
                if self.match_char('-') {
                    self.make_token(TokenType::MinusMinus)
                } else {
                    self.make_token(TokenType::Minus)
                }
            }
            '=' => {
                if self.match_char('=') {
                    self.make_token(TokenType::EqEq)
                } else {
                    self.make_token(TokenType::Eq)
                }
            }
            '!' => {
                if self.match_char('=') {
                    self.make_token(TokenType::BangEq)
                } else {
                    self.error_unexpected_char(c)
                }
            }
            '<' => {
                if self.match_char('=') {
                    self.make_token(TokenType::LtEq)
                } else {
                    self.make_token(TokenType::Lt)
                }
            }
            '>' => {
                if self.match_char('=') {
                    self.make_token(TokenType::GtEq)
                } else {
                    self.make_token(TokenType::Gt)
                }
            }
            '&' => {
                if self.match_char('&') {
                    self.make_token(TokenType::AmpAmp)
                } else {
                    self.error_unexpected_char(c)
                }
            }
            '|' => {
                if self.match_char('|') {
                    self.make_token(TokenType::PipePipe)
                } else {
                    self.error_unexpected_char(c)
                }
            }

            '"' => self.string(),

            c if c.is_ascii_digit() => self.number(),

            c if c.is_ascii_alphabetic() || c == '_' => self.identifier(),

            _ => self.error_unexpected_char(c),
        }
    }

    /// Skip whitespace, newlines and both comment forms. Returns an error
    /// token if a block comment runs off the end of the source.
    fn skip_whitespace_and_comments(&mut self) -> Option<Token> {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') => {
                    self.advance();
                }
                Some('\n') => {
                    self.advance();
                    self.line += 1;
                    self.column = 1;
                }
                Some('/') if self.peek_next() == Some('/') => {
                    while self.peek() != Some('\n') && self.peek().is_some() {
                        self.advance();
                    }
                }
                Some('/') if self.peek_next() == Some('*') => {
                    self.start = self.current;
                    self.start_column = self.column;
                    self.start_line = self.line;
                    self.advance();
                    self.advance();
                    loop {
                        match self.advance() {
                            Some('*') if self.peek() == Some('/') => {
                                self.advance();
                                break;
                            }
                            Some('\n') => {
                                self.line += 1;
                                self.column = 1;
                            }
                            Some(_) => {}
                            None => return Some(self.error_unterminated_comment()),
                        }
                    }
                }
                _ => return None,
            }
        }
    }

    /// Advance to the next character and return it
    fn advance(&mut self) -> Option<char> {
        if let Some((idx, c)) = self.chars.next() {
            self.current = idx + c.len_utf8();
            self.column += 1;
            Some(c)
        } else {
            None
        }
    }

    /// Peek at the next character without consuming it
    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    /// Peek at the character after the next one
    fn peek_next(&self) -> Option<char> {
        let mut iter = self.source[self.current..].chars();
        iter.next();
        iter.next()
    }

    /// Consume the next character if it matches the expected character
    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn current_span(&self) -> Span {
        Span::new(self.start, self.current, self.start_line, self.start_column)
    }

    /// Create a token from start to current position
    fn make_token(&self, ty: TokenType) -> Token {
        let lexeme = &self.source[self.start..self.current];
        Token::new(ty, lexeme, self.current_span())
    }

    /// Create an error token and collect an error for an unexpected character.
    fn error_unexpected_char(&mut self, c: char) -> Token {
        let span = self.current_span();
        self.errors.push(LexerError::UnexpectedCharacter {
            ch: c,
            span: span.into(),
        });
        Token::new(TokenType::Error, format!("unexpected character '{}'", c), span)
    }

    fn error_unterminated_string(&mut self) -> Token {
        let span = self.current_span();
        self.errors
            .push(LexerError::UnterminatedString { span: span.into() });
        Token::new(TokenType::Error, "unterminated string literal", span)
    }

    fn error_unterminated_comment(&mut self) -> Token {
        let span = self.current_span();
        self.errors
            .push(LexerError::UnterminatedComment { span: span.into() });
        Token::new(TokenType::Error, "unterminated block comment", span)
    }

    /// Scan an identifier or keyword
    fn identifier(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let text = &self.source[self.start..self.current];
        let ty = Self::keyword_type(text).unwrap_or(TokenType::Identifier);
        self.make_token(ty)
    }

    /// Check if a string is a keyword and return its token type
    fn keyword_type(text: &str) -> Option<TokenType> {
        match text {
            "using" => Some(TokenType::KwUsing),
            "class" => Some(TokenType::KwClass),
            "public" => Some(TokenType::KwPublic),
            "static" => Some(TokenType::KwStatic),
            "const" => Some(TokenType::KwConst),
            "struct" => Some(TokenType::KwStruct),
            "void" => Some(TokenType::KwVoid),
            "if" => Some(TokenType::KwIf),
            "else" => Some(TokenType::KwElse),
            "while" => Some(TokenType::KwWhile),
            "break" => Some(TokenType::KwBreak),
            "return" => Some(TokenType::KwReturn),
            "new" => Some(TokenType::KwNew),
            "out" => Some(TokenType::KwOut),
            "true" => Some(TokenType::KwTrue),
            "false" => Some(TokenType::KwFalse),
            "int" => Some(TokenType::KwInt),
            "bool" => Some(TokenType::KwBool),
            "string" => Some(TokenType::KwString),
            _ => None,
        }
    }

    /// Scan an integer literal. Range checking happens in the parser, where
    /// a leading minus sign is known.
    fn number(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }

        if matches!(self.peek(), Some(c) if c.is_ascii_alphabetic() || c == '_') {
            while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
                self.advance();
            }
            let span = self.current_span();
            self.errors
                .push(LexerError::InvalidNumber { span: span.into() });
            return Token::new(TokenType::Error, "invalid number literal", span);
        }

        self.make_token(TokenType::IntLiteral)
    }

    /// Scan a string literal. The lexeme keeps its quotes and escapes; the
    /// parser decodes it.
    fn string(&mut self) -> Token {
        loop {
            match self.peek() {
                None | Some('\n') => return self.error_unterminated_string(),
                Some('"') => {
                    self.advance();
                    return self.make_token(TokenType::StringLiteral);
                }
                Some('\\') => {
                    let escape_start = self.current;
                    let escape_column = self.column;
                    self.advance();
                    match self.advance() {
                        Some('n' | 't' | 'r' | '0' | '\\' | '"') => {}
                        Some(ch) => {
                            let span = Span::new(
                                escape_start,
                                self.current,
                                self.line,
                                escape_column,
                            );
                            self.errors.push(LexerError::InvalidEscape {
                                ch,
                                span: span.into(),
                            });
                        }
                        None => return self.error_unterminated_string(),
                    }
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }
}

/// Decode the escapes of a string literal lexeme (quotes included).
pub fn unescape(lexeme: &str) -> String {
    let inner = lexeme
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(lexeme);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenType> {
        let mut lexer = Lexer::new(source);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token();
            if token.ty == TokenType::Eof {
                break;
            }
            out.push(token.ty);
        }
        out
    }

    #[test]
    fn lex_operators() {
        assert_eq!(
            kinds("++ -- == != <= >= && || = < >"),
            vec![
                TokenType::PlusPlus,
                TokenType::MinusMinus,
                TokenType::EqEq,
                TokenType::BangEq,
                TokenType::LtEq,
                TokenType::GtEq,
                TokenType::AmpAmp,
                TokenType::PipePipe,
                TokenType::Eq,
                TokenType::Lt,
                TokenType::Gt,
            ]
        );
    }

    #[test]
    fn lex_keywords_and_identifiers() {
        assert_eq!(
            kinds("public static int Main cbio"),
            vec![
                TokenType::KwPublic,
                TokenType::KwStatic,
                TokenType::KwInt,
                TokenType::Identifier,
                TokenType::Identifier,
            ]
        );
    }

    #[test]
    fn comments_are_skipped_and_lines_counted() {
        let mut lexer = Lexer::new("// one\n/* two\nthree */ x");
        let token = lexer.next_token();
        assert_eq!(token.ty, TokenType::Identifier);
        assert_eq!(token.span.line, 3);
    }

    #[test]
    fn unterminated_string_is_reported() {
        let mut lexer = Lexer::new("\"abc");
        let token = lexer.next_token();
        assert_eq!(token.ty, TokenType::Error);
        assert!(matches!(
            lexer.take_errors()[0],
            LexerError::UnterminatedString { .. }
        ));
    }

    #[test]
    fn lone_bang_is_unexpected() {
        let mut lexer = Lexer::new("!x");
        assert_eq!(lexer.next_token().ty, TokenType::Error);
        assert_eq!(lexer.take_errors().len(), 1);
    }

    #[test]
    fn unescape_decodes_common_escapes() {
        assert_eq!(unescape(r#""a\nb\t\"c\\""#), "a\nb\t\"c\\");
    }
}
