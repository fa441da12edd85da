use std::fmt;
use std::str::Chars;

/// Position of a token, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    Min,
    Max,
    Var,

    // Literals
    Ident,
    Number,

    // Relations
    Le,
    Ge,
    Eq,

    // Special
    Newline,
    Comment,
    Eof,
    Error,
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
    line: usize,
    column: usize,
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
            line: 1,
            column: 1,
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
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn peek(&self) -> Option<char> {
        self.current
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.clone().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c == ' ' || c == '\t' || c == '\r' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_comment(&mut self, span: Span) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
        Token::new(TokenKind::Comment, span, &self.source[start..self.pos])
    }

    fn eat_digits(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self, span: Span) -> Token {
        let start = self.pos;

        if matches!(self.peek(), Some('-' | '+')) {
            self.advance();
        }

        self.eat_digits();
        if self.peek() == Some('.') {
            self.advance();
            self.eat_digits();
        }

        // Exponent, only when digits follow
        if matches!(self.peek(), Some('e' | 'E')) {
            let mut ahead = self.chars.clone();
            let next = ahead.next();
            let after_sign = if matches!(next, Some('-' | '+')) { ahead.next() } else { next };
            if after_sign.is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
                if matches!(self.peek(), Some('-' | '+')) {
                    self.advance();
                }
                self.eat_digits();
            }
        }

        Token::new(TokenKind::Number, span, &self.source[start..self.pos])
    }

    fn read_ident(&mut self, span: Span) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
        let text = &self.source[start..self.pos];
        let kind = match text.to_ascii_lowercase().as_str() {
            "min" => TokenKind::Min,
            "max" => TokenKind::Max,
            "var" => TokenKind::Var,
            _ => TokenKind::Ident,
        };
        Token::new(kind, span, text)
    }

    fn relation(&mut self, kind: TokenKind, text: &str, span: Span) -> Token {
        for _ in text.chars() {
            self.advance();
        }
        Token::new(kind, span, text)
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let span = Span::new(self.line, self.column);

        let Some(c) = self.peek() else {
            return Token::new(TokenKind::Eof, span, "");
        };

        match c {
            '\n' => {
                self.advance();
                Token::new(TokenKind::Newline, span, "\n")
            }
            '#' => self.read_comment(span),
            '<' if self.peek_next() == Some('=') => self.relation(TokenKind::Le, "<=", span),
            '>' if self.peek_next() == Some('=') => self.relation(TokenKind::Ge, ">=", span),
            '=' => self.relation(TokenKind::Eq, "=", span),
            '-' | '+' if self.peek_next().is_some_and(|n| n.is_ascii_digit() || n == '.') => {
                self.read_number(span)
            }
            '.' if self.peek_next().is_some_and(|n| n.is_ascii_digit()) => self.read_number(span),
            c if c.is_ascii_digit() => self.read_number(span),
            c if c.is_alphabetic() || c == '_' => self.read_ident(span),
            _ => {
                let start = self.pos;
                self.advance();
                Token::new(TokenKind::Error, span, &self.source[start..self.pos])
            }
        }
    }
}
