//! CSS Lexer
//!
//! Tokenization of raw CSS text with line/column tracking. The lint rules
//! need both token order (formatting checks) and positions (violation
//! reporting), so whitespace and comments are kept as tokens.

/// 1-based source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pos {
    pub line: usize,
    pub column: usize,
}

/// Token types in CSS source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier like `body`, `font-family`, `sans-serif`
    Ident,
    /// `@media`, `@font-face`
    AtKeyword,
    /// `#fff`, `#header`
    Hash,
    /// Quoted string, quotes included
    String,
    /// Number with optional unit, like `0`, `10px`, `1.5em`, `100%`
    Number,
    Colon,
    Semicolon,
    Comma,
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    /// Run of whitespace, text preserved
    Whitespace,
    /// `/* ... */`
    Comment,
    /// Any other single character
    Delim,
}

/// A token with its text and starting position
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub pos: Pos,
}

struct Cursor<'src> {
    chars: std::str::Chars<'src>,
    peeked: Option<char>,
    line: usize,
    column: usize,
}

impl<'src> Cursor<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            chars: source.chars(),
            peeked: None,
            line: 1,
            column: 1,
        }
    }

    fn peek(&mut self) -> Option<char> {
        if self.peeked.is_none() {
            self.peeked = self.chars.next();
        }
        self.peeked
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peeked.take().or_else(|| self.chars.next())?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn pos(&self) -> Pos {
        Pos {
            line: self.line,
            column: self.column,
        }
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '-'
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '-'
}

fn is_number_char(ch: char) -> bool {
    ch.is_ascii_digit() || ch == '.' || ch.is_alphabetic() || ch == '%'
}

/// Tokenize a CSS source string.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut cursor = Cursor::new(source);

    while let Some(ch) = cursor.peek() {
        let pos = cursor.pos();
        match ch {
            ' ' | '\t' | '\r' | '\n' => {
                let mut text = String::new();
                while let Some(next) = cursor.peek() {
                    if next.is_whitespace() {
                        text.push(next);
                        cursor.bump();
                    } else {
                        break;
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Whitespace,
                    text,
                    pos,
                });
            }

            '/' => {
                cursor.bump();
                if cursor.peek() == Some('*') {
                    cursor.bump();
                    let mut text = String::from("/*");
                    let mut prev = '\0';
                    while let Some(next) = cursor.bump() {
                        text.push(next);
                        if prev == '*' && next == '/' {
                            break;
                        }
                        prev = next;
                    }
                    tokens.push(Token {
                        kind: TokenKind::Comment,
                        text,
                        pos,
                    });
                } else {
                    tokens.push(Token {
                        kind: TokenKind::Delim,
                        text: "/".to_string(),
                        pos,
                    });
                }
            }

            '"' | '\'' => {
                let quote = ch;
                cursor.bump();
                let mut text = String::new();
                text.push(quote);
                while let Some(next) = cursor.bump() {
                    text.push(next);
                    if next == '\\' {
                        if let Some(escaped) = cursor.bump() {
                            text.push(escaped);
                        }
                        continue;
                    }
                    if next == quote {
                        break;
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::String,
                    text,
                    pos,
                });
            }

            '@' => {
                cursor.bump();
                let mut text = String::from("@");
                while let Some(next) = cursor.peek() {
                    if is_ident_char(next) {
                        text.push(next);
                        cursor.bump();
                    } else {
                        break;
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::AtKeyword,
                    text,
                    pos,
                });
            }

            '#' => {
                cursor.bump();
                let mut text = String::from("#");
                while let Some(next) = cursor.peek() {
                    if is_ident_char(next) {
                        text.push(next);
                        cursor.bump();
                    } else {
                        break;
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Hash,
                    text,
                    pos,
                });
            }

            '0'..='9' => {
                tokens.push(consume_number(&mut cursor, pos));
            }

            '.' | '-' => {
                // `.5em` and `-10px` are numbers; `.class` and `-webkit-*`
                // are not.
                cursor.bump();
                let next_is_digit = cursor.peek().is_some_and(|n| n.is_ascii_digit());
                if next_is_digit {
                    let mut token = consume_number(&mut cursor, pos);
                    token.text.insert(0, ch);
                    tokens.push(token);
                } else if ch == '-' && cursor.peek().is_some_and(is_ident_start) {
                    let mut token = consume_ident(&mut cursor, pos);
                    token.text.insert(0, '-');
                    tokens.push(token);
                } else {
                    tokens.push(Token {
                        kind: TokenKind::Delim,
                        text: ch.to_string(),
                        pos,
                    });
                }
            }

            ch if is_ident_start(ch) => {
                tokens.push(consume_ident(&mut cursor, pos));
            }

            _ => {
                cursor.bump();
                let kind = match ch {
                    ':' => TokenKind::Colon,
                    ';' => TokenKind::Semicolon,
                    ',' => TokenKind::Comma,
                    '{' => TokenKind::OpenBrace,
                    '}' => TokenKind::CloseBrace,
                    '(' => TokenKind::OpenParen,
                    ')' => TokenKind::CloseParen,
                    '[' => TokenKind::OpenBracket,
                    ']' => TokenKind::CloseBracket,
                    _ => TokenKind::Delim,
                };
                tokens.push(Token {
                    kind,
                    text: ch.to_string(),
                    pos,
                });
            }
        }
    }

    tokens
}

fn consume_number(cursor: &mut Cursor<'_>, pos: Pos) -> Token {
    let mut text = String::new();
    while let Some(next) = cursor.peek() {
        if is_number_char(next) {
            text.push(next);
            cursor.bump();
        } else {
            break;
        }
    }
    Token {
        kind: TokenKind::Number,
        text,
        pos,
    }
}

fn consume_ident(cursor: &mut Cursor<'_>, pos: Pos) -> Token {
    let mut text = String::new();
    while let Some(next) = cursor.peek() {
        if is_ident_char(next) {
            text.push(next);
            cursor.bump();
        } else {
            break;
        }
    }
    Token {
        kind: TokenKind::Ident,
        text,
        pos,
    }
}
