//! C token lexer
//!
//! Splits the text of a macro definition into raw C tokens. Comments and
//! line continuations are dropped; everything else keeps its source spelling.

/// Token classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Punctuation,
    Keyword,
    Identifier,
    Literal,
}

/// A raw lexical token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub spelling: String,
}

impl Token {
    fn new(kind: TokenKind, spelling: &str) -> Self {
        Self {
            kind,
            spelling: spelling.to_string(),
        }
    }
}

const KEYWORDS: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
    "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
    "union", "unsigned", "void", "volatile", "while", "_Alignas", "_Alignof", "_Atomic",
    "_Bool", "_Complex", "_Generic", "_Imaginary", "_Noreturn", "_Static_assert",
    "_Thread_local", "__attribute__", "__typeof__", "typeof", "asm", "__asm__",
];

const PUNCTUATORS_3: &[&str] = &["...", "<<=", ">>="];

const PUNCTUATORS_2: &[&str] = &[
    "->", "++", "--", "<<", ">>", "<=", ">=", "==", "!=", "&&", "||", "*=", "/=", "%=", "+=",
    "-=", "&=", "^=", "|=", "##",
];

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

fn is_ident_continue(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

/// Tokenize C source text
pub fn tokenize(text: &str) -> Vec<Token> {
    Lexer::new(text).collect()
}

/// First token of `text`, without lexing the rest
pub(crate) fn first_token(text: &str) -> Option<Token> {
    Lexer::new(text).next()
}

struct Lexer<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    /// Skip whitespace, comments and backslash-newlines
    fn skip_trivia(&mut self) {
        while let Some(b) = self.peek(0) {
            match b {
                b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c => self.pos += 1,
                b'\\' if self.peek(1) == Some(b'\n') => self.pos += 2,
                b'\\' if self.peek(1) == Some(b'\r') && self.peek(2) == Some(b'\n') => {
                    self.pos += 3
                }
                b'/' if self.peek(1) == Some(b'/') => {
                    while let Some(c) = self.peek(0) {
                        if c == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                b'/' if self.peek(1) == Some(b'*') => {
                    self.pos += 2;
                    loop {
                        match self.peek(0) {
                            None => break,
                            Some(b'*') if self.peek(1) == Some(b'/') => {
                                self.pos += 2;
                                break;
                            }
                            Some(_) => self.pos += 1,
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn lex_quoted(&mut self, quote: u8) {
        // pos is on the opening quote
        self.pos += 1;
        while let Some(b) = self.peek(0) {
            match b {
                b'\\' => self.pos += 2,
                b'\n' => break,
                _ if b == quote => {
                    self.pos += 1;
                    break;
                }
                _ => self.pos += 1,
            }
        }
        self.pos = self.pos.min(self.bytes.len());
    }

    fn lex_number(&mut self) {
        while let Some(b) = self.peek(0) {
            if matches!(b, b'e' | b'E' | b'p' | b'P') && matches!(self.peek(1), Some(b'+' | b'-'))
            {
                self.pos += 2;
            } else if is_ident_continue(b) || b == b'.' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn lex_punctuation(&mut self) {
        let rest = &self.text[self.pos..];
        for group in [PUNCTUATORS_3, PUNCTUATORS_2] {
            if let Some(p) = group.iter().find(|p| rest.starts_with(**p)) {
                self.pos += p.len();
                return;
            }
        }
        self.pos += 1;
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.skip_trivia();
        let start = self.pos;
        let b = self.peek(0)?;

        let kind = if is_ident_start(b) {
            while self.peek(0).is_some_and(is_ident_continue) {
                self.pos += 1;
            }
            let word = &self.text[start..self.pos];
            match self.peek(0) {
                Some(q @ (b'"' | b'\'')) if matches!(word, "L" | "u" | "U" | "u8") => {
                    self.lex_quoted(q);
                    TokenKind::Literal
                }
                _ if KEYWORDS.contains(&word) => TokenKind::Keyword,
                _ => TokenKind::Identifier,
            }
        } else if b.is_ascii_digit()
            || (b == b'.' && self.peek(1).is_some_and(|c| c.is_ascii_digit()))
        {
            self.lex_number();
            TokenKind::Literal
        } else if b == b'"' || b == b'\'' {
            self.lex_quoted(b);
            TokenKind::Literal
        } else {
            self.lex_punctuation();
            TokenKind::Punctuation
        };

        Some(Token::new(kind, &self.text[start..self.pos]))
    }
}
