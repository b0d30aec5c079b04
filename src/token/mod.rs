//! Tokenizer for the Well-Known-Text dialect: classifies a character stream
//! into words, numbers, symbols and whitespace, with line/column tracking
//! for diagnostics.
//!
//! Classification runs character-by-character with one character of
//! lookahead: digits and `_` extend a word (so `WGS84` is a single Word
//! token), `-` immediately followed by a digit starts a Number, and `.`,
//! `E`, `+`, `-` are folded into a Number only while one is already being
//! scanned, which admits scientific notation (`1.23E-5`).
//!
//! The tokenizer itself never fails: malformed input merely yields Symbol
//! or Word tokens that the reader layer rejects.

use crate::authoring::*;

/// The class of a single token
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    Number,
    Symbol,
    Whitespace,
    Eol,
    Eof,
}

/// A token and the position of its first character (1-based)
#[derive(Clone, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    /// The numeric value of a Number token
    pub fn number(&self) -> Result<f64, Error> {
        if self.kind == TokenKind::Number {
            if let Ok(value) = self.text.parse::<f64>() {
                return Ok(value);
            }
        }
        Err(Error::Syntax(format!(
            "The token '{}' is not a number at line {} column {}.",
            self.text, self.line, self.column
        )))
    }
}

pub struct Tokenizer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Tokenizer {
    pub fn new(text: &str) -> Tokenizer {
        Tokenizer {
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    // ----- C O R E   S C A N N E R ---------------------------------------------------

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn is_word_char(c: char) -> bool {
        c.is_alphanumeric() || c == '_'
    }

    /// Next token, whitespace and end-of-line tokens skipped
    pub fn next_token(&mut self) -> Token {
        loop {
            let token = self.next_token_any();
            match token.kind {
                TokenKind::Whitespace | TokenKind::Eol => continue,
                _ => return token,
            }
        }
    }

    /// Next token, whitespace included. Needed inside quoted strings,
    /// where whitespace is significant
    pub fn next_token_any(&mut self) -> Token {
        let line = self.line;
        let column = self.column;
        let Some(c) = self.bump() else {
            return Token {
                kind: TokenKind::Eof,
                text: String::new(),
                line,
                column,
            };
        };

        let mut text = String::new();
        text.push(c);

        let kind = if c.is_alphabetic() {
            self.scan_word(&mut text);
            TokenKind::Word
        } else if c.is_ascii_digit()
            || (c == '-' && self.peek().map_or(false, |n| n.is_ascii_digit()))
        {
            self.scan_number(&mut text);
            TokenKind::Number
        } else if c == '\n' {
            TokenKind::Eol
        } else if c.is_whitespace() || c.is_control() {
            while let Some(n) = self.peek() {
                if n != '\n' && (n.is_whitespace() || n.is_control()) {
                    text.push(self.bump().unwrap());
                } else {
                    break;
                }
            }
            TokenKind::Whitespace
        } else {
            TokenKind::Symbol
        };

        Token {
            kind,
            text,
            line,
            column,
        }
    }

    fn scan_word(&mut self, text: &mut String) {
        while let Some(n) = self.peek() {
            if Self::is_word_char(n) {
                text.push(self.bump().unwrap());
            } else {
                break;
            }
        }
    }

    fn scan_number(&mut self, text: &mut String) {
        while let Some(n) = self.peek() {
            if n.is_ascii_digit() || n == '.' {
                text.push(self.bump().unwrap());
                continue;
            }
            // Scientific notation: the exponent marker and a directly
            // following sign belong to the number
            if (n == 'E' || n == 'e') && self.exponent_follows() {
                text.push(self.bump().unwrap());
                if let Some(s) = self.peek() {
                    if s == '+' || s == '-' {
                        text.push(self.bump().unwrap());
                    }
                }
                continue;
            }
            break;
        }
    }

    fn exponent_follows(&self) -> bool {
        match self.chars.get(self.pos + 1) {
            Some(&c) => c.is_ascii_digit() || c == '+' || c == '-',
            None => false,
        }
    }

    // ----- W K T   H E L P E R S -----------------------------------------------------

    /// Read a token and check that it is the expected one
    pub fn read_token(&mut self, expected: &str) -> Result<(), Error> {
        let token = self.next_token();
        if token.text != expected {
            return Err(Error::Syntax(format!(
                "Expecting ('{}') but got a '{}' at line {} column {}.",
                expected, token.text, token.line, token.column
            )));
        }
        Ok(())
    }

    /// Read the next token as a number
    pub fn read_number(&mut self) -> Result<f64, Error> {
        self.next_token().number()
    }

    /// Read a string inside double quotes. Whitespace inside the
    /// quotes is preserved
    pub fn read_quoted_word(&mut self) -> Result<String, Error> {
        self.read_token("\"")?;
        let mut word = String::new();
        loop {
            let token = self.next_token_any();
            match token.kind {
                TokenKind::Eof => {
                    return Err(Error::Syntax(format!(
                        "Unterminated quoted string at line {} column {}.",
                        token.line, token.column
                    )))
                }
                _ if token.text == "\"" => return Ok(word),
                _ => word.push_str(&token.text),
            }
        }
    }

    /// Read the authority name and code of an `AUTHORITY["...", ...]`
    /// clause. The `AUTHORITY` keyword itself must already be consumed
    pub fn read_authority(&mut self) -> Result<Authority, Error> {
        self.read_token("[")?;
        let name = self.read_quoted_word()?;
        self.read_token(",")?;
        let token = self.next_token();
        let code = if token.kind == TokenKind::Number {
            token.number()? as i64
        } else if token.text == "\"" {
            // Quoted code: scan up to the closing quote, then parse
            let mut word = String::new();
            loop {
                let t = self.next_token_any();
                if t.text == "\"" {
                    break;
                }
                if t.kind == TokenKind::Eof {
                    return Err(Error::Syntax(format!(
                        "Unterminated quoted string at line {} column {}.",
                        t.line, t.column
                    )));
                }
                word.push_str(&t.text);
            }
            word.trim().parse::<i64>().map_err(|_| {
                Error::Syntax(format!(
                    "The token '{}' is not a number at line {} column {}.",
                    word, token.line, token.column
                ))
            })?
        } else {
            return Err(Error::Syntax(format!(
                "Expecting (authority code) but got a '{}' at line {} column {}.",
                token.text, token.line, token.column
            )));
        };
        self.read_token("]")?;
        Ok(Authority::new(&name, code))
    }
}

// ----- T E S T S ---------------------------------------------------------------------
