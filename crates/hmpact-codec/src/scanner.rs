use std::fmt;

use serde::{Deserialize, Serialize};

/// Diagnostic codes reported while scanning and parsing a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseErrorCode {
    InvalidSymbol,
    InvalidNumberFormat,
    PropertyNameExpected,
    ValueExpected,
    ColonExpected,
    CommaExpected,
    CloseBraceExpected,
    CloseBracketExpected,
    EndOfFileExpected,
    UnexpectedEndOfComment,
    UnexpectedEndOfString,
    InvalidUnicode,
    InvalidEscapeCharacter,
    InvalidCharacter,
    NestingTooDeep,
}

impl ParseErrorCode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidSymbol => "InvalidSymbol",
            Self::InvalidNumberFormat => "InvalidNumberFormat",
            Self::PropertyNameExpected => "PropertyNameExpected",
            Self::ValueExpected => "ValueExpected",
            Self::ColonExpected => "ColonExpected",
            Self::CommaExpected => "CommaExpected",
            Self::CloseBraceExpected => "CloseBraceExpected",
            Self::CloseBracketExpected => "CloseBracketExpected",
            Self::EndOfFileExpected => "EndOfFileExpected",
            Self::UnexpectedEndOfComment => "UnexpectedEndOfComment",
            Self::UnexpectedEndOfString => "UnexpectedEndOfString",
            Self::InvalidUnicode => "InvalidUnicode",
            Self::InvalidEscapeCharacter => "InvalidEscapeCharacter",
            Self::InvalidCharacter => "InvalidCharacter",
            Self::NestingTooDeep => "NestingTooDeep",
        }
    }
}

impl fmt::Display for ParseErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single problem found in the input, located by byte offset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub offset: usize,
    pub code: ParseErrorCode,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.code, self.offset)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Token {
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Comma,
    Colon,
    String,
    Number,
    True,
    False,
    Null,
    Eof,
}

/// Tokenizer over JSON with `//` and `/* */` comments.
///
/// Comments and whitespace are trivia. Unknown symbols are reported and
/// skipped so the parser never sees them.
pub(crate) struct Scanner<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    token: Token,
    token_offset: usize,
    string_value: String,
    number_value: Option<serde_json::Number>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            token: Token::Eof,
            token_offset: 0,
            string_value: String::new(),
            number_value: None,
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn token(&self) -> Token {
        self.token
    }

    pub(crate) fn token_offset(&self) -> usize {
        self.token_offset
    }

    pub(crate) fn take_string(&mut self) -> String {
        std::mem::take(&mut self.string_value)
    }

    pub(crate) fn take_number(&mut self) -> Option<serde_json::Number> {
        self.number_value.take()
    }

    pub(crate) fn report(&mut self, code: ParseErrorCode, offset: usize) {
        self.diagnostics.push(Diagnostic { offset, code });
    }

    pub(crate) fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub(crate) fn advance(&mut self) -> Token {
        loop {
            self.skip_trivia();
            self.token_offset = self.pos;
            let Some(&byte) = self.bytes.get(self.pos) else {
                self.token = Token::Eof;
                return self.token;
            };
            let token = match byte {
                b'{' => self.single(Token::OpenBrace),
                b'}' => self.single(Token::CloseBrace),
                b'[' => self.single(Token::OpenBracket),
                b']' => self.single(Token::CloseBracket),
                b',' => self.single(Token::Comma),
                b':' => self.single(Token::Colon),
                b'"' => Some(self.scan_string()),
                b'-' | b'0'..=b'9' => Some(self.scan_number()),
                b if b.is_ascii_alphabetic() || b == b'_' => self.scan_word(),
                _ => {
                    let width = self.text[self.pos..]
                        .chars()
                        .next()
                        .map_or(1, char::len_utf8);
                    self.report(ParseErrorCode::InvalidSymbol, self.pos);
                    self.pos += width;
                    None
                }
            };
            if let Some(token) = token {
                self.token = token;
                return token;
            }
        }
    }

    fn single(&mut self, token: Token) -> Option<Token> {
        self.pos += 1;
        Some(token)
    }

    fn skip_trivia(&mut self) {
        loop {
            while let Some(b) = self.bytes.get(self.pos) {
                if matches!(b, b' ' | b'\t' | b'\n' | b'\r') || *b == 0x0b || *b == 0x0c {
                    self.pos += 1;
                } else {
                    break;
                }
            }
            let rest = &self.bytes[self.pos..];
            if rest.starts_with(b"//") {
                while let Some(b) = self.bytes.get(self.pos) {
                    if matches!(b, b'\n' | b'\r') {
                        break;
                    }
                    self.pos += 1;
                }
            } else if rest.starts_with(b"/*") {
                let start = self.pos;
                match self.text[self.pos + 2..].find("*/") {
                    Some(end) => self.pos += 2 + end + 2,
                    None => {
                        self.report(ParseErrorCode::UnexpectedEndOfComment, start);
                        self.pos = self.bytes.len();
                    }
                }
            } else {
                return;
            }
        }
    }

    fn scan_word(&mut self) -> Option<Token> {
        let start = self.pos;
        while let Some(b) = self.bytes.get(self.pos) {
            if b.is_ascii_alphanumeric() || *b == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        match &self.text[start..self.pos] {
            "true" => Some(Token::True),
            "false" => Some(Token::False),
            "null" => Some(Token::Null),
            _ => {
                self.report(ParseErrorCode::InvalidSymbol, start);
                None
            }
        }
    }

    fn scan_number(&mut self) -> Token {
        let start = self.pos;
        self.pos += 1;
        while let Some(b) = self.bytes.get(self.pos) {
            if b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-') {
                self.pos += 1;
            } else {
                break;
            }
        }
        let literal = &self.text[start..self.pos];
        self.number_value = literal.parse::<serde_json::Number>().ok();
        if self.number_value.is_none() {
            self.report(ParseErrorCode::InvalidNumberFormat, start);
        }
        Token::Number
    }

    fn scan_string(&mut self) -> Token {
        let start = self.pos;
        self.pos += 1;
        let mut out = String::new();
        let mut chunk = self.pos;
        loop {
            let Some(&byte) = self.bytes.get(self.pos) else {
                out.push_str(&self.text[chunk..self.pos]);
                self.report(ParseErrorCode::UnexpectedEndOfString, start);
                break;
            };
            match byte {
                b'"' => {
                    out.push_str(&self.text[chunk..self.pos]);
                    self.pos += 1;
                    break;
                }
                b'\\' => {
                    out.push_str(&self.text[chunk..self.pos]);
                    self.pos += 1;
                    let Some(&escape) = self.bytes.get(self.pos) else {
                        self.report(ParseErrorCode::UnexpectedEndOfString, start);
                        break;
                    };
                    self.pos += 1;
                    match escape {
                        b'"' => out.push('"'),
                        b'\\' => out.push('\\'),
                        b'/' => out.push('/'),
                        b'b' => out.push('\u{8}'),
                        b'f' => out.push('\u{c}'),
                        b'n' => out.push('\n'),
                        b'r' => out.push('\r'),
                        b't' => out.push('\t'),
                        b'u' => match self.scan_unicode_escape() {
                            Some(ch) => out.push(ch),
                            None => self.report(ParseErrorCode::InvalidUnicode, self.pos - 2),
                        },
                        _ => {
                            self.report(ParseErrorCode::InvalidEscapeCharacter, self.pos - 2);
                        }
                    }
                    chunk = self.pos;
                }
                b'\n' | b'\r' => {
                    out.push_str(&self.text[chunk..self.pos]);
                    self.report(ParseErrorCode::UnexpectedEndOfString, start);
                    break;
                }
                b if b < 0x20 => {
                    out.push_str(&self.text[chunk..self.pos]);
                    self.report(ParseErrorCode::InvalidCharacter, self.pos);
                    self.pos += 1;
                    chunk = self.pos;
                }
                _ => self.pos += 1,
            }
        }
        self.string_value = out;
        Token::String
    }

    fn scan_unicode_escape(&mut self) -> Option<char> {
        let high = self.read_hex4()?;
        if (0xD800..0xDC00).contains(&high) {
            if self.bytes[self.pos..].starts_with(b"\\u") {
                let saved = self.pos;
                self.pos += 2;
                if let Some(low) = self.read_hex4() {
                    if (0xDC00..0xE000).contains(&low) {
                        return char::from_u32(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00));
                    }
                }
                self.pos = saved;
            }
            return None;
        }
        char::from_u32(high)
    }

    fn read_hex4(&mut self) -> Option<u32> {
        let digits = self.text.get(self.pos..self.pos + 4)?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let value = u32::from_str_radix(digits, 16).ok()?;
        self.pos += 4;
        Some(value)
    }
}
