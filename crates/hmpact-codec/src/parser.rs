use serde_json::{Map, Value};

use crate::scanner::{Diagnostic, ParseErrorCode, Scanner, Token};

/// Containers nested deeper than this are reported and skipped.
pub const MAX_DEPTH: usize = 128;

/// Parse JSON with comments and trailing commas into a [`Value`].
///
/// Parsing recovers from errors so every diagnostic in the input is
/// reported; a value is only returned when there were none. Nesting beyond
/// [`MAX_DEPTH`] is a `NestingTooDeep` diagnostic, not a stack overflow.
///
/// # Errors
///
/// Returns every diagnostic collected when the input is malformed.
pub fn parse_value(text: &str) -> Result<Value, Vec<Diagnostic>> {
    let mut parser = Parser {
        scanner: Scanner::new(text),
        depth: 0,
    };
    let value = parser.parse_document();
    let diagnostics = parser.scanner.into_diagnostics();
    match value {
        Some(value) if diagnostics.is_empty() => Ok(value),
        _ if diagnostics.is_empty() => Err(vec![Diagnostic {
            offset: 0,
            code: ParseErrorCode::ValueExpected,
        }]),
        _ => Err(diagnostics),
    }
}

struct Parser<'a> {
    scanner: Scanner<'a>,
    depth: usize,
}

impl Parser<'_> {
    fn parse_document(&mut self) -> Option<Value> {
        if self.scanner.advance() == Token::Eof {
            self.handle_error(ParseErrorCode::ValueExpected, &[], &[]);
            return None;
        }
        let value = self.parse_value();
        match value {
            None => self.handle_error(ParseErrorCode::ValueExpected, &[], &[]),
            Some(_) if self.scanner.token() != Token::Eof => {
                self.handle_error(ParseErrorCode::EndOfFileExpected, &[], &[]);
            }
            Some(_) => {}
        }
        value
    }

    /// Record `code` at the current token, then skip ahead to a resync point.
    fn handle_error(&mut self, code: ParseErrorCode, skip_after: &[Token], skip_until: &[Token]) {
        let offset = self.scanner.token_offset();
        self.scanner.report(code, offset);
        if skip_after.is_empty() && skip_until.is_empty() {
            return;
        }
        let mut token = self.scanner.token();
        while token != Token::Eof {
            if skip_after.contains(&token) {
                self.scanner.advance();
                break;
            }
            if skip_until.contains(&token) {
                break;
            }
            token = self.scanner.advance();
        }
    }

    fn parse_value(&mut self) -> Option<Value> {
        let value = match self.scanner.token() {
            Token::OpenBrace | Token::OpenBracket if self.depth >= MAX_DEPTH => {
                self.handle_error(ParseErrorCode::NestingTooDeep, &[], &[]);
                self.skip_container();
                return Some(Value::Null);
            }
            Token::OpenBrace => {
                self.depth += 1;
                let object = self.parse_object();
                self.depth -= 1;
                return Some(object);
            }
            Token::OpenBracket => {
                self.depth += 1;
                let array = self.parse_array();
                self.depth -= 1;
                return Some(array);
            }
            Token::String => Value::String(self.scanner.take_string()),
            Token::Number => self.scanner.take_number().map_or(Value::Null, Value::Number),
            Token::True => Value::Bool(true),
            Token::False => Value::Bool(false),
            Token::Null => Value::Null,
            _ => return None,
        };
        self.scanner.advance();
        Some(value)
    }

    /// Step over the container at the current token without recursing.
    fn skip_container(&mut self) {
        let mut open = 0usize;
        loop {
            match self.scanner.token() {
                Token::OpenBrace | Token::OpenBracket => open += 1,
                Token::CloseBrace | Token::CloseBracket => {
                    open -= 1;
                    if open == 0 {
                        self.scanner.advance();
                        return;
                    }
                }
                Token::Eof => return,
                _ => {}
            }
            self.scanner.advance();
        }
    }

    fn parse_object(&mut self) -> Value {
        let mut map = Map::new();
        self.scanner.advance();
        let mut needs_comma = false;
        while !matches!(self.scanner.token(), Token::CloseBrace | Token::Eof) {
            if self.scanner.token() == Token::Comma {
                if !needs_comma {
                    self.handle_error(ParseErrorCode::ValueExpected, &[], &[]);
                }
                if self.scanner.advance() == Token::CloseBrace {
                    break;
                }
            } else if needs_comma {
                self.handle_error(ParseErrorCode::CommaExpected, &[], &[]);
            }
            if let Some((key, value)) = self.parse_property() {
                map.insert(key, value);
            }
            needs_comma = true;
        }
        if self.scanner.token() == Token::CloseBrace {
            self.scanner.advance();
        } else {
            self.handle_error(ParseErrorCode::CloseBraceExpected, &[Token::CloseBrace], &[]);
        }
        Value::Object(map)
    }

    fn parse_property(&mut self) -> Option<(String, Value)> {
        const RESYNC: &[Token] = &[Token::CloseBrace, Token::Comma];
        if self.scanner.token() != Token::String {
            self.handle_error(ParseErrorCode::PropertyNameExpected, &[], RESYNC);
            return None;
        }
        let key = self.scanner.take_string();
        if self.scanner.advance() != Token::Colon {
            self.handle_error(ParseErrorCode::ColonExpected, &[], RESYNC);
            return None;
        }
        self.scanner.advance();
        if let Some(value) = self.parse_value() {
            Some((key, value))
        } else {
            self.handle_error(ParseErrorCode::ValueExpected, &[], RESYNC);
            None
        }
    }

    fn parse_array(&mut self) -> Value {
        const RESYNC: &[Token] = &[Token::CloseBracket, Token::Comma];
        let mut items = Vec::new();
        self.scanner.advance();
        let mut needs_comma = false;
        while !matches!(self.scanner.token(), Token::CloseBracket | Token::Eof) {
            if self.scanner.token() == Token::Comma {
                if !needs_comma {
                    self.handle_error(ParseErrorCode::ValueExpected, &[], &[]);
                }
                if self.scanner.advance() == Token::CloseBracket {
                    break;
                }
            } else if needs_comma {
                self.handle_error(ParseErrorCode::CommaExpected, &[], &[]);
            }
            match self.parse_value() {
                Some(value) => items.push(value),
                None => self.handle_error(ParseErrorCode::ValueExpected, &[], RESYNC),
            }
            needs_comma = true;
        }
        if self.scanner.token() == Token::CloseBracket {
            self.scanner.advance();
        } else {
            self.handle_error(
                ParseErrorCode::CloseBracketExpected,
                &[Token::CloseBracket],
                &[],
            );
        }
        Value::Array(items)
    }
}
