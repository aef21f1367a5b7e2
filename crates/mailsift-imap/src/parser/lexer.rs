//! Tokenizer for server responses.
//!
//! The lexer works on one complete response (as assembled by the framed
//! reader, literals included) and never performs I/O.

#![allow(clippy::missing_errors_doc)]

use crate::{Error, Result};

/// A lexical token. Literals borrow from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Atom, including flags such as `\Seen`.
    Atom(&'a str),
    /// Quoted string with escapes removed. Bytes are kept raw since some
    /// servers put non-UTF-8 text inside quotes.
    Quoted(Vec<u8>),
    /// `{n}` literal payload.
    Literal(&'a [u8]),
    /// Bare number.
    Number(u32),
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// Single SP.
    Space,
    /// `*`
    Asterisk,
    /// `+`
    Plus,
    /// `NIL`, any case.
    Nil,
    /// CRLF.
    Crlf,
    /// End of input.
    Eof,
}

/// Cursor over one response.
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Starts at the beginning of `input`.
    #[must_use]
    pub const fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Byte offset of the cursor.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Unconsumed input.
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        self.input.get(self.pos..).unwrap_or_default()
    }

    /// Next byte without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Consumes one byte.
    pub fn advance(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    /// Consumes up to `n` bytes.
    pub fn skip(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    /// Consumes `prefix` if the input continues with it (ASCII case-insensitive).
    pub fn eat(&mut self, prefix: &[u8]) -> bool {
        let rest = self.remaining();
        if rest.len() >= prefix.len() && rest[..prefix.len()].eq_ignore_ascii_case(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    /// Reads the next token.
    pub fn next_token(&mut self) -> Result<Token<'a>> {
        let Some(byte) = self.peek() else {
            return Ok(Token::Eof);
        };

        let single = match byte {
            b' ' => Some(Token::Space),
            b'(' => Some(Token::LParen),
            b')' => Some(Token::RParen),
            b'[' => Some(Token::LBracket),
            b']' => Some(Token::RBracket),
            b'*' => Some(Token::Asterisk),
            b'+' => Some(Token::Plus),
            _ => None,
        };
        if let Some(token) = single {
            self.pos += 1;
            return Ok(token);
        }

        match byte {
            b'\r' | b'\n' => self.read_line_end(),
            b'"' => self.read_quoted(),
            b'{' => self.read_literal(),
            _ if is_atom_char(byte) => self.read_atom(),
            _ => Err(self.error(format!("unexpected byte {byte:#04x}"))),
        }
    }

    /// Line endings are tolerated as bare LF as well.
    fn read_line_end(&mut self) -> Result<Token<'a>> {
        if self.eat(b"\r\n") || self.eat(b"\n") {
            Ok(Token::Crlf)
        } else {
            Err(self.error("CR without LF"))
        }
    }

    fn read_quoted(&mut self) -> Result<Token<'a>> {
        self.pos += 1;
        let mut out = Vec::new();
        loop {
            match self.advance() {
                Some(b'"') => return Ok(Token::Quoted(out)),
                Some(b'\\') => match self.advance() {
                    Some(c @ (b'"' | b'\\')) => out.push(c),
                    Some(c) => return Err(self.error(format!("bad escape \\{}", c as char))),
                    None => return Err(self.error("unterminated quoted string")),
                },
                Some(b'\r' | b'\n') | None => {
                    return Err(self.error("unterminated quoted string"));
                }
                Some(c) => out.push(c),
            }
        }
    }

    fn read_literal(&mut self) -> Result<Token<'a>> {
        self.pos += 1;
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        let digits = &self.input[start..self.pos];
        // Non-synchronizing marker is accepted and ignored.
        self.eat(b"+");
        if !self.eat(b"}") {
            return Err(self.error("malformed literal size"));
        }
        let size: usize = std::str::from_utf8(digits)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| self.error("malformed literal size"))?;
        if !(self.eat(b"\r\n") || self.eat(b"\n")) {
            return Err(self.error("literal size not followed by CRLF"));
        }
        let end = self
            .pos
            .checked_add(size)
            .filter(|end| *end <= self.input.len())
            .ok_or_else(|| self.error("literal shorter than announced"))?;
        let data = &self.input[self.pos..end];
        self.pos = end;
        Ok(Token::Literal(data))
    }

    fn read_atom(&mut self) -> Result<Token<'a>> {
        let start = self.pos;
        while self.peek().is_some_and(is_atom_char) {
            self.pos += 1;
        }
        let bytes = &self.input[start..self.pos];
        if bytes.iter().all(u8::is_ascii_digit) {
            let text = std::str::from_utf8(bytes).unwrap_or_default();
            return text
                .parse()
                .map(Token::Number)
                .map_err(|_| self.error("number out of range"));
        }
        let text = std::str::from_utf8(bytes).map_err(|_| self.error("atom is not UTF-8"))?;
        if text.eq_ignore_ascii_case("NIL") {
            Ok(Token::Nil)
        } else {
            Ok(Token::Atom(text))
        }
    }

    /// Builds a parse error at the cursor.
    pub fn error(&self, message: impl Into<String>) -> Error {
        Error::Parse {
            position: self.pos,
            message: message.into(),
        }
    }

    /// Consumes a token of the same kind as `expected`.
    #[allow(clippy::needless_pass_by_value)]
    pub fn expect(&mut self, expected: Token<'_>) -> Result<()> {
        let token = self.next_token()?;
        if std::mem::discriminant(&token) == std::mem::discriminant(&expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected {expected:?}, found {token:?}")))
        }
    }

    /// Consumes a single space.
    pub fn expect_space(&mut self) -> Result<()> {
        self.expect(Token::Space)
    }

    /// Reads a number.
    pub fn read_number(&mut self) -> Result<u32> {
        match self.next_token()? {
            Token::Number(n) => Ok(n),
            token => Err(self.error(format!("expected number, found {token:?}"))),
        }
    }

    /// Reads an atom.
    pub fn read_atom_string(&mut self) -> Result<&'a str> {
        match self.next_token()? {
            Token::Atom(s) => Ok(s),
            token => Err(self.error(format!("expected atom, found {token:?}"))),
        }
    }

    /// Reads an atom, number, quoted string or literal as text.
    pub fn read_astring(&mut self) -> Result<String> {
        match self.next_token()? {
            Token::Atom(s) => Ok(s.to_string()),
            Token::Number(n) => Ok(n.to_string()),
            Token::Quoted(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Token::Literal(bytes) => Ok(String::from_utf8_lossy(bytes).into_owned()),
            token => Err(self.error(format!("expected string, found {token:?}"))),
        }
    }

    /// Reads NIL or a string as raw bytes.
    pub fn read_nstring_bytes(&mut self) -> Result<Option<Vec<u8>>> {
        match self.next_token()? {
            Token::Nil => Ok(None),
            Token::Quoted(bytes) => Ok(Some(bytes)),
            Token::Literal(bytes) => Ok(Some(bytes.to_vec())),
            token => Err(self.error(format!("expected nstring, found {token:?}"))),
        }
    }

    /// Returns the rest of the line as text and consumes the line ending.
    pub fn read_text_until_crlf(&mut self) -> String {
        let rest = self.remaining();
        let len = rest
            .iter()
            .position(|b| *b == b'\r' || *b == b'\n')
            .unwrap_or(rest.len());
        let text = String::from_utf8_lossy(&rest[..len]).trim().to_string();
        self.pos += len;
        let _ = self.eat(b"\r\n") || self.eat(b"\n");
        text
    }
}

/// Atom characters. `\` is admitted so system flags lex as one atom;
/// `]` is excluded so response codes close cleanly.
#[must_use]
pub const fn is_atom_char(b: u8) -> bool {
    b > 0x20
        && b < 0x7f
        && !matches!(b, b'(' | b')' | b'{' | b'%' | b'*' | b'"' | b'[' | b']')
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn tokens(input: &[u8]) -> Vec<Token<'_>> {
        let mut lexer = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            if token == Token::Eof {
                return out;
            }
            out.push(token);
        }
    }

    #[test]
    fn test_tagged_line() {
        assert_eq!(
            tokens(b"A0001 OK done\r\n"),
            vec![
                Token::Atom("A0001"),
                Token::Space,
                Token::Atom("OK"),
                Token::Space,
                Token::Atom("done"),
                Token::Crlf,
            ]
        );
    }

    #[test]
    fn test_search_numbers() {
        assert_eq!(
            tokens(b"* SEARCH 4 18"),
            vec![
                Token::Asterisk,
                Token::Space,
                Token::Atom("SEARCH"),
                Token::Space,
                Token::Number(4),
                Token::Space,
                Token::Number(18),
            ]
        );
    }

    #[test]
    fn test_flag_list() {
        assert_eq!(
            tokens(b"(\\Seen $Forwarded)"),
            vec![
                Token::LParen,
                Token::Atom("\\Seen"),
                Token::Space,
                Token::Atom("$Forwarded"),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_section_brackets() {
        assert_eq!(
            tokens(b"BODY[]"),
            vec![Token::Atom("BODY"), Token::LBracket, Token::RBracket]
        );
    }

    #[test]
    fn test_quoted_with_escapes() {
        assert_eq!(
            tokens(br#""say \"hi\" \\ bye""#),
            vec![Token::Quoted(br#"say "hi" \ bye"#.to_vec())]
        );
    }

    #[test]
    fn test_quoted_keeps_non_utf8() {
        let mut lexer = Lexer::new(b"\"\xc4\xe3\"");
        assert_eq!(lexer.next_token().unwrap(), Token::Quoted(vec![0xc4, 0xe3]));
    }

    #[test]
    fn test_literal_borrows_payload() {
        let mut lexer = Lexer::new(b"{7}\r\nab\r\ncde)");
        assert_eq!(lexer.next_token().unwrap(), Token::Literal(b"ab\r\ncde"));
        assert_eq!(lexer.next_token().unwrap(), Token::RParen);
    }

    #[test]
    fn test_short_literal_is_error() {
        let mut lexer = Lexer::new(b"{10}\r\nabc");
        assert!(matches!(lexer.next_token(), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_nil_any_case() {
        assert_eq!(
            tokens(b"nil NIL"),
            vec![Token::Nil, Token::Space, Token::Nil]
        );
    }

    #[test]
    fn test_text_until_crlf() {
        let mut lexer = Lexer::new(b" LOGIN completed \r\nnext");
        assert_eq!(lexer.read_text_until_crlf(), "LOGIN completed");
        assert_eq!(lexer.remaining(), b"next");
    }

    #[test]
    fn test_atom_chars() {
        assert!(is_atom_char(b'\\'));
        assert!(is_atom_char(b'$'));
        assert!(!is_atom_char(b']'));
        assert!(!is_atom_char(b' '));
        assert!(!is_atom_char(0x7f));
    }
}
