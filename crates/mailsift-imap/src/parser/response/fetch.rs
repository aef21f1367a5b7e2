//! FETCH data items.

use crate::parser::lexer::{Lexer, Token};
use crate::types::{Flags, SeqNum, Uid};
use crate::Result;

use super::parse_flag_list;

/// One data item inside `* n FETCH (...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchItem {
    /// `FLAGS (...)`
    Flags(Flags),
    /// `UID n`
    Uid(Uid),
    /// `INTERNALDATE "..."`, unparsed.
    InternalDate(String),
    /// `RFC822.SIZE n`
    Rfc822Size(u32),
    /// `BODY[section]<origin> data`
    Body {
        /// Section text between the brackets; `None` for `BODY[]`.
        section: Option<String>,
        /// Partial-fetch origin.
        origin: Option<u32>,
        /// Payload, `None` for NIL.
        data: Option<Vec<u8>>,
    },
    /// `RFC822 data`
    Rfc822(Option<Vec<u8>>),
    /// `RFC822.HEADER data`
    Rfc822Header(Option<Vec<u8>>),
    /// `RFC822.TEXT data`
    Rfc822Text(Option<Vec<u8>>),
}

/// The items of one FETCH response folded into a single record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedMessage {
    /// Sequence number the server reported.
    pub seq: Option<SeqNum>,
    /// Message UID.
    pub uid: Option<Uid>,
    /// Raw INTERNALDATE string.
    pub internal_date: Option<String>,
    /// `RFC822.HEADER` bytes.
    pub header: Option<Vec<u8>>,
    /// `BODY[]` (or `RFC822`) bytes: the entire message.
    pub body: Option<Vec<u8>>,
    /// Flags, when requested or pushed by the server.
    pub flags: Option<Flags>,
}

impl FetchedMessage {
    /// Folds fetch items into a record. Later items win.
    #[must_use]
    pub fn from_items(seq: SeqNum, items: Vec<FetchItem>) -> Self {
        let mut message = Self {
            seq: Some(seq),
            ..Self::default()
        };
        message.merge(items);
        message
    }

    /// Merges additional items, as sent when a server splits one message
    /// across several FETCH responses.
    pub fn merge(&mut self, items: Vec<FetchItem>) {
        for item in items {
            match item {
                FetchItem::Flags(flags) => self.flags = Some(flags),
                FetchItem::Uid(uid) => self.uid = Some(uid),
                FetchItem::InternalDate(date) => self.internal_date = Some(date),
                FetchItem::Rfc822Header(data) => {
                    if data.is_some() {
                        self.header = data;
                    }
                }
                FetchItem::Body {
                    section: None,
                    origin: None,
                    data,
                }
                | FetchItem::Rfc822(data) => {
                    if data.is_some() {
                        self.body = data;
                    }
                }
                FetchItem::Body {
                    section: Some(section),
                    data,
                    ..
                } if section.eq_ignore_ascii_case("HEADER") => {
                    if self.header.is_none() {
                        self.header = data;
                    }
                }
                FetchItem::Body { .. } | FetchItem::Rfc822Size(_) | FetchItem::Rfc822Text(_) => {}
            }
        }
    }
}

/// Parses the parenthesised item list following `FETCH SP`.
pub fn parse_fetch_items(lexer: &mut Lexer<'_>) -> Result<Vec<FetchItem>> {
    lexer.expect(Token::LParen)?;
    let mut items = Vec::new();
    loop {
        let name = match lexer.next_token()? {
            Token::RParen => return Ok(items),
            Token::Space => continue,
            Token::Atom(name) => name,
            token => return Err(lexer.error(format!("unexpected {token:?} in FETCH"))),
        };
        let upper = name.to_ascii_uppercase();
        let item = match upper.as_str() {
            "FLAGS" => {
                lexer.expect_space()?;
                Some(FetchItem::Flags(parse_flag_list(lexer)?))
            }
            "UID" => {
                lexer.expect_space()?;
                let n = lexer.read_number()?;
                Some(FetchItem::Uid(
                    Uid::new(n).ok_or_else(|| lexer.error("UID 0 in FETCH"))?,
                ))
            }
            "INTERNALDATE" => {
                lexer.expect_space()?;
                lexer
                    .read_nstring_bytes()?
                    .map(|raw| FetchItem::InternalDate(String::from_utf8_lossy(&raw).into_owned()))
            }
            "RFC822.SIZE" => {
                lexer.expect_space()?;
                Some(FetchItem::Rfc822Size(lexer.read_number()?))
            }
            "BODY" | "BODY.PEEK" if lexer.peek() == Some(b'[') => {
                let (section, origin) = read_section(lexer)?;
                lexer.expect_space()?;
                let data = lexer.read_nstring_bytes()?;
                Some(FetchItem::Body {
                    section,
                    origin,
                    data,
                })
            }
            "RFC822" | "RFC822.HEADER" | "RFC822.TEXT" => {
                lexer.expect_space()?;
                let data = lexer.read_nstring_bytes()?;
                Some(match upper.as_str() {
                    "RFC822" => FetchItem::Rfc822(data),
                    "RFC822.HEADER" => FetchItem::Rfc822Header(data),
                    _ => FetchItem::Rfc822Text(data),
                })
            }
            _ => {
                skip_value(lexer)?;
                None
            }
        };
        items.extend(item);
    }
}

/// Reads `[section]` and an optional `<origin>`, both taken verbatim.
fn read_section(lexer: &mut Lexer<'_>) -> Result<(Option<String>, Option<u32>)> {
    lexer.advance();
    let rest = lexer.remaining();
    let len = rest
        .iter()
        .position(|b| *b == b']')
        .ok_or_else(|| lexer.error("unterminated section"))?;
    let section = String::from_utf8_lossy(&rest[..len]).into_owned();
    lexer.skip(len + 1);

    let mut origin = None;
    if lexer.peek() == Some(b'<') {
        let rest = lexer.remaining();
        let len = rest
            .iter()
            .position(|b| *b == b'>')
            .ok_or_else(|| lexer.error("unterminated origin"))?;
        origin = std::str::from_utf8(&rest[1..len]).ok().and_then(|s| s.parse().ok());
        lexer.skip(len + 1);
    }

    Ok(((!section.is_empty()).then_some(section), origin))
}

/// Skips the value of an item we do not model, nested lists included.
fn skip_value(lexer: &mut Lexer<'_>) -> Result<()> {
    if lexer.peek() == Some(b' ') {
        lexer.advance();
    }
    if lexer.peek() == Some(b'[') {
        read_section(lexer)?;
        lexer.expect_space()?;
    }
    let mut depth = 0_usize;
    loop {
        match lexer.peek() {
            Some(b')') if depth == 0 => return Ok(()),
            Some(b' ') if depth == 0 => return Ok(()),
            None => return Ok(()),
            _ => {}
        }
        match lexer.next_token()? {
            Token::LParen => depth += 1,
            Token::RParen => depth = depth.saturating_sub(1),
            Token::Eof | Token::Crlf => return Ok(()),
            _ => {}
        }
        if depth == 0 && !matches!(lexer.peek(), Some(b'(' | b')')) {
            return Ok(());
        }
    }
}
