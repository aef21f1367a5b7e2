//! Response parser.
//!
//! Turns one complete response (as delivered by the framed reader) into a
//! [`Response`]. Untagged data the client has no use for is kept as
//! [`UntaggedResponse::Other`] rather than rejected, so an exotic server
//! extension never aborts a session.

#![allow(clippy::missing_errors_doc)]

mod fetch;

pub use fetch::{FetchItem, FetchedMessage};

use crate::parser::lexer::{Lexer, Token};
use crate::types::{Flag, Flags, ResponseCode, SeqNum, Status, Tag, Uid, UidValidity};
use crate::Result;

/// A parsed server response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Completion of a tagged command.
    Tagged {
        /// Tag of the command being completed.
        tag: Tag,
        /// Completion status.
        status: Status,
        /// Optional bracketed code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// Server data.
    Untagged(UntaggedResponse),
    /// Command continuation request.
    Continuation {
        /// Text after `+`, if any.
        text: Option<String>,
    },
}

/// Untagged server data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UntaggedResponse {
    /// `* OK|NO|BAD|PREAUTH|BYE [code] text`
    Condition {
        /// Condition status.
        status: Status,
        /// Optional bracketed code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// `* FLAGS (...)`
    Flags(Flags),
    /// `* n EXISTS`
    Exists(u32),
    /// `* n RECENT`
    Recent(u32),
    /// `* n EXPUNGE`
    Expunge(u32),
    /// `* SEARCH n...`; UIDs when answering UID SEARCH.
    Search(Vec<u32>),
    /// `* n FETCH (...)`
    Fetch {
        /// Sequence number of the message.
        seq: SeqNum,
        /// Data items returned for it.
        items: Vec<FetchItem>,
    },
    /// Anything else, by keyword.
    Other(String),
}

/// Stateless response parser.
pub struct ResponseParser;

impl ResponseParser {
    /// Parses one complete response.
    pub fn parse(input: &[u8]) -> Result<Response> {
        let mut lexer = Lexer::new(input);
        match lexer.next_token()? {
            Token::Asterisk => {
                lexer.expect_space()?;
                parse_untagged(&mut lexer).map(Response::Untagged)
            }
            Token::Plus => {
                if lexer.peek() == Some(b' ') {
                    lexer.advance();
                }
                let text = lexer.read_text_until_crlf();
                Ok(Response::Continuation {
                    text: (!text.is_empty()).then_some(text),
                })
            }
            Token::Atom(tag) => {
                lexer.expect_space()?;
                let status = parse_status(&mut lexer)?;
                let (code, text) = parse_resp_text(&mut lexer)?;
                Ok(Response::Tagged {
                    tag: Tag::new(tag),
                    status,
                    code,
                    text,
                })
            }
            token => Err(lexer.error(format!("expected `*`, `+` or a tag, found {token:?}"))),
        }
    }
}

fn parse_untagged(lexer: &mut Lexer<'_>) -> Result<UntaggedResponse> {
    match lexer.next_token()? {
        Token::Number(n) => {
            lexer.expect_space()?;
            let keyword = lexer.read_atom_string()?;
            match keyword.to_ascii_uppercase().as_str() {
                "EXISTS" => Ok(UntaggedResponse::Exists(n)),
                "RECENT" => Ok(UntaggedResponse::Recent(n)),
                "EXPUNGE" => Ok(UntaggedResponse::Expunge(n)),
                "FETCH" => {
                    let seq = SeqNum::new(n).ok_or_else(|| lexer.error("FETCH for message 0"))?;
                    lexer.expect_space()?;
                    let items = fetch::parse_fetch_items(lexer)?;
                    Ok(UntaggedResponse::Fetch { seq, items })
                }
                _ => Ok(UntaggedResponse::Other(keyword.to_string())),
            }
        }
        Token::Atom(keyword) => {
            let upper = keyword.to_ascii_uppercase();
            if let Some(status) = status_from_word(&upper) {
                let (code, text) = parse_resp_text(lexer)?;
                return Ok(UntaggedResponse::Condition { status, code, text });
            }
            match upper.as_str() {
                "FLAGS" => {
                    lexer.expect_space()?;
                    parse_flag_list(lexer).map(UntaggedResponse::Flags)
                }
                "SEARCH" => parse_search_response(lexer).map(UntaggedResponse::Search),
                _ => Ok(UntaggedResponse::Other(keyword.to_string())),
            }
        }
        token => Err(lexer.error(format!("unexpected {token:?} after `*`"))),
    }
}

fn status_from_word(word: &str) -> Option<Status> {
    match word {
        "OK" => Some(Status::Ok),
        "NO" => Some(Status::No),
        "BAD" => Some(Status::Bad),
        "PREAUTH" => Some(Status::PreAuth),
        "BYE" => Some(Status::Bye),
        _ => None,
    }
}

fn parse_status(lexer: &mut Lexer<'_>) -> Result<Status> {
    let word = lexer.read_atom_string()?;
    status_from_word(&word.to_ascii_uppercase())
        .ok_or_else(|| lexer.error(format!("unknown status `{word}`")))
}

/// `[SP] ["[" code "]" SP] text`. Some servers omit the text entirely.
fn parse_resp_text(lexer: &mut Lexer<'_>) -> Result<(Option<ResponseCode>, String)> {
    if lexer.peek() == Some(b' ') {
        lexer.advance();
    }
    let code = if lexer.peek() == Some(b'[') {
        Some(parse_response_code(lexer)?)
    } else {
        None
    };
    Ok((code, lexer.read_text_until_crlf()))
}

fn parse_response_code(lexer: &mut Lexer<'_>) -> Result<ResponseCode> {
    lexer.expect(Token::LBracket)?;
    let name = lexer.read_atom_string()?;
    let code = match name.to_ascii_uppercase().as_str() {
        "UIDNEXT" => {
            lexer.expect_space()?;
            let n = lexer.read_number()?;
            Uid::new(n).map_or_else(|| ResponseCode::Unknown(name.to_string()), ResponseCode::UidNext)
        }
        "UIDVALIDITY" => {
            lexer.expect_space()?;
            let n = lexer.read_number()?;
            UidValidity::new(n)
                .map_or_else(|| ResponseCode::Unknown(name.to_string()), ResponseCode::UidValidity)
        }
        "UNSEEN" => {
            lexer.expect_space()?;
            let n = lexer.read_number()?;
            SeqNum::new(n).map_or_else(|| ResponseCode::Unknown(name.to_string()), ResponseCode::Unseen)
        }
        "PERMANENTFLAGS" => {
            lexer.expect_space()?;
            ResponseCode::PermanentFlags(parse_flag_list(lexer)?.into_iter().collect())
        }
        _ => ResponseCode::from_atom(name),
    };
    // Arguments of codes we do not model are skipped.
    while !matches!(lexer.peek(), Some(b']') | None) {
        lexer.advance();
    }
    lexer.expect(Token::RBracket)?;
    if lexer.peek() == Some(b' ') {
        lexer.advance();
    }
    Ok(code)
}

/// `"(" [flag *(SP flag)] ")"`, accepting `\*` as a flag.
pub(crate) fn parse_flag_list(lexer: &mut Lexer<'_>) -> Result<Flags> {
    lexer.expect(Token::LParen)?;
    let mut flags = Flags::new();
    loop {
        match lexer.next_token()? {
            Token::RParen => return Ok(flags),
            Token::Space => {}
            Token::Atom("\\") if lexer.peek() == Some(b'*') => {
                lexer.advance();
                flags.insert(Flag::Keyword("\\*".to_string()));
            }
            Token::Atom(s) => flags.insert(Flag::parse(s)),
            token => return Err(lexer.error(format!("unexpected {token:?} in flag list"))),
        }
    }
}

/// Numbers after `SEARCH`. Tolerates trailing spaces.
fn parse_search_response(lexer: &mut Lexer<'_>) -> Result<Vec<u32>> {
    let mut ids = Vec::new();
    loop {
        match lexer.next_token()? {
            Token::Number(n) if n > 0 => ids.push(n),
            Token::Crlf | Token::Eof => return Ok(ids),
            _ => {}
        }
    }
}
