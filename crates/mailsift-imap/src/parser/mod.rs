//! Sans-I/O parser for server responses.
//!
//! The [`Lexer`] splits one response into tokens and the [`ResponseParser`]
//! builds a [`Response`] from them.
//!
//! ```
//! use mailsift_imap::parser::{Response, ResponseParser, UntaggedResponse};
//!
//! let response = ResponseParser::parse(b"* SEARCH 3 7\r\n").unwrap();
//! assert_eq!(
//!     response,
//!     Response::Untagged(UntaggedResponse::Search(vec![3, 7]))
//! );
//! ```

pub mod lexer;
pub mod response;

pub use lexer::{Lexer, Token};
pub use response::{FetchItem, FetchedMessage, Response, ResponseParser, UntaggedResponse};
