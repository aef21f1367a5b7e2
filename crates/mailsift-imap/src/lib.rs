//! # mailsift-imap
//!
//! The IMAP client side of mailsift: enough of IMAP4rev1 to log in, open a
//! folder, search it by UID, fetch whole messages and change their flags.
//!
//! ## Connection states
//!
//! ```text
//! NotAuthenticated ── login() ──▶ Authenticated ── select()/examine() ──▶ Selected
//!                                       ▲                                    │
//!                                       └──────────── close() ───────────────┘
//! ```
//!
//! `logout()` is available in every state.
//!
//! ## Example
//!
//! ```ignore
//! use mailsift_imap::{Client, Config, FetchAttribute, SearchCriteria, UidSet, connection};
//!
//! # async fn run() -> mailsift_imap::Result<()> {
//! let config = Config::new("imap.example.com");
//! let stream = connection::connect(&config).await?;
//! let client = Client::from_stream(stream).await?;
//! let client = client.login("user@example.com", "secret").await?;
//! let mut inbox = client.examine("INBOX").await?;
//!
//! let uids = inbox.uid_search(&SearchCriteria::unseen()).await?;
//! if let Some(set) = UidSet::from_uids(&uids) {
//!     let messages = inbox.uid_fetch(&set, &FetchAttribute::FULL_MESSAGE).await?;
//!     println!("{} messages", messages.len());
//! }
//! inbox.logout().await
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod types;

pub use command::{
    Command, FetchAttribute, SearchCriteria, SearchKey, StoreAction, TagGenerator,
    format_search_date,
};
pub use connection::{
    Authenticated, Client, Config, ConfigBuilder, FramedStream, ImapStream, NotAuthenticated,
    Security, Selected,
};
pub use error::{Error, Result};
pub use parser::{FetchItem, FetchedMessage, Response, ResponseParser, UntaggedResponse};
pub use types::{
    Flag, Flags, MailboxStatus, ResponseCode, SeqNum, Status, Tag, Uid, UidSet, UidValidity,
};
