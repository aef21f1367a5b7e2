//! Core IMAP types.

#![allow(clippy::missing_const_for_fn)]

mod flags;
mod identifiers;
mod mailbox;
mod response_code;
mod sequence;

pub use flags::{Flag, Flags};
pub use identifiers::{SeqNum, Tag, Uid, UidValidity};
pub use mailbox::{MailboxStatus, Status};
pub use response_code::ResponseCode;
pub use sequence::UidSet;
