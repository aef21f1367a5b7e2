//! # mailsift-core
//!
//! Mailbox retrieval for mailsift.
//!
//! This crate provides:
//! - Sessions: connect, log in, open a folder, close and log out
//! - A streaming fetch pipeline with bounded buffering and cancellation
//! - Per-UID flag changes (`\Seen`, `\Deleted`)
//! - [`DecodedEmail`] records built on `mailsift-mime`
//! - Configuration loading from the deployment's JSON format
//!
//! ## Example
//!
//! ```no_run
//! use mailsift_core::{FetchOptions, FetchResult, MailboxConfig, generate_unread};
//!
//! # async fn run() -> mailsift_core::Result<()> {
//! let config = MailboxConfig::from_file("exmail.conf")?;
//! let mut stream = generate_unread(&config, FetchOptions::default().mark_as_read(true)).await?;
//! while let Some(result) = stream.next().await {
//!     match result {
//!         FetchResult::Email(email) => println!("{}: {}", email.uid, email.subject),
//!         FetchResult::Failed { uid, error } => eprintln!("{uid:?}: {error}"),
//!         FetchResult::Aborted(error) => return Err(error),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod config;
mod email;
mod error;
mod flags;
mod pipeline;
mod retrieve;
mod session;

pub use config::{DEFAULT_FOLDER, MailboxConfig};
pub use email::{DecodedEmail, parse_internal_date};
pub use error::{Error, Result};
pub use flags::{delete, mark_read, mark_unread};
pub use pipeline::{DEFAULT_BUFFER_SIZE, FetchOptions, FetchResult, FetchStream, generate};
pub use retrieve::{
    generate_all, generate_command, generate_since, generate_unread, generate_with_criteria,
    get_all, get_command, get_since, get_unread, get_with_criteria,
};
pub use session::{MailSession, validate_credentials};

pub use mailsift_imap::{Flag, SearchCriteria, Uid};
