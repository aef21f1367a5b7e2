//! One-call retrieval helpers.
//!
//! Each `generate_*` function opens a session and returns a [`FetchStream`];
//! its `get_*` twin drains that stream into emails and errors. A session
//! that cannot be opened shows up as a single error in the list.

use chrono::NaiveDate;
use mailsift_imap::SearchCriteria;

use crate::config::MailboxConfig;
use crate::email::DecodedEmail;
use crate::error::{Error, Result};
use crate::pipeline::{FetchOptions, FetchStream, generate};

async fn collect(stream: Result<FetchStream>) -> (Vec<DecodedEmail>, Vec<Error>) {
    match stream {
        Ok(stream) => stream.collect().await,
        Err(e) => {
            tracing::warn!(error = %e, "unable to open mailbox");
            (Vec::new(), vec![e])
        }
    }
}

/// Streams every message in the folder.
///
/// # Errors
///
/// Session-level failures.
pub async fn generate_all(config: &MailboxConfig, options: FetchOptions) -> Result<FetchStream> {
    generate(config, SearchCriteria::all(), options).await
}

/// Collects every message in the folder.
pub async fn get_all(config: &MailboxConfig, options: FetchOptions) -> (Vec<DecodedEmail>, Vec<Error>) {
    collect(generate_all(config, options).await).await
}

/// Streams unseen messages.
///
/// # Errors
///
/// Session-level failures.
pub async fn generate_unread(config: &MailboxConfig, options: FetchOptions) -> Result<FetchStream> {
    generate(config, SearchCriteria::unseen(), options).await
}

/// Collects unseen messages.
pub async fn get_unread(config: &MailboxConfig, options: FetchOptions) -> (Vec<DecodedEmail>, Vec<Error>) {
    collect(generate_unread(config, options).await).await
}

/// Streams messages whose internal date is on or after `since`.
///
/// # Errors
///
/// Session-level failures.
pub async fn generate_since(
    config: &MailboxConfig,
    since: NaiveDate,
    options: FetchOptions,
) -> Result<FetchStream> {
    generate(config, SearchCriteria::since(since), options).await
}

/// Collects messages whose internal date is on or after `since`.
pub async fn get_since(
    config: &MailboxConfig,
    since: NaiveDate,
    options: FetchOptions,
) -> (Vec<DecodedEmail>, Vec<Error>) {
    collect(generate_since(config, since, options).await).await
}

/// Streams messages matching caller-built criteria. Unrecognised keys are
/// dropped when the criteria are compiled.
///
/// # Errors
///
/// Session-level failures.
pub async fn generate_with_criteria(
    config: &MailboxConfig,
    criteria: SearchCriteria,
    options: FetchOptions,
) -> Result<FetchStream> {
    generate(config, criteria, options).await
}

/// Collects messages matching caller-built criteria.
pub async fn get_with_criteria(
    config: &MailboxConfig,
    criteria: SearchCriteria,
    options: FetchOptions,
) -> (Vec<DecodedEmail>, Vec<Error>) {
    collect(generate_with_criteria(config, criteria, options).await).await
}

/// Streams messages matching a raw search keyword, sent as given.
///
/// # Errors
///
/// Session-level failures.
pub async fn generate_command(
    config: &MailboxConfig,
    keyword: &str,
    options: FetchOptions,
) -> Result<FetchStream> {
    generate(config, SearchCriteria::keyword(keyword), options).await
}

/// Collects messages matching a raw search keyword.
pub async fn get_command(
    config: &MailboxConfig,
    keyword: &str,
    options: FetchOptions,
) -> (Vec<DecodedEmail>, Vec<Error>) {
    collect(generate_command(config, keyword, options).await).await
}
