//! SELECT and EXAMINE.

use tokio::io::{AsyncRead, AsyncWrite};

use super::Client;
use super::states::{Authenticated, Selected};
use crate::command::Command;
use crate::parser::UntaggedResponse;
use crate::types::{MailboxStatus, ResponseCode, Status};
use crate::Result;

impl<S> Client<S, Authenticated>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Opens a folder read-write.
    pub async fn select(self, mailbox: &str) -> Result<Client<S, Selected>> {
        self.open(mailbox, false).await
    }

    /// Opens a folder read-only.
    pub async fn examine(self, mailbox: &str) -> Result<Client<S, Selected>> {
        self.open(mailbox, true).await
    }

    async fn open(mut self, mailbox: &str, read_only: bool) -> Result<Client<S, Selected>> {
        let command = if read_only {
            Command::Examine {
                mailbox: mailbox.to_string(),
            }
        } else {
            Command::Select {
                mailbox: mailbox.to_string(),
            }
        };
        let untagged = self.run(&command).await?;
        let status = mailbox_status(untagged);
        tracing::debug!(
            mailbox,
            read_only,
            exists = status.exists,
            uid_validity = status.uid_validity.map(|v| v.get()),
            "folder opened"
        );
        Ok(self.transition(Selected::new(mailbox.to_string(), read_only, status)))
    }
}

/// Collects the data a SELECT/EXAMINE reports about the folder.
fn mailbox_status(untagged: Vec<UntaggedResponse>) -> MailboxStatus {
    let mut status = MailboxStatus::default();
    for response in untagged {
        match response {
            UntaggedResponse::Exists(n) => status.exists = n,
            UntaggedResponse::Recent(n) => status.recent = n,
            UntaggedResponse::Flags(flags) => status.flags = flags,
            UntaggedResponse::Condition {
                status: Status::Ok,
                code: Some(code),
                ..
            } => match code {
                ResponseCode::UidNext(uid) => status.uid_next = Some(uid),
                ResponseCode::UidValidity(v) => status.uid_validity = Some(v),
                ResponseCode::Unseen(seq) => status.unseen = Some(seq),
                ResponseCode::PermanentFlags(flags) => {
                    status.permanent_flags = flags.into_iter().collect();
                }
                ResponseCode::ReadOnly => status.read_only = true,
                _ => {}
            },
            _ => {}
        }
    }
    status
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::parser::{Response, ResponseParser};

    fn untagged(lines: &[&[u8]]) -> Vec<UntaggedResponse> {
        lines
            .iter()
            .map(|line| match ResponseParser::parse(line).unwrap() {
                Response::Untagged(u) => u,
                other => panic!("unexpected {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_mailbox_status_from_select_data() {
        let status = mailbox_status(untagged(&[
            b"* FLAGS (\\Answered \\Seen \\Deleted)\r\n",
            b"* 172 EXISTS\r\n",
            b"* 1 RECENT\r\n",
            b"* OK [UNSEEN 12] first unseen\r\n",
            b"* OK [UIDVALIDITY 3857529045] UIDs valid\r\n",
            b"* OK [UIDNEXT 4392] next UID\r\n",
            b"* OK [PERMANENTFLAGS (\\Deleted \\Seen \\*)] limited\r\n",
        ]));
        assert_eq!(status.exists, 172);
        assert_eq!(status.recent, 1);
        assert_eq!(status.unseen.map(|s| s.get()), Some(12));
        assert_eq!(status.uid_validity.map(|v| v.get()), Some(3_857_529_045));
        assert_eq!(status.uid_next.map(|u| u.get()), Some(4392));
        assert_eq!(status.flags.len(), 3);
        assert_eq!(status.permanent_flags.len(), 3);
        assert!(!status.read_only);
    }

    #[test]
    fn test_read_only_code() {
        let status = mailbox_status(untagged(&[b"* OK [READ-ONLY] examine\r\n"]));
        assert!(status.read_only);
    }
}
