//! Commands the client sends and their wire encoding.

mod search;
mod serialize;
mod tag_generator;
mod types;

use crate::types::UidSet;

pub use search::{SearchCriteria, SearchKey, format_search_date};
pub use serialize::astring;
pub use tag_generator::TagGenerator;
pub use types::{FetchAttribute, StoreAction};

use serialize::{is_quotable, write_astring, write_fetch_attributes, write_store_action};

/// A client command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `LOGIN user password`
    Login {
        /// User name.
        username: String,
        /// Password.
        password: String,
    },
    /// `SELECT folder`
    Select {
        /// Folder name.
        mailbox: String,
    },
    /// `EXAMINE folder` (read-only select)
    Examine {
        /// Folder name.
        mailbox: String,
    },
    /// `UID SEARCH ...`
    UidSearch {
        /// Compiled search tokens; sent as `ALL` when empty.
        criteria: Vec<String>,
    },
    /// `UID FETCH set (items)`
    UidFetch {
        /// Messages to fetch.
        uids: UidSet,
        /// Data items to return.
        items: Vec<FetchAttribute>,
    },
    /// `UID STORE set [+-]FLAGS[.SILENT] (flags)`
    UidStore {
        /// Messages to change.
        uids: UidSet,
        /// Flag change.
        action: StoreAction,
        /// Suppress the untagged FETCH echo.
        silent: bool,
    },
    /// `CLOSE`: expunges `\Deleted` messages and deselects.
    Close,
    /// `NOOP`
    Noop,
    /// `LOGOUT`
    Logout,
}

impl Command {
    /// Short name for logs; never includes credentials.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Login { .. } => "LOGIN",
            Self::Select { .. } => "SELECT",
            Self::Examine { .. } => "EXAMINE",
            Self::UidSearch { .. } => "UID SEARCH",
            Self::UidFetch { .. } => "UID FETCH",
            Self::UidStore { .. } => "UID STORE",
            Self::Close => "CLOSE",
            Self::Noop => "NOOP",
            Self::Logout => "LOGOUT",
        }
    }

    /// Checks that every argument fits on one command line.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when a name, password, folder or search token
    /// contains CR, LF or NUL.
    pub fn validate(&self) -> crate::Result<()> {
        let invalid = |reason| crate::Error::InvalidArgument {
            command: self.name(),
            reason,
        };
        match self {
            Self::Login { username, password } => {
                if !is_quotable(username) {
                    return Err(invalid("user name contains a line break"));
                }
                if !is_quotable(password) {
                    return Err(invalid("password contains a line break"));
                }
            }
            Self::Select { mailbox } | Self::Examine { mailbox } if !is_quotable(mailbox) => {
                return Err(invalid("folder name contains a line break"));
            }
            Self::UidSearch { criteria } if !criteria.iter().map(String::as_str).all(is_quotable) => {
                return Err(invalid("search token contains a line break"));
            }
            _ => {}
        }
        Ok(())
    }

    /// Encodes the command line, CRLF included. Call [`Command::validate`]
    /// first; arguments with line breaks are written as they are.
    #[must_use]
    pub fn serialize(&self, tag: &str) -> Vec<u8> {
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(tag.as_bytes());
        buf.push(b' ');
        buf.extend_from_slice(self.name().as_bytes());

        match self {
            Self::Login { username, password } => {
                buf.push(b' ');
                write_astring(&mut buf, username);
                buf.push(b' ');
                write_astring(&mut buf, password);
            }
            Self::Select { mailbox } | Self::Examine { mailbox } => {
                buf.push(b' ');
                write_astring(&mut buf, mailbox);
            }
            Self::UidSearch { criteria } => {
                if criteria.is_empty() {
                    buf.extend_from_slice(b" ALL");
                }
                for token in criteria {
                    buf.push(b' ');
                    buf.extend_from_slice(token.as_bytes());
                }
            }
            Self::UidFetch { uids, items } => {
                buf.push(b' ');
                buf.extend_from_slice(uids.to_string().as_bytes());
                buf.push(b' ');
                write_fetch_attributes(&mut buf, items);
            }
            Self::UidStore {
                uids,
                action,
                silent,
            } => {
                buf.push(b' ');
                buf.extend_from_slice(uids.to_string().as_bytes());
                buf.push(b' ');
                write_store_action(&mut buf, action, *silent);
            }
            Self::Close | Self::Noop | Self::Logout => {}
        }

        buf.extend_from_slice(b"\r\n");
        buf
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Flag, Uid};

    fn wire(command: &Command) -> String {
        String::from_utf8(command.serialize("A0001")).unwrap()
    }

    #[test]
    fn test_login_quotes_password() {
        let command = Command::Login {
            username: "ops@example.com".to_string(),
            password: "p@ss word".to_string(),
        };
        assert_eq!(wire(&command), "A0001 LOGIN ops@example.com \"p@ss word\"\r\n");
    }

    #[test]
    fn test_login_name_hides_credentials() {
        let command = Command::Login {
            username: "u".to_string(),
            password: "secret".to_string(),
        };
        assert!(!command.name().contains("secret"));
    }

    #[test]
    fn test_select_and_examine() {
        assert_eq!(
            wire(&Command::Select {
                mailbox: "INBOX".to_string()
            }),
            "A0001 SELECT INBOX\r\n"
        );
        assert_eq!(
            wire(&Command::Examine {
                mailbox: "Sent Items".to_string()
            }),
            "A0001 EXAMINE \"Sent Items\"\r\n"
        );
    }

    #[test]
    fn test_search_from_compiled_criteria() {
        let criteria = SearchCriteria::unseen()
            .with("SUBJECT", "daily report")
            .with("X-UNKNOWN", "dropped")
            .compile();
        assert_eq!(
            wire(&Command::UidSearch { criteria }),
            "A0001 UID SEARCH UNSEEN SUBJECT \"daily report\"\r\n"
        );
    }

    #[test]
    fn test_search_line_breaks_stay_off_the_wire() {
        let criteria = SearchCriteria::new()
            .with("SUBJECT", "x\r\nA9999 DELETE INBOX")
            .with("FROM", "boss@example.com")
            .with_keyword("UNSEEN\r\nA9998 LOGOUT")
            .compile();
        let line = wire(&Command::UidSearch { criteria });
        assert_eq!(line, "A0001 UID SEARCH FROM boss@example.com\r\n");
        assert_eq!(line.find("\r\n"), Some(line.len() - 2));
    }

    #[test]
    fn test_validate_rejects_line_breaks() {
        let login = Command::Login {
            username: "ops".to_string(),
            password: "pw\r\nA1 LOGOUT".to_string(),
        };
        assert!(matches!(
            login.validate(),
            Err(crate::Error::InvalidArgument { command: "LOGIN", .. })
        ));
        let select = Command::Select {
            mailbox: "INBOX\n".to_string(),
        };
        assert!(select.validate().is_err());
        let search = Command::UidSearch {
            criteria: vec!["ALL\r\nA2 CLOSE".to_string()],
        };
        assert!(search.validate().is_err());
        assert!(Command::Close.validate().is_ok());
        assert!(
            Command::Select {
                mailbox: "Sent Items".to_string()
            }
            .validate()
            .is_ok()
        );
    }

    #[test]
    fn test_empty_search_sends_all() {
        assert_eq!(
            wire(&Command::UidSearch { criteria: vec![] }),
            "A0001 UID SEARCH ALL\r\n"
        );
    }

    #[test]
    fn test_uid_fetch_full_message() {
        let uids: Vec<Uid> = [4, 5, 6, 9].into_iter().filter_map(Uid::new).collect();
        let command = Command::UidFetch {
            uids: UidSet::from_uids(&uids).unwrap(),
            items: FetchAttribute::FULL_MESSAGE.to_vec(),
        };
        assert_eq!(
            wire(&command),
            "A0001 UID FETCH 4:6,9 (INTERNALDATE BODY[] UID RFC822.HEADER)\r\n"
        );
    }

    #[test]
    fn test_uid_store() {
        let command = Command::UidStore {
            uids: UidSet::single(Uid::new(42).unwrap()),
            action: StoreAction::set(Flag::Deleted, true),
            silent: false,
        };
        assert_eq!(wire(&command), "A0001 UID STORE 42 +FLAGS (\\Deleted)\r\n");
    }

    #[test]
    fn test_bare_commands() {
        assert_eq!(wire(&Command::Close), "A0001 CLOSE\r\n");
        assert_eq!(wire(&Command::Logout), "A0001 LOGOUT\r\n");
        assert_eq!(wire(&Command::Noop), "A0001 NOOP\r\n");
    }
}
