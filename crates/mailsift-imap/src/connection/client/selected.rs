//! Commands on an open folder.

use tokio::io::{AsyncRead, AsyncWrite};

use super::Client;
use super::states::{Authenticated, Selected};
use crate::Result;
use crate::command::{Command, FetchAttribute, SearchCriteria, StoreAction};
use crate::parser::{FetchedMessage, UntaggedResponse};
use crate::types::{Uid, UidSet};

impl<S> Client<S, Selected>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Name of the open folder.
    #[must_use]
    pub fn mailbox(&self) -> &str {
        self.state.mailbox()
    }

    /// Runs `UID SEARCH` with the compiled criteria and returns the UIDs in
    /// the order the server listed them.
    pub async fn uid_search(&mut self, criteria: &SearchCriteria) -> Result<Vec<Uid>> {
        let command = Command::UidSearch {
            criteria: criteria.compile(),
        };
        let untagged = self.run(&command).await?;
        let uids = untagged
            .into_iter()
            .filter_map(|response| match response {
                UntaggedResponse::Search(ids) => Some(ids),
                _ => None,
            })
            .flatten()
            .filter_map(Uid::new)
            .collect();
        Ok(uids)
    }

    /// Runs `UID FETCH` and returns one record per FETCH response, in
    /// arrival order. Unsolicited FETCH data (flag updates and the like)
    /// is included; callers filter on the fields they need.
    pub async fn uid_fetch(
        &mut self,
        uids: &UidSet,
        items: &[FetchAttribute],
    ) -> Result<Vec<FetchedMessage>> {
        let command = Command::UidFetch {
            uids: uids.clone(),
            items: items.to_vec(),
        };
        let untagged = self.run(&command).await?;
        Ok(untagged
            .into_iter()
            .filter_map(|response| match response {
                UntaggedResponse::Fetch { seq, items } => {
                    Some(FetchedMessage::from_items(seq, items))
                }
                _ => None,
            })
            .collect())
    }

    /// Runs `UID STORE`.
    pub async fn uid_store(&mut self, uids: &UidSet, action: StoreAction) -> Result<()> {
        let command = Command::UidStore {
            uids: uids.clone(),
            action,
            silent: false,
        };
        self.run(&command).await.map(drop)
    }

    /// Sends CLOSE, which expunges `\Deleted` messages in a read-write
    /// folder, and returns to the authenticated state.
    pub async fn close(mut self) -> Result<Client<S, Authenticated>> {
        self.run(&Command::Close).await?;
        Ok(self.transition(Authenticated))
    }

    /// Teardown: CLOSE, then LOGOUT even if CLOSE failed. Returns the first
    /// error.
    pub async fn close_and_logout(mut self) -> Result<()> {
        let closed = self.run(&Command::Close).await.map(drop);
        let logged_out = self.logout().await;
        closed.and(logged_out)
    }
}
