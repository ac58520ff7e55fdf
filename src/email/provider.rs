use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt;

use crate::config::ConnectionParameters;
use crate::error::PurgeError;

/// Search predicates the purge needs from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchQuery {
    All,
    /// Messages whose date is strictly before the given day.
    /// The server compares dates only, never time of day.
    Before(NaiveDate),
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchQuery::All => write!(f, "ALL"),
            SearchQuery::Before(date) => write!(f, "BEFORE {}", date.format("%d-%b-%Y")),
        }
    }
}

/// Opens authenticated sessions.
/// Connect and login failures are reported as distinct error kinds.
#[async_trait]
pub trait MailConnector: Send + Sync {
    type Session: MailSession;

    async fn open(&self, params: &ConnectionParameters) -> Result<Self::Session, PurgeError>;
}

/// Operations an authenticated session offers to the purge.
/// Message ids are server-assigned UIDs.
#[async_trait]
pub trait MailSession: Send {
    async fn select(&mut self, folder: &str) -> Result<(), PurgeError>;

    /// Run a search and return matching ids in ascending order.
    async fn search(&mut self, query: SearchQuery) -> Result<Vec<u32>, PurgeError>;

    /// Fetch the full RFC 822 message.
    async fn fetch_raw(&mut self, id: u32) -> Result<Vec<u8>, PurgeError>;

    /// Add the `\Deleted` flag to every id.
    async fn mark_deleted(&mut self, ids: &[u32]) -> Result<(), PurgeError>;

    /// Permanently remove flagged messages, returning how many went away.
    async fn expunge(&mut self) -> Result<usize, PurgeError>;

    async fn logout(&mut self) -> Result<(), PurgeError>;
}
