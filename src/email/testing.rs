//! In-memory mailbox standing in for an IMAP server in tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use super::provider::{MailConnector, MailSession, SearchQuery};
use crate::config::ConnectionParameters;
use crate::error::PurgeError;

pub struct FakeMessage {
    pub uid: u32,
    pub date: NaiveDate,
    pub raw: Vec<u8>,
    pub deleted: bool,
}

impl FakeMessage {
    pub fn new(uid: u32, date: NaiveDate, from: &str, subject: &str) -> Self {
        let raw = format!(
            "From: {}\r\nSubject: {}\r\nDate: {}\r\n\r\nbody\r\n",
            from,
            subject,
            date.format("%a, %-d %b %Y 12:00:00 +0000")
        );
        Self {
            uid,
            date,
            raw: raw.into_bytes(),
            deleted: false,
        }
    }
}

#[derive(Default)]
pub struct FakeState {
    pub folders: Vec<String>,
    pub messages: Vec<FakeMessage>,
    pub refuse_connection: bool,
    pub reject_login: bool,
    pub fail_before_search: bool,
    /// Zero based index of the `ALL` search call that fails
    pub fail_all_search_call: Option<usize>,
    pub fail_fetch: HashSet<u32>,
    pub fail_store: bool,

    pub all_search_calls: usize,
    pub searches: Vec<SearchQuery>,
    pub flagged: Vec<u32>,
    pub expunge_calls: usize,
    pub logged_out: bool,
}

impl FakeState {
    pub fn with_spam_folder(messages: Vec<FakeMessage>) -> Self {
        Self {
            folders: vec!["INBOX".to_string(), "INBOX.spam".to_string()],
            messages,
            ..Default::default()
        }
    }
}

#[derive(Clone)]
pub struct FakeConnector {
    pub state: Arc<Mutex<FakeState>>,
}

impl FakeConnector {
    pub fn new(state: FakeState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }
}

fn refused(server: &str) -> PurgeError {
    PurgeError::Connection {
        server: server.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
    }
}

fn imap_no(text: &str) -> async_imap::error::Error {
    async_imap::error::Error::No(text.to_string())
}

#[async_trait]
impl MailConnector for FakeConnector {
    type Session = FakeSession;

    async fn open(&self, params: &ConnectionParameters) -> Result<FakeSession, PurgeError> {
        let state = self.state.lock().unwrap();
        if state.refuse_connection {
            return Err(refused(&params.server));
        }
        if state.reject_login {
            return Err(PurgeError::Auth {
                username: params.username.clone(),
                source: imap_no("[AUTHENTICATIONFAILED] Invalid credentials"),
            });
        }
        Ok(FakeSession {
            state: Arc::clone(&self.state),
            selected: None,
        })
    }
}

pub struct FakeSession {
    state: Arc<Mutex<FakeState>>,
    selected: Option<String>,
}

#[async_trait]
impl MailSession for FakeSession {
    async fn select(&mut self, folder: &str) -> Result<(), PurgeError> {
        let state = self.state.lock().unwrap();
        if !state.folders.iter().any(|f| f == folder) {
            return Err(PurgeError::Folder {
                folder: folder.to_string(),
                source: imap_no("Mailbox doesn't exist"),
            });
        }
        self.selected = Some(folder.to_string());
        Ok(())
    }

    async fn search(&mut self, query: SearchQuery) -> Result<Vec<u32>, PurgeError> {
        assert!(self.selected.is_some(), "search without a selected folder");
        let mut state = self.state.lock().unwrap();
        state.searches.push(query);

        let failed = match query {
            SearchQuery::All => {
                let call = state.all_search_calls;
                state.all_search_calls += 1;
                state.fail_all_search_call == Some(call)
            }
            SearchQuery::Before(_) => state.fail_before_search,
        };
        if failed {
            return Err(PurgeError::Query {
                query: query.to_string(),
                source: imap_no("SEARCH failed"),
            });
        }

        Ok(state
            .messages
            .iter()
            .filter(|m| match query {
                SearchQuery::All => true,
                SearchQuery::Before(cutoff) => m.date < cutoff,
            })
            .map(|m| m.uid)
            .collect())
    }

    async fn fetch_raw(&mut self, id: u32) -> Result<Vec<u8>, PurgeError> {
        let state = self.state.lock().unwrap();
        if state.fail_fetch.contains(&id) {
            return Err(PurgeError::Fetch {
                id,
                reason: "FETCH failed".to_string(),
            });
        }
        state
            .messages
            .iter()
            .find(|m| m.uid == id)
            .map(|m| m.raw.clone())
            .ok_or_else(|| PurgeError::Fetch {
                id,
                reason: "no such message".to_string(),
            })
    }

    async fn mark_deleted(&mut self, ids: &[u32]) -> Result<(), PurgeError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_store {
            return Err(PurgeError::Purge {
                source: imap_no("STORE failed"),
            });
        }
        for message in state.messages.iter_mut() {
            if ids.contains(&message.uid) {
                message.deleted = true;
            }
        }
        state.flagged.extend_from_slice(ids);
        Ok(())
    }

    async fn expunge(&mut self) -> Result<usize, PurgeError> {
        let mut state = self.state.lock().unwrap();
        state.expunge_calls += 1;
        let before = state.messages.len();
        state.messages.retain(|m| !m.deleted);
        Ok(before - state.messages.len())
    }

    async fn logout(&mut self) -> Result<(), PurgeError> {
        self.state.lock().unwrap().logged_out = true;
        Ok(())
    }
}
