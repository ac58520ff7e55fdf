use async_imap::Session;
use async_native_tls::TlsStream;
use async_trait::async_trait;
use futures::TryStreamExt;
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};

use super::provider::{MailConnector, MailSession, SearchQuery};
use crate::config::{ConnectionParameters, STORE_BATCH_SIZE};
use crate::error::PurgeError;

type ImapStream = TlsStream<Compat<TcpStream>>;

/// Connects to IMAPS servers (implicit TLS).
#[derive(Debug, Default, Clone, Copy)]
pub struct ImapConnector;

impl ImapConnector {
    /// Open the TCP connection and complete the TLS handshake
    async fn connect(&self, server: &str, port: u16) -> Result<ImapStream, PurgeError> {
        tracing::info!("Connecting to IMAP {}:{}", server, port);

        let tcp = TcpStream::connect((server, port))
            .await
            .map_err(|source| PurgeError::Connection {
                server: server.to_string(),
                source,
            })?;

        let tls = async_native_tls::TlsConnector::new();
        let stream = tls
            .connect(server, tcp.compat())
            .await
            .map_err(|source| PurgeError::Tls {
                server: server.to_string(),
                source,
            })?;

        tracing::debug!("TLS session established with {}", server);
        Ok(stream)
    }

    async fn authenticate(
        &self,
        stream: ImapStream,
        username: &str,
        password: &str,
    ) -> Result<Session<ImapStream>, PurgeError> {
        let client = async_imap::Client::new(stream);

        let session = client
            .login(username, password)
            .await
            .map_err(|(source, _)| PurgeError::Auth {
                username: username.to_string(),
                source,
            })?;

        tracing::info!("IMAP login successful for {}", username);
        Ok(session)
    }
}

#[async_trait]
impl MailConnector for ImapConnector {
    type Session = ImapSession;

    async fn open(&self, params: &ConnectionParameters) -> Result<ImapSession, PurgeError> {
        let stream = self.connect(&params.server, params.port).await?;
        let session = self
            .authenticate(stream, &params.username, &params.password)
            .await?;
        Ok(ImapSession { session })
    }
}

/// Authenticated IMAP session addressing messages by UID.
pub struct ImapSession {
    session: Session<ImapStream>,
}

#[async_trait]
impl MailSession for ImapSession {
    async fn select(&mut self, folder: &str) -> Result<(), PurgeError> {
        let mailbox = self
            .session
            .select(folder)
            .await
            .map_err(|source| PurgeError::Folder {
                folder: folder.to_string(),
                source,
            })?;

        tracing::debug!("Selected {} ({} messages)", folder, mailbox.exists);
        Ok(())
    }

    async fn search(&mut self, query: SearchQuery) -> Result<Vec<u32>, PurgeError> {
        let query = query.to_string();
        let uids = self
            .session
            .uid_search(&query)
            .await
            .map_err(|source| PurgeError::Query {
                query: query.clone(),
                source,
            })?;

        let mut uids: Vec<u32> = uids.into_iter().collect();
        uids.sort_unstable();
        tracing::debug!("UID SEARCH {} matched {} messages", query, uids.len());
        Ok(uids)
    }

    async fn fetch_raw(&mut self, id: u32) -> Result<Vec<u8>, PurgeError> {
        let fetches: Vec<_> = self
            .session
            .uid_fetch(id.to_string(), "BODY[]")
            .await
            .map_err(|err| PurgeError::Fetch {
                id,
                reason: err.to_string(),
            })?
            .try_collect()
            .await
            .map_err(|err| PurgeError::Fetch {
                id,
                reason: err.to_string(),
            })?;

        fetches
            .iter()
            .find_map(|fetch| fetch.body().map(<[u8]>::to_vec))
            .ok_or_else(|| PurgeError::Fetch {
                id,
                reason: "no message body returned".to_string(),
            })
    }

    async fn mark_deleted(&mut self, ids: &[u32]) -> Result<(), PurgeError> {
        for batch in ids.chunks(STORE_BATCH_SIZE) {
            let set = uid_set(batch);
            let _: Vec<_> = self
                .session
                .uid_store(&set, "+FLAGS (\\Deleted)")
                .await
                .map_err(|source| PurgeError::Purge { source })?
                .try_collect()
                .await
                .map_err(|source| PurgeError::Purge { source })?;

            tracing::debug!("Flagged {} messages as deleted", batch.len());
        }
        Ok(())
    }

    async fn expunge(&mut self) -> Result<usize, PurgeError> {
        let expunged: Vec<u32> = self
            .session
            .expunge()
            .await
            .map_err(|source| PurgeError::Purge { source })?
            .try_collect()
            .await
            .map_err(|source| PurgeError::Purge { source })?;

        tracing::info!("Expunged {} messages", expunged.len());
        Ok(expunged.len())
    }

    async fn logout(&mut self) -> Result<(), PurgeError> {
        self.session
            .logout()
            .await
            .map_err(|source| PurgeError::Logout { source })
    }
}

/// Comma separated UID set, e.g. `3,7,12`
fn uid_set(ids: &[u32]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
