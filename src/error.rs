use thiserror::Error;

/// Everything that can go wrong during a purge run.
///
/// `Query` and `Fetch` are soft: the run either stops early or skips one
/// message, and the process still exits successfully. The rest are fatal.
#[derive(Debug, Error)]
pub enum PurgeError {
    #[error("failed to connect to {server}: {source}")]
    Connection {
        server: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TLS handshake with {server} failed: {source}")]
    Tls {
        server: String,
        #[source]
        source: async_native_tls::Error,
    },

    #[error("login failed for {username}: {source}")]
    Auth {
        username: String,
        #[source]
        source: async_imap::error::Error,
    },

    #[error("cannot select folder {folder}: {source}")]
    Folder {
        folder: String,
        #[source]
        source: async_imap::error::Error,
    },

    #[error("search `{query}` failed: {source}")]
    Query {
        query: String,
        #[source]
        source: async_imap::error::Error,
    },

    #[error("fetch of message {id} failed: {reason}")]
    Fetch { id: u32, reason: String },

    #[error("purge failed: {source}")]
    Purge {
        #[source]
        source: async_imap::error::Error,
    },

    #[error("logout failed: {source}")]
    Logout {
        #[source]
        source: async_imap::error::Error,
    },

    #[error("cannot write report: {0}")]
    Output(#[from] std::io::Error),
}

impl PurgeError {
    pub fn is_fatal(&self) -> bool {
        !matches!(self, PurgeError::Query { .. } | PurgeError::Fetch { .. })
    }

    /// Whether the failure came from the IMAP protocol layer rather than
    /// from the transport or the local console.
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            PurgeError::Auth { .. }
                | PurgeError::Folder { .. }
                | PurgeError::Query { .. }
                | PurgeError::Fetch { .. }
                | PurgeError::Purge { .. }
                | PurgeError::Logout { .. }
        )
    }
}
