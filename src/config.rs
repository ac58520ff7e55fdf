use clap::Parser;
use std::fmt;

/// Folder that gets purged on every run
pub const SPAM_FOLDER: &str = "INBOX.spam";

/// Messages dated before `today - RETENTION_DAYS` are purged
pub const RETENTION_DAYS: u64 = 30;

pub const DEFAULT_IMAPS_PORT: u16 = 993;

/// Upper bound of UIDs sent in a single STORE command
pub const STORE_BATCH_SIZE: usize = 500;

/// Connection parameters, taken from the command line only.
#[derive(Clone, Parser)]
#[command(
    author,
    version,
    about = "Purge messages older than 30 days from INBOX.spam."
)]
pub struct ConnectionParameters {
    /// IMAP server address
    #[arg(long)]
    pub server: String,

    /// IMAP username
    #[arg(long)]
    pub username: String,

    /// IMAP password
    #[arg(long)]
    pub password: String,

    /// IMAPS port (implicit TLS)
    #[arg(long, default_value_t = DEFAULT_IMAPS_PORT)]
    pub port: u16,
}

impl fmt::Debug for ConnectionParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParameters")
            .field("server", &self.server)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("port", &self.port)
            .finish()
    }
}
