use chrono::NaiveDateTime;
use std::io::{self, Write};

use super::clock::timestamp;
use crate::config::{ConnectionParameters, RETENTION_DAYS, SPAM_FOLDER};
use crate::email::summary::MessageSummary;

/// Console report of a purge run. The layout is relied upon by existing
/// scripts, keep it byte for byte.
pub struct Report<'a, W: Write> {
    out: &'a mut W,
}

impl<'a, W: Write> Report<'a, W> {
    pub fn new(out: &'a mut W) -> Self {
        Self { out }
    }

    pub fn started(&mut self, at: NaiveDateTime) -> io::Result<()> {
        writeln!(self.out, "{}: Starting...", timestamp(at))
    }

    pub fn connection(&mut self, params: &ConnectionParameters) -> io::Result<()> {
        writeln!(self.out, "IMAP Server: {}", params.server)?;
        writeln!(self.out, "Username: {}", params.username)
    }

    pub fn total(&mut self, count: usize) -> io::Result<()> {
        writeln!(self.out, "Total messages in {}: {}", SPAM_FOLDER, count)
    }

    pub fn older(&mut self, count: usize) -> io::Result<()> {
        writeln!(
            self.out,
            "Messages older than {} days: {}",
            RETENTION_DAYS, count
        )
    }

    pub fn table_header(&mut self) -> io::Result<()> {
        writeln!(self.out, "\nSender\t\tSubject\t\tDate")?;
        writeln!(self.out, "---------------------------------------")
    }

    pub fn row(&mut self, summary: &MessageSummary) -> io::Result<()> {
        writeln!(self.out, "{}", summary.report_line())
    }

    pub fn table_end(&mut self) -> io::Result<()> {
        writeln!(self.out, "\n")
    }

    pub fn purge_started(&mut self, at: NaiveDateTime) -> io::Result<()> {
        writeln!(
            self.out,
            "{}: ...purging messages older than {} days",
            timestamp(at),
            RETENTION_DAYS
        )
    }

    pub fn completed(&mut self, at: NaiveDateTime) -> io::Result<()> {
        writeln!(self.out, "{}: ...Completed. Summary below:", timestamp(at))
    }

    pub fn remaining(&mut self, count: usize) -> io::Result<()> {
        writeln!(self.out, "Messages left in {}: {}", SPAM_FOLDER, count)
    }

    pub fn separator(&mut self) -> io::Result<()> {
        writeln!(self.out, "\n{}\n", "=".repeat(30))
    }

    /// Free-form line, used for soft error messages
    pub fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", text)
    }
}
