use chrono::NaiveDate;
use std::io::Write;

use super::clock::{cutoff_date, Clock};
use super::report::Report;
use crate::config::{ConnectionParameters, SPAM_FOLDER};
use crate::email::provider::{MailConnector, MailSession, SearchQuery};
use crate::email::summary::MessageSummary;
use crate::error::PurgeError;

/// Outcome of a run that got all the way to the final count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeSummary {
    pub total: usize,
    /// Exactly the ids returned by the cutoff search, in search order
    pub purged_ids: Vec<u32>,
    pub remaining: usize,
}

/// Drives one purge of the spam folder:
/// select, count, search by cutoff, report, flag + expunge, count again.
pub struct PurgeRunner<C, K> {
    connector: C,
    params: ConnectionParameters,
    clock: K,
}

impl<C: MailConnector, K: Clock> PurgeRunner<C, K> {
    pub fn new(connector: C, params: ConnectionParameters, clock: K) -> Self {
        Self {
            connector,
            params,
            clock,
        }
    }

    /// Run the whole purge, writing the console report to `out`.
    ///
    /// Once login succeeded the session is logged out on every path.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<PurgeSummary, PurgeError> {
        let mut report = Report::new(out);
        report.started(self.clock.now())?;

        let mut session = self.connector.open(&self.params).await?;
        let outcome = self.process(&mut session, &mut report).await;

        if let Err(err) = session.logout().await {
            tracing::warn!("IMAP logout failed: {}", err);
        }

        outcome
    }

    async fn process<W: Write>(
        &self,
        session: &mut C::Session,
        report: &mut Report<'_, W>,
    ) -> Result<PurgeSummary, PurgeError> {
        report.connection(&self.params)?;

        self.select_folder(session).await?;

        let total = self.count_all(session, report).await?;
        report.total(total)?;

        let cutoff = cutoff_date(self.clock.now().date());
        let old_ids = self.find_older_than(session, cutoff, report).await?;
        report.older(old_ids.len())?;

        if !old_ids.is_empty() {
            report.table_header()?;
            for &id in &old_ids {
                match self.describe(session, id).await {
                    Ok(summary) => {
                        tracing::debug!("Reporting message {}", summary.id);
                        report.row(&summary)?
                    }
                    Err(err) => {
                        tracing::warn!("Skipping message {} in report: {}", id, err);
                        report.line(&format!("Error fetching message ID {}", id))?;
                    }
                }
            }
            report.table_end()?;

            report.purge_started(self.clock.now())?;
            self.purge(session, &old_ids).await?;
        }

        report.completed(self.clock.now())?;

        let remaining = self.count_all(session, report).await?;
        report.connection(&self.params)?;
        report.remaining(remaining)?;
        report.separator()?;

        Ok(PurgeSummary {
            total,
            purged_ids: old_ids,
            remaining,
        })
    }

    async fn select_folder(&self, session: &mut C::Session) -> Result<(), PurgeError> {
        session.select(SPAM_FOLDER).await
    }

    async fn count_all<W: Write>(
        &self,
        session: &mut C::Session,
        report: &mut Report<'_, W>,
    ) -> Result<usize, PurgeError> {
        match session.search(SearchQuery::All).await {
            Ok(ids) => Ok(ids.len()),
            Err(err) => {
                report.line("Error retrieving messages.")?;
                Err(err)
            }
        }
    }

    async fn find_older_than<W: Write>(
        &self,
        session: &mut C::Session,
        cutoff: NaiveDate,
        report: &mut Report<'_, W>,
    ) -> Result<Vec<u32>, PurgeError> {
        tracing::debug!("Searching {} for messages before {}", SPAM_FOLDER, cutoff);
        match session.search(SearchQuery::Before(cutoff)).await {
            Ok(ids) => Ok(ids),
            Err(err) => {
                report.line("Error searching for old messages.")?;
                Err(err)
            }
        }
    }

    async fn describe(
        &self,
        session: &mut C::Session,
        id: u32,
    ) -> Result<MessageSummary, PurgeError> {
        let raw = session.fetch_raw(id).await?;
        Ok(MessageSummary::from_raw(id, &raw))
    }

    async fn purge(&self, session: &mut C::Session, ids: &[u32]) -> Result<(), PurgeError> {
        session.mark_deleted(ids).await?;
        let removed = session.expunge().await?;
        tracing::info!(
            "Purged {} of {} flagged messages from {}",
            removed,
            ids.len(),
            SPAM_FOLDER
        );
        Ok(())
    }
}
