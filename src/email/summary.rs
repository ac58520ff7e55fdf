use mailparse::{MailHeader, MailHeaderMap};

/// Display fields of one message scheduled for deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSummary {
    pub id: u32,
    pub sender: String,
    pub subject: String,
    pub date: String,
}

impl MessageSummary {
    /// Build a summary from a raw RFC 822 message.
    ///
    /// `From` and `Subject` are decoded from RFC 2047 encoded words. A
    /// missing header yields an empty string and a header mailparse cannot
    /// make sense of yields its raw text. `Date` is kept verbatim.
    pub fn from_raw(id: u32, raw: &[u8]) -> Self {
        let headers = match mailparse::parse_headers(raw) {
            Ok((headers, _)) => headers,
            Err(err) => {
                tracing::warn!("Unparseable headers in message {}: {}", id, err);
                Vec::new()
            }
        };

        Self {
            id,
            sender: decoded_header(&headers, "From"),
            subject: decoded_header(&headers, "Subject"),
            date: raw_header(&headers, "Date"),
        }
    }

    /// One tab separated report line
    pub fn report_line(&self) -> String {
        format!("{}\t{}\t{}", self.sender, self.subject, self.date)
    }
}

fn decoded_header(headers: &[MailHeader<'_>], name: &str) -> String {
    match headers.get_first_header(name) {
        Some(header) => {
            let value = header.get_value();
            if value.is_empty() {
                raw_text(header)
            } else {
                value.trim().to_string()
            }
        }
        None => String::new(),
    }
}

fn raw_header(headers: &[MailHeader<'_>], name: &str) -> String {
    headers
        .get_first_header(name)
        .map(raw_text)
        .unwrap_or_default()
}

fn raw_text(header: &MailHeader<'_>) -> String {
    String::from_utf8_lossy(header.get_value_raw())
        .trim()
        .to_string()
}
