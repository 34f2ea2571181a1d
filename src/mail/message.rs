//! Reading `.eml` files into [`EmailRecord`]s.

use crate::error::MessageError;
use crate::mail::text::{parse_date, strip_html};
use chrono::{DateTime, FixedOffset};
use mail_parser::{Addr, Address, HeaderName, MessageParser, MimeHeaders};
use std::path::Path;

/// The parts of a message that end up in its PDF.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EmailRecord {
    pub subject: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    /// `Date:` header exactly as written, unfolded.
    pub date: Option<String>,
    pub timestamp: Option<DateTime<FixedOffset>>,
    /// Plain-text body; an HTML-only body is converted to text.
    pub body: Option<String>,
    pub attachments: Vec<String>,
}

/// Read and parse one `.eml` file.
pub fn read_message(path: &Path) -> Result<EmailRecord, MessageError> {
    let bytes = std::fs::read(path).map_err(|e| MessageError::Read {
        detail: e.to_string(),
    })?;
    parse_message(&bytes)
}

/// Parse raw RFC 5322 bytes.
pub fn parse_message(bytes: &[u8]) -> Result<EmailRecord, MessageError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(MessageError::Parse);
    }
    let message = MessageParser::default()
        .parse(bytes)
        .ok_or(MessageError::Parse)?;

    // Raw header text, unfolded; mail-parser's parsed date is the fallback.
    let date = message
        .header_raw(HeaderName::Date)
        .map(|raw| raw.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|raw| !raw.is_empty());
    let timestamp = date.as_deref().and_then(parse_date).or_else(|| {
        message
            .date()
            .and_then(|d| DateTime::parse_from_rfc3339(&d.to_rfc3339()).ok())
    });

    let body = message
        .body_text(0)
        .map(|t| t.into_owned())
        .or_else(|| message.body_html(0).map(|h| strip_html(&h)));

    let attachments = message
        .attachments()
        .filter_map(|part| part.attachment_name().map(str::to_string))
        .collect();

    Ok(EmailRecord {
        subject: message.subject().map(str::to_string),
        from: message.from().map(format_address).filter(|s| !s.is_empty()),
        to: message.to().map(format_address).filter(|s| !s.is_empty()),
        date,
        timestamp,
        body,
        attachments,
    })
}

/// Render an address header as `Name <addr>, …`.
pub fn format_address(address: &Address<'_>) -> String {
    let parts: Vec<String> = match address {
        Address::List(list) => list.iter().map(format_addr).collect(),
        Address::Group(groups) => groups
            .iter()
            .flat_map(|g| g.addresses.iter().map(format_addr))
            .collect(),
    };
    parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_addr(addr: &Addr<'_>) -> String {
    match (addr.name.as_deref(), addr.address.as_deref()) {
        (Some(name), Some(email)) => format!("{name} <{email}>"),
        (Some(name), None) => name.to_string(),
        (None, Some(email)) => email.to_string(),
        (None, None) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: &str = "From: Ada Lovelace <ada@example.com>\r\n\
To: Charles Babbage <charles@example.com>, team@example.com\r\n\
Subject: Notes on the Engine\r\n\
Date: Tue, 1 Jul 2003 10:52:37 +0200\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
\r\n\
Please find my notes below.\r\n";

    const HTML_WITH_ATTACHMENT: &str = "From: billing@shop.example\r\n\
Subject: =?utf-8?q?Your_receipt_=E2=80=93_order_42?=\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/mixed; boundary=\"XX\"\r\n\
\r\n\
--XX\r\n\
Content-Type: text/html; charset=utf-8\r\n\
\r\n\
<p>Thanks for your order.</p>\r\n\
--XX\r\n\
Content-Type: application/pdf; name=\"receipt.pdf\"\r\n\
Content-Disposition: attachment; filename=\"receipt.pdf\"\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
JVBERi0xLjQK\r\n\
--XX--\r\n";

    #[test]
    fn parses_plain_message() {
        let record = parse_message(PLAIN.as_bytes()).unwrap();
        assert_eq!(record.subject.as_deref(), Some("Notes on the Engine"));
        assert_eq!(record.from.as_deref(), Some("Ada Lovelace <ada@example.com>"));
        assert_eq!(
            record.to.as_deref(),
            Some("Charles Babbage <charles@example.com>, team@example.com")
        );
        assert!(record.body.unwrap().contains("Please find my notes"));
        assert!(record.attachments.is_empty());

        let ts = record.timestamp.expect("date should parse");
        assert_eq!(ts.format("%Y-%m-%d %H:%M").to_string(), "2003-07-01 10:52");
    }

    #[test]
    fn parses_html_body_and_attachment_names() {
        let record = parse_message(HTML_WITH_ATTACHMENT.as_bytes()).unwrap();
        assert_eq!(record.subject.as_deref(), Some("Your receipt \u{2013} order 42"));
        assert!(record.date.is_none());
        assert!(record.timestamp.is_none());

        let body = record.body.unwrap();
        assert!(body.contains("Thanks for your order."), "got: {body:?}");
        assert!(!body.contains("<p>"));
        assert_eq!(record.attachments, vec!["receipt.pdf"]);
    }

    #[test]
    fn keeps_raw_date_header() {
        let raw = PLAIN.replace(
            "Tue, 1 Jul 2003 10:52:37 +0200",
            "Tue, 1 Jul 2003 10:52:37 +0200 (CEST)",
        );
        let record = parse_message(raw.as_bytes()).unwrap();
        assert_eq!(record.date.as_deref(), Some("Tue, 1 Jul 2003 10:52:37 +0200 (CEST)"));
        let ts = record.timestamp.expect("date should parse");
        assert_eq!(ts.format("%Y-%m-%d %H:%M").to_string(), "2003-07-01 10:52");
    }

    #[test]
    fn parses_date_without_seconds_and_named_zone() {
        let raw = PLAIN.replace("Tue, 1 Jul 2003 10:52:37 +0200", "Tue, 01 Jul 2003 10:52 GMT");
        let record = parse_message(raw.as_bytes()).unwrap();
        assert_eq!(record.date.as_deref(), Some("Tue, 01 Jul 2003 10:52 GMT"));
        let ts = record.timestamp.expect("date should parse");
        assert_eq!(ts.format("%Y-%m-%d_%H-%M").to_string(), "2003-07-01_10-52");
    }

    #[test]
    fn empty_input_is_a_parse_error() {
        assert_eq!(parse_message(b"").unwrap_err(), MessageError::Parse);
    }
}
