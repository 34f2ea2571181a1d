//! Text utilities for the email archive: file names, dates and PDF-safe text.
//!
//! Every function here is pure. The current time is passed in rather than
//! read, so the date fallback is testable.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Format of the date prefix in generated file names.
pub const FILE_DATE_FORMAT: &str = "%Y-%m-%d_%H-%M";

/// Maximum length, in characters, of the subject part of a file name.
pub const MAX_SUBJECT_CHARS: usize = 50;

/// Stem used when a subject cleans down to nothing.
pub const NO_SUBJECT_STEM: &str = "no_subject";

/// Stand-in for a missing or empty subject, in file names and the index.
pub const MISSING_SUBJECT: &str = "No Subject";

static RE_UNSAFE_FILENAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").unwrap());
static RE_BR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^<]+?>").unwrap());
static RE_TRAILING_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\([^()]*\)\s*$").unwrap());
static RE_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z][a-zA-Z0-9]{1,31});").unwrap());

/// Turn a subject line into a safe file-name stem.
///
/// Accents are folded away (NFKD, combining marks dropped), anything that is
/// not a word character, whitespace or `-` is removed, whitespace becomes
/// `_`, and the result is cut to [`MAX_SUBJECT_CHARS`].
pub fn clean_filename(text: Option<&str>) -> String {
    let Some(text) = text.filter(|t| !t.is_empty()) else {
        return NO_SUBJECT_STEM.to_string();
    };

    let folded: String = text.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    let clean = RE_UNSAFE_FILENAME.replace_all(&folded, "");
    let stem: String = clean
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .take(MAX_SUBJECT_CHARS)
        .collect();

    if stem.is_empty() {
        NO_SUBJECT_STEM.to_string()
    } else {
        stem
    }
}

/// Parse an RFC 2822 `Date:` header value.
///
/// A trailing zone comment such as `(CEST)` is ignored.
pub fn parse_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let value = RE_TRAILING_COMMENT.replace(raw.trim(), "");
    DateTime::parse_from_rfc2822(&value).ok()
}

/// File-name date prefix for a message, in the message's own time zone.
///
/// Falls back to `now` when the message has no usable date.
pub fn format_date(date: Option<DateTime<FixedOffset>>, now: NaiveDateTime) -> String {
    match date {
        Some(date) => date.format(FILE_DATE_FORMAT).to_string(),
        None => now.format(FILE_DATE_FORMAT).to_string(),
    }
}

/// Prepare arbitrary header or body text for the PDF.
///
/// HTML entities are decoded, the text is NFKD-normalised, and typographic
/// quotes, dashes and the euro sign are replaced with plain equivalents.
pub fn sanitize_text(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };

    let decoded = decode_html_entities(text);
    let normalized: String = decoded.nfkd().collect();
    normalized
        .replace(['\u{2019}', '\u{2018}'], "'")
        .replace(['\u{201c}', '\u{201d}'], "\"")
        .replace('\u{2013}', "-")
        .replace('\u{2014}', "--")
        .replace('\u{20ac}', "EUR")
}

/// Naive HTML to text: `<br>` becomes a newline, every other tag is dropped.
pub fn strip_html(html: &str) -> String {
    let with_breaks = RE_BR.replace_all(html, "\n");
    RE_TAG.replace_all(&with_breaks, "").into_owned()
}

/// Decode numeric and common named HTML character references.
///
/// Unknown names are left untouched.
pub fn decode_html_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    RE_ENTITY
        .replace_all(text, |caps: &Captures| {
            let body = &caps[1];
            let decoded = if let Some(hex) = body
                .strip_prefix("#x")
                .or_else(|| body.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(body)
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "copy" => '\u{a9}',
        "reg" => '\u{ae}',
        "trade" => '\u{2122}',
        "euro" => '\u{20ac}',
        "pound" => '\u{a3}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201c}',
        "rdquo" => '\u{201d}',
        "hellip" => '\u{2026}',
        "bull" => '\u{2022}',
        _ => return None,
    };
    Some(c)
}

/// Reduce text to printable ASCII for the built-in PDF fonts.
///
/// Combining marks are dropped (so NFKD output keeps its base letters),
/// tabs become spaces, and anything else outside ASCII becomes `?`.
pub fn fold_to_ascii(text: &str) -> String {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| match c {
            '\t' => ' ',
            '\n' => '\n',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '?',
        })
        .collect()
}
