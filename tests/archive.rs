//! Integration tests for the email archive converter.

use docbatch::{convert_archive, ArchiveConfig, ArchiveError};
use std::path::Path;
use tempfile::TempDir;

fn write_eml(dir: &Path, name: &str, subject: &str, date: Option<&str>, body: &str) {
    let mut raw = format!(
        "From: Ada Lovelace <ada@example.com>\r\nTo: team@example.com\r\nSubject: {subject}\r\n"
    );
    if let Some(d) = date {
        raw.push_str(&format!("Date: {d}\r\n"));
    }
    raw.push_str("Content-Type: text/plain; charset=utf-8\r\n\r\n");
    raw.push_str(body);
    raw.push_str("\r\n");
    std::fs::write(dir.join(name), raw).unwrap();
}

fn pdf_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".pdf"))
        .collect();
    names.sort();
    names
}

#[test]
fn converts_messages_and_writes_index() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_eml(
        input.path(),
        "one.eml",
        "Café: Q3 report!",
        Some("Tue, 1 Jul 2003 10:52:37 +0200"),
        "Numbers attached.",
    );
    write_eml(
        input.path(),
        "two.EML",
        "Lunch",
        Some("Mon, 2 Jun 2025 12:15:00 +0000"),
        "Noon?",
    );
    std::fs::write(input.path().join("notes.txt"), "ignored").unwrap();

    let stats = convert_archive(input.path(), output.path(), &ArchiveConfig::default()).unwrap();

    assert_eq!(stats.total_messages, 2);
    assert_eq!(stats.converted, 2);
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.index_path, Some(output.path().join("index.pdf")));
    assert_eq!(
        pdf_names(output.path()),
        [
            "2003-07-01_10-52_Cafe_Q3_report.pdf",
            "2025-06-02_12-15_Lunch.pdf",
            "index.pdf",
        ]
    );

    let index = std::fs::read(output.path().join("index.pdf")).unwrap();
    assert!(index.starts_with(b"%PDF"));
}

#[test]
fn duplicate_names_get_suffixes() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let date = Some("Sun, 1 Jun 2025 09:30:00 +0000");
    write_eml(input.path(), "a.eml", "Receipt", date, "first");
    write_eml(input.path(), "b.eml", "Receipt", date, "second");

    convert_archive(input.path(), output.path(), &ArchiveConfig::default()).unwrap();

    assert_eq!(
        pdf_names(output.path()),
        [
            "2025-06-01_09-30_Receipt.pdf",
            "2025-06-01_09-30_Receipt_2.pdf",
            "index.pdf",
        ]
    );
}

#[test]
fn unreadable_message_is_skipped() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_eml(input.path(), "good.eml", "Fine", None, "ok");
    std::fs::write(input.path().join("empty.eml"), b"").unwrap();

    let stats = convert_archive(input.path(), output.path(), &ArchiveConfig::default()).unwrap();

    assert_eq!(stats.total_messages, 2);
    assert_eq!(stats.converted, 1);
    assert_eq!(stats.failed, 1);
    assert!(stats.index_path.is_some());
}

#[test]
fn no_messages_is_not_an_error() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let target = output.path().join("nested/out");

    let stats = convert_archive(input.path(), &target, &ArchiveConfig::default()).unwrap();

    assert_eq!(stats.total_messages, 0);
    assert!(stats.index_path.is_none());
    assert!(target.is_dir());
    assert!(pdf_names(&target).is_empty());
}

#[test]
fn missing_input_is_fatal() {
    let output = TempDir::new().unwrap();
    let err = convert_archive(
        output.path().join("nope"),
        output.path(),
        &ArchiveConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ArchiveError::InputNotFound { .. }));
}

#[test]
fn output_under_a_file_is_fatal() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let file = output.path().join("occupied");
    std::fs::write(&file, "x").unwrap();

    let err = convert_archive(input.path(), file.join("sub"), &ArchiveConfig::default())
        .unwrap_err();
    assert!(matches!(err, ArchiveError::OutputDirFailed { .. }));
}
