//! Tests for the JSON, JSONL and CSV writers.

use std::fs;

use phonepack::backup::CallLog;
use phonepack::output::{CALL_LOG_HEADER, to_call_log_csv, write_call_log};
use phonepack::prelude::*;
use tempfile::TempDir;

const CONTACTS: &str = "\
BEGIN:VCARD
VERSION:3.0
FN:Ann Lee
N:Lee;Ann;;;
TEL;TYPE=HOME:+1 555 0100
CATEGORIES:b,a
PHOTO;TYPE=JPEG;VALUE=URI:http://x.example/ann.jpg
END:VCARD
BEGIN:VCARD
FN:Bob \"The Builder\"
ORG:Acme
END:VCARD
";

const CALLS: &str = r#"<calls>
  <call number="+15550100" duration="3601" date="1700000000000" type="2" readable_date="Nov 14, 2023" contact_name="Ann &quot;Al&quot; Lee" />
  <call number="+15550101" duration="12" date="1699999999999" type="7" readable_date="Nov 14, 2023" contact_name="" />
</calls>"#;

fn records() -> Vec<ContactRecord> {
    VcardAssembler::new().assemble(CONTACTS).unwrap().records
}

fn call_log() -> CallLog {
    let mut log = CallLog::new();
    log.read_str(CALLS).unwrap();
    log
}

// =============================================================================
// Contacts
// =============================================================================

#[cfg(feature = "json-output")]
mod contacts {
    use super::*;
    use phonepack::output::{to_contacts_json, to_contacts_jsonl, write_contacts_jsonl};

    #[test]
    fn test_json_preserves_shapes() {
        let json = to_contacts_json(&records()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        let ann = &parsed[0];
        assert_eq!(ann["VERSION"], "3.0");
        assert_eq!(ann["N"], serde_json::json!({"family_name": "Lee", "given_name": "Ann"}));
        assert_eq!(ann["TEL"], serde_json::json!({"HOME": "+1 555 0100"}));
        assert_eq!(ann["CATEGORIES"], serde_json::json!(["a", "b"]));
        assert_eq!(
            ann["PHOTO"],
            serde_json::json!({"tag_type": "JPEG", "tag_url": "http://x.example/ann.jpg"})
        );

        let bob = &parsed[1];
        assert_eq!(bob["FN"], "Bob \"The Builder\"");
        assert_eq!(bob["ORG"], "Acme");
    }

    #[test]
    fn test_json_key_order_follows_input() {
        let json = to_contacts_jsonl(&records()).unwrap();
        let first = json.lines().next().unwrap();
        let keys = ["VERSION", "FN", "N", "TEL", "CATEGORIES", "PHOTO"];
        let positions: Vec<usize> = keys
            .iter()
            .map(|k| first.find(&format!("\"{k}\"")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_jsonl_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("contacts.jsonl");
        write_contacts_jsonl(&records(), &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(value.is_object());
        }
    }

    #[test]
    fn test_write_contacts_by_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("contacts.ndjson");
        let format = OutputFormat::from_path(&path).unwrap();
        write_contacts(&records(), &path, format).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 2);
    }
}

// =============================================================================
// Call log
// =============================================================================

#[test]
fn test_call_log_csv_round_trip_through_reader() {
    let text = to_call_log_csv(&call_log(), &CallLogConfig::default()).unwrap();
    let mut reader = csv::Reader::from_reader(text.as_bytes());

    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.iter().collect::<Vec<_>>(), CALL_LOG_HEADER.to_vec());

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);

    // Earlier call first, even though it was listed second.
    assert_eq!(&rows[0][0], "1699999999999");
    assert_eq!(&rows[0][2], "Answered externally");
    assert_eq!(&rows[0][3], "");
    assert_eq!(&rows[0][6], "12 seconds");
    assert_eq!(&rows[0][7], "1");

    assert_eq!(&rows[1][3], "Ann \"Al\" Lee");
    assert_eq!(&rows[1][5], "3601");
    assert_eq!(&rows[1][6], "1 hour, 1 second");
}

#[test]
fn test_call_log_semicolon_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("calls.csv");
    write_call_log(&call_log(), &path, &CallLogConfig::new().with_delimiter(b';')).unwrap();

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .from_path(&path)
        .unwrap();
    assert_eq!(reader.records().count(), 2);
}

#[test]
fn test_call_log_to_missing_dir_is_io_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("calls.csv");
    let err = write_call_log(&call_log(), &path, &CallLogConfig::default()).unwrap_err();
    assert!(err.is_io());
}
