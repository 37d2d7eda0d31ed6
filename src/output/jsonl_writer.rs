//! JSON Lines (JSONL) output writer.
//!
//! One contact per line, convenient for streaming into other tools.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::contact::ContactRecord;
use crate::error::Result;

/// Writes contacts to a JSONL file.
///
/// Each line is a valid JSON object:
/// ```jsonl
/// {"FN":"Jane Doe","TEL":{"CELL":"+1 555 0100"}}
/// {"N":{"family_name":"Roe","given_name":"Max"}}
/// ```
pub fn write_contacts_jsonl(
    records: &[ContactRecord],
    output_path: impl AsRef<Path>,
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(output_path)?);
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Converts contacts to a JSONL string.
pub fn to_contacts_jsonl(records: &[ContactRecord]) -> Result<String> {
    let mut output = String::new();
    for record in records {
        output.push_str(&serde_json::to_string(record)?);
        output.push('\n');
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::{MultimediaValue, PropertyValue};
    use std::io::{BufRead, BufReader};
    use tempfile::NamedTempFile;

    fn sample() -> Vec<ContactRecord> {
        let mut a = ContactRecord::new();
        a.insert("FN", PropertyValue::Text("Ann".into()));
        a.insert(
            "PHOTO",
            PropertyValue::Media(MultimediaValue {
                tag_type: Some("JPEG".into()),
                tag_url: Some("http://x/p.jpg".into()),
                ..MultimediaValue::default()
            }),
        );
        let mut b = ContactRecord::new();
        b.insert("FN", PropertyValue::Text("Bob".into()));
        vec![a, b]
    }

    #[test]
    fn test_write_contacts_jsonl() {
        let temp_file = NamedTempFile::new().unwrap();
        write_contacts_jsonl(&sample(), temp_file.path()).unwrap();

        let file = std::fs::File::open(temp_file.path()).unwrap();
        let lines: Vec<String> = BufReader::new(file).lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(first["PHOTO"]["tag_type"], "JPEG");
        assert!(first["PHOTO"].get("tag_data").is_none());
    }

    #[test]
    fn test_to_contacts_jsonl() {
        let jsonl = to_contacts_jsonl(&sample()).unwrap();
        assert_eq!(jsonl.lines().count(), 2);
        assert!(jsonl.ends_with("{\"FN\":\"Bob\"}\n"));
        assert_eq!(to_contacts_jsonl(&[]).unwrap(), "");
    }
}
