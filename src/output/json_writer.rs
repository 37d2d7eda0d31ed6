//! JSON output writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::contact::ContactRecord;
use crate::error::Result;

/// Writes contacts to a JSON file as a pretty-printed array.
///
/// # Format
/// ```json
/// [
///   {"FN": "Jane Doe", "TEL": {"CELL": "+1 555 0100"}},
///   {"N": {"family_name": "Roe", "given_name": "Max"}}
/// ]
/// ```
pub fn write_contacts_json(records: &[ContactRecord], output_path: impl AsRef<Path>) -> Result<()> {
    let json = to_contacts_json(records)?;
    let mut writer = BufWriter::new(File::create(output_path)?);
    writer.write_all(json.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Converts contacts to a JSON array string.
///
/// Same format as [`write_contacts_json`], but returns a `String`.
pub fn to_contacts_json(records: &[ContactRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}
