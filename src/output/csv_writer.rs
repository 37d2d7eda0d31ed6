//! CSV output writer for call logs.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::backup::CallLog;
use crate::config::CallLogConfig;
use crate::error::{PhonepackError, Result};

/// Column names, in output order.
pub const CALL_LOG_HEADER: [&str; 8] = [
    "Call Date (timestamp)",
    "Call date",
    "Call type",
    "Caller name",
    "Caller #",
    "Call duration (s)",
    "Call duration",
    "Call Id #",
];

/// Writes the call log to a CSV file, oldest call first.
///
/// An empty log produces only the header row.
pub fn write_call_log(
    log: &CallLog,
    output_path: impl AsRef<Path>,
    config: &CallLogConfig,
) -> Result<()> {
    let file = File::create(output_path)?;
    write_call_log_to(log, file, config)
}

/// Writes the call log as CSV into any writer.
pub fn write_call_log_to<W: Write>(log: &CallLog, output: W, config: &CallLogConfig) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(config.delimiter)
        .from_writer(output);

    writer.write_record(CALL_LOG_HEADER)?;
    for call in log.sorted_entries() {
        writer.write_record([
            call.timestamp.to_string(),
            call.readable_date.clone(),
            call.call_type.to_string(),
            call.contact_name.clone(),
            call.number.clone(),
            call.duration_raw(),
            call.duration_text(),
            call.id.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Converts the call log to a CSV string.
pub fn to_call_log_csv(log: &CallLog, config: &CallLogConfig) -> Result<String> {
    let mut buffer = Vec::new();
    write_call_log_to(log, &mut buffer, config)?;
    String::from_utf8(buffer).map_err(|e| PhonepackError::invalid_format("CSV", e.to_string()))
}
