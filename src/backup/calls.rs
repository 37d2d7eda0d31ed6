//! Call log reconstruction.
//!
//! Each `<call>` element of a `calls*.xml` backup becomes a [`CallEntry`].
//! Calls are unique by their `date` attribute, since two calls cannot start
//! at the same millisecond; repeated backups of the same phone can therefore
//! be merged.
//!
//! # Example
//!
//! ```rust
//! use phonepack::backup::{CallLog, CallType};
//!
//! let xml = r#"<calls count="1">
//!   <call number="+15550100" duration="192" date="1700000000000" type="1"
//!         readable_date="Nov 14, 2023 10:13:20 PM" contact_name="Ann" />
//! </calls>"#;
//!
//! let mut log = CallLog::new();
//! log.read_str(xml)?;
//!
//! let call = &log.sorted_entries()[0];
//! assert_eq!(call.call_type, CallType::Incoming);
//! assert_eq!(call.duration_text(), "3 minutes, 12 seconds");
//! # Ok::<(), phonepack::PhonepackError>(())
//! ```

use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Serialize;

use crate::error::Result;
use crate::source::BackupKind;

use super::attribute;

/// Placeholder for durations of missed calls.
pub const NOT_APPLICABLE: &str = "N/A";

/// Android `CallLog.Calls.TYPE` values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CallType {
    Incoming,
    Outgoing,
    Missed,
    Voicemail,
    Rejected,
    Blocked,
    AnsweredExternally,
    /// Any other code, kept verbatim.
    Unknown(String),
}

impl CallType {
    /// Maps the numeric `type` attribute.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "1" => CallType::Incoming,
            "2" => CallType::Outgoing,
            "3" => CallType::Missed,
            "4" => CallType::Voicemail,
            "5" => CallType::Rejected,
            "6" => CallType::Blocked,
            "7" => CallType::AnsweredExternally,
            other => CallType::Unknown(other.to_string()),
        }
    }

    /// Returns `true` if the call never connected.
    pub fn is_missed(&self) -> bool {
        matches!(self, CallType::Missed)
    }
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallType::Incoming => write!(f, "Incoming"),
            CallType::Outgoing => write!(f, "Outgoing"),
            CallType::Missed => write!(f, "Missed"),
            CallType::Voicemail => write!(f, "Voicemail"),
            CallType::Rejected => write!(f, "Rejected"),
            CallType::Blocked => write!(f, "Blocked"),
            CallType::AnsweredExternally => write!(f, "Answered externally"),
            CallType::Unknown(code) => write!(f, "Unknown ({code})"),
        }
    }
}

/// One logged call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallEntry {
    /// Sequential number in encounter order.
    pub id: usize,
    /// Start time, milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub readable_date: String,
    pub call_type: CallType,
    pub contact_name: String,
    pub number: String,
    pub duration_secs: u64,
}

impl CallEntry {
    /// Raw duration column: seconds, or `N/A` for missed calls.
    pub fn duration_raw(&self) -> String {
        if self.call_type.is_missed() {
            NOT_APPLICABLE.to_string()
        } else {
            self.duration_secs.to_string()
        }
    }

    /// Human-readable duration column, or `N/A` for missed calls.
    pub fn duration_text(&self) -> String {
        if self.call_type.is_missed() {
            NOT_APPLICABLE.to_string()
        } else {
            human_readable_duration(self.duration_secs)
        }
    }
}

/// Pluralized hours, minutes and seconds: `192` -> `3 minutes, 12 seconds`.
///
/// Zero components are left out, except that a zero-length call reads
/// `0 seconds`.
///
/// ```
/// use phonepack::backup::human_readable_duration;
///
/// assert_eq!(human_readable_duration(0), "0 seconds");
/// assert_eq!(human_readable_duration(3601), "1 hour, 1 second");
/// ```
pub fn human_readable_duration(total_secs: u64) -> String {
    let (minutes, seconds) = (total_secs / 60, total_secs % 60);
    let (hours, minutes) = (minutes / 60, minutes % 60);

    let mut parts = Vec::new();
    for (amount, unit) in [(hours, "hour"), (minutes, "minute")] {
        if amount > 0 {
            parts.push(pluralize(amount, unit));
        }
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(pluralize(seconds, "second"));
    }
    parts.join(", ")
}

fn pluralize(amount: u64, unit: &str) -> String {
    if amount == 1 {
        format!("{amount} {unit}")
    } else {
        format!("{amount} {unit}s")
    }
}

/// Calls merged from one or more backups.
#[derive(Debug, Default)]
pub struct CallLog {
    entries: Vec<CallEntry>,
    seen_dates: HashSet<String>,
    duplicates: usize,
    invalid: usize,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads every `calls*.xml` file in `dir`, in path order.
    #[tracing::instrument(skip_all, fields(dir = %dir.display()))]
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut log = Self::new();
        for path in BackupKind::Calls.scan_dir(dir)? {
            let added = log.read_file(&path)?;
            tracing::debug!(path = %path.display(), added, total = log.len(), "Read call backup");
        }
        tracing::info!(
            calls = log.len(),
            duplicates = log.duplicates,
            invalid = log.invalid,
            "Built call log"
        );
        Ok(log)
    }

    /// Reads one backup file. Returns the number of new calls.
    pub fn read_file(&mut self, path: &Path) -> Result<usize> {
        let file = File::open(path)?;
        self.read_xml(BufReader::new(file))
    }

    /// Reads backup XML from a string. Returns the number of new calls.
    pub fn read_str(&mut self, xml: &str) -> Result<usize> {
        self.read_xml(xml.as_bytes())
    }

    /// Reads backup XML. Returns the number of new calls.
    pub fn read_xml<R: BufRead>(&mut self, input: R) -> Result<usize> {
        let mut reader = Reader::from_reader(input);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();
        let before = self.entries.len();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"call" => {
                    let date = attribute(&e, b"date").unwrap_or_default();
                    if self.seen_dates.contains(&date) {
                        self.duplicates += 1;
                    } else if let Ok(timestamp) = date.trim().parse::<i64>() {
                        self.entries.push(CallEntry {
                            id: self.entries.len(),
                            timestamp,
                            readable_date: attribute(&e, b"readable_date").unwrap_or_default(),
                            call_type: CallType::from_code(
                                &attribute(&e, b"type").unwrap_or_default(),
                            ),
                            contact_name: attribute(&e, b"contact_name").unwrap_or_default(),
                            number: attribute(&e, b"number").unwrap_or_default(),
                            duration_secs: attribute(&e, b"duration")
                                .and_then(|d| d.trim().parse().ok())
                                .unwrap_or_default(),
                        });
                        self.seen_dates.insert(date);
                    } else {
                        tracing::warn!(%date, "Skipping call with invalid date");
                        self.invalid += 1;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(self.entries.len() - before)
    }

    /// Calls in chronological order; ties keep encounter order.
    pub fn sorted_entries(&self) -> Vec<&CallEntry> {
        let mut entries: Vec<&CallEntry> = self.entries.iter().collect();
        entries.sort_by_key(|entry| entry.timestamp);
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of `<call>` elements dropped because their date was seen.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Number of `<call>` elements dropped for an unparsable date.
    pub fn invalid(&self) -> usize {
        self.invalid
    }
}
