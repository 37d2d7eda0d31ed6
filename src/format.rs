//! Output format for assembled contacts.
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "json-output")]
//! # fn main() -> phonepack::Result<()> {
//! use phonepack::format::{OutputFormat, to_contacts_string};
//! use phonepack::vcard::VcardAssembler;
//!
//! let assembly = VcardAssembler::new().assemble("BEGIN:VCARD\nFN:Ann\nEND:VCARD\n")?;
//!
//! let format = OutputFormat::from_path("contacts.jsonl")?;
//! assert_eq!(format, OutputFormat::Jsonl);
//! assert_eq!(to_contacts_string(&assembly.records, format)?, "{\"FN\":\"Ann\"}\n");
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "json-output"))]
//! # fn main() {}
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::contact::ContactRecord;
use crate::error::PhonepackError;

/// Output format for contact exports.
///
/// - [`Json`](OutputFormat::Json) - one pretty-printed array
/// - [`Jsonl`](OutputFormat::Jsonl) - one contact per line
///
/// ```rust
/// use phonepack::format::OutputFormat;
/// use std::str::FromStr;
///
/// let format = OutputFormat::from_str("ndjson").unwrap();
/// assert_eq!(format, OutputFormat::Jsonl);
/// assert_eq!(format.extension(), "jsonl");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum OutputFormat {
    /// JSON array of contacts
    #[default]
    Json,

    /// JSON Lines, also known as NDJSON
    Jsonl,
}

impl OutputFormat {
    /// Returns the file extension for this format (without dot).
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Jsonl => "jsonl",
        }
    }

    /// Returns all supported format names.
    pub fn all_names() -> &'static [&'static str] {
        &["json", "jsonl", "ndjson"]
    }

    pub fn all() -> &'static [OutputFormat] {
        &[OutputFormat::Json, OutputFormat::Jsonl]
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Json => "application/json",
            OutputFormat::Jsonl => "application/x-ndjson",
        }
    }

    /// Detects format from a file path based on extension.
    ///
    /// ```rust
    /// use phonepack::format::OutputFormat;
    ///
    /// assert_eq!(OutputFormat::from_path("out/contacts.JSON").unwrap(), OutputFormat::Json);
    /// assert!(OutputFormat::from_path("contacts.csv").is_err());
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PhonepackError> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
            _ => Err(PhonepackError::invalid_format(
                "output",
                format!("Unknown file extension: '.{ext}'. Expected one of: json, jsonl"),
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "JSON"),
            OutputFormat::Jsonl => write!(f, "JSONL"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
            _ => Err(format!(
                "Unknown format: '{}'. Expected one of: {}",
                s,
                OutputFormat::all_names().join(", ")
            )),
        }
    }
}

/// Writes contacts to a file in the given format.
///
/// # Errors
///
/// Returns an error if the `json-output` feature is disabled or the file
/// cannot be written.
#[allow(unused_variables)]
pub fn write_contacts(
    records: &[ContactRecord],
    path: impl AsRef<Path>,
    format: OutputFormat,
) -> Result<(), PhonepackError> {
    match format {
        #[cfg(feature = "json-output")]
        OutputFormat::Json => crate::output::write_contacts_json(records, path),
        #[cfg(feature = "json-output")]
        OutputFormat::Jsonl => crate::output::write_contacts_jsonl(records, path),
        #[allow(unreachable_patterns)]
        _ => Err(feature_disabled(format)),
    }
}

/// Converts contacts to a string in the given format.
#[allow(unused_variables)]
pub fn to_contacts_string(
    records: &[ContactRecord],
    format: OutputFormat,
) -> Result<String, PhonepackError> {
    match format {
        #[cfg(feature = "json-output")]
        OutputFormat::Json => crate::output::to_contacts_json(records),
        #[cfg(feature = "json-output")]
        OutputFormat::Jsonl => crate::output::to_contacts_jsonl(records),
        #[allow(unreachable_patterns)]
        _ => Err(feature_disabled(format)),
    }
}

#[allow(dead_code)]
fn feature_disabled(format: OutputFormat) -> PhonepackError {
    PhonepackError::invalid_format(
        "output",
        format!("Output format {format} requires the 'json-output' feature to be enabled"),
    )
}
