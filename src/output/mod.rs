//! Output writers.
//!
//! - [`write_contacts_json`] / [`to_contacts_json`] - JSON array of contacts - requires `json-output` feature
//! - [`write_contacts_jsonl`] / [`to_contacts_jsonl`] - one contact per line - requires `json-output` feature
//! - [`write_call_log`] / [`to_call_log_csv`] - call log CSV
//!
//! A [`ContactRecord`](crate::contact::ContactRecord) serializes as a JSON
//! object whose keys are property tags, in the order they were first seen.
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "json-output")]
//! # fn main() -> phonepack::Result<()> {
//! use phonepack::output::to_contacts_jsonl;
//! use phonepack::vcard::VcardAssembler;
//!
//! let assembly = VcardAssembler::new().assemble("BEGIN:VCARD\nFN:Ann\nEND:VCARD\n")?;
//! assert_eq!(to_contacts_jsonl(&assembly.records)?, "{\"FN\":\"Ann\"}\n");
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "json-output"))]
//! # fn main() {}
//! ```

mod csv_writer;
#[cfg(feature = "json-output")]
mod json_writer;
#[cfg(feature = "json-output")]
mod jsonl_writer;

pub use csv_writer::{CALL_LOG_HEADER, to_call_log_csv, write_call_log, write_call_log_to};
#[cfg(feature = "json-output")]
pub use json_writer::{to_contacts_json, write_contacts_json};
#[cfg(feature = "json-output")]
pub use jsonl_writer::{to_contacts_jsonl, write_contacts_jsonl};
