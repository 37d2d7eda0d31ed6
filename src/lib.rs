//! # Phonepack
//!
//! A Rust library for extracting data from phone backup exports.
//!
//! ## Overview
//!
//! Phonepack understands three kinds of backup file:
//! - **Contacts**: vCard (`.vcf`) exports, assembled into structured
//!   [`ContactRecord`]s with embedded photos, logos, sounds and keys extracted
//!   to files
//! - **Calls**: `calls*.xml` backups from SMS Backup & Restore, merged into one
//!   de-duplicated CSV call log
//! - **MMS**: `sms*.xml` backups, with image, video, audio and PDF attachments
//!   decoded to files
//!
//! ## Quick Start
//!
//! ```rust
//! use phonepack::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let input = "\
//! BEGIN:VCARD
//! VERSION:4.0
//! FN:Jane Doe
//! EMAIL;TYPE=work:jane@example.com
//! PHOTO;MEDIATYPE=image/png:http://example.com/jane.png
//! END:VCARD
//! ";
//!
//!     let assembly = VcardAssembler::new().assemble(input)?;
//!     let jane = &assembly.records[0];
//!
//!     assert_eq!(jane.text("FN"), Some("Jane Doe"));
//!     assert_eq!(jane.get("EMAIL"), Some(&PropertyValue::typed("work", "jane@example.com")));
//!     assert!(jane.has_multimedia());
//!     Ok(())
//! }
//! ```
//!
//! ## Directories of Backups
//!
//! ```rust,no_run
//! use phonepack::prelude::*;
//!
//! let report = process_vcard_dir("backup".as_ref(), &VcardConfig::new(), Some("media".as_ref()))?;
//! write_contacts(&report.records, "contacts.json", OutputFormat::Json)?;
//!
//! let calls = CallLog::from_dir("backup".as_ref())?;
//! write_call_log(&calls, "calls.csv", &CallLogConfig::default())?;
//!
//! extract_mms_media("backup".as_ref(), "attachments".as_ref(), &MmsConfig::default())?;
//! # Ok::<(), phonepack::PhonepackError>(())
//! ```
//!
//! ## Module Structure
//!
//! - [`vcard`]: vCard parsing
//!   - [`vcard::tokenizer`]: field splitting shared by every property parser
//!   - [`vcard::properties`]: one parser per property family
//!   - [`vcard::multimedia`]: the PHOTO / LOGO / SOUND / KEY grammar
//!   - [`vcard::assembler`]: [`VcardAssembler`], the record state machine
//! - [`contact`]: [`ContactRecord`], [`PropertyValue`]
//! - [`media`]: [`MediaSink`](media::MediaSink), [`ContactMediaWriter`](media::ContactMediaWriter)
//! - [`batch`]: [`process_vcard_dir`](batch::process_vcard_dir)
//! - [`backup`]: call log and MMS extraction
//! - [`source`]: [`BackupKind`](source::BackupKind), recognizing backup files
//! - [`config`]: [`VcardConfig`](config::VcardConfig), [`MmsConfig`](config::MmsConfig), [`CallLogConfig`](config::CallLogConfig)
//! - [`output`], [`format`]: JSON, JSONL and CSV writers
//! - [`cli`]: CLI argument types (feature `cli`)
//! - [`error`]: [`PhonepackError`], [`Result`]
//! - [`prelude`]: Convenient re-exports

pub mod backup;
pub mod batch;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod contact;
pub mod error;
pub mod format;
pub mod media;
pub mod output;
pub mod source;
pub mod vcard;

// Re-export the main types at the crate root for convenience
pub use contact::{ContactRecord, PropertyValue};
pub use error::{FieldError, PhonepackError, Result};
pub use vcard::VcardAssembler;

/// Convenient re-exports for common usage.
///
/// ```rust
/// use phonepack::prelude::*;
/// ```
pub mod prelude {
    // Records
    pub use crate::contact::{Components, ContactRecord, MultimediaValue, PropertyValue};

    // Error types
    pub use crate::error::{FieldError, PhonepackError, Result};

    // Configuration
    pub use crate::config::{CallLogConfig, DuplicatePolicy, MmsConfig, VcardConfig};

    // vCard parsing
    pub use crate::vcard::{Assembly, LineError, VcardAssembler, parse_vcard_line};

    // Media
    pub use crate::media::{ContactMediaWriter, MediaReport, MediaSink};

    // Directories
    pub use crate::batch::{BatchReport, process_vcard_dir};
    pub use crate::source::BackupKind;

    // Phone backups
    pub use crate::backup::{CallLog, MmsReport, extract_mms_media};

    // Output
    pub use crate::format::{OutputFormat, to_contacts_string, write_contacts};
    pub use crate::output::{to_call_log_csv, write_call_log};
}
