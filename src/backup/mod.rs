//! Android "SMS Backup & Restore" style XML backups.
//!
//! - [`calls`] - call log reconstruction from `calls*.xml`
//! - [`mms`] - attachment extraction from `sms*.xml`

pub mod calls;
pub mod mms;

use quick_xml::escape::unescape;
use quick_xml::events::BytesStart;

pub use calls::{CallEntry, CallLog, CallType, human_readable_duration};
pub use mms::{MmsReport, extract_mms_media};

/// Unescaped value of attribute `key`, if present.
pub(crate) fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| {
            let raw = String::from_utf8_lossy(&attr.value).into_owned();
            unescape(&raw).map(|value| value.into_owned()).unwrap_or(raw)
        })
}
