//! Recognizing phone backup files in a directory.
//!
//! # Example
//!
//! ```rust,no_run
//! use phonepack::source::BackupKind;
//!
//! for path in BackupKind::Contacts.scan_dir("backup".as_ref())? {
//!     println!("{}", path.display());
//! }
//! # Ok::<(), phonepack::PhonepackError>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Kind of backup file.
///
/// | Kind | Matches |
/// |------|---------|
/// | `Contacts` | `*.vcf` |
/// | `Calls` | `calls*.xml` |
/// | `Mms` | `sms*.xml` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupKind {
    /// vCard contact exports
    #[serde(alias = "vcf")]
    Contacts,

    /// Call log XML backups
    Calls,

    /// SMS/MMS XML backups
    #[serde(alias = "sms")]
    Mms,
}

impl BackupKind {
    /// Returns the file extension of this kind, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            BackupKind::Contacts => "vcf",
            BackupKind::Calls | BackupKind::Mms => "xml",
        }
    }

    fn name_prefix(&self) -> Option<&'static str> {
        match self {
            BackupKind::Contacts => None,
            BackupKind::Calls => Some("calls"),
            BackupKind::Mms => Some("sms"),
        }
    }

    /// Returns `true` if `path` looks like a backup of this kind.
    ///
    /// ```
    /// use phonepack::source::BackupKind;
    ///
    /// assert!(BackupKind::Contacts.matches("Contacts.VCF".as_ref()));
    /// assert!(BackupKind::Calls.matches("calls-20240101.xml".as_ref()));
    /// assert!(!BackupKind::Mms.matches("calls-20240101.xml".as_ref()));
    /// ```
    pub fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        let extension_ok = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(self.extension()));
        let prefix_ok = self
            .name_prefix()
            .is_none_or(|prefix| name.starts_with(prefix));
        extension_ok && prefix_ok
    }

    /// Lists matching files directly inside `dir`, sorted by path.
    pub fn scan_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && self.matches(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        tracing::debug!(kind = %self, dir = %dir.display(), found = paths.len(), "Scanned backup directory");
        Ok(paths)
    }

    /// Returns all names accepted by [`FromStr`](std::str::FromStr).
    pub fn all_names() -> &'static [&'static str] {
        &["contacts", "vcf", "calls", "mms", "sms"]
    }

    pub fn all() -> &'static [BackupKind] {
        &[BackupKind::Contacts, BackupKind::Calls, BackupKind::Mms]
    }
}

impl std::fmt::Display for BackupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackupKind::Contacts => write!(f, "Contacts"),
            BackupKind::Calls => write!(f, "Calls"),
            BackupKind::Mms => write!(f, "MMS"),
        }
    }
}

impl std::str::FromStr for BackupKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "contacts" | "vcf" => Ok(BackupKind::Contacts),
            "calls" => Ok(BackupKind::Calls),
            "mms" | "sms" => Ok(BackupKind::Mms),
            _ => Err(format!(
                "Unknown backup kind: '{}'. Expected one of: {}",
                s,
                BackupKind::all_names().join(", ")
            )),
        }
    }
}
