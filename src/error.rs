//! Unified error types for phonepack.
//!
//! This module provides a single [`PhonepackError`] enum that covers all error
//! cases in the library, and a smaller [`FieldError`] enum for grammar failures
//! on a single vCard property line.
//!
//! # Error Handling Philosophy
//!
//! - **Structural** problems (`BEGIN`/`END` nesting) abort the file being parsed
//! - **Field** problems are attributed to a line and collected, so one bad
//!   property does not hide the rest of the contact
//! - **Retrieval** problems are reported per media asset
//!
//! The caller decides whether to abort a single file or the whole run.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// A specialized [`Result`] type for phonepack operations.
///
/// # Example
///
/// ```rust
/// use phonepack::error::Result;
/// use phonepack::ContactRecord;
///
/// fn my_function() -> Result<Vec<ContactRecord>> {
///     // ... operations that may fail
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, PhonepackError>;

/// The error type for all phonepack operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PhonepackError {
    /// An I/O error occurred.
    ///
    /// This typically happens when:
    /// - The input file or directory doesn't exist
    /// - Permission denied
    /// - Disk is full (when writing output or media)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The `BEGIN:VCARD` / `END:VCARD` structure of a file is broken.
    ///
    /// Fatal to the file being parsed.
    #[error("{kind} (line {line}){}", display_path(path.as_deref()))]
    Structural {
        /// What went wrong
        kind: StructuralKind,
        /// 1-based line number where the problem was detected
        line: usize,
        /// The file path, if available
        path: Option<PathBuf>,
    },

    /// A property line does not match any known grammar.
    ///
    /// Only returned directly in fail-fast mode; otherwise collected as a
    /// [`LineError`](crate::vcard::LineError).
    #[error("line {line}: {source}{}", display_path(path.as_deref()))]
    Field {
        /// 1-based line number of the property
        line: usize,
        /// The underlying grammar failure
        #[source]
        source: FieldError,
        /// The file path, if available
        path: Option<PathBuf>,
    },

    /// A recognized property that has no parser.
    #[error("line {line}: unsupported property {tag}")]
    Unsupported {
        /// The property tag name
        tag: String,
        /// 1-based line number of the property
        line: usize,
    },

    /// Downloading a URL-referenced media asset failed.
    #[error("Couldn't download media from '{url}': {reason}")]
    Retrieval {
        /// The URL that was requested
        url: String,
        /// Status or transport failure description
        reason: String,
    },

    /// The file type of a multimedia property could not be determined.
    #[error("Couldn't determine media format of {tag}: {message}")]
    MediaFormat {
        /// The multimedia tag (PHOTO, LOGO, SOUND, KEY)
        tag: String,
        /// Description of what's wrong
        message: String,
    },

    /// Inline base64 payload could not be decoded.
    #[error("Base64 decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    /// XML reading error (SMS / call backups).
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// CSV writing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[cfg(feature = "json-output")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The output directory is unusable.
    #[error("Invalid output directory {}: {reason}", path.display())]
    InvalidOutputDir {
        /// The directory that was rejected
        path: PathBuf,
        /// Why it was rejected
        reason: &'static str,
    },

    /// The input doesn't match the expected structure.
    #[error("Invalid {format} format: {message}")]
    InvalidFormat {
        /// The format that was expected
        format: &'static str,
        /// Description of what's wrong
        message: String,
    },
}

fn display_path(path: Option<&Path>) -> String {
    path.map(|p| format!(" (file: {})", p.display()))
        .unwrap_or_default()
}

/// Kinds of structural errors in a vCard file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralKind {
    /// `BEGIN:VCARD` while a record is still open (missing `END:VCARD`).
    NestedBegin,
    /// `END:VCARD` without a preceding `BEGIN:VCARD`.
    UnmatchedEnd,
    /// End of input reached inside a record.
    UnterminatedRecord,
}

impl fmt::Display for StructuralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructuralKind::NestedBegin => write!(f, "BEGIN:VCARD inside an open record (missing END:VCARD)"),
            StructuralKind::UnmatchedEnd => write!(f, "END:VCARD without matching BEGIN:VCARD"),
            StructuralKind::UnterminatedRecord => write!(f, "end of input inside an open record"),
        }
    }
}

/// Grammar failures on a single vCard property line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// The line has no `:` between property head and value.
    #[error("missing ':' separator in '{line}'")]
    MissingSeparator {
        /// The offending line
        line: String,
    },

    /// Positional sub-fields don't match the expected arity.
    #[error("Contents of line don't match: {found} subfields found, but {expected} are required")]
    SubfieldCount {
        /// Number of named sub-fields
        expected: usize,
        /// Number of values found
        found: usize,
    },

    /// A known property whose line has the wrong shape.
    #[error("malformed {tag} property '{line}'")]
    Malformed {
        /// The property tag name
        tag: &'static str,
        /// The offending line
        line: String,
    },

    /// No parser is registered for this tag.
    #[error("unrecognized property '{tag}'")]
    UnknownProperty {
        /// The property tag name
        tag: String,
    },

    /// None of the multimedia grammar cases matched.
    #[error("Can't parse multimedia tag '{line}'")]
    Multimedia {
        /// The offending line
        line: String,
    },

    /// Recognized but not implemented; callers may ignore it.
    #[error("property {tag} is recognized but not supported")]
    Unsupported {
        /// The property tag name
        tag: String,
    },
}

impl FieldError {
    pub(crate) fn malformed(tag: &'static str, line: &str) -> Self {
        FieldError::Malformed {
            tag,
            line: line.to_string(),
        }
    }

    /// Returns `true` for the explicitly ignorable unsupported-tag case.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, FieldError::Unsupported { .. })
    }
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl PhonepackError {
    /// Creates a structural error without file attribution.
    pub fn structural(kind: StructuralKind, line: usize) -> Self {
        PhonepackError::Structural {
            kind,
            line,
            path: None,
        }
    }

    /// Creates a field error without file attribution.
    pub fn field(line: usize, source: FieldError) -> Self {
        PhonepackError::Field {
            line,
            source,
            path: None,
        }
    }

    /// Creates a retrieval error.
    pub fn retrieval(url: impl Into<String>, reason: impl Into<String>) -> Self {
        PhonepackError::Retrieval {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a media format error.
    pub fn media_format(tag: impl Into<String>, message: impl Into<String>) -> Self {
        PhonepackError::MediaFormat {
            tag: tag.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid format error.
    pub fn invalid_format(format: &'static str, message: impl Into<String>) -> Self {
        PhonepackError::InvalidFormat {
            format,
            message: message.into(),
        }
    }

    /// Attaches a file path to structural and field errors.
    ///
    /// Other variants are returned unchanged.
    #[must_use]
    pub fn with_path(self, file: &Path) -> Self {
        match self {
            PhonepackError::Structural { kind, line, .. } => PhonepackError::Structural {
                kind,
                line,
                path: Some(file.to_path_buf()),
            },
            PhonepackError::Field { line, source, .. } => PhonepackError::Field {
                line,
                source,
                path: Some(file.to_path_buf()),
            },
            other => other,
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, PhonepackError::Io(_))
    }

    /// Returns `true` if this is a structural error.
    pub fn is_structural(&self) -> bool {
        matches!(self, PhonepackError::Structural { .. })
    }

    /// Returns `true` if this is a field format error.
    pub fn is_field(&self) -> bool {
        matches!(self, PhonepackError::Field { .. })
    }

    /// Returns `true` if this is a media retrieval error.
    pub fn is_retrieval(&self) -> bool {
        matches!(self, PhonepackError::Retrieval { .. })
    }

    /// Returns the structural error kind, if this is one.
    pub fn structural_kind(&self) -> Option<StructuralKind> {
        match self {
            PhonepackError::Structural { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
