//! Configuration types for parsers and extractors.
//!
//! This module provides plain configuration structs for library usage,
//! without any CLI framework dependencies.
//!
//! - [`VcardConfig`] - contact file assembly and media handling
//! - [`MmsConfig`] - which MMS attachment kinds to extract
//! - [`CallLogConfig`] - call log CSV settings
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use phonepack::config::{DuplicatePolicy, VcardConfig};
//!
//! let config = VcardConfig::new()
//!     .with_duplicate_policy(DuplicatePolicy::FirstWins)
//!     .with_fetch_timeout(Some(Duration::from_secs(10)));
//!
//! assert!(!config.fail_fast);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What happens when a contact repeats a property tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// The later line overwrites the earlier one (default).
    #[default]
    LastWins,
    /// The first occurrence is kept, later ones are ignored.
    FirstWins,
}

/// Configuration for vCard assembly.
///
/// # Example
///
/// ```rust
/// use phonepack::config::VcardConfig;
///
/// let strict = VcardConfig::new()
///     .with_fail_fast(true)
///     .with_ignore_unsupported(false);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VcardConfig {
    /// Return the first line error instead of collecting it (default: false)
    pub fail_fast: bool,

    /// Resolution of repeated tags inside one contact (default: last wins)
    pub duplicate_policy: DuplicatePolicy,

    /// Skip `X-` and other unparsed properties silently (default: true)
    pub ignore_unsupported: bool,

    /// Download URL-referenced media (default: true)
    pub fetch_remote_media: bool,

    /// Timeout for a single media download (default: none)
    pub fetch_timeout: Option<Duration>,
}

impl Default for VcardConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            duplicate_policy: DuplicatePolicy::LastWins,
            ignore_unsupported: true,
            fetch_remote_media: true,
            fetch_timeout: None,
        }
    }
}

impl VcardConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects anything the parsers don't fully understand.
    pub fn strict() -> Self {
        Self {
            fail_fast: true,
            ignore_unsupported: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_fail_fast(mut self, enabled: bool) -> Self {
        self.fail_fast = enabled;
        self
    }

    #[must_use]
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Sets whether unsupported properties are skipped or reported as errors.
    #[must_use]
    pub fn with_ignore_unsupported(mut self, ignore: bool) -> Self {
        self.ignore_unsupported = ignore;
        self
    }

    #[must_use]
    pub fn with_fetch_remote_media(mut self, enabled: bool) -> Self {
        self.fetch_remote_media = enabled;
        self
    }

    /// Sets the per-request download timeout.
    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout = timeout;
        self
    }
}

/// Configuration for MMS attachment extraction.
///
/// Every kind is enabled by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MmsConfig {
    /// Extract `image/*` parts (default: true)
    pub images: bool,

    /// Extract `video/*` parts (default: true)
    pub videos: bool,

    /// Extract `audio/*` parts (default: true)
    pub audio: bool,

    /// Extract `application/pdf` parts (default: true)
    pub pdf: bool,

    /// Remove byte-identical and empty files afterwards (default: true)
    pub remove_duplicates: bool,
}

impl Default for MmsConfig {
    fn default() -> Self {
        Self {
            images: true,
            videos: true,
            audio: true,
            pdf: true,
            remove_duplicates: true,
        }
    }
}

impl MmsConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// A configuration with every kind disabled, to be enabled selectively.
    pub fn none() -> Self {
        Self {
            images: false,
            videos: false,
            audio: false,
            pdf: false,
            remove_duplicates: true,
        }
    }

    #[must_use]
    pub fn with_images(mut self, enabled: bool) -> Self {
        self.images = enabled;
        self
    }

    #[must_use]
    pub fn with_videos(mut self, enabled: bool) -> Self {
        self.videos = enabled;
        self
    }

    #[must_use]
    pub fn with_audio(mut self, enabled: bool) -> Self {
        self.audio = enabled;
        self
    }

    #[must_use]
    pub fn with_pdf(mut self, enabled: bool) -> Self {
        self.pdf = enabled;
        self
    }

    #[must_use]
    pub fn with_remove_duplicates(mut self, enabled: bool) -> Self {
        self.remove_duplicates = enabled;
        self
    }

    /// Returns `true` if at least one kind is enabled.
    pub fn any_enabled(&self) -> bool {
        self.images || self.videos || self.audio || self.pdf
    }
}

/// Configuration for call log CSV output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallLogConfig {
    /// Field delimiter (default: `,`)
    pub delimiter: u8,
}

impl Default for CallLogConfig {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CallLogConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the field delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}
