//! Writing contact multimedia (photos, logos, sounds, keys) to disk.
//!
//! The assembler hands every finished record that carries a multimedia
//! property to a [`MediaSink`]. [`ContactMediaWriter`] is the filesystem
//! implementation: inline payloads are base64-decoded, URL references go
//! through a [`MediaFetcher`].
//!
//! # Example
//!
//! ```rust,no_run
//! use phonepack::media::ContactMediaWriter;
//! use phonepack::vcard::VcardAssembler;
//!
//! let input = std::fs::read_to_string("contacts.vcf")?;
//! let mut writer = ContactMediaWriter::new("media");
//! let assembly = VcardAssembler::new().assemble_with(&input, &mut writer)?;
//! println!("{} media files written", assembly.media.written.len());
//! # Ok::<(), phonepack::PhonepackError>(())
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::Rng;

use crate::config::VcardConfig;
use crate::contact::{ContactRecord, MultimediaValue};
use crate::error::{PhonepackError, Result};

const RANDOM_NAME_LEN: usize = 10;
const ASCII_LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Receives finished contact records that hold multimedia properties.
pub trait MediaSink {
    /// Extracts the record's media. Failures are reported, never returned.
    fn accept(&mut self, record: &ContactRecord) -> MediaReport;
}

/// Downloads a URL-referenced asset into a file.
pub trait MediaFetcher {
    /// Streams `url` into `dest`, returning the number of bytes written.
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// Outcome of media extraction for one or more records.
#[derive(Debug, Default)]
pub struct MediaReport {
    /// Files created.
    pub written: Vec<PathBuf>,
    /// URL assets left alone because fetching is disabled.
    pub skipped: Vec<SkippedAsset>,
    /// Assets that could not be extracted.
    pub failures: Vec<MediaFailure>,
}

/// A URL asset that was not downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedAsset {
    pub contact: String,
    pub tag: String,
    pub url: String,
}

/// A single asset that could not be extracted.
#[derive(Debug)]
pub struct MediaFailure {
    pub contact: String,
    pub tag: String,
    pub error: PhonepackError,
}

impl MediaReport {
    /// Appends another report to this one.
    pub fn merge(&mut self, other: MediaReport) {
        self.written.extend(other.written);
        self.skipped.extend(other.skipped);
        self.failures.extend(other.failures);
    }

    /// Returns `true` if nothing was written, skipped or failed.
    pub fn is_empty(&self) -> bool {
        self.written.is_empty() && self.skipped.is_empty() && self.failures.is_empty()
    }
}

/// Blocking HTTP fetcher: one attempt, optional timeout.
#[cfg(feature = "fetch")]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "fetch")]
impl HttpFetcher {
    /// Creates a fetcher. `timeout` bounds the whole request.
    pub fn new(timeout: Option<std::time::Duration>) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| PhonepackError::retrieval("<client>", e.to_string()))?;
        Ok(Self { client })
    }
}

#[cfg(feature = "fetch")]
impl MediaFetcher for HttpFetcher {
    #[tracing::instrument(skip(self, dest))]
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64> {
        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| PhonepackError::retrieval(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PhonepackError::retrieval(url, status.to_string()));
        }

        let mut file = fs::File::create(dest)?;
        response
            .copy_to(&mut file)
            .map_err(|e| PhonepackError::retrieval(url, e.to_string()))
    }
}

/// Writes contact media into one output directory.
///
/// Files are named after the contact: `PHOTO` becomes `<name>.<ext>`, any
/// other tag `<name>_<TAG>.<ext>`. Existing files are never overwritten.
pub struct ContactMediaWriter {
    output_dir: PathBuf,
    fetcher: Option<Box<dyn MediaFetcher>>,
}

impl std::fmt::Debug for ContactMediaWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContactMediaWriter")
            .field("output_dir", &self.output_dir)
            .field("fetches", &self.fetcher.is_some())
            .finish()
    }
}

impl ContactMediaWriter {
    /// Creates a writer that decodes inline data only.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            fetcher: None,
        }
    }

    /// Creates a writer according to `config`.
    ///
    /// Without the `fetch` feature URL assets are always skipped.
    pub fn from_config(output_dir: impl Into<PathBuf>, config: &VcardConfig) -> Result<Self> {
        let writer = Self::new(output_dir);
        if !config.fetch_remote_media {
            return Ok(writer);
        }
        #[cfg(feature = "fetch")]
        let writer = writer.with_fetcher(HttpFetcher::new(config.fetch_timeout)?);
        Ok(writer)
    }

    /// Enables downloading of URL assets.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: impl MediaFetcher + 'static) -> Self {
        self.fetcher = Some(Box::new(fetcher));
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Extracts every multimedia property of `record`.
    pub fn write_record(&self, record: &ContactRecord) -> MediaReport {
        let mut report = MediaReport::default();
        let contact = record
            .display_name()
            .and_then(|name| sanitize_file_name(&name))
            .unwrap_or_else(random_name);

        for (tag, media) in record.multimedia() {
            match self.write_asset(&contact, tag, media) {
                Ok(Some(path)) => {
                    tracing::debug!(path = %path.display(), "Wrote contact media");
                    report.written.push(path);
                }
                Ok(None) => {
                    let url = media.tag_url.clone().unwrap_or_default();
                    tracing::debug!(%contact, %tag, %url, "Skipping remote media");
                    report.skipped.push(SkippedAsset {
                        contact: contact.clone(),
                        tag: tag.to_string(),
                        url,
                    });
                }
                Err(error) => {
                    tracing::warn!(%contact, %tag, %error, "Couldn't extract contact media");
                    report.failures.push(MediaFailure {
                        contact: contact.clone(),
                        tag: tag.to_string(),
                        error,
                    });
                }
            }
        }
        report
    }

    fn write_asset(
        &self,
        contact: &str,
        tag: &str,
        media: &MultimediaValue,
    ) -> Result<Option<PathBuf>> {
        let extension = media.extension().ok_or_else(|| {
            PhonepackError::media_format(tag, "neither a type nor a MIME type is given")
        })?;
        let file_name = if tag == "PHOTO" {
            format!("{contact}.{extension}")
        } else {
            format!("{contact}_{tag}.{extension}")
        };

        if let Some(data) = &media.tag_data {
            let bytes = STANDARD.decode(data)?;
            fs::create_dir_all(&self.output_dir)?;
            let path = unique_path(&self.output_dir.join(file_name));
            fs::write(&path, bytes)?;
            return Ok(Some(path));
        }

        let Some(url) = &media.tag_url else {
            return Err(PhonepackError::media_format(tag, "no inline data or URL"));
        };
        let Some(fetcher) = &self.fetcher else {
            return Ok(None);
        };

        fs::create_dir_all(&self.output_dir)?;
        let path = unique_path(&self.output_dir.join(file_name));
        match fetcher.fetch(url, &path) {
            Ok(_) => Ok(Some(path)),
            Err(e) => {
                // A failed download may leave a truncated file behind.
                match fs::remove_file(&path) {
                    Err(remove) if remove.kind() != io::ErrorKind::NotFound => {
                        tracing::warn!(path = %path.display(), error = %remove, "Couldn't remove partial download");
                    }
                    _ => {}
                }
                Err(e)
            }
        }
    }
}

impl MediaSink for ContactMediaWriter {
    fn accept(&mut self, record: &ContactRecord) -> MediaReport {
        self.write_record(record)
    }
}

/// Replaces characters that are unsafe in file names.
///
/// Returns `None` if nothing usable remains.
pub fn sanitize_file_name(name: &str) -> Option<String> {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim().trim_matches('.');
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

/// Random ASCII-letter name for contacts without `N` or `FN`.
pub fn random_name() -> String {
    let mut rng = rand::thread_rng();
    (0..RANDOM_NAME_LEN)
        .map(|_| char::from(ASCII_LETTERS[rng.gen_range(0..ASCII_LETTERS.len())]))
        .collect()
}

/// First free path among `path`, `stem-1.ext`, `stem-2.ext`, ...
pub(crate) fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (1..)
        .map(|n| path.with_file_name(format!("{stem}-{n}{extension}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}
