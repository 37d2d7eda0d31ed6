//! MMS attachment extraction.
//!
//! `sms*.xml` backups store every MMS part inline as base64. Parts are
//! written into an empty output directory as
//! `<YYYYmmdd-HHMMSS>_<sender digits>_<content location>`, with the time in
//! UTC. Afterwards byte-identical and empty files are removed.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use sha2::{Digest, Sha256};

use crate::config::MmsConfig;
use crate::error::{PhonepackError, Result};
use crate::media::{random_name, unique_path};
use crate::source::BackupKind;

use super::attribute;

/// Longest output path, in bytes, before file names get shortened.
pub const MAX_FULLPATH_LENGTH: usize = 252;
const SHORT_BASE_CHARS: usize = 50;
const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

const IMAGE_SUBTYPES: &[&str] = &[
    "avif", "bmp", "gif", "heic", "heif", "jpeg", "pjpeg", "png", "tiff", "webp", "x-icon", "*",
];
const VIDEO_SUBTYPES: &[&str] = &[
    "3gpp", "avi", "mp4", "mpeg", "ogg", "quicktime", "webm", "x-ms-wmv", "x-flv",
];
const AUDIO_SUBTYPES: &[&str] = &["3gpp", "amr", "flac", "mp4", "mpeg", "ogg", "webm", "wav"];
const APPLICATION_SUBTYPES: &[&str] = &["pdf"];

/// Summary of an extraction run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MmsReport {
    /// Attachments decoded and written.
    pub files_written: usize,
    /// Duplicate or empty files removed afterwards.
    pub duplicates_removed: usize,
    /// Attachments that could not be decoded or written.
    pub failed: usize,
}

impl MmsReport {
    /// Files left in the output directory.
    pub fn files_kept(&self) -> usize {
        self.files_written.saturating_sub(self.duplicates_removed)
    }
}

/// Returns the subtype of `content_type` if `config` wants this kind.
///
/// ```
/// use phonepack::backup::mms::wanted_subtype;
/// use phonepack::config::MmsConfig;
///
/// let images_only = MmsConfig::none().with_images(true);
/// assert_eq!(wanted_subtype("image/JPEG", &images_only).as_deref(), Some("jpeg"));
/// assert_eq!(wanted_subtype("video/mp4", &images_only), None);
/// assert_eq!(wanted_subtype("text/plain", &MmsConfig::default()), None);
/// ```
pub fn wanted_subtype(content_type: &str, config: &MmsConfig) -> Option<String> {
    let content_type = content_type.to_ascii_lowercase();
    let (kind, subtype) = content_type.split_once('/')?;
    let (enabled, allowed) = match kind {
        "image" => (config.images, IMAGE_SUBTYPES),
        "video" => (config.videos, VIDEO_SUBTYPES),
        "audio" => (config.audio, AUDIO_SUBTYPES),
        "application" => (config.pdf, APPLICATION_SUBTYPES),
        _ => return None,
    };
    (enabled && allowed.contains(&subtype)).then(|| subtype.to_string())
}

/// Builds the file name of one attachment.
///
/// A missing or `null` content location is replaced by a random name; the
/// subtype is appended when the name has no extension.
pub fn attachment_file_name(
    date_ms: &str,
    address: &str,
    content_location: Option<&str>,
    subtype: &str,
) -> String {
    let timestamp = date_ms
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map_or_else(
            || "00000000-000000".to_string(),
            |time| time.format(TIMESTAMP_FORMAT).to_string(),
        );
    let digits: String = address.chars().filter(char::is_ascii_digit).collect();

    let location = match content_location {
        Some(cl) if !cl.is_empty() && cl != "null" => cl.replace(['/', '\\'], "_"),
        _ => format!("{}.{subtype}", random_name()),
    };

    let mut name = format!("{timestamp}_{digits}_{location}");
    if !location.contains('.') {
        name.push('.');
        name.push_str(subtype);
    }
    name
}

/// Shortens `file_name` when the full path would exceed
/// [`MAX_FULLPATH_LENGTH`] bytes.
///
/// Long names become `<first 50 chars>_<hash>.<ext>`, or just
/// `<hash>.<ext>` if that is still too long.
pub fn safe_file_name(dir: &Path, file_name: &str) -> String {
    if path_len(dir, file_name) <= MAX_FULLPATH_LENGTH {
        return file_name.to_string();
    }

    let (base, extension) = match file_name.rfind('.') {
        Some(dot) if dot > 0 => file_name.split_at(dot),
        _ => (file_name, ""),
    };
    let hash: String = Sha256::digest(base.as_bytes())
        .iter()
        .take(4)
        .map(|byte| format!("{byte:02x}"))
        .collect();
    let short_base: String = base.chars().take(SHORT_BASE_CHARS).collect();

    let shortened = format!("{short_base}_{hash}{extension}");
    if path_len(dir, &shortened) <= MAX_FULLPATH_LENGTH {
        shortened
    } else {
        format!("{hash}{extension}")
    }
}

fn path_len(dir: &Path, file_name: &str) -> usize {
    dir.join(file_name).as_os_str().len()
}

/// Creates `dir` if absent; otherwise it must be an empty directory.
pub fn prepare_output_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        return Ok(());
    }
    if !dir.is_dir() {
        return Err(PhonepackError::InvalidOutputDir {
            path: dir.to_path_buf(),
            reason: "not a directory",
        });
    }
    if fs::read_dir(dir)?.next().is_some() {
        return Err(PhonepackError::InvalidOutputDir {
            path: dir.to_path_buf(),
            reason: "directory is not empty",
        });
    }
    Ok(())
}

/// Removes empty files and files whose content was already seen.
///
/// Files are visited in name order, so the first of a set of duplicates is
/// kept. A subdirectory is an error.
pub fn remove_duplicate_files(dir: &Path) -> Result<usize> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            return Err(PhonepackError::InvalidOutputDir {
                path: dir.to_path_buf(),
                reason: "contains a subdirectory",
            });
        }
        paths.push(path);
    }
    paths.sort();

    let mut seen = HashSet::new();
    let mut removed = 0;
    for path in paths {
        let bytes = fs::read(&path)?;
        let digest = Sha256::digest(&bytes).to_vec();
        if bytes.is_empty() || !seen.insert(digest) {
            fs::remove_file(&path)?;
            tracing::trace!(path = %path.display(), "Removed duplicate attachment");
            removed += 1;
        }
    }
    Ok(removed)
}

/// Extracts attachments from every `sms*.xml` file in `input_dir`.
///
/// # Example
///
/// ```rust,no_run
/// use phonepack::backup::extract_mms_media;
/// use phonepack::config::MmsConfig;
///
/// let report = extract_mms_media("backup".as_ref(), "media".as_ref(), &MmsConfig::default())?;
/// println!("{} attachments kept", report.files_kept());
/// # Ok::<(), phonepack::PhonepackError>(())
/// ```
#[tracing::instrument(skip_all, fields(input = %input_dir.display(), output = %output_dir.display()))]
pub fn extract_mms_media(
    input_dir: &Path,
    output_dir: &Path,
    config: &MmsConfig,
) -> Result<MmsReport> {
    prepare_output_dir(output_dir)?;

    let mut report = MmsReport::default();
    for path in BackupKind::Mms.scan_dir(input_dir)? {
        tracing::debug!(path = %path.display(), "Reading message backup");
        let file = File::open(&path)?;
        extract_from_xml(BufReader::new(file), output_dir, config, &mut report)?;
    }

    if config.remove_duplicates {
        report.duplicates_removed = remove_duplicate_files(output_dir)?;
    }

    tracing::info!(
        written = report.files_written,
        duplicates = report.duplicates_removed,
        failed = report.failed,
        "Extracted MMS attachments"
    );
    Ok(report)
}

/// Extracts attachments from one backup into an existing directory.
pub fn extract_from_xml<R: BufRead>(
    input: R,
    output_dir: &Path,
    config: &MmsConfig,
    report: &mut MmsReport,
) -> Result<()> {
    let mut reader = Reader::from_reader(input);
    let mut buf = Vec::new();
    // (date, address) of the enclosing <mms>
    let mut message: Option<(String, String)> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"mms" => {
                message = Some((
                    attribute(&e, b"date").unwrap_or_default(),
                    attribute(&e, b"address").unwrap_or_default(),
                ));
            }
            Event::End(e) if e.name().as_ref() == b"mms" => message = None,
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"part" => {
                // Parts outside an <mms> have no sender or date.
                if let Some((date, address)) = &message {
                    extract_part(&e, date, address, output_dir, config, report);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(())
}

fn extract_part(
    part: &BytesStart<'_>,
    date: &str,
    address: &str,
    output_dir: &Path,
    config: &MmsConfig,
    report: &mut MmsReport,
) {
    let content_type = attribute(part, b"ct").unwrap_or_default();
    let Some(subtype) = wanted_subtype(&content_type, config) else {
        return;
    };
    let file_name =
        attachment_file_name(date, address, attribute(part, b"cl").as_deref(), &subtype);
    let data = attribute(part, b"data").unwrap_or_default();

    match write_attachment(output_dir, &file_name, &data) {
        Ok(path) => {
            tracing::trace!(path = %path.display(), "Wrote attachment");
            report.files_written += 1;
        }
        Err(error) => {
            tracing::warn!(%file_name, %error, "Couldn't write attachment");
            report.failed += 1;
        }
    }
}

fn write_attachment(dir: &Path, file_name: &str, data: &str) -> Result<PathBuf> {
    let bytes = if data.bytes().any(|b| b.is_ascii_whitespace()) {
        let compact: String = data.split_ascii_whitespace().collect();
        STANDARD.decode(compact)?
    } else {
        STANDARD.decode(data)?
    };
    let path = unique_path(&dir.join(safe_file_name(dir, file_name)));
    fs::write(&path, bytes)?;
    Ok(path)
}
