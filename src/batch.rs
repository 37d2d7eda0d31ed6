//! Processing a whole directory of contact files.

use std::path::{Path, PathBuf};

use crate::config::VcardConfig;
use crate::contact::ContactRecord;
use crate::error::{PhonepackError, Result};
use crate::media::{ContactMediaWriter, MediaReport, MediaSink};
use crate::source::BackupKind;
use crate::vcard::{LineError, SkippedProperty, VcardAssembler};

/// Outcome for a single `.vcf` file.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    /// Number of records assembled from this file.
    pub records: usize,
    pub errors: Vec<LineError>,
    pub skipped: Vec<SkippedProperty>,
    pub media: MediaReport,
    /// Set when the file was aborted (structural or I/O error). An aborted
    /// file has no records, but `media` still lists what its finished
    /// records wrote.
    pub fatal: Option<PhonepackError>,
}

impl FileReport {
    fn aborted(path: PathBuf, media: MediaReport, error: PhonepackError) -> Self {
        Self {
            path,
            records: 0,
            errors: Vec::new(),
            skipped: Vec::new(),
            media,
            fatal: Some(error),
        }
    }

    /// Returns `true` if the file parsed without any error.
    pub fn is_clean(&self) -> bool {
        self.fatal.is_none() && self.errors.is_empty()
    }
}

/// Result of [`process_vcard_dir`].
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One entry per file, in path order.
    pub files: Vec<FileReport>,
    /// Every record assembled, in file order.
    pub records: Vec<ContactRecord>,
}

impl BatchReport {
    pub fn total_records(&self) -> usize {
        self.records.len()
    }

    /// Number of line-level errors across all files.
    pub fn total_errors(&self) -> usize {
        self.files.iter().map(|f| f.errors.len()).sum()
    }

    /// Files that were aborted.
    pub fn failed_files(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| f.fatal.is_some())
    }

    /// Number of media files written across all files.
    pub fn media_written(&self) -> usize {
        self.files.iter().map(|f| f.media.written.len()).sum()
    }
}

/// Keeps the media report of each record, so media written before a file
/// aborts is still accounted for.
struct RecordingSink<'a> {
    inner: &'a mut dyn MediaSink,
    report: MediaReport,
}

impl MediaSink for RecordingSink<'_> {
    fn accept(&mut self, record: &ContactRecord) -> MediaReport {
        self.report.merge(self.inner.accept(record));
        MediaReport::default()
    }
}

/// Assembles every `.vcf` file directly inside `dir`.
///
/// When `media_dir` is given, contact media is written there. A file with a
/// structural error is reported and skipped, unless
/// [`VcardConfig::fail_fast`] is set, in which case the first error of any
/// kind is returned.
///
/// # Example
///
/// ```rust,no_run
/// use phonepack::batch::process_vcard_dir;
/// use phonepack::config::VcardConfig;
///
/// let report = process_vcard_dir("backup".as_ref(), &VcardConfig::new(), None)?;
/// for file in &report.files {
///     println!("{}: {} records", file.path.display(), file.records);
/// }
/// # Ok::<(), phonepack::PhonepackError>(())
/// ```
#[tracing::instrument(skip_all, fields(dir = %dir.display()))]
pub fn process_vcard_dir(
    dir: &Path,
    config: &VcardConfig,
    media_dir: Option<&Path>,
) -> Result<BatchReport> {
    let paths = BackupKind::Contacts.scan_dir(dir)?;
    process_vcard_files(&paths, config, media_dir)
}

/// Assembles the given `.vcf` files, in order.
pub fn process_vcard_files(
    paths: &[PathBuf],
    config: &VcardConfig,
    media_dir: Option<&Path>,
) -> Result<BatchReport> {
    let assembler = VcardAssembler::with_config(config.clone());
    let mut writer = media_dir
        .map(|dir| ContactMediaWriter::from_config(dir, config))
        .transpose()?;
    let mut report = BatchReport::default();

    for path in paths {
        let mut recorder = writer.as_mut().map(|w| RecordingSink {
            inner: w,
            report: MediaReport::default(),
        });
        let sink = recorder.as_mut().map(|r| r as &mut dyn MediaSink);
        let result = assembler.assemble_file(path, sink);
        let media = recorder.map(|r| r.report).unwrap_or_default();

        match result {
            Ok(assembly) => {
                tracing::debug!(
                    path = %path.display(),
                    records = assembly.records.len(),
                    errors = assembly.errors.len(),
                    "Processed contact file"
                );
                report.files.push(FileReport {
                    path: path.clone(),
                    records: assembly.records.len(),
                    errors: assembly.errors,
                    skipped: assembly.skipped,
                    media,
                    fatal: None,
                });
                report.records.extend(assembly.records);
            }
            Err(e) if config.fail_fast => return Err(e),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping contact file");
                report.files.push(FileReport::aborted(path.clone(), media, e));
            }
        }
    }

    tracing::info!(
        files = report.files.len(),
        records = report.total_records(),
        errors = report.total_errors(),
        "Processed contact files"
    );
    Ok(report)
}
