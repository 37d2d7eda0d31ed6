//! Line-oriented state machine that turns a vCard file into contact records.

use std::fs;
use std::path::Path;

use crate::config::{DuplicatePolicy, VcardConfig};
use crate::contact::ContactRecord;
use crate::error::{FieldError, PhonepackError, Result, StructuralKind};
use crate::media::{MediaReport, MediaSink};

use super::multimedia::is_multimedia_tag;
use super::properties::parse_vcard_line;
use super::tokenizer::{KEY_VALUE_SEPARATOR, property_name};

const BEGIN_VCARD: &str = "BEGIN:VCARD";
const END_VCARD: &str = "END:VCARD";

/// A property line that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineError {
    /// 1-based number of the first physical line of the property.
    pub line: usize,
    pub error: FieldError,
}

/// A recognized property that was ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedProperty {
    pub line: usize,
    pub tag: String,
}

/// Everything assembled from one input.
#[derive(Debug, Default)]
pub struct Assembly {
    /// Records in file order.
    pub records: Vec<ContactRecord>,
    /// Line-level errors, in file order.
    pub errors: Vec<LineError>,
    /// Unsupported properties that were skipped.
    pub skipped: Vec<SkippedProperty>,
    /// Outcome of handing multimedia records to the media sink.
    pub media: MediaReport,
}

impl Assembly {
    /// Returns `true` if every property line parsed.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Assembles `BEGIN:VCARD` ... `END:VCARD` blocks into [`ContactRecord`]s.
///
/// Lines outside a block are ignored. A block left open at end of input, a
/// nested `BEGIN`, or a stray `END` is a structural error that aborts the
/// input. Property lines that don't parse are collected in
/// [`Assembly::errors`] unless [`VcardConfig::fail_fast`] is set.
///
/// # Example
///
/// ```rust
/// use phonepack::vcard::VcardAssembler;
///
/// let input = "BEGIN:VCARD\nVERSION:3.0\nFN:Jane Doe\nEND:VCARD\n";
/// let assembly = VcardAssembler::new().assemble(input)?;
///
/// assert_eq!(assembly.records.len(), 1);
/// assert_eq!(assembly.records[0].text("FN"), Some("Jane Doe"));
/// # Ok::<(), phonepack::PhonepackError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct VcardAssembler {
    config: VcardConfig,
}

impl VcardAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: VcardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VcardConfig {
        &self.config
    }

    /// Assembles `input` without extracting media.
    pub fn assemble(&self, input: &str) -> Result<Assembly> {
        self.run(input, None)
    }

    /// Assembles `input`, passing each record with multimedia to `sink` as
    /// its `END:VCARD` is reached.
    pub fn assemble_with(&self, input: &str, sink: &mut dyn MediaSink) -> Result<Assembly> {
        self.run(input, Some(sink))
    }

    /// Reads and assembles a `.vcf` file.
    ///
    /// Invalid UTF-8 is replaced rather than rejected. Errors carry the path.
    pub fn assemble_file(
        &self,
        path: &Path,
        sink: Option<&mut dyn MediaSink>,
    ) -> Result<Assembly> {
        tracing::debug!(path = %path.display(), "Reading vCard file");
        let bytes = fs::read(path)?;
        let input = String::from_utf8_lossy(&bytes);
        self.run(&input, sink).map_err(|e| e.with_path(path))
    }

    #[tracing::instrument(skip_all, fields(input_len = input.len()))]
    fn run(&self, input: &str, mut sink: Option<&mut dyn MediaSink>) -> Result<Assembly> {
        let lines: Vec<&str> = input.lines().collect();
        let mut assembly = Assembly::default();
        // The open record and the line its BEGIN was on.
        let mut current: Option<(ContactRecord, usize)> = None;

        let mut index = 0;
        while index < lines.len() {
            let line_no = index + 1;
            let line = lines[index].trim();

            if line.eq_ignore_ascii_case(BEGIN_VCARD) {
                if current.is_some() {
                    return Err(PhonepackError::structural(StructuralKind::NestedBegin, line_no));
                }
                current = Some((ContactRecord::new(), line_no));
                index += 1;
                continue;
            }

            if line.eq_ignore_ascii_case(END_VCARD) {
                let Some((record, _)) = current.take() else {
                    return Err(PhonepackError::structural(StructuralKind::UnmatchedEnd, line_no));
                };
                tracing::debug!(properties = record.len(), line = line_no, "Assembled contact");
                if let Some(sink) = sink.as_deref_mut() {
                    if record.has_multimedia() {
                        assembly.media.merge(sink.accept(&record));
                    }
                }
                assembly.records.push(record);
                index += 1;
                continue;
            }

            let Some((record, _)) = current.as_mut() else {
                index += 1;
                continue;
            };
            if line.is_empty() {
                index += 1;
                continue;
            }

            let (logical, next) = logical_line(&lines, index);
            index = next;
            self.merge_line(record, &logical, line_no, &mut assembly)?;
        }

        if let Some((_, begin_line)) = current {
            return Err(PhonepackError::structural(
                StructuralKind::UnterminatedRecord,
                begin_line,
            ));
        }

        tracing::debug!(
            records = assembly.records.len(),
            errors = assembly.errors.len(),
            skipped = assembly.skipped.len(),
            "Finished vCard input"
        );
        Ok(assembly)
    }

    fn merge_line(
        &self,
        record: &mut ContactRecord,
        logical: &str,
        line_no: usize,
        assembly: &mut Assembly,
    ) -> Result<()> {
        match parse_vcard_line(logical) {
            Ok(parsed) => {
                match self.config.duplicate_policy {
                    DuplicatePolicy::LastWins => {
                        if record.insert(parsed.tag.as_str(), parsed.value).is_some() {
                            tracing::trace!(tag = %parsed.tag, line = line_no, "Overwrote duplicate property");
                        }
                    }
                    DuplicatePolicy::FirstWins => {
                        if !record.insert_if_absent(parsed.tag.as_str(), parsed.value) {
                            tracing::trace!(tag = %parsed.tag, line = line_no, "Ignored duplicate property");
                        }
                    }
                }
                Ok(())
            }
            Err(FieldError::Unsupported { tag }) if self.config.ignore_unsupported => {
                tracing::warn!(%tag, line = line_no, "Skipping unsupported property");
                assembly.skipped.push(SkippedProperty { line: line_no, tag });
                Ok(())
            }
            Err(FieldError::Unsupported { tag }) if self.config.fail_fast => {
                Err(PhonepackError::Unsupported { tag, line: line_no })
            }
            Err(error) if self.config.fail_fast => Err(PhonepackError::field(line_no, error)),
            Err(error) => {
                tracing::warn!(line = line_no, %error, "Couldn't parse property");
                assembly.errors.push(LineError {
                    line: line_no,
                    error,
                });
                Ok(())
            }
        }
    }
}

fn is_record_marker(line: &str) -> bool {
    line.eq_ignore_ascii_case(BEGIN_VCARD) || line.eq_ignore_ascii_case(END_VCARD)
}

/// Joins the physical lines of the property starting at `start`.
///
/// Multimedia payloads continue until a line containing `:` or a blank line;
/// continuation lines are trimmed. Other properties absorb RFC folded lines
/// (leading space or tab). Returns the logical line and the index after it.
fn logical_line(lines: &[&str], start: usize) -> (String, usize) {
    let first = lines[start].trim();
    let mut logical = first.to_string();
    let mut next = start + 1;

    if is_multimedia_tag(&property_name(first)) {
        while let Some(line) = lines.get(next).map(|line| line.trim()) {
            if line.is_empty() || line.contains(KEY_VALUE_SEPARATOR) {
                break;
            }
            logical.push_str(line);
            next += 1;
        }
    } else {
        while let Some(folded) = lines
            .get(next)
            .filter(|line| !is_record_marker(line.trim()))
            .and_then(|line| line.strip_prefix([' ', '\t']))
        {
            logical.push_str(folded);
            next += 1;
        }
    }

    (logical, next)
}
