//! Command-line interface definition using clap.
//!
//! - [`Args`] - top-level arguments and the global `-v` flag
//! - [`Command`] - one subcommand per backup kind
//! - [`Format`] - contact output format option
//!
//! Each subcommand maps its flags onto the library configuration types:
//!
//! ```rust
//! use clap::Parser;
//! use phonepack::cli::{Args, Command};
//!
//! let args = Args::parse_from(["phonepack", "mms", "backup", "media", "--images"]);
//! let Command::Mms(mms) = args.command else { unreachable!() };
//! let config = mms.to_config();
//! assert!(config.images && !config.videos);
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::{CallLogConfig, MmsConfig, VcardConfig};

/// Extract contacts, call logs and MMS media from phone backups.
#[derive(Parser, Debug, Clone)]
#[command(name = "phonepack")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    phonepack contacts backup/ -o contacts.json
    phonepack contacts backup/ -f jsonl --media-dir photos/ --no-fetch
    phonepack calls backup/ -o calls.csv
    phonepack mms backup/ attachments/ --images --pdf")]
pub struct Args {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Default `tracing` filter directive for the verbosity level.
    ///
    /// `RUST_LOG` takes precedence when set.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Assemble every .vcf file in a directory into contact records
    #[command(alias = "vcf")]
    Contacts(ContactsArgs),

    /// Merge calls*.xml backups into one CSV call log
    Calls(CallsArgs),

    /// Extract attachments from sms*.xml backups
    #[command(alias = "sms")]
    Mms(MmsArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct ContactsArgs {
    /// Directory containing .vcf files
    pub input: PathBuf,

    /// Path to output file
    #[arg(short, long, default_value = "contacts.json")]
    pub output: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: Format,

    /// Write PHOTO/LOGO/SOUND/KEY assets into this directory
    #[arg(long, value_name = "DIR")]
    pub media_dir: Option<PathBuf>,

    /// Don't download URL-referenced media
    #[arg(long)]
    pub no_fetch: bool,

    /// Download timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Stop at the first malformed line
    #[arg(long)]
    pub fail_fast: bool,

    /// Fail fast and treat unsupported properties as errors
    #[arg(long)]
    pub strict: bool,
}

impl ContactsArgs {
    pub fn to_config(&self) -> VcardConfig {
        let base = if self.strict {
            VcardConfig::strict()
        } else {
            VcardConfig::new().with_fail_fast(self.fail_fast)
        };
        base.with_fetch_remote_media(!self.no_fetch)
            .with_fetch_timeout(self.timeout.map(Duration::from_secs))
    }

    /// Output path with the extension of the chosen format when the
    /// default output name was kept.
    pub fn output_path(&self) -> PathBuf {
        if self.output == PathBuf::from("contacts.json") {
            let format: crate::format::OutputFormat = self.format.into();
            return PathBuf::from(format!("contacts.{}", format.extension()));
        }
        self.output.clone()
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct CallsArgs {
    /// Directory containing calls*.xml files
    pub input: PathBuf,

    /// Path to output CSV file
    #[arg(short, long, default_value = "call_log.csv")]
    pub output: PathBuf,

    /// Use ';' instead of ',' as the CSV delimiter
    #[arg(long)]
    pub semicolon: bool,
}

impl CallsArgs {
    pub fn to_config(&self) -> CallLogConfig {
        if self.semicolon {
            CallLogConfig::new().with_delimiter(b';')
        } else {
            CallLogConfig::new()
        }
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct MmsArgs {
    /// Directory containing sms*.xml files
    pub input: PathBuf,

    /// Output directory (must be empty or absent)
    pub output: PathBuf,

    /// Extract images
    #[arg(long)]
    pub images: bool,

    /// Extract videos
    #[arg(long)]
    pub videos: bool,

    /// Extract audio
    #[arg(long)]
    pub audio: bool,

    /// Extract PDF documents
    #[arg(long)]
    pub pdf: bool,

    /// Keep files with identical content
    #[arg(long)]
    pub keep_duplicates: bool,
}

impl MmsArgs {
    /// Selected kinds; no kind flag selects every kind.
    pub fn to_config(&self) -> MmsConfig {
        let selected = MmsConfig::none()
            .with_images(self.images)
            .with_videos(self.videos)
            .with_audio(self.audio)
            .with_pdf(self.pdf);
        let config = if selected.any_enabled() {
            selected
        } else {
            MmsConfig::new()
        };
        config.with_remove_duplicates(!self.keep_duplicates)
    }
}

/// Contact output format option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// JSON array of contacts
    #[default]
    Json,

    /// JSON Lines - one contact per line
    #[value(alias = "ndjson")]
    Jsonl,
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", crate::format::OutputFormat::from(*self))
    }
}

impl From<Format> for crate::format::OutputFormat {
    fn from(format: Format) -> crate::format::OutputFormat {
        match format {
            Format::Json => crate::format::OutputFormat::Json,
            Format::Jsonl => crate::format::OutputFormat::Jsonl,
        }
    }
}
