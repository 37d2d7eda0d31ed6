//! # phonepack CLI
//!
//! Command-line interface for the phonepack library.

use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

use phonepack::PhonepackError;
use phonepack::backup::{CallLog, extract_mms_media};
use phonepack::batch::{BatchReport, process_vcard_dir};
use phonepack::cli::{Args, CallsArgs, Command, ContactsArgs, MmsArgs};
use phonepack::format::{OutputFormat, write_contacts};
use phonepack::output::write_call_log;

fn main() {
    let args = <Args as ClapParser>::parse();
    init_tracing(args.log_level());

    if let Err(e) = run(args) {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<(), PhonepackError> {
    let total_start = Instant::now();

    println!("📦 phonepack v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    match &args.command {
        Command::Contacts(contacts) => run_contacts(contacts)?,
        Command::Calls(calls) => run_calls(calls)?,
        Command::Mms(mms) => run_mms(mms)?,
    }

    println!();
    println!("⚡ Total time: {:.2}s", total_start.elapsed().as_secs_f64());
    Ok(())
}

fn run_contacts(args: &ContactsArgs) -> Result<(), PhonepackError> {
    let output_path = args.output_path();
    let format: OutputFormat = args.format.into();
    let config = args.to_config();

    println!("📖 Source:  Contacts");
    println!("📂 Input:   {}", args.input.display());
    println!("💾 Output:  {}", output_path.display());
    println!("📄 Format:  {}", format);
    if let Some(media_dir) = &args.media_dir {
        println!("🖼️  Media:   {}", media_dir.display());
    }
    println!();

    println!("⏳ Assembling vCards...");
    let parse_start = Instant::now();
    let report = process_vcard_dir(&args.input, &config, args.media_dir.as_deref())?;
    println!(
        "   Found {} contacts in {} files ({:.2}s)",
        report.total_records(),
        report.files.len(),
        parse_start.elapsed().as_secs_f64()
    );
    print_file_details(&report);

    println!("💾 Writing {}...", format);
    write_contacts(&report.records, &output_path, format)?;

    println!();
    println!("✅ Done! Output saved to {}", output_path.display());

    println!();
    println!("📊 Summary:");
    println!("   Contacts:     {}", report.total_records());
    println!("   Line errors:  {}", report.total_errors());
    println!("   Failed files: {}", report.failed_files().count());
    if args.media_dir.is_some() {
        println!("   Media files:  {}", report.media_written());
    }
    Ok(())
}

fn print_file_details(report: &BatchReport) {
    for file in &report.files {
        match &file.fatal {
            Some(error) => println!("   ⚠️  {}: {}", file.path.display(), error),
            None => println!("   📄 {}: {} records", file.path.display(), file.records),
        }
        for line_error in &file.errors {
            println!("      line {}: {}", line_error.line, line_error.error);
        }
        for failure in &file.media.failures {
            println!("      {} {}: {}", failure.contact, failure.tag, failure.error);
        }
    }
}

fn run_calls(args: &CallsArgs) -> Result<(), PhonepackError> {
    println!("📖 Source:  Calls");
    println!("📂 Input:   {}", args.input.display());
    println!("💾 Output:  {}", args.output.display());
    println!();

    println!("⏳ Reading call backups...");
    let log = CallLog::from_dir(&args.input)?;
    println!(
        "   Found {} calls ({} duplicates, {} invalid)",
        log.len(),
        log.duplicates(),
        log.invalid()
    );

    println!("💾 Writing CSV...");
    write_call_log(&log, &args.output, &args.to_config())?;

    println!();
    println!("✅ Done! Output saved to {}", args.output.display());
    Ok(())
}

fn run_mms(args: &MmsArgs) -> Result<(), PhonepackError> {
    let config = args.to_config();

    println!("📖 Source:  MMS");
    println!("📂 Input:   {}", args.input.display());
    println!("💾 Output:  {}", args.output.display());
    println!();

    println!("⏳ Extracting attachments...");
    let report = extract_mms_media(&args.input, &args.output, &config)?;

    println!();
    println!("✅ Done! Attachments saved to {}", args.output.display());

    println!();
    println!("📊 Summary:");
    println!("   Written:    {}", report.files_written);
    println!("   Duplicates: {}", report.duplicates_removed);
    println!("   Failed:     {}", report.failed);
    println!("   Kept:       {}", report.files_kept());
    Ok(())
}
