//! Edge cases: malformed input, unusual encodings and boundary conditions.

use std::fs;

use phonepack::backup::CallLog;
use phonepack::backup::mms::{MAX_FULLPATH_LENGTH, attachment_file_name, safe_file_name};
use phonepack::batch::process_vcard_dir;
use phonepack::error::StructuralKind;
use phonepack::prelude::*;
use phonepack::vcard::MultimediaCase;
use phonepack::vcard::multimedia::classify;
use tempfile::TempDir;

fn assemble(input: &str) -> Assembly {
    VcardAssembler::new().assemble(input).unwrap()
}

// =============================================================================
// Record structure
// =============================================================================

#[test]
fn test_empty_input() {
    let assembly = assemble("");
    assert!(assembly.records.is_empty());
    assert!(assembly.is_clean());
}

#[test]
fn test_only_noise_outside_records() {
    let assembly = assemble("hello\nworld\nFN:not in a card\n");
    assert!(assembly.records.is_empty());
    assert!(assembly.errors.is_empty());
}

#[test]
fn test_structural_errors_report_kind_and_line() {
    let cases = [
        ("BEGIN:VCARD\nBEGIN:VCARD\n", StructuralKind::NestedBegin, 2),
        ("BEGIN:VCARD\nEND:VCARD\nEND:VCARD\n", StructuralKind::UnmatchedEnd, 3),
        ("FN:x\n\nBEGIN:VCARD\nFN:A\n", StructuralKind::UnterminatedRecord, 3),
    ];
    for (input, kind, line) in cases {
        let err = VcardAssembler::new().assemble(input).unwrap_err();
        assert_eq!(err.structural_kind(), Some(kind), "{input:?}");
        assert!(err.to_string().contains(&format!("line {line}")), "{err}");
    }
}

#[test]
fn test_unterminated_file_has_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.vcf");
    fs::write(&path, "BEGIN:VCARD\nFN:A\n").unwrap();

    let err = VcardAssembler::new().assemble_file(&path, None).unwrap_err();
    assert!(err.is_structural());
    assert!(err.to_string().contains("broken.vcf"));
}

#[test]
fn test_invalid_utf8_is_replaced() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("latin1.vcf");
    fs::write(&path, b"BEGIN:VCARD\nFN:Jos\xe9\nEND:VCARD\n").unwrap();

    let assembly = VcardAssembler::new().assemble_file(&path, None).unwrap();
    assert_eq!(assembly.records[0].text("FN"), Some("Jos\u{FFFD}"));
}

// =============================================================================
// Property lines
// =============================================================================

#[test]
fn test_unknown_property_is_line_error() {
    let assembly = assemble("BEGIN:VCARD\nFOO:bar\nEND:VCARD\n");
    assert_eq!(assembly.records.len(), 1);
    assert!(assembly.records[0].is_empty());
    assert_eq!(assembly.errors[0].line, 2);
    assert_eq!(
        assembly.errors[0].error,
        FieldError::UnknownProperty { tag: "FOO".into() }
    );
}

#[test]
fn test_missing_separator() {
    let err = parse_vcard_line("FN").unwrap_err();
    assert!(matches!(err, FieldError::MissingSeparator { .. }));
}

#[test]
fn test_prefix_tags_are_distinct() {
    // SOURCE vs SORT-STRING and N vs NOTE / NICKNAME / NAME.
    assert_eq!(parse_vcard_line("SORT-STRING:Doe").unwrap().tag, "SORT-STRING");
    assert_eq!(parse_vcard_line("NOTE:hi").unwrap().tag, "NOTE");
    assert_eq!(parse_vcard_line("NICKNAME:Jo").unwrap().tag, "NICKNAME");
    assert_eq!(
        parse_vcard_line("NAME:Directory").unwrap_err(),
        FieldError::Unsupported { tag: "NAME".into() }
    );
}

#[test]
fn test_lowercase_tag_names() {
    let parsed = parse_vcard_line("tel;type=home:+1 555 0100").unwrap();
    assert_eq!(parsed.tag, "TEL");
    assert_eq!(parsed.value, PropertyValue::typed("home", "+1 555 0100"));
}

#[test]
fn test_untyped_telephone() {
    let parsed = parse_vcard_line("TEL:+1 555 0100").unwrap();
    assert_eq!(parsed.value, PropertyValue::typed("untyped", "+1 555 0100"));
}

#[test]
fn test_unicode_values() {
    let parsed = parse_vcard_line("N:Müller;Jürgen;;;").unwrap();
    let name = parsed.value.as_components().unwrap();
    assert_eq!(name.concatenated(), "MüllerJürgen");

    let parsed = parse_vcard_line("FN:Иван Петров").unwrap();
    assert_eq!(parsed.value.as_text(), Some("Иван Петров"));
}

#[test]
fn test_empty_categories() {
    let parsed = parse_vcard_line("CATEGORIES:").unwrap();
    assert_eq!(parsed.value, PropertyValue::List(Vec::new()));
}

#[test]
fn test_uid_scalar_and_typed() {
    assert_eq!(
        parse_vcard_line("UID:abc-123").unwrap().value,
        PropertyValue::Text("abc-123".into())
    );
    assert_eq!(
        parse_vcard_line("UID:urn:uuid:1").unwrap().value,
        PropertyValue::typed("urn", "uuid:1")
    );
}

#[test]
fn test_organization_too_many_fields() {
    let err = parse_vcard_line("ORG:A;B;C;D").unwrap_err();
    assert!(matches!(err, FieldError::SubfieldCount { expected: 3, found: 4 }));
}

// =============================================================================
// Multimedia
// =============================================================================

#[test]
fn test_every_multimedia_case_is_reachable() {
    let cases = [
        (";JPEG:http://x/p.jpg", MultimediaCase::TypeUrl),
        (";ENCODING=BASE64;JPEG:QUJD", MultimediaCase::EncodingFirst),
        (";JPEG;ENCODING=BASE64:QUJD", MultimediaCase::EncodingLast),
        (";TYPE=JPEG:http://x/p.jpg", MultimediaCase::AssignedTypeUrl),
        (";TYPE=JPEG;VALUE=URI:http://x/p.jpg", MultimediaCase::AssignedTypeUri),
        (";TYPE=JPEG;ENCODING=b:QUJD", MultimediaCase::AssignedTypeData),
        (";TYPE=JPEG;ENCODING=BASE64:QUJD", MultimediaCase::AssignedTypeData),
        (";JPEG:http://x/p.php?id=1", MultimediaCase::TypeUrl),
        (";MEDIATYPE=image/jpeg:http://x/p.jpg", MultimediaCase::MediaTypeUrl),
        (":data:image/jpeg;base64,QUJD", MultimediaCase::DataUri),
    ];
    for (rest, expected) in cases {
        assert_eq!(classify(rest), Some(expected), "{rest}");
    }
}

#[test]
fn test_unrecognized_multimedia_shape() {
    let err = parse_vcard_line("PHOTO;A;B;C;D:x").unwrap_err();
    assert!(matches!(err, FieldError::Multimedia { .. }));
}

#[test]
fn test_multimedia_without_extension_is_media_failure() {
    let dir = TempDir::new().unwrap();
    let media = TempDir::new().unwrap();
    // Data URI without a MIME type.
    fs::write(
        dir.path().join("a.vcf"),
        "BEGIN:VCARD\nFN:Ann\nSOUND:data:;base64,QUJD\nEND:VCARD\n",
    )
    .unwrap();

    let report = process_vcard_dir(dir.path(), &VcardConfig::new(), Some(media.path())).unwrap();
    let file = &report.files[0];
    assert_eq!(report.total_records(), 1);
    assert!(file.errors.is_empty());
    assert_eq!(file.media.failures.len(), 1);
    assert_eq!(file.media.failures[0].tag, "SOUND");
    assert_eq!(file.media.failures[0].contact, "Ann");
}

#[test]
fn test_bad_base64_is_media_failure_not_abort() {
    let dir = TempDir::new().unwrap();
    let media = TempDir::new().unwrap();
    fs::write(
        dir.path().join("a.vcf"),
        "BEGIN:VCARD\nFN:Ann\nPHOTO;ENCODING=BASE64;JPEG:@@@@\nEND:VCARD\n",
    )
    .unwrap();

    let report = process_vcard_dir(dir.path(), &VcardConfig::new(), Some(media.path())).unwrap();
    assert_eq!(report.total_records(), 1);
    assert_eq!(report.media_written(), 0);
    assert_eq!(report.files[0].media.failures.len(), 1);
}

// =============================================================================
// Call logs and MMS
// =============================================================================

#[test]
fn test_call_log_empty_backup() {
    let mut log = CallLog::new();
    assert_eq!(log.read_str("<calls count=\"0\"></calls>").unwrap(), 0);
    let csv = to_call_log_csv(&log, &CallLogConfig::default()).unwrap();
    assert_eq!(csv.lines().count(), 1);
}

#[test]
fn test_call_log_malformed_xml() {
    let mut log = CallLog::new();
    let err = log.read_str("<calls><call date=\"1\"></calls>").unwrap_err();
    assert!(matches!(err, PhonepackError::Xml(_)));
}

#[test]
fn test_mms_output_dir_must_be_empty() {
    let input = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    fs::write(out.path().join("existing.jpg"), b"x").unwrap();

    let err = extract_mms_media(input.path(), out.path(), &MmsConfig::default()).unwrap_err();
    assert!(matches!(err, PhonepackError::InvalidOutputDir { .. }));
}

#[test]
fn test_mms_duplicates_and_empty_files_removed() {
    let input = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let xml = r#"<smses>
  <mms date="1700000000000" address="100"><parts>
    <part ct="image/png" cl="a.png" data="QUJD" />
    <part ct="image/png" cl="b.png" data="QUJD" />
    <part ct="image/png" cl="a.png" data="REVG" />
    <part ct="image/gif" cl="empty.gif" data="" />
  </parts></mms>
</smses>"#;
    fs::write(input.path().join("sms-1.xml"), xml).unwrap();

    let report = extract_mms_media(input.path(), out.path(), &MmsConfig::default()).unwrap();
    assert_eq!(report.files_written, 4);
    assert_eq!(report.duplicates_removed, 2);
    assert_eq!(report.files_kept(), 2);

    let prefix = "20231114-221320_100_";
    assert!(out.path().join(format!("{prefix}a.png")).exists());
    assert!(out.path().join(format!("{prefix}a-1.png")).exists());
    assert!(!out.path().join(format!("{prefix}b.png")).exists());
}

#[test]
fn test_mms_random_name_for_null_location() {
    let name = attachment_file_name("1700000000000", "+1 555", Some("null"), "jpeg");
    assert!(name.starts_with("20231114-221320_1555_"));
    assert!(name.ends_with(".jpeg"));
    // timestamp + '_' + digits + '_' + 10 letters + ".jpeg"
    assert_eq!(name.len(), "20231114-221320_1555_".len() + 10 + ".jpeg".len());
}

#[test]
fn test_mms_invalid_date() {
    let name = attachment_file_name("soon", "", Some("x.gif"), "gif");
    assert_eq!(name, "00000000-000000__x.gif");
}

#[test]
fn test_mms_long_names_are_shortened() {
    let dir = TempDir::new().unwrap();
    let long = format!("{}.jpg", "x".repeat(400));

    let short = safe_file_name(dir.path(), &long);
    assert!(dir.path().join(&short).as_os_str().len() <= MAX_FULLPATH_LENGTH);
    assert!(short.ends_with(".jpg"));
    assert!(short.starts_with(&"x".repeat(50)));
}
