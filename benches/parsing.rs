//! Benchmarks for phonepack parsing and output.
//!
//! Run with: `cargo bench`
//! Run specific group: `cargo bench --bench parsing -- vcard`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use phonepack::backup::CallLog;
use phonepack::config::CallLogConfig;
use phonepack::output::to_call_log_csv;
use phonepack::vcard::{VcardAssembler, parse_vcard_line};

// =============================================================================
// Test Data Generators
// =============================================================================

fn generate_vcards(count: usize) -> String {
    let mut out = String::with_capacity(count * 320);
    for i in 0..count {
        out.push_str(&format!(
            "BEGIN:VCARD\n\
             VERSION:3.0\n\
             N:Family{i};Given{i};;;\n\
             FN:Given{i} Family{i}\n\
             ORG:Company {i};Division;Unit\n\
             TEL;TYPE=CELL:+1 555 {i:04}\n\
             EMAIL;TYPE=INTERNET:user{i}@example.com\n\
             ADR;TYPE=HOME:;;{i} Main St;Springfield;IL;62701;USA\n\
             CATEGORIES:friends,work\n\
             PHOTO;ENCODING=BASE64;JPEG:QUJDREVGR0hJ\n\
             \x20SktMTU5PUFFS\n\
             END:VCARD\n"
        ));
    }
    out
}

fn generate_calls_xml(count: usize) -> String {
    let calls: String = (0..count)
        .map(|i| {
            format!(
                r#"<call number="+1555{i:07}" duration="{}" date="{}" type="{}" readable_date="d" contact_name="Caller {i}" />"#,
                i % 4000,
                1_700_000_000_000_i64 - (i as i64 * 60_000),
                i % 7 + 1,
            )
        })
        .collect();
    format!("<calls count=\"{count}\">{calls}</calls>")
}

// =============================================================================
// Parsing Benchmarks
// =============================================================================

fn bench_property_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("property_lines");
    let lines = [
        ("simple", "FN:Dr. John Doe"),
        ("name", "N:Public;John;Quinlan;Mr.;Esq."),
        ("address", "ADR;TYPE=WORK:;;100 Waters Edge;Baytown;LA;30314;USA"),
        ("generic", "TEL;TYPE=CELL:+1 781 555 1212"),
        ("multimedia", "PHOTO;TYPE=JPEG;VALUE=URI:http://example.com/p.jpg"),
    ];

    for (name, line) in lines {
        group.bench_with_input(BenchmarkId::from_parameter(name), &line, |b, line| {
            b.iter(|| black_box(parse_vcard_line(black_box(line)).unwrap()));
        });
    }
    group.finish();
}

fn bench_vcard_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("vcard_assembly");
    let assembler = VcardAssembler::new();

    for size in [100_usize, 1_000, 10_000] {
        let input = generate_vcards(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            b.iter(|| {
                let assembly = assembler.assemble(black_box(input)).unwrap();
                black_box(assembly)
            });
        });
    }
    group.finish();
}

fn bench_call_log(c: &mut Criterion) {
    let mut group = c.benchmark_group("call_log");
    let config = CallLogConfig::default();

    for size in [100_usize, 1_000, 10_000] {
        let xml = generate_calls_xml(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &xml, |b, xml| {
            b.iter(|| {
                let mut log = CallLog::new();
                log.read_str(black_box(xml)).unwrap();
                black_box(to_call_log_csv(&log, &config).unwrap())
            });
        });
    }
    group.finish();
}

// =============================================================================
// Output Benchmarks
// =============================================================================

#[cfg(feature = "json-output")]
fn bench_output_json(c: &mut Criterion) {
    use phonepack::output::{to_contacts_json, to_contacts_jsonl};

    let mut group = c.benchmark_group("output_json");
    let records = VcardAssembler::new()
        .assemble(&generate_vcards(1_000))
        .unwrap()
        .records;

    group.throughput(Throughput::Elements(records.len() as u64));
    group.bench_function("json", |b| {
        b.iter(|| black_box(to_contacts_json(black_box(&records)).unwrap()));
    });
    group.bench_function("jsonl", |b| {
        b.iter(|| black_box(to_contacts_jsonl(black_box(&records)).unwrap()));
    });
    group.finish();
}

#[cfg(not(feature = "json-output"))]
fn bench_output_json(_c: &mut Criterion) {}

// =============================================================================
// Criterion Configuration
// =============================================================================

criterion_group!(
    benches,
    bench_property_lines,
    bench_vcard_assembly,
    bench_call_log,
    bench_output_json,
);

criterion_main!(benches);
