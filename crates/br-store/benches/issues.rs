//! Benchmarks for writing and reading large component issue lists.
//!
//! Run with:
//! ```bash
//! cargo bench -p br-store
//! ```

use std::hint::black_box;

use br_core::{ComponentRef, DuplicateRefPolicy, Issue, Severity, WriterConfig};
use br_store::{ReportReader, ReportWriter};
use camino::Utf8Path;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

const SIZES: [u32; 3] = [1_000, 10_000, 50_000];

fn generate_issues(count: u32) -> Vec<Issue> {
    (0..count)
        .map(|i| {
            let mut issue = Issue::new(format!("AX{i:08}")).with_line(i % 4_000 + 1);
            issue.message = Some(format!("Remove this unused variable number {i}"));
            issue.set_severity(Severity::Major);
            issue.rule_repository = Some("rust".to_owned());
            issue.rule_key = Some("S1481".to_owned());
            issue.effort_to_fix = Some(5.0);
            issue
        })
        .collect()
}

fn bench_write_issues(c: &mut Criterion) {
    let temp = tempfile::tempdir().expect("temp dir");
    let dir = Utf8Path::from_path(temp.path()).expect("utf-8 path");
    let config = WriterConfig {
        duplicate_refs: DuplicateRefPolicy::Overwrite,
        sync_on_write: false,
    };
    let writer = ReportWriter::open_with_config(dir, config).expect("open writer");

    let mut group = c.benchmark_group("write_component_issues");
    for size in SIZES {
        let issues = generate_issues(size);
        group.throughput(Throughput::Elements(u64::from(size)));
        group.bench_with_input(BenchmarkId::from_parameter(size), &issues, |b, issues| {
            b.iter(|| {
                writer
                    .write_component_issues(ComponentRef::new(size), black_box(issues.clone()))
                    .expect("write");
            });
        });
    }
    group.finish();
}

fn bench_read_issues(c: &mut Criterion) {
    let temp = tempfile::tempdir().expect("temp dir");
    let dir = Utf8Path::from_path(temp.path()).expect("utf-8 path");
    let writer = ReportWriter::open(dir).expect("open writer");
    for size in SIZES {
        writer
            .write_component_issues(ComponentRef::new(size), generate_issues(size))
            .expect("write");
    }
    let reader = ReportReader::open(dir).expect("open reader");

    let mut group = c.benchmark_group("read_component_issues");
    for size in SIZES {
        group.throughput(Throughput::Elements(u64::from(size)));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let issues = reader
                    .read_component_issues(black_box(ComponentRef::new(size)))
                    .expect("read");
                assert_eq!(issues.len(), size as usize);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_write_issues, bench_read_issues);
criterion_main!(benches);
