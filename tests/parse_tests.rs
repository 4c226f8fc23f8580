use asroute::error::{AppError, RangeError};
use asroute::parse::{ProgressObserver, parse_asinfo_bytes, parse_asinfo_csv, parse_asinfo_file};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::cell::RefCell;
use std::io::Write;
use std::path::PathBuf;

fn sample_csv() -> String {
    let mut s = String::new();
    s.push_str("1.0.0.0,1.0.0.255,13335,\"Cloudflare, Inc.\"\n");
    s.push_str("1.0.4.0,1.0.7.255,38803,Wireless Net\n");
    s.push_str("10.0.0.1,10.0.0.2,13335,\"Cloudflare, Inc.\"\n");
    s.push_str("2606:4700::,2606:4700:ffff:ffff:ffff:ffff:ffff:ffff,13335,\"Cloudflare, Inc.\"\n");
    s
}

fn strings(prefixes: &[asroute::Prefix]) -> Vec<String> {
    prefixes.iter().map(|p| p.to_string()).collect()
}

fn test_dir() -> PathBuf {
    let dir = PathBuf::from("target/test-output");
    if let Err(e) = std::fs::create_dir_all(&dir) {
        panic!("mkdir failed: {e}")
    }
    dir
}

#[test]
fn parses_records_into_asn_map() {
    let map = parse_asinfo_csv(sample_csv().as_bytes(), None)
        .unwrap_or_else(|e| panic!("unexpected error: {e}"));
    assert_eq!(map.len(), 2);

    let cf = &map[&13335];
    assert_eq!(cf.organization, "Cloudflare, Inc.");
    // 行の順序のまま、結合せずに追加される
    assert_eq!(
        strings(&cf.prefixes),
        vec!["1.0.0.0/24", "10.0.0.1/32", "10.0.0.2/32", "2606:4700::/32"]
    );

    let other = &map[&38803];
    assert_eq!(strings(&other.prefixes), vec!["1.0.4.0/22"]);
}

#[test]
fn first_organization_name_wins() {
    let csv = "1.0.0.0,1.0.0.255,64500,First Org\n2.0.0.0,2.0.0.255,64500,Second Org\n";
    let map = parse_asinfo_csv(csv.as_bytes(), None).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(map[&64500].organization, "First Org");
    assert_eq!(map[&64500].prefixes.len(), 2);
}

#[test]
fn reports_line_number_of_bad_record() {
    let csv = "1.0.0.0,1.0.0.255,64500,Org\n1.0.1.0,1.0.0.255,64500,Org\n";
    match parse_asinfo_csv(csv.as_bytes(), None) {
        Err(AppError::Record { line, source }) => {
            assert_eq!(line, 2);
            assert!(matches!(*source, AppError::Range(RangeError::InvertedRange { .. })));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn rejects_wrong_field_count_and_bad_values() {
    let cases = [
        "1.0.0.0,1.0.0.255,64500\n",
        "1.0.0.0,1.0.0.255,64500,Org,extra\n",
        "1.0.0.x,1.0.0.255,64500,Org\n",
        "1.0.0.0,1.0.0.255,AS64500,Org\n",
        "1.0.0.0,2001:db8::,64500,Org\n",
    ];
    for csv in cases {
        match parse_asinfo_csv(csv.as_bytes(), None) {
            Err(AppError::Record { line, .. }) => assert_eq!(line, 1, "{csv}"),
            other => panic!("expected record error for {csv:?}, got {other:?}"),
        }
    }
}

#[test]
fn detects_gzip_in_memory_and_on_disk() {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    if let Err(e) = encoder.write_all(sample_csv().as_bytes()) {
        panic!("gzip write failed: {e}")
    }
    let gz = encoder.finish().unwrap_or_else(|e| panic!("gzip finish failed: {e}"));

    let map = parse_asinfo_bytes(&gz, None).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(map[&13335].prefixes.len(), 4);

    let dir = test_dir();
    let gz_path = dir.join(format!("asn_{}.csv.gz", rand::random::<u64>()));
    let csv_path = dir.join(format!("asn_{}.csv", rand::random::<u64>()));
    if let Err(e) = std::fs::write(&gz_path, &gz) {
        panic!("write failed: {e}")
    }
    if let Err(e) = std::fs::write(&csv_path, sample_csv()) {
        panic!("write failed: {e}")
    }

    let from_gz = parse_asinfo_file(&gz_path, None).unwrap_or_else(|e| panic!("{e}"));
    let from_csv = parse_asinfo_file(&csv_path, None).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(from_gz, from_csv);

    let _ = std::fs::remove_file(&gz_path);
    let _ = std::fs::remove_file(&csv_path);
}

#[test]
fn missing_file_is_an_io_error_naming_the_path() {
    match parse_asinfo_file("target/test-output/does-not-exist.csv", None) {
        Err(AppError::Io(e)) => {
            assert_eq!(e.kind(), std::io::ErrorKind::NotFound);
            assert!(e.to_string().contains("does-not-exist.csv"), "{e}");
        }
        other => panic!("expected Io error, got {other:?}"),
    }
}

#[derive(Default)]
struct Recorder {
    finished: RefCell<Option<(u64, usize)>>,
    progress: RefCell<Vec<u64>>,
}

impl ProgressObserver for Recorder {
    fn on_progress(&self, lines: u64) {
        self.progress.borrow_mut().push(lines);
    }

    fn on_finish(&self, lines: u64, asns: usize) {
        *self.finished.borrow_mut() = Some((lines, asns));
    }
}

#[test]
fn observer_receives_totals() {
    let recorder = Recorder::default();
    let result = parse_asinfo_csv(sample_csv().as_bytes(), Some(&recorder));
    assert!(result.is_ok());
    // 100000行未満なので途中経過は無い
    assert!(recorder.progress.borrow().is_empty());
    assert_eq!(*recorder.finished.borrow(), Some((4, 2)));
}
