use perfdb::commands::{import_trace, ImportArgs};
use perfdb::store::Store;
use perfdb::utils::error::{ImportError, StoreError};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};

const FIXTURE: &str = include_str!("fixtures/java_trace.txt");

fn write_trace(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn args(trace: &Path, db: &Path) -> ImportArgs {
    ImportArgs {
        trace_path: trace.to_path_buf(),
        db_path: db.to_path_buf(),
        program_name: "TestFibonacci".to_string(),
        record_seconds: 60,
    }
}

#[test]
fn test_two_sample_scenario_in_store() {
    let dir = tempfile::tempdir().unwrap();
    let trace = write_trace(
        dir.path(),
        "trace.txt",
        "java 100/101 10.0:\n  1a2b foo (/lib/a.so)\n  3c4d bar\njava 100/102 11.0:\n",
    );
    let db = dir.path().join("perf.sqlite");

    let stats = import_trace(&args(&trace, &db)).unwrap();
    assert_eq!(stats.sample_count, 2);
    assert_eq!(stats.stack_frame_count, 2);

    let store = Store::open_read_only(&db).unwrap();
    let samples = store.samples_for_pid(100).unwrap();
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0].timestamp, 10.0);
    assert_eq!(samples[0].raw_line, "java 100/101 10.0:");

    let frames = store.frames_for_sample(samples[0].id).unwrap();
    let summary: Vec<_> = frames
        .iter()
        .map(|f| (f.level, f.ip.as_str(), f.symbol.as_str(), f.dso.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![(0, "1a2b", "foo", "/lib/a.so"), (1, "3c4d", "bar", "")]
    );
    assert!(store.frames_for_sample(samples[1].id).unwrap().is_empty());
}

#[test]
fn test_fixture_import_stats() {
    let dir = tempfile::tempdir().unwrap();
    let trace = write_trace(dir.path(), "trace.txt", FIXTURE);
    let db = dir.path().join("perf.sqlite");

    let stats = import_trace(&args(&trace, &db)).unwrap();
    assert_eq!(stats.sample_count, 5);
    assert_eq!(stats.stack_frame_count, 11);
    assert_eq!(stats.parse_failure_count, 1);
    assert_eq!(stats.orphan_frame_count, 0);
    assert_eq!(stats.failed_lines, vec![25]);

    let store = Store::open_read_only(&db).unwrap();
    assert_eq!(store.sample_count().unwrap(), 5);
    assert_eq!(store.frame_count().unwrap(), 11);
    let metadata = store.metadata().unwrap();
    assert_eq!(metadata["parse_failure_count"], "1");
    assert_eq!(metadata["stack_count"], "11");
}

#[test]
fn test_same_trace_into_two_stores_matches() {
    let dir = tempfile::tempdir().unwrap();
    let trace = write_trace(dir.path(), "trace.txt", FIXTURE);

    let first = import_trace(&args(&trace, &dir.path().join("a.sqlite"))).unwrap();
    let second = import_trace(&args(&trace, &dir.path().join("b.sqlite"))).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_reimport_replaces_rows() {
    let dir = tempfile::tempdir().unwrap();
    let big = write_trace(dir.path(), "big.txt", FIXTURE);
    let small = write_trace(dir.path(), "small.txt", "perf 7/7 1.0:\n  ff main (/bin/perf)\n");
    let db = dir.path().join("perf.sqlite");

    import_trace(&args(&big, &db)).unwrap();
    import_trace(&args(&big, &db)).unwrap();
    {
        let store = Store::open_read_only(&db).unwrap();
        assert_eq!(store.sample_count().unwrap(), 5);
        assert_eq!(store.frame_count().unwrap(), 11);
    }

    let mut small_args = args(&small, &db);
    small_args.program_name = "perf".to_string();
    import_trace(&small_args).unwrap();

    let store = Store::open_read_only(&db).unwrap();
    assert_eq!(store.sample_count().unwrap(), 1);
    assert_eq!(store.frame_count().unwrap(), 1);

    let metadata = store.metadata().unwrap();
    assert_eq!(metadata["program_name"], "perf");
    assert_eq!(metadata["sample_count"], "1");
    assert_eq!(metadata["perf_script_file"], small.display().to_string());
    assert_eq!(metadata.len(), 8);
}

#[test]
fn test_orphan_frames_counted() {
    let dir = tempfile::tempdir().unwrap();
    let trace = write_trace(
        dir.path(),
        "trace.txt",
        "  1a2b lost (/lib/a.so)\n  3c4d also_lost\njava 1/1 1.0:\n  5e6f kept\n",
    );
    let db = dir.path().join("perf.sqlite");

    let stats = import_trace(&args(&trace, &db)).unwrap();
    assert_eq!(stats.orphan_frame_count, 2);
    assert_eq!(stats.stack_frame_count, 1);
    assert_eq!(stats.parse_failure_count, 0);
}

#[test]
fn test_missing_source() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("perf.sqlite");

    let err = import_trace(&args(&dir.path().join("missing.txt"), &db)).unwrap_err();
    assert!(matches!(err, ImportError::SourceNotFound(ref path) if path.ends_with("missing.txt")));
    assert!(!db.exists());
}

#[test]
fn test_unwritable_destination() {
    let dir = tempfile::tempdir().unwrap();
    let trace = write_trace(dir.path(), "trace.txt", FIXTURE);
    let db = dir.path().join("no/such/dir/perf.sqlite");

    let err = import_trace(&args(&trace, &db)).unwrap_err();
    assert!(matches!(
        err,
        ImportError::Store(StoreError::Open { ref path, .. }) if path == &db
    ));
}

#[test]
fn test_empty_trace_produces_queryable_store() {
    let dir = tempfile::tempdir().unwrap();
    let trace = write_trace(dir.path(), "trace.txt", "");
    let db = dir.path().join("perf.sqlite");

    let stats = import_trace(&args(&trace, &db)).unwrap();
    assert_eq!(stats.sample_count, 0);

    let store = Store::open_read_only(&db).unwrap();
    assert_eq!(store.sample_count().unwrap(), 0);
    assert_eq!(store.metadata().unwrap()["sample_count"], "0");
}
