use std::cell::RefCell;
use std::fs;
use std::io::{self, Cursor, Write};
use std::path::Path;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::bail;
use clap::Parser;
use ingest::parser::IspnParser;
use ingest::{Analyzer, DriveError, Driver, LogFormat, Record};
use scan::runtime::run::execute;
use scan::{Cli, ConfigError, Registry, RunError};
use serde_json::Value;

#[derive(Clone, Default)]
struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl SharedBuf {
    fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn cli(args: &[&str]) -> Cli {
    let mut argv = vec!["logscan"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

fn write_log(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

/// Run the `json` analyzer over `contents` and return the decoded records.
fn json_records(contents: &str, format: &str) -> Vec<Value> {
    let dir = tempfile::tempdir().unwrap();
    let file = write_log(dir.path(), "input.log", contents);
    let setting = format!("logFormat={format}");
    let out = SharedBuf::default();
    execute(
        &cli(&["--parser", "ispn", "--analyzer", "json", "--file", &file, "--set", &setting]),
        &Registry::builtin(),
        Box::new(out.clone()),
    )
    .unwrap();
    out.contents().lines().map(|line| serde_json::from_str(line).unwrap()).collect()
}

// ── Scenarios ───────────────────────────────────────────────────

#[test]
fn test_single_time_only_line() {
    let records = json_records("12:34:56,789 INFO  (worker-1) [com.x.Y] hello\n", "3");
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record["level"], "INFO");
    assert_eq!(record["thread"], "worker-1");
    assert_eq!(record["class_name"], "com.x.Y");
    assert_eq!(record["message"], "hello");
    assert_eq!(record["timestamp_ms"], 45_296_789);
    assert_eq!(record["line_number"], 1);
}

#[test]
fn test_continuation_folding() {
    let input = "12:34:56,789 INFO  (worker-1) [com.x.Y] hello\n\tat A.b(A.java:1)\n\tat C.d(C.java:2)\n";
    let records = json_records(input, "3");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["message"], "hello\n\tat A.b(A.java:1)\n\tat C.d(C.java:2)");
}

#[test]
fn test_nested_parens_in_thread() {
    let records = json_records("12:00:00,000 DEBUG (pool-3-(thread-4)) [com.x.Y] hi\n", "3");
    assert_eq!(records[0]["thread"], "pool-3-(thread-4)");
    assert_eq!(records[0]["class_name"], "com.x.Y");
    assert_eq!(records[0]["message"], "hi");
}

#[test]
fn test_epoch_overrides_date_and_time() {
    let records = json_records("2024-01-02 03:04:05,006 1700000000000 WARN [C] (t) msg\n", "2");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["timestamp_ms"], 1_700_000_000_000i64);
    assert_eq!(records[0]["level"], "WARN");
    assert_eq!(records[0]["class_name"], "C");
    assert_eq!(records[0]["thread"], "t");
}

#[test]
fn test_leading_garbage_is_dropped() {
    let input = "\
starting server
  with options -Xmx2g
=== log begins ===
2024-01-02 03:04:05,006 INFO (main) [org.x.Boot] up
  continuation
";
    let records = json_records(input, "1");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["line_number"], 4);
    assert_eq!(records[0]["message"], "up\n  continuation");
}

static CONSUMED: AtomicUsize = AtomicUsize::new(0);
static FINALIZED: AtomicUsize = AtomicUsize::new(0);

/// Fails on the second record it sees.
struct AbortOnSecond;

impl Analyzer for AbortOnSecond {
    fn consume(&mut self, _record: Record) -> anyhow::Result<()> {
        if CONSUMED.fetch_add(1, Ordering::SeqCst) + 1 == 2 {
            bail!("second record rejected");
        }
        Ok(())
    }

    fn finalize(&mut self) -> anyhow::Result<()> {
        FINALIZED.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn test_analyzer_abort_runs_finalize_once() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_log(
        dir.path(),
        "abort.log",
        "12:00:00,000 INFO (t) [C] one\n12:00:01,000 INFO (t) [C] two\n12:00:02,000 INFO (t) [C] three\n",
    );
    let mut registry = Registry::builtin();
    registry.register_analyzer("abort", |_, _| Box::new(AbortOnSecond));

    let err = execute(
        &cli(&["--parser", "ispn", "--analyzer", "abort", "--file", &file, "--set", "logFormat=3"]),
        &registry,
        Box::new(io::sink()),
    )
    .unwrap_err();

    assert_eq!(err.exit_code(), 1);
    assert!(matches!(err, RunError::Drive(DriveError::Consume { line_number: 2, .. })));
    assert_eq!(CONSUMED.load(Ordering::SeqCst), 2);
    assert_eq!(FINALIZED.load(Ordering::SeqCst), 1);
}

// ── Properties ──────────────────────────────────────────────────

#[test]
fn test_rendered_records_parse_back_identically() {
    let input = "\
2024-01-02 03:04:05,006 INFO (main) [org.x.Boot] up
2024-01-02 03:04:06,100 ERROR (pool-1-(worker-2)) [org.x.Handler] failed
\tat org.x.Handler.run(Handler.java:10)
";
    let parser = IspnParser::new(LogFormat::Dated);
    let records: Vec<Record> = Driver::new(&parser)
        .records(Cursor::new(input.as_bytes().to_vec()))
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(records.len(), 2);

    let rendered: String = records.iter().map(|r| format!("{}\n", r.render(LogFormat::Dated))).collect();
    assert_eq!(rendered, input);
    let reparsed: Vec<Record> = Driver::new(&parser)
        .records(Cursor::new(rendered.into_bytes()))
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(reparsed, records);
}

#[test]
fn test_line_numbers_are_monotonic() {
    let input = "\
noise
12:00:00,000 INFO (a) [C] 1
  x
12:00:00,001 INFO (b) [C] 2

12:00:00,002 INFO (c) [C] 3
";
    let numbers: Vec<i64> = json_records(input, "3")
        .iter()
        .map(|r| r["line_number"].as_i64().unwrap())
        .collect();
    assert_eq!(numbers, vec![2, 4, 6]);
}

// ── Front end ───────────────────────────────────────────────────

#[test]
fn test_unknown_analyzer_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_log(dir.path(), "a.log", "");
    let err = execute(
        &cli(&["--parser", "ispn", "--analyzer", "nope", "--file", &file]),
        &Registry::builtin(),
        Box::new(io::sink()),
    )
    .unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(matches!(err, RunError::Config(ConfigError::UnknownAnalyzer { .. })));
}

#[test]
fn test_missing_input_is_a_config_error() {
    let err = execute(
        &cli(&["--parser", "ispn", "--analyzer", "json", "--file", "no-such-input-1b2c.log"]),
        &Registry::builtin(),
        Box::new(io::sink()),
    )
    .unwrap_err();
    assert!(matches!(err, RunError::Config(ConfigError::InputNotFound(_))));
}

#[test]
fn test_structural_fault_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_log(dir.path(), "broken.log", "12:00:00,000 INFO (t) [C] ok\n12:00:01,000 INFO (t [C] bad\n");
    let err = execute(
        &cli(&["--parser", "ispn", "--analyzer", "json", "--file", &file, "--set", "logFormat=3"]),
        &Registry::builtin(),
        Box::new(io::sink()),
    )
    .unwrap_err();
    assert_eq!(err.exit_code(), 1);
    assert!(matches!(err, RunError::Drive(DriveError::Stream(_))));
}

#[test]
fn test_config_file_selects_format_and_lock_filter() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("logscan.toml");
    fs::write(&config, "log_format = 3\n\n[lock]\nlock_ids = [\"k2\"]\n").unwrap();
    let file = write_log(
        dir.path(),
        "locks.log",
        "\
12:00:00,000 TRACE (t) [org.x.Lock] tx1 tryAcquire o SUCCESS (k1)
12:00:00,001 TRACE (t) [org.x.Lock] tx1 tryAcquire o SUCCESS (k2)
12:00:00,002 TRACE (t) [org.x.Lock] tx2 tryAcquire o SUCCESS (k2)
12:00:00,003 TRACE (t) [org.x.Lock] tx2 tryRelease o SUCCESS (k2)
",
    );
    let out = SharedBuf::default();
    let config_path = config.to_string_lossy().into_owned();
    let summary = execute(
        &cli(&["--parser", "ispn", "--analyzer", "lock", "--file", &file, "--config", &config_path]),
        &Registry::builtin(),
        Box::new(out.clone()),
    )
    .unwrap();
    assert_eq!(summary.records_consumed, 4);
    assert_eq!(out.contents(), "Transaction tx1 has pending locks: [k2]\nError found: 1\n");
}

#[test]
fn test_torquebox_stops_at_blank_line() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_log(
        dir.path(),
        "tb.log",
        "09:00:00,000 INFO [org.tb.Web] (MSC service thread 1-1) Invoked with command GetKeyValueCommand\n\
         09:00:00,250 INFO [org.tb.Web] (MSC service thread 1-1) Invoked with command GetKeyValueCommand\n\
         \n\
         09:00:01,000 INFO [org.tb.Web] (MSC service thread 1-1) Invoked with command GetKeyValueCommand\n",
    );
    let out = SharedBuf::default();
    let summary = execute(
        &cli(&["--parser", "torquebox", "--analyzer", "avg-event-interval", "--file", &file]),
        &Registry::builtin(),
        Box::new(out.clone()),
    )
    .unwrap();
    assert_eq!(summary.records_consumed, 2);
    assert_eq!(out.contents(), "OpNumber,timestamp,duration\n0,32400000,0\n1,32400250,250\n");
}

#[test]
fn test_blank_line_policy_override() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_log(
        dir.path(),
        "blank.log",
        "12:00:00,000 INFO (t) [C] one\n\n12:00:01,000 INFO (t) [C] two\n",
    );
    let summary = execute(
        &cli(&[
            "--parser", "ispn", "--analyzer", "json", "--file", &file,
            "--set", "logFormat=3", "--set", "blankLines=terminate",
        ]),
        &Registry::builtin(),
        Box::new(io::sink()),
    )
    .unwrap();
    assert_eq!(summary.records_consumed, 1);
    assert_eq!(summary.stream.lines_read, 2);
}

#[test]
fn test_test_suite_writes_per_test_files() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("split");
    fs::create_dir(&out_dir).unwrap();
    let file = write_log(
        dir.path(),
        "suite.log",
        "\
2024-01-02 10:00:00,000 INFO (testng-FooTest) [org.x.Suite] Starting test testPut(org.infinispan.FooTest)
2024-01-02 10:00:00,100 DEBUG (OOB-1,FooTest-NodeA) [org.x.Rpc] sending put
2024-01-02 10:00:00,200 INFO (testng-FooTest) [org.x.Suite] Test testPut(org.infinispan.FooTest) succeeded.
",
    );
    let out = SharedBuf::default();
    let output_dir = format!("outputDir={}", out_dir.display());
    execute(
        &cli(&[
            "--parser", "ispn", "--analyzer", "test-suite", "--file", &file,
            "--set", "logFormat=1",
            "--set", "ispn.classes=org.infinispan.FooTest",
            "--set", "ispn.methods=testPut",
            "--set", "writeToFile=true",
            "--set", &output_dir,
        ]),
        &Registry::builtin(),
        Box::new(out.clone()),
    )
    .unwrap();

    let report = out.contents();
    assert!(report.starts_with("filtering test classes: [FooTest]\n"));
    assert!(report.contains("FooTest.testPut writing to "));
    let written = fs::read_to_string(out_dir.join("FooTest.testPut.log")).unwrap();
    assert_eq!(written.lines().count(), 3);
    assert!(written.lines().nth(1).unwrap().ends_with("(OOB-1,FooTest-NodeA) [org.x.Rpc] sending put"));
}
