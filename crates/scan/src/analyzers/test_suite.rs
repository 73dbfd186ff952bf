//! Splits a test-suite log into one stream per running test.
//!
//! A record belongs to a test class when its thread name contains the class'
//! simple name. Between `Starting test <method>(<class>)` and
//! `Test <method>(<class>) succeeded.|failed.` every record of that class is
//! copied to the test's output: the main sink, or a per-test file when
//! `write_to_file` is set.

use std::collections::{BTreeSet, HashMap};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use ingest::{Analyzer, Record};
use tracing::{debug, warn};

use crate::conf::TestSuiteConfig;

enum Output {
    Main,
    File { path: PathBuf, writer: BufWriter<File> },
}

pub struct TestSuiteAnalyzer<W> {
    out: W,
    classes: Vec<String>,
    methods: BTreeSet<String>,
    write_to_file: bool,
    output_dir: PathBuf,
    /// Tests currently running, keyed by simple class name.
    running: HashMap<String, Output>,
}

impl<W: Write> TestSuiteAnalyzer<W> {
    pub fn new(config: &TestSuiteConfig, out: W) -> Self {
        Self {
            out,
            classes: config.simple_class_names(),
            methods: config.methods.iter().cloned().collect(),
            write_to_file: config.write_to_file,
            output_dir: config.output_dir.clone(),
            running: HashMap::new(),
        }
    }

    fn match_class(&self, thread: &str) -> Option<String> {
        self.classes.iter().find(|class| thread.contains(class.as_str())).cloned()
    }

    fn open(&mut self, class: &str, method: &str) -> io::Result<Output> {
        if !self.write_to_file {
            return Ok(Output::Main);
        }
        match create_file(&self.output_dir, class, method) {
            Ok((path, file)) => {
                let shown = path.canonicalize().unwrap_or_else(|_| path.clone());
                writeln!(self.out, "{class}.{method} writing to {}", shown.display())?;
                Ok(Output::File {
                    path,
                    writer: BufWriter::new(file),
                })
            }
            Err(err) => {
                warn!(class, method, error = %err, "cannot create file for test, writing to main output");
                Ok(Output::Main)
            }
        }
    }

    fn close(&mut self, output: Output) -> io::Result<()> {
        match output {
            Output::Main => self.out.flush(),
            Output::File { path, mut writer } => {
                debug!(path = %path.display(), "closing test output");
                writer.flush()
            }
        }
    }
}

fn emit<W: Write>(out: &mut W, output: &mut Output, record: &Record) -> io::Result<()> {
    match output {
        Output::Main => writeln!(out, "{record}"),
        Output::File { writer, .. } => writeln!(writer, "{record}"),
    }
}

/// Create `<dir>/<class>.<method>.log`, or the first free
/// `<dir>/<class>.<method>(<n>).log` with `n` counting from 1.
fn create_file(dir: &Path, class: &str, method: &str) -> io::Result<(PathBuf, File)> {
    let mut path = dir.join(format!("{class}.{method}.log"));
    let mut n = 1u32;
    while path.exists() {
        path = dir.join(format!("{class}.{method}({n}).log"));
        n += 1;
    }
    let file = OpenOptions::new().write(true).create_new(true).open(&path)?;
    Ok((path, file))
}

/// `Starting test <method>(<class>)` → `<method>`.
fn started_method(line: &str) -> Option<&str> {
    if !line.starts_with("Starting test") {
        return None;
    }
    method_name(line.split(' ').nth(2)?)
}

/// `Test <method>(<class>) succeeded.` or `… failed.` → `<method>`.
fn finished_method(line: &str) -> Option<&str> {
    if !line.starts_with("Test") || !(line.ends_with("succeeded.") || line.ends_with("failed.")) {
        return None;
    }
    method_name(line.split(' ').nth(1)?)
}

fn method_name(token: &str) -> Option<&str> {
    token.find('(').map(|open| &token[..open])
}

impl<W: Write> Analyzer for TestSuiteAnalyzer<W> {
    fn prepare(&mut self) -> anyhow::Result<()> {
        self.running.clear();
        let mut classes = self.classes.clone();
        classes.sort();
        let methods: Vec<&str> = self.methods.iter().map(String::as_str).collect();
        writeln!(self.out, "filtering test classes: [{}]", classes.join(", "))?;
        writeln!(self.out, "filtering test methods: [{}]", methods.join(", "))?;
        writeln!(self.out, "write to file? {}", self.write_to_file)?;
        Ok(())
    }

    fn consume(&mut self, record: Record) -> anyhow::Result<()> {
        let Some(class) = self.match_class(record.thread()) else {
            return Ok(());
        };
        let line = record.first_line();

        if let Some(output) = self.running.get_mut(&class) {
            emit(&mut self.out, output, &record)?;
            let finished = finished_method(line).is_some_and(|method| self.methods.contains(method));
            if finished {
                if let Some(output) = self.running.remove(&class) {
                    self.close(output)?;
                }
            }
            return Ok(());
        }

        let Some(method) = started_method(line).filter(|method| self.methods.contains(*method)) else {
            return Ok(());
        };
        let mut output = self.open(&class, method)?;
        emit(&mut self.out, &mut output, &record)?;
        self.running.insert(class, output);
        Ok(())
    }

    fn finalize(&mut self) -> anyhow::Result<()> {
        let running: Vec<Output> = self.running.drain().map(|(_, output)| output).collect();
        for output in running {
            self.close(output)?;
        }
        self.out.flush()?;
        Ok(())
    }
}
