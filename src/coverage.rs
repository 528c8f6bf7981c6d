use crate::error::{QaError, Result};
use std::fs;
use std::io::{ErrorKind, Read, Seek};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Default budget for one test run.
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(300);

/// Report file written by `--cov-report=xml`.
pub const COVERAGE_REPORT: &str = "coverage.xml";

/// How to invoke the test runner.
#[derive(Debug, Clone)]
pub struct RunnerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl RunnerCommand {
    /// `pytest --cov=. --cov-report=xml --cov-report=term`, or another program with the same flags.
    pub fn pytest(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: ["--cov=.", "--cov-report=xml", "--cov-report=term"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// What the runner printed, plus how it exited.
#[derive(Debug)]
pub struct RunOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Runs the test runner in `dir`, killing it once `timeout` elapses.
///
/// Output goes to temporary files so a chatty runner cannot block on a full pipe.
pub fn run_tests(command: &RunnerCommand, dir: &Path, timeout: Duration) -> Result<RunOutput> {
    let mut stdout_file = tempfile::tempfile()?;
    let mut stderr_file = tempfile::tempfile()?;

    let mut child = match Command::new(&command.program)
        .args(&command.args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout_file.try_clone()?))
        .stderr(Stdio::from(stderr_file.try_clone()?))
        .spawn()
    {
        Ok(child) => child,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(QaError::RunnerNotFound(command.program.clone()))
        }
        Err(e) => return Err(e.into()),
    };

    let started = Instant::now();
    let status = loop {
        match child.try_wait()? {
            Some(status) => break status,
            None => {
                if started.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(QaError::RunnerTimeout(timeout.as_secs()));
                }
                thread::sleep(Duration::from_millis(100));
            }
        }
    };

    Ok(RunOutput {
        status,
        stdout: read_back(&mut stdout_file)?,
        stderr: read_back(&mut stderr_file)?,
    })
}

fn read_back(file: &mut fs::File) -> Result<String> {
    file.rewind()?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Path of the coverage report inside the project directory.
pub fn report_path(dir: &Path) -> PathBuf {
    dir.join(COVERAGE_REPORT)
}

/// Reads the Cobertura report and returns the line coverage as a percentage.
pub fn read_line_coverage(path: &Path) -> Result<f64> {
    if !path.exists() {
        return Err(QaError::Coverage("coverage report not generated".to_string()));
    }
    let xml = fs::read_to_string(path).map_err(|source| QaError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_line_rate(&xml).map(|rate| rate * 100.0)
}

/// Extracts the `line-rate` fraction from the root element of a Cobertura report.
///
/// A root without the attribute counts as 0.0.
pub fn parse_line_rate(xml: &str) -> Result<f64> {
    let doc =
        roxmltree::Document::parse(xml).map_err(|e| QaError::Coverage(e.to_string()))?;
    match doc.root_element().attribute("line-rate") {
        None => Ok(0.0),
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| QaError::Coverage(format!("invalid line-rate {:?}", raw))),
    }
}
