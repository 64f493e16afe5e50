//! vnstat process invocation
//!
//! The collector runs `vnstat --oneline b` through a [`CommandRunner`] so the
//! rest of the block can be exercised without vnstat installed.

use async_trait::async_trait;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::collectors::vnstat::errors::VnstatError;
use crate::collectors::vnstat::report::{VnstatReport, parse_oneline};

/// Captured result of an external command
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub success: bool,
    /// Human readable exit status, e.g. "exit status: 1"
    pub status: String,
    pub stdout: String,
    pub stderr: String,
}

/// Runs external commands
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, VnstatError>;
}

/// Production runner backed by `tokio::process`
#[derive(Debug, Default, Clone)]
pub struct TokioCommandRunner;

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, VnstatError> {
        let output = tokio::process::Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| VnstatError::Spawn {
                command: program.to_string(),
                source,
            })?;

        Ok(CommandOutput {
            success: output.status.success(),
            status: output.status.to_string(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Finds executables
pub trait CommandLocator {
    fn locate(&self, program: &str) -> Option<PathBuf>;
}

/// Looks executables up on `PATH`, like a shell would
#[derive(Debug, Default, Clone)]
pub struct PathLocator;

impl CommandLocator for PathLocator {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        let candidate = Path::new(program);
        if candidate.components().count() > 1 {
            return candidate.is_file().then(|| candidate.to_path_buf());
        }

        let path = std::env::var_os("PATH")?;
        std::env::split_paths(&path)
            .map(|dir| dir.join(program))
            .find(|full| full.is_file())
    }
}

/// Fetches traffic reports from vnstat
pub struct VnstatCollector {
    command: String,
    interface: Option<String>,
    runner: Box<dyn CommandRunner>,
    fetch_count: u64,
}

impl VnstatCollector {
    /// Creates a collector that runs the real vnstat binary
    pub fn new(command: impl Into<String>, interface: Option<String>) -> Self {
        Self::with_runner(command, interface, Box::new(TokioCommandRunner))
    }

    /// Creates a collector with a custom command runner
    pub fn with_runner(
        command: impl Into<String>,
        interface: Option<String>,
        runner: Box<dyn CommandRunner>,
    ) -> Self {
        Self {
            command: command.into(),
            interface,
            runner,
            fetch_count: 0,
        }
    }

    /// Arguments passed to vnstat
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["--oneline".to_string(), "b".to_string()];
        if let Some(interface) = &self.interface {
            args.push("-i".to_string());
            args.push(interface.clone());
        }
        args
    }

    pub fn command_line(&self) -> String {
        let mut line = self.command.clone();
        for arg in self.args() {
            line.push(' ');
            line.push_str(&arg);
        }
        line
    }

    /// Runs vnstat once and parses its report
    pub async fn fetch(&mut self) -> Result<VnstatReport, VnstatError> {
        self.fetch_count += 1;
        let started = Instant::now();
        let command_line = self.command_line();

        debug!("Fetch #{}: running '{}'", self.fetch_count, command_line);

        let output = self.runner.run(&self.command, &self.args()).await?;
        if !output.success {
            warn!(
                "Fetch #{}: '{}' failed with {} (stderr={:?})",
                self.fetch_count, command_line, output.status, output.stderr
            );
            return Err(VnstatError::CommandFailed {
                command: command_line,
                status: output.status,
                stderr: output.stderr.trim().to_string(),
            });
        }

        let report = parse_oneline(&output.stdout)?;
        info!(
            "Fetch #{} completed in {:?} ({} fields)",
            self.fetch_count,
            started.elapsed(),
            report.len()
        );
        Ok(report)
    }

    pub fn fetch_count(&self) -> u64 {
        self.fetch_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct RecordingRunner {
        output: CommandOutput,
        calls: Arc<Mutex<Vec<(String, Vec<String>)>>>,
    }

    #[async_trait]
    impl CommandRunner for RecordingRunner {
        async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, VnstatError> {
            self.calls
                .lock()
                .expect("lock poisoned")
                .push((program.to_string(), args.to_vec()));
            Ok(self.output.clone())
        }
    }

    fn runner(success: bool, stdout: &str, stderr: &str) -> (RecordingRunner, Arc<Mutex<Vec<(String, Vec<String>)>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let runner = RecordingRunner {
            output: CommandOutput {
                success,
                status: if success { "exit status: 0" } else { "exit status: 1" }.to_string(),
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            },
            calls: Arc::clone(&calls),
        };
        (runner, calls)
    }

    #[test]
    fn test_args() {
        let collector = VnstatCollector::new("vnstat", None);
        assert_eq!(collector.args(), vec!["--oneline", "b"]);
        assert_eq!(collector.command_line(), "vnstat --oneline b");

        let collector = VnstatCollector::new("/usr/bin/vnstat", Some("eno1".to_string()));
        assert_eq!(collector.args(), vec!["--oneline", "b", "-i", "eno1"]);
    }

    #[tokio::test]
    async fn test_fetch_runs_oneline_bytes() {
        let (runner, calls) = runner(true, "1;eno1;2019-02-04;100;200;300;4\n", "");
        let mut collector = VnstatCollector::with_runner("vnstat", None, Box::new(runner));

        let report = collector.fetch().await.expect("fetch should succeed");
        assert_eq!(report.get("daily_total"), Some("300"));
        assert_eq!(collector.fetch_count(), 1);

        let calls = calls.lock().expect("lock poisoned");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "vnstat");
        assert_eq!(calls[0].1, vec!["--oneline", "b"]);
    }

    #[tokio::test]
    async fn test_fetch_failure_carries_stderr() {
        let (runner, _) = runner(false, "", "Error: Unable to open database\n");
        let mut collector = VnstatCollector::with_runner("vnstat", None, Box::new(runner));

        match collector.fetch().await {
            Err(VnstatError::CommandFailed { stderr, .. }) => {
                assert_eq!(stderr, "Error: Unable to open database");
            }
            other => panic!("expected CommandFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_empty_output() {
        let (runner, _) = runner(true, "", "");
        let mut collector = VnstatCollector::with_runner("vnstat", None, Box::new(runner));
        assert!(matches!(
            collector.fetch().await,
            Err(VnstatError::EmptyOutput)
        ));
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let mut collector =
            VnstatCollector::new("/nonexistent/vnstat-status-test-binary", None);
        assert!(matches!(
            collector.fetch().await,
            Err(VnstatError::Spawn { .. })
        ));
    }

    #[test]
    fn test_path_locator() {
        let locator = PathLocator;
        assert!(locator.locate("definitely-not-a-real-command-xyz").is_none());
        assert!(locator.locate("/nonexistent/vnstat").is_none());

        let dir = tempfile::tempdir().expect("tempdir");
        let fake = dir.path().join("vnstat");
        std::fs::write(&fake, "#!/bin/sh\n").expect("write fake binary");
        let fake_str = fake.to_str().expect("utf-8 path");
        assert_eq!(locator.locate(fake_str), Some(fake.clone()));
    }
}
