//! Common utilities for CLI E2E tests.

use std::process::Command;

use tempfile::TempDir;

/// A CLI invocation context with its own home (and therefore data) directory.
pub struct Cli {
    home: TempDir,
}

impl Cli {
    pub fn new() -> Self {
        Self {
            home: TempDir::new().expect("Failed to create temp home"),
        }
    }

    /// Invoke a CLI command and return (stdout, stderr, exit code).
    pub fn run(&self, args: &[&str]) -> (String, String, i32) {
        let output = Command::new(env!("CARGO_BIN_EXE_habitual"))
            .args(args)
            .env("HOME", self.home.path())
            .env("TZ", "UTC")
            .env_remove("HABITUAL_ENV")
            .env_remove("HABITUAL_LOG")
            .output()
            .expect("Failed to execute CLI command");

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let code = output.status.code().unwrap_or(-1);

        (stdout, stderr, code)
    }

    /// Invoke a CLI command and expect success.
    pub fn success(&self, args: &[&str]) -> String {
        let (stdout, stderr, code) = self.run(args);
        assert_eq!(code, 0, "CLI command {:?} failed: {}", args, stderr);
        stdout
    }

    /// Invoke a CLI command and expect failure.
    pub fn failure(&self, args: &[&str]) -> String {
        let (_, stderr, code) = self.run(args);
        assert!(code != 0, "CLI command unexpectedly succeeded: {:?}", args);
        stderr
    }

    /// Invoke a command and parse its stdout as JSON.
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let stdout = self.success(args);
        serde_json::from_str(&stdout).expect("Failed to parse JSON output")
    }
}
