//! Common utilities for CLI E2E tests.
//!
//! Every test gets its own working directory (where the state file lives)
//! and its own HOME (where the config file lives).

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

pub const STATE_FILE: &str = ".notion_timer_state.json";

pub struct Sandbox {
    pub work: TempDir,
    pub home: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            work: TempDir::new().expect("create work dir"),
            home: TempDir::new().expect("create home dir"),
        }
    }

    pub fn state_path(&self) -> PathBuf {
        self.work.path().join(STATE_FILE)
    }

    pub fn config_path(&self) -> PathBuf {
        self.home.path().join(".config/notion-timer/config.toml")
    }

    /// Point the Notion client at a local mock server.
    pub fn use_api_base(&self, api_base: &str) {
        let path = self.config_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            format!("[notion]\napi_base = \"{api_base}\"\ntimeout_secs = 5\n"),
        )
        .unwrap();
    }

    /// Invoke a CLI command and return (stdout, stderr, exit code).
    pub fn run(&self, args: &[&str]) -> (String, String, i32) {
        self.run_with_env(args, &[])
    }

    pub fn run_with_env(&self, args: &[&str], env: &[(&str, &str)]) -> (String, String, i32) {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_notion-timer"));
        cmd.args(args)
            .current_dir(self.work.path())
            .env("HOME", self.home.path())
            .env_remove("NOTION_TOKEN")
            .env_remove("NOTION_DATABASE_ID")
            .env_remove("NOTION_TIMER_ENV")
            .env_remove("RUST_LOG");
        for (key, value) in env {
            cmd.env(key, value);
        }
        let output = cmd.output().expect("Failed to execute CLI command");

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let code = output.status.code().unwrap_or(-1);

        (stdout, stderr, code)
    }

    /// Invoke a CLI command and expect success.
    pub fn run_success(&self, args: &[&str]) -> String {
        let (stdout, stderr, code) = self.run(args);
        assert_eq!(code, 0, "CLI command {args:?} failed with code {code}: {stderr}");
        stdout
    }
}

/// Parse JSON output from CLI.
pub fn parse_json(json: &str) -> serde_json::Value {
    serde_json::from_str(json).expect("Failed to parse JSON output")
}

/// Check if string contains substring
pub fn assert_contains(haystack: &str, needle: &str) {
    assert!(
        haystack.contains(needle),
        "Expected '{}' to contain '{}'",
        haystack,
        needle
    );
}

pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).expect("read file")
}
