//! Shared helpers for integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo;
use assert_cmd::Command;
use tempfile::TempDir;

/// A temp directory holding the store file for one test
pub struct TestStore {
    pub dir: TempDir,
}

impl TestStore {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().join("store.json")
    }

    /// A `tledger` command bound to this store, isolated from user config
    pub fn cmd(&self) -> Command {
        tledger(&self.path(), self.dir.path())
    }

    /// Run with `-f json` and parse stdout
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.cmd().args(["-f", "json"]).args(args).output().unwrap();
        assert!(
            output.status.success(),
            "command {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }

    /// Internal ID of the record a `-f json` command printed
    pub fn created_id(&self, args: &[&str]) -> String {
        self.json(args)["id"].as_str().unwrap().to_string()
    }
}

pub fn tledger(store: &Path, home: &Path) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("tledger"));
    cmd.arg("--store")
        .arg(store)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env_remove("TLEDGER_STORE")
        .env_remove("TLEDGER_AUTHOR")
        .env_remove("TLEDGER_LOG");
    cmd
}
