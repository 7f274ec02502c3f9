#![allow(dead_code)]

use anyhow::Result;
use arbor_test::fixtures::course_sequences;
use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub fn arbor_cmd() -> Command {
    let mut cmd = Command::cargo_bin("arbor").unwrap();
    cmd.env_remove("ARBOR_LOG").env_remove("ARBOR_CONFIG");
    cmd
}

/// `arbor upgma` preloaded with the four course sequences
pub fn upgma_course_cmd() -> Command {
    let mut cmd = arbor_cmd();
    cmd.arg("upgma");
    for seq in course_sequences() {
        cmd.arg("--sequence").arg(seq);
    }
    cmd
}

/// Scratch directory for input and config files
pub struct TestEnvironment {
    pub temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    pub fn create_input_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, content)?;
        Ok(path)
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }
}
