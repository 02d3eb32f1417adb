#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub use readygate_test_utils::init_tracing;

/// Write `contents` as `Readygate.toml` inside `dir` and return its path.
pub fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("Readygate.toml");
    fs::write(&path, contents).expect("write test config");
    path
}

/// Minimal valid config used as a base by config tests.
pub const MINIMAL_CONFIG: &str = r#"
[service]
program = "jupyter"
args = ["notebook", "--no-browser", "--NotebookApp.token={token}", "--port={port}"]
port = 9988
ready_marker = "Jupyter Notebook is running at"

[request]
path = "/api/contents/ci-local-writeout.ipynb"
"#;
