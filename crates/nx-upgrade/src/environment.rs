use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{CliError, Result};

pub(crate) fn is_github_actions() -> bool {
    std::env::var("GITHUB_ACTIONS").is_ok_and(|value| value == "true")
}

/// File the runner collects step outputs from, when set.
pub(crate) fn output_file() -> Option<PathBuf> {
    std::env::var_os("GITHUB_OUTPUT")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Appends `key=value` lines to a runner output file.
pub(crate) fn append_outputs(path: &Path, entries: &[(&'static str, String)]) -> Result<()> {
    let to_error = |source| CliError::Outputs {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(to_error)?;

    for (key, value) in entries {
        writeln!(file, "{key}={value}").map_err(to_error)?;
    }
    Ok(())
}

/// Workflow command that surfaces `message` as an error annotation.
pub(crate) fn error_annotation(message: &str) -> String {
    let escaped = message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A");
    format!("::error::{escaped}")
}
