use serde::de::DeserializeOwned;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Load a JSON document from `--input`, falling back to piped stdin.
///
/// Returns `None` when neither is available so the caller can build the input
/// from flags instead.
pub fn read_input<T: DeserializeOwned>(path: Option<&str>) -> CliResult<Option<T>> {
    if let Some(path) = path {
        return read_json_file(path).map(Some);
    }
    match read_stdin()? {
        Some(text) => {
            let value = serde_json::from_str(&text)
                .map_err(|e| format!("Failed to parse stdin: {e}"))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Like [`read_input`] for commands that have no flag form.
pub fn require_input<T: DeserializeOwned>(path: Option<&str>, command: &str) -> CliResult<T> {
    read_input(path)?
        .ok_or_else(|| format!("--input <file.json> or stdin required for {command}").into())
}

fn read_json_file<T: DeserializeOwned>(path: &str) -> CliResult<T> {
    let resolved = resolve_path(path)?;
    let contents = fs::read_to_string(&resolved)
        .map_err(|e| format!("Failed to read '{}': {}", resolved.display(), e))?;
    tracing::debug!(path = %resolved.display(), bytes = contents.len(), "read input file");
    let value = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", resolved.display(), e))?;
    Ok(value)
}

/// Piped stdin as text; `None` on a TTY or empty pipe.
fn read_stdin() -> CliResult<Option<String>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some(trimmed.to_string()))
}

fn resolve_path(path: &str) -> CliResult<PathBuf> {
    let p = Path::new(path);
    let resolved = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };
    if !resolved.is_file() {
        return Err(format!("File not found: {}", resolved.display()).into());
    }
    Ok(resolved)
}
