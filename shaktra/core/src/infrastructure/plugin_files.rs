// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Filesystem helpers for the plugin updater: JSON registry files and the
//! versioned plugin cache.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use walkdir::WalkDir;

use crate::domain::plugin::PluginUpdateError;

fn io_error(path: &Path, source: std::io::Error) -> PluginUpdateError {
    PluginUpdateError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Read and parse a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PluginUpdateError> {
    let content = std::fs::read_to_string(path).map_err(|source| io_error(path, source))?;
    parse_json(path, &content)
}

pub fn parse_json<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T, PluginUpdateError> {
    serde_json::from_str(content).map_err(|source| PluginUpdateError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write JSON with 4-space indentation and a trailing newline.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PluginUpdateError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser).map_err(|source| PluginUpdateError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    buf.push(b'\n');
    std::fs::write(path, buf).map_err(|source| io_error(path, source))
}

/// Recursively copy `source` into `dest`, creating `dest`.
pub fn copy_tree(source: &Path, dest: &Path) -> Result<u64, PluginUpdateError> {
    let mut copied = 0u64;
    for entry in WalkDir::new(source) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            io_error(&path, e.into())
        })?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| io_error(entry.path(), std::io::ErrorKind::InvalidInput.into()))?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(|source| io_error(&target, source))?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
            }
            std::fs::copy(entry.path(), &target).map_err(|source| io_error(&target, source))?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Remove a directory tree if present.
pub fn remove_tree(path: &Path) -> Result<(), PluginUpdateError> {
    if path.exists() {
        std::fs::remove_dir_all(path).map_err(|source| io_error(path, source))?;
    }
    Ok(())
}
