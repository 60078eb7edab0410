use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Split `dir/name.json` into the storage root and slot name.
pub fn schema_slot(path: &Path) -> Result<(PathBuf, String)> {
    anyhow::ensure!(
        path.extension().is_some_and(|ext| ext == "json"),
        "schema files must end in .json: {}",
        path.display()
    );
    let slot = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .with_context(|| format!("invalid schema file name: {}", path.display()))?;
    let root = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    Ok((root, slot.to_string()))
}
