use crate::domain::models::Registry;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum RegistryError {
    #[error("failed to serialize registry: {0}")]
    Serialize(#[from] serde_yaml::Error),
    #[error("failed to write registry {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub fn render_registry(registry: &Registry) -> Result<String, RegistryError> {
    Ok(serde_yaml::to_string(registry)?)
}

/// Writes the whole document to a sibling temp file and renames it over
/// `path`, so readers see either the previous file or the complete new one.
///
/// A new registry is created owner-only (0600 on unix) since it holds
/// passphrases. Rewriting an existing file keeps that file's permissions.
pub fn write_registry(path: &Path, registry: &Registry) -> Result<(), RegistryError> {
    let body = render_registry(registry)?;
    let write_err = |source| RegistryError::Write {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(write_err)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".registry-")
        .suffix(".tmp")
        .tempfile_in(&parent)
        .map_err(write_err)?;
    if let Ok(previous) = std::fs::metadata(path) {
        tmp.as_file()
            .set_permissions(previous.permissions())
            .map_err(write_err)?;
    }
    tmp.write_all(body.as_bytes()).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    tracing::info!(path = %path.display(), records = registry.len(), "registry written");
    Ok(())
}
