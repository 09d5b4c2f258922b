use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredScript {
    pub file_name: String,
    pub path: PathBuf,
}

/// Regular files directly inside `dir`, sorted by file name. The returned
/// order is the registry enumeration order.
pub fn discover_scripts(dir: &Path) -> std::io::Result<Vec<DiscoveredScript>> {
    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() && !path.is_file() {
            tracing::debug!(path = %path.display(), "skipping non-file entry");
            continue;
        }
        let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
            tracing::warn!(path = %path.display(), "skipping file with non UTF-8 name");
            continue;
        };
        out.push(DiscoveredScript { file_name, path });
    }
    out.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lists_files_sorted_and_skips_directories() {
        let tmp = TempDir::new().expect("tmp");
        std::fs::write(tmp.path().join("b.sh"), "").expect("b");
        std::fs::write(tmp.path().join("a.sh"), "").expect("a");
        std::fs::write(tmp.path().join(".hidden"), "").expect("hidden");
        std::fs::create_dir(tmp.path().join("nested")).expect("dir");

        let names: Vec<String> = discover_scripts(tmp.path())
            .expect("listed")
            .into_iter()
            .map(|s| s.file_name)
            .collect();
        assert_eq!(names, vec![".hidden", "a.sh", "b.sh"]);
    }

    #[test]
    fn unreadable_directory_is_error() {
        let tmp = TempDir::new().expect("tmp");
        assert!(discover_scripts(&tmp.path().join("absent")).is_err());
    }
}
