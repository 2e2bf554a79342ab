//! Filesystem utilities.

use gki_types::Result;
use std::path::{Path, PathBuf};
use std::fs;
use walkdir::WalkDir;

/// Read entire file as string (slurp).
pub fn slurp(path: impl AsRef<Path>) -> Result<String> {
    fs::read_to_string(path).map_err(Into::into)
}

/// Expand a list of files and directories into YAML files.
///
/// Files are taken as given. Directories are walked recursively for
/// `*.yml` and `*.yaml`. Each directory's matches are sorted so output is
/// deterministic.
pub fn collect_yaml_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(path) {
            let entry = entry.map_err(std::io::Error::from)?;
            let candidate = entry.path();
            if candidate.is_file()
                && candidate
                    .extension()
                    .map_or(false, |ext| ext == "yml" || ext == "yaml")
            {
                found.push(candidate.to_path_buf());
            }
        }
        found.sort();
        files.extend(found);
    }

    Ok(files)
}

/// Write a marker file, creating parent directories as needed.
pub fn write_marker(path: impl AsRef<Path>, content: &str) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_yaml_files() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("b.yml"), "").unwrap();
        fs::write(nested.join("a.yaml"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let single = dir.path().join("explicit.txt");
        let files = collect_yaml_files(&[dir.path().to_path_buf(), single.clone()]).unwrap();

        assert_eq!(
            files,
            vec![dir.path().join("b.yml"), nested.join("a.yaml"), single]
        );
    }

    #[test]
    fn test_write_marker_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("gen").join("check-timestamp");
        write_marker(&marker, "done\n").unwrap();
        assert_eq!(slurp(&marker).unwrap(), "done\n");
    }
}
