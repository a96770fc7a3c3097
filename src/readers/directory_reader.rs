use crate::error::{ProcessingError, Result};
use crate::models::DerivedFile;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// List the regular files of a date-keyed input directory, sorted by path.
///
/// Directories (and symlinks to directories) are excluded. A missing
/// directory is reported as [`ProcessingError::InputMissing`].
pub fn list_input_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ProcessingError::InputMissing {
                path: dir.to_path_buf(),
            })
        }
        Err(e) => return Err(e.into()),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        // `is_file` follows symlinks, so links to directories are excluded too
        if path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// List the derived files of a date-keyed output directory, sorted by path.
///
/// A missing directory yields no files. Files whose names do not follow the
/// derived naming contract are ignored.
pub fn list_derived_files(dir: &Path) -> Result<Vec<DerivedFile>> {
    let files = match list_input_files(dir) {
        Ok(files) => files,
        Err(ProcessingError::InputMissing { .. }) => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut derived = Vec::with_capacity(files.len());
    for path in files {
        match DerivedFile::parse(&path) {
            Ok(file) => derived.push(file),
            Err(e) => debug!(path = %path.display(), error = %e, "ignoring non-derived file"),
        }
    }

    Ok(derived)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_input_files_regular_only() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("b.nc"), b"")?;
        fs::write(dir.path().join("a.nc"), b"")?;
        fs::create_dir(dir.path().join("subdir"))?;

        let files = list_input_files(dir.path())?;
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.nc", "b.nc"]);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_to_directory_excluded() -> Result<()> {
        let dir = TempDir::new()?;
        let target = TempDir::new()?;
        fs::write(dir.path().join("a.nc"), b"")?;
        std::os::unix::fs::symlink(target.path(), dir.path().join("linked"))?;

        assert_eq!(list_input_files(dir.path())?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_missing_input_directory() {
        let err = list_input_files(Path::new("/nonexistent/2023/06/01")).unwrap_err();
        assert!(matches!(err, ProcessingError::InputMissing { .. }));
    }

    #[test]
    fn test_list_derived_files_filters_names() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("AP_0-20000-0-06610-A-2023-06-01.json"), b"{}")?;
        fs::write(dir.path().join("readme.txt"), b"")?;

        let derived = list_derived_files(dir.path())?;
        assert_eq!(derived.len(), 1);
        assert_eq!(derived[0].station.as_str(), "0-20000-0-06610-A");
        Ok(())
    }

    #[test]
    fn test_list_derived_files_missing_directory() -> Result<()> {
        assert!(list_derived_files(Path::new("/nonexistent/2023/06/01"))?.is_empty());
        Ok(())
    }
}
