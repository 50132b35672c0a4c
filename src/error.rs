use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("refusing to delete {}: contains subdirectory {}", path.display(), child.display())]
    NestedDirectory { path: PathBuf, child: PathBuf },
    #[error("cannot create symlink {}: path already exists", path.display())]
    LinkExists { path: PathBuf },
    #[error("not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },
    #[error(
        "working tree {} and archive tree {} overlap",
        working.display(),
        archive.display()
    )]
    OverlappingBases { working: PathBuf, archive: PathBuf },
    #[cfg(not(unix))]
    #[error("symlinks are not supported on this platform: {}", path.display())]
    Unsupported { path: PathBuf },
}

impl StoreError {
    pub fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::StoreError;
    use std::io;
    use std::path::Path;

    #[test]
    fn io_error_names_the_path() {
        let err = StoreError::io(
            Path::new("/work/ds/v20200101/a.nc"),
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(
            err.to_string(),
            "i/o failure on /work/ds/v20200101/a.nc: gone"
        );
    }

    #[test]
    fn overlapping_bases_name_both_trees() {
        let err = StoreError::OverlappingBases {
            working: Path::new("/data").to_path_buf(),
            archive: Path::new("/data/archive").to_path_buf(),
        };
        assert_eq!(
            err.to_string(),
            "working tree /data and archive tree /data/archive overlap"
        );
    }
}
