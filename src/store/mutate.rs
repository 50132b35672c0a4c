use crate::error::{StoreError, StoreResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Removes every file directly in `path`, then `path` itself. A subdirectory
/// is refused before anything is removed.
pub fn delete_directory(path: &Path) -> StoreResult<usize> {
    let meta = fs::symlink_metadata(path).map_err(|err| StoreError::io(path, err))?;
    if !meta.file_type().is_dir() {
        return Err(StoreError::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    let read_dir = fs::read_dir(path).map_err(|err| StoreError::io(path, err))?;
    for entry in read_dir {
        let entry = entry.map_err(|err| StoreError::io(path, err))?;
        let child = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|err| StoreError::io(&child, err))?;
        if file_type.is_dir() {
            return Err(StoreError::NestedDirectory {
                path: path.to_path_buf(),
                child,
            });
        }
        files.push(child);
    }

    for file in &files {
        fs::remove_file(file).map_err(|err| StoreError::io(file, err))?;
    }
    fs::remove_dir(path).map_err(|err| StoreError::io(path, err))?;
    Ok(files.len())
}

pub fn create_symlink(target: &Path, link_path: &Path) -> StoreResult<()> {
    match fs::symlink_metadata(link_path) {
        Ok(_) => {
            return Err(StoreError::LinkExists {
                path: link_path.to_path_buf(),
            });
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => return Err(StoreError::io(link_path, err)),
    }
    symlink_dir(target, link_path)
}

#[cfg(unix)]
fn symlink_dir(target: &Path, link_path: &Path) -> StoreResult<()> {
    std::os::unix::fs::symlink(target, link_path).map_err(|err| match err.kind() {
        ErrorKind::AlreadyExists => StoreError::LinkExists {
            path: link_path.to_path_buf(),
        },
        _ => StoreError::io(link_path, err),
    })
}

#[cfg(not(unix))]
fn symlink_dir(_target: &Path, link_path: &Path) -> StoreResult<()> {
    Err(StoreError::Unsupported {
        path: link_path.to_path_buf(),
    })
}

pub fn link_target(link: &Path) -> StoreResult<Option<PathBuf>> {
    match fs::symlink_metadata(link) {
        Ok(meta) if meta.file_type().is_symlink() => {
            let raw = fs::read_link(link).map_err(|err| StoreError::io(link, err))?;
            if raw.is_absolute() {
                Ok(Some(raw))
            } else {
                let parent = link.parent().unwrap_or_else(|| Path::new(""));
                Ok(Some(parent.join(raw)))
            }
        }
        Ok(_) => Ok(None),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(StoreError::io(link, err)),
    }
}

// Both sides canonicalized; a dangling link never matches.
pub fn links_to(link: &Path, target: &Path) -> StoreResult<bool> {
    let Some(resolved) = link_target(link)? else {
        return Ok(false);
    };
    let Ok(resolved) = fs::canonicalize(&resolved) else {
        return Ok(false);
    };
    let Ok(target) = fs::canonicalize(target) else {
        return Ok(false);
    };
    Ok(resolved == target)
}
