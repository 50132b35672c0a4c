use crate::error::{StoreError, StoreResult};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const LATEST_LINK: &str = "latest";
const VERSION_DIGITS: usize = 8;

/// `v` + 8 digits, e.g. `v20240131`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionId(u32);

impl VersionId {
    pub fn parse(name: &str) -> Option<Self> {
        let digits = name.strip_prefix('v')?;
        if digits.len() != VERSION_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse::<u32>().ok().map(Self)
    }

    pub fn is_version_name(name: &str) -> bool {
        Self::parse(name).is_some()
    }

    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{:0width$}", self.0, width = VERSION_DIGITS)
    }
}

// Symlinked versions count. A missing root yields an empty list.
pub fn list_versions(dataset_root: &Path) -> StoreResult<Vec<VersionId>> {
    let read_dir = match fs::read_dir(dataset_root) {
        Ok(read_dir) => read_dir,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(StoreError::io(dataset_root, err)),
    };

    let mut versions = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|err| StoreError::io(dataset_root, err))?;
        let Some(version) = entry.file_name().to_str().and_then(VersionId::parse) else {
            continue;
        };
        let file_type = entry
            .file_type()
            .map_err(|err| StoreError::io(&entry.path(), err))?;
        if file_type.is_dir() || file_type.is_symlink() {
            versions.push(version);
        }
    }
    versions.sort();
    Ok(versions)
}

pub fn read_latest_link(dataset_root: &Path) -> StoreResult<Option<PathBuf>> {
    let link = dataset_root.join(LATEST_LINK);
    match fs::symlink_metadata(&link) {
        Ok(meta) if meta.file_type().is_symlink() => fs::read_link(&link)
            .map(Some)
            .map_err(|err| StoreError::io(&link, err)),
        Ok(_) => Ok(None),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(StoreError::io(&link, err)),
    }
}

pub fn resolve_latest(dataset_root: &Path) -> StoreResult<Option<String>> {
    Ok(read_latest_link(dataset_root)?.and_then(|target| {
        target
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }))
}

pub fn describe_latest(dataset_root: &Path) -> String {
    match read_latest_link(dataset_root) {
        Ok(Some(target)) => format!("latest link points to {}", target.display()),
        Ok(None) => format!("no latest link exists in {}", dataset_root.display()),
        Err(err) => format!("latest link unreadable: {err}"),
    }
}
