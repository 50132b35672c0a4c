use crate::error::{StoreError, StoreResult};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

pub const DEFAULT_BLOCK_SIZE: usize = 64 * 1024;

pub fn file_digest(path: &Path, block_size: usize) -> StoreResult<String> {
    let mut file = fs::File::open(path).map_err(|err| StoreError::io(path, err))?;
    let mut hasher = Sha256::new();
    let mut block = vec![0u8; block_size.max(1)];
    loop {
        let read = match file.read(&mut block) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(StoreError::io(path, err)),
        };
        hasher.update(&block[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

pub fn file_size(path: &Path) -> StoreResult<u64> {
    fs::metadata(path)
        .map(|meta| meta.len())
        .map_err(|err| StoreError::io(path, err))
}

/// All non-directory entries below `dir`, relative to `dir`, sorted.
pub fn list_files(dir: &Path) -> StoreResult<Vec<PathBuf>> {
    let mut out = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let read_dir = fs::read_dir(&current).map_err(|err| StoreError::io(&current, err))?;
        for entry in read_dir {
            let entry = entry.map_err(|err| StoreError::io(&current, err))?;
            let path = entry.path();
            let is_dir = fs::metadata(&path)
                .map(|meta| meta.is_dir())
                .unwrap_or(false);
            if is_dir {
                pending.push(path);
            } else if let Ok(relative) = path.strip_prefix(dir) {
                out.push(relative.to_path_buf());
            }
        }
    }
    out.sort();
    Ok(out)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMismatch {
    pub relative: PathBuf,
    pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirComparison {
    pub listing_mismatch: bool,
    pub only_in_left: Vec<PathBuf>,
    pub only_in_right: Vec<PathBuf>,
    pub files_checked: usize,
    pub size_mismatches: Vec<FileMismatch>,
    pub digest_mismatches: Vec<FileMismatch>,
}

impl DirComparison {
    pub fn is_equal(&self) -> bool {
        self.mismatch_count() == 0
    }

    pub fn mismatch_count(&self) -> usize {
        usize::from(self.listing_mismatch) + self.size_mismatches.len() + self.digest_mismatches.len()
    }

    pub fn describe(&self, left: &Path, right: &Path) -> Vec<String> {
        let mut lines = Vec::new();
        if self.listing_mismatch {
            lines.push(format!(
                "directories have different listed contents: {} vs {} (only left: {}, only right: {})",
                left.display(),
                right.display(),
                join_paths(&self.only_in_left),
                join_paths(&self.only_in_right),
            ));
        }
        for m in &self.size_mismatches {
            lines.push(format!(
                "files differ in size: {} vs {} ({})",
                left.join(&m.relative).display(),
                right.join(&m.relative).display(),
                m.detail
            ));
        }
        for m in &self.digest_mismatches {
            lines.push(format!(
                "files differ in sha256: {} vs {}",
                left.join(&m.relative).display(),
                right.join(&m.relative).display(),
            ));
        }
        lines
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "none".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

// A listing difference returns early; otherwise every file pair is checked.
// Read failures are errors, never "equal".
pub fn compare_directories(
    left: &Path,
    right: &Path,
    block_size: usize,
) -> StoreResult<DirComparison> {
    let left_files = list_files(left)?;
    let right_files = list_files(right)?;

    let mut out = DirComparison::default();
    if left_files != right_files {
        out.listing_mismatch = true;
        out.only_in_left = left_files
            .iter()
            .filter(|p| right_files.binary_search(p).is_err())
            .cloned()
            .collect();
        out.only_in_right = right_files
            .iter()
            .filter(|p| left_files.binary_search(p).is_err())
            .cloned()
            .collect();
        return Ok(out);
    }

    for relative in left_files {
        let left_path = left.join(&relative);
        let right_path = right.join(&relative);
        out.files_checked += 1;

        let left_size = file_size(&left_path)?;
        let right_size = file_size(&right_path)?;
        if left_size != right_size {
            out.size_mismatches.push(FileMismatch {
                relative,
                detail: format!("{left_size} vs {right_size} bytes"),
            });
            continue;
        }

        let left_digest = file_digest(&left_path, block_size)?;
        let right_digest = file_digest(&right_path, block_size)?;
        if left_digest != right_digest {
            out.digest_mismatches.push(FileMismatch {
                relative,
                detail: format!("{left_digest} vs {right_digest}"),
            });
        }
    }

    Ok(out)
}
