use crate::error::{StoreError, StoreResult};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct DatasetScan {
    pub roots: Vec<PathBuf>,
    /// Directories below the tree root that could not be listed.
    pub unreadable: Vec<(PathBuf, StoreError)>,
}

/// Every directory under `tree_root` (inclusive) with a child directory named
/// by `matches`, depth-first in lexicographic order. Symlinked directories
/// qualify a parent but are never descended.
pub fn find_dataset_roots<F>(tree_root: &Path, matches: F) -> StoreResult<DatasetScan>
where
    F: Fn(&str) -> bool,
{
    let mut scan = DatasetScan::default();
    let mut pending = vec![tree_root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let (is_dataset, mut children) = match child_dirs(&dir, &matches) {
            Ok(listed) => listed,
            Err(err) if dir != tree_root => {
                scan.unreadable.push((dir, err));
                continue;
            }
            Err(err) => return Err(err),
        };

        if is_dataset {
            scan.roots.push(dir);
        }

        children.sort();
        // Reverse so the stack pops children in ascending order.
        pending.extend(children.into_iter().rev());
    }

    Ok(scan)
}

fn child_dirs<F>(dir: &Path, matches: &F) -> StoreResult<(bool, Vec<PathBuf>)>
where
    F: Fn(&str) -> bool,
{
    let mut children = Vec::new();
    let mut is_dataset = false;

    for entry in fs::read_dir(dir).map_err(|err| StoreError::io(dir, err))? {
        let entry = entry.map_err(|err| StoreError::io(dir, err))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|err| StoreError::io(&path, err))?;

        let is_real_dir = file_type.is_dir();
        let is_linked_dir = file_type.is_symlink() && path.is_dir();
        if !is_real_dir && !is_linked_dir {
            continue;
        }

        if entry.file_name().to_str().is_some_and(matches) {
            is_dataset = true;
        }
        if is_real_dir {
            children.push(path);
        }
    }
    Ok((is_dataset, children))
}
