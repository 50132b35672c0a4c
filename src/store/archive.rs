use crate::error::StoreResult;
use crate::store::report::Reporter;
use crate::store::version::{self, VersionId};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveDefect {
    MissingRoot,
    NoVersions,
    NoLatestLink,
    LatestNotNewest { latest: String, newest: VersionId },
}

impl fmt::Display for ArchiveDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRoot => write!(f, "archive container directory is missing"),
            Self::NoVersions => write!(f, "no version directories found in archive container"),
            Self::NoLatestLink => write!(f, "no latest link in archive container"),
            Self::LatestNotNewest { latest, newest } => write!(
                f,
                "latest link points to {latest} but the most recent version is {newest}"
            ),
        }
    }
}

pub fn archive_defects(
    root_exists: bool,
    versions: &[VersionId],
    latest: Option<&str>,
) -> Vec<ArchiveDefect> {
    let mut defects = Vec::new();
    if !root_exists {
        defects.push(ArchiveDefect::MissingRoot);
    } else if versions.is_empty() {
        defects.push(ArchiveDefect::NoVersions);
    }

    match (latest, versions.last()) {
        (None, _) => defects.push(ArchiveDefect::NoLatestLink),
        (Some(latest), Some(newest)) if latest != newest.name() => {
            defects.push(ArchiveDefect::LatestNotNewest {
                latest: latest.to_string(),
                newest: *newest,
            });
        }
        _ => {}
    }
    defects
}

#[derive(Debug, Clone)]
pub struct ArchiveState {
    pub root: PathBuf,
    pub versions: Vec<VersionId>,
    pub latest_target: Option<PathBuf>,
    pub defects: Vec<ArchiveDefect>,
}

impl ArchiveState {
    pub fn load(root: &Path) -> StoreResult<Self> {
        let root_exists = root.is_dir();
        let versions = version::list_versions(root)?;
        let latest_target = version::read_latest_link(root)?;
        let latest_name = version::resolve_latest(root)?;

        let defects = archive_defects(root_exists, &versions, latest_name.as_deref());
        Ok(Self {
            root: root.to_path_buf(),
            versions,
            latest_target,
            defects,
        })
    }

    /// Loads the state and reports every defect as an error.
    pub fn load_reported(root: &Path, reporter: &dyn Reporter) -> StoreResult<Self> {
        let state = Self::load(root)?;
        for defect in &state.defects {
            reporter.error(&format!("{defect}: {}", root.display()));
        }
        Ok(state)
    }

    pub fn is_valid(&self) -> bool {
        self.defects.is_empty()
    }

    /// The version `latest` points at, only when the state is valid.
    pub fn latest(&self) -> Option<VersionId> {
        if self.is_valid() {
            self.versions.last().copied()
        } else {
            None
        }
    }

    pub fn describe_latest(&self) -> String {
        match &self.latest_target {
            Some(target) => format!("archive latest link points to {}", target.display()),
            None => format!("no archive latest link in {}", self.root.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::report::capture::{MemoryReporter, Severity};
    use std::fs;
    use tempfile::tempdir;

    fn v(name: &str) -> VersionId {
        VersionId::parse(name).expect("version")
    }

    #[test]
    fn validity_is_the_conjunction_of_all_clauses() {
        let some_versions = [v("v20200101"), v("v20200201")];
        for root_exists in [false, true] {
            for has_versions in [false, true] {
                for has_link in [false, true] {
                    for link_is_newest in [false, true] {
                        let versions: &[VersionId] = if has_versions { &some_versions } else { &[] };
                        let latest = match (has_link, link_is_newest) {
                            (false, _) => None,
                            (true, true) => Some("v20200201"),
                            (true, false) => Some("v20200101"),
                        };
                        // Without versions there is nothing for the link to name.
                        let link_matches = link_is_newest && has_versions;
                        let expected = root_exists && has_versions && has_link && link_matches;
                        let defects = archive_defects(root_exists, versions, latest);
                        assert_eq!(
                            defects.is_empty(),
                            expected,
                            "root={root_exists} versions={has_versions} link={has_link} newest={link_is_newest}: {defects:?}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn stale_latest_link_is_named() {
        let defects = archive_defects(true, &[v("v20200101"), v("v20200201")], Some("v20200101"));
        assert_eq!(
            defects,
            vec![ArchiveDefect::LatestNotNewest {
                latest: "v20200101".to_string(),
                newest: v("v20200201"),
            }]
        );
    }

    #[cfg(unix)]
    #[test]
    fn load_valid_archive_dataset() {
        let tmp = tempdir().expect("tempdir");
        let root = tmp.path().join("ds");
        fs::create_dir_all(root.join("v20200101")).expect("mkdir");
        fs::create_dir_all(root.join("v20200201")).expect("mkdir");
        std::os::unix::fs::symlink("v20200201", root.join("latest")).expect("symlink");

        let reporter = MemoryReporter::new();
        let state = ArchiveState::load_reported(&root, &reporter).expect("load");
        assert!(state.is_valid());
        assert_eq!(state.latest(), Some(v("v20200201")));
        assert_eq!(reporter.count(Severity::Error), 0);
    }

    #[cfg(unix)]
    #[test]
    fn absolute_latest_link_is_judged_by_basename() {
        let tmp = tempdir().expect("tempdir");
        let root = tmp.path().join("ds");
        fs::create_dir_all(root.join("v20200101")).expect("mkdir");
        std::os::unix::fs::symlink(root.join("v20200101"), root.join("latest")).expect("symlink");

        let state = ArchiveState::load(&root).expect("load");
        assert!(state.is_valid());
    }

    #[test]
    fn missing_archive_root_is_reported_and_invalid() {
        let tmp = tempdir().expect("tempdir");
        let reporter = MemoryReporter::new();
        let state = ArchiveState::load_reported(&tmp.path().join("absent"), &reporter).expect("load");
        assert!(!state.is_valid());
        assert_eq!(state.latest(), None);
        assert!(reporter.contains(Severity::Error, "archive container directory is missing"));
        assert!(reporter.contains(Severity::Error, "no latest link"));
    }

    #[test]
    fn archive_without_latest_link_is_invalid() {
        let tmp = tempdir().expect("tempdir");
        fs::create_dir_all(tmp.path().join("v20200101")).expect("mkdir");
        let state = ArchiveState::load(tmp.path()).expect("load");
        assert_eq!(state.defects, vec![ArchiveDefect::NoLatestLink]);
    }
}
