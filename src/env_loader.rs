use std::env;
use std::path::PathBuf;

fn fallback_dotenv_path(
    archlink_home: Option<PathBuf>,
    home_dir: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(base) = archlink_home {
        return Some(base.join(".env"));
    }
    Some(home_dir?.join(".archlink/.env"))
}

/// Loads the first `.env` found and returns its path. Variables already set
/// in the process environment win over the file.
pub fn load_dotenv() -> Option<PathBuf> {
    if let Ok(path) = dotenvy::dotenv() {
        return Some(path);
    }

    let path = fallback_dotenv_path(
        env::var_os("ARCHLINK_HOME").map(PathBuf::from),
        dirs::home_dir(),
    )?;
    if !path.is_file() {
        return None;
    }
    dotenvy::from_path(&path).ok().map(|()| path)
}
