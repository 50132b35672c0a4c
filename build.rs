use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "ARCHLINK_";
const TEST_MARKER: &str = "#[cfg(test)]";

fn collect_rs_files(root: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().and_then(|ext| ext.to_str()) == Some("rs") {
                out.push(path);
            }
        }
    }
    out.sort();
    Ok(out)
}

fn is_env_key_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'
}

// Test modules sit at the end of each file and are not part of the binary.
fn production_part(source: &str) -> &str {
    match source.find(TEST_MARKER) {
        Some(end) => &source[..end],
        None => source,
    }
}

// Whole string literals only; doc comments and the bare prefix never match.
fn env_key_literals(source: &str) -> Vec<&str> {
    let needle = format!("\"{ENV_PREFIX}");
    let mut keys = Vec::new();
    for (start, _) in source.match_indices(needle.as_str()) {
        let body = &source[start + 1..];
        let Some(end) = body.find('"') else {
            continue;
        };
        let key = &body[..end];
        if key.len() > ENV_PREFIX.len() && !key.ends_with('_') && key.chars().all(is_env_key_char)
        {
            keys.push(key);
        }
    }
    keys
}

fn write_generated_allowlist() -> std::io::Result<()> {
    let mut readers: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for file in collect_rs_files(Path::new("src"))? {
        let Ok(content) = fs::read_to_string(&file) else {
            continue;
        };
        let shown = file.display().to_string().replace('\\', "/");
        for key in env_key_literals(production_part(&content)) {
            readers
                .entry(key.to_string())
                .or_default()
                .insert(shown.clone());
        }
    }

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let generated = Path::new(&out_dir).join("archlink_env_allowlist.rs");
    let mut f = fs::File::create(generated)?;
    writeln!(
        f,
        "/// Every `{ENV_PREFIX}*` key the binary reads, with the files that read it."
    )?;
    writeln!(f, "pub const GENERATED_ENV_ALLOWLIST: &[(&str, &str)] = &[")?;
    for (key, files) in readers {
        let files = files.into_iter().collect::<Vec<_>>().join(",");
        writeln!(f, "    (\"{key}\", \"{files}\"),")?;
    }
    writeln!(f, "];")?;
    Ok(())
}

fn main() {
    write_generated_allowlist().expect("failed to generate ARCHLINK env allowlist");

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src");
}
