pub mod reconcile;
pub mod scan;
pub mod show_config;

use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct CommandReport {
    pub command: String,
    pub ok: bool,
    pub details: Vec<String>,
    pub issues: Vec<String>,
}

impl CommandReport {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ok: true,
            details: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub fn detail(&mut self, text: impl Into<String>) {
        self.details.push(text.into());
    }

    pub fn issue(&mut self, text: impl Into<String>) {
        self.ok = false;
        self.issues.push(text.into());
    }
}

/// Argument value, else configured value, else a descriptive error.
pub fn require_dir(
    arg: Option<PathBuf>,
    configured: Option<PathBuf>,
    what: &str,
    env_key: &str,
) -> Result<PathBuf> {
    arg.or(configured).with_context(|| {
        format!("{what} not set: pass it as an argument, set {env_key}, or add it to the config file")
    })
}
