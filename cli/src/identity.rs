//! Remembered visitor identity as a JSON file, the terminal's stand-in
//! for the browser's localStorage.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use widget::error::WidgetError;
use widget::storage::{IdentityStore, LeadIdentity};

/// `<config dir>/chatbot-cli/identity.json`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("chatbot-cli").join("identity.json"))
}

pub struct FileIdentity {
    path: PathBuf,
}

impl FileIdentity {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file. Missing is fine.
    pub fn forget(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

impl IdentityStore for FileIdentity {
    fn load(&self) -> Option<LeadIdentity> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                eprintln!("warning: cannot read {}: {e}", self.path.display());
                return None;
            }
        };
        match serde_json::from_str::<LeadIdentity>(&raw) {
            // Blank values count as absent, same as in the browser.
            Ok(stored) => LeadIdentity::from_values(Some(stored.name), Some(stored.email), Some(stored.phone)),
            Err(e) => {
                eprintln!("warning: ignoring malformed {}: {e}", self.path.display());
                None
            }
        }
    }

    fn save(&self, identity: &LeadIdentity) -> Result<(), WidgetError> {
        let storage = |e: &dyn std::fmt::Display| WidgetError::Storage(format!("{}: {e}", self.path.display()));
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| storage(&e))?;
        }
        let json = serde_json::to_string_pretty(identity).map_err(|e| storage(&e))?;
        fs::write(&self.path, json).map_err(|e| storage(&e))
    }
}

#[cfg(test)]
#[path = "identity_test.rs"]
mod tests;
