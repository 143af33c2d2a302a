use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::{check_user, DecisionHistory, DecisionRecord};
use crate::error::DecisionError;
use crate::DecisionResult;

type HistoryFile = BTreeMap<String, Vec<DecisionRecord>>;

/// History kept in one pretty-printed JSON object: `{ "<user>": [records] }`.
///
/// A missing file is an empty history. A malformed file lists as empty, but
/// appending to it fails rather than overwriting what is there. A file that
/// cannot be read at all is a storage error either way.
#[derive(Debug, Clone)]
pub struct JsonFileHistory {
    path: PathBuf,
}

impl JsonFileHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileHistory { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw file contents; `None` when there is no history yet.
    fn read(&self) -> DecisionResult<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            DecisionError::Storage(format!("Cannot read '{}': {e}", self.path.display()))
        })?;
        Ok(Some(contents).filter(|c| !c.trim().is_empty()))
    }

    fn parse(&self, contents: &str) -> DecisionResult<HistoryFile> {
        serde_json::from_str(contents).map_err(|e| {
            DecisionError::Storage(format!(
                "History file '{}' is not a user → records object: {e}",
                self.path.display()
            ))
        })
    }

    fn load(&self) -> DecisionResult<HistoryFile> {
        match self.read()? {
            Some(contents) => self.parse(&contents),
            None => Ok(HistoryFile::new()),
        }
    }

    fn save(&self, data: &HistoryFile) -> DecisionResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(data)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl DecisionHistory for JsonFileHistory {
    fn append(&mut self, user: &str, record: DecisionRecord) -> DecisionResult<()> {
        let user = check_user(user)?;
        let mut data = self.load()?;
        data.entry(user.to_string()).or_default().push(record);
        self.save(&data)?;
        tracing::info!(user, path = %self.path.display(), "decision saved");
        Ok(())
    }

    fn list(&self, user: &str) -> DecisionResult<Vec<DecisionRecord>> {
        let user = check_user(user)?;
        let Some(contents) = self.read()? else {
            return Ok(Vec::new());
        };
        match self.parse(&contents) {
            Ok(mut data) => Ok(data.remove(user).unwrap_or_default()),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed history file");
                Ok(Vec::new())
            }
        }
    }
}
