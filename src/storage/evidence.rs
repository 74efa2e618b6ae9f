//! Evidence storage: the capture stage's output for the current cycle.

use std::{collections::HashMap, fs};

use crate::model::ScreenEvidence;

use super::{Result, Storage, json_files};

impl Storage {
    /// Loads every `evidence/*.json` file, keyed by screen id.
    ///
    /// Evidence is never fatal: a missing directory yields an empty map, and
    /// unreadable or malformed files are skipped with a warning so the
    /// affected screen scores needs-review. If two files claim the same
    /// screen, the one later in file-name order wins.
    pub fn load_evidence(&self) -> Result<HashMap<String, ScreenEvidence>> {
        let dir = self.root.join("evidence");
        let Some(files) = json_files(&dir)? else {
            tracing::warn!(dir = %dir.display(), "no evidence directory; every screen needs review");
            return Ok(HashMap::new());
        };

        let mut evidence = HashMap::new();
        for path in files {
            let parsed = fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|json| {
                    serde_json::from_str::<ScreenEvidence>(&json).map_err(|e| e.to_string())
                });
            match parsed {
                Ok(e) => {
                    evidence.insert(e.screen_id.clone(), e);
                }
                Err(error) => {
                    tracing::warn!(file = %path.display(), %error, "skipping unusable evidence");
                }
            }
        }
        Ok(evidence)
    }
}
