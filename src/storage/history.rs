//! Remediation history: one line per cycle, append-only.
//!
//! Earlier cycles' scorecards are kept here for reference only; scoring
//! never reads them back.

use std::{
    fs,
    io::{self, BufRead, Write},
    path::PathBuf,
};

use crate::model::CycleRecord;

use super::{Result, Storage, io_err, json_err};

impl Storage {
    pub fn history_path(&self) -> PathBuf {
        self.reports_dir().join("remediation-history.jsonl")
    }

    /// Appends a cycle record to the history.
    pub fn append_history(&self, record: &CycleRecord) -> Result<()> {
        let dir = self.reports_dir();
        fs::create_dir_all(&dir).map_err(io_err(&dir))?;

        let path = self.history_path();
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_err(&path))?;
        let mut line = serde_json::to_string(record).map_err(json_err(&path))?;
        line.push('\n');
        file.write_all(line.as_bytes()).map_err(io_err(&path))?;
        Ok(())
    }

    /// Loads every cycle record, oldest first.
    ///
    /// A torn or malformed line is skipped with a warning; the lines around
    /// it are still returned.
    pub fn load_history(&self) -> Result<Vec<CycleRecord>> {
        let path = self.history_path();
        let file = match fs::File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_err(&path)(e)),
        };
        let mut records = Vec::new();
        for (i, line) in io::BufReader::new(file).lines().enumerate() {
            let line = line.map_err(io_err(&path))?;
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<CycleRecord>(&line) {
                Ok(record) => records.push(record),
                Err(error) => {
                    tracing::warn!(
                        file = %path.display(),
                        line = i + 1,
                        %error,
                        "skipping unreadable history line"
                    );
                }
            }
        }
        Ok(records)
    }
}
