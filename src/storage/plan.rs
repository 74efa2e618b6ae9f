//! Plan storage: the execution plan written once per batch.

use std::{fs, io, path::PathBuf};

use crate::model::ExecutionPlan;
use crate::plan::render;

use super::{Result, Storage, io_err, json_err, write_file};

impl Storage {
    pub fn plan_path(&self) -> PathBuf {
        self.root.join("execution-plan.json")
    }

    /// Loads the stored plan, or `None` if none has been written yet.
    pub fn load_plan(&self) -> Result<Option<ExecutionPlan>> {
        let path = self.plan_path();
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_err(&path)(e)),
        };
        serde_json::from_str(&json).map(Some).map_err(json_err(&path))
    }

    /// Writes the plan in its canonical serialized form.
    pub fn save_plan(&self, plan: &ExecutionPlan) -> Result<()> {
        let path = self.plan_path();
        let json = render(plan).map_err(json_err(&path))?;
        write_file(&path, &json)
    }
}
