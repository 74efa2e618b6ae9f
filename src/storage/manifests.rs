//! Manifest storage: read the raw manifest records for validation.

use std::fs;

use crate::manifest::ManifestSource;

use super::{Result, Storage, StorageError, io_err, json_files};

impl Storage {
    /// Reads every `manifests/*.json` file, in file-name order.
    ///
    /// Contents are returned unparsed; validation decides what is acceptable.
    pub fn load_manifest_sources(&self) -> Result<Vec<ManifestSource>> {
        let dir = self.root.join("manifests");
        let files = json_files(&dir)?.ok_or(StorageError::MissingDirectory(dir))?;

        files
            .into_iter()
            .map(|path| {
                let contents = fs::read_to_string(&path).map_err(io_err(&path))?;
                let origin = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Ok(ManifestSource { origin, contents })
            })
            .collect()
    }
}
