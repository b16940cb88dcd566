//! Draft persistence
//!
//! The editable schema document lives in a local YAML file between CLI
//! invocations, so a multi-command editing session behaves like one
//! continuous form session. Row ids and their counters are part of the
//! draft; they never leave this file for the backend.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::document::SchemaDocument;

pub struct DraftStore {
    path: PathBuf,
}

impl DraftStore {
    /// Resolve the draft location: explicit path, then the GATEWAY_DRAFT
    /// env override, then ~/.gateway/draft.yml.
    pub fn open(path: Option<&str>) -> Result<Self> {
        let path = if let Some(p) = path {
            PathBuf::from(p)
        } else if let Ok(env_path) = std::env::var("GATEWAY_DRAFT") {
            PathBuf::from(env_path)
        } else {
            let home = dirs::home_dir().context("Cannot find home directory")?;
            home.join(".gateway").join("draft.yml")
        };
        Ok(Self { path })
    }

    /// Load the current draft; a missing file is an empty document.
    pub fn load(&self) -> Result<SchemaDocument> {
        if !self.path.exists() {
            debug!("No draft at {:?}, starting empty", self.path);
            return Ok(SchemaDocument::default());
        }

        let raw = fs::read_to_string(&self.path).context("Failed to read draft file")?;
        let doc: SchemaDocument =
            serde_yaml::from_str(&raw).context("Failed to parse draft file")?;

        debug!("Loaded draft from {:?}", self.path);
        Ok(doc)
    }

    pub fn save(&self, doc: &SchemaDocument) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(doc)?;
        fs::write(&self.path, content).context("Failed to write draft file")?;

        info!("Saved draft to {:?}", self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::document::TrainingPair;

    #[test]
    fn missing_file_loads_as_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draft.yml");
        let store = DraftStore::open(Some(path.to_str().unwrap())).unwrap();
        let doc = store.load().unwrap();
        assert_eq!(doc, SchemaDocument::default());
    }

    #[test]
    fn draft_round_trips_rows_and_counters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draft.yml");
        let store = DraftStore::open(Some(path.to_str().unwrap())).unwrap();

        let mut doc = SchemaDocument::new("Orders");
        let first = doc.fields.add("id".to_string());
        doc.fields.add("total".to_string());
        doc.fields.remove(first);
        doc.training_sets.add(TrainingPair {
            input: "in".to_string(),
            output: "out".to_string(),
        });
        store.save(&doc).unwrap();

        let mut loaded = store.load().unwrap();
        assert_eq!(loaded, doc);
        // The counter survives the round trip: ids keep advancing.
        assert_eq!(loaded.fields.add("created_at".to_string()), 2);
    }
}
