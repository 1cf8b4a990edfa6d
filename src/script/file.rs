//! JSON script files.
//!
//! A script file is a single JSON object:
//! - `seed`: the memory table, one object per cell
//! - `steps`: the ordered trace, one object per step
//!
//! Loading runs the same validation as [`ScriptStore::new`], so a file with
//! a stray memory address is rejected before playback starts.

use super::memory::MemoryCell;
use super::step::Step;
use super::store::{ScriptError, ScriptStore};
use serde::{Serialize, Deserialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// On-disk layout of a script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptDocument {
    pub seed: Vec<MemoryCell>,
    pub steps: Vec<Step>,
}

impl From<&ScriptStore> for ScriptDocument {
    fn from(store: &ScriptStore) -> Self {
        Self {
            seed: store.seed().snapshot(),
            steps: store.steps().to_vec(),
        }
    }
}

impl TryFrom<ScriptDocument> for ScriptStore {
    type Error = ScriptError;

    fn try_from(doc: ScriptDocument) -> Result<Self, Self::Error> {
        ScriptStore::new(doc.seed, doc.steps)
    }
}

/// Parse and validate a script from JSON text.
pub fn parse_script(json: &str) -> Result<ScriptStore, ScriptFileError> {
    let doc: ScriptDocument = serde_json::from_str(json)?;
    Ok(ScriptStore::try_from(doc)?)
}

/// Render a script as pretty-printed JSON.
pub fn script_to_json(store: &ScriptStore) -> Result<String, ScriptFileError> {
    Ok(serde_json::to_string_pretty(&ScriptDocument::from(store))?)
}

/// Load a script file from disk.
pub fn load_script<P: AsRef<Path>>(path: P) -> Result<ScriptStore, ScriptFileError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| ScriptFileError::IoError(e.to_string()))?;
    let store = parse_script(&text)?;
    info!(path = %path.display(), steps = store.len(), "loaded script");
    Ok(store)
}

/// Save a script file to disk.
pub fn save_script<P: AsRef<Path>>(path: P, store: &ScriptStore) -> Result<(), ScriptFileError> {
    let path = path.as_ref();
    let json = script_to_json(store)?;
    std::fs::write(path, json).map_err(|e| ScriptFileError::IoError(e.to_string()))?;
    info!(path = %path.display(), steps = store.len(), "saved script");
    Ok(())
}

/// Errors that can occur while reading or writing script files.
#[derive(Debug, Error)]
pub enum ScriptFileError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("JSON error: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("invalid script: {0}")]
    Invalid(#[from] ScriptError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_json_reloads_equal() {
        let store = ScriptStore::builtin().unwrap();
        let json = script_to_json(&store).unwrap();
        assert_eq!(parse_script(&json).unwrap(), store);
    }

    #[test]
    fn test_hand_written_script() {
        let json = r#"{
            "seed": [
                { "address": 0, "content": "HALT", "kind": "instruction" },
                { "address": 1, "content": "", "kind": "empty" }
            ],
            "steps": [
                { "index": 0, "phase": "IDLE", "title": "Start", "narration": "" },
                {
                    "index": 1, "phase": "FETCH", "title": "Fetch", "narration": "",
                    "active_components": ["pc", "address-bus"],
                    "bus_transfer": { "from": "pc", "to": "memory", "signal": { "bus": "address", "address": 0 } },
                    "registers": { "pc": 0 }
                }
            ]
        }"#;

        let store = parse_script(json).unwrap();
        let step = store.step_at(1).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(step.registers.pc, Some(0));
        assert_eq!(step.registers.acc, None);
        assert_eq!(step.bus_transfer.as_ref().unwrap().signal.cell(), Some(0));
    }

    #[test]
    fn test_invalid_address_in_file() {
        let json = r#"{
            "seed": [ { "address": 0, "content": "", "kind": "empty" } ],
            "steps": [
                { "index": 0, "phase": "IDLE", "title": "", "narration": "" },
                { "index": 1, "phase": "EXECUTE", "title": "", "narration": "",
                  "memory_updates": [ { "address": 12, "value": "8" } ] }
            ]
        }"#;

        assert!(matches!(
            parse_script(json),
            Err(ScriptFileError::Invalid(ScriptError::InvariantViolation { step: 1, address: 12 }))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(parse_script("{ not json"), Err(ScriptFileError::ParseError(_))));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_script("/nonexistent/walkthrough.json"),
            Err(ScriptFileError::IoError(_))
        ));
    }
}
