// Intents dispatched into the store, and the JSON-lines script reader

use crate::models::{NewTask, TaskChanges, TaskId};
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::{info, warn};

/// How an intent names the task it acts on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Id(TaskId),
    /// First task in current order with exactly this title
    Title(String),
}

/// A request from the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    Add(NewTask),
    AddDefault,
    Update { target: Target, changes: TaskChanges },
    Delete { target: Target },
    ToggleEdit { target: Target },
    ToggleDatePicker { target: Target },
    TogglePriorityPicker { target: Target },
    ToggleComplete { target: Target },
    CyclePriority { target: Target },
}

impl Intent {
    pub fn target(&self) -> Option<&Target> {
        match self {
            Intent::Add(_) | Intent::AddDefault => None,
            Intent::Update { target, .. }
            | Intent::Delete { target }
            | Intent::ToggleEdit { target }
            | Intent::ToggleDatePicker { target }
            | Intent::TogglePriorityPicker { target }
            | Intent::ToggleComplete { target }
            | Intent::CyclePriority { target } => Some(target),
        }
    }
}

/// Read intents from a JSON-lines file
pub fn read_script_file(path: &Path) -> Result<Vec<Intent>> {
    let file = File::open(path).with_context(|| format!("Failed to open script {}", path.display()))?;
    read_script(file)
}

/// Read intents, one JSON object per line.
///
/// Blank lines and lines starting with `#` are ignored. Lines that fail to
/// parse are logged and skipped.
pub fn read_script<R: Read>(reader: R) -> Result<Vec<Intent>> {
    let reader = BufReader::new(reader);
    let mut intents = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read script line {}", line_num + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match serde_json::from_str::<Intent>(trimmed) {
            Ok(intent) => intents.push(intent),
            Err(e) => {
                warn!(line = line_num + 1, error = %e, "Failed to parse intent, skipping");
            }
        }
    }

    info!(count = intents.len(), "Loaded intents");
    Ok(intents)
}
